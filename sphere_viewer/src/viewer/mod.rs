mod offscreen;
mod resources;
mod shaders;
mod state;

pub use offscreen::render_frame_to_png;
pub use state::ViewerState;
