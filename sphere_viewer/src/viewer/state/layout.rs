use winit::dpi::PhysicalSize;

use super::ViewerState;
use crate::viewer::resources::{create_depth_view, perspective};

pub(super) fn resize(state: &mut ViewerState, new_size: PhysicalSize<u32>) {
    if new_size.width == 0 || new_size.height == 0 {
        return;
    }

    state.size = new_size;
    state.config.width = new_size.width;
    state.config.height = new_size.height;
    state.surface.configure(&state.device, &state.config);

    state.depth_view = create_depth_view(&state.device, new_size.width, new_size.height);
    state.projection = perspective(new_size.width, new_size.height);
}
