//! Central runtime state for the viewer. Owns the wgpu device/surface,
//! the scene resources, the camera rig, and the overlay surface, and
//! exposes small helpers the event loop in `main.rs` drives. Submodules
//! cover lifecycle slices: `init` for setup, `layout` for resize
//! handling, `render` for the per-frame pass sequence, and `input` for
//! key/mouse routing.

use std::sync::Arc;

use anyhow::Result;
use glam::Mat4;
use wgpu::SurfaceError;
use winit::{
    dpi::PhysicalSize,
    event::{KeyEvent, WindowEvent},
    window::Window,
};

use sphere_scene::{CameraRig, SceneClock, SceneLayout};

use crate::overlay::OverlaySurface;
use crate::viewer::resources::{GridResources, MeshResources, OverlayResources};

pub struct ViewerState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    depth_view: wgpu::TextureView,
    projection: Mat4,
    grid: GridResources,
    mesh: MeshResources,
    overlay: Option<OverlayResources>,
    overlay_surface: Option<OverlaySurface>,
    camera: CameraRig,
    layout: SceneLayout,
    clock: SceneClock,
    cursor: Option<(f64, f64)>,
}

mod init;
mod input;
mod layout;
mod render;

impl ViewerState {
    pub async fn new(
        window: Arc<Window>,
        scene_layout: SceneLayout,
        overlay_surface: Option<OverlaySurface>,
    ) -> Result<Self> {
        init::new(window, scene_layout, overlay_surface).await
    }

    pub fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        layout::resize(self, new_size);
    }

    pub fn render(&mut self) -> Result<(), SurfaceError> {
        render::render(self)
    }

    pub fn handle_key_event(&mut self, event: &KeyEvent) {
        input::handle_key_event(self, event);
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        input::handle_window_event(self, event);
    }
}
