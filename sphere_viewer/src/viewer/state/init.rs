use std::sync::Arc;

use anyhow::{Context, Result};
use winit::window::Window;

use sphere_scene::{CameraRig, SceneClock, SceneLayout};

use super::ViewerState;
use crate::overlay::OverlaySurface;
use crate::viewer::resources::{
    create_depth_view, create_grid_resources, create_mesh_resources, create_overlay_resources,
    perspective,
};

pub(super) async fn new(
    window: Arc<Window>,
    scene_layout: SceneLayout,
    mut overlay_surface: Option<OverlaySurface>,
) -> Result<ViewerState> {
    let size = window.inner_size();

    let instance = wgpu::Instance::default();
    let surface = instance
        .create_surface(window.clone())
        .context("creating wgpu surface")?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        })
        .await
        .context("requesting wgpu adapter")?;

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("sphere-viewer-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
            },
            None,
        )
        .await
        .context("requesting wgpu device")?;

    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .copied()
        .find(|format| format.is_srgb())
        .unwrap_or(surface_caps.formats[0]);
    let present_mode = surface_caps
        .present_modes
        .iter()
        .copied()
        .find(|mode| *mode == wgpu::PresentMode::Mailbox)
        .unwrap_or(wgpu::PresentMode::Fifo);
    let alpha_mode = surface_caps
        .alpha_modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Opaque);

    let grid = create_grid_resources(&device, surface_format)?;
    let mesh = create_mesh_resources(&device, surface_format)?;
    let overlay = match overlay_surface.as_mut() {
        Some(surface_data) => Some(create_overlay_resources(
            &device,
            &queue,
            surface_format,
            surface_data,
        )?),
        None => None,
    };

    let depth_view = create_depth_view(&device, size.width, size.height);
    let projection = perspective(size.width, size.height);

    let state = ViewerState {
        window,
        surface,
        device,
        queue,
        config: wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        },
        size,
        depth_view,
        projection,
        grid,
        mesh,
        overlay,
        overlay_surface,
        camera: CameraRig::new(),
        layout: scene_layout,
        clock: SceneClock::start(),
        cursor: None,
    };

    state.surface.configure(&state.device, &state.config);
    log::info!(
        "[sphere_viewer] renderer up: {}x{}, format {surface_format:?}, present {present_mode:?}",
        state.config.width,
        state.config.height
    );

    Ok(state)
}
