use std::sync::Arc;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use pollster::FutureExt;
use wgpu::SurfaceError;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

use sphere_scene::SceneLayout;

mod cli;
mod overlay;
mod texture;
mod viewer;

use cli::{Args, OverlayPreset, load_overlay_preset};
use overlay::{DEFAULT_ALPHA_THRESHOLD, OverlaySurface};
use viewer::ViewerState;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::init();

    ensure!(
        args.width > 0 && args.height > 0,
        "window size must be positive (got {}x{})",
        args.width,
        args.height
    );

    let preset = match args.overlay_preset.as_ref() {
        Some(path) => load_overlay_preset(path)?,
        None => OverlayPreset::default(),
    };

    let mut overlay_surface = build_overlay_surface(&args, &preset)?;
    let layout = SceneLayout::random(args.seed);

    println!(
        "[sphere_viewer] placed {} spheres (seed {:#x})",
        layout.sphere_origins.len(),
        args.seed
    );
    match overlay_surface.as_ref() {
        Some(surface) => println!(
            "[sphere_viewer] overlay surface {}x{}",
            surface.width(),
            surface.height()
        ),
        None => println!("[sphere_viewer] overlay disabled by preset"),
    }

    if let Some(path) = args.dump_frame.as_ref() {
        viewer::render_frame_to_png(
            path,
            args.width,
            args.height,
            &layout,
            overlay_surface.as_mut(),
        )
        .context("rendering offscreen frame dump")?;
        println!(
            "[sphere_viewer] frame exported to {} ({}x{})",
            path.display(),
            args.width,
            args.height
        );
    }

    if args.headless {
        println!("[sphere_viewer] headless mode requested; viewer window bootstrap skipped.");
        return Ok(());
    }

    let event_loop = EventLoop::new().context("creating winit event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Sphere World")
            .with_inner_size(PhysicalSize::new(args.width, args.height))
            .build(&event_loop)
            .context("creating viewer window")?,
    );

    let mut state = ViewerState::new(window, layout, overlay_surface).block_on()?;

    println!("[sphere_viewer] arrows steer the camera; F11 opens the overlay dev panel.");

    event_loop
        .run(move |event, target| {
            target.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                    match event {
                        WindowEvent::CloseRequested => target.exit(),
                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    logical_key: Key::Named(NamedKey::Escape),
                                    state: ElementState::Pressed,
                                    ..
                                },
                            ..
                        } => target.exit(),
                        WindowEvent::KeyboardInput {
                            event: key_event, ..
                        } => state.handle_key_event(&key_event),
                        WindowEvent::Resized(new_size) => state.resize(new_size),
                        WindowEvent::RedrawRequested => match state.render() {
                            Ok(()) => {}
                            Err(SurfaceError::Lost) => state.resize(state.size()),
                            Err(SurfaceError::OutOfMemory) => target.exit(),
                            Err(err) => eprintln!("[sphere_viewer] render error: {err:?}"),
                        },
                        other => state.handle_window_event(&other),
                    }
                }
                Event::AboutToWait => state.window().request_redraw(),
                _ => {}
            }
        })
        .context("running viewer application")?;

    Ok(())
}

fn build_overlay_surface(args: &Args, preset: &OverlayPreset) -> Result<Option<OverlaySurface>> {
    if !preset.enabled() {
        return Ok(None);
    }

    let threshold = preset.alpha_threshold.unwrap_or(DEFAULT_ALPHA_THRESHOLD);
    let surface = match args.page.as_ref() {
        Some(path) => OverlaySurface::from_page(path, threshold)?,
        None => OverlaySurface::placeholder(
            preset.width.unwrap_or(args.width),
            preset.height.unwrap_or(args.height),
            threshold,
        ),
    };
    Ok(Some(surface))
}
