//! Single-frame offscreen rendering for `--dump-frame`: the same pass
//! sequence as the windowed renderer, pointed at a readback texture and
//! exported as a PNG. Runs without a window, so headless automation gets a
//! real rendered artifact.

use std::{path::Path, sync::mpsc};

use anyhow::{Context, Result, bail};
use bytemuck::cast_slice;
use pollster::FutureExt;

use sphere_scene::{CameraRig, SceneLayout};

use crate::overlay::OverlaySurface;
use crate::texture::{strip_row_padding, write_rgba_png};
use crate::viewer::resources::{
    create_depth_view, create_grid_resources, create_mesh_resources, create_overlay_resources,
    encode_frame, frame_instances, grid_uniforms, perspective, scene_uniforms,
};

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Render the scene's first frame (elapsed zero, camera at spawn) at the
/// given size and write it to `path`.
pub fn render_frame_to_png(
    path: &Path,
    width: u32,
    height: u32,
    layout: &SceneLayout,
    overlay_surface: Option<&mut OverlaySurface>,
) -> Result<()> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: None,
        })
        .block_on()
        .or_else(|| {
            instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::LowPower,
                    force_fallback_adapter: true,
                    compatible_surface: None,
                })
                .block_on()
        })
        .context("requesting adapter for offscreen render")?;

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("sphere-viewer-offscreen-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
            },
            None,
        )
        .block_on()
        .context("requesting device for offscreen render")?;

    let grid = create_grid_resources(&device, TARGET_FORMAT)?;
    let mesh = create_mesh_resources(&device, TARGET_FORMAT)?;
    let overlay = match overlay_surface {
        Some(surface) => Some(create_overlay_resources(
            &device,
            &queue,
            TARGET_FORMAT,
            surface,
        )?),
        None => None,
    };
    let depth_view = create_depth_view(&device, width, height);

    let view = CameraRig::new().view_matrix();
    let projection = perspective(width, height);
    queue.write_buffer(
        &grid.uniform_buffer,
        0,
        cast_slice(&[grid_uniforms(projection, view)]),
    );
    queue.write_buffer(
        &mesh.uniform_buffer,
        0,
        cast_slice(&[scene_uniforms(projection, view)]),
    );
    let instances = frame_instances(layout, 0.0);
    queue.write_buffer(&mesh.instance_buffer, 0, cast_slice(&instances.combined));

    let extent = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let target = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("offscreen-target"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("offscreen-encoder"),
    });
    encode_frame(
        &mut encoder,
        &target_view,
        &depth_view,
        &grid,
        &mesh,
        &instances,
        overlay.as_ref(),
    );

    let tight_stride = 4 * width;
    let alignment = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded_stride = tight_stride.div_ceil(alignment) * alignment;
    let readback = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("offscreen-readback"),
        size: padded_stride as u64 * height as u64,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    encoder.copy_texture_to_buffer(
        wgpu::ImageCopyTexture {
            texture: &target,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::ImageCopyBuffer {
            buffer: &readback,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(padded_stride),
                rows_per_image: Some(height),
            },
        },
        extent,
    );

    queue.submit(std::iter::once(encoder.finish()));

    let buffer_slice = readback.slice(..);
    let (tx, rx) = mpsc::channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device.poll(wgpu::Maintain::Wait);
    match rx.recv().context("waiting for offscreen readback")? {
        Ok(()) => {}
        Err(err) => bail!("mapping offscreen readback buffer: {err}"),
    }

    let rgba = {
        let padded = buffer_slice.get_mapped_range();
        strip_row_padding(width, height, padded_stride, &padded)
    };
    readback.unmap();

    write_rgba_png(path, width, height, &rgba)
        .with_context(|| format!("writing frame dump {}", path.display()))
}
