use bytemuck::cast_slice;
use wgpu::SurfaceError;

use super::ViewerState;
use crate::texture::pad_rgba_rows;
use crate::viewer::resources::{encode_frame, frame_instances, grid_uniforms, scene_uniforms};

pub(super) fn render(state: &mut ViewerState) -> Result<(), SurfaceError> {
    let elapsed = state.clock.elapsed_seconds();
    let view = state.camera.view_matrix();

    let grid = grid_uniforms(state.projection, view);
    state
        .queue
        .write_buffer(&state.grid.uniform_buffer, 0, cast_slice(&[grid]));

    let scene = scene_uniforms(state.projection, view);
    state
        .queue
        .write_buffer(&state.mesh.uniform_buffer, 0, cast_slice(&[scene]));

    let instances = frame_instances(&state.layout, elapsed);
    state.queue.write_buffer(
        &state.mesh.instance_buffer,
        0,
        cast_slice(&instances.combined),
    );

    upload_overlay_if_dirty(state);

    let frame = state.surface.get_current_texture()?;
    let color_view = frame
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = state
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("sphere-viewer-encoder"),
        });

    encode_frame(
        &mut encoder,
        &color_view,
        &state.depth_view,
        &state.grid,
        &state.mesh,
        &instances,
        state.overlay.as_ref(),
    );

    state.queue.submit(std::iter::once(encoder.finish()));
    frame.present();
    Ok(())
}

// The per-frame paint call: push page pixels to the GPU only when they
// changed since the last upload.
fn upload_overlay_if_dirty(state: &mut ViewerState) {
    let (Some(overlay), Some(surface)) = (state.overlay.as_ref(), state.overlay_surface.as_mut())
    else {
        return;
    };
    let Some(pixels) = surface.take_dirty_pixels() else {
        return;
    };

    let upload = match pad_rgba_rows(overlay.extent.width, overlay.extent.height, pixels) {
        Ok(upload) => upload,
        Err(err) => {
            log::warn!(
                "[sphere_viewer] overlay upload failed ({}x{}): {err}",
                overlay.extent.width,
                overlay.extent.height
            );
            return;
        }
    };
    state.queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &overlay.texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        upload.pixels(),
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(upload.bytes_per_row()),
            rows_per_image: Some(overlay.extent.height),
        },
        overlay.extent,
    );
}
