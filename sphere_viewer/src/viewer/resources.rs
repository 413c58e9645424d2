//! GPU resources and frame assembly shared by the windowed renderer and
//! the offscreen frame dump: pipeline/buffer construction, per-frame
//! instance building, and the encoded pass sequence.

use std::{borrow::Cow, ops::Range};

use anyhow::Result;
use bytemuck::{Pod, Zeroable, cast_slice};
use glam::Mat4;
use wgpu::util::DeviceExt;

use sphere_scene::{
    FLOOR_COLOR, LIGHT_POSITION, MeshData, ORBITER_COUNT, SPHERE_COLOR, SPHERE_COUNT, SceneLayout,
    TORUS_COLOR, build_floor_grid, build_sphere, build_torus, orbiter_transforms, torus_transform,
};

use crate::overlay::OverlaySurface;
use crate::texture::pad_rgba_rows;
use crate::viewer::shaders::{
    GRID_SHADER_SOURCE, MESH_SHADER_SOURCE, OVERLAY_INDICES, OVERLAY_SHADER_SOURCE,
    OVERLAY_VERTICES, OverlayVertex,
};

// The demo scene: the torus and sphere shapes and the grid spread match
// the classic sphere-world layout.
const TORUS_MAJOR_RADIUS: f32 = 0.4;
const TORUS_MINOR_RADIUS: f32 = 0.15;
const TORUS_STEPS: u32 = 30;
const SPHERE_RADIUS: f32 = 0.1;
const SPHERE_SLICES: u32 = 26;
const SPHERE_STACKS: u32 = 13;
const GRID_HALF_EXTENT: f32 = 20.0;
const GRID_SPACING: f32 = 0.5;
const GRID_HEIGHT: f32 = -0.55;

pub(crate) const FOV_Y_DEGREES: f32 = 35.0;
pub(crate) const NEAR_PLANE: f32 = 1.0;
pub(crate) const FAR_PLANE: f32 = 100.0;

pub(crate) const BACKGROUND: wgpu::Color = wgpu::Color::BLACK;
pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const INSTANCE_CAPACITY: usize = 1 + SPHERE_COUNT + ORBITER_COUNT;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct MeshInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct SceneUniforms {
    pub view_projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub light_eye: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct GridUniforms {
    pub mvp: [[f32; 4]; 4],
    pub color: [f32; 4],
}

pub(crate) fn perspective(width: u32, height: u32) -> Mat4 {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), aspect, NEAR_PLANE, FAR_PLANE)
}

/// Uniforms for one frame; the world-space light rides the view matrix
/// into eye space here so the shader never sees world coordinates.
pub(crate) fn scene_uniforms(projection: Mat4, view: Mat4) -> SceneUniforms {
    let light_eye = view * LIGHT_POSITION.extend(1.0);
    SceneUniforms {
        view_projection: (projection * view).to_cols_array_2d(),
        view: view.to_cols_array_2d(),
        light_eye: light_eye.to_array(),
    }
}

pub(crate) fn grid_uniforms(projection: Mat4, view: Mat4) -> GridUniforms {
    GridUniforms {
        mvp: (projection * view).to_cols_array_2d(),
        color: FLOOR_COLOR,
    }
}

/// Everything drawn with the diffuse mesh pipeline this frame, packed in
/// draw order: the sphere field, then the torus, then the orbiters.
pub(crate) struct FrameInstances {
    pub combined: Vec<MeshInstance>,
    pub field: Range<u32>,
    pub torus: Range<u32>,
    pub orbiters: Range<u32>,
}

pub(crate) fn frame_instances(layout: &SceneLayout, elapsed_secs: f32) -> FrameInstances {
    let mut combined = Vec::with_capacity(INSTANCE_CAPACITY);

    for origin in &layout.sphere_origins {
        combined.push(MeshInstance {
            model: Mat4::from_translation(*origin).to_cols_array_2d(),
            color: SPHERE_COLOR,
        });
    }
    let field = 0..combined.len() as u32;

    combined.push(MeshInstance {
        model: torus_transform(elapsed_secs).to_cols_array_2d(),
        color: TORUS_COLOR,
    });
    let torus = field.end..combined.len() as u32;

    for transform in orbiter_transforms(elapsed_secs) {
        combined.push(MeshInstance {
            model: transform.to_cols_array_2d(),
            color: SPHERE_COLOR,
        });
    }
    let orbiters = torus.end..combined.len() as u32;

    FrameInstances {
        combined,
        field,
        torus,
        orbiters,
    }
}

pub(crate) struct MeshBuffers {
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
    pub index_count: u32,
}

fn upload_mesh(device: &wgpu::Device, label: &str, mesh: &MeshData) -> MeshBuffers {
    let vertex_label = format!("{label}-vertex-buffer");
    let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(vertex_label.as_str()),
        contents: cast_slice(&mesh.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_label = format!("{label}-index-buffer");
    let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(index_label.as_str()),
        contents: cast_slice(&mesh.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    MeshBuffers {
        vertex,
        index,
        index_count: mesh.indices.len() as u32,
    }
}

pub(crate) struct GridResources {
    pub pipeline: wgpu::RenderPipeline,
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

pub(crate) struct MeshResources {
    pub pipeline: wgpu::RenderPipeline,
    pub torus: MeshBuffers,
    pub sphere: MeshBuffers,
    pub instance_buffer: wgpu::Buffer,
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

pub(crate) struct OverlayResources {
    pub pipeline: wgpu::RenderPipeline,
    pub texture: wgpu::Texture,
    pub extent: wgpu::Extent3d,
    pub bind_group: wgpu::BindGroup,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

fn uniform_bind_group_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn depth_state() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

pub(crate) fn create_depth_view(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> wgpu::TextureView {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("scene-depth-texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
}

pub(crate) fn create_grid_resources(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
) -> Result<GridResources> {
    let vertices = build_floor_grid(GRID_HALF_EXTENT, GRID_SPACING, GRID_HEIGHT)?;

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("grid-vertex-buffer"),
        contents: cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("grid-uniform-buffer"),
        size: std::mem::size_of::<GridUniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group_layout = uniform_bind_group_layout(device, "grid-bind-group-layout");
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("grid-bind-group"),
        layout: &bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("grid-shader"),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(GRID_SHADER_SOURCE)),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("grid-pipeline-layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let vertex_layout = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<sphere_scene::GridVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3],
    };

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("grid-pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[vertex_layout],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::LineList,
            ..Default::default()
        },
        depth_stencil: Some(depth_state()),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    });

    Ok(GridResources {
        pipeline,
        vertex_buffer,
        vertex_count: vertices.len() as u32,
        uniform_buffer,
        bind_group,
    })
}

pub(crate) fn create_mesh_resources(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
) -> Result<MeshResources> {
    let torus = build_torus(
        TORUS_MAJOR_RADIUS,
        TORUS_MINOR_RADIUS,
        TORUS_STEPS,
        TORUS_STEPS,
    )?;
    let sphere = build_sphere(SPHERE_RADIUS, SPHERE_SLICES, SPHERE_STACKS)?;

    let torus = upload_mesh(device, "torus", &torus);
    let sphere = upload_mesh(device, "sphere", &sphere);

    let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("mesh-instance-buffer"),
        size: (INSTANCE_CAPACITY * std::mem::size_of::<MeshInstance>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("mesh-uniform-buffer"),
        size: std::mem::size_of::<SceneUniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group_layout = uniform_bind_group_layout(device, "mesh-bind-group-layout");
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("mesh-bind-group"),
        layout: &bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("mesh-shader"),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(MESH_SHADER_SOURCE)),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("mesh-pipeline-layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let vertex_layout = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<sphere_scene::MeshVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
    };

    let instance_layout = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshInstance>() as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &wgpu::vertex_attr_array![
            2 => Float32x4,
            3 => Float32x4,
            4 => Float32x4,
            5 => Float32x4,
            6 => Float32x4,
        ],
    };

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("mesh-pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[vertex_layout, instance_layout],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: Some(depth_state()),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    });

    Ok(MeshResources {
        pipeline,
        torus,
        sphere,
        instance_buffer,
        uniform_buffer,
        bind_group,
    })
}

pub(crate) fn create_overlay_resources(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    format: wgpu::TextureFormat,
    surface: &mut OverlaySurface,
) -> Result<OverlayResources> {
    let extent = wgpu::Extent3d {
        width: surface.width(),
        height: surface.height(),
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("overlay-texture"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    let upload = pad_rgba_rows(surface.width(), surface.height(), surface.pixels())?;
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        upload.pixels(),
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(upload.bytes_per_row()),
            rows_per_image: Some(surface.height()),
        },
        extent,
    );
    // The creation upload covers the initial page; drop the dirty mark so
    // the first frame does not repeat it.
    let _ = surface.take_dirty_pixels();

    let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("overlay-sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("overlay-bind-group-layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("overlay-bind-group"),
        layout: &bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture_view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    });

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("overlay-shader"),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(OVERLAY_SHADER_SOURCE)),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("overlay-pipeline-layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let vertex_layout = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<OverlayVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2],
    };

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("overlay-pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[vertex_layout],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    });

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("overlay-vertex-buffer"),
        contents: cast_slice(&OVERLAY_VERTICES),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("overlay-index-buffer"),
        contents: cast_slice(&OVERLAY_INDICES),
        usage: wgpu::BufferUsages::INDEX,
    });

    Ok(OverlayResources {
        pipeline,
        texture,
        extent,
        bind_group,
        vertex_buffer,
        index_buffer,
        index_count: OVERLAY_INDICES.len() as u32,
    })
}

/// Encode the frame: one depth-tested scene pass (clear, floor grid,
/// instanced torus and spheres) followed by the overlay composite. The
/// caller writes uniforms and instances to the queue first.
pub(crate) fn encode_frame(
    encoder: &mut wgpu::CommandEncoder,
    color_view: &wgpu::TextureView,
    depth_view: &wgpu::TextureView,
    grid: &GridResources,
    mesh: &MeshResources,
    instances: &FrameInstances,
    overlay: Option<&OverlayResources>,
) {
    {
        let mut scene_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(BACKGROUND),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        scene_pass.set_pipeline(&grid.pipeline);
        scene_pass.set_bind_group(0, &grid.bind_group, &[]);
        scene_pass.set_vertex_buffer(0, grid.vertex_buffer.slice(..));
        scene_pass.draw(0..grid.vertex_count, 0..1);

        scene_pass.set_pipeline(&mesh.pipeline);
        scene_pass.set_bind_group(0, &mesh.bind_group, &[]);
        let instance_bytes =
            (instances.combined.len() * std::mem::size_of::<MeshInstance>()) as u64;
        scene_pass.set_vertex_buffer(1, mesh.instance_buffer.slice(0..instance_bytes));

        scene_pass.set_vertex_buffer(0, mesh.sphere.vertex.slice(..));
        scene_pass.set_index_buffer(mesh.sphere.index.slice(..), wgpu::IndexFormat::Uint16);
        scene_pass.draw_indexed(0..mesh.sphere.index_count, 0, instances.field.clone());

        scene_pass.set_vertex_buffer(0, mesh.torus.vertex.slice(..));
        scene_pass.set_index_buffer(mesh.torus.index.slice(..), wgpu::IndexFormat::Uint16);
        scene_pass.draw_indexed(0..mesh.torus.index_count, 0, instances.torus.clone());

        scene_pass.set_vertex_buffer(0, mesh.sphere.vertex.slice(..));
        scene_pass.set_index_buffer(mesh.sphere.index.slice(..), wgpu::IndexFormat::Uint16);
        scene_pass.draw_indexed(0..mesh.sphere.index_count, 0, instances.orbiters.clone());
    }

    if let Some(overlay) = overlay {
        let mut overlay_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("overlay-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        overlay_pass.set_pipeline(&overlay.pipeline);
        overlay_pass.set_bind_group(0, &overlay.bind_group, &[]);
        overlay_pass.set_vertex_buffer(0, overlay.vertex_buffer.slice(..));
        overlay_pass.set_index_buffer(overlay.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        overlay_pass.draw_indexed(0..overlay.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn frame_packs_field_torus_orbiters_in_draw_order() {
        let layout = SceneLayout::random(sphere_scene::DEFAULT_SEED);
        let frame = frame_instances(&layout, 0.0);

        assert_eq!(frame.combined.len(), INSTANCE_CAPACITY);
        assert_eq!(frame.field, 0..SPHERE_COUNT as u32);
        assert_eq!(frame.torus, SPHERE_COUNT as u32..(SPHERE_COUNT + 1) as u32);
        assert_eq!(
            frame.orbiters,
            (SPHERE_COUNT + 1) as u32..INSTANCE_CAPACITY as u32
        );

        let torus_instance = &frame.combined[frame.torus.start as usize];
        assert_eq!(torus_instance.color, TORUS_COLOR);
        assert!(
            frame.combined[..SPHERE_COUNT]
                .iter()
                .all(|i| i.color == SPHERE_COLOR)
        );
        assert!(
            frame.combined[frame.orbiters.start as usize..]
                .iter()
                .all(|i| i.color == SPHERE_COLOR)
        );
    }

    #[test]
    fn static_spheres_keep_their_origins() {
        let layout = SceneLayout::random(42);
        let frame = frame_instances(&layout, 2.0);

        for (instance, origin) in frame.combined[..SPHERE_COUNT]
            .iter()
            .zip(&layout.sphere_origins)
        {
            let translation = instance.model[3];
            assert_eq!(translation[0], origin.x);
            assert_eq!(translation[1], origin.y);
            assert_eq!(translation[2], origin.z);
        }
    }

    #[test]
    fn light_rides_into_eye_space() {
        // Identity view leaves the light where it is.
        let identity = scene_uniforms(Mat4::IDENTITY, Mat4::IDENTITY);
        assert_eq!(identity.light_eye, [0.0, 10.0, 5.0, 1.0]);

        // Pushing the camera back shifts the light's eye-space Z.
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -4.0));
        let shifted = scene_uniforms(Mat4::IDENTITY, view);
        assert_eq!(shifted.light_eye, [0.0, 10.0, 1.0, 1.0]);
    }

    #[test]
    fn perspective_guards_degenerate_sizes() {
        let matrix = perspective(0, 0);
        assert!(matrix.to_cols_array().iter().all(|v| v.is_finite()));
    }
}
