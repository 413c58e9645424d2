use bytemuck::{Pod, Zeroable};

/// Flat-color line shader for the floor grid.
pub(crate) const GRID_SHADER_SOURCE: &str = r#"
struct GridUniforms {
    mvp: mat4x4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> grid: GridUniforms;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return grid.mvp * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return grid.color;
}
"#;

/// Instanced diffuse point-light shader for the torus and every sphere.
/// Lighting runs in eye space against a light position the CPU transforms
/// each frame.
pub(crate) const MESH_SHADER_SOURCE: &str = r#"
struct SceneUniforms {
    view_projection: mat4x4<f32>,
    view: mat4x4<f32>,
    light_eye: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> scene: SceneUniforms;

struct VertexIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VertexOut {
    @builtin(position) position: vec4<f32>,
    @location(0) eye_position: vec3<f32>,
    @location(1) eye_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

@vertex
fn vs_main(input: VertexIn) -> VertexOut {
    let model = mat4x4<f32>(input.model_0, input.model_1, input.model_2, input.model_3);
    let world = model * vec4<f32>(input.position, 1.0);

    var out: VertexOut;
    out.position = scene.view_projection * world;
    out.eye_position = (scene.view * world).xyz;
    out.eye_normal = (scene.view * model * vec4<f32>(input.normal, 0.0)).xyz;
    out.color = input.color;
    return out;
}

@fragment
fn fs_main(input: VertexOut) -> @location(0) vec4<f32> {
    let normal = normalize(input.eye_normal);
    let light_dir = normalize(scene.light_eye.xyz - input.eye_position);
    let diffuse = max(dot(normal, light_dir), 0.0);
    let lit = input.color.rgb * (0.08 + 0.92 * diffuse);
    return vec4<f32>(lit, input.color.a);
}
"#;

/// Alpha-blended textured quad for the overlay surface, composited over
/// the finished scene in window space.
pub(crate) const OVERLAY_SHADER_SOURCE: &str = r#"
struct VertexIn {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
};

struct VertexOut {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(input: VertexIn) -> VertexOut {
    var out: VertexOut;
    out.position = vec4<f32>(input.position, 0.0, 1.0);
    out.uv = input.uv;
    return out;
}

@group(0) @binding(0)
var overlay_texture: texture_2d<f32>;
@group(0) @binding(1)
var overlay_sampler: sampler;

@fragment
fn fs_main(input: VertexOut) -> @location(0) vec4<f32> {
    return textureSample(overlay_texture, overlay_sampler, input.uv);
}
"#;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct OverlayVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

/// Full-window quad; the overlay spans the whole surface.
pub(crate) const OVERLAY_VERTICES: [OverlayVertex; 4] = [
    OverlayVertex {
        position: [-1.0, 1.0],
        uv: [0.0, 0.0],
    },
    OverlayVertex {
        position: [1.0, 1.0],
        uv: [1.0, 0.0],
    },
    OverlayVertex {
        position: [-1.0, -1.0],
        uv: [0.0, 1.0],
    },
    OverlayVertex {
        position: [1.0, -1.0],
        uv: [1.0, 1.0],
    },
];

pub(crate) const OVERLAY_INDICES: [u16; 6] = [0, 1, 2, 2, 1, 3];
