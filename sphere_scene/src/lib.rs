//! Scene model for the sphere-world demo. Everything here is plain CPU
//! data: the first-person camera rig, the procedural floor/torus/sphere
//! geometry, and the layout/animation rules that position the sphere field
//! and the orbiters each frame. The viewer crate owns all GPU state and
//! only consumes what this crate produces.

pub mod camera;
pub mod geometry;
pub mod layout;

pub use camera::CameraRig;
pub use geometry::{
    GeometryError, GridVertex, MeshData, MeshVertex, build_floor_grid, build_sphere, build_torus,
};
pub use layout::{
    DEFAULT_SEED, FLOOR_COLOR, LIGHT_POSITION, ORBITER_COUNT, ORBIT_RADIUS, SPHERE_COLOR,
    SPHERE_COUNT, SceneClock, SceneLayout, TORUS_COLOR, TORUS_OFFSET, orbiter_transforms,
    torus_spin_degrees, torus_transform,
};
