//! Procedural primitive meshes for the demo scene. The geometry lives in
//! local space; the viewer positions it with per-instance transforms, so a
//! single torus and a single sphere mesh cover every draw in the scene.

use std::f32::consts::PI;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use thiserror::Error;

const MIN_RING_STEPS: u32 = 3;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("{name} must be positive (got {value})")]
    NonPositiveDimension { name: &'static str, value: f32 },
    #[error("mesh would need {vertices} vertices, more than a u16 index can address")]
    TooManyVertices { vertices: usize },
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct GridVertex {
    pub position: [f32; 3],
}

pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u16>,
}

impl MeshData {
    fn new(vertices: Vec<MeshVertex>, indices: Vec<u16>) -> Self {
        Self { vertices, indices }
    }
}

/// Indexed triangle torus around the +Z axis: `major_radius` is the ring
/// center distance, `minor_radius` the tube radius.
pub fn build_torus(
    major_radius: f32,
    minor_radius: f32,
    major_steps: u32,
    minor_steps: u32,
) -> Result<MeshData, GeometryError> {
    ensure_positive("major_radius", major_radius)?;
    ensure_positive("minor_radius", minor_radius)?;

    let major = major_steps.max(MIN_RING_STEPS);
    let minor = minor_steps.max(MIN_RING_STEPS);
    check_vertex_budget(((major + 1) * (minor + 1)) as usize)?;

    let mut vertices = Vec::with_capacity(((major + 1) * (minor + 1)) as usize);
    let mut indices = Vec::with_capacity((major * minor * 6) as usize);

    for ring in 0..=major {
        let u = ring as f32 / major as f32 * PI * 2.0;
        let (sin_u, cos_u) = u.sin_cos();

        for segment in 0..=minor {
            let v = segment as f32 / minor as f32 * PI * 2.0;
            let (sin_v, cos_v) = v.sin_cos();

            let radial = major_radius + minor_radius * cos_v;
            let normal = Vec3::new(cos_v * cos_u, cos_v * sin_u, sin_v).normalize();
            vertices.push(MeshVertex {
                position: [radial * cos_u, radial * sin_u, minor_radius * sin_v],
                normal: normal.into(),
            });
        }
    }

    let stride = (minor + 1) as usize;
    for ring in 0..major as usize {
        for segment in 0..minor as usize {
            let current = ring * stride + segment;
            let next = current + stride;
            indices.push(current as u16);
            indices.push(next as u16);
            indices.push((current + 1) as u16);

            indices.push((current + 1) as u16);
            indices.push(next as u16);
            indices.push((next + 1) as u16);
        }
    }

    Ok(MeshData::new(vertices, indices))
}

/// UV sphere with `slices` segments around the equator and `stacks`
/// latitude bands.
pub fn build_sphere(radius: f32, slices: u32, stacks: u32) -> Result<MeshData, GeometryError> {
    ensure_positive("radius", radius)?;

    let lon_steps = slices.max(MIN_RING_STEPS * 2);
    let lat_steps = stacks.max(MIN_RING_STEPS);
    check_vertex_budget(((lat_steps + 1) * (lon_steps + 1)) as usize)?;

    let mut vertices = Vec::with_capacity(((lat_steps + 1) * (lon_steps + 1)) as usize);
    let mut indices = Vec::with_capacity((lat_steps * lon_steps * 6) as usize);

    for lat in 0..=lat_steps {
        let theta = lat as f32 / lat_steps as f32 * PI;
        let (sin_theta, cos_theta) = theta.sin_cos();

        for lon in 0..=lon_steps {
            let phi = lon as f32 / lon_steps as f32 * PI * 2.0;
            let (sin_phi, cos_phi) = phi.sin_cos();

            let normal = Vec3::new(sin_theta * cos_phi, cos_theta, sin_theta * sin_phi);
            vertices.push(MeshVertex {
                position: (normal * radius).into(),
                normal: normal.into(),
            });
        }
    }

    let stride = (lon_steps + 1) as usize;
    for lat in 0..lat_steps as usize {
        for lon in 0..lon_steps as usize {
            let current = lat * stride + lon;
            let next = current + stride;
            indices.push(current as u16);
            indices.push(next as u16);
            indices.push((current + 1) as u16);

            indices.push((current + 1) as u16);
            indices.push(next as u16);
            indices.push((next + 1) as u16);
        }
    }

    Ok(MeshData::new(vertices, indices))
}

/// Line-list floor grid at height `y`: one line along Z and one along X for
/// every lattice coordinate in `[-half_extent, half_extent]`.
pub fn build_floor_grid(
    half_extent: f32,
    spacing: f32,
    y: f32,
) -> Result<Vec<GridVertex>, GeometryError> {
    ensure_positive("half_extent", half_extent)?;
    ensure_positive("spacing", spacing)?;

    let steps = (half_extent * 2.0 / spacing).round() as u32;
    let mut vertices = Vec::with_capacity(((steps + 1) * 4) as usize);
    for step in 0..=steps {
        let offset = -half_extent + step as f32 * spacing;

        vertices.push(GridVertex {
            position: [offset, y, half_extent],
        });
        vertices.push(GridVertex {
            position: [offset, y, -half_extent],
        });

        vertices.push(GridVertex {
            position: [half_extent, y, offset],
        });
        vertices.push(GridVertex {
            position: [-half_extent, y, offset],
        });
    }

    Ok(vertices)
}

fn ensure_positive(name: &'static str, value: f32) -> Result<(), GeometryError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::NonPositiveDimension { name, value })
    }
}

fn check_vertex_budget(vertices: usize) -> Result<(), GeometryError> {
    if vertices > u16::MAX as usize {
        Err(GeometryError::TooManyVertices { vertices })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn torus_has_expected_counts() {
        let torus = build_torus(0.4, 0.15, 30, 30).expect("torus");
        assert_eq!(torus.vertices.len(), 31 * 31);
        assert_eq!(torus.indices.len(), 30 * 30 * 6);
        assert!(torus.indices.iter().all(|&idx| (idx as usize) < torus.vertices.len()));
    }

    #[test]
    fn torus_normals_are_unit_length() {
        let torus = build_torus(0.4, 0.15, 12, 12).expect("torus");
        for vertex in &torus.vertices {
            let length = Vec3::from(vertex.normal).length();
            assert!((length - 1.0).abs() < 1e-4, "normal length {length}");
        }
    }

    #[test]
    fn sphere_vertices_sit_on_the_radius() {
        let sphere = build_sphere(0.1, 26, 13).expect("sphere");
        assert_eq!(sphere.vertices.len(), 14 * 27);
        for vertex in &sphere.vertices {
            let distance = Vec3::from(vertex.position).length();
            assert!((distance - 0.1).abs() < 1e-5, "vertex distance {distance}");
        }
    }

    #[test]
    fn degenerate_step_counts_are_clamped() {
        let sphere = build_sphere(1.0, 0, 0).expect("sphere");
        assert!(sphere.vertices.len() >= 4 * 7);
        assert!(!sphere.indices.is_empty());
    }

    #[test]
    fn floor_grid_matches_demo_vertex_count() {
        let grid = build_floor_grid(20.0, 0.5, -0.55).expect("grid");
        assert_eq!(grid.len(), 324);
        assert!(grid.iter().all(|v| (v.position[1] + 0.55).abs() < 1e-6));
        assert!(
            grid.iter()
                .all(|v| v.position[0].abs() <= 20.0 && v.position[2].abs() <= 20.0)
        );
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        assert!(matches!(
            build_torus(0.0, 0.15, 30, 30),
            Err(GeometryError::NonPositiveDimension { name: "major_radius", .. })
        ));
        assert!(matches!(
            build_floor_grid(20.0, -1.0, 0.0),
            Err(GeometryError::NonPositiveDimension { name: "spacing", .. })
        ));
    }

    #[test]
    fn oversized_meshes_are_refused() {
        assert!(matches!(
            build_torus(1.0, 0.5, 300, 300),
            Err(GeometryError::TooManyVertices { .. })
        ));
    }
}
