//! Scene layout and animation rules: where the fifty small spheres land,
//! how the torus spins, and where the two orbiters ride. Transform
//! functions are pure in elapsed seconds so the renderer and tests share
//! one clock-independent code path.

use std::time::Instant;

use glam::{Mat4, Vec3};
use rand::{Rng, SeedableRng, rngs::SmallRng};

pub const SPHERE_COUNT: usize = 50;
pub const ORBITER_COUNT: usize = 2;

/// Default placement seed; `--seed` overrides it.
pub const DEFAULT_SEED: u64 = 0x5EED;

pub const FLOOR_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
pub const TORUS_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
pub const SPHERE_COLOR: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

/// World-space light position, pushed into eye space by the renderer every
/// frame.
pub const LIGHT_POSITION: Vec3 = Vec3::new(0.0, 10.0, 5.0);

/// The torus (and the orbit center) sits a short walk ahead of the spawn
/// point.
pub const TORUS_OFFSET: Vec3 = Vec3::new(0.0, 0.0, -2.5);
pub const ORBIT_RADIUS: f32 = 0.8;

const SPIN_DEGREES_PER_SECOND: f32 = 60.0;
const ORBIT_SPIN_FACTOR: f32 = -2.0;
const PLACEMENT_CELLS: i32 = 200;
const PLACEMENT_CELL_SIZE: f32 = 0.1;

/// Static placement of the sphere field.
pub struct SceneLayout {
    pub sphere_origins: Vec<Vec3>,
}

impl SceneLayout {
    /// Fifty origins on the 0.1-unit lattice covering `[-20, 20)` on X and
    /// Z. Deterministic for a given seed.
    pub fn random(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let sphere_origins = (0..SPHERE_COUNT)
            .map(|_| {
                let x = rng.gen_range(-PLACEMENT_CELLS..PLACEMENT_CELLS) as f32
                    * PLACEMENT_CELL_SIZE;
                let z = rng.gen_range(-PLACEMENT_CELLS..PLACEMENT_CELLS) as f32
                    * PLACEMENT_CELL_SIZE;
                Vec3::new(x, 0.0, z)
            })
            .collect();
        Self { sphere_origins }
    }
}

/// Wall-clock timer driving the animation.
pub struct SceneClock {
    started: Instant,
}

impl SceneClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }
}

/// Torus spin angle in degrees: 60°/s of elapsed time.
pub fn torus_spin_degrees(elapsed_secs: f32) -> f32 {
    elapsed_secs * SPIN_DEGREES_PER_SECOND
}

/// Model transform for the spinning torus.
pub fn torus_transform(elapsed_secs: f32) -> Mat4 {
    Mat4::from_translation(TORUS_OFFSET)
        * Mat4::from_rotation_y(torus_spin_degrees(elapsed_secs).to_radians())
}

/// Model transforms for the orbiting spheres. Both ride the same ring
/// around the torus center at twice the spin rate in the opposite
/// direction, half a revolution apart.
pub fn orbiter_transforms(elapsed_secs: f32) -> [Mat4; ORBITER_COUNT] {
    let spin = torus_spin_degrees(elapsed_secs).to_radians();
    let arm = Mat4::from_translation(Vec3::new(ORBIT_RADIUS, 0.0, 0.0));
    core::array::from_fn(|slot| {
        let phase = slot as f32 * std::f32::consts::PI;
        Mat4::from_translation(TORUS_OFFSET)
            * Mat4::from_rotation_y(spin * ORBIT_SPIN_FACTOR + phase)
            * arm
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translation(matrix: Mat4) -> Vec3 {
        matrix.transform_point3(Vec3::ZERO)
    }

    #[test]
    fn placement_is_deterministic_per_seed() {
        let a = SceneLayout::random(7);
        let b = SceneLayout::random(7);
        let c = SceneLayout::random(8);

        assert_eq!(a.sphere_origins.len(), SPHERE_COUNT);
        assert_eq!(a.sphere_origins, b.sphere_origins);
        assert_ne!(a.sphere_origins, c.sphere_origins);
    }

    #[test]
    fn placement_stays_on_the_lattice() {
        let layout = SceneLayout::random(DEFAULT_SEED);
        for origin in &layout.sphere_origins {
            assert_eq!(origin.y, 0.0);
            for value in [origin.x, origin.z] {
                assert!((-20.0..20.0).contains(&value), "out of field: {value}");
                let cells = value / PLACEMENT_CELL_SIZE;
                assert!(
                    (cells - cells.round()).abs() < 1e-3,
                    "{value} is off the 0.1 lattice"
                );
            }
        }
    }

    #[test]
    fn spin_rate_is_sixty_degrees_per_second() {
        assert_eq!(torus_spin_degrees(0.0), 0.0);
        assert_eq!(torus_spin_degrees(1.0), 60.0);
        assert_eq!(torus_spin_degrees(6.0), 360.0);
    }

    #[test]
    fn torus_sits_at_its_offset_while_spinning() {
        for elapsed in [0.0, 0.5, 2.25] {
            let center = translation(torus_transform(elapsed));
            assert!((center - TORUS_OFFSET).length() < 1e-5);
        }
    }

    #[test]
    fn orbiters_start_on_opposite_sides() {
        let [first, second] = orbiter_transforms(0.0);
        let first = translation(first);
        let second = translation(second);

        assert!((first - (TORUS_OFFSET + Vec3::new(ORBIT_RADIUS, 0.0, 0.0))).length() < 1e-5);
        assert!((second - (TORUS_OFFSET - Vec3::new(ORBIT_RADIUS, 0.0, 0.0))).length() < 1e-5);
    }

    #[test]
    fn orbiters_keep_their_ring_radius() {
        for elapsed in [0.1, 1.0, 3.7] {
            for matrix in orbiter_transforms(elapsed) {
                let distance = (translation(matrix) - TORUS_OFFSET).length();
                assert!((distance - ORBIT_RADIUS).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn orbiters_run_counter_to_the_torus_spin() {
        // After 1/8 s the torus has turned +7.5°; the orbiters must have
        // swept -15° from their phase origins.
        let [first, _] = orbiter_transforms(0.125);
        let position = translation(first) - TORUS_OFFSET;
        let angle = position.z.atan2(position.x).to_degrees();
        assert!((angle - 15.0).abs() < 1e-3, "orbit angle {angle}");
    }
}
