//! Body state and the fixed nine-body initial system.
//!
//! Body 0 is the central mass, pinned at the origin with zero velocity.
//! Bodies 1..8 start at a fixed orbital distance, rotated by an angle drawn
//! from a seeded generator so every run (and every strategy) starts from the
//! same snapshot.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Number of bodies in every snapshot.
pub const N_BODIES: usize = 9;

/// Seed used for the initial orbital angles.
pub const DEFAULT_SEED: u64 = 1;

/// A single simulated body.
///
/// Only `x`, `y`, `vx` and `vy` evolve; mass, radius and colour are fixed at
/// initialization. A `pinned` body attracts the others but never moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Body {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub mass: f64,
    pub radius: f64,
    /// Display scale applied to `radius` when rendering.
    pub radius_scale: f64,
    pub color: [u8; 3],
    pub pinned: bool,
}

/// One full system state.
pub type Bodies = [Body; N_BODIES];

/// (orbital distance, radial speed coefficient, mass, radius, radius scale, colour)
const TEMPLATE: [(f64, f64, f64, f64, f64, [u8; 3]); N_BODIES] = [
    (0.00, 0.000, 1.0, 0.00465047, 5.0e2, [255, 204, 0]),
    (0.39, 0.323, 1.65e-7, 1.765e-5, 10.0e3, [169, 169, 169]),
    (0.72, 0.218, 2.45e-6, 4.552e-5, 10.0e3, [255, 204, 153]),
    (1.00, 0.170, 3.00e-6, 4.258e-5, 10.0e3, [0, 102, 204]),
    (1.52, 0.128, 3.21e-7, 2.279e-5, 10.0e3, [255, 102, 0]),
    (5.20, 0.060, 9.55e-4, 4.7789e-4, 5.0e3, [204, 153, 102]),
    (9.58, 0.043, 2.86e-4, 4.0072e-4, 5.0e3, [210, 180, 140]),
    (19.22, 0.030, 4.36e-5, 1.6938e-4, 5.0e3, [173, 216, 230]),
    (30.05, 0.024, 5.17e-5, 1.6418e-4, 5.0e3, [0, 0, 128]),
];

impl Body {
    /// A body at rest at the origin with no mass. Used to fill freshly
    /// allocated snapshots before the first integration overwrites them.
    pub const fn empty() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            mass: 0.0,
            radius: 0.0,
            radius_scale: 0.0,
            color: [0, 0, 0],
            pinned: false,
        }
    }
}

/// Build the initial system using [`DEFAULT_SEED`].
pub fn initial_bodies() -> Bodies {
    initial_bodies_seeded(DEFAULT_SEED)
}

/// Build the initial system, drawing the orbital angles from `seed`.
pub fn initial_bodies_seeded(seed: u64) -> Bodies {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bodies = [Body::empty(); N_BODIES];

    for (i, &(dist, rot_speed, mass, radius, radius_scale, color)) in TEMPLATE.iter().enumerate() {
        let body = &mut bodies[i];
        body.mass = mass;
        body.radius = radius;
        body.radius_scale = radius_scale;
        body.color = color;

        if i == 0 {
            body.pinned = true;
            continue;
        }

        let angle = 2.0 * std::f64::consts::PI * rng.gen::<f64>();
        body.x = dist * angle.cos();
        body.y = dist * angle.sin();
        body.vx = -rot_speed * body.y;
        body.vy = rot_speed * body.x;
    }

    bodies
}
