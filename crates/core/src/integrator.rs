use crate::body::Body;

/// Gravitational constant used by the toy system.
pub const G: f64 = 3e-4;

/// Fixed time step used by every strategy.
pub const DT: f64 = 1.0;

/// Advance `bodies` by one semi-implicit Euler step.
///
/// All velocities are updated first, from accelerations computed against the
/// pre-update positions; positions are then advanced with the new velocities.
/// Pinned bodies contribute to the field but are never moved.
pub fn simulate(bodies: &mut [Body], dt: f64) {
    let n = bodies.len();

    for i in 0..n {
        if bodies[i].pinned {
            continue;
        }
        let mut ax = 0.0;
        let mut ay = 0.0;

        for j in 0..n {
            if i == j {
                continue;
            }
            let dx = bodies[j].x - bodies[i].x;
            let dy = bodies[j].y - bodies[i].y;
            let distance_squared = dx * dx + dy * dy;
            let distance = distance_squared.sqrt();
            let force = (G * bodies[i].mass * bodies[j].mass) / distance_squared;
            ax += force * dx / (distance * bodies[i].mass);
            ay += force * dy / (distance * bodies[i].mass);
        }

        bodies[i].vx += ax * dt;
        bodies[i].vy += ay * dt;
    }

    for body in bodies.iter_mut().filter(|b| !b.pinned) {
        body.x += body.vx * dt;
        body.y += body.vy * dt;
    }
}
