//! Initial placement generators.
//!
//! Both produce a best-effort non-overlapping particle list for the engine
//! to start from. The engine itself never re-validates this.

use log::warn;

use crate::consts::INIT_ATTEMPTS_PER_PARTICLE;
use crate::geometry::disks_overlap;
use crate::particle::Particle;
use crate::position::random_pos_in_box;
use crate::Prng;

/// Random sequential placement: uniform candidates, rejected on overlap with
/// anything already placed. Gives up after `100 * num` total attempts and
/// returns however many particles fit; callers must tolerate a partial list.
pub fn random_placement(
    num: usize,
    width: f64,
    height: f64,
    radius: f64,
    rng: &mut Prng,
) -> Vec<Particle> {
    let mut particles: Vec<Particle> = Vec::with_capacity(num);
    let max_attempts = num * INIT_ATTEMPTS_PER_PARTICLE;
    let mut attempts = 0;
    while particles.len() < num && attempts < max_attempts {
        let candidate = random_pos_in_box(rng, width, height);
        let free = !particles.iter().any(|p| {
            disks_overlap(
                p.x(),
                p.y(),
                p.radius(),
                candidate.x(),
                candidate.y(),
                radius,
                width,
                height,
            )
        });
        if free {
            particles.push(Particle::new(candidate, radius));
        }
        attempts += 1;
    }
    if particles.len() < num {
        warn!(
            "placed only {}/{} particles after {} attempts",
            particles.len(),
            num,
            max_attempts
        );
    }
    particles
}

/// Deterministic near-square lattice: `ceil(sqrt(num * width / height))`
/// columns, particles centered in the lattice cells, stopping at `num`.
pub fn grid_placement(num: usize, width: f64, height: f64, radius: f64) -> Vec<Particle> {
    if num == 0 {
        return Vec::new();
    }
    let cols = (num as f64 * width / height).sqrt().ceil() as usize;
    let rows = num.div_ceil(cols);
    let spacing_x = width / cols as f64;
    let spacing_y = height / rows as f64;
    if spacing_x < 2.0 * radius || spacing_y < 2.0 * radius {
        warn!(
            "lattice spacing {spacing_x:.4}x{spacing_y:.4} is tighter than one disk \
             diameter; the placed configuration will overlap"
        );
    }

    let mut particles = Vec::with_capacity(num);
    'rows: for i in 0..rows {
        for j in 0..cols {
            if particles.len() >= num {
                break 'rows;
            }
            let x = (j as f64 + 0.5) * spacing_x;
            let y = (i as f64 + 0.5) * spacing_y;
            particles.push(Particle::from_xy(x, y, radius));
        }
    }
    particles
}
