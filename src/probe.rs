//! Random-insertion probe.
//!
//! Deliberately brute force: every trial point is tested against every
//! particle, no grid. This is the reference measurement of free volume, and
//! its cost (`num_tests * num_particles` distance checks) is accepted so the
//! result never depends on grid geometry.

use rayon::prelude::*;

use crate::geometry::disks_overlap;
use crate::Prng;
use rand::Rng;

/// Counts how many of `num_tests` random trial disks of `probe_radius` land
/// without overlapping any existing particle.
///
/// Trial points are drawn sequentially from `rng` (x then y per trial), so a
/// seeded run is reproducible; the per-trial checks then reduce in parallel
/// with a commutative count. Does not mutate the configuration.
pub fn count_free_insertions(
    xs: &[f64],
    ys: &[f64],
    radii: &[f64],
    width: f64,
    height: f64,
    num_tests: usize,
    probe_radius: f64,
    rng: &mut Prng,
) -> u64 {
    let trials: Vec<(f64, f64)> = (0..num_tests)
        .map(|_| {
            let x: f64 = rng.random_range(0.0..width);
            let y: f64 = rng.random_range(0.0..height);
            (x, y)
        })
        .collect();

    trials
        .par_iter()
        .filter(|&&(tx, ty)| !hits_any_particle(tx, ty, probe_radius, xs, ys, radii, width, height))
        .count() as u64
}

fn hits_any_particle(
    tx: f64,
    ty: f64,
    probe_radius: f64,
    xs: &[f64],
    ys: &[f64],
    radii: &[f64],
    width: f64,
    height: f64,
) -> bool {
    (0..xs.len()).any(|i| {
        disks_overlap(
            tx, ty, probe_radius, xs[i], ys[i], radii[i], width, height,
        )
    })
}
