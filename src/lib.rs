use anyhow::Result;
use diskmc::{DiskMc, RunOutcome};
use num_traits::Zero;
use quickcheck::{Arbitrary, Gen};
use serde::{Deserialize, Serialize};
use stats::{InsertionStats, MoveStats};
use std::f64::consts::PI;

use crate::consts::MAX_PARTICLES;

pub mod cli;
pub mod consts;
pub mod diskmc;
pub mod geometry;
pub mod grid;
pub mod init;
pub mod io;
pub mod overlap;
pub mod particle;
pub mod position;
pub mod probe;
pub mod stats;

/// All randomness is drawn from an explicitly threaded generator; there is
/// no global rng anywhere in the crate.
pub type Prng = rand_xoshiro::Xoshiro256StarStar;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct InputParams {
    pub num_particles: usize,
    pub particle_radius: f64,
    /// Fraction of the box area covered by disks; the (square) box extent is
    /// derived from it.
    pub packing_density: f64,
    /// Deterministic lattice start instead of random sequential placement.
    pub ordered_init: bool,

    pub move_step: f64,
    pub grid_size: f64,

    pub cycles: usize,
    pub moves_per_cycle: u64,
    pub insertions_per_cycle: usize,
    pub probe_radius: f64,
    /// Per-cycle attempt budget; `None` runs uncapped, which can spin
    /// forever on packings dense enough that no move is ever accepted.
    pub max_attempts_per_cycle: Option<u64>,
}

impl Default for InputParams {
    fn default() -> Self {
        let num_particles = 1000;
        let particle_radius = 1.0;
        let packing_density = 0.4;
        let ordered_init = false;

        let move_step = 0.01;
        let grid_size = 5.0;

        let cycles = 100;
        let moves_per_cycle = 5;
        let insertions_per_cycle = 1000;
        let probe_radius = 1.0;
        let max_attempts_per_cycle = Some(1_000_000);

        Self {
            num_particles,
            particle_radius,
            packing_density,
            ordered_init,

            move_step,
            grid_size,

            cycles,
            moves_per_cycle,
            insertions_per_cycle,
            probe_radius,
            max_attempts_per_cycle,
        }
    }
}

impl InputParams {
    /// Square box edge such that disk area / box area = packing_density.
    pub fn box_extent(&self) -> f64 {
        (self.num_particles as f64 * PI * self.particle_radius * self.particle_radius
            / self.packing_density)
            .sqrt()
    }

    // assert well-formedness predicate for InputParams
    // Note: can stash all assumptions about layout here
    pub fn check(&self) {
        assert!(self.num_particles >= 1 && self.num_particles <= MAX_PARTICLES);
        assert!(self.particle_radius > 0.0 && self.particle_radius.is_normal());
        // random sequential placement jams well below 0.85 coverage
        assert!(self.packing_density > 0.0 && self.packing_density < 0.85);
        assert!(self.move_step >= 0.0 && (self.move_step.is_normal() || self.move_step.is_zero()));
        assert!(self.grid_size > 0.0 && self.grid_size.is_normal());
        assert!(self.grid_size <= self.box_extent());
        assert!(
            self.probe_radius >= 0.0
                && (self.probe_radius.is_normal() || self.probe_radius.is_zero())
        );
        assert!(self.cycles >= 1);
        assert!(self.moves_per_cycle >= 1);
        assert!(self.insertions_per_cycle >= 1);
    }
}

// for arbitrary trait
fn usize_in_range(g: &mut Gen, min: usize, max: usize) -> usize {
    if min == max {
        return max;
    }
    let x = usize::arbitrary(g);
    let r = x % (max - min) + min;
    assert!(r >= min && r < max);
    r
}

fn f64_in_range(g: &mut Gen, min: f64, max: f64) -> f64 {
    let mut r = f64::INFINITY;
    while !(r.is_normal() || r.is_zero()) {
        let x = f64::arbitrary(g).abs();
        r = x % (max - min) + min;
    }

    assert!(r.is_normal() || r.is_zero());
    assert!(r >= min && r < max);
    r
}

// for testing
impl Arbitrary for InputParams {
    fn arbitrary(g: &mut Gen) -> Self {
        // box extent scales with radius * sqrt(n / density), so with n >= 16
        // and density < 0.45 the extent always fits a >= 2-diameter grid cell
        let num_particles = usize_in_range(g, 16, 256);
        let particle_radius = f64_in_range(g, 0.1, 2.0);
        let packing_density = f64_in_range(g, 0.05, 0.45);
        let ordered_init = bool::arbitrary(g);

        let move_step = f64_in_range(g, 0.0, 0.5) * particle_radius;
        // 3-4 radii keeps the rounded cell edge above one diameter, so the
        // grid detector stays complete for generated configurations
        let grid_size = f64_in_range(g, 3.0, 4.0) * particle_radius;

        let cycles = usize_in_range(g, 1, 4);
        let moves_per_cycle = usize_in_range(g, 1, 5) as u64;
        let insertions_per_cycle = usize_in_range(g, 10, 100);
        let probe_radius = f64_in_range(g, 0.1, 1.0) * particle_radius;
        let max_attempts_per_cycle = Some(100_000);

        Self {
            num_particles,
            particle_radius,
            packing_density,
            ordered_init,

            move_step,
            grid_size,

            cycles,
            moves_per_cycle,
            insertions_per_cycle,
            probe_radius,
            max_attempts_per_cycle,
        }
    }
}

pub fn diskmc_from_config(ip: &InputParams, rng: &mut Prng) -> Result<DiskMc> {
    let extent = ip.box_extent();

    let particles = if ip.ordered_init {
        init::grid_placement(ip.num_particles, extent, extent, ip.particle_radius)
    } else {
        init::random_placement(ip.num_particles, extent, extent, ip.particle_radius, rng)
    };

    DiskMc::new(&particles, extent, extent, ip.move_step, ip.grid_size)
}

pub trait CycleCallback {
    fn run(&mut self, sim: &DiskMc, cycle: usize, moves: &MoveStats, insertions: &InsertionStats);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimSummary {
    pub moves: MoveStats,
    pub insertions: InsertionStats,
}

/// Drives the engine for `ip.cycles` cycles: each cycle pushes the accept
/// counter to its cumulative target of `(cycle + 1) * moves_per_cycle`, then
/// samples the free volume with the insertion probe.
pub fn run_diskmc(
    sim: &mut DiskMc,
    ip: &InputParams,
    mut callback: Option<Box<dyn CycleCallback>>,
    rng: &mut Prng,
) -> SimSummary {
    let mut insertion_totals = InsertionStats::default();
    for cycle in 0..ip.cycles {
        let target = (cycle as u64 + 1) * ip.moves_per_cycle;
        let before = sim.stats();
        let outcome = match ip.max_attempts_per_cycle {
            Some(cap) => sim.run_steps_bounded(target, cap, false, rng),
            None => {
                sim.run_steps(target, false, rng);
                RunOutcome::TargetReached
            }
        };
        let cycle_moves = sim.stats() - before;

        let num_free = sim.test_insertions(ip.insertions_per_cycle, ip.probe_radius, rng);
        let cycle_insertions = InsertionStats::new(ip.insertions_per_cycle as u64, num_free);
        insertion_totals = insertion_totals + cycle_insertions;

        if let Some(ref mut cb) = callback {
            cb.run(sim, cycle, &cycle_moves, &cycle_insertions);
        }

        if outcome == RunOutcome::AttemptsExhausted {
            log::warn!(
                "cycle {cycle}: attempt budget spent before reaching {target} accepted moves, stopping early"
            );
            break;
        }
    }
    SimSummary {
        moves: sim.stats(),
        insertions: insertion_totals,
    }
}
