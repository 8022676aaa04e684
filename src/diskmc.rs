//! Collective-move hard-disk Monte Carlo engine.
//!
//! One step proposes a fresh random displacement for every particle at once,
//! rebuilds the cell grid for the proposal, and accepts or rejects the whole
//! configuration on a single global overlap verdict. This is deliberately
//! not a per-particle Metropolis scheme: a proposal either replaces all
//! positions or none of them.

use std::f64::consts::TAU;

use anyhow::{ensure, Result};
use rand::Rng;

use crate::grid::CellGrid;
use crate::overlap::has_overlap;
use crate::particle::Particle;
use crate::probe::count_free_insertions;
use crate::stats::MoveStats;
use crate::Prng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    TargetReached,
    AttemptsExhausted,
}

pub struct DiskMc {
    // column-wise particle storage; index i is one particle across all three
    xs: Vec<f64>,
    ys: Vec<f64>,
    radii: Vec<f64>,

    width: f64,
    height: f64,
    move_step: f64,
    grid_size: f64,
    cells_x: usize,
    cells_y: usize,

    stats: MoveStats,
}

impl DiskMc {
    /// Builds a system from a particle list. Fails fast on degenerate
    /// geometry; does not verify that the supplied particles are
    /// overlap-free (the initializer's job).
    pub fn new(
        particles: &[Particle],
        width: f64,
        height: f64,
        move_step: f64,
        grid_size: f64,
    ) -> Result<Self> {
        ensure!(
            width > 0.0 && width.is_finite(),
            "box width must be positive and finite, got {width}"
        );
        ensure!(
            height > 0.0 && height.is_finite(),
            "box height must be positive and finite, got {height}"
        );
        ensure!(
            grid_size > 0.0 && grid_size.is_finite(),
            "grid size must be positive and finite, got {grid_size}"
        );
        ensure!(
            move_step >= 0.0 && move_step.is_finite(),
            "move step must be non-negative and finite, got {move_step}"
        );

        let cells_x = (width / grid_size).ceil() as usize;
        let cells_y = (height / grid_size).ceil() as usize;
        ensure!(
            cells_x > 0 && cells_y > 0,
            "grid size {grid_size} collapses a {width}x{height} box to zero cells"
        );

        let mut xs = Vec::with_capacity(particles.len());
        let mut ys = Vec::with_capacity(particles.len());
        let mut radii = Vec::with_capacity(particles.len());
        for p in particles {
            xs.push(p.x());
            ys.push(p.y());
            radii.push(p.radius());
        }

        let max_radius = radii.iter().cloned().fold(0.0_f64, f64::max);
        let cell_edge = (width / cells_x as f64).min(height / cells_y as f64);
        if cell_edge < 2.0 * max_radius {
            log::warn!(
                "cell edge {cell_edge:.4} is smaller than the largest disk diameter {:.4}; \
                 the neighborhood search can miss overlaps",
                2.0 * max_radius
            );
        }

        Ok(Self {
            xs,
            ys,
            radii,
            width,
            height,
            move_step,
            grid_size,
            cells_x,
            cells_y,
            stats: MoveStats::new(),
        })
    }

    pub fn num_particles(&self) -> usize {
        self.xs.len()
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn move_step(&self) -> f64 {
        self.move_step
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    pub fn stats(&self) -> MoveStats {
        self.stats
    }

    pub fn total_tries(&self) -> u64 {
        self.stats.num_attempts()
    }

    pub fn success_count(&self) -> u64 {
        self.stats.num_accepts()
    }

    pub fn acceptance_ratio(&self) -> f64 {
        self.stats.acceptance_ratio()
    }

    pub fn reset_stats(&mut self) {
        self.stats = MoveStats::new();
    }

    /// Current configuration as a particle list.
    pub fn particles(&self) -> Vec<Particle> {
        (0..self.num_particles())
            .map(|i| Particle::from_xy(self.xs[i], self.ys[i], self.radii[i]))
            .collect()
    }

    /// Radial displacement: angle uniform over the circle, magnitude uniform
    /// in [0, move_step). Magnitude is uniform in radius, not in area; the
    /// proposal density is therefore peaked toward small displacements.
    fn propose_positions(&self, rng: &mut Prng) -> (Vec<f64>, Vec<f64>) {
        let n = self.num_particles();
        let mut new_xs = Vec::with_capacity(n);
        let mut new_ys = Vec::with_capacity(n);
        for i in 0..n {
            let angle = rng.random::<f64>() * TAU;
            let dist = rng.random::<f64>() * self.move_step;
            new_xs.push((self.xs[i] + dist * angle.cos()).rem_euclid(self.width));
            new_ys.push((self.ys[i] + dist * angle.sin()).rem_euclid(self.height));
        }
        (new_xs, new_ys)
    }

    /// One collective Monte Carlo step. Returns true iff the proposal was
    /// accepted; positions are untouched on rejection. The attempt counter
    /// bumps either way.
    pub fn attempt_move(&mut self, rng: &mut Prng) -> bool {
        let (new_xs, new_ys) = self.propose_positions(rng);
        let grid = CellGrid::build(&new_xs, &new_ys, self.grid_size, self.cells_x, self.cells_y);
        let overlap = has_overlap(
            &new_xs,
            &new_ys,
            &self.radii,
            &grid,
            self.width,
            self.height,
        );

        self.stats.record_attempt();
        if overlap {
            return false;
        }
        self.xs = new_xs;
        self.ys = new_ys;
        self.stats.record_accept();
        true
    }

    /// Attempts moves until the accept counter reaches `target_success`.
    /// Unbounded: a packing dense enough that nothing is ever accepted will
    /// spin forever. Use `run_steps_bounded` when that matters.
    pub fn run_steps(&mut self, target_success: u64, reset: bool, rng: &mut Prng) {
        if reset {
            self.reset_stats();
        }
        while self.stats.num_accepts() < target_success {
            self.attempt_move(rng);
            if self.stats.num_attempts() % 1000 == 0 {
                log::debug!(
                    "progress: {}/{} accepted moves after {} attempts",
                    self.stats.num_accepts(),
                    target_success,
                    self.stats.num_attempts()
                );
            }
        }
    }

    /// Like `run_steps`, but gives up after `max_attempts` attempts within
    /// this call and reports it instead of hanging.
    pub fn run_steps_bounded(
        &mut self,
        target_success: u64,
        max_attempts: u64,
        reset: bool,
        rng: &mut Prng,
    ) -> RunOutcome {
        if reset {
            self.reset_stats();
        }
        let mut attempts = 0;
        while self.stats.num_accepts() < target_success {
            if attempts >= max_attempts {
                return RunOutcome::AttemptsExhausted;
            }
            self.attempt_move(rng);
            attempts += 1;
        }
        RunOutcome::TargetReached
    }

    /// Runs to the target and hands back the final particle list along with
    /// the overall acceptance ratio.
    pub fn run_until_success(
        &mut self,
        target_success: u64,
        reset: bool,
        rng: &mut Prng,
    ) -> (Vec<Particle>, f64) {
        self.run_steps(target_success, reset, rng);
        (self.particles(), self.acceptance_ratio())
    }

    /// Free-volume probe: counts overlap-free random insertions of a trial
    /// disk with `probe_radius`. Leaves the configuration untouched.
    pub fn test_insertions(&self, num_tests: usize, probe_radius: f64, rng: &mut Prng) -> u64 {
        count_free_insertions(
            &self.xs,
            &self.ys,
            &self.radii,
            self.width,
            self.height,
            num_tests,
            probe_radius,
            rng,
        )
    }
}
