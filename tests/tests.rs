use std::collections::HashSet;

use quickcheck_macros::quickcheck;
use rand::{Rng, SeedableRng};

use diskmc::{
    diskmc::{DiskMc, RunOutcome},
    diskmc_from_config,
    geometry::periodic_dist_sq,
    grid::CellGrid,
    init,
    overlap::has_overlap,
    particle::Particle,
    InputParams, Prng,
};

const TEST_EPSILON: f64 = 1e-9;

fn columns(particles: &[Particle]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let xs = particles.iter().map(|p| p.x()).collect();
    let ys = particles.iter().map(|p| p.y()).collect();
    let radii = particles.iter().map(|p| p.radius()).collect();
    (xs, ys, radii)
}

fn brute_force_overlap(particles: &[Particle], width: f64, height: f64) -> bool {
    for (k, a) in particles.iter().enumerate() {
        for b in &particles[k + 1..] {
            let d2 = periodic_dist_sq(a.x(), a.y(), b.x(), b.y(), width, height);
            let r = a.radius() + b.radius();
            if d2 < r * r {
                return true;
            }
        }
    }
    false
}

fn grid_overlap(particles: &[Particle], width: f64, height: f64, grid_size: f64) -> bool {
    let (xs, ys, radii) = columns(particles);
    let cells_x = (width / grid_size).ceil() as usize;
    let cells_y = (height / grid_size).ceil() as usize;
    let grid = CellGrid::build(&xs, &ys, grid_size, cells_x, cells_y);
    has_overlap(&xs, &ys, &radii, &grid, width, height)
}

// four disks of radius 1 at the corners of a 10x10 torus; each pair of
// lattice neighbors sits at exact tangency through the boundary
fn corner_system(move_step: f64) -> DiskMc {
    let particles = vec![
        Particle::from_xy(1.0, 1.0, 1.0),
        Particle::from_xy(1.0, 9.0, 1.0),
        Particle::from_xy(9.0, 1.0, 1.0),
        Particle::from_xy(9.0, 9.0, 1.0),
    ];
    DiskMc::new(&particles, 10.0, 10.0, move_step, 5.0).unwrap()
}

#[test]
fn periodic_distance_picks_shorter_image() {
    // direct separation 8, wrapped separation 2
    let d2 = periodic_dist_sq(1.0, 1.0, 9.0, 1.0, 10.0, 10.0);
    assert!((d2 - 4.0).abs() < TEST_EPSILON);

    // both axes wrap
    let d2 = periodic_dist_sq(0.5, 0.5, 9.5, 9.5, 10.0, 10.0);
    assert!((d2 - 2.0).abs() < TEST_EPSILON);

    // no wrap when the direct image is shorter
    let d2 = periodic_dist_sq(2.0, 2.0, 5.0, 6.0, 10.0, 10.0);
    assert!((d2 - 25.0).abs() < TEST_EPSILON);
}

#[test]
fn periodic_distance_translation_invariant() {
    let (width, height) = (7.5, 12.25);
    let points = [(0.3, 1.7), (6.9, 0.1), (3.25, 11.9), (7.49, 12.24)];
    for &(x1, y1) in &points {
        for &(x2, y2) in &points {
            let base = periodic_dist_sq(x1, y1, x2, y2, width, height);
            for k in [-3.0, -1.0, 1.0, 2.0] {
                let dx = periodic_dist_sq(x1 + k * width, y1, x2, y2, width, height);
                let dy = periodic_dist_sq(x1, y1, x2, y2 + k * height, width, height);
                assert!((dx - base).abs() < 1e-6);
                assert!((dy - base).abs() < 1e-6);
            }
        }
    }
}

#[test]
fn tangent_disks_are_not_overlapping() {
    let particles = vec![
        Particle::from_xy(1.0, 5.0, 1.0),
        Particle::from_xy(3.0, 5.0, 1.0),
    ];
    // distance^2 == (r1 + r2)^2 exactly; strict inequality means free
    assert!(!grid_overlap(&particles, 10.0, 10.0, 2.0));

    let particles = vec![
        Particle::from_xy(1.0, 5.0, 1.0),
        Particle::from_xy(2.999, 5.0, 1.0),
    ];
    assert!(grid_overlap(&particles, 10.0, 10.0, 2.0));
}

#[test]
fn overlap_detected_across_boundary() {
    // separated by 9.8 directly, 0.2 through the wrap
    let particles = vec![
        Particle::from_xy(0.1, 5.0, 0.5),
        Particle::from_xy(9.9, 5.0, 0.5),
    ];
    assert!(grid_overlap(&particles, 10.0, 10.0, 2.0));

    // same geometry on the y axis
    let particles = vec![
        Particle::from_xy(5.0, 0.1, 0.5),
        Particle::from_xy(5.0, 9.9, 0.5),
    ];
    assert!(grid_overlap(&particles, 10.0, 10.0, 2.0));
}

#[test]
fn grid_buckets_every_particle_exactly_once() {
    let mut rng = Prng::seed_from_u64(7);
    let particles = init::random_placement(200, 50.0, 30.0, 0.5, &mut rng);
    let (xs, ys, _) = columns(&particles);

    let grid = CellGrid::build(&xs, &ys, 2.5, 20, 12);
    assert_eq!(grid.num_tenants(), particles.len());

    let mut seen = HashSet::new();
    for cell in 0..grid.num_cells() {
        for &tenant in grid.tenants_of(cell) {
            assert!(seen.insert(tenant), "particle {tenant} bucketed twice");
            assert!((tenant as usize) < particles.len());
        }
    }
    assert_eq!(seen.len(), particles.len());
}

#[test]
fn grid_wraps_positions_at_the_domain_edge() {
    // x == width lands in column 0, not out of range
    let xs = [10.0, 9.99];
    let ys = [10.0, 0.0];
    let grid = CellGrid::build(&xs, &ys, 5.0, 2, 2);
    let edge_cell = grid.wrapped_cell(0, 0);
    assert!(grid.tenants_of(edge_cell).contains(&0));
    let last_cell = grid.wrapped_cell(1, 0);
    assert!(grid.tenants_of(last_cell).contains(&1));
}

#[test]
fn detector_is_invariant_under_index_permutation() {
    let mut rng = Prng::seed_from_u64(21);
    let mut particles = init::random_placement(150, 40.0, 40.0, 0.5, &mut rng);

    assert!(!grid_overlap(&particles, 40.0, 40.0, 2.0));
    particles.reverse();
    assert!(!grid_overlap(&particles, 40.0, 40.0, 2.0));

    // inject an overlapping pair and permute again
    let p0 = particles[0];
    particles.push(Particle::from_xy(p0.x() + 0.3, p0.y(), 0.5));
    assert!(grid_overlap(&particles, 40.0, 40.0, 2.0));
    particles.reverse();
    assert!(grid_overlap(&particles, 40.0, 40.0, 2.0));
}

#[test]
fn rejected_moves_leave_positions_bit_identical() {
    // tangent lattice: any nonzero collective displacement is very likely to
    // collide, and either branch of the outcome must hold exactly
    let particles = init::grid_placement(25, 10.0, 10.0, 1.0);
    let mut sim = DiskMc::new(&particles, 10.0, 10.0, 0.5, 2.0).unwrap();
    let mut rng = Prng::seed_from_u64(3);

    for attempt in 1u64..=20 {
        let before = sim.particles();
        let accepts_before = sim.success_count();
        let accepted = sim.attempt_move(&mut rng);
        assert_eq!(sim.total_tries(), attempt);
        if accepted {
            assert_eq!(sim.success_count(), accepts_before + 1);
        } else {
            assert_eq!(sim.success_count(), accepts_before);
            assert_eq!(sim.particles(), before);
        }
    }
}

#[test]
fn zero_step_moves_always_accept() {
    let mut sim = corner_system(0.0);
    let mut rng = Prng::seed_from_u64(42);

    let before = sim.particles();
    for i in 1u64..=50 {
        assert!(sim.attempt_move(&mut rng));
        assert_eq!(sim.success_count(), i);
        assert_eq!(sim.total_tries(), i);
    }
    assert_eq!(sim.particles(), before);
    assert!((sim.acceptance_ratio() - 1.0).abs() < TEST_EPSILON);
}

#[test]
fn acceptance_ratio_is_zero_without_attempts_and_bounded_after() {
    let mut sim = corner_system(0.5);
    assert_eq!(sim.acceptance_ratio(), 0.0);

    let mut rng = Prng::seed_from_u64(11);
    for _ in 0..30 {
        sim.attempt_move(&mut rng);
        let ratio = sim.acceptance_ratio();
        assert!((0.0..=1.0).contains(&ratio));
    }

    sim.reset_stats();
    assert_eq!(sim.total_tries(), 0);
    assert_eq!(sim.success_count(), 0);
    assert_eq!(sim.acceptance_ratio(), 0.0);
}

#[test]
fn insertion_success_is_monotone_in_probe_radius() {
    let sim = corner_system(0.0);
    let mut last = u64::MAX;
    for probe_radius in [0.0, 0.25, 0.5, 1.0, 2.0, 3.0] {
        let mut rng = Prng::seed_from_u64(123);
        let free = sim.test_insertions(2000, probe_radius, &mut rng);
        assert!(free <= last, "free count grew with probe radius");
        last = free;
    }
}

#[test]
fn single_particle_insertions_match_replayed_draws() {
    let particles = vec![Particle::from_xy(5.0, 5.0, 1.0)];
    let sim = DiskMc::new(&particles, 10.0, 10.0, 0.1, 2.0).unwrap();

    let num_tests = 1000;
    let probe_radius = 0.7;
    let mut rng = Prng::seed_from_u64(99);
    let free = sim.test_insertions(num_tests, probe_radius, &mut rng);

    // replay the identical draw sequence: x then y per trial
    let mut rng = Prng::seed_from_u64(99);
    let exclusion = probe_radius + 1.0;
    let mut expected = 0u64;
    for _ in 0..num_tests {
        let x: f64 = rng.random_range(0.0..10.0);
        let y: f64 = rng.random_range(0.0..10.0);
        if periodic_dist_sq(x, y, 5.0, 5.0, 10.0, 10.0) >= exclusion * exclusion {
            expected += 1;
        }
    }
    assert_eq!(free, expected);
}

#[test]
fn run_until_success_reports_particles_and_ratio() {
    let mut sim = corner_system(0.0);
    let mut rng = Prng::seed_from_u64(5);

    let (particles, ratio) = sim.run_until_success(20, false, &mut rng);
    assert_eq!(particles.len(), 4);
    assert_eq!(sim.success_count(), 20);
    assert!((ratio - 1.0).abs() < TEST_EPSILON);

    // counters continue monotonically unless reset is requested
    let (_, ratio) = sim.run_until_success(25, false, &mut rng);
    assert_eq!(sim.success_count(), 25);
    assert!((0.0..=1.0).contains(&ratio));
}

#[test]
fn bounded_runs_report_exhaustion_instead_of_hanging() {
    let mut sim = corner_system(0.0);
    let mut rng = Prng::seed_from_u64(17);

    // every attempt accepts, but 3 attempts can never reach 10 successes
    let outcome = sim.run_steps_bounded(10, 3, false, &mut rng);
    assert_eq!(outcome, RunOutcome::AttemptsExhausted);
    assert_eq!(sim.success_count(), 3);

    let outcome = sim.run_steps_bounded(10, 100, false, &mut rng);
    assert_eq!(outcome, RunOutcome::TargetReached);
    assert_eq!(sim.success_count(), 10);

    // already-satisfied targets return without attempting anything
    let tries = sim.total_tries();
    let outcome = sim.run_steps_bounded(0, 0, false, &mut rng);
    assert_eq!(outcome, RunOutcome::TargetReached);
    assert_eq!(sim.total_tries(), tries);
}

#[test]
fn random_placement_returns_partial_result_when_overfull() {
    let mut rng = Prng::seed_from_u64(31);
    // ~6 disks of radius 2 fit in a 10x10 torus; 50 cannot
    let particles = init::random_placement(50, 10.0, 10.0, 2.0, &mut rng);
    assert!(!particles.is_empty());
    assert!(particles.len() < 50);
    assert!(!brute_force_overlap(&particles, 10.0, 10.0));

    // the engine accepts the smaller-than-requested configuration
    let sim = DiskMc::new(&particles, 10.0, 10.0, 0.05, 4.0).unwrap();
    assert_eq!(sim.num_particles(), particles.len());
}

#[test]
fn grid_placement_produces_tangent_free_lattice() {
    let particles = init::grid_placement(25, 10.0, 10.0, 1.0);
    assert_eq!(particles.len(), 25);
    // spacing is exactly one diameter: tangent everywhere, overlapping nowhere
    assert!(!brute_force_overlap(&particles, 10.0, 10.0));
}

#[test]
fn xyz_frames_round_trip_through_the_reader() {
    let mut sim = corner_system(0.0);
    let path = std::env::temp_dir().join("diskmc_roundtrip.xyz");
    let path = path.to_str().unwrap().to_string();

    let mut writer = diskmc::io::XYZWriter::new(&path);
    writer.write_frame(&sim);
    let mut rng = Prng::seed_from_u64(2);
    sim.attempt_move(&mut rng);
    writer.write_frame(&sim);
    drop(writer);

    // two frames of four particles each, headers skipped
    let read_back = diskmc::io::read_xyz_snapshot(&path);
    assert_eq!(read_back.len(), 8);
    assert_eq!(&read_back[4..], sim.particles().as_slice());
}

#[test]
fn construction_rejects_degenerate_geometry() {
    let particles = vec![Particle::from_xy(1.0, 1.0, 0.5)];
    assert!(DiskMc::new(&particles, 0.0, 10.0, 0.1, 1.0).is_err());
    assert!(DiskMc::new(&particles, 10.0, -1.0, 0.1, 1.0).is_err());
    assert!(DiskMc::new(&particles, 10.0, 10.0, 0.1, 0.0).is_err());
    assert!(DiskMc::new(&particles, 10.0, 10.0, -0.1, 1.0).is_err());
    assert!(DiskMc::new(&particles, 10.0, 10.0, f64::NAN, 1.0).is_err());
    assert!(DiskMc::new(&particles, 10.0, 10.0, 0.1, f64::INFINITY).is_err());
}

#[quickcheck]
fn qc_initial_configurations_are_overlap_free(ip: InputParams) -> bool {
    let mut rng = Prng::seed_from_u64(1337);
    let sim = match diskmc_from_config(&ip, &mut rng) {
        Ok(sim) => sim,
        Err(_) => return false,
    };
    let particles = sim.particles();
    particles.len() <= ip.num_particles
        && !brute_force_overlap(&particles, sim.width(), sim.height())
}

#[quickcheck]
fn qc_detector_agrees_with_brute_force(ip: InputParams) -> bool {
    let mut rng = Prng::seed_from_u64(7331);
    let extent = ip.box_extent();
    let particles =
        init::random_placement(ip.num_particles, extent, extent, ip.particle_radius, &mut rng);

    // grid answer must match the reference pairwise sweep, on the clean
    // configuration and after squeezing one intruder in
    let mut particles = particles;
    if grid_overlap(&particles, extent, extent, ip.grid_size)
        != brute_force_overlap(&particles, extent, extent)
    {
        return false;
    }
    let p0 = particles[0];
    particles.push(Particle::from_xy(
        (p0.x() + 0.5 * p0.radius()) % extent,
        p0.y(),
        p0.radius(),
    ));
    grid_overlap(&particles, extent, extent, ip.grid_size)
        == brute_force_overlap(&particles, extent, extent)
}

#[quickcheck]
fn qc_acceptance_ratio_stays_in_unit_interval(ip: InputParams) -> bool {
    let mut rng = Prng::seed_from_u64(555);
    let mut sim = match diskmc_from_config(&ip, &mut rng) {
        Ok(sim) => sim,
        Err(_) => return false,
    };
    for _ in 0..20 {
        sim.attempt_move(&mut rng);
    }
    let ratio = sim.acceptance_ratio();
    (0.0..=1.0).contains(&ratio) && sim.total_tries() == 20 && sim.success_count() <= 20
}
