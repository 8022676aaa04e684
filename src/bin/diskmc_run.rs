use std::fs::{self, create_dir_all};

use clap::Parser;
use rand::SeedableRng;

use diskmc::cli::DiskMcConfig;
use diskmc::diskmc::DiskMc;
use diskmc::io::{clear_out_files, write_json_snapshot, write_stats, XYZWriter};
use diskmc::stats::{InsertionStats, MoveStats};
use diskmc::{diskmc_from_config, run_diskmc, CycleCallback, InputParams, Prng};

struct StdCallback {
    writer: Box<XYZWriter>,
    print_every: usize,
}

impl CycleCallback for StdCallback {
    fn run(&mut self, sim: &DiskMc, cycle: usize, moves: &MoveStats, insertions: &InsertionStats) {
        self.writer.write_frame(sim);

        if (cycle + 1) % self.print_every != 0 {
            return;
        }
        println!("-----------------------------------------\nCycle {:?}", cycle + 1);
        println!("# of particles: {:?}", sim.num_particles());
        println!(
            "Accepted moves: {:?}/{:?} attempts this cycle",
            moves.num_accepts(),
            moves.num_attempts()
        );
        println!("Acceptance ratio (overall): {:.4}", sim.acceptance_ratio());
        println!(
            "Free insertions: {:?}/{:?} (p = {:.4})",
            insertions.num_free(),
            insertions.num_trials(),
            insertions.probability()
        );
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Get commandline arguments
    let config = DiskMcConfig::parse();

    let ip: InputParams = if !config.input().is_empty() {
        let contents = fs::read_to_string(config.input())?;
        toml::from_str(&contents)?
    } else {
        InputParams::default()
    };
    ip.check();

    // Seed the rng
    let seed = config.seed();
    println!("Using seed = {:?}", seed);
    let mut rng = Prng::seed_from_u64(seed);

    // Generate the simulator
    let mut sim = diskmc_from_config(&ip, &mut rng)?;
    println!(
        "Initialized {} particles in a {:.3} x {:.3} box",
        sim.num_particles(),
        sim.width(),
        sim.height()
    );

    // Init I/O
    println!("Writing output to {}", config.output_dir());
    let out_path = std::path::Path::new(config.output_dir());
    create_dir_all(out_path)?;
    clear_out_files(&config)?;

    // dump full config toml to output directory
    let toml = toml::to_string(&ip)?;
    fs::write(config.toml(), toml)?;

    let mut writer = Box::new(XYZWriter::new(&config.trajectory()));
    writer.write_frame(&sim);

    // Run the simulation
    let print_every = (ip.cycles / 10).max(1);
    let callback = StdCallback { writer, print_every };
    let summary = run_diskmc(&mut sim, &ip, Some(Box::new(callback)), &mut rng);

    println!(
        "\nFinal insertion probability: {:.2}% ({}/{})",
        summary.insertions.probability() * 100.0,
        summary.insertions.num_free(),
        summary.insertions.num_trials()
    );
    println!(
        "Final acceptance ratio: {:.4} ({}/{})",
        summary.moves.acceptance_ratio(),
        summary.moves.num_accepts(),
        summary.moves.num_attempts()
    );

    // Persist final state
    write_json_snapshot(&sim, &config.snapshot())?;
    write_stats(&summary, &config.stats())?;

    Ok(())
}
