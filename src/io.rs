use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};

use anyhow::Result;

use crate::cli::DiskMcConfig;
use crate::diskmc::DiskMc;
use crate::particle::Particle;
use crate::SimSummary;

pub struct XYZWriter {
    file: File,
}

impl XYZWriter {
    pub fn new(p: &str) -> Self {
        let file = File::create(p).unwrap();
        Self { file }
    }

    pub fn write_frame(&mut self, sim: &DiskMc) {
        writeln!(self.file, "{:?}\n", sim.num_particles()).unwrap();
        for p in sim.particles() {
            writeln!(self.file, "{:?} {:?} {:?}", p.x(), p.y(), p.radius()).unwrap();
        }
    }
}

/// Reads particles back from `x y radius` lines; count headers and blank
/// lines between frames are skipped.
pub fn read_xyz_snapshot(path: &str) -> Vec<Particle> {
    let mut particles = Vec::new();

    let file = File::open(path).unwrap();
    let rdr = BufReader::new(file);

    for line in rdr.lines() {
        let line = line.unwrap();
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            continue;
        }
        let x = parts[0].parse::<f64>().unwrap();
        let y = parts[1].parse::<f64>().unwrap();
        let radius = parts[2].parse::<f64>().unwrap();
        particles.push(Particle::from_xy(x, y, radius));
    }

    particles
}

/// Exact-roundtrip JSON snapshot of the final configuration.
pub fn write_json_snapshot(sim: &DiskMc, path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(&sim.particles())?;
    fs::write(path, json)?;
    Ok(())
}

pub fn write_stats(summary: &SimSummary, path: &str) -> Result<()> {
    let mut file = File::create(path)?;
    writeln!(
        file,
        "move attempts: {}\nmoves accepted: {}\nacceptance ratio: {:.6}",
        summary.moves.num_attempts(),
        summary.moves.num_accepts(),
        summary.moves.acceptance_ratio(),
    )?;
    writeln!(
        file,
        "insertion trials: {}\nfree insertions: {}\ninsertion probability: {:.6}",
        summary.insertions.num_trials(),
        summary.insertions.num_free(),
        summary.insertions.probability(),
    )?;
    Ok(())
}

pub fn clear_out_files(config: &DiskMcConfig) -> Result<()> {
    for path in [
        config.toml(),
        config.trajectory(),
        config.snapshot(),
        config.stats(),
    ] {
        if fs::metadata(&path).is_ok() {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}
