//! The command-line driver: generates initial conditions, runs the
//! simulation core to completion, and logs the final particle positions
//! and densities to a file.
//!
//! The output file must not already exist; that check is handled here
//! with `anyhow` context rather than a core `SimError`, since it's a
//! driver concern and not a simulation failure.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use rand::SeedableRng;
use simplelog::{ColorChoice, Config as LogConfig, TermLogger, TerminalMode};

use sph_gravity::{config::SimConfig, particle::ParticleStore, Simulation};

/// Run the coupled Barnes-Hut/SPH fluid simulation and log final state.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Number of particles.
    #[arg(long, default_value_t = 500)]
    n: usize,

    /// Side length of the cubic domain particles are seeded in.
    #[arg(long, default_value_t = 12.0)]
    domain: f64,

    /// Per-particle mass.
    #[arg(long, default_value_t = 100.0)]
    mass: f64,

    /// Initial internal energy per unit mass.
    #[arg(long, default_value_t = 1.0)]
    u0: f64,

    /// Simulation end time. Overrides `SimConfig::default().t_end`.
    #[arg(long)]
    t_end: Option<f64>,

    /// Output log path. Must not already exist.
    #[arg(long, default_value = "log.txt")]
    out: PathBuf,

    /// RNG seed for reproducible initial conditions.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> Result<()> {
    TermLogger::init(
        LevelFilter::Info,
        LogConfig::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context("failed to initialize logger")?;

    let cli = Cli::parse();

    let mut config = SimConfig::default();
    if let Some(t_end) = cli.t_end {
        config.t_end = t_end;
    }

    let mut rng = rand::rngs::StdRng::seed_from_u64(cli.seed);
    let store = ParticleStore::initial_conditions(cli.n, cli.domain, cli.mass, cli.u0, &mut rng);

    let mut sim = Simulation::new(store, config).context("failed to construct simulation")?;
    log::info!("running {} particles to t_end = {}", cli.n, config.t_end);
    sim.run().context("simulation aborted")?;

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&cli.out)
        .with_context(|| format!("output file {:?} already exists", cli.out))?;

    for p in &sim.store.particles {
        writeln!(file, "{} {} {} {}", p.pos.x, p.pos.y, p.pos.z, p.rho)
            .context("failed to write particle record")?;
    }

    log::info!("wrote {} records to {:?}", sim.store.len(), cli.out);
    Ok(())
}
