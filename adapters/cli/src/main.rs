#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a scripted Homestead day in the terminal.

mod config;
mod session;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use homestead_core::{Command, MAX_GRID_DIMENSION};
use homestead_world::{query, World};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::{
    config::HomesteadConfig,
    session::{run_script, Session},
};

/// Command-line arguments accepted by the Homestead binary.
#[derive(Debug, Parser)]
#[command(name = "homestead", about = "Lay out a homestead and tend its crops")]
struct CliArgs {
    /// TOML file describing the grid and the structure and crop catalog.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Overrides the configured number of grid columns.
    #[arg(long, value_parser = grid_dimension())]
    columns: Option<u32>,
    /// Overrides the configured number of grid rows.
    #[arg(long, value_parser = grid_dimension())]
    rows: Option<u32>,
    /// Number of idle frames the crops are left to grow.
    #[arg(long, default_value_t = 80)]
    ticks: u32,
    /// Simulated duration of a single frame in milliseconds.
    #[arg(long, default_value_t = 500, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,
    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, default_value = "info")]
    log: String,
}

fn grid_dimension() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(1..=i64::from(MAX_GRID_DIMENSION))
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log);

    if let Err(error) = run(&args) {
        error!("{error:#}");
        return Err(error);
    }
    Ok(())
}

fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(args: &CliArgs) -> Result<()> {
    let HomesteadConfig { grid, catalog } = match &args.config {
        Some(path) => config::load(path)?,
        None => config::parse(config::DEFAULT_CONFIG).context("embedded configuration")?,
    };
    let columns = args.columns.unwrap_or(grid.columns);
    let rows = args.rows.unwrap_or(grid.rows);
    if columns < 8 || rows < 8 {
        anyhow::bail!("the scripted day needs at least an 8x8 grid, got {columns}x{rows}");
    }

    let world = World::with_catalog(catalog);
    println!("{}", query::welcome_banner(&world));
    info!(
        columns,
        rows,
        cell_size = grid.cell_size,
        structures = query::catalog(&world).structures().count(),
        "homestead configured"
    );

    let mut session = Session::new(world, Duration::from_millis(args.tick_ms));
    session.submit(Command::ConfigureGrid {
        columns,
        rows,
        cell_size: grid.cell_size,
    });
    run_script(&mut session, args.ticks);

    let summary = session.summary();
    println!(
        "structures: {}, crops in field: {}, rejected actions: {}",
        summary.structures, summary.crops_in_field, summary.rejections
    );
    for (kind, quantity) in &summary.harvested {
        println!("harvested {}: {quantity}", kind.name());
    }
    Ok(())
}
