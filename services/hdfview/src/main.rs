//! MOHID HDF5 viewer front end.
//!
//! Reads `init_HDFView.json`, extracts fields or particles from a MOHID
//! output file and writes a per-frame JSON manifest for the renderer.

mod config;
mod report;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mohid_parser::{MohidDataset, TimeSeries};
use serde::Serialize;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::{
    load_section, FieldPlotConfig, ParticlePlotConfig, TimeSeriesConfig, DEFAULT_CONFIG_FILE,
};
use report::{write_manifest, FieldManifest, GridSummary, ParticleManifest};

/// Velocity components drawn as vectors over a field.
const VELOCITY_U: &str = "velocity U";
const VELOCITY_V: &str = "velocity V";

#[derive(Parser, Debug)]
#[command(name = "hdfview")]
#[command(about = "Extract MOHID HDF5 fields and particles into frame manifests")]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, env = "HDFVIEW_CONFIG")]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Frames of a gridded field (config section HDF)
    Field,
    /// Frames of a Lagrangian property (config section LAGR)
    Particles,
    /// Column catalogue of a time-series file (config section TS)
    Timeseries,
    /// Summarize a MOHID HDF5 file
    Info {
        /// MOHID HDF5 file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout is reserved for the `info` summary
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    match &args.command {
        Command::Field => run_field(&args.config),
        Command::Particles => run_particles(&args.config),
        Command::Timeseries => run_timeseries(&args.config),
        Command::Info { file } => run_info(file),
    }
}

fn open_dataset(path: &Path) -> Result<MohidDataset> {
    MohidDataset::open(path).with_context(|| format!("Failed to open MOHID file {:?}", path))
}

fn run_field(config_path: &Path) -> Result<()> {
    let config: FieldPlotConfig = load_section(config_path)?;
    info!(
        hdf = %config.hdf.display(),
        field = %config.field,
        layer = config.layer,
        vectors = config.vectors,
        "Extracting field"
    );

    let dataset = open_dataset(&config.hdf)?;
    let times = dataset.time()?;
    let grid = dataset.grid()?;
    let field = dataset
        .results_field(&config.field, config.layer)
        .with_context(|| format!("Failed to extract '{}'", config.field))?;

    let vectors = if config.vectors {
        let u = dataset
            .results_field(VELOCITY_U, config.layer)
            .with_context(|| format!("Failed to extract '{}'", VELOCITY_U))?;
        let v = dataset
            .results_field(VELOCITY_V, config.layer)
            .with_context(|| format!("Failed to extract '{}'", VELOCITY_V))?;
        Some((u, v))
    } else {
        None
    };

    let manifest = FieldManifest::build(
        &config,
        &times,
        &grid,
        &field,
        vectors.as_ref().map(|(u, v)| (u, v)),
    )?;

    let path = config.outdir.join(format!("{}frames.json", config.prefix));
    write_manifest(&path, &manifest)?;
    info!(
        path = %path.display(),
        frames = manifest.frames.len(),
        color_range = ?manifest.color_range,
        "Wrote field manifest"
    );
    Ok(())
}

fn run_particles(config_path: &Path) -> Result<()> {
    let config: ParticlePlotConfig = load_section(config_path)?;
    info!(
        hdf = %config.hdf.display(),
        origin = %config.origin_name,
        property = %config.property_name,
        vmin = config.vmin,
        "Extracting particles"
    );

    let dataset = open_dataset(&config.hdf)?;
    let grid = dataset.grid()?;
    let bathymetry = dataset.bathymetry()?;
    let times = dataset.time()?;

    let steps = dataset.particle_steps(&config.origin_name, &config.property_name)?;
    let mut sets = Vec::with_capacity(steps);
    for step in 0..steps {
        let particles = dataset
            .particles(&config.origin_name, &config.property_name, step, config.vmin)
            .with_context(|| format!("Failed to read particles at step {}", step))?;
        if particles.is_empty() {
            warn!(step, "No particles at or above vmin");
        }
        sets.push(particles);
    }

    let manifest = ParticleManifest::build(&config, &times, &grid, &bathymetry, &sets)?;

    let path = config
        .outdir
        .join(format!("{}-frames.json", config.origin_name));
    write_manifest(&path, &manifest)?;
    info!(path = %path.display(), frames = manifest.frames.len(), "Wrote particle manifest");
    Ok(())
}

fn run_timeseries(config_path: &Path) -> Result<()> {
    let config: TimeSeriesConfig = load_section(config_path)?;
    let series = TimeSeries::from_path(&config.tsfile)
        .with_context(|| format!("Failed to read time series {:?}", config.tsfile))?;

    info!(
        path = %config.tsfile.display(),
        rows = series.len(),
        first = ?series.times().first(),
        last = ?series.times().last(),
        "Read time series"
    );
    for (pos, column) in series.columns().iter().enumerate() {
        info!(
            index = pos + 1,
            column = %column,
            range = ?series.column_range(column),
            "Column"
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct DatasetSummary {
    path: PathBuf,
    steps: usize,
    first: Option<chrono::NaiveDateTime>,
    last: Option<chrono::NaiveDateTime>,
    grid: GridSummary,
    results: Vec<String>,
}

fn run_info(file: &Path) -> Result<()> {
    let dataset = open_dataset(file)?;
    let times = dataset.time()?;
    let grid = dataset.grid()?;

    let summary = DatasetSummary {
        path: file.to_path_buf(),
        steps: times.len(),
        first: times.first().copied(),
        last: times.last().copied(),
        grid: (&grid).into(),
        results: dataset.list_results()?,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
