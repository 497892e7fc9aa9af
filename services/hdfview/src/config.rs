//! Configuration for the hdfview tools.
//!
//! All tools share one JSON file, `init_HDFView.json`, with one section per
//! tool:
//! - `HDF`: gridded field frames
//! - `LAGR`: Lagrangian particle frames
//! - `TS`: time-series file
//!
//! Each section deserializes into a typed record and is validated once, when
//! it is loaded.

use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "init_HDFView.json";

/// A named section of the configuration file.
pub trait ConfigSection: DeserializeOwned {
    /// Key of the section in the configuration file.
    const NAME: &'static str;

    fn validate(&self) -> Result<()>;
}

// ============================================================================
// HDF section
// ============================================================================

/// Frames of one gridded field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldPlotConfig {
    /// MOHID HDF5 file
    pub hdf: PathBuf,
    /// Existing directory for frames and the manifest
    pub outdir: PathBuf,
    /// Prepended to every output file name
    pub prefix: String,
    /// Field name under `/Results`
    pub field: String,
    /// Vertical layer, 0 = surface
    pub layer: usize,
    /// Overlay `velocity U` / `velocity V` vectors
    pub vectors: bool,
    /// Keep every n-th vector along each axis
    pub vec_zoom: usize,
    pub cmap: String,
    pub label: String,
    /// Number of colour boundaries
    pub levels: usize,
    /// strftime format of frame titles
    pub timestr: String,
}

impl ConfigSection for FieldPlotConfig {
    const NAME: &'static str = "HDF";

    fn validate(&self) -> Result<()> {
        ensure_file(&self.hdf, "HDF5 file")?;
        ensure_dir(&self.outdir)?;
        anyhow::ensure!(
            !self.field.is_empty(),
            "'field' should contain the name of a MOHID HDF5 field"
        );
        anyhow::ensure!(self.vec_zoom >= 1, "'vec_zoom' should be an integer >= 1");
        anyhow::ensure!(self.levels >= 1, "'levels' should be an integer >= 1");
        ensure_time_format(&self.timestr)
    }
}

// ============================================================================
// LAGR section
// ============================================================================

/// Frames of one Lagrangian property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticlePlotConfig {
    pub hdf: PathBuf,
    pub outdir: PathBuf,
    /// Emission origin group under `/Results`
    pub origin_name: String,
    /// Property plotted for each particle
    #[serde(alias = "propertie_name")]
    pub property_name: String,
    pub cmap: String,
    pub label: String,
    pub levels: usize,
    pub vmax: f64,
    /// Particles below this value are not plotted
    pub vmin: f64,
    pub timestr: String,
}

impl ConfigSection for ParticlePlotConfig {
    const NAME: &'static str = "LAGR";

    fn validate(&self) -> Result<()> {
        ensure_file(&self.hdf, "HDF5 file")?;
        ensure_dir(&self.outdir)?;
        anyhow::ensure!(
            !self.property_name.is_empty(),
            "'propertie_name' is not a name of a Lagrangian field"
        );
        anyhow::ensure!(self.levels >= 1, "'levels' should be an integer >= 1");
        anyhow::ensure!(
            self.vmin.is_finite() && self.vmax.is_finite(),
            "'vmin' and 'vmax' should be finite numbers"
        );
        anyhow::ensure!(
            self.vmin <= self.vmax,
            "'vmin' ({}) should not exceed 'vmax' ({})",
            self.vmin,
            self.vmax
        );
        ensure_time_format(&self.timestr)
    }
}

// ============================================================================
// TS section
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeriesConfig {
    pub tsfile: PathBuf,
}

impl ConfigSection for TimeSeriesConfig {
    const NAME: &'static str = "TS";

    fn validate(&self) -> Result<()> {
        ensure_file(&self.tsfile, "Time series file")
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load and validate section `T::NAME` of the configuration file at `path`.
pub fn load_section<T: ConfigSection>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {:?}", path))?;
    parse_section(&content).with_context(|| format!("Invalid config in {:?}", path))
}

/// Parse and validate section `T::NAME` from JSON text.
pub fn parse_section<T: ConfigSection>(content: &str) -> Result<T> {
    let root: serde_json::Value =
        serde_json::from_str(content).context("Failed to parse config JSON")?;

    let section = root
        .get(T::NAME)
        .filter(|value| value.is_object())
        .cloned()
        .with_context(|| format!("Inputs not found for the section '{}'", T::NAME))?;

    let config: T = serde_json::from_value(section)
        .with_context(|| format!("Failed to parse section '{}'", T::NAME))?;

    config
        .validate()
        .with_context(|| format!("Invalid section '{}'", T::NAME))?;
    Ok(config)
}

fn ensure_file(path: &Path, what: &str) -> Result<()> {
    anyhow::ensure!(path.is_file(), "{} not found: {:?}", what, path);
    Ok(())
}

fn ensure_dir(path: &Path) -> Result<()> {
    anyhow::ensure!(path.is_dir(), "Output directory not found: {:?}", path);
    Ok(())
}

fn ensure_time_format(format: &str) -> Result<()> {
    anyhow::ensure!(
        !StrftimeItems::new(format).any(|item| matches!(item, Item::Error)),
        "'timestr' is not a valid time format: {:?}",
        format
    );
    Ok(())
}
