//! Frame manifests for a downstream renderer.
//!
//! A manifest lists, per output step, the frame file to draw, its title and
//! the statistics a renderer needs to set up its colour scale.

use std::fmt::Write as _;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use mohid_common::{GridBounds, MaskedArray2, MaskedArray3, ParticleSet};
use serde::Serialize;

use crate::config::{FieldPlotConfig, ParticlePlotConfig};

#[derive(Debug, Clone, Serialize)]
pub struct GridSummary {
    pub n_lat_bounds: usize,
    pub n_lon_bounds: usize,
    /// `[min_lon, min_lat, max_lon, max_lat]`
    pub extent: Option<[f64; 4]>,
    /// Lower-left corner of every cell row and column, where a renderer
    /// anchors each cell
    pub cell_latitudes: Vec<f64>,
    pub cell_longitudes: Vec<f64>,
}

impl From<&GridBounds> for GridSummary {
    fn from(grid: &GridBounds) -> Self {
        Self {
            n_lat_bounds: grid.n_lat_bounds(),
            n_lon_bounds: grid.n_lon_bounds(),
            extent: grid.extent().map(|(a, b, c, d)| [a, b, c, d]),
            cell_latitudes: grid.cell_latitudes().to_vec(),
            cell_longitudes: grid.cell_longitudes().to_vec(),
        }
    }
}

// ============================================================================
// Gridded fields
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct FieldManifest {
    pub source: PathBuf,
    pub field: String,
    pub layer: usize,
    pub cmap: String,
    pub label: String,
    /// `(min, max)` over every valid cell of every step
    pub color_range: Option<(f64, f64)>,
    /// Colour boundaries, evenly spaced over `color_range`
    pub levels: Vec<f64>,
    pub grid: GridSummary,
    pub animation: String,
    pub frames: Vec<FieldFrame>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldFrame {
    pub file: String,
    pub title: String,
    pub time: NaiveDateTime,
    pub valid_cells: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vectors: Option<VectorSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorSummary {
    /// Vectors left after subsampling with both components valid
    pub sampled: usize,
    pub max_speed: Option<f64>,
}

impl FieldManifest {
    /// `vectors` holds the `(u, v)` velocity components at the same layer.
    pub fn build(
        config: &FieldPlotConfig,
        times: &[NaiveDateTime],
        grid: &GridBounds,
        field: &MaskedArray3,
        vectors: Option<(&MaskedArray3, &MaskedArray3)>,
    ) -> Result<Self> {
        anyhow::ensure!(
            times.len() == field.steps(),
            "'{}' has {} steps but the file has {} time steps",
            config.field,
            field.steps(),
            times.len()
        );
        if let Some((u, v)) = vectors {
            anyhow::ensure!(
                u.shape() == field.shape() && v.shape() == field.shape(),
                "velocity shapes {:?} / {:?} do not match '{}' {:?}",
                u.shape(),
                v.shape(),
                config.field,
                field.shape()
            );
        }

        let color_range = field.value_range();
        let levels = color_range
            .map(|(lo, hi)| linspace(lo, hi, config.levels))
            .unwrap_or_default();

        let mut frames = Vec::with_capacity(times.len());
        for (step, (time, frame)) in times.iter().zip(field.frames()).enumerate() {
            let vectors = match vectors {
                Some((u, v)) => match (u.frame(step), v.frame(step)) {
                    (Some(u), Some(v)) => Some(vector_summary(&u, &v, config.vec_zoom)),
                    _ => None,
                },
                None => None,
            };
            frames.push(FieldFrame {
                file: frame_file_name(&config.prefix, time)?,
                title: format_time(time, &config.timestr)?,
                time: *time,
                valid_cells: frame.count_valid(),
                min: frame.min(),
                max: frame.max(),
                mean: frame.mean(),
                vectors,
            });
        }

        Ok(Self {
            source: config.hdf.clone(),
            field: config.field.clone(),
            layer: config.layer,
            cmap: config.cmap.clone(),
            label: config.label.clone(),
            color_range,
            levels,
            grid: grid.into(),
            animation: format!("{}animation.gif", config.prefix),
            frames,
        })
    }
}

/// Count and measure the vectors kept after taking every `stride`-th cell.
pub fn vector_summary(u: &MaskedArray2, v: &MaskedArray2, stride: usize) -> VectorSummary {
    let u = u.strided(stride);
    let v = v.strided(stride);

    let mut sampled = 0;
    let mut max_speed: Option<f64> = None;
    for ((&du, &dv), (&mu, &mv)) in u
        .data()
        .iter()
        .zip(v.data().iter())
        .zip(u.mask().iter().zip(v.mask().iter()))
    {
        if mu || mv || du.is_nan() || dv.is_nan() {
            continue;
        }
        sampled += 1;
        let speed = du.hypot(dv);
        max_speed = Some(max_speed.map_or(speed, |m| m.max(speed)));
    }

    VectorSummary { sampled, max_speed }
}

// ============================================================================
// Lagrangian particles
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ParticleManifest {
    pub source: PathBuf,
    pub origin: String,
    pub property: String,
    pub cmap: String,
    pub label: String,
    pub levels: Vec<f64>,
    pub grid: GridSummary,
    /// Unmasked bathymetry cells drawn under the particles
    pub water_cells: usize,
    pub animation: String,
    pub frames: Vec<ParticleFrame>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticleFrame {
    pub file: String,
    pub title: String,
    pub time: NaiveDateTime,
    pub particles: usize,
    pub value_range: Option<(f64, f64)>,
}

impl ParticleManifest {
    /// `steps` holds the filtered particle set of every step, in order.
    pub fn build(
        config: &ParticlePlotConfig,
        times: &[NaiveDateTime],
        grid: &GridBounds,
        bathymetry: &MaskedArray2,
        steps: &[ParticleSet],
    ) -> Result<Self> {
        anyhow::ensure!(
            steps.len() == times.len(),
            "'{}/{}' has {} steps but the file has {} time steps",
            config.origin_name,
            config.property_name,
            steps.len(),
            times.len()
        );

        let prefix = format!("{}-", config.origin_name);
        let mut frames = Vec::with_capacity(steps.len());
        for (time, particles) in times.iter().zip(steps) {
            frames.push(ParticleFrame {
                file: frame_file_name(&prefix, time)?,
                title: format_time(time, &config.timestr)?,
                time: *time,
                particles: particles.len(),
                value_range: particles.value_range(),
            });
        }

        Ok(Self {
            source: config.hdf.clone(),
            origin: config.origin_name.clone(),
            property: config.property_name.clone(),
            cmap: config.cmap.clone(),
            label: config.label.clone(),
            levels: linspace(config.vmin, config.vmax, config.levels),
            grid: grid.into(),
            water_cells: bathymetry.count_valid(),
            animation: format!("{}animation.gif", prefix),
            frames,
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// `n` evenly spaced values from `lo` to `hi`, both included.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { hi } else { lo + step * i as f64 })
                .collect()
        }
    }
}

/// `<prefix>YYYYmmddTHHMM.png`
pub fn frame_file_name(prefix: &str, time: &NaiveDateTime) -> Result<String> {
    Ok(format!("{}{}.png", prefix, format_time(time, "%Y%m%dT%H%M")?))
}

/// Format `time` with a strftime pattern, failing instead of panicking on a
/// bad pattern.
pub fn format_time(time: &NaiveDateTime, pattern: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", time.format(pattern))
        .map_err(|_| anyhow::anyhow!("Invalid time format {:?}", pattern))?;
    Ok(out)
}

pub fn write_manifest<T: Serialize>(path: &Path, manifest: &T) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create manifest {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), manifest)
        .with_context(|| format!("Failed to write manifest {:?}", path))?;
    Ok(())
}
