//! Grid field extraction engine for MOHID HDF5 output files.
//!
//! MOHID writes every output step of every field as its own dataset, stores
//! coordinates as boundary meshes and stacks the vertical axis bottom to top.
//! This crate turns that layout into consumer-ready values:
//!
//! - [`MohidDataset::time`]: the output instants
//! - [`MohidDataset::grid`]: 1-D latitude/longitude cell bounds
//! - [`MohidDataset::bathymetry`]: depth, land masked
//! - [`MohidDataset::field`]: a masked `(time, lat, lon)` array for one layer
//! - [`MohidDataset::particles`]: filtered Lagrangian particles for one step
//!
//! Each call opens the file, reads what it needs and closes it again.
//!
//! # Example
//!
//! ```ignore
//! use mohid_parser::MohidDataset;
//!
//! let dataset = MohidDataset::open("Hydrodynamic_1.hdf5")?;
//! let times = dataset.time()?;
//! let temperature = dataset.results_field("temperature", 0)?;
//! assert_eq!(temperature.steps(), times.len());
//! ```

pub mod accessor;
pub mod error;
pub mod field;
pub mod grid;
pub mod layout;
pub mod particles;
pub mod time;
pub mod timeseries;

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use mohid_common::{GridBounds, MaskedArray2, MaskedArray3, ParticleSet};

pub use accessor::{silence_hdf5_errors, DatasetHandle};
pub use error::{MohidError, MohidResult};
pub use field::{list_results, read_field, read_results_field};
pub use grid::{read_bathymetry, read_grid, LAND_SENTINEL};
pub use layout::{order_members, results_path};
pub use particles::{particle_steps, read_particles};
pub use time::read_time;
pub use timeseries::TimeSeries;

/// A MOHID HDF5 output file, addressed by path.
///
/// Holds no open file between calls.
#[derive(Debug, Clone)]
pub struct MohidDataset {
    path: PathBuf,
}

impl MohidDataset {
    /// Check that `path` is a readable HDF5 file and remember it.
    pub fn open(path: impl AsRef<Path>) -> MohidResult<Self> {
        let handle = DatasetHandle::open(path)?;
        Ok(Self {
            path: handle.path().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn handle(&self) -> MohidResult<DatasetHandle> {
        DatasetHandle::open(&self.path)
    }

    pub fn has_group(&self, group_path: &str) -> MohidResult<bool> {
        self.handle()?.has_group(group_path)
    }

    /// Members of `group_path` in step order.
    pub fn members(&self, group_path: &str) -> MohidResult<Vec<String>> {
        self.handle()?.members(group_path)
    }

    pub fn list_results(&self) -> MohidResult<Vec<String>> {
        list_results(&self.handle()?)
    }

    pub fn time(&self) -> MohidResult<Vec<NaiveDateTime>> {
        read_time(&self.handle()?)
    }

    pub fn grid(&self) -> MohidResult<GridBounds> {
        read_grid(&self.handle()?)
    }

    pub fn bathymetry(&self) -> MohidResult<MaskedArray2> {
        read_bathymetry(&self.handle()?)
    }

    /// Masked `(time, lat, lon)` field at `group_path`. `layer` 0 is the
    /// surface.
    pub fn field(&self, group_path: &str, layer: usize) -> MohidResult<MaskedArray3> {
        read_field(&self.handle()?, group_path, layer)
    }

    /// Like [`field`](Self::field) for `/Results/<name>`.
    pub fn results_field(&self, name: &str, layer: usize) -> MohidResult<MaskedArray3> {
        read_results_field(&self.handle()?, name, layer)
    }

    pub fn particles(
        &self,
        origin: &str,
        property: &str,
        step: usize,
        min_value: f64,
    ) -> MohidResult<ParticleSet> {
        read_particles(&self.handle()?, origin, property, step, min_value)
    }

    pub fn particle_steps(&self, origin: &str, property: &str) -> MohidResult<usize> {
        particle_steps(&self.handle()?, origin, property)
    }
}
