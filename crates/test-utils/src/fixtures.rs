//! Synthetic MOHID HDF5 files for tests.
//!
//! [`MohidFileBuilder`] writes the group layout MOHID produces (`/Time`,
//! `/Grid`, `/Results`) with predictable contents, so tests can check
//! orientation, masking and layer selection against known values.

use std::error::Error;
use std::path::{Path, PathBuf};

use hdf5::{File, Group, H5Type};
use ndarray::{Array1, Array2, ArrayD, Dimension, IxDyn};
use tempfile::TempDir;

use crate::generators::{create_test_field_2d, create_test_field_3d, latitude_mesh, longitude_mesh};

/// Common grid definitions for testing.
pub mod grid {
    /// 3 latitude bounds (2 cell rows)
    pub const SMALL_LATITUDE: [f64; 3] = [37.0, 37.5, 38.0];

    /// 3 longitude bounds (2 cell columns)
    pub const SMALL_LONGITUDE: [f64; 3] = [-9.0, -8.5, -8.0];

    /// Depth of a water cell in generated bathymetry (metres)
    pub const WATER_DEPTH: f64 = 25.0;

    /// Bathymetry written for land cells
    pub const LAND_DEPTH: f64 = -99.0;
}

/// Common time definitions for testing.
pub mod time {
    /// First output instant, 2025-04-25 12:00:00
    pub const START: [f64; 6] = [2025.0, 4.0, 25.0, 12.0, 0.0, 0.0];
}

/// A MOHID file written into its own temporary directory.
///
/// The directory, and the file with it, is removed when the fixture drops.
pub struct MohidFixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl MohidFixture {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone)]
struct ParticleOrigin {
    origin: String,
    property: String,
    /// `(longitude, latitude, value)` per particle, per step
    steps: Vec<Vec<(f64, f64, f64)>>,
}

/// Builder for MOHID-layout HDF5 files.
///
/// # Example
///
/// ```ignore
/// use test_utils::MohidFileBuilder;
///
/// let fixture = MohidFileBuilder::new()
///     .hourly_times(2)
///     .land_cell(1, 0)
///     .field_2d("temperature")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct MohidFileBuilder {
    latitude: Vec<f64>,
    longitude: Vec<f64>,
    times: Vec<Vec<f64>>,
    land: Vec<(usize, usize)>,
    bathymetry: Option<Array2<f64>>,
    open_points_depth: Option<usize>,
    open_points: Option<Vec<ArrayD<f64>>>,
    fields: Vec<(String, Vec<ArrayD<f64>>)>,
    origins: Vec<ParticleOrigin>,
    digits: usize,
    omitted: Vec<String>,
}

impl Default for MohidFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MohidFileBuilder {
    /// A builder on the small 3x3-bound grid with no steps yet.
    pub fn new() -> Self {
        Self {
            latitude: grid::SMALL_LATITUDE.to_vec(),
            longitude: grid::SMALL_LONGITUDE.to_vec(),
            times: Vec::new(),
            land: Vec::new(),
            bathymetry: None,
            open_points_depth: None,
            open_points: None,
            fields: Vec::new(),
            origins: Vec::new(),
            digits: 5,
            omitted: Vec::new(),
        }
    }

    /// Replace the grid bounds.
    pub fn grid(mut self, latitude: Vec<f64>, longitude: Vec<f64>) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    /// `n` hourly steps starting at [`time::START`].
    pub fn hourly_times(mut self, n: usize) -> Self {
        self.times = (0..n)
            .map(|i| {
                let mut record = time::START.to_vec();
                record[3] += i as f64;
                record
            })
            .collect();
        self
    }

    /// Explicit time records, written as `f32` like MOHID does. Records may
    /// have any length.
    pub fn times(mut self, records: Vec<Vec<f64>>) -> Self {
        self.times = records;
        self
    }

    /// Mark a `(lon, lat)` cell as land in bathymetry and in every
    /// OpenPoints step (every layer for 3-D masks).
    pub fn land_cell(mut self, lon: usize, lat: usize) -> Self {
        self.land.push((lon, lat));
        self
    }

    /// Explicit bathymetry, stored `(lon, lat)`.
    pub fn bathymetry(mut self, bathymetry: Array2<f64>) -> Self {
        self.bathymetry = Some(bathymetry);
        self
    }

    /// Write OpenPoints steps as `(depth, lon, lat)` instead of `(lon, lat)`.
    pub fn open_points_3d(mut self, depth: usize) -> Self {
        self.open_points_depth = Some(depth);
        self
    }

    /// Explicit OpenPoints steps, written as `f64`.
    pub fn open_points(mut self, steps: Vec<ArrayD<f64>>) -> Self {
        self.open_points = Some(steps);
        self
    }

    /// A field under `/Results/<name>` with explicit per-step arrays.
    pub fn field(mut self, name: &str, steps: Vec<ArrayD<f64>>) -> Self {
        self.fields.push((name.to_string(), steps));
        self
    }

    /// A 2-D field with one [`create_test_field_2d`] step per time step.
    pub fn field_2d(self, name: &str) -> Self {
        let (n_lon, n_lat) = self.cell_dims();
        let steps = (0..self.times.len())
            .map(|step| create_test_field_2d(step, n_lon, n_lat))
            .collect();
        self.field(name, steps)
    }

    /// A 3-D field with one [`create_test_field_3d`] step per time step.
    pub fn field_3d(self, name: &str, depth: usize) -> Self {
        let (n_lon, n_lat) = self.cell_dims();
        let steps = (0..self.times.len())
            .map(|step| create_test_field_3d(step, depth, n_lon, n_lat))
            .collect();
        self.field(name, steps)
    }

    /// A Lagrangian origin with per-step `(longitude, latitude, value)`
    /// particles for one property.
    pub fn origin(mut self, origin: &str, property: &str, steps: Vec<Vec<(f64, f64, f64)>>) -> Self {
        self.origins.push(ParticleOrigin {
            origin: origin.to_string(),
            property: property.to_string(),
            steps,
        });
        self
    }

    /// Zero-padding width of step counters. 0 writes `Time_1`, `Time_2`, ...
    pub fn counter_digits(mut self, digits: usize) -> Self {
        self.digits = digits;
        self
    }

    /// Leave a standard member out of the file, e.g. `"/Grid/Bathymetry"`.
    pub fn omit(mut self, path: &str) -> Self {
        self.omitted.push(path.to_string());
        self
    }

    /// Write the file into a fresh temporary directory.
    pub fn build(&self) -> Result<MohidFixture, Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("MOHID_test.hdf5");
        self.write_to(&path)?;
        Ok(MohidFixture { dir, path })
    }

    /// Write the file at `path`, replacing anything already there.
    pub fn write_to(&self, path: &Path) -> hdf5::Result<()> {
        let file = File::create(path)?;

        if !self.is_omitted("/Time") {
            let time = file.create_group("Time")?;
            for (i, record) in self.times.iter().enumerate() {
                let record: Array1<f32> = record.iter().map(|&v| v as f32).collect();
                write(&time, &self.member_name("Time", i), &record)?;
            }
        }

        let grid = file.create_group("Grid")?;
        if !self.is_omitted("/Grid/Latitude") {
            write(&grid, "Latitude", &latitude_mesh(&self.latitude, &self.longitude))?;
        }
        if !self.is_omitted("/Grid/Longitude") {
            write(&grid, "Longitude", &longitude_mesh(&self.latitude, &self.longitude))?;
        }
        if !self.is_omitted("/Grid/Bathymetry") {
            write(&grid, "Bathymetry", &self.bathymetry_array())?;
        }
        if !self.is_omitted("/Grid/OpenPoints") {
            let open_points = grid.create_group("OpenPoints")?;
            match &self.open_points {
                Some(steps) => {
                    for (i, step) in steps.iter().enumerate() {
                        write(&open_points, &self.member_name("OpenPoints", i), step)?;
                    }
                }
                None => {
                    let step = self.open_points_array();
                    for i in 0..self.times.len() {
                        write(&open_points, &self.member_name("OpenPoints", i), &step)?;
                    }
                }
            }
        }

        let results = file.create_group("Results")?;
        for (name, steps) in &self.fields {
            let group = results.create_group(name)?;
            for (i, step) in steps.iter().enumerate() {
                write(&group, &self.member_name(name, i), step)?;
            }
        }

        for origin_fixture in &self.origins {
            let origin = ensure_group(&results, &origin_fixture.origin)?;
            let longitude = ensure_group(&origin, "Longitude")?;
            let latitude = ensure_group(&origin, "Latitude")?;
            let property = ensure_group(&origin, &origin_fixture.property)?;

            for (i, particles) in origin_fixture.steps.iter().enumerate() {
                let lon: Array1<f64> = particles.iter().map(|p| p.0).collect();
                let lat: Array1<f64> = particles.iter().map(|p| p.1).collect();
                let values: Array1<f64> = particles.iter().map(|p| p.2).collect();

                let lon_name = self.member_name("Longitude", i);
                if !longitude.link_exists(&lon_name) {
                    write(&longitude, &lon_name, &lon)?;
                }
                let lat_name = self.member_name("Latitude", i);
                if !latitude.link_exists(&lat_name) {
                    write(&latitude, &lat_name, &lat)?;
                }
                write(&property, &self.member_name(&origin_fixture.property, i), &values)?;
            }
        }

        Ok(())
    }

    /// `(n_lon, n_lat)` cell counts of the grid.
    fn cell_dims(&self) -> (usize, usize) {
        (
            self.longitude.len().saturating_sub(1),
            self.latitude.len().saturating_sub(1),
        )
    }

    fn member_name(&self, prefix: &str, index: usize) -> String {
        let counter = index + 1;
        if self.digits == 0 {
            format!("{}_{}", prefix, counter)
        } else {
            format!("{}_{:0width$}", prefix, counter, width = self.digits)
        }
    }

    fn is_omitted(&self, path: &str) -> bool {
        self.omitted.iter().any(|p| p == path)
    }

    fn bathymetry_array(&self) -> Array2<f64> {
        if let Some(bathymetry) = &self.bathymetry {
            return bathymetry.clone();
        }
        let (n_lon, n_lat) = self.cell_dims();
        let mut bathymetry = Array2::from_elem((n_lon, n_lat), grid::WATER_DEPTH);
        for &(lon, lat) in &self.land {
            bathymetry[[lon, lat]] = grid::LAND_DEPTH;
        }
        bathymetry
    }

    fn open_points_array(&self) -> ArrayD<i32> {
        let (n_lon, n_lat) = self.cell_dims();
        let shape = match self.open_points_depth {
            Some(depth) => vec![depth, n_lon, n_lat],
            None => vec![n_lon, n_lat],
        };
        ArrayD::from_shape_fn(IxDyn(&shape), |idx| {
            let n = idx.ndim();
            let cell = (idx[n - 2], idx[n - 1]);
            if self.land.contains(&cell) {
                0
            } else {
                1
            }
        })
    }
}

fn write<T, D>(group: &Group, name: &str, data: &ndarray::Array<T, D>) -> hdf5::Result<()>
where
    T: H5Type,
    D: ndarray::Dimension,
{
    let dataset = group
        .new_dataset::<T>()
        .shape(data.shape().to_vec())
        .create(name)?;
    dataset.write(data)?;
    Ok(())
}

fn ensure_group(parent: &Group, name: &str) -> hdf5::Result<Group> {
    if parent.link_exists(name) {
        parent.group(name)
    } else {
        parent.create_group(name)
    }
}
