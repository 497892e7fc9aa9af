//! Scoped, read-only access to a MOHID HDF5 file.
//!
//! A [`DatasetHandle`] owns one HDF5 file id for the duration of a single
//! extraction. The id is released by [`DatasetHandle::close`] or, on every
//! other exit path, by `Drop`.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Once;

use hdf5::{Dataset, File, Group};
use ndarray::{ArrayD, IxDyn};
use tracing::debug;

use crate::error::{MohidError, MohidResult};
use crate::layout::{join, order_members};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when probing for a group
/// that turns out to be a dataset). This creates confusing log spam like:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 0:
///   #000: H5G.c line 548 in H5Gopen2(): unable to open group
/// ```
///
/// This function disables that output by calling H5Eset_auto2 with null handlers.
/// It only needs to be called once per process, but is safe to call multiple times.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// An open, read-only view of one HDF5 file.
#[derive(Debug)]
pub struct DatasetHandle {
    path: PathBuf,
    file: Option<File>,
}

impl DatasetHandle {
    /// Open `path` read-only.
    ///
    /// Fails with [`MohidError::DatasetNotFound`] if the path is missing or
    /// is not an HDF5 file.
    pub fn open(path: impl AsRef<Path>) -> MohidResult<Self> {
        silence_hdf5_errors();

        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(MohidError::DatasetNotFound {
                path,
                reason: "no such file".to_string(),
            });
        }

        let file = File::open(&path).map_err(|e| MohidError::DatasetNotFound {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        debug!(path = %path.display(), "Opened HDF5 file");
        Ok(Self {
            path,
            file: Some(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Release the file id. Calling this more than once is a no-op.
    pub fn close(&mut self) {
        if let Some(file) = self.file.take() {
            drop(file);
            debug!(path = %self.path.display(), "Closed HDF5 file");
        }
    }

    /// True if every component of `group_path` exists and the last one is a
    /// group. Datasets do not count.
    pub fn has_group(&self, group_path: &str) -> MohidResult<bool> {
        Ok(self.resolve_group(group_path)?.is_some())
    }

    /// True if `member_path` names a group or a dataset.
    pub fn has_member(&self, member_path: &str) -> MohidResult<bool> {
        match split_parent(member_path) {
            (_, None) => self.file().map(|_| true),
            (parent, Some(name)) => Ok(self
                .resolve_group(parent)?
                .map_or(false, |group| group.link_exists(name))),
        }
    }

    /// Member names of a group in the order the library reports them.
    pub fn member_names(&self, group_path: &str) -> MohidResult<Vec<String>> {
        Ok(self.group(group_path)?.member_names()?)
    }

    /// Member names of a per-step group in step order.
    pub fn members(&self, group_path: &str) -> MohidResult<Vec<String>> {
        Ok(order_members(self.member_names(group_path)?))
    }

    /// Open `group_path` as a group, or fail with `FieldNotFound`.
    pub fn group(&self, group_path: &str) -> MohidResult<Group> {
        self.resolve_group(group_path)?
            .ok_or_else(|| MohidError::field_not_found(&self.path, group_path))
    }

    /// Read the dataset at `member_path` as `f64`, or `None` if it is absent.
    pub fn read_member(&self, member_path: &str) -> MohidResult<Option<ArrayD<f64>>> {
        let (parent, name) = match split_parent(member_path) {
            (parent, Some(name)) => (parent, name),
            (_, None) => return Ok(None),
        };
        let Some(group) = self.resolve_group(parent)? else {
            return Ok(None);
        };
        if !group.link_exists(name) {
            return Ok(None);
        }
        match group.dataset(name) {
            Ok(dataset) => read_f64_array(&dataset).map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Read member `name` of `group_path` as `f64`.
    pub fn read_dataset(&self, group_path: &str, name: &str) -> MohidResult<ArrayD<f64>> {
        let group = self.group(group_path)?;
        let dataset = open_step(&group, group_path, name)?;
        read_f64_array(&dataset)
    }

    /// Stack every step of `group_path`, in step order, into one array whose
    /// first axis is time.
    ///
    /// All steps must share one shape.
    pub fn stack_steps(&self, group_path: &str) -> MohidResult<ArrayD<f64>> {
        let group = self.group(group_path)?;
        let names = order_members(group.member_names()?);
        if names.is_empty() {
            return Err(MohidError::EmptyField {
                path: self.path.clone(),
                group: group_path.to_string(),
            });
        }

        let mut step_shape: Option<Vec<usize>> = None;
        let mut values = Vec::new();

        for name in &names {
            let dataset = open_step(&group, group_path, name)?;
            let shape = dataset.shape();
            match &step_shape {
                None => {
                    values.reserve(shape.iter().product::<usize>() * names.len());
                    step_shape = Some(shape);
                }
                Some(expected) if *expected != shape => {
                    return Err(MohidError::ShapeMismatch {
                        path: self.path.clone(),
                        what: format!("step '{}' of '{}'", name, group_path),
                        expected: expected.clone(),
                        found: shape,
                    });
                }
                Some(_) => {}
            }
            values.extend(dataset.read_raw::<f64>()?);
        }

        let mut shape = vec![names.len()];
        shape.extend(step_shape.unwrap_or_default());
        debug!(group = group_path, steps = names.len(), shape = ?shape, "Stacked time steps");

        ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|e| {
            MohidError::invalid_format(format!("'{}': {}", group_path, e))
        })
    }

    fn file(&self) -> MohidResult<&File> {
        self.file.as_ref().ok_or_else(|| MohidError::HandleClosed {
            path: self.path.clone(),
        })
    }

    /// Walk `group_path` one component at a time so that a missing
    /// intermediate group reads as "absent" rather than as a library error.
    fn resolve_group(&self, group_path: &str) -> MohidResult<Option<Group>> {
        let mut current: Group = self.file()?.deref().clone();
        for name in group_path.split('/').filter(|c| !c.is_empty()) {
            if !current.link_exists(name) {
                return Ok(None);
            }
            match current.group(name) {
                Ok(group) => current = group,
                Err(_) => return Ok(None),
            }
        }
        Ok(Some(current))
    }
}

impl Drop for DatasetHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Read a whole dataset, converting its elements to `f64`.
pub fn read_f64_array(dataset: &Dataset) -> MohidResult<ArrayD<f64>> {
    let shape = dataset.shape();
    let values = dataset.read_raw::<f64>()?;
    ArrayD::from_shape_vec(IxDyn(&shape), values)
        .map_err(|e| MohidError::invalid_format(format!("'{}': {}", dataset.name(), e)))
}

fn open_step(group: &Group, group_path: &str, name: &str) -> MohidResult<Dataset> {
    group.dataset(name).map_err(|_| {
        MohidError::invalid_format(format!(
            "'{}' is not a dataset",
            join(group_path, name)
        ))
    })
}

/// Split `a/b/c` into (`a/b`, `Some("c")`). The root splits into (`""`, None).
fn split_parent(path: &str) -> (&str, Option<&str>) {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return ("", None);
    }
    match trimmed.rsplit_once('/') {
        Some((parent, name)) => (parent, Some(name)),
        None => ("", Some(trimmed)),
    }
}
