//! Masked field extraction from `/Results`.
//!
//! A MOHID field group holds one dataset per output step. Steps of a 2-D
//! field are stored `(lon, lat)`; steps of a 3-D field are stored
//! `(depth, lon, lat)` with the vertical axis running bottom to top. The
//! land/sea mask comes from the matching `/Grid/OpenPoints` steps.
//!
//! Extraction stacks the steps along a new time axis, picks one layer
//! counted down from the surface, masks closed points and returns the
//! result as `(time, lat, lon)`.

use mohid_common::{MaskedArray, MaskedArray3};
use ndarray::{Array3, Array4, ArrayD, Axis, Ix3, Ix4};
use tracing::{debug, warn};

use crate::accessor::DatasetHandle;
use crate::error::{MohidError, MohidResult};
use crate::layout::{results_path, GRID_OPEN_POINTS, RESULTS_GROUP};

/// Read `group_path` as a masked `(time, lat, lon)` field.
///
/// `layer` counts from the surface: 0 is the top layer. It is ignored for
/// 2-D fields. For 3-D fields it must be below the stored depth extent.
pub fn read_field(
    handle: &DatasetHandle,
    group_path: &str,
    layer: usize,
) -> MohidResult<MaskedArray3> {
    if !handle.has_group(group_path)? {
        return Err(MohidError::field_not_found(handle.path(), group_path));
    }

    let stacked = handle.stack_steps(group_path)?;
    let (values, depth) = match stacked.ndim() {
        3 => (into_ix3(stacked, group_path)?, None),
        4 => {
            let stacked = into_ix4(stacked, group_path)?;
            let depth = stacked.len_of(Axis(1));
            if layer >= depth {
                return Err(MohidError::LayerOutOfRange {
                    path: handle.path().to_path_buf(),
                    group: group_path.to_string(),
                    layer,
                    depth,
                });
            }
            (surface_layer(stacked, layer), Some(depth))
        }
        n => {
            return Err(MohidError::invalid_format(format!(
                "'{}' steps must be 2-D or 3-D, found {}-D",
                group_path,
                n - 1
            )))
        }
    };

    let closed = read_closed_points(handle, depth, layer)?;
    if closed.shape() != values.shape() {
        return Err(MohidError::ShapeMismatch {
            path: handle.path().to_path_buf(),
            what: format!("'{}' against '{}'", GRID_OPEN_POINTS, group_path),
            expected: values.shape().to_vec(),
            found: closed.shape().to_vec(),
        });
    }

    let field = MaskedArray::new(to_lat_lon(values), to_lat_lon(closed))
        .map_err(|e| MohidError::invalid_format(e.to_string()))?;

    debug!(
        group = group_path,
        layer,
        depth = ?depth,
        shape = ?field.shape(),
        masked = field.count_masked(),
        "Extracted field"
    );
    Ok(field)
}

/// Read a field by its name under `/Results`.
pub fn read_results_field(
    handle: &DatasetHandle,
    name: &str,
    layer: usize,
) -> MohidResult<MaskedArray3> {
    read_field(handle, &results_path(name), layer)
}

/// Names of the members of `/Results`: fields and Lagrangian origins.
pub fn list_results(handle: &DatasetHandle) -> MohidResult<Vec<String>> {
    handle.member_names(RESULTS_GROUP)
}

/// Stack the OpenPoints steps into a `(time, lon, lat)` "closed" mask.
///
/// A 3-D mask is reduced with the same layer selection as a 3-D field.
/// A 2-D field on a 3-D mask takes the surface layer.
fn read_closed_points(
    handle: &DatasetHandle,
    field_depth: Option<usize>,
    layer: usize,
) -> MohidResult<Array3<bool>> {
    let stacked = handle.stack_steps(GRID_OPEN_POINTS).map_err(|e| match e {
        MohidError::FieldNotFound { .. } => MohidError::missing_grid(handle.path(), GRID_OPEN_POINTS),
        other => other,
    })?;

    let open_points = match stacked.ndim() {
        3 => into_ix3(stacked, GRID_OPEN_POINTS)?,
        4 => {
            let stacked = into_ix4(stacked, GRID_OPEN_POINTS)?;
            let depth = stacked.len_of(Axis(1));
            let mask_layer = match field_depth {
                Some(field_depth) if field_depth != depth => {
                    return Err(MohidError::ShapeMismatch {
                        path: handle.path().to_path_buf(),
                        what: format!("vertical extent of '{}'", GRID_OPEN_POINTS),
                        expected: vec![field_depth],
                        found: vec![depth],
                    });
                }
                Some(_) => layer,
                None => 0,
            };
            if depth == 0 {
                return Err(MohidError::invalid_format(format!(
                    "'{}' has no vertical layers",
                    GRID_OPEN_POINTS
                )));
            }
            surface_layer(stacked, mask_layer)
        }
        n => {
            return Err(MohidError::invalid_format(format!(
                "'{}' steps must be 2-D or 3-D, found {}-D",
                GRID_OPEN_POINTS,
                n - 1
            )))
        }
    };

    let (closed, non_binary) = closed_points(&open_points);
    if non_binary > 0 {
        warn!(
            path = %handle.path().display(),
            group = GRID_OPEN_POINTS,
            count = non_binary,
            "OpenPoints holds values other than 0 and 1; values below 1 are treated as closed"
        );
    }
    Ok(closed)
}

/// Flag closed points: a value narrowed to 16 bits below 1.
///
/// Also returns how many stored values were not exactly 0 or 1.
fn closed_points(open_points: &Array3<f64>) -> (Array3<bool>, usize) {
    let mut non_binary = 0;
    let closed = open_points.mapv(|value| {
        if value != 0.0 && value != 1.0 {
            non_binary += 1;
        }
        narrow_open_point(value) < 1
    });
    (closed, non_binary)
}

/// Truncate toward zero, saturating at the i16 limits. NaN narrows to 0.
///
/// A value beyond the i16 range stays on its own side of zero instead of
/// wrapping, so 40000.0 counts as open and -40000.0 as closed.
fn narrow_open_point(value: f64) -> i16 {
    value as i16
}

/// Select `layer` (0 = surface) from a `(time, depth, lon, lat)` stack whose
/// depth axis runs bottom to top.
fn surface_layer<A: Clone>(mut stacked: Array4<A>, layer: usize) -> Array3<A> {
    stacked.invert_axis(Axis(1));
    stacked.index_axis_move(Axis(1), layer)
}

/// `(time, lon, lat)` to a standard-layout `(time, lat, lon)`.
fn to_lat_lon<A: Clone>(array: Array3<A>) -> Array3<A> {
    array.permuted_axes([0, 2, 1]).as_standard_layout().into_owned()
}

fn into_ix3(array: ArrayD<f64>, group_path: &str) -> MohidResult<Array3<f64>> {
    array
        .into_dimensionality::<Ix3>()
        .map_err(|e| MohidError::invalid_format(format!("'{}': {}", group_path, e)))
}

fn into_ix4(array: ArrayD<f64>, group_path: &str) -> MohidResult<Array4<f64>> {
    array
        .into_dimensionality::<Ix4>()
        .map_err(|e| MohidError::invalid_format(format!("'{}': {}", group_path, e)))
}
