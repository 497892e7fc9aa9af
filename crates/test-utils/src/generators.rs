//! Test data generators for synthetic MOHID grids and fields.
//!
//! Every generator follows MOHID's storage layout: horizontal arrays are
//! `(lon, lat)` and 3-D arrays are `(depth, lon, lat)` with depth index 0 at
//! the bottom.

use ndarray::{Array2, ArrayD, IxDyn};

/// Evenly spaced cell boundaries: `start`, `start + step`, ... (`n` values).
///
/// # Example
///
/// ```
/// use test_utils::boundary_axis;
///
/// assert_eq!(boundary_axis(37.0, 0.5, 3), vec![37.0, 37.5, 38.0]);
/// ```
pub fn boundary_axis(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Latitude boundary mesh as MOHID stores it: shape `(n_lon, n_lat)`,
/// latitude varying along the second axis.
pub fn latitude_mesh(latitude: &[f64], longitude: &[f64]) -> Array2<f64> {
    Array2::from_shape_fn((longitude.len(), latitude.len()), |(_, j)| latitude[j])
}

/// Longitude boundary mesh as MOHID stores it: shape `(n_lon, n_lat)`,
/// longitude varying along the first axis.
pub fn longitude_mesh(latitude: &[f64], longitude: &[f64]) -> Array2<f64> {
    Array2::from_shape_fn((longitude.len(), latitude.len()), |(i, _)| longitude[i])
}

/// Predictable cell value.
///
/// `step * 1000 + layer * 100 + lon * 10 + lat`, where `layer` is the stored
/// (bottom-up) depth index. Unique for grids under 10 cells per axis and
/// fewer than 10 layers.
pub fn cell_value(step: usize, layer: usize, lon: usize, lat: usize) -> f64 {
    (step * 1000 + layer * 100 + lon * 10 + lat) as f64
}

/// One step of a 2-D field, `(n_lon, n_lat)`, filled with [`cell_value`].
///
/// # Example
///
/// ```
/// use test_utils::create_test_field_2d;
///
/// let field = create_test_field_2d(1, 3, 2);
/// assert_eq!(field.shape(), &[3, 2]);
/// assert_eq!(field[[2, 1]], 1021.0);
/// ```
pub fn create_test_field_2d(step: usize, n_lon: usize, n_lat: usize) -> ArrayD<f64> {
    ArrayD::from_shape_fn(IxDyn(&[n_lon, n_lat]), |idx| {
        cell_value(step, 0, idx[0], idx[1])
    })
}

/// One step of a 3-D field, `(depth, n_lon, n_lat)`, filled with
/// [`cell_value`].
pub fn create_test_field_3d(step: usize, depth: usize, n_lon: usize, n_lat: usize) -> ArrayD<f64> {
    ArrayD::from_shape_fn(IxDyn(&[depth, n_lon, n_lat]), |idx| {
        cell_value(step, idx[0], idx[1], idx[2])
    })
}

/// An array of any shape holding a single value.
pub fn create_constant_field(shape: &[usize], value: f64) -> ArrayD<f64> {
    ArrayD::from_elem(IxDyn(shape), value)
}
