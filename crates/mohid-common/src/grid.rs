//! Boundary coordinates of a MOHID horizontal grid.

use serde::{Deserialize, Serialize};

/// Cell-boundary coordinates of a rectilinear MOHID grid.
///
/// MOHID stores the edges of each cell, not the centres, so a field defined
/// on this grid has one fewer entry than the bounds along each axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridBounds {
    /// Latitude of every cell boundary (degrees north)
    pub latitude: Vec<f64>,
    /// Longitude of every cell boundary (degrees east)
    pub longitude: Vec<f64>,
}

impl GridBounds {
    pub fn new(latitude: Vec<f64>, longitude: Vec<f64>) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn n_lat_bounds(&self) -> usize {
        self.latitude.len()
    }

    pub fn n_lon_bounds(&self) -> usize {
        self.longitude.len()
    }

    /// `(latitude, longitude)` shape of a cell-centred field on this grid.
    pub fn cell_shape(&self) -> (usize, usize) {
        (
            self.latitude.len().saturating_sub(1),
            self.longitude.len().saturating_sub(1),
        )
    }

    /// Lower-left corner latitude of every cell row (last boundary dropped).
    pub fn cell_latitudes(&self) -> &[f64] {
        drop_last(&self.latitude)
    }

    /// Lower-left corner longitude of every cell column (last boundary dropped).
    pub fn cell_longitudes(&self) -> &[f64] {
        drop_last(&self.longitude)
    }

    /// Geographic extent as `(min_lon, min_lat, max_lon, max_lat)`.
    ///
    /// Returns `None` for a grid with no bounds along either axis.
    pub fn extent(&self) -> Option<(f64, f64, f64, f64)> {
        let (min_lon, max_lon) = min_max(&self.longitude)?;
        let (min_lat, max_lat) = min_max(&self.latitude)?;
        Some((min_lon, min_lat, max_lon, max_lat))
    }
}

fn drop_last(values: &[f64]) -> &[f64] {
    match values.split_last() {
        Some((_, rest)) => rest,
        None => values,
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GridBounds {
        GridBounds::new(vec![37.0, 37.5, 38.0], vec![-9.0, -8.5, -8.0, -7.5])
    }

    #[test]
    fn test_cell_shape() {
        let grid = sample();
        assert_eq!(grid.n_lat_bounds(), 3);
        assert_eq!(grid.n_lon_bounds(), 4);
        assert_eq!(grid.cell_shape(), (2, 3));
        assert_eq!(GridBounds::new(vec![], vec![]).cell_shape(), (0, 0));
    }

    #[test]
    fn test_cell_origins() {
        let grid = sample();
        assert_eq!(grid.cell_latitudes(), &[37.0, 37.5]);
        assert_eq!(grid.cell_longitudes(), &[-9.0, -8.5, -8.0]);
        assert!(GridBounds::new(vec![], vec![]).cell_latitudes().is_empty());
    }

    #[test]
    fn test_extent() {
        assert_eq!(sample().extent(), Some((-9.0, 37.0, -7.5, 38.0)));
        assert_eq!(GridBounds::new(vec![1.0], vec![]).extent(), None);
    }

    #[test]
    fn test_serde_roundtrip() {
        let grid = sample();
        let json = serde_json::to_string(&grid).unwrap();
        let back: GridBounds = serde_json::from_str(&json).unwrap();
        assert_eq!(grid, back);
    }
}
