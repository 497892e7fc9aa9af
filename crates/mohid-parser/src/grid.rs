//! Grid bounds and bathymetry from the `/Grid` group.

use mohid_common::{GridBounds, MaskedArray, MaskedArray2};
use ndarray::{Array2, Ix2};

use crate::accessor::DatasetHandle;
use crate::error::{MohidError, MohidResult};
use crate::layout::{GRID_BATHYMETRY, GRID_LATITUDE, GRID_LONGITUDE};

/// Bathymetry at or below this value marks a land cell.
pub const LAND_SENTINEL: f64 = -98.0;

/// Read the latitude and longitude cell bounds.
///
/// `/Grid/Latitude` and `/Grid/Longitude` are full boundary meshes stored
/// `(lon, lat)`. Latitude varies along the second axis and longitude along
/// the first, so the bounds are the first row of the latitude mesh and the
/// first column of the longitude mesh.
pub fn read_grid(handle: &DatasetHandle) -> MohidResult<GridBounds> {
    let latitude = read_mesh(handle, GRID_LATITUDE)?;
    let longitude = read_mesh(handle, GRID_LONGITUDE)?;

    Ok(GridBounds::new(
        latitude.row(0).to_vec(),
        longitude.column(0).to_vec(),
    ))
}

/// Read bathymetry as a `(lat, lon)` masked array, land masked.
pub fn read_bathymetry(handle: &DatasetHandle) -> MohidResult<MaskedArray2> {
    let stored = read_mesh(handle, GRID_BATHYMETRY)?;
    let depth = stored.t().as_standard_layout().into_owned();
    Ok(MaskedArray::masked_where(depth, |d| d <= LAND_SENTINEL))
}

fn read_mesh(handle: &DatasetHandle, member: &str) -> MohidResult<Array2<f64>> {
    let array = handle
        .read_member(member)?
        .ok_or_else(|| MohidError::missing_grid(handle.path(), member))?;

    let shape = array.shape().to_vec();
    let mesh = array.into_dimensionality::<Ix2>().map_err(|_| {
        MohidError::invalid_format(format!("'{}' must be 2-D, found shape {:?}", member, shape))
    })?;

    if mesh.is_empty() {
        return Err(MohidError::invalid_format(format!("'{}' is empty", member)));
    }
    Ok(mesh)
}
