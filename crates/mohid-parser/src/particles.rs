//! Lagrangian particle extraction.
//!
//! Each emission origin is a group under `/Results` holding per-step
//! `Latitude`, `Longitude` and property groups. Entry `i` of one step
//! describes the same particle in all three.

use mohid_common::ParticleSet;
use tracing::debug;

use crate::accessor::DatasetHandle;
use crate::error::{MohidError, MohidResult};
use crate::layout::{join, results_path, PARTICLE_LATITUDE, PARTICLE_LONGITUDE};

/// Particles of `origin` at `step` whose `property` value is `>= min_value`.
///
/// The step must exist in the property group. Particles with a NaN value
/// are always dropped.
pub fn read_particles(
    handle: &DatasetHandle,
    origin: &str,
    property: &str,
    step: usize,
    min_value: f64,
) -> MohidResult<ParticleSet> {
    let origin_group = require_origin(handle, origin)?;

    let values = read_step(handle, &join(&origin_group, property), step)?;
    let longitude = read_step(handle, &join(&origin_group, PARTICLE_LONGITUDE), step)?;
    let latitude = read_step(handle, &join(&origin_group, PARTICLE_LATITUDE), step)?;

    if longitude.len() != values.len() || latitude.len() != values.len() {
        return Err(MohidError::ShapeMismatch {
            path: handle.path().to_path_buf(),
            what: format!("particle arrays of '{}' at step {}", origin_group, step),
            expected: vec![values.len(); 2],
            found: vec![longitude.len(), latitude.len()],
        });
    }

    let all = ParticleSet::new(longitude, latitude, values)
        .map_err(|e| MohidError::invalid_format(e.to_string()))?;
    let kept = all.filter_min(min_value);

    debug!(
        origin,
        property,
        step,
        min_value,
        total = all.len(),
        kept = kept.len(),
        "Extracted particles"
    );
    Ok(kept)
}

/// Number of stored steps of `property` for `origin`.
pub fn particle_steps(handle: &DatasetHandle, origin: &str, property: &str) -> MohidResult<usize> {
    let origin_group = require_origin(handle, origin)?;
    let property_group = join(&origin_group, property);
    if !handle.has_group(&property_group)? {
        return Err(MohidError::field_not_found(handle.path(), property_group));
    }
    Ok(handle.members(&property_group)?.len())
}

fn require_origin(handle: &DatasetHandle, origin: &str) -> MohidResult<String> {
    let origin_group = results_path(origin);
    if !handle.has_group(&origin_group)? {
        return Err(MohidError::field_not_found(handle.path(), origin_group));
    }
    Ok(origin_group)
}

fn read_step(handle: &DatasetHandle, group_path: &str, step: usize) -> MohidResult<Vec<f64>> {
    if !handle.has_group(group_path)? {
        return Err(MohidError::field_not_found(handle.path(), group_path));
    }

    let members = handle.members(group_path)?;
    let member = members.get(step).ok_or_else(|| MohidError::StepOutOfRange {
        path: handle.path().to_path_buf(),
        group: group_path.to_string(),
        step,
        steps: members.len(),
    })?;

    Ok(handle.read_dataset(group_path, member)?.iter().copied().collect())
}
