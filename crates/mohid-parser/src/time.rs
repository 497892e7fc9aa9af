//! Output instants from the `/Time` group.

use chrono::NaiveDateTime;
use mohid_common::time_from_record;
use tracing::debug;

use crate::accessor::DatasetHandle;
use crate::error::{MohidError, MohidResult};
use crate::layout::TIME_GROUP;

/// Read every `/Time` record in step order.
///
/// Any record that is not six whole numbers forming a valid calendar instant
/// fails the whole read with [`MohidError::MalformedTimeRecord`].
pub fn read_time(handle: &DatasetHandle) -> MohidResult<Vec<NaiveDateTime>> {
    let members = handle.members(TIME_GROUP)?;
    let mut times = Vec::with_capacity(members.len());

    for member in &members {
        let record: Vec<f64> = handle.read_dataset(TIME_GROUP, member)?.iter().copied().collect();
        let time = time_from_record(&record).map_err(|e| MohidError::MalformedTimeRecord {
            path: handle.path().to_path_buf(),
            member: member.clone(),
            reason: e.to_string(),
        })?;
        times.push(time);
    }

    debug!(
        path = %handle.path().display(),
        steps = times.len(),
        first = ?times.first(),
        last = ?times.last(),
        "Read time axis"
    );
    Ok(times)
}
