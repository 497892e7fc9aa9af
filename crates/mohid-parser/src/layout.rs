//! Fixed group layout of MOHID HDF5 output files.
//!
//! ```text
//! /Time/Time_00001 ...                     [year, month, day, hour, minute, second]
//! /Grid/Latitude, /Grid/Longitude          boundary meshes, (lon, lat)
//! /Grid/Bathymetry                         (lon, lat), land <= -98
//! /Grid/OpenPoints/OpenPoints_00001 ...    1 = water, 0 = land
//! /Results/<field>/<field>_00001 ...       ([depth,] lon, lat)
//! /Results/<origin>/{Latitude,Longitude,<property>}/<name>_00001 ...
//! ```

pub const TIME_GROUP: &str = "/Time";
pub const GRID_LATITUDE: &str = "/Grid/Latitude";
pub const GRID_LONGITUDE: &str = "/Grid/Longitude";
pub const GRID_BATHYMETRY: &str = "/Grid/Bathymetry";
pub const GRID_OPEN_POINTS: &str = "/Grid/OpenPoints";
pub const RESULTS_GROUP: &str = "/Results";

/// Per-step coordinate groups of a Lagrangian origin.
pub const PARTICLE_LATITUDE: &str = "Latitude";
pub const PARTICLE_LONGITUDE: &str = "Longitude";

/// Path of a named field under `/Results`.
pub fn results_path(name: &str) -> String {
    join(RESULTS_GROUP, name)
}

/// Join two group path fragments with exactly one separator.
pub fn join(parent: &str, child: &str) -> String {
    format!(
        "{}/{}",
        parent.trim_end_matches('/'),
        child.trim_start_matches('/')
    )
}

/// Put per-step member names into step (chronological) order.
///
/// HDF5 reports members by name. MOHID suffixes every step with a 1-based
/// counter (`Temperature_00012`), so when every name carries a numeric
/// suffix the members are ordered by that number. This agrees with name
/// order for zero-padded counters and stays correct when the counter
/// outgrows its padding. Names without a suffix keep the library order.
pub fn order_members(names: Vec<String>) -> Vec<String> {
    let keys: Option<Vec<u64>> = names.iter().map(|name| step_suffix(name)).collect();

    match keys {
        Some(keys) => {
            let mut keyed: Vec<(u64, String)> = keys.into_iter().zip(names).collect();
            keyed.sort_by_key(|(key, _)| *key);
            keyed.into_iter().map(|(_, name)| name).collect()
        }
        None => names,
    }
}

/// Numeric counter after the last `_` of a member name.
pub fn step_suffix(name: &str) -> Option<u64> {
    let (_, digits) = name.rsplit_once('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
