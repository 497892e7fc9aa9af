//! Common types shared across the MOHID HDF5 viewer workspace.
//!
//! Everything here is a plain owned value: extracted arrays never keep a
//! reference back to the file they were read from.

pub mod grid;
pub mod masked;
pub mod particle;
pub mod time;

pub use grid::GridBounds;
pub use masked::{MaskError, MaskedArray, MaskedArray2, MaskedArray3};
pub use particle::ParticleSet;
pub use time::{is_chronological, time_from_record, TimeRecordError, TIME_RECORD_LEN};
