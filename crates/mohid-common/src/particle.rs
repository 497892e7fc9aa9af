//! Lagrangian particle sets.

use serde::{Deserialize, Serialize};

use crate::masked::MaskError;

/// Particles present at one output step of a Lagrangian origin.
///
/// The three vectors are co-indexed: entry `i` of each describes the same
/// particle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleSet {
    pub longitude: Vec<f64>,
    pub latitude: Vec<f64>,
    pub values: Vec<f64>,
}

impl ParticleSet {
    /// Build a set from co-indexed arrays. Fails if the lengths differ.
    pub fn new(longitude: Vec<f64>, latitude: Vec<f64>, values: Vec<f64>) -> Result<Self, MaskError> {
        if longitude.len() != latitude.len() || longitude.len() != values.len() {
            return Err(MaskError::ShapeMismatch {
                data: vec![values.len()],
                mask: vec![longitude.len(), latitude.len()],
            });
        }
        Ok(Self {
            longitude,
            latitude,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keep the particles whose value is `>= min_value`, preserving order.
    ///
    /// NaN values never pass the threshold.
    pub fn filter_min(&self, min_value: f64) -> Self {
        let mut kept = Self::default();
        for (i, &value) in self.values.iter().enumerate() {
            if value >= min_value {
                kept.longitude.push(self.longitude[i]);
                kept.latitude.push(self.latitude[i]);
                kept.values.push(value);
            }
        }
        kept
    }

    /// `(min, max)` of the particle values, ignoring NaN.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            })
    }

    /// Iterate `(longitude, latitude, value)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.longitude
            .iter()
            .zip(&self.latitude)
            .zip(&self.values)
            .map(|((&lon, &lat), &value)| (lon, lat, value))
    }
}
