use crate::network_model::vehicles::ClassValues;
use serde::{Deserialize, Serialize};

/// One row of the baseline origin-destination matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OdPair {
    /// Index of the origin intersection.
    pub origin: usize,
    /// Index of the destination intersection.
    pub destination: usize,
    pub demand_vph: f64,
    /// Share of `demand_vph` per class; sums to 1.
    pub class_split: ClassValues,
}

impl OdPair {
    /// Hourly demand broken down by class.
    pub fn class_demand(&self) -> ClassValues {
        self.class_split.scaled(self.demand_vph)
    }
}

/// Normalises a split so its shares add up to one. An all-zero split stays zero.
pub fn normalise_split(split: ClassValues) -> ClassValues {
    let total = split.total();
    if total <= 0.0 {
        return ClassValues::default();
    }
    split.scaled(1.0 / total)
}
