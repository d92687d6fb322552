//! Inverse-square dispersion surrogate.
//!
//! `concentration = emission / (d^2 + eps)`. This stands in for a Gaussian
//! plume and ignores wind, stability class and mixing height. It is only
//! meant to rank scenarios against each other, not to predict monitored
//! concentrations.

use crate::global_variables::DISPERSION_EPSILON_KM2;
use crate::network_model::intersections::haversine_km;

/// Relative concentration at `distance_km` from a source emitting `emission` g/h.
pub fn disperse(emission: f64, distance_km: f64) -> f64 {
    emission / (distance_km * distance_km + DISPERSION_EPSILON_KM2)
}

/// Straight-line source-receptor distance, lifted off the carriageway by
/// `roadside_offset_km` so a receptor on the road is never at zero distance.
pub fn receptor_distance_km(source: (f64, f64), receptor: (f64, f64), roadside_offset_km: f64) -> f64 {
    haversine_km(source.0, source.1, receptor.0, receptor.1).hypot(roadside_offset_km)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decays_with_distance_and_stays_finite_at_source() {
        let at_source = disperse(100.0, 0.0);
        assert!(at_source.is_finite());
        assert!((at_source - 10_000.0).abs() < 1e-6);
        assert!(disperse(100.0, 1.0) < disperse(100.0, 0.5));
    }

    #[test]
    fn offset_sets_the_minimum_distance() {
        let d = receptor_distance_km((28.6, 77.2), (28.6, 77.2), 0.5);
        assert!((d - 0.5).abs() < 1e-12);
    }
}
