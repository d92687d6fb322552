use crate::global_variables::EARTH_RADIUS_KM;
use serde::{Deserialize, Serialize};

/// Signal phase a segment arrives on, derived from its bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Approach {
    NorthSouth,
    EastWest,
}

/// Represents a network node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    /// Unique identifier for the intersection.
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    /// Full signal cycle in seconds. Zero means the junction is unsignalised.
    pub cycle_s: f64,
    /// Green time for the north-south approach.
    pub green_ns_s: f64,
    /// Green time for the east-west approach.
    pub green_ew_s: f64,
}

impl Intersection {
    pub fn new(id: &str, lat: f64, lng: f64, cycle_s: f64, green_ns_s: f64, green_ew_s: f64) -> Self {
        Self {
            id: id.to_string(),
            lat,
            lng,
            cycle_s,
            green_ns_s,
            green_ew_s,
        }
    }

    pub fn is_signalised(&self) -> bool {
        self.cycle_s > 0.0
    }

    pub fn green_for(&self, approach: Approach) -> f64 {
        match approach {
            Approach::NorthSouth => self.green_ns_s,
            Approach::EastWest => self.green_ew_s,
        }
    }

    /// Share of the cycle the approach is green, in [0, 1].
    pub fn green_ratio(&self, approach: Approach) -> f64 {
        if !self.is_signalised() {
            return 1.0;
        }
        (self.green_for(approach) / self.cycle_s).clamp(0.0, 1.0)
    }

    /// Approach used by traffic travelling from `from` into this intersection.
    /// Mostly-vertical movement is north-south, otherwise east-west.
    pub fn approach_from(&self, from: &Intersection) -> Approach {
        let d_lat = (self.lat - from.lat).abs();
        let d_lng = (self.lng - from.lng).abs() * self.lat.to_radians().cos();
        if d_lat >= d_lng {
            Approach::NorthSouth
        } else {
            Approach::EastWest
        }
    }
}

/// Great-circle distance between two points in km.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (lat1, lng1, lat2, lng2) = (
        lat1.to_radians(),
        lng1.to_radians(),
        lat2.to_radians(),
        lng2.to_radians(),
    );
    let d_lat = lat2 - lat1;
    let d_lng = lng2 - lng1;
    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * a.sqrt().min(1.0).asin() * EARTH_RADIUS_KM
}
