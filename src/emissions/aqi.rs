use serde::{Deserialize, Serialize};
use std::fmt;

/// CPCB PM2.5 breakpoints: (concentration low, high, AQI low, high).
/// Bands are contiguous so the index has no jumps at band edges.
const PM25_BREAKPOINTS: [(f64, f64, f64, f64); 6] = [
    (0.0, 30.0, 0.0, 50.0),
    (30.0, 60.0, 50.0, 100.0),
    (60.0, 90.0, 100.0, 200.0),
    (90.0, 120.0, 200.0, 300.0),
    (120.0, 250.0, 300.0, 400.0),
    (250.0, 380.0, 400.0, 500.0),
];

/// Piecewise-linear PM2.5 (µg/m³) to AQI. Clamps to 0 below the table and 500 above it.
pub fn pm25_to_aqi(pm25: f64) -> f64 {
    if pm25.is_nan() || pm25 <= 0.0 {
        return 0.0;
    }
    for &(c_lo, c_hi, i_lo, i_hi) in PM25_BREAKPOINTS.iter() {
        if pm25 <= c_hi {
            return i_lo + (pm25 - c_lo) * (i_hi - i_lo) / (c_hi - c_lo);
        }
    }
    500.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Satisfactory,
    ModeratelyPolluted,
    Poor,
    VeryPoor,
    Severe,
}

impl AqiCategory {
    pub fn from_aqi(aqi: f64) -> Self {
        match aqi {
            a if a <= 50.0 => AqiCategory::Good,
            a if a <= 100.0 => AqiCategory::Satisfactory,
            a if a <= 200.0 => AqiCategory::ModeratelyPolluted,
            a if a <= 300.0 => AqiCategory::Poor,
            a if a <= 400.0 => AqiCategory::VeryPoor,
            _ => AqiCategory::Severe,
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            AqiCategory::Good => "Good",
            AqiCategory::Satisfactory => "Satisfactory",
            AqiCategory::ModeratelyPolluted => "Moderately Polluted",
            AqiCategory::Poor => "Poor",
            AqiCategory::VeryPoor => "Very Poor",
            AqiCategory::Severe => "Severe",
        };
        write!(f, "{}", label)
    }
}
