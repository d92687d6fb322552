use serde::{Deserialize, Serialize};
use std::fmt;

/// AQI levels that drive the population exposure estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Nobody is counted as affected at or below this AQI.
    pub affected_threshold_aqi: f64,
    /// The whole zone population is affected at or above this AQI; also the
    /// AQI at which respiratory symptoms reach 100%.
    pub full_exposure_aqi: f64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            affected_threshold_aqi: 200.0,
            full_exposure_aqi: 500.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthRisk {
    None,
    Low,
    Moderate,
    High,
    VeryHigh,
    Critical,
}

impl HealthRisk {
    pub fn from_aqi(aqi: f64) -> Self {
        match aqi {
            a if a <= 50.0 => HealthRisk::None,
            a if a <= 100.0 => HealthRisk::Low,
            a if a <= 200.0 => HealthRisk::Moderate,
            a if a <= 300.0 => HealthRisk::High,
            a if a <= 400.0 => HealthRisk::VeryHigh,
            _ => HealthRisk::Critical,
        }
    }
}

impl fmt::Display for HealthRisk {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            HealthRisk::None => "None",
            HealthRisk::Low => "Low",
            HealthRisk::Moderate => "Moderate",
            HealthRisk::High => "High",
            HealthRisk::VeryHigh => "Very High",
            HealthRisk::Critical => "Critical",
        };
        write!(f, "{}", label)
    }
}

/// Exposure of one zone's residents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthImpact {
    pub risk: HealthRisk,
    pub affected_population: u64,
    /// Share of residents expected to show respiratory symptoms, 0 to 100.
    pub respiratory_symptoms_pct: f64,
}

/// Estimates how many residents of a zone are affected at a given AQI.
///
/// The affected share grows linearly from 0 at `affected_threshold_aqi` to
/// the whole population at `full_exposure_aqi` and is clamped to [0, 1].
pub fn health_impact(aqi: f64, population: u64, config: &HealthConfig) -> HealthImpact {
    let span = config.full_exposure_aqi - config.affected_threshold_aqi;
    let share = if span > 0.0 {
        ((aqi - config.affected_threshold_aqi) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let symptoms = if config.full_exposure_aqi > 0.0 {
        (aqi / config.full_exposure_aqi).clamp(0.0, 1.0) * 100.0
    } else {
        0.0
    };
    HealthImpact {
        risk: HealthRisk::from_aqi(aqi),
        affected_population: (population as f64 * share).round() as u64,
        respiratory_symptoms_pct: symptoms,
    }
}
