use crate::emissions::health::HealthConfig;
use crate::errors::{EngineError, Result};
use crate::intervention_engine::interventions::InterventionType;
use crate::network_model::vehicles::ClassValues;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Cost, lead time and confidence of one intervention type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterventionCost {
    /// Economic cost in millions (INR).
    pub cost_millions: f64,
    pub implementation_hours: f64,
    /// Confidence reported alongside a recommendation, in [0, 1].
    pub confidence: f64,
}

impl InterventionCost {
    const fn new(cost_millions: f64, implementation_hours: f64, confidence: f64) -> Self {
        Self {
            cost_millions,
            implementation_hours,
            confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostTable {
    pub truck_ban: InterventionCost,
    pub odd_even: InterventionCost,
    pub lane_addition: InterventionCost,
    pub signal_tuning: InterventionCost,
    pub dynamic_rerouting: InterventionCost,
    pub emergency: InterventionCost,
}

impl Default for CostTable {
    fn default() -> Self {
        Self {
            truck_ban: InterventionCost::new(2.0, 2.0, 0.90),
            odd_even: InterventionCost::new(0.5, 24.0, 0.85),
            lane_addition: InterventionCost::new(10.0, 720.0, 0.80),
            signal_tuning: InterventionCost::new(0.1, 24.0, 0.85),
            dynamic_rerouting: InterventionCost::new(0.2, 1.0, 0.80),
            emergency: InterventionCost::new(5.0, 1.0, 0.95),
        }
    }
}

impl CostTable {
    pub fn entry(&self, kind: InterventionType) -> &InterventionCost {
        match kind {
            InterventionType::TruckBan => &self.truck_ban,
            InterventionType::OddEven => &self.odd_even,
            InterventionType::LaneAddition => &self.lane_addition,
            InterventionType::SignalTuning => &self.signal_tuning,
            InterventionType::DynamicRerouting => &self.dynamic_rerouting,
            InterventionType::Emergency => &self.emergency,
        }
    }
}

/// Weights of the recommendation score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    pub aqi_reduction: f64,
    pub lives_saved: f64,
    pub speed_change_pct: f64,
    pub cost_millions: f64,
    pub implementation_hours: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            aqi_reduction: 1000.0,
            lives_saved: 10000.0,
            speed_change_pct: 100.0,
            cost_millions: 1.0,
            implementation_hours: 10.0,
        }
    }
}

/// Policy assumptions of the engine. None of these are derived constants;
/// every field can be overridden from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Estimated lives saved per point of mean AQI reduction.
    pub lives_saved_per_aqi_point: f64,
    pub ranking_weights: RankingWeights,
    pub cost_table: CostTable,
    /// Class split applied to `mixed` OD rows (car, truck, bus, auto).
    pub default_class_split: ClassValues,
    /// Hour of day the scenario represents; gates time-windowed bans.
    pub analysis_hour: u32,
    /// Regional PM2.5 added to every zone (µg/m³).
    pub background_pm25: f64,
    /// Regional NO2 added to every zone (µg/m³).
    pub background_no2: f64,
    /// Converts g/h over km² into µg/m³.
    pub dispersion_scale: f64,
    /// Receptor offset from the carriageway (km).
    pub roadside_offset_km: f64,
    pub no2_fraction_of_nox: f64,
    /// Worst zones considered by zone-level recommendation candidates.
    pub recommendation_zone_count: usize,
    /// Most congested segments considered for lane addition.
    pub recommendation_segment_count: usize,
    pub health: HealthConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lives_saved_per_aqi_point: 0.2,
            ranking_weights: RankingWeights::default(),
            cost_table: CostTable::default(),
            default_class_split: ClassValues([0.70, 0.15, 0.05, 0.10]),
            analysis_hour: 9,
            background_pm25: 35.0,
            background_no2: 20.0,
            dispersion_scale: 0.005,
            roadside_offset_km: 0.5,
            no2_fraction_of_nox: 0.1,
            recommendation_zone_count: 2,
            recommendation_segment_count: 3,
            health: HealthConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        log::info!("[Config] Loaded {}", path.as_ref().display());
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |message: String| Err(EngineError::invalid_input("config", message));
        if self.analysis_hour >= 24 {
            return fail(format!("analysis_hour {} is not an hour of day", self.analysis_hour));
        }
        for (name, value) in [
            ("lives_saved_per_aqi_point", self.lives_saved_per_aqi_point),
            ("background_pm25", self.background_pm25),
            ("background_no2", self.background_no2),
            ("dispersion_scale", self.dispersion_scale),
            ("roadside_offset_km", self.roadside_offset_km),
            ("no2_fraction_of_nox", self.no2_fraction_of_nox),
        ] {
            if !value.is_finite() || value < 0.0 {
                return fail(format!("{} must be a non-negative number, got {}", name, value));
            }
        }
        if self.default_class_split.0.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return fail("default_class_split has a negative share".to_string());
        }
        let health = &self.health;
        if !health.affected_threshold_aqi.is_finite()
            || !health.full_exposure_aqi.is_finite()
            || health.affected_threshold_aqi < 0.0
            || health.affected_threshold_aqi >= health.full_exposure_aqi
        {
            return fail(format!(
                "health thresholds need 0 <= affected ({}) < full exposure ({})",
                health.affected_threshold_aqi, health.full_exposure_aqi
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            EngineConfig::from_json_str(r#"{ "analysis_hour": 22, "ranking_weights": { "aqi_reduction": 5.0 } }"#)
                .unwrap();
        assert_eq!(config.analysis_hour, 22);
        assert_eq!(config.ranking_weights.aqi_reduction, 5.0);
        assert_eq!(config.ranking_weights.lives_saved, 10000.0);
        assert_eq!(config.cost_table.truck_ban.cost_millions, 2.0);

        let config = EngineConfig::from_json_str(r#"{ "health": { "affected_threshold_aqi": 150.0 } }"#).unwrap();
        assert_eq!(config.health.affected_threshold_aqi, 150.0);
        assert_eq!(config.health.full_exposure_aqi, 500.0);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(EngineConfig::from_json_str(r#"{ "analysis_hour": 24 }"#).is_err());
        assert!(EngineConfig::from_json_str(r#"{ "background_pm25": -1.0 }"#).is_err());
        assert!(EngineConfig::from_json_str(r#"{ "health": { "affected_threshold_aqi": 500.0 } }"#).is_err());
        assert!(matches!(
            EngineConfig::from_json_str("{ not json"),
            Err(EngineError::Json(_))
        ));
    }

    #[test]
    fn cost_table_is_keyed_by_type() {
        let table = CostTable::default();
        assert_eq!(table.entry(InterventionType::Emergency).confidence, 0.95);
        assert_eq!(table.entry(InterventionType::OddEven).implementation_hours, 24.0);
    }
}
