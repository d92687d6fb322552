// src/shared_data.rs

use crate::emissions::aqi::AqiCategory;
use crate::emissions::factors::PollutantValues;
use crate::emissions::health::HealthImpact;
use crate::intervention_engine::interventions::InterventionType;
use crate::network_model::assignment::ExcludedPair;
use crate::network_model::vehicles::ClassValues;
use serde::Serialize;

/// Simulation result for one segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentResult {
    pub segment_id: String,
    pub zone_id: String,
    pub flow_vph: f64,
    pub class_flows: ClassValues,
    pub vc_ratio: f64,
    pub speed_kmh: f64,
    pub travel_time_min: f64,
    /// Signal delay at the downstream intersection (seconds per vehicle).
    pub signal_delay_s: f64,
    pub capacity_undefined: bool,
    /// Grams per hour.
    pub emissions: PollutantValues,
}

/// Aggregate result for one zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneResult {
    pub zone_id: String,
    pub name: String,
    pub population: u64,
    pub aqi: f64,
    pub category: AqiCategory,
    pub pm25: f64,
    pub no2: f64,
    /// Plain mean over member segments; 0 for an empty zone.
    pub mean_speed_kmh: f64,
    /// Sum of member segment flows.
    pub total_flow_vph: f64,
    pub health: HealthImpact,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntersectionResult {
    pub intersection_id: String,
    pub mean_delay_s: f64,
    pub inbound_flow_vph: f64,
}

/// Travel outcome of one OD pair. `reachable` is false for excluded pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OdResult {
    pub origin: String,
    pub destination: String,
    pub demand_vph: f64,
    pub reachable: bool,
    pub distance_km: f64,
    pub travel_time_min: f64,
    pub hops: usize,
}

/// Full output of one pipeline run over a network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub segments: Vec<SegmentResult>,
    pub zones: Vec<ZoneResult>,
    pub intersections: Vec<IntersectionResult>,
    pub od_results: Vec<OdResult>,
    pub excluded_pairs: Vec<ExcludedPair>,
}

impl Evaluation {
    pub fn excluded_pair_count(&self) -> usize {
        self.excluded_pairs.len()
    }

    pub fn mean_aqi(&self) -> f64 {
        mean(self.zones.iter().map(|z| z.aqi))
    }

    pub fn mean_speed_kmh(&self) -> f64 {
        mean(self.segments.iter().map(|s| s.speed_kmh))
    }

    pub fn total_flow_vph(&self) -> f64 {
        self.segments.iter().map(|s| s.flow_vph).sum()
    }

    pub fn mean_intersection_delay_s(&self) -> f64 {
        mean(self.intersections.iter().map(|i| i.mean_delay_s))
    }

    /// Residents above the affected AQI threshold across all zones.
    pub fn affected_population(&self) -> u64 {
        self.zones.iter().map(|z| z.health.affected_population).sum()
    }

    pub fn zone(&self, zone_id: &str) -> Option<&ZoneResult> {
        self.zones.iter().find(|z| z.zone_id == zone_id)
    }

    pub fn segment(&self, segment_id: &str) -> Option<&SegmentResult> {
        self.segments.iter().find(|s| s.segment_id == segment_id)
    }
}

/// Arithmetic mean in iteration order; 0 for no values.
pub fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneDelta {
    pub zone_id: String,
    pub baseline_aqi: f64,
    pub scenario_aqi: f64,
    /// Positive when air got cleaner.
    pub aqi_reduction: f64,
    pub baseline_affected_population: u64,
    pub scenario_affected_population: u64,
}

/// Baseline versus scenario comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactReport {
    /// Mean zone AQI drop; positive is an improvement.
    pub aqi_reduction: f64,
    pub speed_change_pct: f64,
    pub traffic_change_pct: f64,
    pub lives_saved_estimate: f64,
    pub delay_change_pct: f64,
    /// Drop in residents above the affected AQI threshold, summed over zones.
    pub affected_population_reduction: i64,
    pub zone_deltas: Vec<ZoneDelta>,
}

/// A ranked candidate intervention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub intervention_type: InterventionType,
    pub targets: Vec<String>,
    pub predicted_impact: ImpactReport,
    pub confidence_score: f64,
    pub cost_millions: f64,
    pub implementation_hours: f64,
    pub score: f64,
}
