use crate::network_model::intersections::Approach;
use crate::network_model::vehicles::ClassValues;
use serde::{Deserialize, Serialize};

/// Functional class of a road. Informational; the solver treats all classes alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadClass {
    Highway,
    Arterial,
    Collector,
    Local,
}

impl RoadClass {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "highway" | "expressway" => Some(RoadClass::Highway),
            "arterial" | "ring_road" | "ring road" => Some(RoadClass::Arterial),
            "collector" => Some(RoadClass::Collector),
            "local" => Some(RoadClass::Local),
            _ => None,
        }
    }
}

/// Represents a directed road segment (edge between two intersections).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub name: String,
    /// Index of the start intersection.
    pub origin: usize,
    /// Index of the end intersection.
    pub destination: usize,
    /// Index of the zone the segment reports to.
    pub zone: usize,
    pub length_km: f64,
    pub lanes: u32,
    pub free_speed_kmh: f64,
    /// Vehicles per hour the segment carries at v/c = 1.
    pub capacity_vph: f64,
    pub road_class: RoadClass,
    /// Signal phase the segment arrives on at `destination`.
    pub approach: Approach,
    /// Closed segments are skipped by routing.
    pub closed: bool,
    /// Routing weight multiplier; above 1.0 marks a degraded segment.
    pub route_penalty: f64,
    /// Share of each class's assigned flow that actually uses the segment.
    pub class_factors: ClassValues,
}

impl Segment {
    /// Routing weight used by the shortest-path search.
    pub fn route_weight(&self) -> f64 {
        self.length_km * self.route_penalty
    }

    pub fn is_degraded(&self) -> bool {
        self.route_penalty > 1.0
    }
}
