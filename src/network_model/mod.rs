//! Road network: segments, intersections, zones and the baseline OD matrix,
//! stored as index-based tables so a scenario snapshot is a plain `clone()`.

pub mod assignment;
pub mod demand;
pub mod grid;
pub mod intersections;
pub mod loader;
pub mod route_generation;
pub mod segments;
pub mod vehicles;
pub mod zones;

use crate::errors::{EngineError, Result};
use crate::global_variables::MAX_SEGMENTS;
use demand::{normalise_split, OdPair};
use intersections::Intersection;
use segments::{RoadClass, Segment};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use vehicles::{ClassValues, VehicleClass};
use zones::Zone;

/// Raw segment row as read from `segments.csv`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SegmentRecord {
    pub id: String,
    pub origin: String,
    pub destination: String,
    pub zone: String,
    pub length_km: f64,
    pub lanes: u32,
    pub free_speed_kmh: f64,
    pub capacity_vph: f64,
    #[serde(default)]
    pub road_class: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Raw intersection row as read from `intersections.csv`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct IntersectionRecord {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub cycle_s: f64,
    pub green_ns_s: f64,
    pub green_ew_s: f64,
}

/// Raw demand row as read from `od.csv`. `vehicle_class` may be `mixed`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct OdRecord {
    pub origin: String,
    pub destination: String,
    pub demand_vph: f64,
    pub vehicle_class: String,
}

/// Raw zone row as read from `zones.csv`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ZoneRecord {
    pub id: String,
    pub name: String,
    pub population: u64,
}

/// Everything needed to build a network, before validation.
#[derive(Debug, Clone, Default)]
pub struct NetworkRecords {
    pub segments: Vec<SegmentRecord>,
    pub intersections: Vec<IntersectionRecord>,
    pub od_pairs: Vec<OdRecord>,
    pub zones: Vec<ZoneRecord>,
}

/// Summary counts of a loaded network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkTopology {
    pub segments: usize,
    pub intersections: usize,
    pub zones: usize,
    pub od_pairs: usize,
    pub total_length_km: f64,
    pub total_lanes: u32,
    pub signalised_intersections: usize,
    pub segments_by_zone: Vec<(String, usize)>,
}

/// The directed corridor graph. Nodes are intersections, edges are segments.
#[derive(Debug, Clone, PartialEq)]
pub struct CorridorNetwork {
    segments: Vec<Segment>,
    intersections: Vec<Intersection>,
    zones: Vec<Zone>,
    od_pairs: Vec<OdPair>,
    /// Outgoing segment indexes per intersection index.
    outgoing: Vec<Vec<usize>>,
    segment_index: HashMap<String, usize>,
    intersection_index: HashMap<String, usize>,
    zone_index: HashMap<String, usize>,
}

impl CorridorNetwork {
    /// Validates the raw tables and builds the graph.
    /// `default_split` is used for OD rows whose class is `mixed`.
    pub fn load(records: NetworkRecords, default_split: &ClassValues) -> Result<Self> {
        if records.segments.len() > MAX_SEGMENTS {
            return Err(EngineError::data_integrity(
                "segments",
                format!(
                    "{} segments exceeds the limit of {}",
                    records.segments.len(),
                    MAX_SEGMENTS
                ),
            ));
        }

        let mut intersections = Vec::with_capacity(records.intersections.len());
        let mut intersection_index = HashMap::new();
        for row in records.intersections {
            if intersection_index.contains_key(&row.id) {
                return Err(EngineError::data_integrity(
                    "intersections",
                    format!("duplicate intersection id '{}'", row.id),
                ));
            }
            if !row.lat.is_finite() || !row.lng.is_finite() {
                return Err(EngineError::data_integrity(
                    "intersections",
                    format!("intersection '{}' has a non-finite position", row.id),
                ));
            }
            for (label, value) in [
                ("cycle_s", row.cycle_s),
                ("green_ns_s", row.green_ns_s),
                ("green_ew_s", row.green_ew_s),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(EngineError::data_integrity(
                        "intersections",
                        format!("intersection '{}' has invalid {} {}", row.id, label, value),
                    ));
                }
            }
            intersection_index.insert(row.id.clone(), intersections.len());
            intersections.push(Intersection::new(
                &row.id,
                row.lat,
                row.lng,
                row.cycle_s,
                row.green_ns_s,
                row.green_ew_s,
            ));
        }

        let mut zones = Vec::with_capacity(records.zones.len());
        let mut zone_index = HashMap::new();
        for row in records.zones {
            if zone_index.contains_key(&row.id) {
                return Err(EngineError::data_integrity(
                    "zones",
                    format!("duplicate zone id '{}'", row.id),
                ));
            }
            zone_index.insert(row.id.clone(), zones.len());
            zones.push(Zone::new(&row.id, &row.name, row.population));
        }

        let mut segments = Vec::with_capacity(records.segments.len());
        let mut segment_index = HashMap::new();
        let mut outgoing = vec![Vec::new(); intersections.len()];
        for row in records.segments {
            let idx = segments.len();
            let segment = build_segment(&row, &intersections, &intersection_index, &zone_index)?;
            if segment_index.contains_key(&row.id) {
                return Err(EngineError::data_integrity(
                    "segments",
                    format!("duplicate segment id '{}'", row.id),
                ));
            }
            outgoing[segment.origin].push(idx);
            zones[segment.zone].segments.push(idx);
            segment_index.insert(row.id.clone(), idx);
            segments.push(segment);
        }

        let mut od_pairs = Vec::with_capacity(records.od_pairs.len());
        for (row_number, row) in records.od_pairs.into_iter().enumerate() {
            let describe = || format!("row {} ({} -> {})", row_number + 1, row.origin, row.destination);
            let origin = *intersection_index.get(&row.origin).ok_or_else(|| {
                EngineError::data_integrity(
                    "od",
                    format!("{}: unknown origin intersection '{}'", describe(), row.origin),
                )
            })?;
            let destination = *intersection_index.get(&row.destination).ok_or_else(|| {
                EngineError::data_integrity(
                    "od",
                    format!(
                        "{}: unknown destination intersection '{}'",
                        describe(),
                        row.destination
                    ),
                )
            })?;
            if !row.demand_vph.is_finite() || row.demand_vph < 0.0 {
                return Err(EngineError::data_integrity(
                    "od",
                    format!("{}: invalid demand {}", describe(), row.demand_vph),
                ));
            }
            let class_split = if row.vehicle_class.trim().eq_ignore_ascii_case("mixed") {
                normalise_split(*default_split)
            } else {
                let class: VehicleClass = row
                    .vehicle_class
                    .parse()
                    .map_err(|e: String| EngineError::data_integrity("od", format!("{}: {}", describe(), e)))?;
                ClassValues::only(class, 1.0)
            };
            od_pairs.push(OdPair {
                origin,
                destination,
                demand_vph: row.demand_vph,
                class_split,
            });
        }

        let network = Self {
            segments,
            intersections,
            zones,
            od_pairs,
            outgoing,
            segment_index,
            intersection_index,
            zone_index,
        };
        for warning in network.connectivity_warnings() {
            log::warn!("[Network] {}", warning);
        }
        log::info!(
            "[Network] Loaded {} segments, {} intersections, {} zones, {} OD pairs",
            network.segments.len(),
            network.intersections.len(),
            network.zones.len(),
            network.od_pairs.len()
        );
        Ok(network)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn od_pairs(&self) -> &[OdPair] {
        &self.od_pairs
    }

    pub fn outgoing(&self, intersection: usize) -> &[usize] {
        &self.outgoing[intersection]
    }

    pub fn segment_idx(&self, id: &str) -> Option<usize> {
        self.segment_index.get(id).copied()
    }

    pub fn intersection_idx(&self, id: &str) -> Option<usize> {
        self.intersection_index.get(id).copied()
    }

    pub fn zone_idx(&self, id: &str) -> Option<usize> {
        self.zone_index.get(id).copied()
    }

    pub fn segment(&self, id: &str) -> Option<&Segment> {
        self.segment_idx(id).map(|i| &self.segments[i])
    }

    pub fn intersection(&self, id: &str) -> Option<&Intersection> {
        self.intersection_idx(id).map(|i| &self.intersections[i])
    }

    pub(crate) fn segment_mut(&mut self, idx: usize) -> &mut Segment {
        &mut self.segments[idx]
    }

    pub(crate) fn intersection_mut(&mut self, idx: usize) -> &mut Intersection {
        &mut self.intersections[idx]
    }

    /// Inbound segment indexes per intersection, in segment order.
    pub fn incoming(&self) -> Vec<Vec<usize>> {
        let mut incoming = vec![Vec::new(); self.intersections.len()];
        for (idx, seg) in self.segments.iter().enumerate() {
            incoming[seg.destination].push(idx);
        }
        incoming
    }

    /// Intersections where at least one of the zone's segments ends, in index order.
    pub fn zone_intersections(&self, zone: usize) -> Vec<usize> {
        let mut found: Vec<usize> = self.zones[zone]
            .segments
            .iter()
            .map(|&s| self.segments[s].destination)
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }

    /// Midpoint of a segment as (lat, lng).
    pub fn segment_midpoint(&self, idx: usize) -> (f64, f64) {
        let seg = &self.segments[idx];
        let a = &self.intersections[seg.origin];
        let b = &self.intersections[seg.destination];
        ((a.lat + b.lat) / 2.0, (a.lng + b.lng) / 2.0)
    }

    pub fn topology(&self) -> NetworkTopology {
        NetworkTopology {
            segments: self.segments.len(),
            intersections: self.intersections.len(),
            zones: self.zones.len(),
            od_pairs: self.od_pairs.len(),
            total_length_km: self.segments.iter().map(|s| s.length_km).sum(),
            total_lanes: self.segments.iter().map(|s| s.lanes).sum(),
            signalised_intersections: self.intersections.iter().filter(|i| i.is_signalised()).count(),
            segments_by_zone: self
                .zones
                .iter()
                .map(|z| (z.id.clone(), z.segments.len()))
                .collect(),
        }
    }

    /// Non-fatal structural issues: isolated intersections and intersections
    /// unreachable from the first one.
    pub fn connectivity_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut touched = HashSet::new();
        for seg in &self.segments {
            touched.insert(seg.origin);
            touched.insert(seg.destination);
        }
        for (idx, intersection) in self.intersections.iter().enumerate() {
            if !touched.contains(&idx) {
                warnings.push(format!("intersection '{}' has no segments", intersection.id));
            }
        }

        if self.intersections.is_empty() {
            return warnings;
        }
        let mut visited = vec![false; self.intersections.len()];
        let mut queue = VecDeque::new();
        visited[0] = true;
        queue.push_back(0);
        while let Some(node) = queue.pop_front() {
            for &seg in &self.outgoing[node] {
                let next = self.segments[seg].destination;
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
        for (idx, intersection) in self.intersections.iter().enumerate() {
            if !visited[idx] && touched.contains(&idx) {
                warnings.push(format!(
                    "intersection '{}' is unreachable from '{}'",
                    intersection.id, self.intersections[0].id
                ));
            }
        }
        warnings
    }
}

fn build_segment(
    row: &SegmentRecord,
    intersections: &[Intersection],
    intersection_index: &HashMap<String, usize>,
    zone_index: &HashMap<String, usize>,
) -> Result<Segment> {
    let fail = |message: String| EngineError::data_integrity("segments", format!("segment '{}': {}", row.id, message));

    let origin = *intersection_index
        .get(&row.origin)
        .ok_or_else(|| fail(format!("unknown origin intersection '{}'", row.origin)))?;
    let destination = *intersection_index
        .get(&row.destination)
        .ok_or_else(|| fail(format!("unknown destination intersection '{}'", row.destination)))?;
    if origin == destination {
        return Err(fail("origin and destination are the same intersection".to_string()));
    }
    let zone = *zone_index
        .get(&row.zone)
        .ok_or_else(|| fail(format!("unknown zone '{}'", row.zone)))?;
    if !row.length_km.is_finite() || row.length_km < 0.0 {
        return Err(fail(format!("invalid length_km {}", row.length_km)));
    }
    if !row.free_speed_kmh.is_finite() || row.free_speed_kmh <= 0.0 {
        return Err(fail(format!("invalid free_speed_kmh {}", row.free_speed_kmh)));
    }
    if !row.capacity_vph.is_finite() || row.capacity_vph < 0.0 {
        return Err(fail(format!("invalid capacity_vph {}", row.capacity_vph)));
    }
    let road_class = match row.road_class.as_deref() {
        None | Some("") => RoadClass::Arterial,
        Some(raw) => RoadClass::parse(raw).ok_or_else(|| fail(format!("unknown road_class '{}'", raw)))?,
    };

    Ok(Segment {
        id: row.id.clone(),
        name: row.name.clone().unwrap_or_else(|| row.id.clone()),
        origin,
        destination,
        zone,
        length_km: row.length_km,
        lanes: row.lanes,
        free_speed_kmh: row.free_speed_kmh,
        capacity_vph: row.capacity_vph,
        road_class,
        approach: intersections[destination].approach_from(&intersections[origin]),
        closed: false,
        route_penalty: 1.0,
        class_factors: ClassValues::splat(1.0),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn intersection(id: &str, lat: f64, lng: f64) -> IntersectionRecord {
        IntersectionRecord {
            id: id.to_string(),
            lat,
            lng,
            cycle_s: 90.0,
            green_ns_s: 40.0,
            green_ew_s: 40.0,
        }
    }

    pub fn segment(id: &str, origin: &str, destination: &str, zone: &str, length_km: f64) -> SegmentRecord {
        SegmentRecord {
            id: id.to_string(),
            origin: origin.to_string(),
            destination: destination.to_string(),
            zone: zone.to_string(),
            length_km,
            lanes: 2,
            free_speed_kmh: 50.0,
            capacity_vph: 2400.0,
            road_class: None,
            name: None,
        }
    }

    pub fn od(origin: &str, destination: &str, demand_vph: f64, class: &str) -> OdRecord {
        OdRecord {
            origin: origin.to_string(),
            destination: destination.to_string(),
            demand_vph,
            vehicle_class: class.to_string(),
        }
    }

    pub fn zone(id: &str) -> ZoneRecord {
        ZoneRecord {
            id: id.to_string(),
            name: format!("Zone {}", id),
            population: 10_000,
        }
    }

    /// A -> B -> C along a line, plus a longer direct A -> C.
    pub fn line_records() -> NetworkRecords {
        NetworkRecords {
            intersections: vec![
                intersection("A", 28.60, 77.20),
                intersection("B", 28.61, 77.20),
                intersection("C", 28.62, 77.20),
            ],
            segments: vec![
                segment("AB", "A", "B", "Z1", 1.0),
                segment("BC", "B", "C", "Z1", 1.0),
                segment("AC", "A", "C", "Z2", 2.5),
            ],
            od_pairs: vec![od("A", "C", 1000.0, "car")],
            zones: vec![zone("Z1"), zone("Z2")],
        }
    }

    fn split() -> ClassValues {
        ClassValues([0.7, 0.2, 0.05, 0.05])
    }

    #[test]
    fn builds_index_tables() {
        let network = CorridorNetwork::load(line_records(), &split()).unwrap();
        assert_eq!(network.segments().len(), 3);
        assert_eq!(network.outgoing(0), &[0, 2]);
        assert_eq!(network.zones()[0].segments, vec![0, 1]);
        assert_eq!(network.segment("BC").unwrap().origin, 1);
        assert_eq!(network.zone_intersections(0), vec![1, 2]);
    }

    #[test]
    fn rejects_segment_with_unknown_intersection() {
        let mut records = line_records();
        records.segments.push(segment("CX", "C", "X", "Z1", 1.0));
        let err = CorridorNetwork::load(records, &split()).unwrap_err();
        match err {
            EngineError::DataIntegrity { source_name, message } => {
                assert_eq!(source_name, "segments");
                assert!(message.contains("CX"));
                assert!(message.contains("'X'"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn rejects_od_with_unknown_endpoint() {
        let mut records = line_records();
        records.od_pairs.push(od("A", "Q", 10.0, "car"));
        let err = CorridorNetwork::load(records, &split()).unwrap_err();
        assert!(matches!(err, EngineError::DataIntegrity { ref source_name, .. } if source_name == "od"));
    }

    #[test]
    fn rejects_duplicates_and_bad_values() {
        let mut records = line_records();
        records.segments.push(segment("AB", "A", "B", "Z1", 1.0));
        assert!(CorridorNetwork::load(records, &split()).is_err());

        let mut records = line_records();
        records.segments[0].capacity_vph = -1.0;
        assert!(CorridorNetwork::load(records, &split()).is_err());

        let mut records = line_records();
        records.od_pairs[0].vehicle_class = "tram".to_string();
        assert!(CorridorNetwork::load(records, &split()).is_err());

        let mut records = line_records();
        records.segments[0].zone = "Z9".to_string();
        assert!(CorridorNetwork::load(records, &split()).is_err());
    }

    #[test]
    fn mixed_demand_uses_default_split() {
        let mut records = line_records();
        records.od_pairs[0].vehicle_class = "mixed".to_string();
        let network = CorridorNetwork::load(records, &split()).unwrap();
        let demand = network.od_pairs()[0].class_demand();
        assert!((demand[VehicleClass::Truck] - 200.0).abs() < 1e-9);
    }

    #[test]
    fn reports_topology_and_isolated_nodes() {
        let mut records = line_records();
        records.intersections.push(intersection("D", 28.7, 77.3));
        let network = CorridorNetwork::load(records, &split()).unwrap();
        let topology = network.topology();
        assert_eq!(topology.segments, 3);
        assert_eq!(topology.total_lanes, 6);
        assert_eq!(topology.segments_by_zone, vec![("Z1".to_string(), 2), ("Z2".to_string(), 1)]);
        let warnings = network.connectivity_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'D'"));
    }
}
