use crate::errors::EngineError;
use crate::network_model::route_generation::{shortest_path, Route};
use crate::network_model::vehicles::ClassValues;
use crate::network_model::CorridorNetwork;
use serde::Serialize;
use std::collections::HashMap;

/// An OD pair dropped from assignment because no open route exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcludedPair {
    pub origin: String,
    pub destination: String,
    pub demand_vph: f64,
}

/// All-or-nothing assignment output. Owned by the caller; the network is not touched.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowAssignment {
    /// Per-class flow on each segment, indexed like `CorridorNetwork::segments`.
    pub class_flows: Vec<ClassValues>,
    /// Route taken by each OD pair, `None` when excluded.
    pub routes: Vec<Option<Route>>,
    pub excluded: Vec<ExcludedPair>,
}

impl FlowAssignment {
    pub fn flow(&self, segment: usize) -> f64 {
        self.class_flows[segment].total()
    }

    pub fn excluded_count(&self) -> usize {
        self.excluded.len()
    }

    pub fn total_flow(&self) -> f64 {
        self.class_flows.iter().map(|f| f.total()).sum()
    }
}

/// Places every OD pair's demand on its shortest route.
/// Each segment's per-class factor scales the class flow placed on it.
/// Unreachable pairs are logged and skipped.
pub fn assign_flows(network: &CorridorNetwork) -> FlowAssignment {
    let mut class_flows = vec![ClassValues::default(); network.segments().len()];
    let mut routes = Vec::with_capacity(network.od_pairs().len());
    let mut excluded = Vec::new();
    let mut cache: HashMap<(usize, usize), Option<Route>> = HashMap::new();

    for pair in network.od_pairs() {
        let route = cache
            .entry((pair.origin, pair.destination))
            .or_insert_with(|| match shortest_path(network, pair.origin, pair.destination) {
                Ok(route) => Some(route),
                Err(EngineError::NoPath { origin, destination }) => {
                    log::debug!("[Assignment] No path {} -> {}", origin, destination);
                    None
                }
                Err(e) => {
                    log::warn!("[Assignment] Routing failed: {}", e);
                    None
                }
            })
            .clone();

        match route {
            Some(route) => {
                let demand = pair.class_demand();
                for &seg_idx in &route.segments {
                    let placed = demand.times(&network.segments()[seg_idx].class_factors);
                    class_flows[seg_idx].add_assign(&placed);
                }
                routes.push(Some(route));
            }
            None => {
                let origin = network.intersections()[pair.origin].id.clone();
                let destination = network.intersections()[pair.destination].id.clone();
                log::warn!(
                    "[Assignment] Dropping OD pair {} -> {} ({:.1} vph): no path",
                    origin,
                    destination,
                    pair.demand_vph
                );
                excluded.push(ExcludedPair {
                    origin,
                    destination,
                    demand_vph: pair.demand_vph,
                });
                routes.push(None);
            }
        }
    }

    FlowAssignment {
        class_flows,
        routes,
        excluded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network_model::tests::{intersection, line_records, od, segment};
    use crate::network_model::vehicles::VehicleClass;

    #[test]
    fn demand_lands_on_every_route_segment() {
        let mut records = line_records();
        records.od_pairs.push(od("A", "B", 200.0, "truck"));
        let network = CorridorNetwork::load(records, &ClassValues::splat(0.25)).unwrap();
        let assignment = assign_flows(&network);

        let ab = network.segment_idx("AB").unwrap();
        let bc = network.segment_idx("BC").unwrap();
        let ac = network.segment_idx("AC").unwrap();
        assert_eq!(assignment.flow(ab), 1200.0);
        assert_eq!(assignment.flow(bc), 1000.0);
        assert_eq!(assignment.flow(ac), 0.0);
        assert_eq!(assignment.class_flows[ab][VehicleClass::Truck], 200.0);
        assert_eq!(assignment.excluded_count(), 0);
    }

    #[test]
    fn class_factor_scales_segment_flow() {
        let mut records = line_records();
        records.od_pairs[0].vehicle_class = "truck".to_string();
        let mut network = CorridorNetwork::load(records, &ClassValues::splat(0.25)).unwrap();
        let ab = network.segment_idx("AB").unwrap();
        network.segment_mut(ab).class_factors[VehicleClass::Truck] = 0.1;
        let assignment = assign_flows(&network);
        assert!((assignment.flow(ab) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn unreachable_pair_is_excluded_not_fatal() {
        let mut records = line_records();
        records.intersections.push(intersection("D", 28.63, 77.20));
        records.segments.push(segment("DC", "D", "C", "Z1", 1.0));
        records.od_pairs.push(od("A", "D", 300.0, "car"));
        let network = CorridorNetwork::load(records, &ClassValues::splat(0.25)).unwrap();
        let assignment = assign_flows(&network);
        assert_eq!(assignment.excluded_count(), 1);
        assert_eq!(assignment.excluded[0].destination, "D");
        assert_eq!(assignment.routes[1], None);
        assert!((assignment.total_flow() - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn repeated_calls_are_independent() {
        let network = CorridorNetwork::load(line_records(), &ClassValues::splat(0.25)).unwrap();
        let first = assign_flows(&network);
        let second = assign_flows(&network);
        assert_eq!(first, second);
    }
}
