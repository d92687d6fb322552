// route_generation.rs
//
// Shortest-path routing over the corridor graph. Dijkstra's algorithm on
// segment routing weight (length times route penalty), skipping closed
// segments. Equal-length routes are broken in favour of fewer hops.

use crate::errors::{EngineError, Result};
use crate::global_variables::ROUTE_TIE_EPSILON_KM;
use crate::network_model::CorridorNetwork;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// An ordered list of segment indexes from origin to destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub segments: Vec<usize>,
    /// Physical length of the route.
    pub distance_km: f64,
    /// Sum of routing weights (length times penalty) the search minimised.
    pub weight: f64,
    pub hops: usize,
}

impl Route {
    pub fn empty() -> Self {
        Route {
            segments: Vec::new(),
            distance_km: 0.0,
            weight: 0.0,
            hops: 0,
        }
    }
}

/// Heap entry ordered so the smallest (distance, hops) pops first.
#[derive(Debug, Clone, Copy)]
struct QueueItem {
    distance: f64,
    hops: usize,
    node: usize,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueItem {}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap.
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.hops.cmp(&self.hops))
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// True when `(distance, hops)` beats the current best label.
fn improves(distance: f64, hops: usize, best: Option<(f64, usize)>) -> bool {
    match best {
        None => true,
        Some((best_distance, best_hops)) => {
            if distance < best_distance - ROUTE_TIE_EPSILON_KM {
                true
            } else if (distance - best_distance).abs() <= ROUTE_TIE_EPSILON_KM {
                hops < best_hops
            } else {
                false
            }
        }
    }
}

/// Finds the shortest open route between two intersection indexes.
pub fn shortest_path(network: &CorridorNetwork, origin: usize, destination: usize) -> Result<Route> {
    let count = network.intersections().len();
    if origin >= count || destination >= count {
        return Err(EngineError::invalid_target(
            format!("{} -> {}", origin, destination),
            "intersection index out of range",
        ));
    }
    if origin == destination {
        return Ok(Route::empty());
    }

    let mut best: Vec<Option<(f64, usize)>> = vec![None; count];
    let mut came_from: Vec<Option<usize>> = vec![None; count];
    let mut settled = vec![false; count];
    let mut queue = BinaryHeap::new();

    best[origin] = Some((0.0, 0));
    queue.push(QueueItem {
        distance: 0.0,
        hops: 0,
        node: origin,
    });

    while let Some(QueueItem { distance, hops, node }) = queue.pop() {
        // A label replaced by a fewer-hops tie leaves a stale entry behind.
        if settled[node] || best[node] != Some((distance, hops)) {
            continue;
        }
        settled[node] = true;
        if node == destination {
            break;
        }

        for &seg_idx in network.outgoing(node) {
            let seg = &network.segments()[seg_idx];
            if seg.closed {
                continue;
            }
            let next = seg.destination;
            if settled[next] {
                continue;
            }
            let next_distance = distance + seg.route_weight();
            let next_hops = hops + 1;
            if improves(next_distance, next_hops, best[next]) {
                best[next] = Some((next_distance, next_hops));
                came_from[next] = Some(seg_idx);
                queue.push(QueueItem {
                    distance: next_distance,
                    hops: next_hops,
                    node: next,
                });
            }
        }
    }

    let Some((weight, hops)) = best[destination] else {
        let intersections = network.intersections();
        return Err(EngineError::NoPath {
            origin: intersections[origin].id.clone(),
            destination: intersections[destination].id.clone(),
        });
    };

    // Walk back from the destination.
    let mut segments = Vec::with_capacity(hops);
    let mut cur = destination;
    while cur != origin {
        match came_from[cur] {
            Some(seg_idx) => {
                segments.push(seg_idx);
                cur = network.segments()[seg_idx].origin;
            }
            None => break,
        }
    }
    segments.reverse();
    let distance_km = segments.iter().map(|&s| network.segments()[s].length_km).sum();

    Ok(Route {
        segments,
        distance_km,
        weight,
        hops,
    })
}

/// Same as [`shortest_path`] but addressed by intersection id.
pub fn shortest_path_by_id(network: &CorridorNetwork, origin: &str, destination: &str) -> Result<Route> {
    let from = network
        .intersection_idx(origin)
        .ok_or_else(|| EngineError::invalid_target(origin, "unknown intersection"))?;
    let to = network
        .intersection_idx(destination)
        .ok_or_else(|| EngineError::invalid_target(destination, "unknown intersection"))?;
    shortest_path(network, from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network_model::tests::{intersection, line_records, segment};
    use crate::network_model::vehicles::ClassValues;

    fn load(records: crate::network_model::NetworkRecords) -> CorridorNetwork {
        CorridorNetwork::load(records, &ClassValues::splat(0.25)).unwrap()
    }

    #[test]
    fn picks_the_shorter_two_hop_route() {
        let network = load(line_records());
        let route = shortest_path_by_id(&network, "A", "C").unwrap();
        let ids: Vec<&str> = route.segments.iter().map(|&s| network.segments()[s].id.as_str()).collect();
        assert_eq!(ids, vec!["AB", "BC"]);
        assert!((route.distance_km - 2.0).abs() < 1e-12);
        assert!((route.weight - 2.0).abs() < 1e-12);
        assert_eq!(route.hops, 2);
    }

    #[test]
    fn equal_length_prefers_fewer_hops() {
        let mut records = line_records();
        records.segments[2].length_km = 2.0;
        let network = load(records);
        let route = shortest_path_by_id(&network, "A", "C").unwrap();
        assert_eq!(route.hops, 1);
        assert_eq!(network.segments()[route.segments[0]].id, "AC");
    }

    #[test]
    fn hop_count_matches_route_after_a_tie_is_replaced() {
        // O-P1-P2-C sums to 0.8999999999999999, O-Q-C to 0.9: a tie that the
        // two-hop path wins after C was already queued with three hops.
        let records = crate::network_model::NetworkRecords {
            intersections: vec![
                intersection("O", 28.60, 77.20),
                intersection("P1", 28.60, 77.21),
                intersection("P2", 28.60, 77.22),
                intersection("Q", 28.61, 77.21),
                intersection("C", 28.61, 77.23),
                intersection("D", 28.61, 77.24),
            ],
            segments: vec![
                segment("OP1", "O", "P1", "Z1", 0.1),
                segment("P1P2", "P1", "P2", "Z1", 0.1),
                segment("P2C", "P2", "C", "Z1", 0.7),
                segment("OQ", "O", "Q", "Z1", 0.4),
                segment("QC", "Q", "C", "Z1", 0.5),
                segment("CD", "C", "D", "Z1", 1.0),
            ],
            od_pairs: Vec::new(),
            zones: vec![crate::network_model::tests::zone("Z1")],
        };
        let network = load(records);
        let route = shortest_path_by_id(&network, "O", "D").unwrap();
        let ids: Vec<&str> = route.segments.iter().map(|&s| network.segments()[s].id.as_str()).collect();
        assert_eq!(ids, vec!["OQ", "QC", "CD"]);
        assert_eq!(route.hops, route.segments.len());
        assert_eq!(route.hops, 3);
    }

    #[test]
    fn closed_and_degraded_segments_change_the_route() {
        let mut network = load(line_records());
        let bc = network.segment_idx("BC").unwrap();
        network.segment_mut(bc).route_penalty = 3.0;
        let route = shortest_path_by_id(&network, "A", "C").unwrap();
        assert_eq!(network.segments()[route.segments[0]].id, "AC");

        let ac = network.segment_idx("AC").unwrap();
        network.segment_mut(ac).closed = true;
        let route = shortest_path_by_id(&network, "A", "C").unwrap();
        assert_eq!(route.hops, 2);
        assert!((route.weight - 4.0).abs() < 1e-12);
        assert!((route.distance_km - 2.0).abs() < 1e-12);
    }

    #[test]
    fn unreachable_destination_is_no_path() {
        let mut records = line_records();
        records.intersections.push(intersection("D", 28.63, 77.20));
        records.segments.push(segment("DC", "D", "C", "Z1", 1.0));
        let network = load(records);
        match shortest_path_by_id(&network, "A", "D") {
            Err(EngineError::NoPath { origin, destination }) => {
                assert_eq!(origin, "A");
                assert_eq!(destination, "D");
            }
            other => panic!("expected NoPath, got {:?}", other),
        }
    }

    #[test]
    fn same_origin_and_destination_is_empty() {
        let network = load(line_records());
        assert_eq!(shortest_path_by_id(&network, "B", "B").unwrap(), Route::empty());
        assert!(shortest_path_by_id(&network, "B", "Q").is_err());
    }
}
