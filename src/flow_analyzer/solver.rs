use crate::control_system::signal_timing::{approach_delay, intersection_delay};
use crate::emissions::factors::PollutantValues;
use crate::errors::Result;
use crate::flow_analyzer::congestion::speed_for;
use crate::network_model::assignment::FlowAssignment;
use crate::network_model::CorridorNetwork;
use crate::shared_data::{IntersectionResult, OdResult, SegmentResult};

/// Traffic-side output of a run, before air quality is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficState {
    pub segments: Vec<SegmentResult>,
    pub intersections: Vec<IntersectionResult>,
}

/// Converts assigned flows into speeds, travel times and signal delays.
pub fn solve(network: &CorridorNetwork, assignment: &FlowAssignment) -> Result<TrafficState> {
    let mut segments = Vec::with_capacity(network.segments().len());
    for (idx, segment) in network.segments().iter().enumerate() {
        let class_flows = assignment.class_flows[idx];
        let flow_vph = class_flows.total();
        let outcome = speed_for(segment, flow_vph)?;
        if outcome.capacity_undefined && flow_vph > 0.0 {
            log::warn!(
                "[Solver] Segment '{}' has zero capacity but carries {:.1} vph",
                segment.id,
                flow_vph
            );
        }
        let downstream = &network.intersections()[segment.destination];
        segments.push(SegmentResult {
            segment_id: segment.id.clone(),
            zone_id: network.zones()[segment.zone].id.clone(),
            flow_vph,
            class_flows,
            vc_ratio: outcome.vc_ratio,
            speed_kmh: outcome.speed_kmh,
            travel_time_min: segment.length_km / outcome.speed_kmh * 60.0,
            signal_delay_s: approach_delay(downstream, segment.approach, outcome.vc_ratio),
            capacity_undefined: outcome.capacity_undefined,
            emissions: PollutantValues::default(),
        });
    }

    let incoming = network.incoming();
    let intersections = network
        .intersections()
        .iter()
        .zip(incoming.iter())
        .map(|(intersection, inbound)| {
            let approaches: Vec<_> = inbound
                .iter()
                .map(|&s| {
                    (
                        network.segments()[s].approach,
                        segments[s].vc_ratio,
                        segments[s].flow_vph,
                    )
                })
                .collect();
            IntersectionResult {
                intersection_id: intersection.id.clone(),
                mean_delay_s: intersection_delay(intersection, &approaches),
                inbound_flow_vph: approaches.iter().map(|a| a.2).sum(),
            }
        })
        .collect();

    Ok(TrafficState {
        segments,
        intersections,
    })
}

/// Route distance, hop count and congested travel time (including signal
/// delay) for every OD pair.
pub fn od_results(network: &CorridorNetwork, assignment: &FlowAssignment, segments: &[SegmentResult]) -> Vec<OdResult> {
    network
        .od_pairs()
        .iter()
        .zip(assignment.routes.iter())
        .map(|(pair, route)| {
            let origin = network.intersections()[pair.origin].id.clone();
            let destination = network.intersections()[pair.destination].id.clone();
            match route {
                Some(route) => OdResult {
                    origin,
                    destination,
                    demand_vph: pair.demand_vph,
                    reachable: true,
                    distance_km: route.distance_km,
                    travel_time_min: route
                        .segments
                        .iter()
                        .map(|&s| segments[s].travel_time_min + segments[s].signal_delay_s / 60.0)
                        .sum(),
                    hops: route.hops,
                },
                None => OdResult {
                    origin,
                    destination,
                    demand_vph: pair.demand_vph,
                    reachable: false,
                    distance_km: 0.0,
                    travel_time_min: 0.0,
                    hops: 0,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network_model::assignment::assign_flows;
    use crate::network_model::tests::line_records;
    use crate::network_model::vehicles::ClassValues;

    #[test]
    fn solves_every_segment_and_intersection() {
        let network = CorridorNetwork::load(line_records(), &ClassValues::splat(0.25)).unwrap();
        let assignment = assign_flows(&network);
        let state = solve(&network, &assignment).unwrap();
        assert_eq!(state.segments.len(), 3);
        assert_eq!(state.intersections.len(), 3);

        let ab = &state.segments[0];
        assert_eq!(ab.flow_vph, 1000.0);
        assert!(ab.speed_kmh < 50.0);
        assert!(ab.signal_delay_s > 0.0);
        // Unused segment runs at free-flow speed.
        assert_eq!(state.segments[2].speed_kmh, 50.0);
        // Nothing arrives at the origin.
        assert_eq!(state.intersections[0].inbound_flow_vph, 0.0);
        assert_eq!(state.intersections[0].mean_delay_s, 0.0);
        assert_eq!(state.intersections[2].inbound_flow_vph, 1000.0);
    }

    #[test]
    fn od_travel_time_sums_route_segments() {
        let network = CorridorNetwork::load(line_records(), &ClassValues::splat(0.25)).unwrap();
        let assignment = assign_flows(&network);
        let state = solve(&network, &assignment).unwrap();
        let od = od_results(&network, &assignment, &state.segments);
        assert_eq!(od.len(), 1);
        assert!(od[0].reachable);
        assert_eq!(od[0].hops, 2);
        assert!((od[0].distance_km - 2.0).abs() < 1e-12);
        let expected: f64 = state.segments[..2]
            .iter()
            .map(|s| s.travel_time_min + s.signal_delay_s / 60.0)
            .sum();
        assert!((od[0].travel_time_min - expected).abs() < 1e-12);
    }
}
