// src/engine/evaluation.rs
//
// One full pass of the pipeline: assign demand, solve speeds and delays,
// attach emissions, aggregate zone air quality.

use crate::config::EngineConfig;
use crate::emissions::air_quality::{attach_emissions, zone_air_quality};
use crate::errors::Result;
use crate::flow_analyzer::solver::{od_results, solve};
use crate::network_model::assignment::assign_flows;
use crate::network_model::CorridorNetwork;
use crate::shared_data::Evaluation;

pub fn evaluate_network(network: &CorridorNetwork, config: &EngineConfig) -> Result<Evaluation> {
    let assignment = assign_flows(network);
    let mut traffic = solve(network, &assignment)?;
    attach_emissions(network, &mut traffic.segments);
    let zones = zone_air_quality(network, &traffic.segments, config);
    let od = od_results(network, &assignment, &traffic.segments);

    let evaluation = Evaluation {
        segments: traffic.segments,
        zones,
        intersections: traffic.intersections,
        od_results: od,
        excluded_pairs: assignment.excluded,
    };
    log::debug!(
        "[Evaluation] mean AQI {:.1}, mean speed {:.1} km/h, {} OD pairs excluded",
        evaluation.mean_aqi(),
        evaluation.mean_speed_kmh(),
        evaluation.excluded_pair_count()
    );
    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network_model::tests::line_records;

    #[test]
    fn evaluation_is_deterministic() {
        let config = EngineConfig::default();
        let network = CorridorNetwork::load(line_records(), &config.default_class_split).unwrap();
        let first = evaluate_network(&network, &config).unwrap();
        let second = evaluate_network(&network, &config).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.zones.len(), 2);
        assert!(first.segments[0].emissions.pm25 > 0.0);
    }
}
