use crate::config::EngineConfig;
use crate::emissions::aqi::{pm25_to_aqi, AqiCategory};
use crate::emissions::dispersion::{disperse, receptor_distance_km};
use crate::emissions::factors::segment_emissions;
use crate::emissions::health::health_impact;
use crate::network_model::CorridorNetwork;
use crate::shared_data::{mean, SegmentResult, ZoneResult};

/// Fills in per-segment emissions (g/h) from the solved class flows.
pub fn attach_emissions(network: &CorridorNetwork, results: &mut [SegmentResult]) {
    for (segment, result) in network.segments().iter().zip(results.iter_mut()) {
        result.emissions = segment_emissions(segment.length_km, &result.class_flows);
    }
}

/// Receptor point of a zone: mean of its member segment midpoints.
pub fn zone_centroid(network: &CorridorNetwork, zone: usize) -> Option<(f64, f64)> {
    let members = &network.zones()[zone].segments;
    if members.is_empty() {
        return None;
    }
    let (lat, lng) = members.iter().fold((0.0, 0.0), |(lat, lng), &s| {
        let (m_lat, m_lng) = network.segment_midpoint(s);
        (lat + m_lat, lng + m_lng)
    });
    let n = members.len() as f64;
    Some((lat / n, lng / n))
}

/// Aggregates segment results into zone concentrations and AQI.
///
/// Each member segment's emission is dispersed to the zone centroid and the
/// zone concentration is the mean over members, scaled to µg/m³, plus the
/// regional background. Summation follows segment order so results are
/// reproducible bit for bit.
pub fn zone_air_quality(network: &CorridorNetwork, results: &[SegmentResult], config: &EngineConfig) -> Vec<ZoneResult> {
    network
        .zones()
        .iter()
        .enumerate()
        .map(|(zone_idx, zone)| {
            let members = &zone.segments;
            let (pm25_local, nox_local) = match zone_centroid(network, zone_idx) {
                Some(centroid) => {
                    let mut pm25 = 0.0;
                    let mut nox = 0.0;
                    for &s in members {
                        let d = receptor_distance_km(network.segment_midpoint(s), centroid, config.roadside_offset_km);
                        pm25 += disperse(results[s].emissions.pm25, d);
                        nox += disperse(results[s].emissions.nox, d);
                    }
                    let n = members.len() as f64;
                    (pm25 / n * config.dispersion_scale, nox / n * config.dispersion_scale)
                }
                None => (0.0, 0.0),
            };

            let pm25 = pm25_local + config.background_pm25;
            let no2 = config.no2_fraction_of_nox * nox_local + config.background_no2;
            let aqi = pm25_to_aqi(pm25);
            ZoneResult {
                zone_id: zone.id.clone(),
                name: zone.name.clone(),
                population: zone.population,
                aqi,
                category: AqiCategory::from_aqi(aqi),
                pm25,
                no2,
                mean_speed_kmh: mean(members.iter().map(|&s| results[s].speed_kmh)),
                total_flow_vph: members.iter().map(|&s| results[s].flow_vph).sum(),
                health: health_impact(aqi, zone.population, &config.health),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network_model::assignment::assign_flows;
    use crate::network_model::tests::line_records;

    fn evaluate(records: crate::network_model::NetworkRecords) -> (CorridorNetwork, Vec<ZoneResult>) {
        let config = EngineConfig::default();
        let network = CorridorNetwork::load(records, &config.default_class_split).unwrap();
        let assignment = assign_flows(&network);
        let mut traffic = crate::flow_analyzer::solver::solve(&network, &assignment).unwrap();
        attach_emissions(&network, &mut traffic.segments);
        let zones = zone_air_quality(&network, &traffic.segments, &config);
        (network, zones)
    }

    #[test]
    fn empty_flow_leaves_background_only() {
        let mut records = line_records();
        records.od_pairs.clear();
        let (_, zones) = evaluate(records);
        let config = EngineConfig::default();
        for zone in &zones {
            assert_eq!(zone.pm25, config.background_pm25);
            assert_eq!(zone.no2, config.background_no2);
            assert_eq!(zone.total_flow_vph, 0.0);
        }
    }

    #[test]
    fn more_traffic_means_worse_air() {
        let (_, light) = evaluate(line_records());
        let mut records = line_records();
        records.od_pairs[0].demand_vph *= 2.0;
        let (_, heavy) = evaluate(records);
        assert!(heavy[0].pm25 > light[0].pm25);
        assert!(heavy[0].aqi > light[0].aqi);
        assert!(heavy[0].no2 > light[0].no2);
        // Zone Z2 carries no traffic in either case.
        assert_eq!(heavy[1].pm25, light[1].pm25);
    }

    #[test]
    fn zone_flow_is_sum_of_members() {
        let (network, zones) = evaluate(line_records());
        let assignment = assign_flows(&network);
        let expected: f64 = network.zones()[0].segments.iter().map(|&s| assignment.flow(s)).sum();
        assert_eq!(zones[0].total_flow_vph, expected);
        assert!(zone_centroid(&network, 0).is_some());
    }

    #[test]
    fn zone_health_follows_its_aqi() {
        let mut records = line_records();
        for od in records.od_pairs.iter_mut() {
            od.demand_vph *= 40.0;
        }
        let (_, zones) = evaluate(records);
        let config = EngineConfig::default();
        for zone in &zones {
            let expected = health_impact(zone.aqi, zone.population, &config.health);
            assert_eq!(zone.health, expected);
        }
        let busy = &zones[0];
        assert!(busy.aqi > zones[1].aqi);
        assert!(busy.health.respiratory_symptoms_pct > zones[1].health.respiratory_symptoms_pct);
    }
}
