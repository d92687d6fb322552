use crate::config::EngineConfig;
use crate::shared_data::{Evaluation, ImpactReport, ZoneDelta};

fn pct_change(before: f64, after: f64) -> f64 {
    if before == 0.0 {
        0.0
    } else {
        (after - before) / before * 100.0
    }
}

/// Compares two evaluations of the same network layout.
/// Lives saved is `aqi_reduction * lives_saved_per_aqi_point`, a policy
/// assumption taken from the configuration.
pub fn compute_impact(before: &Evaluation, after: &Evaluation, config: &EngineConfig) -> ImpactReport {
    let aqi_reduction = before.mean_aqi() - after.mean_aqi();
    let zone_deltas = before
        .zones
        .iter()
        .zip(after.zones.iter())
        .map(|(b, a)| ZoneDelta {
            zone_id: b.zone_id.clone(),
            baseline_aqi: b.aqi,
            scenario_aqi: a.aqi,
            aqi_reduction: b.aqi - a.aqi,
            baseline_affected_population: b.health.affected_population,
            scenario_affected_population: a.health.affected_population,
        })
        .collect();

    ImpactReport {
        aqi_reduction,
        speed_change_pct: pct_change(before.mean_speed_kmh(), after.mean_speed_kmh()),
        traffic_change_pct: pct_change(before.total_flow_vph(), after.total_flow_vph()),
        lives_saved_estimate: aqi_reduction * config.lives_saved_per_aqi_point,
        delay_change_pct: pct_change(before.mean_intersection_delay_s(), after.mean_intersection_delay_s()),
        affected_population_reduction: before.affected_population() as i64 - after.affected_population() as i64,
        zone_deltas,
    }
}
