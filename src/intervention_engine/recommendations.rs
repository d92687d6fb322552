// recommendations.rs
//
// Deterministic scan over a fixed candidate set. Each candidate is applied
// to a deep copy of the scenario, scored, and the list is ranked best first.

use crate::config::EngineConfig;
use crate::errors::Result;
use crate::intervention_engine::impact::compute_impact;
use crate::intervention_engine::interventions::{InterventionParams, InterventionType, Target};
use crate::intervention_engine::scenario::Scenario;
use crate::shared_data::{ImpactReport, Recommendation};
use std::cmp::Ordering;

/// v/c above which the rerouting candidate marks a segment degraded.
const REROUTE_CONGESTION_THRESHOLD: f64 = 0.9;

struct Candidate {
    kind: InterventionType,
    targets: Vec<Target>,
    params: InterventionParams,
}

/// `w_aqi*aqi + w_lives*lives + w_speed*speed% - w_cost*cost - w_time*hours`.
pub fn score(kind: InterventionType, impact: &ImpactReport, config: &EngineConfig) -> f64 {
    let w = &config.ranking_weights;
    let cost = config.cost_table.entry(kind);
    w.aqi_reduction * impact.aqi_reduction + w.lives_saved * impact.lives_saved_estimate
        + w.speed_change_pct * impact.speed_change_pct
        - w.cost_millions * cost.cost_millions
        - w.implementation_hours * cost.implementation_hours
}

fn candidates(scenario: &Scenario) -> Vec<Candidate> {
    let config = scenario.config();
    let current = scenario.current_evaluation();

    // Worst zones by AQI, lowest index first on ties.
    let mut zone_order: Vec<usize> = (0..current.zones.len()).collect();
    zone_order.sort_by(|&a, &b| current.zones[b].aqi.total_cmp(&current.zones[a].aqi).then(a.cmp(&b)));
    let zone_targets: Vec<Target> = zone_order
        .iter()
        .take(config.recommendation_zone_count)
        .map(|&z| Target::Zone(current.zones[z].zone_id.clone()))
        .collect();

    // Most congested open segments carrying traffic.
    let network = scenario.network();
    let mut segment_order: Vec<usize> = (0..current.segments.len())
        .filter(|&s| current.segments[s].flow_vph > 0.0 && !network.segments()[s].closed)
        .collect();
    segment_order.sort_by(|&a, &b| {
        current.segments[b]
            .vc_ratio
            .total_cmp(&current.segments[a].vc_ratio)
            .then(a.cmp(&b))
    });
    let segment_targets: Vec<Target> = segment_order
        .iter()
        .take(config.recommendation_segment_count)
        .map(|&s| Target::Segment(current.segments[s].segment_id.clone()))
        .collect();

    let mut list = Vec::new();
    if !zone_targets.is_empty() {
        for kind in [
            InterventionType::TruckBan,
            InterventionType::OddEven,
            InterventionType::Emergency,
            InterventionType::SignalTuning,
        ] {
            list.push(Candidate {
                kind,
                targets: zone_targets.clone(),
                params: InterventionParams::default(),
            });
        }
    }
    if !segment_targets.is_empty() {
        list.push(Candidate {
            kind: InterventionType::LaneAddition,
            targets: segment_targets,
            params: InterventionParams::default(),
        });
    }
    if current.segments.iter().any(|s| s.vc_ratio > REROUTE_CONGESTION_THRESHOLD) {
        list.push(Candidate {
            kind: InterventionType::DynamicRerouting,
            targets: Vec::new(),
            params: InterventionParams {
                congestion_threshold: Some(REROUTE_CONGESTION_THRESHOLD),
                ..Default::default()
            },
        });
    }
    list
}

/// Ranks every candidate by score, best first. Candidates that fail to
/// apply are skipped. The scenario itself is never mutated.
pub fn recommend(scenario: &Scenario) -> Result<Vec<Recommendation>> {
    let config = scenario.config();
    let mut ranked = Vec::new();

    for candidate in candidates(scenario) {
        let mut trial = scenario.clone();
        let applied = match trial.apply_intervention(candidate.kind, &candidate.targets, &candidate.params) {
            Ok(applied) => applied,
            Err(e) => {
                log::debug!("[Recommend] Skipping {}: {}", candidate.kind, e);
                continue;
            }
        };
        let impact = compute_impact(scenario.current_evaluation(), &applied.evaluation, config);
        let cost = *config.cost_table.entry(candidate.kind);
        let score = score(candidate.kind, &impact, config);
        log::debug!(
            "[Recommend] {} on {} targets: AQI -{:.2}, score {:.1}",
            candidate.kind,
            candidate.targets.len(),
            impact.aqi_reduction,
            score
        );
        ranked.push(Recommendation {
            intervention_type: candidate.kind,
            targets: candidate.targets.iter().map(|t| t.to_string()).collect(),
            predicted_impact: impact,
            confidence_score: cost.confidence,
            cost_millions: cost.cost_millions,
            implementation_hours: cost.implementation_hours,
            score,
        });
    }

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.intervention_type.cmp(&b.intervention_type))
    });
    Ok(ranked)
}
