use crate::config::EngineConfig;
use crate::engine::evaluation::evaluate_network;
use crate::errors::{EngineError, Result};
use crate::intervention_engine::handlers::build_patches;
use crate::intervention_engine::impact::compute_impact;
use crate::intervention_engine::interventions::{InterventionParams, InterventionType, Target};
use crate::intervention_engine::patches::{undo_patches, Patch};
use crate::network_model::CorridorNetwork;
use crate::shared_data::{Evaluation, ImpactReport};
use serde::Serialize;

/// Where a scenario is in its apply/evaluate/reset cycle.
///
/// A mutated but not yet re-evaluated network only exists as the staging
/// copy inside `apply_intervention`; the scenario moves straight from its
/// previous state to `Evaluated` once the re-run succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScenarioState {
    Baseline,
    Evaluated,
}

/// An applied intervention and everything needed to undo it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterventionRecord {
    pub id: u64,
    pub kind: InterventionType,
    pub targets: Vec<Target>,
    pub params: InterventionParams,
    pub patches: Vec<Patch>,
    /// Results with this and every earlier intervention applied.
    pub evaluation: Evaluation,
}

/// Returned by a successful apply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedIntervention {
    pub intervention_id: u64,
    pub evaluation: Evaluation,
}

/// One what-if session: an immutable baseline plus a stack of interventions.
#[derive(Debug, Clone)]
pub struct Scenario {
    config: EngineConfig,
    baseline: CorridorNetwork,
    baseline_evaluation: Evaluation,
    network: CorridorNetwork,
    current: Evaluation,
    records: Vec<InterventionRecord>,
    next_id: u64,
    state: ScenarioState,
}

impl Scenario {
    /// Captures `network` as the baseline snapshot and evaluates it.
    pub fn new(network: CorridorNetwork, config: EngineConfig) -> Result<Self> {
        let baseline_evaluation = evaluate_network(&network, &config)?;
        log::info!(
            "[Scenario] Baseline evaluated: {} segments, {} zones, mean AQI {:.1}",
            baseline_evaluation.segments.len(),
            baseline_evaluation.zones.len(),
            baseline_evaluation.mean_aqi()
        );
        Ok(Self {
            config,
            baseline: network.clone(),
            current: baseline_evaluation.clone(),
            baseline_evaluation,
            network,
            records: Vec::new(),
            next_id: 1,
            state: ScenarioState::Baseline,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn network(&self) -> &CorridorNetwork {
        &self.network
    }

    pub fn baseline_network(&self) -> &CorridorNetwork {
        &self.baseline
    }

    pub fn baseline_evaluation(&self) -> &Evaluation {
        &self.baseline_evaluation
    }

    /// Results for the network as it currently stands.
    pub fn current_evaluation(&self) -> &Evaluation {
        &self.current
    }

    pub fn records(&self) -> &[InterventionRecord] {
        &self.records
    }

    pub fn state(&self) -> ScenarioState {
        self.state
    }

    fn transition(&mut self, next: ScenarioState) {
        log::debug!("[Scenario] {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Applies one intervention and re-evaluates the whole network.
    ///
    /// All changes are written to a staging copy first. If target
    /// resolution, any sub-intervention or the re-run fails, the scenario is
    /// left exactly as it was.
    pub fn apply_intervention(
        &mut self,
        kind: InterventionType,
        targets: &[Target],
        params: &InterventionParams,
    ) -> Result<AppliedIntervention> {
        params.validate()?;
        let mut staging = self.network.clone();
        let patches = build_patches(&mut staging, kind, targets, params, &self.config, &self.current)?;
        let evaluation = evaluate_network(&staging, &self.config)?;

        self.network = staging;
        self.current = evaluation.clone();
        let id = self.next_id;
        self.next_id += 1;
        log::info!(
            "[Scenario] Applied intervention {} ({}) with {} patches",
            id,
            kind,
            patches.len()
        );
        self.records.push(InterventionRecord {
            id,
            kind,
            targets: targets.to_vec(),
            params: params.clone(),
            patches,
            evaluation: evaluation.clone(),
        });
        self.transition(ScenarioState::Evaluated);

        Ok(AppliedIntervention {
            intervention_id: id,
            evaluation,
        })
    }

    /// Baseline versus the results recorded right after intervention `id`.
    pub fn impact(&self, id: u64) -> Result<ImpactReport> {
        let record = self
            .records
            .iter()
            .find(|r| r.id == id)
            .ok_or(EngineError::UnknownIntervention(id))?;
        Ok(compute_impact(&self.baseline_evaluation, &record.evaluation, &self.config))
    }

    /// Drops every intervention and restores the baseline snapshot.
    /// Calling it again is a no-op.
    pub fn reset(&mut self) -> Result<&Evaluation> {
        if self.state == ScenarioState::Baseline && self.records.is_empty() && self.network == self.baseline {
            log::debug!("[Scenario] Reset on a baseline scenario is a no-op");
            return Ok(&self.current);
        }
        let evaluation = evaluate_network(&self.baseline, &self.config)?;
        self.network = self.baseline.clone();
        self.current = evaluation;
        let dropped = self.records.len();
        self.records.clear();
        self.transition(ScenarioState::Baseline);
        log::info!("[Scenario] Reset to baseline, dropped {} interventions", dropped);
        Ok(&self.current)
    }

    /// Undoes the most recent intervention by replaying its old values.
    pub fn rollback(&mut self, id: u64) -> Result<&Evaluation> {
        let latest = match self.records.last() {
            Some(record) => record,
            None => return Err(EngineError::UnknownIntervention(id)),
        };
        if latest.id != id {
            if self.records.iter().any(|r| r.id == id) {
                return Err(EngineError::RollbackOrder {
                    requested: id,
                    latest: latest.id,
                });
            }
            return Err(EngineError::UnknownIntervention(id));
        }

        let mut staging = self.network.clone();
        undo_patches(&mut staging, &latest.patches)?;
        let evaluation = evaluate_network(&staging, &self.config)?;
        self.network = staging;
        self.current = evaluation;
        self.records.pop();
        if self.records.is_empty() {
            self.transition(ScenarioState::Baseline);
        }
        log::info!("[Scenario] Rolled back intervention {}", id);
        Ok(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network_model::tests::line_records;

    fn scenario() -> Scenario {
        let config = EngineConfig::default();
        let network = CorridorNetwork::load(line_records(), &config.default_class_split).unwrap();
        Scenario::new(network, config).unwrap()
    }

    fn zone(id: &str) -> Vec<Target> {
        vec![Target::Zone(id.to_string())]
    }

    #[test]
    fn apply_then_reset_restores_baseline_exactly() {
        let mut s = scenario();
        let baseline = s.baseline_evaluation().clone();
        let applied = s
            .apply_intervention(InterventionType::OddEven, &zone("Z1"), &InterventionParams::default())
            .unwrap();
        assert_eq!(applied.intervention_id, 1);
        assert_eq!(s.state(), ScenarioState::Evaluated);
        assert_ne!(s.current_evaluation(), &baseline);

        let reset = s.reset().unwrap().clone();
        assert_eq!(reset, baseline);
        assert_eq!(s.network(), s.baseline_network());
        assert_eq!(s.state(), ScenarioState::Baseline);
        // Second reset changes nothing.
        assert_eq!(s.reset().unwrap(), &baseline);
    }

    #[test]
    fn failed_apply_leaves_scenario_untouched() {
        let mut s = scenario();
        let before = s.network().clone();
        let targets = vec![Target::Zone("Z1".to_string()), Target::Zone("Z9".to_string())];
        let err = s
            .apply_intervention(InterventionType::TruckBan, &targets, &InterventionParams::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTarget { .. }));
        assert_eq!(s.network(), &before);
        assert!(s.records().is_empty());
        assert_eq!(s.state(), ScenarioState::Baseline);
    }

    #[test]
    fn failed_apply_keeps_the_evaluated_state() {
        let mut s = scenario();
        let params = InterventionParams::default();
        s.apply_intervention(InterventionType::TruckBan, &zone("Z1"), &params).unwrap();
        let network = s.network().clone();
        let evaluation = s.current_evaluation().clone();

        assert!(s.apply_intervention(InterventionType::LaneAddition, &zone("Z9"), &params).is_err());
        assert_eq!(s.state(), ScenarioState::Evaluated);
        assert_eq!(s.network(), &network);
        assert_eq!(s.current_evaluation(), &evaluation);
        assert_eq!(s.records().len(), 1);
    }

    #[test]
    fn rollback_only_undoes_the_latest() {
        let mut s = scenario();
        let params = InterventionParams::default();
        let first = s.apply_intervention(InterventionType::TruckBan, &zone("Z1"), &params).unwrap();
        let after_first = s.network().clone();
        let second = s.apply_intervention(InterventionType::LaneAddition, &zone("Z2"), &params).unwrap();

        assert!(matches!(
            s.rollback(first.intervention_id),
            Err(EngineError::RollbackOrder { requested: 1, latest: 2 })
        ));
        assert!(matches!(s.rollback(42), Err(EngineError::UnknownIntervention(42))));

        s.rollback(second.intervention_id).unwrap();
        assert_eq!(s.network(), &after_first);
        s.rollback(first.intervention_id).unwrap();
        assert_eq!(s.network(), s.baseline_network());
        assert_eq!(s.current_evaluation(), s.baseline_evaluation());
        assert_eq!(s.state(), ScenarioState::Baseline);
    }

    #[test]
    fn impact_of_unknown_id_fails() {
        let mut s = scenario();
        assert!(matches!(s.impact(7), Err(EngineError::UnknownIntervention(7))));
        let applied = s
            .apply_intervention(InterventionType::OddEven, &zone("Z1"), &InterventionParams::default())
            .unwrap();
        let report = s.impact(applied.intervention_id).unwrap();
        assert!(report.aqi_reduction > 0.0);
        assert!(report.traffic_change_pct < 0.0);
    }

    #[test]
    fn invalid_params_are_rejected_before_mutation() {
        let mut s = scenario();
        let params = InterventionParams {
            ban_fraction: Some(-0.1),
            ..Default::default()
        };
        let err = s.apply_intervention(InterventionType::TruckBan, &zone("Z1"), &params).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
        assert!(s.records().is_empty());
    }
}
