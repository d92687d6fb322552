// scenario_registry.rs
//
// Owns independent scenarios behind opaque handles. Every scenario has its
// own deep copy of the network, so scenarios never share mutable state.
// Within one scenario there is a single writer: a mutating call that finds
// the scenario locked is rejected with `ScenarioBusy` rather than queued.

use crate::config::EngineConfig;
use crate::errors::{EngineError, Result};
use crate::intervention_engine::interventions::{parse_targets, InterventionParams, InterventionType};
use crate::intervention_engine::recommendations::recommend;
use crate::intervention_engine::scenario::{AppliedIntervention, Scenario};
use crate::network_model::loader::{load_from_paths, load_from_readers, NetworkPaths};
use crate::network_model::CorridorNetwork;
use crate::shared_data::{Evaluation, ImpactReport, Recommendation};
use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NetworkHandle(pub u64);

pub struct ScenarioRegistry {
    config: EngineConfig,
    scenarios: Mutex<HashMap<u64, Arc<Mutex<Scenario>>>>,
    next_handle: AtomicU64,
}

impl ScenarioRegistry {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            scenarios: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn table(&self) -> MutexGuard<'_, HashMap<u64, Arc<Mutex<Scenario>>>> {
        self.scenarios.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn get(&self, handle: NetworkHandle) -> Result<Arc<Mutex<Scenario>>> {
        self.table()
            .get(&handle.0)
            .cloned()
            .ok_or(EngineError::UnknownScenario(handle.0))
    }

    /// Runs `f` with the scenario locked for writing. Fails fast when
    /// another writer holds it.
    fn write<T>(&self, handle: NetworkHandle, f: impl FnOnce(&mut Scenario) -> Result<T>) -> Result<T> {
        let slot = self.get(handle)?;
        let mut guard = match slot.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(EngineError::ScenarioBusy(handle.0)),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };
        f(&mut *guard)
    }

    /// Runs `f` with shared access, waiting for any writer to finish.
    fn read<T>(&self, handle: NetworkHandle, f: impl FnOnce(&Scenario) -> Result<T>) -> Result<T> {
        let slot = self.get(handle)?;
        let guard = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&*guard)
    }

    /// Registers an already built network as a new scenario.
    pub fn insert(&self, network: CorridorNetwork) -> Result<NetworkHandle> {
        let scenario = Scenario::new(network, self.config.clone())?;
        let id = self.next_handle.fetch_add(1, Ordering::Relaxed);
        self.table().insert(id, Arc::new(Mutex::new(scenario)));
        log::info!("[Registry] Created scenario {}", id);
        Ok(NetworkHandle(id))
    }

    pub fn load_network(
        &self,
        segments: impl Read,
        intersections: impl Read,
        od: impl Read,
        zones: impl Read,
    ) -> Result<NetworkHandle> {
        let network = load_from_readers(segments, intersections, od, zones, &self.config.default_class_split)?;
        self.insert(network)
    }

    pub fn load_network_from_paths(&self, paths: &NetworkPaths) -> Result<NetworkHandle> {
        let network = load_from_paths(paths, &self.config.default_class_split)?;
        self.insert(network)
    }

    pub fn run_baseline(&self, handle: NetworkHandle) -> Result<Evaluation> {
        self.read(handle, |s| Ok(s.baseline_evaluation().clone()))
    }

    pub fn current_results(&self, handle: NetworkHandle) -> Result<Evaluation> {
        self.read(handle, |s| Ok(s.current_evaluation().clone()))
    }

    /// String-level entry point: `kind` is a type name such as `truckBan`,
    /// each target is `zone:<id>`, `segment:<id>` or `intersection:<id>`.
    pub fn apply_intervention<S: AsRef<str>>(
        &self,
        handle: NetworkHandle,
        kind: &str,
        targets: &[S],
        params: &InterventionParams,
    ) -> Result<AppliedIntervention> {
        let kind: InterventionType = kind.parse()?;
        let targets = parse_targets(targets)?;
        self.write(handle, |s| s.apply_intervention(kind, &targets, params))
    }

    pub fn impact(&self, handle: NetworkHandle, intervention_id: u64) -> Result<ImpactReport> {
        self.read(handle, |s| s.impact(intervention_id))
    }

    pub fn reset_interventions(&self, handle: NetworkHandle) -> Result<Evaluation> {
        self.write(handle, |s| s.reset().cloned())
    }

    pub fn rollback(&self, handle: NetworkHandle, intervention_id: u64) -> Result<Evaluation> {
        self.write(handle, |s| s.rollback(intervention_id).cloned())
    }

    pub fn recommendations(&self, handle: NetworkHandle) -> Result<Vec<Recommendation>> {
        self.read(handle, recommend)
    }

    /// Deep-copies a scenario, interventions included, under a new handle.
    pub fn fork(&self, handle: NetworkHandle) -> Result<NetworkHandle> {
        let copy = self.read(handle, |s| Ok(s.clone()))?;
        let id = self.next_handle.fetch_add(1, Ordering::Relaxed);
        self.table().insert(id, Arc::new(Mutex::new(copy)));
        log::info!("[Registry] Forked scenario {} into {}", handle.0, id);
        Ok(NetworkHandle(id))
    }

    pub fn drop_scenario(&self, handle: NetworkHandle) -> Result<()> {
        self.table()
            .remove(&handle.0)
            .map(|_| log::info!("[Registry] Dropped scenario {}", handle.0))
            .ok_or(EngineError::UnknownScenario(handle.0))
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
