pub mod handlers;
pub mod impact;
pub mod interventions;
pub mod patches;
pub mod recommendations;
pub mod scenario;

pub use impact::compute_impact;
pub use interventions::{parse_targets, InterventionParams, InterventionType, Target};
pub use patches::{Patch, PatchField, PatchTarget, PatchValue};
pub use recommendations::recommend;
pub use scenario::{AppliedIntervention, InterventionRecord, Scenario, ScenarioState};
