pub mod config;
pub mod control_system;
pub mod emissions;
pub mod engine;
pub mod errors;
pub mod flow_analyzer;
pub mod global_variables;
pub mod intervention_engine;
pub mod monitoring;
pub mod network_model;
pub mod scenario_registry;
pub mod shared_data;

pub use config::EngineConfig;
pub use errors::{EngineError, Result};
pub use scenario_registry::{NetworkHandle, ScenarioRegistry};
