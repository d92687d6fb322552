pub mod congestion;
pub mod solver;

pub use congestion::{speed_for, travel_time_min, SpeedOutcome};
pub use solver::{od_results, solve, TrafficState};
