pub mod signal_timing;

pub use signal_timing::{approach_delay, intersection_delay, retime, SignalPlan};
