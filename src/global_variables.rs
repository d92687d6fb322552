// Congestion curve (Bureau of Public Roads)
pub const BPR_ALPHA: f64 = 0.15;
pub const BPR_BETA: i32 = 4;

// Speed never drops below this share of free-flow speed.
pub const SPEED_FLOOR_FRACTION: f64 = 0.1;

// Vehicles per hour a single urban lane carries.
pub const BASE_LANE_CAPACITY_VPH: f64 = 1200.0;

// Degree of saturation cap used by the uniform signal delay term.
pub const MAX_SATURATION_RATIO: f64 = 0.95;

// Networks above this size are rejected at load.
pub const MAX_SEGMENTS: usize = 10_000;

// Dispersion singularity guard (km^2).
pub const DISPERSION_EPSILON_KM2: f64 = 0.01;

// Signal retiming clamps (seconds)
pub const MIN_CYCLE_SECONDS: f64 = 30.0;
pub const MIN_GREEN_SECONDS: f64 = 15.0;
pub const MAX_GREEN_SECONDS: f64 = 90.0;

// Routing weight multiplier for segments flagged as degraded.
pub const DEGRADED_ROUTE_PENALTY: f64 = 3.0;

// Path distances closer than this are treated as ties.
pub const ROUTE_TIE_EPSILON_KM: f64 = 1e-9;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
