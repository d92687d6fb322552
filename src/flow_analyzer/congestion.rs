// congestion.rs
//
// Speed-flow relationship for a single segment using the Bureau of Public
// Roads curve, with a hard speed floor so saturated or capacity-less
// segments never reach zero speed.

use crate::errors::{EngineError, Result};
use crate::global_variables::{BPR_ALPHA, BPR_BETA, SPEED_FLOOR_FRACTION};
use crate::network_model::segments::Segment;

/// Speed on a segment for a given flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedOutcome {
    pub speed_kmh: f64,
    /// Volume over capacity. Saturated (1.0) when capacity is zero.
    pub vc_ratio: f64,
    /// Set when the segment has zero capacity.
    pub capacity_undefined: bool,
}

fn check_inputs(segment: &Segment, flow_vph: f64) -> Result<()> {
    if !flow_vph.is_finite() || flow_vph < 0.0 {
        return Err(EngineError::invalid_input(
            format!("segment '{}'", segment.id),
            format!("flow must be non-negative, got {}", flow_vph),
        ));
    }
    if !segment.capacity_vph.is_finite() || segment.capacity_vph < 0.0 {
        return Err(EngineError::invalid_input(
            format!("segment '{}'", segment.id),
            format!("capacity must be non-negative, got {}", segment.capacity_vph),
        ));
    }
    Ok(())
}

/// `free / (1 + 0.15 * (v/c)^4)`, never below 10% of free-flow speed.
pub fn speed_for(segment: &Segment, flow_vph: f64) -> Result<SpeedOutcome> {
    check_inputs(segment, flow_vph)?;
    let floor = segment.free_speed_kmh * SPEED_FLOOR_FRACTION;

    if segment.capacity_vph == 0.0 {
        return Ok(SpeedOutcome {
            speed_kmh: floor,
            vc_ratio: 1.0,
            capacity_undefined: true,
        });
    }

    let vc_ratio = flow_vph / segment.capacity_vph;
    let bpr = segment.free_speed_kmh / (1.0 + BPR_ALPHA * vc_ratio.powi(BPR_BETA));
    Ok(SpeedOutcome {
        speed_kmh: bpr.max(floor),
        vc_ratio,
        capacity_undefined: false,
    })
}

/// Minutes to traverse the segment at the congested speed.
pub fn travel_time_min(segment: &Segment, flow_vph: f64) -> Result<f64> {
    let outcome = speed_for(segment, flow_vph)?;
    Ok(segment.length_km / outcome.speed_kmh * 60.0)
}
