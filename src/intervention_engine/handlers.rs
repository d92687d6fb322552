// handlers.rs
//
// Per-type mutation logic. Handlers resolve their targets first, then write
// their changes into the network they are given (a staging copy owned by the
// caller) and return the patches that describe those changes.

use crate::config::EngineConfig;
use crate::control_system::signal_timing::retime;
use crate::errors::{EngineError, Result};
use crate::global_variables::{BASE_LANE_CAPACITY_VPH, DEGRADED_ROUTE_PENALTY};
use crate::intervention_engine::interventions::{InterventionParams, InterventionType, Target};
use crate::intervention_engine::patches::{set_field, Patch, PatchField, PatchTarget, PatchValue};
use crate::network_model::vehicles::VehicleClass;
use crate::network_model::CorridorNetwork;
use crate::shared_data::Evaluation;

const DEFAULT_TRUCK_BAN_FRACTION: f64 = 1.0;
const DEFAULT_ODD_EVEN_FRACTION: f64 = 0.4;
const DEFAULT_LANE_DELTA: i32 = 1;
const DEFAULT_CYCLE_DELTA_S: f64 = -20.0;
const DEFAULT_GREEN_DELTA_S: f64 = 0.0;

fn push_unique(list: &mut Vec<usize>, idx: usize) {
    if !list.contains(&idx) {
        list.push(idx);
    }
}

/// Expands targets into segment indexes, in target order.
fn resolve_segments(network: &CorridorNetwork, kind: InterventionType, targets: &[Target]) -> Result<Vec<usize>> {
    let mut found = Vec::new();
    for target in targets {
        match target {
            Target::Zone(id) => {
                let zone = network
                    .zone_idx(id)
                    .ok_or_else(|| EngineError::invalid_target(target.to_string(), "unknown zone"))?;
                for &s in &network.zones()[zone].segments {
                    push_unique(&mut found, s);
                }
            }
            Target::Segment(id) => {
                let seg = network
                    .segment_idx(id)
                    .ok_or_else(|| EngineError::invalid_target(target.to_string(), "unknown segment"))?;
                push_unique(&mut found, seg);
            }
            Target::Intersection(_) => {
                return Err(EngineError::invalid_target(
                    target.to_string(),
                    format!("{} acts on segments, not intersections", kind),
                ))
            }
        }
    }
    Ok(found)
}

/// Expands targets into intersection indexes for signal retiming.
fn resolve_intersections(network: &CorridorNetwork, targets: &[Target]) -> Result<Vec<usize>> {
    let mut found = Vec::new();
    for target in targets {
        match target {
            Target::Zone(id) => {
                let zone = network
                    .zone_idx(id)
                    .ok_or_else(|| EngineError::invalid_target(target.to_string(), "unknown zone"))?;
                for idx in network.zone_intersections(zone) {
                    push_unique(&mut found, idx);
                }
            }
            Target::Segment(id) => {
                let seg = network
                    .segment(id)
                    .ok_or_else(|| EngineError::invalid_target(target.to_string(), "unknown segment"))?;
                push_unique(&mut found, seg.destination);
            }
            Target::Intersection(id) => {
                let idx = network
                    .intersection_idx(id)
                    .ok_or_else(|| EngineError::invalid_target(target.to_string(), "unknown intersection"))?;
                push_unique(&mut found, idx);
            }
        }
    }
    Ok(found)
}

fn scale_class(
    network: &mut CorridorNetwork,
    segments: &[usize],
    class: VehicleClass,
    fraction: f64,
    patches: &mut Vec<Patch>,
) -> Result<()> {
    for &s in segments {
        let current = network.segments()[s].class_factors[class];
        set_field(
            network,
            patches,
            PatchTarget::Segment(s),
            PatchField::ClassFactor(class),
            PatchValue::Number(current * (1.0 - fraction)),
        )?;
    }
    Ok(())
}

fn add_lanes(network: &mut CorridorNetwork, segments: &[usize], delta: i32, patches: &mut Vec<Patch>) -> Result<()> {
    for &s in segments {
        let seg = &network.segments()[s];
        let old_lanes = seg.lanes;
        let new_lanes = (i64::from(old_lanes) + i64::from(delta)).clamp(0, i64::from(u32::MAX)) as u32;
        let floor = f64::from(new_lanes) * BASE_LANE_CAPACITY_VPH;
        let capacity = if old_lanes == 0 {
            floor
        } else {
            (seg.capacity_vph * f64::from(new_lanes) / f64::from(old_lanes)).max(floor)
        };
        let target = PatchTarget::Segment(s);
        set_field(network, patches, target, PatchField::Lanes, PatchValue::Count(new_lanes))?;
        set_field(network, patches, target, PatchField::Capacity, PatchValue::Number(capacity))?;
    }
    Ok(())
}

fn tune_signals(
    network: &mut CorridorNetwork,
    intersections: &[usize],
    params: &InterventionParams,
    patches: &mut Vec<Patch>,
) -> Result<()> {
    let cycle_delta = params.cycle_delta_s.unwrap_or(DEFAULT_CYCLE_DELTA_S);
    let green_delta = params.green_delta_s.unwrap_or(DEFAULT_GREEN_DELTA_S);
    for &i in intersections {
        let Some(plan) = retime(&network.intersections()[i], cycle_delta, green_delta) else {
            log::debug!("[Intervention] Skipping unsignalised '{}'", network.intersections()[i].id);
            continue;
        };
        let target = PatchTarget::Intersection(i);
        set_field(network, patches, target, PatchField::GreenNorthSouth, PatchValue::Number(plan.green_ns_s))?;
        set_field(network, patches, target, PatchField::GreenEastWest, PatchValue::Number(plan.green_ew_s))?;
        set_field(network, patches, target, PatchField::CycleTime, PatchValue::Number(plan.cycle_s))?;
    }
    Ok(())
}

/// Closes the given segments and degrades every open segment whose v/c in
/// `current` exceeds `threshold`.
///
/// Degrading is a soft exclusion: the segment's routing weight is multiplied
/// by `DEGRADED_ROUTE_PENALTY`, so routes avoid it while an alternative
/// exists but still use it when it is the only way through. Only closed
/// segments are removed from routing.
fn reroute(
    network: &mut CorridorNetwork,
    closures: &[usize],
    threshold: Option<f64>,
    current: &Evaluation,
    patches: &mut Vec<Patch>,
) -> Result<()> {
    for &s in closures {
        set_field(network, patches, PatchTarget::Segment(s), PatchField::Closed, PatchValue::Flag(true))?;
    }
    if let Some(threshold) = threshold {
        for (s, result) in current.segments.iter().enumerate() {
            if result.vc_ratio > threshold && !network.segments()[s].closed {
                set_field(
                    network,
                    patches,
                    PatchTarget::Segment(s),
                    PatchField::RoutePenalty,
                    PatchValue::Number(DEGRADED_ROUTE_PENALTY),
                )?;
            }
        }
    }
    Ok(())
}

fn truck_ban_fraction(params: &InterventionParams) -> f64 {
    params.ban_fraction.unwrap_or(DEFAULT_TRUCK_BAN_FRACTION)
}

fn odd_even_fraction(params: &InterventionParams) -> f64 {
    params
        .odd_even_fraction
        .or(params.ban_fraction)
        .unwrap_or(DEFAULT_ODD_EVEN_FRACTION)
}

/// Writes one intervention into `network` and returns its patches.
///
/// `current` is the evaluation of `network` before the change; rerouting
/// reads congestion from it. Time-windowed bans outside the configured
/// analysis hour produce no patches.
pub fn build_patches(
    network: &mut CorridorNetwork,
    kind: InterventionType,
    targets: &[Target],
    params: &InterventionParams,
    config: &EngineConfig,
    current: &Evaluation,
) -> Result<Vec<Patch>> {
    let rerouting_by_threshold = kind == InterventionType::DynamicRerouting && params.congestion_threshold.is_some();
    if targets.is_empty() && !rerouting_by_threshold {
        return Err(EngineError::invalid_input(kind.name(), "at least one target is required"));
    }

    let mut patches = Vec::new();
    match kind {
        InterventionType::TruckBan | InterventionType::OddEven => {
            let segments = resolve_segments(network, kind, targets)?;
            if !params.active_at(config.analysis_hour) {
                log::info!(
                    "[Intervention] {} window {:?} is inactive at hour {}",
                    kind,
                    params.time_window,
                    config.analysis_hour
                );
                return Ok(patches);
            }
            let (class, fraction) = if kind == InterventionType::TruckBan {
                (VehicleClass::Truck, truck_ban_fraction(params))
            } else {
                (VehicleClass::Car, odd_even_fraction(params))
            };
            scale_class(network, &segments, class, fraction, &mut patches)?;
        }
        InterventionType::LaneAddition => {
            let segments = resolve_segments(network, kind, targets)?;
            add_lanes(network, &segments, params.lane_delta.unwrap_or(DEFAULT_LANE_DELTA), &mut patches)?;
        }
        InterventionType::SignalTuning => {
            let intersections = resolve_intersections(network, targets)?;
            tune_signals(network, &intersections, params, &mut patches)?;
        }
        InterventionType::DynamicRerouting => {
            let segments = resolve_segments(network, kind, targets)?;
            reroute(network, &segments, params.congestion_threshold, current, &mut patches)?;
        }
        InterventionType::Emergency => {
            // Resolve everything before the first write.
            let segments = resolve_segments(network, kind, targets)?;
            let mut intersections = Vec::new();
            for &s in &segments {
                push_unique(&mut intersections, network.segments()[s].destination);
            }
            let sub_targets: Vec<Target> = segments
                .iter()
                .map(|&s| Target::Segment(network.segments()[s].id.clone()))
                .collect();
            let signal_targets: Vec<Target> = intersections
                .iter()
                .map(|&i| Target::Intersection(network.intersections()[i].id.clone()))
                .collect();
            // ban_fraction belongs to the truck ban here; cars only follow
            // odd_even_fraction or the odd-even default.
            let odd_even_params = InterventionParams {
                ban_fraction: None,
                ..params.clone()
            };
            for (sub_kind, sub_targets, sub_params) in [
                (InterventionType::TruckBan, &sub_targets, params),
                (InterventionType::OddEven, &sub_targets, &odd_even_params),
                (InterventionType::LaneAddition, &sub_targets, params),
                (InterventionType::SignalTuning, &signal_targets, params),
            ] {
                if sub_targets.is_empty() {
                    continue;
                }
                let sub = build_patches(network, sub_kind, sub_targets, sub_params, config, current)?;
                patches.extend(sub);
            }
        }
    }
    Ok(patches)
}
