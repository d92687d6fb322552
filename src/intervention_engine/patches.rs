// patches.rs
//
// Every intervention is recorded as a list of field patches. Applying writes
// the new values in order; undoing writes the old values in reverse order.

use crate::errors::{EngineError, Result};
use crate::network_model::vehicles::VehicleClass;
use crate::network_model::CorridorNetwork;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PatchTarget {
    Segment(usize),
    Intersection(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PatchField {
    ClassFactor(VehicleClass),
    Lanes,
    Capacity,
    Closed,
    RoutePenalty,
    CycleTime,
    GreenNorthSouth,
    GreenEastWest,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PatchValue {
    Number(f64),
    Count(u32),
    Flag(bool),
}

impl fmt::Display for PatchValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PatchValue::Number(v) => write!(f, "{}", v),
            PatchValue::Count(v) => write!(f, "{}", v),
            PatchValue::Flag(v) => write!(f, "{}", v),
        }
    }
}

/// One `(target, field, old, new)` mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Patch {
    pub target: PatchTarget,
    pub field: PatchField,
    pub old: PatchValue,
    pub new: PatchValue,
}

/// Reads the current value of a patchable field.
pub fn read_field(network: &CorridorNetwork, target: PatchTarget, field: PatchField) -> Result<PatchValue> {
    match target {
        PatchTarget::Segment(idx) => {
            let seg = network
                .segments()
                .get(idx)
                .ok_or_else(|| EngineError::invalid_target(format!("segment #{}", idx), "index out of range"))?;
            match field {
                PatchField::ClassFactor(class) => Ok(PatchValue::Number(seg.class_factors[class])),
                PatchField::Lanes => Ok(PatchValue::Count(seg.lanes)),
                PatchField::Capacity => Ok(PatchValue::Number(seg.capacity_vph)),
                PatchField::Closed => Ok(PatchValue::Flag(seg.closed)),
                PatchField::RoutePenalty => Ok(PatchValue::Number(seg.route_penalty)),
                other => Err(mismatch(target, other)),
            }
        }
        PatchTarget::Intersection(idx) => {
            let node = network
                .intersections()
                .get(idx)
                .ok_or_else(|| EngineError::invalid_target(format!("intersection #{}", idx), "index out of range"))?;
            match field {
                PatchField::CycleTime => Ok(PatchValue::Number(node.cycle_s)),
                PatchField::GreenNorthSouth => Ok(PatchValue::Number(node.green_ns_s)),
                PatchField::GreenEastWest => Ok(PatchValue::Number(node.green_ew_s)),
                other => Err(mismatch(target, other)),
            }
        }
    }
}

/// Writes one field. The value kind must match the field.
pub fn write_field(network: &mut CorridorNetwork, target: PatchTarget, field: PatchField, value: PatchValue) -> Result<()> {
    // Bounds and field/target pairing are checked by reading first.
    read_field(network, target, field)?;
    match (target, field, value) {
        (PatchTarget::Segment(idx), PatchField::ClassFactor(class), PatchValue::Number(v)) => {
            network.segment_mut(idx).class_factors[class] = v;
        }
        (PatchTarget::Segment(idx), PatchField::Lanes, PatchValue::Count(v)) => {
            network.segment_mut(idx).lanes = v;
        }
        (PatchTarget::Segment(idx), PatchField::Capacity, PatchValue::Number(v)) => {
            network.segment_mut(idx).capacity_vph = v;
        }
        (PatchTarget::Segment(idx), PatchField::Closed, PatchValue::Flag(v)) => {
            network.segment_mut(idx).closed = v;
        }
        (PatchTarget::Segment(idx), PatchField::RoutePenalty, PatchValue::Number(v)) => {
            network.segment_mut(idx).route_penalty = v;
        }
        (PatchTarget::Intersection(idx), PatchField::CycleTime, PatchValue::Number(v)) => {
            network.intersection_mut(idx).cycle_s = v;
        }
        (PatchTarget::Intersection(idx), PatchField::GreenNorthSouth, PatchValue::Number(v)) => {
            network.intersection_mut(idx).green_ns_s = v;
        }
        (PatchTarget::Intersection(idx), PatchField::GreenEastWest, PatchValue::Number(v)) => {
            network.intersection_mut(idx).green_ew_s = v;
        }
        (target, field, value) => {
            return Err(EngineError::invalid_input(
                "patch",
                format!("value {} does not fit {:?} on {:?}", value, field, target),
            ))
        }
    }
    Ok(())
}

fn mismatch(target: PatchTarget, field: PatchField) -> EngineError {
    EngineError::invalid_input("patch", format!("{:?} is not a field of {:?}", field, target))
}

/// Records and writes a change. Unchanged fields produce no patch.
pub fn set_field(
    network: &mut CorridorNetwork,
    patches: &mut Vec<Patch>,
    target: PatchTarget,
    field: PatchField,
    new: PatchValue,
) -> Result<()> {
    let old = read_field(network, target, field)?;
    if old == new {
        return Ok(());
    }
    write_field(network, target, field, new)?;
    log::debug!("[Patch] {:?}.{:?}: {} -> {}", target, field, old, new);
    patches.push(Patch { target, field, old, new });
    Ok(())
}

pub fn apply_patches(network: &mut CorridorNetwork, patches: &[Patch]) -> Result<()> {
    for patch in patches {
        write_field(network, patch.target, patch.field, patch.new)?;
    }
    Ok(())
}

/// Restores the old values, newest patch first.
pub fn undo_patches(network: &mut CorridorNetwork, patches: &[Patch]) -> Result<()> {
    for patch in patches.iter().rev() {
        write_field(network, patch.target, patch.field, patch.old)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network_model::tests::line_records;
    use crate::network_model::vehicles::ClassValues;

    fn network() -> CorridorNetwork {
        CorridorNetwork::load(line_records(), &ClassValues::splat(0.25)).unwrap()
    }

    #[test]
    fn undo_restores_the_original_network() {
        let original = network();
        let mut net = original.clone();
        let mut patches = Vec::new();
        let seg = PatchTarget::Segment(0);
        set_field(&mut net, &mut patches, seg, PatchField::Lanes, PatchValue::Count(3)).unwrap();
        set_field(&mut net, &mut patches, seg, PatchField::Capacity, PatchValue::Number(3600.0)).unwrap();
        set_field(&mut net, &mut patches, seg, PatchField::Capacity, PatchValue::Number(4000.0)).unwrap();
        set_field(&mut net, &mut patches, PatchTarget::Intersection(1), PatchField::CycleTime, PatchValue::Number(70.0))
            .unwrap();
        assert_eq!(patches.len(), 4);
        assert_ne!(net, original);

        undo_patches(&mut net, &patches).unwrap();
        assert_eq!(net, original);

        apply_patches(&mut net, &patches).unwrap();
        assert_eq!(net.segments()[0].capacity_vph, 4000.0);
    }

    #[test]
    fn unchanged_value_records_nothing() {
        let mut net = network();
        let mut patches = Vec::new();
        set_field(&mut net, &mut patches, PatchTarget::Segment(1), PatchField::Closed, PatchValue::Flag(false)).unwrap();
        assert!(patches.is_empty());
    }

    #[test]
    fn mismatched_field_is_rejected() {
        let mut net = network();
        assert!(read_field(&net, PatchTarget::Intersection(0), PatchField::Lanes).is_err());
        assert!(write_field(&mut net, PatchTarget::Segment(0), PatchField::Lanes, PatchValue::Flag(true)).is_err());
        assert!(read_field(&net, PatchTarget::Segment(99), PatchField::Lanes).is_err());
    }
}
