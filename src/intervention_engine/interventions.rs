use crate::errors::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported intervention types. Declaration order is the tie-break order
/// used when ranking recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InterventionType {
    Emergency,
    TruckBan,
    OddEven,
    SignalTuning,
    LaneAddition,
    DynamicRerouting,
}

impl InterventionType {
    pub const ALL: [InterventionType; 6] = [
        InterventionType::Emergency,
        InterventionType::TruckBan,
        InterventionType::OddEven,
        InterventionType::SignalTuning,
        InterventionType::LaneAddition,
        InterventionType::DynamicRerouting,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            InterventionType::Emergency => "emergency",
            InterventionType::TruckBan => "truckBan",
            InterventionType::OddEven => "oddEven",
            InterventionType::SignalTuning => "signalTuning",
            InterventionType::LaneAddition => "laneAddition",
            InterventionType::DynamicRerouting => "dynamicRerouting",
        }
    }
}

impl fmt::Display for InterventionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for InterventionType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        InterventionType::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EngineError::UnsupportedIntervention(s.to_string()))
    }
}

/// What an intervention is aimed at, written `zone:<id>`, `segment:<id>`
/// or `intersection:<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Zone(String),
    Segment(String),
    Intersection(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Target::Zone(id) => write!(f, "zone:{}", id),
            Target::Segment(id) => write!(f, "segment:{}", id),
            Target::Intersection(id) => write!(f, "intersection:{}", id),
        }
    }
}

impl FromStr for Target {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| EngineError::invalid_target(s, "expected <kind>:<id>"))?;
        let id = id.trim();
        if id.is_empty() {
            return Err(EngineError::invalid_target(s, "missing id"));
        }
        match kind.trim().to_ascii_lowercase().as_str() {
            "zone" => Ok(Target::Zone(id.to_string())),
            "segment" => Ok(Target::Segment(id.to_string())),
            "intersection" => Ok(Target::Intersection(id.to_string())),
            other => Err(EngineError::invalid_target(s, format!("unknown target kind '{}'", other))),
        }
    }
}

/// Parses a list of target strings; the first bad one fails the whole list.
pub fn parse_targets<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Target>> {
    raw.iter().map(|t| t.as_ref().parse()).collect()
}

/// Optional knobs. Anything left unset takes the per-type default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterventionParams {
    /// `(start_hour, end_hour)`; wraps past midnight when start > end.
    pub time_window: Option<(u32, u32)>,
    /// Share of trucks removed by a truck ban, in [0, 1]. A standalone
    /// odd-even restriction falls back to it when `odd_even_fraction` is unset.
    pub ban_fraction: Option<f64>,
    /// Share of cars removed by an odd-even restriction, in [0, 1].
    pub odd_even_fraction: Option<f64>,
    pub lane_delta: Option<i32>,
    pub cycle_delta_s: Option<f64>,
    pub green_delta_s: Option<f64>,
    /// v/c above which segments are flagged degraded for rerouting.
    pub congestion_threshold: Option<f64>,
}

impl InterventionParams {
    pub fn validate(&self) -> Result<()> {
        let fail = |message: String| Err(EngineError::invalid_input("intervention parameters", message));
        for (name, value) in [("ban_fraction", self.ban_fraction), ("odd_even_fraction", self.odd_even_fraction)] {
            if let Some(fraction) = value {
                if !(0.0..=1.0).contains(&fraction) {
                    return fail(format!("{} {} is outside [0, 1]", name, fraction));
                }
            }
        }
        if let Some((start, end)) = self.time_window {
            if start >= 24 || end >= 24 {
                return fail(format!("time window ({}, {}) has an hour outside 0..24", start, end));
            }
        }
        if let Some(threshold) = self.congestion_threshold {
            if !threshold.is_finite() || threshold <= 0.0 {
                return fail(format!("congestion_threshold must be positive, got {}", threshold));
            }
        }
        for (name, value) in [("cycle_delta_s", self.cycle_delta_s), ("green_delta_s", self.green_delta_s)] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return fail(format!("{} must be finite", name));
                }
            }
        }
        Ok(())
    }

    /// Whether `hour` falls inside the time window. No window means always;
    /// a window with equal start and end covers the whole day.
    pub fn active_at(&self, hour: u32) -> bool {
        match self.time_window {
            None => true,
            Some((start, end)) if start == end => true,
            Some((start, end)) if start < end => hour >= start && hour < end,
            Some((start, end)) => hour >= start || hour < end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_type_names() {
        assert_eq!("truckBan".parse::<InterventionType>().unwrap(), InterventionType::TruckBan);
        assert_eq!("EMERGENCY".parse::<InterventionType>().unwrap(), InterventionType::Emergency);
        assert!(matches!(
            "smogTower".parse::<InterventionType>(),
            Err(EngineError::UnsupportedIntervention(name)) if name == "smogTower"
        ));
    }

    #[test]
    fn parses_targets() {
        let targets = parse_targets(&["zone:Z1", "segment: S4", "intersection:N0_0"]).unwrap();
        assert_eq!(targets[0], Target::Zone("Z1".to_string()));
        assert_eq!(targets[1], Target::Segment("S4".to_string()));
        assert_eq!(targets[2].to_string(), "intersection:N0_0");
        assert!(matches!("Z1".parse::<Target>(), Err(EngineError::InvalidTarget { .. })));
        assert!("road:Z1".parse::<Target>().is_err());
        assert!("zone:".parse::<Target>().is_err());
    }

    #[test]
    fn time_window_wraps_midnight() {
        let night = InterventionParams {
            time_window: Some((22, 6)),
            ..Default::default()
        };
        assert!(night.active_at(23));
        assert!(night.active_at(2));
        assert!(!night.active_at(9));

        let day = InterventionParams {
            time_window: Some((6, 18)),
            ..Default::default()
        };
        assert!(day.active_at(6));
        assert!(!day.active_at(18));
        assert!(InterventionParams::default().active_at(3));
    }

    #[test]
    fn validation_rejects_out_of_range() {
        let bad_fraction = InterventionParams {
            ban_fraction: Some(1.5),
            ..Default::default()
        };
        assert!(bad_fraction.validate().is_err());
        let bad_odd_even = InterventionParams {
            odd_even_fraction: Some(-0.2),
            ..Default::default()
        };
        assert!(bad_odd_even.validate().is_err());
        let bad_hour = InterventionParams {
            time_window: Some((6, 24)),
            ..Default::default()
        };
        assert!(bad_hour.validate().is_err());
        let bad_threshold = InterventionParams {
            congestion_threshold: Some(0.0),
            ..Default::default()
        };
        assert!(bad_threshold.validate().is_err());
        assert!(InterventionParams::default().validate().is_ok());
    }
}
