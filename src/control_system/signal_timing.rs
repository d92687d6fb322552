use crate::global_variables::{MAX_GREEN_SECONDS, MAX_SATURATION_RATIO, MIN_CYCLE_SECONDS, MIN_GREEN_SECONDS};
use crate::network_model::intersections::{Approach, Intersection};

/// Signal plan after retiming.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalPlan {
    pub cycle_s: f64,
    pub green_ns_s: f64,
    pub green_ew_s: f64,
}

/// Uniform delay (seconds per vehicle) on one approach:
/// `C * (1 - g/C)^2 / (2 * (1 - min(v/c, 0.95)))`.
/// A coarse approximation of signal delay, not an exact queueing result.
pub fn approach_delay(intersection: &Intersection, approach: Approach, vc_ratio: f64) -> f64 {
    if !intersection.is_signalised() {
        return 0.0;
    }
    let green_ratio = intersection.green_ratio(approach);
    let saturation = vc_ratio.clamp(0.0, MAX_SATURATION_RATIO);
    intersection.cycle_s * (1.0 - green_ratio).powi(2) / (2.0 * (1.0 - saturation))
}

/// Flow-weighted mean delay over inbound approaches.
/// `inbound` holds `(approach, v/c, flow)` for each inbound segment.
/// Falls back to the plain mean when no flow arrives.
pub fn intersection_delay(intersection: &Intersection, inbound: &[(Approach, f64, f64)]) -> f64 {
    if !intersection.is_signalised() || inbound.is_empty() {
        return 0.0;
    }
    let total_flow: f64 = inbound.iter().map(|(_, _, flow)| flow).sum();
    if total_flow > 0.0 {
        inbound
            .iter()
            .map(|&(approach, vc, flow)| approach_delay(intersection, approach, vc) * flow)
            .sum::<f64>()
            / total_flow
    } else {
        inbound
            .iter()
            .map(|&(approach, vc, _)| approach_delay(intersection, approach, vc))
            .sum::<f64>()
            / inbound.len() as f64
    }
}

/// Applies a retiming to a signalised junction. Returns `None` for
/// unsignalised junctions, which keep no plan to adjust.
///
/// The cycle never drops below 30 s and each green stays within 15..=90 s.
/// If the greens no longer fit, the cycle grows to hold them.
pub fn retime(intersection: &Intersection, cycle_delta_s: f64, green_delta_s: f64) -> Option<SignalPlan> {
    if !intersection.is_signalised() {
        return None;
    }
    let green_ns_s = (intersection.green_ns_s + green_delta_s).clamp(MIN_GREEN_SECONDS, MAX_GREEN_SECONDS);
    let green_ew_s = (intersection.green_ew_s + green_delta_s).clamp(MIN_GREEN_SECONDS, MAX_GREEN_SECONDS);
    let cycle_s = (intersection.cycle_s + cycle_delta_s)
        .max(MIN_CYCLE_SECONDS)
        .max(green_ns_s + green_ew_s);
    Some(SignalPlan {
        cycle_s,
        green_ns_s,
        green_ew_s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn junction() -> Intersection {
        Intersection::new("J", 28.6, 77.2, 90.0, 45.0, 30.0)
    }

    #[test]
    fn delay_grows_with_saturation_and_is_capped() {
        let j = junction();
        let light = approach_delay(&j, Approach::NorthSouth, 0.2);
        let heavy = approach_delay(&j, Approach::NorthSouth, 0.9);
        assert!(heavy > light);
        // Beyond the cap the delay no longer grows.
        let capped = approach_delay(&j, Approach::NorthSouth, 0.95);
        assert_eq!(approach_delay(&j, Approach::NorthSouth, 3.0), capped);
        assert!(capped.is_finite());
        // 90 * 0.25 / (2 * 0.05)
        assert!((capped - 225.0).abs() < 1e-9);
    }

    #[test]
    fn unsignalised_has_no_delay() {
        let j = Intersection::new("J", 28.6, 77.2, 0.0, 0.0, 0.0);
        assert_eq!(approach_delay(&j, Approach::EastWest, 0.8), 0.0);
        assert_eq!(intersection_delay(&j, &[(Approach::EastWest, 0.8, 100.0)]), 0.0);
        assert_eq!(retime(&j, -20.0, 0.0), None);
    }

    #[test]
    fn intersection_delay_is_flow_weighted() {
        let j = junction();
        let ns = approach_delay(&j, Approach::NorthSouth, 0.5);
        let ew = approach_delay(&j, Approach::EastWest, 0.5);
        let mixed = intersection_delay(&j, &[(Approach::NorthSouth, 0.5, 300.0), (Approach::EastWest, 0.5, 100.0)]);
        assert!((mixed - (0.75 * ns + 0.25 * ew)).abs() < 1e-9);
        let idle = intersection_delay(&j, &[(Approach::NorthSouth, 0.0, 0.0), (Approach::EastWest, 0.0, 0.0)]);
        let expected = (approach_delay(&j, Approach::NorthSouth, 0.0) + approach_delay(&j, Approach::EastWest, 0.0)) / 2.0;
        assert!((idle - expected).abs() < 1e-9);
    }

    #[test]
    fn retime_respects_clamps() {
        let plan = retime(&junction(), -20.0, 0.0).unwrap();
        assert_eq!(plan.cycle_s, 75.0);
        let plan = retime(&junction(), -80.0, -20.0).unwrap();
        assert_eq!(plan.green_ns_s, 25.0);
        assert_eq!(plan.green_ew_s, 15.0);
        assert_eq!(plan.cycle_s, 40.0);
        let plan = retime(&junction(), 0.0, 60.0).unwrap();
        assert_eq!(plan.green_ns_s, 90.0);
        assert_eq!(plan.cycle_s, 180.0);
    }
}
