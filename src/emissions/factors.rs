use crate::network_model::vehicles::{ClassValues, VehicleClass};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pollutant {
    Pm25,
    Nox,
    Co,
}

impl Pollutant {
    pub const ALL: [Pollutant; 3] = [Pollutant::Pm25, Pollutant::Nox, Pollutant::Co];
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Pollutant::Pm25 => write!(f, "PM2.5"),
            Pollutant::Nox => write!(f, "NOx"),
            Pollutant::Co => write!(f, "CO"),
        }
    }
}

/// One value per pollutant, e.g. grams per hour.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PollutantValues {
    pub pm25: f64,
    pub nox: f64,
    pub co: f64,
}

impl PollutantValues {
    pub fn get(&self, pollutant: Pollutant) -> f64 {
        match pollutant {
            Pollutant::Pm25 => self.pm25,
            Pollutant::Nox => self.nox,
            Pollutant::Co => self.co,
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            pm25: self.pm25 * factor,
            nox: self.nox * factor,
            co: self.co * factor,
        }
    }

    pub fn add(&mut self, other: &PollutantValues) {
        self.pm25 += other.pm25;
        self.nox += other.nox;
        self.co += other.co;
    }
}

/// Emission factor in g/km for one vehicle of `class`.
pub fn emission_factor(class: VehicleClass) -> PollutantValues {
    let (pm25, nox, co) = match class {
        VehicleClass::Car => (0.5, 0.8, 2.5),
        VehicleClass::Truck => (2.5, 5.0, 8.0),
        VehicleClass::Bus => (1.2, 6.0, 4.0),
        VehicleClass::Auto => (0.3, 0.4, 3.0),
    };
    PollutantValues { pm25, nox, co }
}

/// Grams per hour emitted on a segment: sum over classes of flow x length x factor.
pub fn segment_emissions(length_km: f64, class_flows: &ClassValues) -> PollutantValues {
    let mut total = PollutantValues::default();
    for (class, flow) in class_flows.iter() {
        total.add(&emission_factor(class).scaled(flow * length_km));
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trucks_dominate_per_vehicle() {
        let car = emission_factor(VehicleClass::Car);
        let truck = emission_factor(VehicleClass::Truck);
        for pollutant in Pollutant::ALL {
            assert!(truck.get(pollutant) > car.get(pollutant), "{}", pollutant);
        }
    }

    #[test]
    fn emissions_scale_with_flow_and_length() {
        let flows = ClassValues([100.0, 10.0, 0.0, 0.0]);
        let grams = segment_emissions(2.0, &flows);
        // 100 * 2 * 0.5 + 10 * 2 * 2.5
        assert!((grams.pm25 - 150.0).abs() < 1e-9);
        assert!((grams.nox - (160.0 + 100.0)).abs() < 1e-9);
        assert_eq!(segment_emissions(0.0, &flows), PollutantValues::default());
    }
}
