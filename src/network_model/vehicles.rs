use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// Vehicle classes tracked by the demand matrix and the emissions model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    Car,
    Truck,
    Bus,
    Auto,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 4] = [
        VehicleClass::Car,
        VehicleClass::Truck,
        VehicleClass::Bus,
        VehicleClass::Auto,
    ];

    fn slot(self) -> usize {
        match self {
            VehicleClass::Car => 0,
            VehicleClass::Truck => 1,
            VehicleClass::Bus => 2,
            VehicleClass::Auto => 3,
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VehicleClass::Car => write!(f, "car"),
            VehicleClass::Truck => write!(f, "truck"),
            VehicleClass::Bus => write!(f, "bus"),
            VehicleClass::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for VehicleClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car" => Ok(VehicleClass::Car),
            "truck" => Ok(VehicleClass::Truck),
            "bus" => Ok(VehicleClass::Bus),
            "auto" | "autorickshaw" => Ok(VehicleClass::Auto),
            other => Err(format!("unknown vehicle class '{}'", other)),
        }
    }
}

/// One value per vehicle class. Used for flows, splits and per-segment factors.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassValues(pub [f64; 4]);

impl ClassValues {
    pub fn splat(value: f64) -> Self {
        ClassValues([value; 4])
    }

    pub fn only(class: VehicleClass, value: f64) -> Self {
        let mut values = ClassValues::default();
        values[class] = value;
        values
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn scaled(&self, factor: f64) -> Self {
        let mut out = *self;
        for v in out.0.iter_mut() {
            *v *= factor;
        }
        out
    }

    /// Element-wise product, e.g. class flow times per-class segment factor.
    pub fn times(&self, other: &ClassValues) -> Self {
        let mut out = *self;
        for (v, o) in out.0.iter_mut().zip(other.0.iter()) {
            *v *= o;
        }
        out
    }

    pub fn add_assign(&mut self, other: &ClassValues) {
        for (v, o) in self.0.iter_mut().zip(other.0.iter()) {
            *v += o;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (VehicleClass, f64)> + '_ {
        VehicleClass::ALL.iter().map(move |&c| (c, self[c]))
    }
}

impl Index<VehicleClass> for ClassValues {
    type Output = f64;

    fn index(&self, class: VehicleClass) -> &f64 {
        &self.0[class.slot()]
    }
}

impl IndexMut<VehicleClass> for ClassValues {
    fn index_mut(&mut self, class: VehicleClass) -> &mut f64 {
        &mut self.0[class.slot()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_class_names_case_insensitively() {
        assert_eq!("Truck".parse::<VehicleClass>(), Ok(VehicleClass::Truck));
        assert_eq!(" auto ".parse::<VehicleClass>(), Ok(VehicleClass::Auto));
        assert!("tram".parse::<VehicleClass>().is_err());
    }

    #[test]
    fn class_values_combine_per_class() {
        let flows = ClassValues([100.0, 50.0, 10.0, 40.0]);
        let mut factors = ClassValues::splat(1.0);
        factors[VehicleClass::Truck] = 0.1;
        let scaled = flows.times(&factors);
        assert_eq!(scaled[VehicleClass::Truck], 5.0);
        assert_eq!(scaled.total(), 155.0);
    }
}
