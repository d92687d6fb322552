pub mod air_quality;
pub mod aqi;
pub mod dispersion;
pub mod factors;
pub mod health;

pub use air_quality::{attach_emissions, zone_air_quality};
pub use aqi::{pm25_to_aqi, AqiCategory};
pub use factors::{segment_emissions, Pollutant, PollutantValues};
pub use health::{health_impact, HealthConfig, HealthImpact, HealthRisk};
