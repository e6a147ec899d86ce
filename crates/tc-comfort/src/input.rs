//! Comfort model inputs and their validation.
//!
//! The models assume a validated `ComfortInput`; everything that can be
//! rejected is rejected here, before any solver runs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tc_core::{
    Ratio, Temperature, TcError, Velocity, ensure_finite, ensure_in_range, to_degc, to_mps,
    to_percent,
};

use crate::constants::DEFAULT_AIR_SPEED;
use crate::error::{ModelError, ModelResult};

/// The six comfort variables plus external work.
///
/// Temperatures in °C, air speed in m/s, relative humidity in %, metabolic
/// rate and external work in met, clothing in clo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComfortInput {
    pub air_temp: f64,
    pub radiant_temp: f64,
    pub air_speed: f64,
    pub relative_humidity: f64,
    pub metabolic_rate: f64,
    pub clothing_level: f64,
    pub external_work: f64,
}

impl ComfortInput {
    /// Input with the defaults for everything not given: radiant temperature
    /// equal to air temperature, 0.05 m/s air speed, no external work.
    pub fn new(air_temp: f64, relative_humidity: f64, metabolic_rate: f64, clothing_level: f64) -> Self {
        Self {
            air_temp,
            radiant_temp: air_temp,
            air_speed: DEFAULT_AIR_SPEED,
            relative_humidity,
            metabolic_rate,
            clothing_level,
            external_work: 0.0,
        }
    }

    /// Same as `new`, taking uom quantities for temperature, air speed and humidity.
    pub fn from_quantities(
        air_temp: Temperature,
        radiant_temp: Temperature,
        air_speed: Velocity,
        relative_humidity: Ratio,
        metabolic_rate: f64,
        clothing_level: f64,
    ) -> Self {
        Self::new(to_degc(air_temp), to_percent(relative_humidity), metabolic_rate, clothing_level)
            .with_radiant_temp(to_degc(radiant_temp))
            .with_air_speed(to_mps(air_speed))
    }

    /// Replace the air temperature, leaving radiant temperature as it is.
    pub fn with_air_temp(mut self, air_temp: f64) -> Self {
        self.air_temp = air_temp;
        self
    }

    pub fn with_radiant_temp(mut self, radiant_temp: f64) -> Self {
        self.radiant_temp = radiant_temp;
        self
    }

    pub fn with_air_speed(mut self, air_speed: f64) -> Self {
        self.air_speed = air_speed;
        self
    }

    pub fn with_external_work(mut self, external_work: f64) -> Self {
        self.external_work = external_work;
        self
    }

    /// Check every field against the domain the models are defined on.
    pub fn validate(&self) -> Result<(), TcError> {
        ensure_finite(self.air_temp, "air temperature")?;
        ensure_finite(self.radiant_temp, "radiant temperature")?;
        ensure_in_range(self.air_speed, 0.0, f64::MAX, "air speed")?;
        ensure_in_range(self.relative_humidity, 0.0, 100.0, "relative humidity")?;
        ensure_in_range(self.metabolic_rate, 0.5, 10.0, "metabolic rate")?;
        ensure_in_range(self.clothing_level, 0.0, 5.0, "clothing level")?;
        ensure_in_range(self.external_work, 0.0, self.metabolic_rate, "external work")?;
        Ok(())
    }

    /// Consume and return `self` if valid.
    pub fn validated(self) -> ModelResult<Self> {
        self.validate().map_err(ModelError::InvalidInput)?;
        Ok(self)
    }
}

/// Named activities with tabulated metabolic rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activity {
    Sleeping,
    Reclining,
    Sitting,
    Typing,
    Standing,
    Driving,
    Cooking,
    HouseCleaning,
    Walking,
    Walking2Mph,
    Walking3Mph,
    Walking4Mph,
    Running9Mph,
    Lifting10Lbs,
    Lifting100Lbs,
    Shoveling,
    Dancing,
    Basketball,
}

impl Activity {
    pub const ALL: [Activity; 18] = [
        Activity::Sleeping,
        Activity::Reclining,
        Activity::Sitting,
        Activity::Typing,
        Activity::Standing,
        Activity::Driving,
        Activity::Cooking,
        Activity::HouseCleaning,
        Activity::Walking,
        Activity::Walking2Mph,
        Activity::Walking3Mph,
        Activity::Walking4Mph,
        Activity::Running9Mph,
        Activity::Lifting10Lbs,
        Activity::Lifting100Lbs,
        Activity::Shoveling,
        Activity::Dancing,
        Activity::Basketball,
    ];

    /// Metabolic rate in met.
    pub fn metabolic_rate(self) -> f64 {
        match self {
            Activity::Sleeping => 0.7,
            Activity::Reclining => 0.8,
            Activity::Sitting => 1.0,
            Activity::Typing => 1.1,
            Activity::Standing => 1.2,
            Activity::Driving => 1.5,
            Activity::Cooking => 1.8,
            Activity::HouseCleaning => 2.7,
            Activity::Walking => 1.7,
            Activity::Walking2Mph => 2.0,
            Activity::Walking3Mph => 2.6,
            Activity::Walking4Mph => 3.8,
            Activity::Running9Mph => 9.5,
            Activity::Lifting10Lbs => 2.1,
            Activity::Lifting100Lbs => 4.0,
            Activity::Shoveling => 4.4,
            Activity::Dancing => 3.4,
            Activity::Basketball => 6.3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Activity::Sleeping => "Sleeping",
            Activity::Reclining => "Reclining",
            Activity::Sitting => "Sitting",
            Activity::Typing => "Typing",
            Activity::Standing => "Standing",
            Activity::Driving => "Driving",
            Activity::Cooking => "Cooking",
            Activity::HouseCleaning => "House Cleaning",
            Activity::Walking => "Walking",
            Activity::Walking2Mph => "Walking 2mph",
            Activity::Walking3Mph => "Walking 3mph",
            Activity::Walking4Mph => "Walking 4mph",
            Activity::Running9Mph => "Running 9mph",
            Activity::Lifting10Lbs => "Lifting 10lbs",
            Activity::Lifting100Lbs => "Lifting 100lbs",
            Activity::Shoveling => "Shoveling",
            Activity::Dancing => "Dancing",
            Activity::Basketball => "Basketball",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activity {
    type Err = ModelError;

    /// Case-insensitive match on the activity name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Activity::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ModelError::UnknownActivity {
                name: wanted.to_string(),
            })
    }
}

/// Metabolic rate from either a number of met or an activity name.
pub fn parse_metabolic_rate(s: &str) -> ModelResult<f64> {
    match s.trim().parse::<f64>() {
        Ok(met) => {
            ensure_in_range(met, 0.5, 10.0, "metabolic rate").map_err(ModelError::InvalidInput)
        }
        Err(_) => s.parse::<Activity>().map(Activity::metabolic_rate),
    }
}
