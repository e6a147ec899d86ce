//! Comfort envelope: balance temperature and comfort range.
//!
//! Each bound is a fixed-point search on temperature, stepping by the PMV
//! error at the current estimate. PMV rises with temperature with a slope
//! near one per kelvin around comfort, so the plain correction converges.

use serde::{Deserialize, Serialize};
use tc_solver::{FixedPointConfig, SolverError, iterate_fixed_point};
use tracing::debug;

use crate::constants::DEFAULT_AIR_SPEED;
use crate::elevated::{ElevatedAirspeedConfig, evaluate_comfort_with};
use crate::error::{ModelError, ModelResult};
use crate::input::ComfortInput;

/// Share of occupants the comfort range should satisfy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Acceptability {
    /// 80 % acceptable, PMV within ±1
    #[default]
    Eighty,
    /// 90 % acceptable, PMV within ±0.5
    Ninety,
}

impl Acceptability {
    pub fn pmv_limit(self) -> f64 {
        match self {
            Acceptability::Eighty => 1.0,
            Acceptability::Ninety => 0.5,
        }
    }
}

/// Everything but temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeConditions {
    pub air_speed: f64,
    pub relative_humidity: f64,
    pub metabolic_rate: f64,
    pub clothing_level: f64,
    pub external_work: f64,
}

impl EnvelopeConditions {
    pub fn new(relative_humidity: f64, metabolic_rate: f64, clothing_level: f64) -> Self {
        Self {
            air_speed: DEFAULT_AIR_SPEED,
            relative_humidity,
            metabolic_rate,
            clothing_level,
            external_work: 0.0,
        }
    }

    pub fn with_air_speed(mut self, air_speed: f64) -> Self {
        self.air_speed = air_speed;
        self
    }

    pub fn with_external_work(mut self, external_work: f64) -> Self {
        self.external_work = external_work;
        self
    }

    /// Conditions at the given air and radiant temperatures.
    pub fn at(&self, air_temp: f64, radiant_temp: f64) -> ComfortInput {
        ComfortInput::new(
            air_temp,
            self.relative_humidity,
            self.metabolic_rate,
            self.clothing_level,
        )
        .with_radiant_temp(radiant_temp)
        .with_air_speed(self.air_speed)
        .with_external_work(self.external_work)
    }
}

impl From<&ComfortInput> for EnvelopeConditions {
    fn from(input: &ComfortInput) -> Self {
        Self {
            air_speed: input.air_speed,
            relative_humidity: input.relative_humidity,
            metabolic_rate: input.metabolic_rate,
            clothing_level: input.clothing_level,
            external_work: input.external_work,
        }
    }
}

/// Envelope search configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeConfig {
    pub balance_guess: f64,
    pub upper_guess: f64,
    pub lower_guess: f64,
    /// Stop once the temperature correction is no larger than this (°C)
    pub tolerance: f64,
    pub max_iterations: usize,
    pub acceptability: Acceptability,
    pub comfort: ElevatedAirspeedConfig,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            balance_guess: 21.0,
            upper_guess: 24.0,
            lower_guess: 18.0,
            tolerance: 0.01,
            max_iterations: 100,
            acceptability: Acceptability::Eighty,
            comfort: ElevatedAirspeedConfig::default(),
        }
    }
}

/// Upper and lower comfort temperatures (°C).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComfortRange {
    pub upper: f64,
    pub lower: f64,
}

/// Balance temperature and comfort range (°C).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeResult {
    pub balance_temp: f64,
    pub upper_comfort_temp: f64,
    pub lower_comfort_temp: f64,
}

pub fn solve_envelope(conditions: &EnvelopeConditions) -> ModelResult<EnvelopeResult> {
    solve_envelope_with(conditions, &EnvelopeConfig::default())
}

/// Run the three searches, concurrently.
pub fn solve_envelope_with(
    conditions: &EnvelopeConditions,
    config: &EnvelopeConfig,
) -> ModelResult<EnvelopeResult> {
    let (balance, range) = rayon::join(
        || balance_temperature(config.balance_guess, conditions, config),
        || comfort_range(None, conditions, config),
    );
    let range = range?;
    let result = EnvelopeResult {
        balance_temp: balance?,
        upper_comfort_temp: range.upper,
        lower_comfort_temp: range.lower,
    };
    debug!(?result, "comfort envelope solved");
    Ok(result)
}

/// Temperature (air = radiant) at which PMV is zero, searched from `initial_guess`.
pub fn balance_temperature(
    initial_guess: f64,
    conditions: &EnvelopeConditions,
    config: &EnvelopeConfig,
) -> ModelResult<f64> {
    search(initial_guess, 0.0, None, "balance temperature", conditions, config)
}

/// Air temperatures at which PMV reaches the acceptability limits.
///
/// With `radiant_temp` set, radiant temperature is held there while air
/// temperature moves; otherwise both move together.
pub fn comfort_range(
    radiant_temp: Option<f64>,
    conditions: &EnvelopeConditions,
    config: &EnvelopeConfig,
) -> ModelResult<ComfortRange> {
    let limit = config.acceptability.pmv_limit();
    let (upper, lower) = rayon::join(
        || search(config.upper_guess, limit, radiant_temp, "upper comfort temperature", conditions, config),
        || search(config.lower_guess, -limit, radiant_temp, "lower comfort temperature", conditions, config),
    );
    Ok(ComfortRange {
        upper: upper?,
        lower: lower?,
    })
}

/// Iterate `t <- t + (target - pmv(t))`.
fn search(
    start: f64,
    target: f64,
    radiant_temp: Option<f64>,
    what: &'static str,
    conditions: &EnvelopeConditions,
    config: &EnvelopeConfig,
) -> ModelResult<f64> {
    let fixed_point = FixedPointConfig {
        tolerance: config.tolerance,
        max_iterations: config.max_iterations,
    };
    let result = iterate_fixed_point(
        start,
        |t| -> ModelResult<f64> {
            let input = conditions.at(t, radiant_temp.unwrap_or(t));
            Ok(target - evaluate_comfort_with(&input, &config.comfort)?.pmv)
        },
        &fixed_point,
    )
    .map_err(|e| match e {
        ModelError::Solver(SolverError::ConvergenceFailed { iterations, .. }) => {
            ModelError::NonConvergence { what, iterations }
        }
        other => other,
    })?;

    debug!(what, temperature = result.value, iterations = result.iterations, "envelope search converged");
    Ok(result.value)
}
