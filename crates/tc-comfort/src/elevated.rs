//! PMV corrected for elevated air speed.
//!
//! Above the still-air threshold the PMV model is evaluated at an adjusted
//! air temperature: the temperature at which still air gives the same SET
//! as the actual environment. The difference is the cooling effect of the
//! moving air.

use serde::{Deserialize, Serialize};
use tc_solver::{RootConfig, find_root};
use tracing::debug;

use crate::constants::STILL_AIR_SPEED;
use crate::error::ModelResult;
use crate::input::ComfortInput;
use crate::pmv::{PmvConfig, compute_pmv_with};
use crate::set::{SetConfig, compute_set_with};

/// Elevated air speed correction configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevatedAirspeedConfig {
    /// Air speeds at or below this are passed straight to PMV (m/s)
    pub still_air_threshold: f64,
    /// Search interval for the adjusted air temperature (°C)
    pub bracket: (f64, f64),
    pub root: RootConfig,
    pub pmv: PmvConfig,
    pub set: SetConfig,
}

impl Default for ElevatedAirspeedConfig {
    fn default() -> Self {
        Self {
            still_air_threshold: STILL_AIR_SPEED,
            bracket: (-200.0, 200.0),
            root: RootConfig::default(),
            pmv: PmvConfig::default(),
            set: SetConfig::default(),
        }
    }
}

/// Comfort metrics for one set of conditions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComfortResult {
    pub pmv: f64,
    /// Percent
    pub ppd: f64,
    /// Standard Effective Temperature (°C)
    pub set: f64,
    /// Air temperature the PMV was evaluated at (°C)
    pub adjusted_air_temp: f64,
    /// `|air_temp - adjusted_air_temp|` (°C)
    pub cooling_effect: f64,
}

impl ComfortResult {
    /// `-limit < pmv < limit`.
    pub fn within_pmv(&self, limit: f64) -> bool {
        self.pmv > -limit && self.pmv < limit
    }
}

pub fn evaluate_comfort(input: &ComfortInput) -> ModelResult<ComfortResult> {
    evaluate_comfort_with(input, &ElevatedAirspeedConfig::default())
}

pub fn evaluate_comfort_with(
    input: &ComfortInput,
    config: &ElevatedAirspeedConfig,
) -> ModelResult<ComfortResult> {
    let set = compute_set_with(input, &config.set)?;

    if input.air_speed <= config.still_air_threshold {
        let pmv = compute_pmv_with(input, &config.pmv)?;
        return Ok(ComfortResult {
            pmv: pmv.pmv,
            ppd: pmv.ppd,
            set,
            adjusted_air_temp: input.air_temp,
            cooling_effect: 0.0,
        });
    }

    let still = input.with_air_speed(config.still_air_threshold);
    let (low, high) = config.bracket;
    let root = find_root(
        |t| -> ModelResult<f64> {
            Ok(set - compute_set_with(&still.with_air_temp(t), &config.set)?)
        },
        low,
        high,
        &config.root,
    )?;
    let adjusted_air_temp = root.root;

    let pmv = compute_pmv_with(&still.with_air_temp(adjusted_air_temp), &config.pmv)?;
    let cooling_effect = (input.air_temp - adjusted_air_temp).abs();
    debug!(
        air_speed = input.air_speed,
        adjusted_air_temp,
        cooling_effect,
        method = ?root.method,
        "elevated air speed correction"
    );

    Ok(ComfortResult {
        pmv: pmv.pmv,
        ppd: pmv.ppd,
        set,
        adjusted_air_temp,
        cooling_effect,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn still_air_is_a_passthrough() {
        let input = ComfortInput::new(26.0, 50.0, 1.0, 0.6).with_air_speed(0.15);
        let result = evaluate_comfort(&input).unwrap();
        assert_eq!(result.adjusted_air_temp, 26.0);
        assert_eq!(result.cooling_effect, 0.0);
        let pmv = crate::pmv::compute_pmv(&input).unwrap();
        assert_eq!(result.pmv, pmv.pmv);
        assert_eq!(result.ppd, pmv.ppd);
    }

    #[test]
    fn just_above_threshold_cools_slightly() {
        let input = ComfortInput::new(26.0, 50.0, 1.0, 0.6).with_air_speed(0.16);
        let result = evaluate_comfort(&input).unwrap();
        assert!((result.adjusted_air_temp - 25.772).abs() < 0.01);
        assert!((result.cooling_effect - 0.228).abs() < 0.01);
        assert!((result.pmv + 0.018).abs() < 0.01);
    }

    #[test]
    fn fan_cooling_effect() {
        let input = ComfortInput::new(29.0, 50.0, 1.0, 0.5).with_air_speed(1.0);
        let result = evaluate_comfort(&input).unwrap();
        assert!((result.set - 25.131).abs() < 0.01);
        assert!((result.adjusted_air_temp - 22.506).abs() < 0.01);
        assert!((result.cooling_effect - 6.494).abs() < 0.01);
        assert!((result.pmv + 0.440).abs() < 0.01);
    }

    #[test]
    fn adjusted_temperature_reproduces_set() {
        let input = ComfortInput::new(27.0, 50.0, 1.2, 0.5).with_air_speed(0.8);
        let result = evaluate_comfort(&input).unwrap();
        let still = input
            .with_air_speed(STILL_AIR_SPEED)
            .with_air_temp(result.adjusted_air_temp);
        let set_still = crate::set::compute_set(&still).unwrap();
        assert!((set_still - result.set).abs() < 1e-3);
    }

    #[test]
    fn diverging_secant_iterate_recovers_by_bisection() {
        // Secant jumps to about -1028 °C where the body simulation fails
        let input = ComfortInput::new(50.0, 0.0, 2.0, 0.5).with_air_speed(0.2);
        let result = evaluate_comfort(&input).unwrap();
        assert!((result.set - 37.320).abs() < 0.01);
        assert!((result.adjusted_air_temp - 44.254).abs() < 0.01);
        assert!((result.cooling_effect - 5.746).abs() < 0.01);
    }

    #[test]
    fn within_pmv_is_strict() {
        let result = ComfortResult {
            pmv: 1.0,
            ppd: 26.1,
            set: 28.0,
            adjusted_air_temp: 28.0,
            cooling_effect: 0.0,
        };
        assert!(!result.within_pmv(1.0));
        assert!(result.within_pmv(1.5));
    }
}
