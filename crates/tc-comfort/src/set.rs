//! Pierce two-node model and Standard Effective Temperature.
//!
//! The body is a core and a skin compartment exchanging heat through skin
//! blood flow. Starting from the neutral set points, the model integrates
//! one-minute steps under the actual environment, then finds the
//! temperature of the standard environment (50 % rh, still air, 0.6 clo
//! equivalent at the same activity) that produces the same skin heat loss.
//!
//! Vapour pressures in this module are in torr, heat flows in W/m².

use serde::{Deserialize, Serialize};
use tc_core::{TcError, split_signal};
use tc_solver::{FixedPointConfig, SolverError, iterate_fixed_point};
use tracing::{debug, warn};

use crate::constants::{
    ALFA_NEUTRAL, ATMOSPHERIC_PRESSURE_KPA, BODY_SURFACE_AREA_M2, BODY_TEMP_NEUTRAL,
    BODY_WEIGHT_KG, CDIL, CLO_TO_M2K_PER_W, CORE_TEMP_NEUTRAL, CSTR, CSW, REGULATORY_SWEAT_MAX,
    SET_MET_FACTOR, SKIN_BLOOD_FLOW_MAX, SKIN_BLOOD_FLOW_MIN, SKIN_BLOOD_FLOW_NEUTRAL,
    SKIN_TEMP_NEUTRAL, STEFAN_BOLTZMANN,
};
use crate::error::{ModelError, ModelResult};
use crate::input::ComfortInput;

/// Clothing area increase per clo in the standard environment.
const KCLO: f64 = 0.25;

/// Two-node simulation and SET search configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetConfig {
    /// Length of the exposure in one-minute steps
    pub minutes: usize,
    /// Convergence threshold on clothing surface temperature (°C)
    pub clothing_tolerance: f64,
    pub max_clothing_iterations: usize,
    /// Finite-difference step of the Newton search (°C)
    pub newton_delta: f64,
    /// Stop once the Newton correction is no larger than this (°C)
    pub newton_tolerance: f64,
    pub max_newton_iterations: usize,
}

impl Default for SetConfig {
    fn default() -> Self {
        Self {
            minutes: 60,
            clothing_tolerance: 0.01,
            max_clothing_iterations: 100,
            newton_delta: 1e-4,
            newton_tolerance: 0.01,
            max_newton_iterations: 100,
        }
    }
}

/// Saturated vapour pressure (torr) at `temp` (°C).
#[inline]
fn saturated_vapor_pressure_torr(temp: f64) -> f64 {
    (18.6686 - 4030.183 / (temp + 235.0)).exp()
}

/// Environment and clothing terms that stay fixed for a whole simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PierceConditions {
    pub air_temp: f64,
    pub radiant_temp: f64,
    /// Ambient vapour pressure (torr)
    pub vapor_pressure: f64,
    /// Air speed floored at 0.1 m/s
    pub air_speed: f64,
    /// Metabolic rate (met)
    pub metabolic_rate: f64,
    /// Resting metabolic heat (W/m²)
    pub resting_metabolism: f64,
    /// External work (W/m²)
    pub external_work: f64,
    /// Clothing thermal resistance (m²K/W)
    pub clothing_resistance: f64,
    pub clothing_area_factor: f64,
    /// Lewis relation at the working pressure
    pub lewis_ratio: f64,
    /// Critical skin wettedness
    pub critical_wettedness: f64,
    /// Clothing vapour permeation efficiency
    pub clothing_permeation: f64,
    /// Convective heat transfer coefficient (W/m²K)
    pub convective_coefficient: f64,
}

impl PierceConditions {
    pub fn new(input: &ComfortInput) -> Self {
        let pressure_atm = ATMOSPHERIC_PRESSURE_KPA * 0.009869;
        let air_speed = input.air_speed.max(0.1);
        let clo = input.clothing_level;

        let (critical_wettedness, clothing_permeation) = if clo <= 0.0 {
            (0.38 * air_speed.powf(-0.29), 1.0)
        } else {
            (0.59 * air_speed.powf(-0.08), 0.45)
        };

        let natural = 3.0 * pressure_atm.powf(0.53);
        let forced = 8.600001 * (air_speed * pressure_atm).powf(0.53);

        Self {
            air_temp: input.air_temp,
            radiant_temp: input.radiant_temp,
            vapor_pressure: input.relative_humidity
                * saturated_vapor_pressure_torr(input.air_temp)
                / 100.0,
            air_speed,
            metabolic_rate: input.metabolic_rate,
            resting_metabolism: input.metabolic_rate * SET_MET_FACTOR,
            external_work: input.external_work * SET_MET_FACTOR,
            clothing_resistance: CLO_TO_M2K_PER_W * clo,
            clothing_area_factor: 1.0 + 0.15 * clo,
            lewis_ratio: 2.2 / pressure_atm,
            critical_wettedness,
            clothing_permeation,
            convective_coefficient: natural.max(forced),
        }
    }

    /// Evaporative resistance of the air layer plus clothing.
    fn evaporative_resistance(&self) -> f64 {
        let air = 1.0 / (self.lewis_ratio * self.clothing_area_factor * self.convective_coefficient);
        let clothing = self.clothing_resistance / (self.lewis_ratio * self.clothing_permeation);
        air + clothing
    }
}

/// Dry heat exchange terms at the converged clothing surface temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClothingExchange {
    pub clothing_temp: f64,
    /// Linearised radiative coefficient (W/m²K)
    pub radiative_coefficient: f64,
    /// Operative temperature (°C)
    pub operative_temp: f64,
    /// Resistance of the air layer to dry heat (m²K/W)
    pub air_resistance: f64,
    pub iterations: usize,
}

impl ClothingExchange {
    fn at(conditions: &PierceConditions, radiative_coefficient: f64) -> (f64, f64, f64) {
        let combined = radiative_coefficient + conditions.convective_coefficient;
        let air_resistance = 1.0 / (conditions.clothing_area_factor * combined);
        let operative_temp = (radiative_coefficient * conditions.radiant_temp
            + conditions.convective_coefficient * conditions.air_temp)
            / combined;
        (combined, air_resistance, operative_temp)
    }

    fn radiative_coefficient(conditions: &PierceConditions, clothing_temp: f64) -> f64 {
        let mean = 0.5 * (clothing_temp + conditions.radiant_temp) + 273.15;
        4.0 * STEFAN_BOLTZMANN * mean.powi(3) * 0.72
    }

    /// Solve `H (Tsk - To) = CTC (Tcl - To)` for the clothing surface
    /// temperature, the radiative coefficient following `Tcl`.
    pub fn solve(
        conditions: &PierceConditions,
        skin_temp: f64,
        config: &SetConfig,
    ) -> ModelResult<Self> {
        let rcl = conditions.clothing_resistance;

        let (combined, ra, top) = Self::at(conditions, 4.7);
        let initial = top + (skin_temp - top) / (combined * (ra + rcl));

        let next = |tcl: f64| {
            let chr = Self::radiative_coefficient(conditions, tcl);
            let (_, ra, top) = Self::at(conditions, chr);
            (ra * skin_temp + rcl * top) / (ra + rcl)
        };
        let fixed_point = FixedPointConfig {
            tolerance: config.clothing_tolerance,
            max_iterations: config.max_clothing_iterations,
        };
        let result = iterate_fixed_point(initial, |tcl| Ok::<_, SolverError>(next(tcl) - tcl), &fixed_point)
            .map_err(|e| match e {
                SolverError::ConvergenceFailed { iterations, .. } => ModelError::NonConvergence {
                    what: "SET clothing surface temperature",
                    iterations,
                },
                other => ModelError::Solver(other),
            })?;

        // Coefficients belong to the estimate the final correction was computed from.
        let radiative_coefficient =
            Self::radiative_coefficient(conditions, result.value - result.last_step);
        let (_, air_resistance, operative_temp) = Self::at(conditions, radiative_coefficient);

        Ok(Self {
            clothing_temp: result.value,
            radiative_coefficient,
            operative_temp,
            air_resistance,
            iterations: result.iterations,
        })
    }

    /// Combined dry resistance of air layer and clothing.
    fn dry_resistance(&self, conditions: &PierceConditions) -> f64 {
        self.air_resistance + conditions.clothing_resistance
    }
}

/// Physiological state of the two-node body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PierceState {
    pub skin_temp: f64,
    pub core_temp: f64,
    /// L/(m²h)
    pub skin_blood_flow: f64,
    /// Fraction of body mass in the skin compartment
    pub alfa: f64,
    /// Shivering metabolism (W/m²)
    pub shivering: f64,
    /// Total metabolic heat including shivering (W/m²)
    pub metabolic_heat: f64,
    pub skin_wettedness: f64,
    /// Evaporative heat loss from skin (W/m²)
    pub evaporative_loss: f64,
    /// Dry heat loss from skin (W/m²)
    pub dry_heat_loss: f64,
}

impl PierceState {
    /// The neutral body at the start of an exposure.
    pub fn neutral(conditions: &PierceConditions) -> Self {
        Self {
            skin_temp: SKIN_TEMP_NEUTRAL,
            core_temp: CORE_TEMP_NEUTRAL,
            skin_blood_flow: SKIN_BLOOD_FLOW_NEUTRAL,
            alfa: ALFA_NEUTRAL,
            shivering: 0.0,
            metabolic_heat: conditions.resting_metabolism,
            skin_wettedness: 0.06,
            evaporative_loss: 0.1 * conditions.metabolic_rate,
            dry_heat_loss: 0.0,
        }
    }

    /// Advance the body by one minute.
    pub fn step(&self, conditions: &PierceConditions, exchange: &ClothingExchange) -> Self {
        let m = self.metabolic_heat;

        // Heat balance over the minute with this minute's starting state
        let dry = (self.skin_temp - exchange.operative_temp) / exchange.dry_resistance(conditions);
        let core_to_skin =
            (self.core_temp - self.skin_temp) * (5.28 + 1.163 * self.skin_blood_flow);
        let latent_respiration = 0.0023 * m * (44.0 - conditions.vapor_pressure);
        let dry_respiration = 0.0014 * m * (34.0 - conditions.air_temp);
        let core_storage =
            m - core_to_skin - latent_respiration - dry_respiration - conditions.external_work;
        let skin_storage = core_to_skin - dry - self.evaporative_loss;

        let skin_capacity = 0.97 * self.alfa * BODY_WEIGHT_KG;
        let core_capacity = 0.97 * (1.0 - self.alfa) * BODY_WEIGHT_KG;
        let skin_temp = self.skin_temp + skin_storage * BODY_SURFACE_AREA_M2 / (skin_capacity * 60.0);
        let core_temp = self.core_temp + core_storage * BODY_SURFACE_AREA_M2 / (core_capacity * 60.0);
        let body_temp = self.alfa * skin_temp + (1.0 - self.alfa) * core_temp;

        // Thermoregulation
        let (warm_skin, cold_skin) = split_signal(skin_temp - SKIN_TEMP_NEUTRAL);
        let (warm_core, cold_core) = split_signal(core_temp - CORE_TEMP_NEUTRAL);
        let (warm_body, _) = split_signal(body_temp - BODY_TEMP_NEUTRAL);

        let skin_blood_flow = ((SKIN_BLOOD_FLOW_NEUTRAL + CDIL * warm_core) / (1.0 + CSTR * cold_skin))
            .clamp(SKIN_BLOOD_FLOW_MIN, SKIN_BLOOD_FLOW_MAX);
        let regulatory_sweat =
            (CSW * warm_body * (warm_skin / 10.7).exp()).min(REGULATORY_SWEAT_MAX);

        let max_evaporation = (saturated_vapor_pressure_torr(skin_temp) - conditions.vapor_pressure)
            / conditions.evaporative_resistance();
        let (skin_wettedness, evaporative_loss) = if max_evaporation > 0.0 {
            let wcrit = conditions.critical_wettedness;
            let mut sweat = 0.68 * regulatory_sweat;
            let mut sweat_fraction = sweat / max_evaporation;
            let mut wettedness = 0.06 + 0.94 * sweat_fraction;
            let mut diffusion = wettedness * max_evaporation - sweat;
            if wettedness > wcrit {
                wettedness = wcrit;
                sweat_fraction = wcrit / 0.94;
                sweat = sweat_fraction * max_evaporation;
                diffusion = 0.06 * (1.0 - sweat_fraction) * max_evaporation;
            }
            (wettedness, sweat + diffusion)
        } else {
            // Skin cannot evaporate: no sweat, no diffusion
            (conditions.critical_wettedness, 0.0)
        };

        let shivering = 19.4 * cold_skin * cold_core;

        Self {
            skin_temp,
            core_temp,
            skin_blood_flow,
            alfa: 0.0417737 + 0.7451833 / (skin_blood_flow + 0.585417),
            shivering,
            metabolic_heat: conditions.resting_metabolism + shivering,
            skin_wettedness,
            evaporative_loss,
            dry_heat_loss: dry,
        }
    }
}

/// Run the exposure: solve the clothing exchange once at the neutral skin
/// temperature, then step the body `config.minutes` times.
pub fn simulate(
    input: &ComfortInput,
    config: &SetConfig,
) -> ModelResult<(PierceConditions, ClothingExchange, PierceState)> {
    if config.minutes == 0 {
        return Err(ModelError::InvalidInput(TcError::InvalidArg {
            what: "SET exposure must last at least one minute",
        }));
    }

    let conditions = PierceConditions::new(input);
    let initial = PierceState::neutral(&conditions);
    let exchange = ClothingExchange::solve(&conditions, initial.skin_temp, config)?;

    let state = (0..config.minutes).fold(initial, |state, _| state.step(&conditions, &exchange));
    if !(state.skin_temp.is_finite() && state.core_temp.is_finite()) {
        warn!(air_temp = input.air_temp, "two-node simulation diverged");
        return Err(ModelError::NonConvergence {
            what: "two-node body simulation",
            iterations: config.minutes,
        });
    }
    Ok((conditions, exchange, state))
}

pub fn compute_set(input: &ComfortInput) -> ModelResult<f64> {
    compute_set_with(input, &SetConfig::default())
}

pub fn compute_set_with(input: &ComfortInput, config: &SetConfig) -> ModelResult<f64> {
    let (conditions, exchange, state) = simulate(input, config)?;

    let skin_heat_loss = state.dry_heat_loss + state.evaporative_loss;
    let wettedness = state.skin_wettedness;
    let skin_vapor_pressure = saturated_vapor_pressure_torr(state.skin_temp);

    // Standard environment at the same activity
    let met = conditions.metabolic_rate;
    let lr = conditions.lewis_ratio;
    let chcs = if met < 0.85 {
        3.0
    } else {
        (5.66 * (met - 0.85).powf(0.39)).max(3.0)
    };
    let ctcs = chcs + exchange.radiative_coefficient;
    let rclos = 1.52 / (met - conditions.external_work / SET_MET_FACTOR + 0.6944) - 0.1835;
    let rcls = CLO_TO_M2K_PER_W * rclos;
    let facls = 1.0 + KCLO * rclos;
    let fcls = 1.0 / (1.0 + 0.155 * facls * ctcs * rclos);
    let ims = 0.45;
    let icls = ims * chcs / ctcs * (1.0 - fcls) / (chcs / ctcs - fcls * ims);
    let ras = 1.0 / (facls * ctcs);
    let reas = 1.0 / (lr * facls * chcs);
    let recls = rcls / (lr * icls);
    let hd_s = 1.0 / (ras + rcls);
    let he_s = 1.0 / (reas + recls);

    let residual = |x: f64| {
        skin_heat_loss
            - hd_s * (state.skin_temp - x)
            - wettedness * he_s * (skin_vapor_pressure - 0.5 * saturated_vapor_pressure_torr(x))
    };

    let mut x = state.skin_temp - skin_heat_loss / hd_s;
    for iteration in 1..=config.max_newton_iterations {
        let err1 = residual(x);
        let err2 = residual(x + config.newton_delta);
        let next = x - config.newton_delta * err1 / (err2 - err1);
        if !next.is_finite() {
            break;
        }
        let dx = next - x;
        x = next;
        if dx.abs() <= config.newton_tolerance {
            debug!(set = x, iterations = iteration, "SET converged");
            return Ok(x);
        }
    }

    warn!(
        air_temp = input.air_temp,
        last_value = x,
        "SET Newton iteration did not converge"
    );
    Err(ModelError::NonConvergence {
        what: "SET Newton iteration",
        iterations: config.max_newton_iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still(ta: f64) -> ComfortInput {
        ComfortInput::new(ta, 50.0, 1.0, 0.6)
    }

    #[test]
    fn neutral_state_matches_set_points() {
        let conditions = PierceConditions::new(&still(24.0));
        let state = PierceState::neutral(&conditions);
        assert_eq!(state.skin_temp, 33.7);
        assert_eq!(state.core_temp, 36.49);
        assert_eq!(state.skin_blood_flow, 6.3);
        assert_eq!(state.alfa, 0.1);
        assert_eq!(state.shivering, 0.0);
    }

    #[test]
    fn air_speed_is_floored() {
        let conditions = PierceConditions::new(&still(24.0).with_air_speed(0.0));
        assert_eq!(conditions.air_speed, 0.1);
    }

    #[test]
    fn clothing_exchange_is_self_consistent() {
        let conditions = PierceConditions::new(&still(24.0));
        let exchange = ClothingExchange::solve(&conditions, 33.7, &SetConfig::default()).unwrap();
        assert!(exchange.iterations >= 1);
        // Clothing sits between skin and operative temperature
        assert!(exchange.clothing_temp < 33.7);
        assert!(exchange.clothing_temp > exchange.operative_temp);
        assert!(exchange.radiative_coefficient > 4.0 && exchange.radiative_coefficient < 5.5);
    }

    #[test]
    fn step_is_pure() {
        let conditions = PierceConditions::new(&still(30.0));
        let exchange = ClothingExchange::solve(&conditions, 33.7, &SetConfig::default()).unwrap();
        let start = PierceState::neutral(&conditions);
        let a = start.step(&conditions, &exchange);
        let b = start.step(&conditions, &exchange);
        assert_eq!(a, b);
        assert_eq!(start, PierceState::neutral(&conditions));
    }

    #[test]
    fn cold_exposure_cools_skin_and_shrinks_blood_flow() {
        let (_, _, state) = simulate(&still(10.0).with_radiant_temp(10.0), &SetConfig::default()).unwrap();
        assert!(state.skin_temp < 30.0);
        assert!(state.skin_blood_flow < 6.3);
        assert!(state.alfa > 0.1);
    }

    #[test]
    fn hot_exposure_triggers_sweating() {
        let input = ComfortInput::new(35.0, 60.0, 1.5, 0.5).with_air_speed(0.1);
        let (_, _, state) = simulate(&input, &SetConfig::default()).unwrap();
        assert!(state.skin_wettedness > 0.5);
        assert!(state.skin_blood_flow > 50.0);
        let set = compute_set(&input).unwrap();
        assert!((set - 37.73).abs() < 0.05);
    }

    #[test]
    fn set_reference_values() {
        let set = compute_set(&still(26.0).with_air_speed(0.16)).unwrap();
        assert!((set - 25.486).abs() < 0.01);

        let input = ComfortInput::new(29.0, 50.0, 1.0, 0.5).with_air_speed(1.0);
        assert!((compute_set(&input).unwrap() - 25.131).abs() < 0.01);
    }

    #[test]
    fn external_work_lowers_set() {
        let idle = ComfortInput::new(26.0, 50.0, 1.0, 0.5).with_air_speed(0.5);
        let working = idle.with_external_work(0.2);
        assert!(compute_set(&working).unwrap() < compute_set(&idle).unwrap());
    }

    #[test]
    fn zero_minutes_is_rejected() {
        let config = SetConfig {
            minutes: 0,
            ..SetConfig::default()
        };
        let err = compute_set_with(&still(24.0), &config).unwrap_err();
        assert!(matches!(err, ModelError::InvalidInput(_)));
    }

    #[test]
    fn newton_cap_reports_non_convergence() {
        let config = SetConfig {
            max_newton_iterations: 1,
            ..SetConfig::default()
        };
        let err = compute_set_with(&still(24.0), &config).unwrap_err();
        assert_eq!(
            err,
            ModelError::NonConvergence {
                what: "SET Newton iteration",
                iterations: 1
            }
        );
    }

    #[test]
    fn clothing_cap_reports_non_convergence() {
        let config = SetConfig {
            clothing_tolerance: 1e-15,
            max_clothing_iterations: 1,
            ..SetConfig::default()
        };
        let err = compute_set_with(&still(24.0), &config).unwrap_err();
        assert!(matches!(
            err,
            ModelError::NonConvergence {
                what: "SET clothing surface temperature",
                ..
            }
        ));
    }
}
