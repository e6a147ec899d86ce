//! Moist-air properties from dry-bulb temperature and relative humidity.
//!
//! Saturation pressure follows the IAPWS formulations: the liquid-water
//! curve at and above the triple point, the sublimation curve below it.

use serde::{Deserialize, Serialize};

const CRITICAL_TEMP_K: f64 = 647.096;
const CRITICAL_PRESSURE_PA: f64 = 22.064e6;
const TRIPLE_POINT_K: f64 = 273.16;
const TRIPLE_POINT_PA: f64 = 611.657;

/// Ratio of molar masses of water vapour and dry air.
const MOLAR_MASS_RATIO: f64 = 0.621991;

/// Moist-air state at one temperature and humidity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Psychrometrics {
    /// kg water per kg dry air
    pub humidity_ratio: f64,
    /// kJ/kg dry air, referenced to dry air and liquid water at 0 °C
    pub enthalpy: f64,
    /// Pa
    pub partial_pressure: f64,
    /// Pa
    pub saturation_pressure: f64,
}

/// Saturation vapour pressure (Pa) at `air_temp` (°C).
pub fn saturation_pressure(air_temp: f64) -> f64 {
    let t = air_temp + 273.15;
    if t >= TRIPLE_POINT_K {
        let s = 1.0 - t / CRITICAL_TEMP_K;
        let series = -7.85951783 * s + 1.84408259 * s.powf(1.5) - 11.7866487 * s.powi(3)
            + 22.6807411 * s.powf(3.5)
            - 15.9618719 * s.powi(4)
            + 1.80122502 * s.powf(7.5);
        CRITICAL_PRESSURE_PA * (CRITICAL_TEMP_K / t * series).exp()
    } else {
        let theta = t / TRIPLE_POINT_K;
        let exponent = -13.928169 * (1.0 - theta.powf(-1.5)) + 34.707823 * (1.0 - theta.powf(-1.25));
        TRIPLE_POINT_PA * exponent.exp()
    }
}

/// Humidity ratio (kg/kg) at `air_temp` (°C), `relative_humidity` (%) and
/// `pressure` (Pa).
pub fn humidity_ratio(air_temp: f64, relative_humidity: f64, pressure: f64) -> f64 {
    psychrometrics(air_temp, relative_humidity, pressure).humidity_ratio
}

pub fn psychrometrics(air_temp: f64, relative_humidity: f64, pressure: f64) -> Psychrometrics {
    let saturation_pressure = saturation_pressure(air_temp);
    let partial_pressure = 0.01 * relative_humidity * saturation_pressure;
    let humidity_ratio = MOLAR_MASS_RATIO * partial_pressure / (pressure - partial_pressure);
    let enthalpy = (1.01 + 1.89 * humidity_ratio) * air_temp + 2500.0 * humidity_ratio;
    Psychrometrics {
        humidity_ratio,
        enthalpy,
        partial_pressure,
        saturation_pressure,
    }
}
