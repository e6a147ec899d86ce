//! What makes a timestep comfortable.

use serde::{Deserialize, Serialize};
use tc_comfort::{ComfortInput, ComfortResult, humidity_ratio};
use tc_core::constants::STANDARD_PRESSURE_PA;
use tc_core::{TcError, ensure_in_range};

/// Widest humidity-ratio window; bounds at these values are not checked.
const HUMIDITY_RATIO_UPPER_MAX: f64 = 0.030;
const HUMIDITY_RATIO_LOWER_MIN: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ComfortCriteria {
    /// `-limit < pmv < limit`
    PmvBand { limit: f64 },
    /// `ppd < threshold`, and the humidity ratio strictly inside
    /// `(lower, upper)` whenever that window is narrower than the default.
    Ppd {
        threshold: f64,
        humidity_ratio_upper: f64,
        humidity_ratio_lower: f64,
    },
}

impl Default for ComfortCriteria {
    fn default() -> Self {
        ComfortCriteria::PmvBand { limit: 1.0 }
    }
}

impl ComfortCriteria {
    /// PPD criterion with the default threshold of 10 % and no humidity limits.
    pub fn ppd() -> Self {
        Self::ppd_below(10.0)
    }

    /// PPD criterion at `threshold` percent, no humidity limits.
    pub fn ppd_below(threshold: f64) -> Self {
        ComfortCriteria::Ppd {
            threshold,
            humidity_ratio_upper: HUMIDITY_RATIO_UPPER_MAX,
            humidity_ratio_lower: HUMIDITY_RATIO_LOWER_MIN,
        }
    }

    pub fn validate(&self) -> Result<(), TcError> {
        match *self {
            ComfortCriteria::PmvBand { limit } => {
                ensure_in_range(limit, 0.0, 3.0, "PMV comfort limit")?;
            }
            ComfortCriteria::Ppd {
                threshold,
                humidity_ratio_upper,
                humidity_ratio_lower,
            } => {
                ensure_in_range(threshold, 5.0, 100.0, "PPD comfort threshold")?;
                ensure_in_range(humidity_ratio_upper, 0.012, HUMIDITY_RATIO_UPPER_MAX, "upper humidity ratio")?;
                ensure_in_range(humidity_ratio_lower, HUMIDITY_RATIO_LOWER_MIN, 0.005, "lower humidity ratio")?;
            }
        }
        Ok(())
    }

    pub fn is_comfortable(&self, input: &ComfortInput, result: &ComfortResult) -> bool {
        match *self {
            ComfortCriteria::PmvBand { limit } => result.within_pmv(limit),
            ComfortCriteria::Ppd {
                threshold,
                humidity_ratio_upper,
                humidity_ratio_lower,
            } => {
                if result.ppd >= threshold {
                    return false;
                }
                if humidity_ratio_upper >= HUMIDITY_RATIO_UPPER_MAX
                    && humidity_ratio_lower <= HUMIDITY_RATIO_LOWER_MIN
                {
                    return true;
                }
                let hr = humidity_ratio(input.air_temp, input.relative_humidity, STANDARD_PRESSURE_PA);
                hr < humidity_ratio_upper && hr > humidity_ratio_lower
            }
        }
    }
}
