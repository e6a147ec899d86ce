//! Fanger PMV/PPD heat-balance model (ISO 7730).
//!
//! The clothing surface temperature is found by successive substitution on
//! `xn = (tcl + 273) / 100`, averaging each new estimate with the previous
//! one. The convective coefficient is re-evaluated every pass as the larger
//! of forced and natural convection.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{CLO_TO_M2K_PER_W, PMV_MET_FACTOR};
use crate::error::{ModelError, ModelResult};
use crate::input::ComfortInput;

/// Clothing surface temperature loop configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PmvConfig {
    /// Convergence threshold on successive estimates of `(tcl + 273) / 100`
    pub tolerance: f64,
    /// Maximum substitution passes
    pub max_iterations: usize,
}

impl Default for PmvConfig {
    fn default() -> Self {
        Self {
            tolerance: 1.5e-4,
            max_iterations: 150,
        }
    }
}

/// Predicted mean vote and predicted percentage dissatisfied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PmvPpd {
    pub pmv: f64,
    /// Percent, never below 5
    pub ppd: f64,
}

pub fn compute_pmv(input: &ComfortInput) -> ModelResult<PmvPpd> {
    compute_pmv_with(input, &PmvConfig::default())
}

pub fn compute_pmv_with(input: &ComfortInput, config: &PmvConfig) -> ModelResult<PmvPpd> {
    let ta = input.air_temp;
    let tr = input.radiant_temp;

    // Water vapour partial pressure, Pa
    let pa = input.relative_humidity * 10.0 * (16.6536 - 4030.183 / (ta + 235.0)).exp();

    let icl = CLO_TO_M2K_PER_W * input.clothing_level;
    let m = input.metabolic_rate * PMV_MET_FACTOR;
    let w = input.external_work * PMV_MET_FACTOR;
    let mw = m - w;
    let fcl = if icl <= 0.078 {
        1.0 + 1.29 * icl
    } else {
        1.05 + 0.645 * icl
    };

    let hcf = 12.1 * input.air_speed.sqrt();
    let taa = ta + 273.0;
    let tra = tr + 273.0;
    let tcla = taa + (35.5 - ta) / (3.5 * icl + 0.1);

    let p1 = icl * fcl;
    let p2 = p1 * 3.96;
    let p3 = p1 * 100.0;
    let p4 = p1 * taa;
    let p5 = 308.7 - 0.028 * mw + p2 * (tra / 100.0).powi(4);

    let mut xn = tcla / 100.0;
    let mut xf = tcla / 50.0;
    let mut hc = hcf;
    let mut iterations = 0;
    while (xn - xf).abs() > config.tolerance {
        if iterations >= config.max_iterations {
            warn!(
                air_temp = ta,
                radiant_temp = tr,
                max_iterations = config.max_iterations,
                "PMV clothing surface temperature did not converge"
            );
            return Err(ModelError::NonConvergence {
                what: "PMV clothing surface temperature",
                iterations,
            });
        }
        iterations += 1;

        xf = 0.5 * (xf + xn);
        let hcn = 2.38 * (100.0 * xf - taa).abs().powf(0.25);
        hc = hcf.max(hcn);
        xn = (p5 + p4 * hc - p2 * xf.powi(4)) / (100.0 + p3 * hc);
    }
    let tcl = 100.0 * xn - 273.0;

    let skin_diffusion = 3.05e-3 * (5733.0 - 6.99 * mw - pa);
    let sweating = if mw > PMV_MET_FACTOR {
        0.42 * (mw - PMV_MET_FACTOR)
    } else {
        0.0
    };
    let latent_respiration = 1.7e-5 * m * (5867.0 - pa);
    let dry_respiration = 0.0014 * m * (34.0 - ta);
    let radiation = 3.96 * fcl * (xn.powi(4) - (tra / 100.0).powi(4));
    let convection = fcl * hc * (tcl - ta);

    let ts = 0.303 * (-0.036 * m).exp() + 0.028;
    let pmv = ts
        * (mw
            - skin_diffusion
            - sweating
            - latent_respiration
            - dry_respiration
            - radiation
            - convection);

    debug!(pmv, clothing_temp = tcl, iterations, "PMV evaluated");
    Ok(PmvPpd {
        pmv,
        ppd: ppd_from_pmv(pmv),
    })
}

/// PPD (%) for a given PMV.
#[inline]
pub fn ppd_from_pmv(pmv: f64) -> f64 {
    100.0 - 95.0 * (-0.03353 * pmv.powi(4) - 0.2179 * pmv.powi(2)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iso(ta: f64, tr: f64, rh: f64, met: f64, clo: f64) -> ComfortInput {
        ComfortInput::new(ta, rh, met, clo)
            .with_radiant_temp(tr)
            .with_air_speed(0.1)
    }

    #[test]
    fn iso_7730_reference_rows() {
        let cool = compute_pmv(&iso(22.0, 22.0, 60.0, 1.2, 0.5)).unwrap();
        assert!((cool.pmv + 0.75).abs() < 0.01);
        assert!((cool.ppd - 17.0).abs() < 0.2);

        let warm = compute_pmv(&iso(27.0, 27.0, 60.0, 1.2, 0.5)).unwrap();
        assert!((warm.pmv - 0.77).abs() < 0.01);

        let neutral = compute_pmv(&iso(23.5, 25.5, 60.0, 1.2, 0.5)).unwrap();
        assert!(neutral.pmv.abs() < 0.02);
    }

    #[test]
    fn ppd_minimum_is_five_percent() {
        assert!((ppd_from_pmv(0.0) - 5.0).abs() < 1e-12);
        assert!((ppd_from_pmv(1.0) - ppd_from_pmv(-1.0)).abs() < 1e-12);
        assert!(ppd_from_pmv(3.0) > 99.0);
    }

    #[test]
    fn nude_still_air_converges() {
        let input = ComfortInput::new(30.0, 50.0, 1.0, 0.0).with_air_speed(0.0);
        let result = compute_pmv(&input).unwrap();
        assert!(result.pmv.is_finite());
    }

    #[test]
    fn starved_iteration_budget_reports_non_convergence() {
        let config = PmvConfig {
            tolerance: 1.5e-4,
            max_iterations: 1,
        };
        let err = compute_pmv_with(&iso(22.0, 22.0, 60.0, 1.2, 0.5), &config).unwrap_err();
        assert_eq!(
            err,
            ModelError::NonConvergence {
                what: "PMV clothing surface temperature",
                iterations: 1
            }
        );
    }
}
