//! tc-comfort: human thermal comfort models for thermocomfort.
//!
//! Provides:
//! - Validated comfort inputs and named activity metabolic rates
//! - Fanger PMV/PPD heat-balance model
//! - Pierce two-node transient SET model
//! - Elevated air speed correction reconciling PMV with SET above 0.15 m/s
//! - Comfort envelope searches (balance temperature, comfort range)
//! - Psychrometric helpers (humidity ratio, enthalpy)
//!
//! # Architecture
//!
//! Every model is a pure function of its inputs. The only mutable state is
//! the per-call `PierceState` scratch of the SET simulation, so calls are
//! independent and safe to run on any number of threads.
//!
//! # Example
//!
//! ```
//! use tc_comfort::{ComfortInput, evaluate_comfort};
//!
//! let input = ComfortInput::new(26.0, 50.0, 1.0, 0.5)
//!     .with_air_speed(0.8)
//!     .validated()
//!     .unwrap();
//! let result = evaluate_comfort(&input).unwrap();
//! assert!(result.cooling_effect > 0.0);
//! ```

pub mod constants;
pub mod elevated;
pub mod envelope;
pub mod error;
pub mod input;
pub mod pmv;
pub mod psychrometrics;
pub mod set;

// Re-exports for ergonomics
pub use elevated::{ComfortResult, ElevatedAirspeedConfig, evaluate_comfort, evaluate_comfort_with};
pub use envelope::{
    Acceptability, ComfortRange, EnvelopeConditions, EnvelopeConfig, EnvelopeResult,
    balance_temperature, comfort_range, solve_envelope, solve_envelope_with,
};
pub use error::{ModelError, ModelResult};
pub use input::{Activity, ComfortInput, parse_metabolic_rate};
pub use pmv::{PmvConfig, PmvPpd, compute_pmv, compute_pmv_with, ppd_from_pmv};
pub use psychrometrics::{Psychrometrics, humidity_ratio, psychrometrics, saturation_pressure};
pub use set::{
    ClothingExchange, PierceConditions, PierceState, SetConfig, compute_set, compute_set_with,
    simulate,
};
