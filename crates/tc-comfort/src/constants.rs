//! Physiological and physical constants shared by the comfort models.

/// W/m² per met in Fanger's PMV model.
pub const PMV_MET_FACTOR: f64 = 58.15;

/// W/m² per met in the Pierce two-node model.
pub const SET_MET_FACTOR: f64 = 58.2;

/// m²K/W per clo.
pub const CLO_TO_M2K_PER_W: f64 = 0.155;

/// Stefan-Boltzmann constant (W/m²K⁴).
pub const STEFAN_BOLTZMANN: f64 = 5.6697e-8;

/// Atmospheric pressure used by the two-node model (kPa).
pub const ATMOSPHERIC_PRESSURE_KPA: f64 = 101.325;

/// Reference body of the two-node model.
pub const BODY_WEIGHT_KG: f64 = 69.9;
pub const BODY_SURFACE_AREA_M2: f64 = 1.8258;

/// Thermoregulatory set points.
pub const SKIN_TEMP_NEUTRAL: f64 = 33.7;
pub const CORE_TEMP_NEUTRAL: f64 = 36.49;
pub const BODY_TEMP_NEUTRAL: f64 = 36.49;
pub const SKIN_BLOOD_FLOW_NEUTRAL: f64 = 6.3;
pub const ALFA_NEUTRAL: f64 = 0.1;

/// Controller gains: sweating, vasodilation, vasoconstriction.
pub const CSW: f64 = 170.0;
pub const CDIL: f64 = 120.0;
pub const CSTR: f64 = 0.5;

/// Skin blood flow bounds (L/m²h).
pub const SKIN_BLOOD_FLOW_MIN: f64 = 0.5;
pub const SKIN_BLOOD_FLOW_MAX: f64 = 90.0;

/// Regulatory sweat cap (W/m²).
pub const REGULATORY_SWEAT_MAX: f64 = 500.0;

/// Air speed at and below which PMV needs no correction (m/s).
pub const STILL_AIR_SPEED: f64 = 0.15;

/// Air speed assumed when none is supplied (m/s).
pub const DEFAULT_AIR_SPEED: f64 = 0.05;
