//! Per-timestep climate and occupant series.
//!
//! Every variable is a column. A column holding a single value applies to
//! every timestep; otherwise all multi-valued columns must share one length.

use serde::{Deserialize, Serialize};
use tc_comfort::ComfortInput;
use tc_comfort::constants::DEFAULT_AIR_SPEED;

use crate::error::{BatchError, BatchResult};

/// Parallel arrays of comfort variables, one entry per timestep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateSeries {
    pub air_temp: Vec<f64>,
    /// Radiant temperature; follows air temperature when absent
    pub radiant_temp: Option<Vec<f64>>,
    pub air_speed: Vec<f64>,
    pub relative_humidity: Vec<f64>,
    pub metabolic_rate: Vec<f64>,
    pub clothing_level: Vec<f64>,
    pub external_work: Vec<f64>,
}

impl ClimateSeries {
    /// Series with occupant defaults: still air at 0.05 m/s, 1 met, 1 clo,
    /// no external work.
    pub fn new(air_temp: Vec<f64>, relative_humidity: Vec<f64>) -> Self {
        Self {
            air_temp,
            radiant_temp: None,
            air_speed: vec![DEFAULT_AIR_SPEED],
            relative_humidity,
            metabolic_rate: vec![1.0],
            clothing_level: vec![1.0],
            external_work: vec![0.0],
        }
    }

    /// One column per input field, straight from a list of inputs.
    pub fn from_inputs(inputs: &[ComfortInput]) -> Self {
        let column = |f: fn(&ComfortInput) -> f64| inputs.iter().map(f).collect::<Vec<_>>();
        Self {
            air_temp: column(|i| i.air_temp),
            radiant_temp: Some(column(|i| i.radiant_temp)),
            air_speed: column(|i| i.air_speed),
            relative_humidity: column(|i| i.relative_humidity),
            metabolic_rate: column(|i| i.metabolic_rate),
            clothing_level: column(|i| i.clothing_level),
            external_work: column(|i| i.external_work),
        }
    }

    pub fn with_radiant_temp(mut self, radiant_temp: Vec<f64>) -> Self {
        self.radiant_temp = Some(radiant_temp);
        self
    }

    pub fn with_air_speed(mut self, air_speed: Vec<f64>) -> Self {
        self.air_speed = air_speed;
        self
    }

    pub fn with_metabolic_rate(mut self, metabolic_rate: Vec<f64>) -> Self {
        self.metabolic_rate = metabolic_rate;
        self
    }

    pub fn with_clothing_level(mut self, clothing_level: Vec<f64>) -> Self {
        self.clothing_level = clothing_level;
        self
    }

    pub fn with_external_work(mut self, external_work: Vec<f64>) -> Self {
        self.external_work = external_work;
        self
    }

    fn columns(&self) -> [(&'static str, &[f64]); 7] {
        [
            ("air temperature", self.air_temp.as_slice()),
            (
                "radiant temperature",
                self.radiant_temp.as_deref().unwrap_or(&self.air_temp),
            ),
            ("air speed", self.air_speed.as_slice()),
            ("relative humidity", self.relative_humidity.as_slice()),
            ("metabolic rate", self.metabolic_rate.as_slice()),
            ("clothing level", self.clothing_level.as_slice()),
            ("external work", self.external_work.as_slice()),
        ]
    }

    /// Number of timesteps: the length of the longest column.
    pub fn len(&self) -> usize {
        self.columns().iter().map(|(_, c)| c.len()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check that every column is non-empty and either single-valued or
    /// as long as the series.
    pub fn validate(&self) -> BatchResult<usize> {
        let len = self.len();
        for (what, column) in self.columns() {
            if column.is_empty() {
                return Err(BatchError::Empty { what });
            }
            if column.len() != 1 && column.len() != len {
                return Err(BatchError::LengthMismatch {
                    what,
                    expected: len,
                    found: column.len(),
                });
            }
        }
        Ok(len)
    }

    /// Inputs at timestep `index`, single-valued columns broadcast.
    ///
    /// `index` must be below `len()` of a validated series.
    pub fn input(&self, index: usize) -> ComfortInput {
        let at = |column: &[f64]| {
            if column.len() == 1 {
                column[0]
            } else {
                column[index]
            }
        };
        let air_temp = at(self.air_temp.as_slice());
        ComfortInput {
            air_temp,
            radiant_temp: self.radiant_temp.as_deref().map_or(air_temp, at),
            air_speed: at(self.air_speed.as_slice()),
            relative_humidity: at(self.relative_humidity.as_slice()),
            metabolic_rate: at(self.metabolic_rate.as_slice()),
            clothing_level: at(self.clothing_level.as_slice()),
            external_work: at(self.external_work.as_slice()),
        }
    }
}
