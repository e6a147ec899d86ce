//! Batch comfort evaluation over a climate series.
//!
//! Each timestep is independent, so evaluation can fan out over a rayon
//! pool with every worker writing its own slot. A timestep whose models fail
//! is recorded as `None` and left out of the comfortable-time percentage.
//! Balance temperatures are warm-started from the previous timestep and
//! therefore always run in order. Cancelling during that stage keeps the
//! comfort results and drops only the balance temperatures.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tc_comfort::{
    ComfortInput, ComfortResult, ElevatedAirspeedConfig, EnvelopeConditions, EnvelopeConfig,
    balance_temperature, evaluate_comfort_with,
};
use tracing::{info, warn};

use crate::criteria::ComfortCriteria;
use crate::error::{BatchError, BatchResult};
use crate::progress::{BatchProgressEvent, BatchStage};
use crate::series::ClimateSeries;

/// Shared flag a caller raises to stop a running batch.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOptions {
    pub criteria: ComfortCriteria,
    /// Evaluate timesteps on the rayon pool
    pub parallel: bool,
    pub compute_balance_temperature: bool,
    /// Starting guess for the first balance temperature (°C)
    pub balance_warm_start: f64,
    /// Timestep indices to evaluate, in order; all timesteps when absent
    pub hours: Option<Vec<usize>>,
    pub comfort: ElevatedAirspeedConfig,
    pub envelope: EnvelopeConfig,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            criteria: ComfortCriteria::default(),
            parallel: true,
            compute_balance_temperature: false,
            balance_warm_start: 24.0,
            hours: None,
            comfort: ElevatedAirspeedConfig::default(),
            envelope: EnvelopeConfig::default(),
        }
    }
}

/// Results of a batch, one slot per evaluated timestep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutput {
    /// Series index of each slot
    pub hours: Vec<usize>,
    pub results: Vec<Option<ComfortResult>>,
    pub comfortable: Vec<Option<bool>>,
    /// Percent of successful timesteps that are comfortable; `None` when
    /// no timestep succeeded
    pub percent_of_time_comfortable: Option<f64>,
    pub balance_temperatures: Option<Vec<Option<f64>>>,
    pub num_successful: usize,
    pub num_failed: usize,
}

pub struct BatchEvaluator {
    options: BatchOptions,
    cancel: CancelToken,
}

impl BatchEvaluator {
    pub fn new(options: BatchOptions) -> Self {
        Self {
            options,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    pub fn evaluate(&self, series: &ClimateSeries) -> BatchResult<BatchOutput> {
        self.evaluate_with_progress(series, None)
    }

    pub fn evaluate_with_progress(
        &self,
        series: &ClimateSeries,
        mut progress_cb: Option<&mut dyn FnMut(BatchProgressEvent)>,
    ) -> BatchResult<BatchOutput> {
        let started = Instant::now();
        let hours = self.selected_hours(series)?;
        self.options
            .criteria
            .validate()
            .map_err(BatchError::InvalidCriteria)?;

        let inputs = hours
            .iter()
            .map(|&index| {
                let input = series.input(index);
                input
                    .validate()
                    .map(|_| input)
                    .map_err(|source| BatchError::InvalidInput { index, source })
            })
            .collect::<BatchResult<Vec<_>>>()?;
        let total = inputs.len();

        info!(timesteps = total, parallel = self.options.parallel, "batch started");
        emit(&mut progress_cb, BatchStage::Started, 0, total, started, None);

        let results = if self.options.parallel {
            self.evaluate_parallel(&inputs, &mut progress_cb, started)?
        } else {
            self.evaluate_sequential(&inputs, &mut progress_cb, started)?
        };

        let comfortable: Vec<Option<bool>> = inputs
            .iter()
            .zip(&results)
            .map(|(input, result)| {
                result
                    .as_ref()
                    .map(|r| self.options.criteria.is_comfortable(input, r))
            })
            .collect();

        let num_successful = results.iter().filter(|r| r.is_some()).count();
        let num_failed = total - num_successful;
        let num_comfortable = comfortable.iter().filter(|c| **c == Some(true)).count();
        let percent_of_time_comfortable = (num_successful > 0)
            .then(|| 100.0 * num_comfortable as f64 / num_successful as f64);

        let (balance_temperatures, balance_cancelled) = if self.options.compute_balance_temperature {
            match self.balance_temperatures(&inputs, &mut progress_cb, started) {
                Some(temperatures) => (Some(temperatures), false),
                None => (None, true),
            }
        } else {
            (None, false)
        };

        info!(
            timesteps = total,
            num_failed,
            ?percent_of_time_comfortable,
            balance_cancelled,
            elapsed_s = started.elapsed().as_secs_f64(),
            "batch finished"
        );
        if !balance_cancelled {
            emit(&mut progress_cb, BatchStage::Completed, total, total, started, None);
        }

        Ok(BatchOutput {
            hours,
            results,
            comfortable,
            percent_of_time_comfortable,
            balance_temperatures,
            num_successful,
            num_failed,
        })
    }

    fn selected_hours(&self, series: &ClimateSeries) -> BatchResult<Vec<usize>> {
        let len = series.validate()?;
        match &self.options.hours {
            None => Ok((0..len).collect()),
            Some(hours) => {
                if hours.is_empty() {
                    return Err(BatchError::Empty {
                        what: "hour selection",
                    });
                }
                if let Some(&index) = hours.iter().find(|&&h| h >= len) {
                    return Err(BatchError::HourOutOfRange { index, len });
                }
                Ok(hours.clone())
            }
        }
    }

    fn evaluate_one(&self, index: usize, input: &ComfortInput) -> Option<ComfortResult> {
        match evaluate_comfort_with(input, &self.options.comfort) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(timestep = index, error = %e, "timestep failed");
                None
            }
        }
    }

    fn check_cancel(
        &self,
        completed: usize,
        total: usize,
        progress_cb: &mut Option<&mut dyn FnMut(BatchProgressEvent)>,
        started: Instant,
    ) -> BatchResult<()> {
        if self.cancel.is_cancelled() {
            info!(completed, total, "batch cancelled");
            let message = format!("cancelled after {completed} of {total} timesteps");
            emit(progress_cb, BatchStage::Cancelled, completed, total, started, Some(message));
            return Err(BatchError::Cancelled { completed, total });
        }
        Ok(())
    }

    fn evaluate_sequential(
        &self,
        inputs: &[ComfortInput],
        progress_cb: &mut Option<&mut dyn FnMut(BatchProgressEvent)>,
        started: Instant,
    ) -> BatchResult<Vec<Option<ComfortResult>>> {
        let total = inputs.len();
        let mut results = Vec::with_capacity(total);
        for (i, input) in inputs.iter().enumerate() {
            self.check_cancel(i, total, progress_cb, started)?;
            results.push(self.evaluate_one(i, input));
            emit(progress_cb, BatchStage::Evaluating, i + 1, total, started, None);
        }
        Ok(results)
    }

    /// Evaluate in chunks so progress and cancellation reach the caller's
    /// thread between chunks; workers also poll the token per timestep.
    fn evaluate_parallel(
        &self,
        inputs: &[ComfortInput],
        progress_cb: &mut Option<&mut dyn FnMut(BatchProgressEvent)>,
        started: Instant,
    ) -> BatchResult<Vec<Option<ComfortResult>>> {
        let total = inputs.len();
        let chunk_size = (4 * rayon::current_num_threads()).max(1);
        let mut results = Vec::with_capacity(total);

        for (chunk_index, chunk) in inputs.chunks(chunk_size).enumerate() {
            let offset = chunk_index * chunk_size;
            self.check_cancel(offset, total, progress_cb, started)?;

            let evaluated: Vec<Option<Option<ComfortResult>>> = chunk
                .par_iter()
                .enumerate()
                .map(|(i, input)| {
                    if self.cancel.is_cancelled() {
                        None
                    } else {
                        Some(self.evaluate_one(offset + i, input))
                    }
                })
                .collect();

            let done = evaluated.iter().take_while(|slot| slot.is_some()).count();
            if done < evaluated.len() {
                self.check_cancel(offset + done, total, progress_cb, started)?;
            }
            results.extend(evaluated.into_iter().flatten());
            emit(progress_cb, BatchStage::Evaluating, results.len(), total, started, None);
        }
        Ok(results)
    }

    /// Returns `None` when cancelled; the comfort results are already
    /// complete at this point and are kept.
    fn balance_temperatures(
        &self,
        inputs: &[ComfortInput],
        progress_cb: &mut Option<&mut dyn FnMut(BatchProgressEvent)>,
        started: Instant,
    ) -> Option<Vec<Option<f64>>> {
        let total = inputs.len();
        let mut guess = self.options.balance_warm_start;
        let mut temperatures = Vec::with_capacity(total);

        for (i, input) in inputs.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(completed = i, total, "balance temperatures cancelled");
                let message = format!(
                    "balance temperatures cancelled after {i} of {total} timesteps; comfort results kept"
                );
                emit(progress_cb, BatchStage::Cancelled, i, total, started, Some(message));
                return None;
            }
            let conditions = EnvelopeConditions::from(input);
            match balance_temperature(guess, &conditions, &self.options.envelope) {
                Ok(t) => {
                    guess = t;
                    temperatures.push(Some(t));
                }
                Err(e) => {
                    warn!(timestep = i, error = %e, "balance temperature failed");
                    temperatures.push(None);
                }
            }
            emit(progress_cb, BatchStage::BalanceTemperature, i + 1, total, started, None);
        }
        Some(temperatures)
    }
}

fn emit(
    progress_cb: &mut Option<&mut dyn FnMut(BatchProgressEvent)>,
    stage: BatchStage,
    completed: usize,
    total: usize,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(BatchProgressEvent {
            stage,
            completed,
            total,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
        });
    }
}
