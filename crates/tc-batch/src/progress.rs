//! Progress events emitted while a batch runs.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStage {
    Started,
    /// Comfort metrics are being computed
    Evaluating,
    /// Warm-started balance temperatures are being computed
    BalanceTemperature,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct BatchProgressEvent {
    pub stage: BatchStage,
    /// Timesteps finished in this stage
    pub completed: usize,
    pub total: usize,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

impl BatchProgressEvent {
    pub fn fraction_complete(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_complete() {
        let event = BatchProgressEvent {
            stage: BatchStage::Evaluating,
            completed: 6,
            total: 24,
            elapsed_wall_s: 0.1,
            message: None,
        };
        assert_eq!(event.fraction_complete(), 0.25);
    }
}
