//! Batch evaluation over climate series.

use proptest::prelude::*;
use tc_batch::{
    BatchError, BatchEvaluator, BatchOptions, BatchProgressEvent, BatchStage, CancelToken,
    ClimateSeries, ComfortCriteria,
};

/// Office occupant in light air movement: 0.1 m/s, 1 met, 0.6 clo.
fn office(air_temp: Vec<f64>, relative_humidity: Vec<f64>) -> ClimateSeries {
    ClimateSeries::new(air_temp, relative_humidity)
        .with_air_speed(vec![0.1])
        .with_clothing_level(vec![0.6])
}

fn sequential() -> BatchOptions {
    BatchOptions {
        parallel: false,
        ..BatchOptions::default()
    }
}

#[test]
fn a_comfortable_day_is_fully_comfortable() {
    let temps: Vec<f64> = (0..24).map(|h| 24.0 + (h % 4) as f64).collect();
    let output = BatchEvaluator::new(BatchOptions::default())
        .evaluate(&office(temps, vec![50.0]))
        .unwrap();

    assert_eq!(output.hours.len(), 24);
    assert_eq!(output.num_successful, 24);
    assert_eq!(output.num_failed, 0);
    assert_eq!(output.percent_of_time_comfortable, Some(100.0));
    assert!(output.comfortable.iter().all(|c| *c == Some(true)));
    assert!(output.balance_temperatures.is_none());
}

#[test]
fn a_quarter_of_the_day_is_comfortable() {
    let mut temps = vec![24.0, 25.0, 26.0, 27.0, 25.5, 24.5];
    temps.extend([15.0, 18.0, 33.0, 35.0, 15.0, 18.0]);
    temps.extend([33.0, 35.0, 15.0, 18.0, 33.0, 35.0]);
    temps.extend([15.0, 18.0, 33.0, 35.0, 15.0, 18.0]);
    let output = BatchEvaluator::new(BatchOptions::default())
        .evaluate(&office(temps, vec![50.0]))
        .unwrap();

    assert_eq!(output.num_successful, 24);
    assert_eq!(output.percent_of_time_comfortable, Some(25.0));
    assert_eq!(output.comfortable.iter().filter(|c| **c == Some(true)).count(), 6);
}

#[test]
fn parallel_matches_sequential() {
    let temps: Vec<f64> = (0..50).map(|h| 16.0 + 0.35 * h as f64).collect();
    let humidity: Vec<f64> = (0..50).map(|h| 30.0 + h as f64).collect();
    let series = office(temps, humidity).with_air_speed(vec![0.6]);

    let parallel = BatchEvaluator::new(BatchOptions::default())
        .evaluate(&series)
        .unwrap();
    let sequential = BatchEvaluator::new(sequential()).evaluate(&series).unwrap();
    assert_eq!(parallel, sequential);
}

#[test]
fn cancelling_mid_run_discards_partial_results() {
    let cancel = CancelToken::new();
    let evaluator = BatchEvaluator::new(sequential()).with_cancel_token(cancel.clone());

    let mut stages = Vec::new();
    let mut cb = |event: BatchProgressEvent| {
        if event.stage == BatchStage::Evaluating && event.completed == 2 {
            cancel.cancel();
        }
        stages.push(event.stage);
    };
    let err = evaluator
        .evaluate_with_progress(&office(vec![25.0; 24], vec![50.0]), Some(&mut cb))
        .unwrap_err();

    assert_eq!(
        err,
        BatchError::Cancelled {
            completed: 2,
            total: 24
        }
    );
    assert_eq!(stages.last(), Some(&BatchStage::Cancelled));
    assert!(!stages.contains(&BatchStage::Completed));
}

#[test]
fn cancelling_a_parallel_run() {
    let evaluator = BatchEvaluator::new(BatchOptions::default());
    let cancel = evaluator.cancel_token();
    let mut cb = |event: BatchProgressEvent| {
        if event.stage == BatchStage::Evaluating {
            cancel.cancel();
        }
    };
    let temps: Vec<f64> = (0..2000).map(|h| 20.0 + (h % 10) as f64).collect();
    let result = evaluator.evaluate_with_progress(&office(temps, vec![50.0]), Some(&mut cb));
    assert!(matches!(result, Err(BatchError::Cancelled { total: 2000, .. })));
}

#[test]
fn cancelling_balance_stage_keeps_comfort_results() {
    let options = BatchOptions {
        compute_balance_temperature: true,
        ..sequential()
    };
    let evaluator = BatchEvaluator::new(options);
    let cancel = evaluator.cancel_token();
    let mut stages = Vec::new();
    let mut cb = |event: BatchProgressEvent| {
        if event.stage == BatchStage::BalanceTemperature && event.completed == 1 {
            cancel.cancel();
        }
        stages.push(event.stage);
    };
    let output = evaluator
        .evaluate_with_progress(&office(vec![24.0, 25.0, 26.0], vec![50.0]), Some(&mut cb))
        .unwrap();

    assert_eq!(output.num_successful, 3);
    assert!(output.results.iter().all(Option::is_some));
    assert_eq!(output.percent_of_time_comfortable, Some(100.0));
    assert!(output.balance_temperatures.is_none());
    assert_eq!(stages.last(), Some(&BatchStage::Cancelled));
    assert!(!stages.contains(&BatchStage::Completed));
}

#[test]
fn balance_temperatures_follow_the_series() {
    let options = BatchOptions {
        compute_balance_temperature: true,
        ..BatchOptions::default()
    };
    let output = BatchEvaluator::new(options)
        .evaluate(&office(vec![20.0, 25.0, 30.0], vec![50.0]))
        .unwrap();

    let balance = output.balance_temperatures.unwrap();
    assert_eq!(balance.len(), 3);
    for t in balance {
        let t = t.unwrap();
        assert!((t - 25.494).abs() < 0.05, "balance {t}");
    }
}

#[test]
fn balance_progress_is_reported() {
    let options = BatchOptions {
        compute_balance_temperature: true,
        parallel: false,
        ..BatchOptions::default()
    };
    let mut balance_events = 0;
    let mut cb = |event: BatchProgressEvent| {
        if event.stage == BatchStage::BalanceTemperature {
            balance_events += 1;
        }
    };
    BatchEvaluator::new(options)
        .evaluate_with_progress(&office(vec![22.0, 26.0], vec![50.0]), Some(&mut cb))
        .unwrap();
    assert_eq!(balance_events, 2);
}

#[test]
fn ppd_criterion_is_stricter_than_pmv_band() {
    let options = BatchOptions {
        criteria: ComfortCriteria::ppd(),
        ..sequential()
    };
    let output = BatchEvaluator::new(options)
        .evaluate(&office(vec![24.0, 25.0, 26.0], vec![50.0]))
        .unwrap();
    // PPD at 24 °C is about 10.7 %
    assert_eq!(output.comfortable, vec![Some(false), Some(true), Some(true)]);
}

#[test]
fn humid_hours_fail_a_humidity_limit() {
    let options = BatchOptions {
        criteria: ComfortCriteria::Ppd {
            threshold: 10.0,
            humidity_ratio_upper: 0.012,
            humidity_ratio_lower: 0.0,
        },
        ..sequential()
    };
    let output = BatchEvaluator::new(options)
        .evaluate(&office(vec![25.0, 25.0], vec![50.0, 80.0]))
        .unwrap();
    assert_eq!(output.comfortable[0], Some(true));
    assert_eq!(output.comfortable[1], Some(false));
}

#[test]
fn invalid_criteria_are_rejected() {
    let options = BatchOptions {
        criteria: ComfortCriteria::PmvBand { limit: 4.0 },
        ..BatchOptions::default()
    };
    let err = BatchEvaluator::new(options)
        .evaluate(&office(vec![25.0], vec![50.0]))
        .unwrap_err();
    assert!(matches!(err, BatchError::InvalidCriteria(_)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn percentage_counts_successful_timesteps(
        temps in prop::collection::vec(15.0_f64..35.0, 1..12),
        rh in 20.0_f64..80.0,
        speed in 0.05_f64..1.0,
    ) {
        let n = temps.len();
        let series = office(temps, vec![rh]).with_air_speed(vec![speed]);
        let output = BatchEvaluator::new(BatchOptions::default()).evaluate(&series).unwrap();

        prop_assert_eq!(output.num_successful + output.num_failed, n);
        prop_assert_eq!(output.results.len(), n);
        let comfortable = output.comfortable.iter().filter(|c| **c == Some(true)).count();
        match output.percent_of_time_comfortable {
            Some(p) => {
                prop_assert!((0.0..=100.0).contains(&p));
                prop_assert!((p - 100.0 * comfortable as f64 / output.num_successful as f64).abs() < 1e-9);
            }
            None => prop_assert_eq!(output.num_successful, 0),
        }
    }
}
