//! Integration tests for tc-solver with caller-defined error types.

use tc_solver::{
    FixedPointConfig, RootConfig, RootMethod, SolverError, bisect, find_root, iterate_fixed_point,
    secant,
};

/// Error type of a model that the solvers wrap around.
#[derive(Debug, PartialEq)]
enum ModelErr {
    Diverged,
    Solver(SolverError),
}

impl From<SolverError> for ModelErr {
    fn from(e: SolverError) -> Self {
        ModelErr::Solver(e)
    }
}

#[test]
fn secant_linear_within_tolerance() {
    let result = secant(|x| Ok::<_, SolverError>(x - 5.0), 0.0, 10.0, 0.0001, 100).unwrap();
    assert!((result.root - 5.0).abs() <= 0.0001);
}

#[test]
fn no_root_in_bracket_is_reported_not_guessed() {
    let f = |x: f64| Ok::<_, ModelErr>((x - 50.0).powi(2) + 0.5);

    let err = secant(f, 0.0, 10.0, 0.0001, 100).unwrap_err();
    assert!(matches!(err, ModelErr::Solver(SolverError::Unsolved { .. })));

    let err = find_root(f, 0.0, 10.0, &RootConfig::default()).unwrap_err();
    assert!(matches!(err, ModelErr::Solver(SolverError::NoSignChange { .. })));
}

#[test]
fn model_errors_pass_through_untouched() {
    let mut calls = 0;
    let f = |x: f64| {
        calls += 1;
        if calls > 2 {
            Err(ModelErr::Diverged)
        } else {
            Ok(x * x - 2.0)
        }
    };
    let err = find_root(f, 0.0, 3.0, &RootConfig::default()).unwrap_err();
    assert_eq!(err, ModelErr::Diverged);
}

#[test]
fn decreasing_residual_like_comfort_offset() {
    // Shape of "target - g(t)" with g increasing: a decreasing function.
    let target = 27.3;
    let f = |t: f64| Ok::<_, SolverError>(target - (0.9 * t + 3.0 + 0.002 * t * t));
    let result = find_root(f, -200.0, 200.0, &RootConfig::default()).unwrap();
    let g = 0.9 * result.root + 3.0 + 0.002 * result.root * result.root;
    assert!((g - target).abs() < 1e-3);
    assert_ne!(result.method, RootMethod::Bisection);
}

#[test]
fn bisection_matches_secant_on_monotone_function() {
    let f = |x: f64| Ok::<_, SolverError>(x.powi(3) - 8.0);
    let by_bisection = bisect(f, 0.0, 10.0, 1e-6, 0.0, 200).unwrap();
    let by_secant = secant(f, 1.0, 3.0, 1e-9, 100).unwrap();
    assert!((by_bisection.root - 2.0).abs() < 1e-5);
    assert!((by_secant.root - 2.0).abs() < 1e-6);
}

#[test]
fn fixed_point_with_model_error_type() {
    let result = iterate_fixed_point(
        21.0,
        |x| Ok::<_, ModelErr>(-(0.3 * (x - 25.5))),
        &FixedPointConfig::default(),
    )
    .unwrap();
    assert!((result.value - 25.5).abs() < 0.05);
}
