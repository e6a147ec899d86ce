//! One-dimensional root finding: secant with a bisection fallback.
//!
//! The secant method converges quickly but can diverge or meet a zero slope
//! for some comfort-model boundary conditions. Bisection always converges on
//! a bracket with a sign change and is only used when the secant fails.
//!
//! The residual function is fallible. An error at either end of the bracket
//! aborts the search and is handed back to the caller untouched. An error at
//! a secant iterate, which may lie far outside the bracket, leaves the secant
//! search unsolved so `find_root` can still bisect.

use crate::error::SolverError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Root finder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootConfig {
    /// Accept a point when `|f(x)| < epsilon`; bisection stops once the
    /// bracket is no wider than `2 * epsilon`.
    pub epsilon: f64,
    /// Maximum secant steps before falling back to bisection
    pub max_secant_iterations: usize,
    /// Maximum bisection halvings
    pub max_bisection_iterations: usize,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-3,
            max_secant_iterations: 100,
            max_bisection_iterations: 200,
        }
    }
}

/// Which part of the search produced the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RootMethod {
    /// One of the bracket ends already satisfied the tolerance.
    Endpoint,
    Secant,
    Bisection,
}

/// Root finding result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootResult {
    /// Abscissa of the root
    pub root: f64,
    /// Number of secant steps or bisection halvings taken
    pub iterations: usize,
    /// Method that produced `root`
    pub method: RootMethod,
}

/// Secant search on `[a, b]`.
///
/// Returns `SolverError::Unsolved` when `max_iterations` steps pass without
/// `|f(c)| < epsilon`, when a step would divide by zero, or when `f` fails
/// at an iterate.
pub fn secant<F, E>(
    mut f: F,
    a: f64,
    b: f64,
    epsilon: f64,
    max_iterations: usize,
) -> Result<RootResult, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<SolverError>,
{
    check_epsilon(epsilon)?;
    match secant_steps(&mut f, a, b, epsilon, max_iterations)? {
        Ok(result) => Ok(result),
        Err(what) => Err(SolverError::Unsolved {
            method: "secant",
            what,
        }
        .into()),
    }
}

/// Bisection search for `f(x) = target` on `[a, b]`.
///
/// Narrows the bracket until `|b - a| <= 2 * epsilon` and returns its
/// midpoint. Fails with `SolverError::NoSignChange` when neither half of the
/// bracket changes sign.
pub fn bisect<F, E>(
    mut f: F,
    a: f64,
    b: f64,
    epsilon: f64,
    target: f64,
    max_iterations: usize,
) -> Result<RootResult, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<SolverError>,
{
    check_epsilon(epsilon)?;

    let (mut a, mut b) = (a, b);
    if (b - a).abs() <= 2.0 * epsilon {
        return Ok(RootResult {
            root: 0.5 * (a + b),
            iterations: 0,
            method: RootMethod::Bisection,
        });
    }

    let mut fa = f(a)? - target;
    let mut fb = f(b)? - target;
    let mut iterations = 0;

    while (b - a).abs() > 2.0 * epsilon {
        if iterations >= max_iterations {
            return Err(SolverError::Unsolved {
                method: "bisection",
                what: "iteration cap reached",
            }
            .into());
        }
        iterations += 1;

        let midpoint = 0.5 * (a + b);
        let fm = f(midpoint)? - target;
        if fm == 0.0 {
            return Ok(RootResult {
                root: midpoint,
                iterations,
                method: RootMethod::Bisection,
            });
        }

        if fa * fm < 0.0 {
            b = midpoint;
            fb = fm;
        } else if fb * fm < 0.0 {
            a = midpoint;
            fa = fm;
        } else {
            return Err(SolverError::NoSignChange { a, b }.into());
        }
    }

    Ok(RootResult {
        root: 0.5 * (a + b),
        iterations,
        method: RootMethod::Bisection,
    })
}

/// Find a root of `f` on `[a, b]`: secant first, bisection (target 0) when
/// the secant search is unsolved.
pub fn find_root<F, E>(mut f: F, a: f64, b: f64, config: &RootConfig) -> Result<RootResult, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<SolverError>,
{
    check_epsilon(config.epsilon)?;
    match secant_steps(&mut f, a, b, config.epsilon, config.max_secant_iterations)? {
        Ok(result) => {
            debug!(
                root = result.root,
                iterations = result.iterations,
                method = ?result.method,
                "root found"
            );
            Ok(result)
        }
        Err(reason) => {
            debug!(reason, "secant unsolved, falling back to bisection");
            let result = bisect(
                &mut f,
                a,
                b,
                config.epsilon,
                0.0,
                config.max_bisection_iterations,
            )?;
            debug!(
                root = result.root,
                iterations = result.iterations,
                "root found by bisection"
            );
            Ok(result)
        }
    }
}

fn check_epsilon(epsilon: f64) -> Result<(), SolverError> {
    if epsilon > 0.0 && epsilon.is_finite() {
        Ok(())
    } else {
        Err(SolverError::InvalidArg {
            what: "epsilon must be positive and finite",
        })
    }
}

/// Secant iteration proper. The outer `Result` carries errors from `f`; the
/// inner one separates a converged root from an unsolved search.
fn secant_steps<F, E>(
    f: &mut F,
    a: f64,
    b: f64,
    epsilon: f64,
    max_iterations: usize,
) -> Result<Result<RootResult, &'static str>, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let (mut a, mut b) = (a, b);
    let mut fa = f(a)?;
    let mut fb = f(b)?;

    if fa.abs() <= epsilon {
        return Ok(Ok(RootResult {
            root: a,
            iterations: 0,
            method: RootMethod::Endpoint,
        }));
    }
    if fb.abs() <= epsilon {
        return Ok(Ok(RootResult {
            root: b,
            iterations: 0,
            method: RootMethod::Endpoint,
        }));
    }

    for iteration in 1..=max_iterations {
        let span = b - a;
        if span == 0.0 {
            return Ok(Err("zero-width step"));
        }
        let slope = (fb - fa) / span;
        if slope == 0.0 || !slope.is_finite() {
            return Ok(Err("zero slope"));
        }

        let c = b - fb / slope;
        if !c.is_finite() {
            return Ok(Err("non-finite iterate"));
        }
        let fc = match f(c) {
            Ok(fc) if fc.is_finite() => fc,
            _ => return Ok(Err("residual failed at iterate")),
        };
        if fc.abs() < epsilon {
            return Ok(Ok(RootResult {
                root: c,
                iterations: iteration,
                method: RootMethod::Secant,
            }));
        }

        a = b;
        fa = fb;
        b = c;
        fb = fc;
    }

    Ok(Err("iteration cap reached"))
}
