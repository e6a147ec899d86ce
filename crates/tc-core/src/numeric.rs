use crate::TcError;

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, TcError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(TcError::NonFinite { what, value: v })
    }
}

/// Check that `v` is finite and inside the closed interval `[min, max]`.
pub fn ensure_in_range(v: f64, min: f64, max: f64, what: &'static str) -> Result<f64, TcError> {
    let v = ensure_finite(v, what)?;
    if v < min || v > max {
        return Err(TcError::OutOfRange {
            what,
            value: v,
            min,
            max,
        });
    }
    Ok(v)
}

/// Split a signed deviation into its (warm, cold) magnitudes.
///
/// Exactly one of the two is non-zero unless `signal` is zero.
#[inline]
pub fn split_signal(signal: f64) -> (f64, f64) {
    if signal > 0.0 {
        (signal, 0.0)
    } else {
        (0.0, -signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(f64::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_in_range_bounds_are_inclusive() {
        assert_eq!(ensure_in_range(0.0, 0.0, 100.0, "rh").unwrap(), 0.0);
        assert_eq!(ensure_in_range(100.0, 0.0, 100.0, "rh").unwrap(), 100.0);
        let err = ensure_in_range(100.5, 0.0, 100.0, "rh").unwrap_err();
        assert!(matches!(err, TcError::OutOfRange { what: "rh", .. }));
        assert!(ensure_in_range(f64::INFINITY, 0.0, 100.0, "rh").is_err());
    }

    #[test]
    fn split_signal_separates_warm_and_cold() {
        assert_eq!(split_signal(0.4), (0.4, 0.0));
        assert_eq!(split_signal(-0.4), (0.0, 0.4));
        assert_eq!(split_signal(0.0), (0.0, 0.0));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn split_signal_recombines(signal in -50.0_f64..50.0_f64) {
            let (warm, cold) = split_signal(signal);
            prop_assert!(warm >= 0.0 && cold >= 0.0);
            prop_assert!(warm == 0.0 || cold == 0.0);
            prop_assert_eq!(warm - cold, signal);
        }
    }
}
