//! Standard normal quantile and distribution function.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::core::error::{AnalysisError, AnalysisResult};

fn standard_normal() -> AnalysisResult<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| AnalysisError::Statistics(e.to_string()))
}

/// Inverse CDF of the standard normal distribution.
///
/// Returns `z` such that `Φ(z) = p`. Fails with
/// [`AnalysisError::InvalidParameter`] unless `0 < p < 1`.
///
/// # Examples
///
/// ```
/// use abtest_rust::algorithms::normal::quantile;
///
/// let z = quantile(0.975).unwrap();
/// assert!((z - 1.959964).abs() < 1e-6);
/// assert!(quantile(1.0).is_err());
/// ```
pub fn quantile(p: f64) -> AnalysisResult<f64> {
    if !(p.is_finite() && p > 0.0 && p < 1.0) {
        return Err(AnalysisError::InvalidParameter(format!(
            "normal quantile requires 0 < p < 1, got {}",
            p
        )));
    }
    Ok(standard_normal()?.inverse_cdf(p))
}

/// Standard normal CDF `Φ(z)`.
pub fn cdf(z: f64) -> AnalysisResult<f64> {
    if z.is_nan() {
        return Err(AnalysisError::InvalidParameter(
            "normal cdf is undefined for NaN".to_string(),
        ));
    }
    Ok(standard_normal()?.cdf(z))
}

/// Two-sided critical value `Φ⁻¹(1 - alpha/2)`.
pub fn two_sided_critical_value(alpha: f64) -> AnalysisResult<f64> {
    if !(alpha.is_finite() && alpha > 0.0 && alpha < 1.0) {
        return Err(AnalysisError::out_of_unit_interval("alpha", alpha));
    }
    quantile(1.0 - alpha / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_quantiles() {
        assert!((quantile(0.5).unwrap()).abs() < 1e-12);
        assert!((quantile(0.8).unwrap() - 0.841_621_233_6).abs() < 1e-7);
        assert!((quantile(0.975).unwrap() - 1.959_963_984_5).abs() < 1e-7);
        assert!((quantile(0.999).unwrap() - 3.090_232_306_2).abs() < 1e-7);
    }

    #[test]
    fn test_quantile_domain() {
        for p in [0.0, 1.0, -0.1, 1.1, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(quantile(p), Err(AnalysisError::InvalidParameter(_))),
                "p = {} should be rejected",
                p
            );
        }
    }

    #[test]
    fn test_quantile_is_symmetric() {
        let upper = quantile(0.9).unwrap();
        let lower = quantile(0.1).unwrap();
        assert!((upper + lower).abs() < 1e-12);
    }

    #[test]
    fn test_round_trip_grid() {
        let mut z = -3.0;
        while z <= 3.0 {
            let p = cdf(z).unwrap();
            let back = quantile(p).unwrap();
            assert!((back - z).abs() < 1e-6, "z = {}, back = {}", z, back);
            z += 0.25;
        }
    }

    #[test]
    fn test_critical_value() {
        let z = two_sided_critical_value(0.05).unwrap();
        assert!((z - 1.959_964).abs() < 1e-6);
        assert!(two_sided_critical_value(0.0).is_err());
    }
}
