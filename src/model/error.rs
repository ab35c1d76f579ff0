use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RatingError {
    #[error("Volatility did not converge after {iterations} iterations")]
    NonConvergence { iterations: u32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unknown competitor: {0}")]
    UnknownCompetitor(String)
}

/// Rejects values that must be strictly positive and finite (RD, volatility, period length).
pub(crate) fn ensure_positive(name: &str, value: f64) -> Result<f64, RatingError> {
    if value.is_finite() && value > 0.0 {
        return Ok(value);
    }

    Err(RatingError::InvalidConfiguration(format!(
        "{} must be positive and finite, got {}",
        name, value
    )))
}

pub(crate) fn ensure_finite(name: &str, value: f64) -> Result<f64, RatingError> {
    if value.is_finite() {
        return Ok(value);
    }

    Err(RatingError::InvalidConfiguration(format!("{} must be finite, got {}", name, value)))
}

#[cfg(test)]
mod tests {
    use crate::model::error::{ensure_finite, ensure_positive, RatingError};

    #[test]
    fn test_ensure_positive_accepts_positive() {
        assert_eq!(ensure_positive("rd", 50.0), Ok(50.0));
    }

    #[test]
    fn test_ensure_positive_rejects_zero_and_nan() {
        assert!(matches!(ensure_positive("rd", 0.0), Err(RatingError::InvalidConfiguration(_))));
        assert!(matches!(ensure_positive("rd", -1.0), Err(RatingError::InvalidConfiguration(_))));
        assert!(matches!(ensure_positive("rd", f64::NAN), Err(RatingError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_ensure_finite_allows_negative() {
        assert_eq!(ensure_finite("rating", -200.0), Ok(-200.0));
        assert!(ensure_finite("rating", f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = RatingError::NonConvergence { iterations: 100 };
        assert_eq!(err.to_string(), "Volatility did not converge after 100 iterations");
    }
}
