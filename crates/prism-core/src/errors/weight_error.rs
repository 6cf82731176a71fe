/// Weight validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightError {
    #[error("weight {name} is not finite: {value}")]
    NotFinite { name: String, value: f64 },

    #[error("weight {name} is negative: {value}")]
    Negative { name: String, value: f64 },

    #[error("weight {name} = {value} outside [{min}, {max}]")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("unknown factor: {factor}")]
    UnknownFactor { factor: String },

    #[error("weight set {name} is empty")]
    Empty { name: String },

    #[error("weight set {name} totals {actual}, expected {expected}")]
    TotalMismatch {
        name: String,
        expected: f64,
        actual: f64,
    },
}

impl WeightError {
    /// Check that `value` is finite and inside `[min, max]`.
    pub fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<f64, WeightError> {
        if !value.is_finite() {
            return Err(WeightError::NotFinite {
                name: name.to_string(),
                value,
            });
        }
        if value < 0.0 && min >= 0.0 {
            return Err(WeightError::Negative {
                name: name.to_string(),
                value,
            });
        }
        if value < min || value > max {
            return Err(WeightError::OutOfRange {
                name: name.to_string(),
                value,
                min,
                max,
            });
        }
        Ok(value)
    }

    /// Check that `value` is finite and non-negative.
    pub fn check_non_negative(name: &str, value: f64) -> Result<f64, WeightError> {
        Self::check_range(name, value, 0.0, f64::MAX)
    }
}
