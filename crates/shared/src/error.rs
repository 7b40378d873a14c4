#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("trial {trial} never exceeded {threshold} within {max_draws} draws")]
    Truncation {
        trial: usize,
        max_draws: usize,
        threshold: f64,
    },
    #[error("{what} = {value} exceeds the representable maximum {max}")]
    Overflow {
        what: &'static str,
        value: u128,
        max: u128,
    },
    #[error("category {category} is outside 1..={population_size}")]
    UnknownCategory {
        category: usize,
        population_size: usize,
    },
}

impl SimError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Rejects zero for a count-like parameter.
pub fn require_positive(name: &'static str, value: usize) -> Result<(), SimError> {
    if value == 0 {
        return Err(SimError::invalid(name, "must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert!(require_positive("n_trials", 1).is_ok());
        let err = require_positive("n_trials", 0).unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { name: "n_trials", .. }));
    }

    #[test]
    fn test_messages() {
        let err = SimError::Truncation {
            trial: 3,
            max_draws: 1,
            threshold: 1.0,
        };
        assert_eq!(err.to_string(), "trial 3 never exceeded 1 within 1 draws");

        let err = SimError::UnknownCategory {
            category: 60,
            population_size: 59,
        };
        assert_eq!(err.to_string(), "category 60 is outside 1..=59");
    }
}
