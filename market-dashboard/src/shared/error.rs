use thiserror::Error;

/// All errors generated in `market-dashboard`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    #[error("invalid jitter magnitude {0}: must be a finite number greater than zero")]
    InvalidMagnitude(f64),

    #[error("invalid transaction probability {0}: must be within (0, 1]")]
    InvalidProbability(f64),

    #[error("render target not found: {0}")]
    TargetNotFound(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DashboardError {
    /// Determine if an error only affects a single view update, so the rest of
    /// a refresh cycle can carry on.
    #[allow(clippy::match_like_matches_macro)]
    pub fn is_recoverable(&self) -> bool {
        match self {
            DashboardError::TargetNotFound(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_error_is_recoverable() {
        struct TestCase {
            input: DashboardError,
            expected: bool,
        }

        let tests = vec![
            TestCase {
                // TC0: missing render target only skips one update
                input: DashboardError::TargetNotFound("stock-table-body".to_string()),
                expected: true,
            },
            TestCase {
                // TC1: bad jitter magnitude is a caller bug
                input: DashboardError::InvalidMagnitude(-1.0),
                expected: false,
            },
            TestCase {
                // TC2: bad probability is a caller bug
                input: DashboardError::InvalidProbability(0.0),
                expected: false,
            },
            TestCase {
                // TC3: configuration errors abort start-up
                input: DashboardError::Config("DASHBOARD_FAST_CYCLE_SECS".to_string()),
                expected: false,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = test.input.is_recoverable();
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            DashboardError::TargetNotFound("business-grid".to_string()).to_string(),
            "render target not found: business-grid"
        );
    }
}
