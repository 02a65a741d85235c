//! Solver configuration
//!
//! One tolerance governs every floating comparison in the pipeline:
//! residual exhaustion inside the max-flow engines, dropping near-zero
//! balances during normalization, the feasibility decision, and saturation
//! tests in the certificate.

use serde::{Deserialize, Serialize};

use crate::algorithm::graph::max_flow::MaxFlowAlgorithm;

/// Default tolerance for flow comparisons
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub tolerance: f64,
    pub algorithm: MaxFlowAlgorithm,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            algorithm: MaxFlowAlgorithm::default(),
        }
    }
}

impl SolverConfig {
    pub fn with_algorithm(mut self, algorithm: MaxFlowAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Tolerance must be finite and positive, got {0}")]
    InvalidTolerance(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SolverConfig::default();
        assert_eq!(config.tolerance, 1e-9);
        assert_eq!(config.algorithm, MaxFlowAlgorithm::Dinic);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let config: SolverConfig = serde_json::from_str(r#"{"algorithm": "push_relabel_fifo"}"#).unwrap();
        assert_eq!(config.algorithm, MaxFlowAlgorithm::PushRelabelFifo);
        assert_eq!(config.tolerance, DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_invalid_tolerance() {
        for tolerance in [0.0, -1e-9, f64::NAN, f64::INFINITY] {
            let config = SolverConfig::default().with_tolerance(tolerance);
            assert!(config.validate().is_err(), "tolerance {} accepted", tolerance);
        }
    }
}
