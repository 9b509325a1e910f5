use thiserror::Error;

/// Errors from router configuration and point parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("alignment threshold must be finite and non-negative, got {0}")]
    InvalidThreshold(f64),

    #[error("curvature must be finite, got {0}")]
    InvalidCurvature(f64),

    #[error("invalid point '{0}': expected 'x,y'")]
    InvalidPoint(String),
}
