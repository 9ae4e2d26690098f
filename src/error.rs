use thiserror::Error;

/// Failures surfaced by the pressure solver.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The iterative solver ran out of iterations before the residual
    /// dropped below the configured tolerance. Almost always points at a
    /// broken setup upstream rather than a transient numerical issue, so
    /// it is surfaced as fatal instead of retried.
    #[error("pressure solver exceeded {limit} iterations (residual {residual:.3e})")]
    DivergenceCapExceeded { limit: usize, residual: f64 },
}
