//! Anelastic pressure projection on a periodic 2D staggered grid.
//!
//! Corrects a velocity field towards the anelastic incompressibility
//! constraint: solve the elliptic pressure equation with a matrix-free
//! restarted Krylov method (GCR(k)), then subtract the pressure gradient
//! from the velocity. Also carries the glue an outer predictor-corrector
//! integrator needs: implicit right-hand-side handling, advector
//! construction from stashed velocities, and buoyancy forcing.

pub mod coupling;
pub mod error;
pub mod field;
pub mod gcr;
pub mod grid;
pub mod halo;
pub mod operators;
pub mod projection;

pub use error::ProjectionError;
pub use field::{ScalarField, VectorField};
pub use gcr::{SolveStats, MAX_ITERATIONS};
pub use grid::{Axis, Grid};
pub use projection::{PressureProjection, ProjectionParams};
