//! Projection orchestration: sequences the halo exchange, the differential
//! operators and the GCR solver into the velocity-correction entry points
//! consumed by the outer time integrator.

use crate::error::ProjectionError;
use crate::field::{ScalarField, VectorField};
use crate::gcr::{Gcr, SolveStats};
use crate::grid::{Axis, Grid};
use crate::operators;

/// Solver configuration, fixed for the life of a [`PressureProjection`].
#[derive(Debug, Clone)]
pub struct ProjectionParams {
    /// Ghost-cell width of every field involved in the solve.
    pub halo: usize,
    /// Number of search directions kept between restarts (the `k` in GCR(k)).
    pub order: usize,
    /// Convergence threshold on the residual max-norm.
    pub tolerance: f64,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            halo: 2,
            order: 2,
            tolerance: 1e-7,
        }
    }
}

/// Corrects a velocity field towards the anelastic constraint by solving
/// the elliptic pressure equation and subtracting the pressure gradient.
///
/// All solver workspace is allocated once, here; the velocity, pressure and
/// right-hand-side fields stay owned by the caller and are mutated in place.
pub struct PressureProjection {
    grid: Grid,
    /// Holds the velocity baseline while the residual is seeded, then the
    /// pressure-gradient correction once a solve has finished.
    correction: VectorField,
    gcr: Gcr,
}

impl PressureProjection {
    pub fn new(grid: &Grid, params: &ProjectionParams) -> Self {
        assert!(
            params.halo >= 2,
            "stencils assume a ghost width of at least two"
        );
        Self {
            grid: grid.clone(),
            correction: VectorField::new(grid, params.halo),
            gcr: Gcr::new(grid, params.halo, params.order, params.tolerance),
        }
    }

    /// Solve the pressure equation for the current velocity field.
    ///
    /// Seeds the residual as `lap(phi) - div(velocity)`, runs GCR to
    /// convergence, then leaves the gradient of the accumulated pressure in
    /// the correction buffer, ready for [`PressureProjection::apply`].
    pub fn update(
        &mut self,
        velocity: &VectorField,
        phi: &mut ScalarField,
    ) -> Result<SolveStats, ProjectionError> {
        for axis in Axis::ALL {
            self.correction
                .component_mut(axis)
                .assign_interior(velocity.component(axis));
        }
        operators::laplacian(
            phi,
            &self.grid,
            Some(&self.correction),
            &mut self.gcr.grad_tmp,
            &mut self.gcr.residual,
        );
        let stats = self.gcr.solve(phi, &self.grid)?;
        phi.exchange_halo();
        operators::gradient(phi, &self.grid, &mut self.correction);
        Ok(stats)
    }

    /// Subtract the pressure-gradient correction from each velocity
    /// component in place. Pure array arithmetic, no iteration.
    pub fn apply(&self, velocity: &mut VectorField) {
        for axis in Axis::ALL {
            velocity
                .component_mut(axis)
                .sub_interior(self.correction.component(axis));
        }
    }

    /// One-time setup before the first time step.
    ///
    /// Removes any divergence from the starting velocity, accumulates the
    /// initial pressure estimate `-(u^2 + w^2)/2` on top of the solved
    /// field, subtracts the domain mean (pressure is only defined up to a
    /// constant), and seeds the implicit predictor accumulator with the
    /// resulting pressure gradient.
    pub fn initialize(
        &mut self,
        velocity: &mut VectorField,
        phi: &mut ScalarField,
        implicit_rhs: &mut VectorField,
    ) -> Result<SolveStats, ProjectionError> {
        phi.fill_interior(0.0);
        let stats = self.update(velocity, phi)?;
        self.apply(velocity);

        for axis in Axis::ALL {
            let component = velocity.component(axis);
            for i in phi.interior_x() {
                for k in phi.interior_z() {
                    phi[(i, k)] -= 0.5 * component[(i, k)] * component[(i, k)];
                }
            }
        }
        let mean = phi.interior_sum() / self.grid.cell_count() as f64;
        phi.offset_interior(-mean);

        phi.exchange_halo();
        operators::gradient(phi, &self.grid, &mut self.correction);
        for axis in Axis::ALL {
            implicit_rhs
                .component_mut(axis)
                .sub_interior(self.correction.component(axis));
        }
        Ok(stats)
    }

    /// Turn the pressure correction into the implicit acceleration term for
    /// the outer predictor-corrector scheme: `rhs = 2 (v_corrected - v) / dt`.
    pub fn finalize_implicit_rhs(
        &mut self,
        velocity: &mut VectorField,
        phi: &mut ScalarField,
        implicit_rhs: &mut VectorField,
        dt: f64,
    ) -> Result<SolveStats, ProjectionError> {
        for axis in Axis::ALL {
            let rhs = implicit_rhs.component_mut(axis);
            rhs.assign_interior(velocity.component(axis));
            rhs.scale_interior(-1.0);
        }
        let stats = self.update(velocity, phi)?;
        self.apply(velocity);
        for axis in Axis::ALL {
            let rhs = implicit_rhs.component_mut(axis);
            rhs.add_scaled_interior(1.0, velocity.component(axis));
            rhs.scale_interior(2.0 / dt);
        }
        Ok(stats)
    }
}
