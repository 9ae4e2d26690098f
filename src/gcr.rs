//! Restarted truncated Krylov solver (GCR(k)) for the discrete pressure
//! equation.
//!
//! The solver is matrix-free: its only access to the operator is through
//! [`operators::laplacian`]. It keeps a bank of `k` search directions
//! together with their Laplacian images, A-orthogonalizes each new candidate
//! against the live slots, and restarts by folding the whole bank back into
//! slot 0 once the bank is full.

use log::debug;

use crate::error::ProjectionError;
use crate::field::{ScalarField, VectorField};
use crate::grid::Grid;
use crate::operators;

/// Hard cap on iterations per solve. Exceeding it almost always means the
/// problem setup is structurally broken, so the solve aborts rather than
/// retrying.
pub const MAX_ITERATIONS: usize = 10_000;

/// Outcome of one converged pressure solve.
#[derive(Debug, Clone, Copy)]
pub struct SolveStats {
    /// Completed method steps (not restart cycles).
    pub iterations: usize,
    /// Residual max-norm before the first step.
    pub initial_residual: f64,
    /// Residual max-norm when the solve stopped.
    pub residual: f64,
}

/// Solver workspace: the direction bank plus the residual and Laplacian
/// scratch fields. Allocated once per simulation and reused across calls;
/// nothing here reallocates during a solve.
pub(crate) struct Gcr {
    order: usize,
    tolerance: f64,
    /// Current step length. A degenerate (zero-image) direction keeps the
    /// previous value; a fresh solve starts from zero.
    beta: f64,
    dirs: Vec<ScalarField>,
    images: Vec<ScalarField>,
    denoms: Vec<f64>,
    alphas: Vec<f64>,
    /// Residual of the pressure equation. Seeded by the caller before
    /// [`Gcr::solve`], mutated every step.
    pub(crate) residual: ScalarField,
    lap_res: ScalarField,
    /// Gradient scratch shared with the orchestration layer.
    pub(crate) grad_tmp: VectorField,
}

impl Gcr {
    pub(crate) fn new(grid: &Grid, halo: usize, order: usize, tolerance: f64) -> Self {
        assert!(order >= 1, "GCR needs at least one search direction");
        Self {
            order,
            tolerance,
            beta: 0.0,
            dirs: (0..order).map(|_| ScalarField::new(grid, halo)).collect(),
            images: (0..order).map(|_| ScalarField::new(grid, halo)).collect(),
            denoms: vec![1.0; order],
            alphas: vec![1.0; order],
            residual: ScalarField::new(grid, halo),
            lap_res: ScalarField::new(grid, halo),
            grad_tmp: VectorField::new(grid, halo),
        }
    }

    /// Run GCR(k) until the residual max-norm drops to the tolerance,
    /// accumulating the correction into `phi`. `self.residual` must already
    /// hold the residual of the equation at the current `phi`.
    pub(crate) fn solve(
        &mut self,
        phi: &mut ScalarField,
        grid: &Grid,
    ) -> Result<SolveStats, ProjectionError> {
        self.beta = 0.0;
        self.dirs[0].assign_interior(&self.residual);
        operators::laplacian(
            &mut self.dirs[0],
            grid,
            None,
            &mut self.grad_tmp,
            &mut self.images[0],
        );
        let initial_residual = self.residual.interior_max_abs();
        let mut iterations = 0;
        loop {
            self.alphas.fill(1.0);
            self.denoms.fill(1.0);
            for v in 0..self.order {
                let residual_norm = self.step(v, phi, grid);
                iterations += 1;
                if residual_norm <= self.tolerance {
                    debug!(
                        "pressure solve converged: {iterations} iterations, \
                         residual {initial_residual:.3e} -> {residual_norm:.3e}"
                    );
                    return Ok(SolveStats {
                        iterations,
                        initial_residual,
                        residual: residual_norm,
                    });
                }
                if iterations >= MAX_ITERATIONS {
                    return Err(ProjectionError::DivergenceCapExceeded {
                        limit: MAX_ITERATIONS,
                        residual: residual_norm,
                    });
                }
            }
        }
    }

    /// One method step at cycle position `v`: advance `phi` and the residual
    /// along direction `v`, re-orthogonalize against the live slots, then
    /// either write the next slot or fold the bank into slot 0 when the
    /// cycle is exhausted. Returns the residual max-norm after the update.
    fn step(&mut self, v: usize, phi: &mut ScalarField, grid: &Grid) -> f64 {
        self.denoms[v] = self.images[v].interior_norm_sq();
        // Zero-norm image: degenerate direction, keep the previous step
        // length and carry on with the rest of the step.
        if self.denoms[v] != 0.0 {
            self.beta = -self.residual.interior_dot(&self.images[v]) / self.denoms[v];
        }
        phi.add_scaled_interior(self.beta, &self.dirs[v]);
        self.residual.add_scaled_interior(self.beta, &self.images[v]);
        let residual_norm = self.residual.interior_max_abs();

        operators::laplacian(
            &mut self.residual,
            grid,
            None,
            &mut self.grad_tmp,
            &mut self.lap_res,
        );
        for l in 0..v {
            if self.denoms[l] != 0.0 {
                self.alphas[l] = -self.lap_res.interior_dot(&self.images[l]) / self.denoms[l];
            }
        }

        if v + 1 < self.order {
            let (head, tail) = self.dirs.split_at_mut(v + 1);
            tail[0].assign_interior(&self.residual);
            for l in 0..v {
                tail[0].add_scaled_interior(self.alphas[l], &head[l]);
            }
            let (head, tail) = self.images.split_at_mut(v + 1);
            tail[0].assign_interior(&self.lap_res);
            for l in 0..v {
                tail[0].add_scaled_interior(self.alphas[l], &head[l]);
            }
        } else {
            // Restart: fold every slot into slot 0. Slot 0's old value is
            // consumed by the scale before anything else is accumulated,
            // and the just-computed direction enters with weight one.
            let (first, rest) = self.dirs.split_at_mut(1);
            first[0].scale_interior(self.alphas[0]);
            first[0].add_scaled_interior(1.0, &self.residual);
            for l in 1..=v {
                first[0].add_scaled_interior(self.alphas[l], &rest[l - 1]);
            }
            let (first, rest) = self.images.split_at_mut(1);
            first[0].scale_interior(self.alphas[0]);
            first[0].add_scaled_interior(1.0, &self.lap_res);
            for l in 1..=v {
                first[0].add_scaled_interior(self.alphas[l], &rest[l - 1]);
            }
        }
        residual_norm
    }
}
