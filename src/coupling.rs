//! Glue between the projection core and the outer predictor-corrector
//! integrator: implicit right-hand-side application, advector (Courant
//! number) construction from stashed velocities, and forcing helpers.

use crate::field::{ScalarField, VectorField};
use crate::grid::{Axis, Grid};

/// Fold the implicit predictor term into the velocity half a step at a
/// time and reset the accumulator: `v += dt/2 * rhs`, then `rhs = 0`.
pub fn apply_implicit_rhs(velocity: &mut VectorField, implicit_rhs: &mut VectorField, dt: f64) {
    for axis in Axis::ALL {
        velocity
            .component_mut(axis)
            .add_scaled_interior(0.5 * dt, implicit_rhs.component(axis));
        implicit_rhs.component_mut(axis).fill_interior(0.0);
    }
}

/// Snapshot the current velocity into the stash used for advector
/// extrapolation, ghost cells included.
pub fn stash_velocity(stash: &mut VectorField, velocity: &VectorField) {
    for axis in Axis::ALL {
        stash
            .component_mut(axis)
            .assign_interior(velocity.component(axis));
    }
    stash.exchange_halos();
}

/// Extrapolate the stashed velocity to the midpoint of the upcoming step,
/// second order in time: `stash = 1.5 * v - 0.5 * stash`.
pub fn extrapolate_in_time(stash: &mut VectorField, velocity: &VectorField) {
    for axis in Axis::ALL {
        let s = stash.component_mut(axis);
        s.scale_interior(-0.5);
        s.add_scaled_interior(1.5, velocity.component(axis));
    }
    stash.exchange_halos();
}

/// Advector components on cell faces, covering the full padded extent. The
/// component along an axis sits between adjacent cells of that axis, so it
/// is one sample shorter along its own axis than the padded scalar layout.
#[derive(Clone)]
pub struct CourantField {
    x: Vec<f64>,
    z: Vec<f64>,
    padded_nx: usize,
    padded_nz: usize,
}

impl CourantField {
    pub fn new(grid: &Grid, halo: usize) -> Self {
        let padded_nx = grid.nx + 2 * halo;
        let padded_nz = grid.nz + 2 * halo;
        Self {
            x: vec![0.0; (padded_nx - 1) * padded_nz],
            z: vec![0.0; padded_nx * (padded_nz - 1)],
            padded_nx,
            padded_nz,
        }
    }

    /// Face value between padded cells `(i, k)` and `(i + 1, k)`.
    pub fn x(&self, i: usize, k: usize) -> f64 {
        self.x[i * self.padded_nz + k]
    }

    /// Face value between padded cells `(i, k)` and `(i, k + 1)`.
    pub fn z(&self, i: usize, k: usize) -> f64 {
        self.z[i * (self.padded_nz - 1) + k]
    }

    /// Largest Courant magnitude over both components, the usual CFL
    /// diagnostic.
    pub fn max_abs(&self) -> f64 {
        let mut max = 0.0_f64;
        for value in self.x.iter().chain(&self.z) {
            max = max.max(value.abs());
        }
        max
    }
}

/// Build the advector from the stashed midpoint velocity: interpolate each
/// component to the faces of its own axis and scale to a Courant number by
/// `dt / spacing`. The stash must have freshly exchanged halos.
pub fn interpolate_to_faces(courant: &mut CourantField, stash: &VectorField, dt: f64, grid: &Grid) {
    let sx = stash.component(Axis::X);
    let factor = dt / grid.spacing(Axis::X);
    for i in 0..courant.padded_nx - 1 {
        for k in 0..courant.padded_nz {
            courant.x[i * courant.padded_nz + k] =
                factor * ((sx[(i + 1, k)] - sx[(i, k)]) / 2.0 + sx[(i, k)]);
        }
    }
    let sz = stash.component(Axis::Z);
    let factor = dt / grid.spacing(Axis::Z);
    for i in 0..courant.padded_nx {
        for k in 0..courant.padded_nz - 1 {
            courant.z[i * (courant.padded_nz - 1) + k] =
                factor * ((sz[(i, k + 1)] - sz[(i, k)]) / 2.0 + sz[(i, k)]);
        }
    }
}

/// Half-step forcing update for a single velocity component:
/// `v += dt/2 * rhs`.
pub fn apply_half_forcing(component: &mut ScalarField, rhs: &ScalarField, dt: f64) {
    component.add_scaled_interior(0.5 * dt, rhs);
}

/// Accumulate the buoyancy source into the vertical-velocity forcing:
/// `rhs_w += g * (tht - tht_ref) / tht_ref`.
pub fn add_buoyancy(rhs_w: &mut ScalarField, tht: &ScalarField, tht_ref: f64, g: f64) {
    debug_assert_eq!(
        (rhs_w.nx(), rhs_w.nz(), rhs_w.halo()),
        (tht.nx(), tht.nz(), tht.halo())
    );
    for i in rhs_w.interior_x() {
        for k in rhs_w.interior_z() {
            rhs_w[(i, k)] += g * (tht[(i, k)] - tht_ref) / tht_ref;
        }
    }
}
