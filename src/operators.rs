//! Centered finite-difference operators over padded fields.
//!
//! Every operator reads neighbours straight from the padded buffer, so the
//! caller (or the operator itself, where noted) must have exchanged halos
//! first. Results are written into interior cells only; ghost cells of the
//! output are left stale until its next exchange.

use crate::field::{ScalarField, VectorField};
use crate::grid::{Axis, Grid};

/// Centered gradient of `phi`, one component per axis:
/// `out.x = (phi[i+1] - phi[i-1]) / (2 dx)` and likewise along z.
///
/// `phi` must have freshly exchanged halos.
pub fn gradient(phi: &ScalarField, grid: &Grid, out: &mut VectorField) {
    let inv_2dx = 1.0 / (2.0 * grid.dx);
    let inv_2dz = 1.0 / (2.0 * grid.dz);
    let gx = out.component_mut(Axis::X);
    for i in phi.interior_x() {
        for k in phi.interior_z() {
            gx[(i, k)] = (phi[(i + 1, k)] - phi[(i - 1, k)]) * inv_2dx;
        }
    }
    let gz = out.component_mut(Axis::Z);
    for i in phi.interior_x() {
        for k in phi.interior_z() {
            gz[(i, k)] = (phi[(i, k + 1)] - phi[(i, k - 1)]) * inv_2dz;
        }
    }
}

/// Centered divergence of a vector field:
/// `out = d(v.x)/dx + d(v.z)/dz`, both derivatives over two grid spacings.
///
/// Both components of `v` must have freshly exchanged halos.
pub fn divergence(v: &VectorField, grid: &Grid, out: &mut ScalarField) {
    let inv_2dx = 1.0 / (2.0 * grid.dx);
    let inv_2dz = 1.0 / (2.0 * grid.dz);
    let vx = v.component(Axis::X);
    let vz = v.component(Axis::Z);
    for i in out.interior_x() {
        for k in out.interior_z() {
            out[(i, k)] = (vx[(i + 1, k)] - vx[(i - 1, k)]) * inv_2dx
                + (vz[(i, k + 1)] - vz[(i, k - 1)]) * inv_2dz;
        }
    }
}

/// Wide Laplacian built as divergence of the centered gradient, with each
/// derivative spanning two grid spacings. With `baseline` present the
/// gradient is shifted by that field before the divergence, which yields
/// `lap(phi) - div(baseline)` in one pass.
///
/// Exchanges `phi` and the intermediate gradient itself; `baseline` is read
/// through its interior only, so its ghost cells may be stale.
pub fn laplacian(
    phi: &mut ScalarField,
    grid: &Grid,
    baseline: Option<&VectorField>,
    tmp: &mut VectorField,
    out: &mut ScalarField,
) {
    phi.exchange_halo();
    gradient(phi, grid, tmp);
    if let Some(base) = baseline {
        for axis in Axis::ALL {
            tmp.component_mut(axis).sub_interior(base.component(axis));
        }
    }
    tmp.exchange_halos();
    divergence(tmp, grid, out);
}
