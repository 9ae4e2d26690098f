//! End-to-end checks of the projection entry points against manufactured
//! fields.

use std::f64::consts::TAU;

use anelastic2d::operators;
use anelastic2d::{
    Axis, Grid, PressureProjection, ProjectionParams, ScalarField, VectorField, MAX_ITERATIONS,
};
use approx::{assert_abs_diff_eq, assert_relative_eq};

const HALO: usize = 2;

fn manufactured_pressure(grid: &Grid) -> ScalarField {
    let mut phi = ScalarField::new(grid, HALO);
    for i in phi.interior_x() {
        for k in phi.interior_z() {
            let x = TAU * (i - HALO) as f64 / grid.nx as f64;
            let z = TAU * (k - HALO) as f64 / grid.nz as f64;
            phi[(i, k)] = x.sin() * z.cos();
        }
    }
    phi
}

fn sheared_velocity(grid: &Grid) -> VectorField {
    let mut velocity = VectorField::new(grid, HALO);
    for axis in Axis::ALL {
        let component = velocity.component_mut(axis);
        for i in component.interior_x() {
            for k in component.interior_z() {
                let x = TAU * (i - HALO) as f64 / grid.nx as f64;
                let z = TAU * (k - HALO) as f64 / grid.nz as f64;
                component[(i, k)] = match axis {
                    Axis::X => (2.0 * x).sin() + 0.3 * z.cos(),
                    Axis::Z => x.cos() * z.sin() - 0.1,
                };
            }
        }
    }
    velocity
}

#[test]
fn recovers_a_manufactured_pressure_field() {
    let grid = Grid::new(32, 32, 1.0, 1.0);
    let mut truth = manufactured_pressure(&grid);
    truth.exchange_halo();
    let mut velocity = VectorField::new(&grid, HALO);
    operators::gradient(&truth, &grid, &mut velocity);

    let params = ProjectionParams {
        halo: HALO,
        order: 4,
        tolerance: 1e-10,
    };
    let mut projection = PressureProjection::new(&grid, &params);
    let mut phi = ScalarField::new(&grid, HALO);
    let stats = projection.update(&velocity, &mut phi).unwrap();
    assert!(stats.residual <= params.tolerance);
    assert!(stats.iterations < MAX_ITERATIONS);
    assert!(stats.initial_residual > stats.residual);

    // Pressure is only defined up to a constant: compare mean-subtracted.
    let mean = phi.interior_sum() / grid.cell_count() as f64;
    let truth_mean = truth.interior_sum() / grid.cell_count() as f64;
    for i in phi.interior_x() {
        for k in phi.interior_z() {
            assert_abs_diff_eq!(
                phi[(i, k)] - mean,
                truth[(i, k)] - truth_mean,
                epsilon = 1e-6
            );
        }
    }

    // The correction equals grad(truth) up to solver tolerance, so applying
    // it leaves an almost quiescent flow.
    projection.apply(&mut velocity);
    for axis in Axis::ALL {
        assert!(velocity.component(axis).interior_max_abs() <= 1e-6);
    }
}

#[test]
fn update_and_apply_remove_the_divergence() {
    let grid = Grid::new(24, 16, 0.5, 1.0);
    let mut velocity = sheared_velocity(&grid);
    let params = ProjectionParams {
        tolerance: 1e-8,
        ..ProjectionParams::default()
    };
    let mut projection = PressureProjection::new(&grid, &params);
    let mut phi = ScalarField::new(&grid, HALO);
    projection.update(&velocity, &mut phi).unwrap();
    projection.apply(&mut velocity);

    let mut exchanged = velocity.clone();
    exchanged.exchange_halos();
    let mut div = ScalarField::new(&grid, HALO);
    operators::divergence(&exchanged, &grid, &mut div);
    assert!(
        div.interior_max_abs() <= 1e-7,
        "max divergence {:.3e}",
        div.interior_max_abs()
    );
}

#[test]
fn initialize_seeds_the_implicit_rhs_with_the_pressure_gradient() {
    let grid = Grid::new(16, 16, 1.0, 1.0);
    let params = ProjectionParams::default();
    let mut projection = PressureProjection::new(&grid, &params);
    let mut velocity = sheared_velocity(&grid);
    let mut phi = ScalarField::new(&grid, HALO);
    let mut implicit_rhs = VectorField::new(&grid, HALO);
    projection
        .initialize(&mut velocity, &mut phi, &mut implicit_rhs)
        .unwrap();

    // initialize leaves phi exchanged, so its gradient can be recomputed
    // directly; the accumulator must hold its negative.
    let mut grad = VectorField::new(&grid, HALO);
    operators::gradient(&phi, &grid, &mut grad);
    for axis in Axis::ALL {
        let rhs = implicit_rhs.component(axis);
        let g = grad.component(axis);
        for i in rhs.interior_x() {
            for k in rhs.interior_z() {
                assert_eq!(rhs[(i, k)], -g[(i, k)]);
            }
        }
    }

    let mean = phi.interior_sum() / grid.cell_count() as f64;
    assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-14);
}

#[test]
fn finalize_returns_twice_the_velocity_increment_over_dt() {
    let grid = Grid::new(16, 16, 2.0, 2.0);
    let params = ProjectionParams::default();
    let mut projection = PressureProjection::new(&grid, &params);
    let mut velocity = sheared_velocity(&grid);
    let before = velocity.clone();
    let mut phi = ScalarField::new(&grid, HALO);
    let mut implicit_rhs = VectorField::new(&grid, HALO);
    let dt = 0.25;
    projection
        .finalize_implicit_rhs(&mut velocity, &mut phi, &mut implicit_rhs, dt)
        .unwrap();

    for axis in Axis::ALL {
        let rhs = implicit_rhs.component(axis);
        let after = velocity.component(axis);
        let prev = before.component(axis);
        for i in rhs.interior_x() {
            for k in rhs.interior_z() {
                let expected = (after[(i, k)] - prev[(i, k)]) * (2.0 / dt);
                assert_relative_eq!(rhs[(i, k)], expected, epsilon = 1e-12);
            }
        }
    }
}
