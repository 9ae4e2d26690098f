use std::ops::{Index, IndexMut};

use crate::grid::{Axis, Grid};
use crate::halo;

/// A scalar field stored as a padded, row-major buffer. The interior is the
/// `nx × nz` block offset by the halo width on every side; the ghost bands
/// around it are refreshed by [`ScalarField::exchange_halo`]. Indexing is in
/// padded coordinates: `field[(i, k)]` with `i` along [`Axis::X`] and `k`
/// along [`Axis::Z`].
///
/// Buffers are allocated here, once, and mutated in place everywhere else;
/// nothing in the solve path reallocates.
#[derive(Clone)]
pub struct ScalarField {
    data: Vec<f64>,
    nx: usize,
    nz: usize,
    halo: usize,
}

impl ScalarField {
    pub fn new(grid: &Grid, halo: usize) -> Self {
        assert!(halo >= 1, "stencils need at least one ghost cell");
        assert!(
            2 * halo <= grid.nx && 2 * halo <= grid.nz,
            "halo width {halo} exceeds half the interior extent ({}x{})",
            grid.nx,
            grid.nz
        );
        let data = vec![0.0; (grid.nx + 2 * halo) * (grid.nz + 2 * halo)];
        Self {
            data,
            nx: grid.nx,
            nz: grid.nz,
            halo,
        }
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn nz(&self) -> usize {
        self.nz
    }

    pub fn halo(&self) -> usize {
        self.halo
    }

    pub fn padded_nx(&self) -> usize {
        self.nx + 2 * self.halo
    }

    pub fn padded_nz(&self) -> usize {
        self.nz + 2 * self.halo
    }

    /// Padded row indices covering the interior.
    pub fn interior_x(&self) -> std::ops::Range<usize> {
        self.halo..self.halo + self.nx
    }

    /// Padded column indices covering the interior.
    pub fn interior_z(&self) -> std::ops::Range<usize> {
        self.halo..self.halo + self.nz
    }

    /// Refresh the ghost bands by periodic wraparound.
    pub fn exchange_halo(&mut self) {
        let (rows, cols) = (self.padded_nx(), self.padded_nz());
        halo::exchange(&mut self.data, rows, cols, self.halo);
    }

    #[inline]
    fn pitch(&self) -> usize {
        self.nz + 2 * self.halo
    }

    #[inline]
    fn interior_row(&self, i: usize) -> &[f64] {
        let start = i * self.pitch() + self.halo;
        &self.data[start..start + self.nz]
    }

    #[inline]
    fn interior_row_mut(&mut self, i: usize) -> &mut [f64] {
        let start = i * self.pitch() + self.halo;
        let nz = self.nz;
        &mut self.data[start..start + nz]
    }

    fn assert_same_shape(&self, other: &ScalarField) {
        debug_assert_eq!(
            (self.nx, self.nz, self.halo),
            (other.nx, other.nz, other.halo),
            "fields must share interior shape and halo width"
        );
    }

    pub fn fill_interior(&mut self, value: f64) {
        for i in self.interior_x() {
            self.interior_row_mut(i).fill(value);
        }
    }

    pub fn assign_interior(&mut self, src: &ScalarField) {
        self.assert_same_shape(src);
        for i in self.interior_x() {
            let start = i * self.pitch() + self.halo;
            let nz = self.nz;
            self.data[start..start + nz].copy_from_slice(src.interior_row(i));
        }
    }

    pub fn scale_interior(&mut self, factor: f64) {
        for i in self.interior_x() {
            for value in self.interior_row_mut(i) {
                *value *= factor;
            }
        }
    }

    /// `self += coef * src` over the interior.
    pub fn add_scaled_interior(&mut self, coef: f64, src: &ScalarField) {
        self.assert_same_shape(src);
        for i in self.interior_x() {
            let start = i * self.pitch() + self.halo;
            let nz = self.nz;
            for (dst, s) in self.data[start..start + nz].iter_mut().zip(src.interior_row(i)) {
                *dst += coef * s;
            }
        }
    }

    pub fn sub_interior(&mut self, src: &ScalarField) {
        self.assert_same_shape(src);
        for i in self.interior_x() {
            let start = i * self.pitch() + self.halo;
            let nz = self.nz;
            for (dst, s) in self.data[start..start + nz].iter_mut().zip(src.interior_row(i)) {
                *dst -= s;
            }
        }
    }

    /// Add a constant to every interior cell.
    pub fn offset_interior(&mut self, delta: f64) {
        for i in self.interior_x() {
            for value in self.interior_row_mut(i) {
                *value += delta;
            }
        }
    }

    /// Interior dot product, accumulated sequentially in row-major order so
    /// results are reproducible run to run.
    pub fn interior_dot(&self, other: &ScalarField) -> f64 {
        self.assert_same_shape(other);
        let mut acc = 0.0;
        for i in self.interior_x() {
            for (a, b) in self.interior_row(i).iter().zip(other.interior_row(i)) {
                acc += a * b;
            }
        }
        acc
    }

    pub fn interior_norm_sq(&self) -> f64 {
        let mut acc = 0.0;
        for i in self.interior_x() {
            for value in self.interior_row(i) {
                acc += value * value;
            }
        }
        acc
    }

    pub fn interior_max_abs(&self) -> f64 {
        let mut max = 0.0_f64;
        for i in self.interior_x() {
            for value in self.interior_row(i) {
                max = max.max(value.abs());
            }
        }
        max
    }

    pub fn interior_sum(&self) -> f64 {
        let mut acc = 0.0;
        for i in self.interior_x() {
            for value in self.interior_row(i) {
                acc += value;
            }
        }
        acc
    }
}

impl Index<(usize, usize)> for ScalarField {
    type Output = f64;

    #[inline]
    fn index(&self, (i, k): (usize, usize)) -> &f64 {
        &self.data[i * self.pitch() + k]
    }
}

impl IndexMut<(usize, usize)> for ScalarField {
    #[inline]
    fn index_mut(&mut self, (i, k): (usize, usize)) -> &mut f64 {
        let pitch = self.pitch();
        &mut self.data[i * pitch + k]
    }
}

/// Two scalar components indexed by [`Axis`]. Stands in for a velocity
/// field, a gradient image, or the implicit right-hand-side accumulator.
#[derive(Clone)]
pub struct VectorField {
    x: ScalarField,
    z: ScalarField,
}

impl VectorField {
    pub fn new(grid: &Grid, halo: usize) -> Self {
        Self {
            x: ScalarField::new(grid, halo),
            z: ScalarField::new(grid, halo),
        }
    }

    pub fn component(&self, axis: Axis) -> &ScalarField {
        match axis {
            Axis::X => &self.x,
            Axis::Z => &self.z,
        }
    }

    pub fn component_mut(&mut self, axis: Axis) -> &mut ScalarField {
        match axis {
            Axis::X => &mut self.x,
            Axis::Z => &mut self.z,
        }
    }

    pub fn exchange_halos(&mut self) {
        self.x.exchange_halo();
        self.z.exchange_halo();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid() -> Grid {
        Grid::new(4, 6, 1.0, 1.0)
    }

    #[test]
    fn interior_ranges_skip_the_halo() {
        let f = ScalarField::new(&grid(), 2);
        assert_eq!(f.padded_nx(), 8);
        assert_eq!(f.padded_nz(), 10);
        assert_eq!(f.interior_x(), 2..6);
        assert_eq!(f.interior_z(), 2..8);
    }

    #[test]
    fn elementwise_helpers_touch_only_the_interior() {
        let g = grid();
        let mut a = ScalarField::new(&g, 2);
        let mut b = ScalarField::new(&g, 2);
        a.fill_interior(2.0);
        b.fill_interior(3.0);
        b.add_scaled_interior(-0.5, &a);
        for i in b.interior_x() {
            for k in b.interior_z() {
                assert_eq!(b[(i, k)], 2.0);
            }
        }
        // Ghost cells were never written.
        assert_eq!(b[(0, 0)], 0.0);
        assert_eq!(a[(7, 9)], 0.0);

        b.scale_interior(2.0);
        b.sub_interior(&a);
        b.offset_interior(1.0);
        assert_eq!(b[(2, 2)], 3.0);
    }

    #[test]
    fn reductions_match_hand_computed_values() {
        let g = Grid::new(2, 2, 1.0, 1.0);
        let mut f = ScalarField::new(&g, 1);
        f[(1, 1)] = 1.0;
        f[(1, 2)] = -2.0;
        f[(2, 1)] = 3.0;
        f[(2, 2)] = -4.0;
        assert_relative_eq!(f.interior_sum(), -2.0);
        assert_relative_eq!(f.interior_norm_sq(), 30.0);
        assert_relative_eq!(f.interior_max_abs(), 4.0);
        let other = f.clone();
        assert_relative_eq!(f.interior_dot(&other), 30.0);
    }

    #[test]
    fn exchange_halo_wraps_periodically() {
        let g = grid();
        let mut f = ScalarField::new(&g, 2);
        for i in f.interior_x() {
            for k in f.interior_z() {
                f[(i, k)] = (i * 100 + k) as f64;
            }
        }
        f.exchange_halo();
        // Ghost column left of the interior holds the rightmost interior
        // columns, and vice versa.
        for i in f.interior_x() {
            assert_eq!(f[(i, 0)], f[(i, f.nz())]);
            assert_eq!(f[(i, 1)], f[(i, f.nz() + 1)]);
            assert_eq!(f[(i, f.nz() + 2)], f[(i, 2)]);
        }
        for k in f.interior_z() {
            assert_eq!(f[(0, k)], f[(f.nx(), k)]);
            assert_eq!(f[(f.nx() + 2, k)], f[(2, k)]);
        }
    }

    #[test]
    fn vector_components_are_independent() {
        let g = grid();
        let mut v = VectorField::new(&g, 2);
        v.component_mut(Axis::X).fill_interior(1.0);
        v.component_mut(Axis::Z).fill_interior(-1.0);
        assert_eq!(v.component(Axis::X)[(2, 2)], 1.0);
        assert_eq!(v.component(Axis::Z)[(2, 2)], -1.0);
    }
}
