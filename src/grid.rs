/// The two axes of the domain. Velocity components, spacings and staggering
/// offsets are all keyed by this instead of by name, so a missing or
/// misspelled component cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal, axis 0 (the "u" component).
    X,
    /// Vertical, axis 1 (the "w" component).
    Z,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::X, Axis::Z];
}

/// A uniform 2D grid, periodic in both axes. `nx`/`nz` count interior cells;
/// ghost cells are a property of the fields, not of the grid.
#[derive(Clone)]
pub struct Grid {
    pub nx: usize,
    pub nz: usize,
    pub dx: f64,
    pub dz: f64,
}

impl Grid {
    pub fn new(nx: usize, nz: usize, dx: f64, dz: f64) -> Self {
        assert!(nx > 0 && nz > 0, "grid must have at least one cell per axis");
        assert!(dx > 0.0 && dz > 0.0, "grid spacing must be positive");
        Self { nx, nz, dx, dz }
    }

    pub fn cells(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.nx,
            Axis::Z => self.nz,
        }
    }

    pub fn spacing(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.dx,
            Axis::Z => self.dz,
        }
    }

    /// Number of interior cells in the whole domain.
    pub fn cell_count(&self) -> usize {
        self.nx * self.nz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_fields() {
        let grid = Grid::new(8, 4, 0.5, 2.0);
        assert_eq!(grid.cells(Axis::X), 8);
        assert_eq!(grid.cells(Axis::Z), 4);
        assert_eq!(grid.spacing(Axis::X), 0.5);
        assert_eq!(grid.spacing(Axis::Z), 2.0);
        assert_eq!(grid.cell_count(), 32);
    }

    #[test]
    #[should_panic(expected = "spacing")]
    fn rejects_zero_spacing() {
        Grid::new(8, 8, 0.0, 1.0);
    }
}
