//! Periodic halo exchange over a padded, row-major buffer.

/// Fill the ghost bands of a padded array by periodic wraparound.
///
/// `rows` and `cols` are the padded extents and `width` the number of ghost
/// rows/columns on each side. Rows are exchanged first, columns second, so
/// the corner blocks end up wrapped along both axes. Calling this twice
/// without touching the interior leaves the buffer unchanged.
///
/// Callers must keep `width` at or below half the interior extent; that is
/// checked once when a solver is configured, not here.
pub fn exchange(data: &mut [f64], rows: usize, cols: usize, width: usize) {
    debug_assert_eq!(data.len(), rows * cols);
    debug_assert!(4 * width <= rows && 4 * width <= cols);

    // Leading ghost rows take the last interior band, trailing ghost rows
    // take the first.
    data.copy_within((rows - 2 * width) * cols..(rows - width) * cols, 0);
    data.copy_within(width * cols..2 * width * cols, (rows - width) * cols);

    // Same per row for the columns, ghost rows included.
    for r in 0..rows {
        let row = &mut data[r * cols..(r + 1) * cols];
        row.copy_within(cols - 2 * width..cols - width, 0);
        row.copy_within(width..2 * width, cols - width);
    }
}
