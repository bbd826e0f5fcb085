//! Dense linear algebra glue over `nalgebra`.
//!
//! State vectors travel through the crate as flat `f64` slices. The helpers here
//! cover what the solver and the model adapters need on top of that: norms, a
//! dense LU solve, and a row-major `N x D` reshape of a flat buffer so that a
//! state of `N` points in `D` dimensions can be read and written point by point.

use nalgebra::{DMatrix, DVector, SVector};

pub fn l2_norm_squared(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>()
}

pub fn l2_norm(values: &[f64]) -> f64 {
    l2_norm_squared(values).sqrt()
}

/// Solves `matrix * x = rhs` by LU decomposition with partial pivoting.
///
/// Returns `None` when the matrix is singular.
pub fn solve_dense(matrix: DMatrix<f64>, rhs: &[f64]) -> Option<DVector<f64>> {
    let rhs = DVector::from_column_slice(rhs);
    matrix.lu().solve(&rhs)
}

/// Number of `D`-rows in a flat buffer viewed as an `N x D` matrix.
pub fn row_count<const D: usize>(buffer: &[f64]) -> usize {
    debug_assert_eq!(buffer.len() % D, 0, "buffer length is not a multiple of {D}");
    buffer.len() / D
}

/// Copies row `index` out of a flat buffer viewed as an `N x D` row-major matrix.
pub fn row<const D: usize>(buffer: &[f64], index: usize) -> SVector<f64, D> {
    SVector::from_column_slice(&buffer[index * D..(index + 1) * D])
}

pub fn set_row<const D: usize>(buffer: &mut [f64], index: usize, value: &SVector<f64, D>) {
    buffer[index * D..(index + 1) * D].copy_from_slice(value.as_slice());
}

pub fn add_to_row<const D: usize>(buffer: &mut [f64], index: usize, value: &SVector<f64, D>) {
    for (entry, v) in buffer[index * D..(index + 1) * D].iter_mut().zip(value.iter()) {
        *entry += v;
    }
}

pub fn scale_row<const D: usize>(buffer: &mut [f64], index: usize, factor: f64) {
    for entry in &mut buffer[index * D..(index + 1) * D] {
        *entry *= factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;

    #[test]
    fn norms_match_euclidean_length() {
        let values = [3.0, 4.0];
        assert_eq!(l2_norm_squared(&values), 25.0);
        assert_eq!(l2_norm(&values), 5.0);
        assert_eq!(l2_norm(&[]), 0.0);
    }

    #[test]
    fn solve_dense_returns_solution() {
        let matrix = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let solution = solve_dense(matrix, &[3.0, 5.0]).expect("system should be solvable");
        assert!((solution[0] - 0.8).abs() < 1e-12);
        assert!((solution[1] - 1.4).abs() < 1e-12);
    }

    #[test]
    fn solve_dense_reports_singular_matrix() {
        let matrix = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        assert!(solve_dense(matrix, &[1.0, 1.0]).is_none());
    }

    #[test]
    fn rows_are_row_major_views() {
        let mut buffer = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert_eq!(row_count::<2>(&buffer), 3);
        assert_eq!(row::<2>(&buffer, 1), Vector2::new(3.0, 4.0));

        set_row(&mut buffer, 2, &Vector2::new(-1.0, -2.0));
        add_to_row(&mut buffer, 0, &Vector2::new(10.0, 10.0));
        scale_row::<2>(&mut buffer, 1, 0.5);

        assert_eq!(buffer, vec![11.0, 12.0, 1.5, 2.0, -1.0, -2.0]);
    }
}
