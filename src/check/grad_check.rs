//! Numerical gradient checks.
//!
//! A centered difference `(f(W + h) - f(W - h)) / 2h` is compared with an
//! analytic gradient entry by entry. Probes are written into a private copy
//! of W and every entry is restored before the next probe.

use rand::Rng;
use tracing::debug;

use crate::error::{Result, SoftmaxLossError};
use crate::math::matrix::Matrix;

/// Default step for centered differences on f64.
pub const DEFAULT_STEP: f64 = 1e-5;

/// One probed entry of W.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradCheckSample {
    pub row: usize,
    pub col: usize,
    pub numerical: f64,
    pub analytic: f64,
    pub rel_error: f64,
}

/// `|a - b| / max(1e-8, |a| + |b|)`
pub fn rel_error(a: f64, b: f64) -> f64 {
    (a - b).abs() / (a.abs() + b.abs()).max(1e-8)
}

/// Centered difference of `f` with respect to the single entry `(row, col)`.
pub fn centered_difference<F>(f: &mut F, w: &mut Matrix, row: usize, col: usize, h: f64) -> Result<f64>
where
    F: FnMut(&Matrix) -> Result<f64>,
{
    let old = w.get(row, col);

    w.set(row, col, old + h);
    let plus = f(&*w);
    w.set(row, col, old - h);
    let minus = f(&*w);
    w.set(row, col, old);

    Ok((plus? - minus?) / (2.0 * h))
}

/// Full numerical gradient of `f` at `w`, one centered difference per entry.
///
/// Costs two evaluations of `f` per entry; meant for small W.
pub fn eval_numerical_gradient<F>(mut f: F, w: &Matrix, h: f64) -> Result<Matrix>
where
    F: FnMut(&Matrix) -> Result<f64>,
{
    let mut probe = w.clone();
    let mut grad = Matrix::zeros(w.rows, w.cols);
    for row in 0..w.rows {
        for col in 0..w.cols {
            grad.data[row][col] = centered_difference(&mut f, &mut probe, row, col, h)?;
        }
    }
    Ok(grad)
}

/// Compares `analytic` with centered differences at `num_checks` randomly
/// chosen entries of `w`.
pub fn grad_check_sparse<F, R>(
    mut f: F,
    w: &Matrix,
    analytic: &Matrix,
    num_checks: usize,
    h: f64,
    rng: &mut R,
) -> Result<Vec<GradCheckSample>>
where
    F: FnMut(&Matrix) -> Result<f64>,
    R: Rng + ?Sized,
{
    if analytic.shape() != w.shape() {
        return Err(SoftmaxLossError::shape_mismatch("analytic gradient vs W", &w.shape(), &analytic.shape()));
    }
    if w.rows == 0 || w.cols == 0 {
        return Ok(Vec::new());
    }

    let mut probe = w.clone();
    let mut samples = Vec::with_capacity(num_checks);
    for _ in 0..num_checks {
        let row = rng.gen_range(0..w.rows);
        let col = rng.gen_range(0..w.cols);

        let numerical = centered_difference(&mut f, &mut probe, row, col, h)?;
        let analytic = analytic.get(row, col);
        let sample = GradCheckSample {
            row,
            col,
            numerical,
            analytic,
            rel_error: rel_error(numerical, analytic),
        };
        debug!(row, col, numerical, analytic, rel_error = sample.rel_error, "gradient check");
        samples.push(sample);
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rel_error() {
        assert_eq!(rel_error(1.0, 1.0), 0.0);
        assert_abs_diff_eq!(rel_error(1.0, 3.0), 0.5);
        // Denominator floor keeps tiny values from blowing up.
        assert_abs_diff_eq!(rel_error(0.0, 1e-10), 1e-2, epsilon = 1e-12);
    }

    #[test]
    fn test_numerical_gradient_of_sum_squares() {
        let w = Matrix::from_data(vec![vec![1.0, -2.0], vec![0.5, 3.0]]).unwrap();
        let grad = eval_numerical_gradient(|m| Ok(m.sum_squares()), &w, DEFAULT_STEP).unwrap();
        assert!(grad.max_abs_diff(&w.scale(2.0)).unwrap() < 1e-6);
    }

    #[test]
    fn test_sparse_check_restores_and_samples() {
        let w = Matrix::random_with(3, 4, &mut StdRng::seed_from_u64(1));
        let before = w.clone();
        let mut rng = StdRng::seed_from_u64(2);
        let samples = grad_check_sparse(|m| Ok(m.sum_squares()), &w, &w.scale(2.0), 6, DEFAULT_STEP, &mut rng).unwrap();
        assert_eq!(samples.len(), 6);
        assert!(samples.iter().all(|s| s.rel_error < 1e-6));
        assert_eq!(w, before);
    }

    #[test]
    fn test_sparse_check_shape_mismatch() {
        let w = Matrix::zeros(2, 2);
        let mut rng = StdRng::seed_from_u64(0);
        let result = grad_check_sparse(|m| Ok(m.sum_squares()), &w, &Matrix::zeros(2, 3), 1, DEFAULT_STEP, &mut rng);
        assert!(matches!(result, Err(SoftmaxLossError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_errors_from_f_propagate() {
        let w = Matrix::zeros(1, 1);
        let result = eval_numerical_gradient(|_| Err(SoftmaxLossError::EmptyBatch), &w, DEFAULT_STEP);
        assert_eq!(result.unwrap_err(), SoftmaxLossError::EmptyBatch);
    }
}
