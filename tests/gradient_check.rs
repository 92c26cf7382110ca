//! Numerical gradient checks for the softmax loss.
//!
//! For each probed weight `w` the analytic gradient from the loss functions is
//! compared with the centered difference `(L(w+h) - L(w-h)) / 2h`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use softmax_loss::check::grad_check::DEFAULT_STEP;
use softmax_loss::{
    eval_numerical_gradient, grad_check_sparse, softmax_loss, LossStrategy, Matrix,
};

/// Maximum allowed relative error between analytic and numerical gradients.
const MAX_RELATIVE_ERROR: f64 = 1e-5;

/// For gradients this small, compare absolute error instead.
const SMALL_GRAD_THRESHOLD: f64 = 1e-4;

const MAX_ABSOLUTE_ERROR: f64 = 1e-8;

fn random_problem(seed: u64, n: usize, d: usize, c: usize) -> (Matrix, Matrix, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let w = Matrix::gaussian_with(d, c, 0.1, &mut rng);
    let x = Matrix::random_with(n, d, &mut rng);
    let y = (0..n).map(|_| rng.gen_range(0..c)).collect();
    (w, x, y)
}

fn check_passes(analytic: f64, numerical: f64) -> bool {
    if analytic.abs().max(numerical.abs()) < SMALL_GRAD_THRESHOLD {
        (analytic - numerical).abs() < MAX_ABSOLUTE_ERROR
    } else {
        softmax_loss::rel_error(analytic, numerical) < MAX_RELATIVE_ERROR
    }
}

fn run_sparse_check(strategy: LossStrategy, reg: f64, seed: u64) {
    let (w, x, y) = random_problem(seed, 30, 12, 5);
    let (_, grad) = softmax_loss(strategy, &w, &x, &y, reg).unwrap();

    let mut rng = StdRng::seed_from_u64(seed + 1);
    let samples = grad_check_sparse(
        |probe| softmax_loss(strategy, probe, &x, &y, reg).map(|(loss, _)| loss),
        &w,
        &grad,
        20,
        DEFAULT_STEP,
        &mut rng,
    )
    .unwrap();

    assert_eq!(samples.len(), 20);
    for s in samples {
        assert!(
            check_passes(s.analytic, s.numerical),
            "{strategy:?} reg={reg}: W[{}][{}] analytic={} numerical={} rel_error={}",
            s.row, s.col, s.analytic, s.numerical, s.rel_error
        );
    }
}

#[test]
fn test_gradient_check_naive_without_reg() {
    run_sparse_check(LossStrategy::Naive, 0.0, 10);
}

#[test]
fn test_gradient_check_naive_with_reg() {
    run_sparse_check(LossStrategy::Naive, 5.0, 20);
}

#[test]
fn test_gradient_check_vectorized_without_reg() {
    run_sparse_check(LossStrategy::Vectorized, 0.0, 30);
}

#[test]
fn test_gradient_check_vectorized_with_reg() {
    run_sparse_check(LossStrategy::Vectorized, 5.0, 40);
}

#[test]
fn test_full_numerical_gradient_matches() {
    let (w, x, y) = random_problem(7, 8, 4, 3);
    for strategy in LossStrategy::ALL {
        let (_, grad) = softmax_loss(strategy, &w, &x, &y, 0.5).unwrap();
        let numerical = eval_numerical_gradient(
            |probe| softmax_loss(strategy, probe, &x, &y, 0.5).map(|(loss, _)| loss),
            &w,
            DEFAULT_STEP,
        )
        .unwrap();
        assert!(grad.max_abs_diff(&numerical).unwrap() < 1e-8, "{strategy:?}");
    }
}
