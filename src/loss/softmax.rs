//! Softmax cross-entropy loss with L2 regularization.
//!
//! Shapes: `W` is D×C, `X` is N×D, `y` holds N class indices in `[0, C)`.
//! Both entry points return
//!
//! ```text
//! loss = -1/N · Σ_i ln(softmax(X·W)[i, y[i]])  +  reg/2 · Σ W²
//! dW   = Xᵀ · (softmax(X·W) - one_hot(y)) / N  +  reg · W
//! ```
//!
//! `softmax_loss_naive` accumulates the per-example terms in explicit loops
//! and exists as a reference for `softmax_loss_vectorized`, which does the
//! same work with whole-matrix operations. Both go through
//! [`stable_softmax`] for the row-max shift.

use tracing::{debug, warn};

use crate::error::{Result, SoftmaxLossError};
use crate::math::matrix::Matrix;

/// Row-wise softmax of a score matrix together with its logarithm.
#[derive(Debug, Clone, PartialEq)]
pub struct SoftmaxOutput {
    /// `y_hat`; every row sums to 1.
    pub probs: Matrix,
    /// `ln(y_hat)`, computed as `a_trim - ln(Σ exp(a_trim))` so it stays
    /// finite when a probability underflows to zero.
    pub log_probs: Matrix,
}

/// Row-wise softmax of `scores` (N×C) after subtracting each row's maximum.
///
/// The shift leaves the result unchanged mathematically but keeps every
/// exponent ≤ 0, so `exp` cannot overflow.
pub fn stable_softmax(scores: &Matrix) -> Result<SoftmaxOutput> {
    let a_trim = scores.sub_column(&scores.row_max())?;
    let exp = a_trim.map(f64::exp);
    let sums = exp.row_sums();
    let probs = exp.div_column(&sums)?;
    let log_probs = a_trim.sub_column(&sums.map(f64::ln))?;
    Ok(SoftmaxOutput { probs, log_probs })
}

/// Checks the call contract shared by both strategies.
pub fn validate_inputs(w: &Matrix, x: &Matrix, y: &[usize], reg: f64) -> Result<()> {
    if x.cols != w.rows {
        return Err(SoftmaxLossError::shape_mismatch(
            "X columns vs W rows",
            &[x.rows, w.rows],
            &x.shape(),
        ));
    }
    if y.len() != x.rows {
        return Err(SoftmaxLossError::shape_mismatch("labels vs X rows", &[x.rows], &[y.len()]));
    }
    if x.rows == 0 {
        return Err(SoftmaxLossError::EmptyBatch);
    }
    if let Some((index, &label)) = y.iter().enumerate().find(|&(_, &label)| label >= w.cols) {
        return Err(SoftmaxLossError::label_out_of_range(index, label, w.cols));
    }
    validate_reg(reg)
}

pub(crate) fn validate_reg(reg: f64) -> Result<()> {
    if !reg.is_finite() || reg < 0.0 {
        return Err(SoftmaxLossError::InvalidRegularization(reg));
    }
    Ok(())
}

/// Loss and gradient computed with explicit loops over examples and classes.
pub fn softmax_loss_naive(w: &Matrix, x: &Matrix, y: &[usize], reg: f64) -> Result<(f64, Matrix)> {
    validate_inputs(w, x, y, reg)?;
    let (n, d, c) = (x.rows, w.rows, w.cols);

    let SoftmaxOutput { probs, log_probs } = stable_softmax(&x.dot(w)?)?;

    let mut loss = 0.0;
    for i in 0..n {
        loss -= log_probs.data[i][y[i]];
    }
    loss /= n as f64;

    let mut reg_loss = 0.0;
    for row in &w.data {
        for v in row {
            reg_loss += v * v;
        }
    }
    loss += reg * reg_loss / 2.0;

    let mut da = Matrix::zeros(n, c);
    for i in 0..n {
        for j in 0..c {
            da.data[i][j] = if j == y[i] {
                probs.data[i][j] - 1.0
            } else {
                probs.data[i][j]
            };
        }
    }

    // dW[k][j] = Σ_i X[i][k] · da[i][j]
    let mut dw = Matrix::zeros(d, c);
    for i in 0..n {
        for k in 0..d {
            let xik = x.data[i][k];
            for j in 0..c {
                dw.data[k][j] += xik * da.data[i][j];
            }
        }
    }
    for k in 0..d {
        for j in 0..c {
            dw.data[k][j] = dw.data[k][j] / n as f64 + reg * w.data[k][j];
        }
    }

    debug!(n, d, c, reg, loss, "softmax loss (naive)");
    finish(loss, dw)
}

/// Loss and gradient computed with whole-matrix operations only.
pub fn softmax_loss_vectorized(w: &Matrix, x: &Matrix, y: &[usize], reg: f64) -> Result<(f64, Matrix)> {
    validate_inputs(w, x, y, reg)?;
    let n = x.rows as f64;

    let SoftmaxOutput { probs, log_probs } = stable_softmax(&x.dot(w)?)?;
    let one_hot = Matrix::one_hot(y, w.cols)?;

    let true_class_log_probs = log_probs.pick(y)?;
    let loss = -true_class_log_probs.iter().sum::<f64>() / n + reg * w.sum_squares() / 2.0;

    let da = (probs - one_hot).scale(1.0 / n);
    let dw = x.transpose().dot(&da)? + w.scale(reg);

    debug!(n = x.rows, d = w.rows, c = w.cols, reg, loss, "softmax loss (vectorized)");
    finish(loss, dw)
}

fn finish(loss: f64, dw: Matrix) -> Result<(f64, Matrix)> {
    if !loss.is_finite() {
        warn!(loss, "softmax loss is not finite");
        return Err(SoftmaxLossError::numeric_instability("loss"));
    }
    if !dw.is_finite() {
        warn!("softmax gradient has non-finite entries");
        return Err(SoftmaxLossError::numeric_instability("gradient"));
    }
    Ok((loss, dw))
}
