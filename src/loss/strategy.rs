use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::loss::softmax::{softmax_loss_naive, softmax_loss_vectorized};
use crate::math::matrix::Matrix;

/// Selects how the softmax loss is computed.
///
/// - `Naive`: explicit loops over examples and classes; the reference.
/// - `Vectorized`: whole-matrix operations; the default.
///
/// Both return the same loss and gradient up to floating-point rounding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossStrategy {
    Naive,
    #[default]
    Vectorized,
}

impl LossStrategy {
    pub const ALL: [LossStrategy; 2] = [LossStrategy::Naive, LossStrategy::Vectorized];
}

/// Softmax loss and gradient using the selected strategy.
pub fn softmax_loss(
    strategy: LossStrategy,
    w: &Matrix,
    x: &Matrix,
    y: &[usize],
    reg: f64,
) -> Result<(f64, Matrix)> {
    match strategy {
        LossStrategy::Naive      => softmax_loss_naive(w, x, y, reg),
        LossStrategy::Vectorized => softmax_loss_vectorized(w, x, y, reg),
    }
}
