use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::loss::softmax::validate_reg;
use crate::loss::strategy::{softmax_loss, LossStrategy};
use crate::math::matrix::Matrix;

/// Regularization strength and strategy for repeated loss evaluations.
///
/// An optimizer that owns W across iterations keeps one of these and calls
/// [`SoftmaxLossConfig::evaluate`] once per step. The config holds no state
/// between calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SoftmaxLossConfig {
    /// L2 penalty weight; the loss gains `reg/2 · Σ W²`.
    pub reg: f64,
    #[serde(default)]
    pub strategy: LossStrategy,
}

impl SoftmaxLossConfig {
    /// Fails with `InvalidRegularization` unless `reg` is finite and >= 0.
    pub fn new(reg: f64, strategy: LossStrategy) -> Result<Self> {
        validate_reg(reg)?;
        Ok(SoftmaxLossConfig { reg, strategy })
    }

    pub fn evaluate(&self, w: &Matrix, x: &Matrix, y: &[usize]) -> Result<(f64, Matrix)> {
        softmax_loss(self.strategy, w, x, y, self.reg)
    }
}
