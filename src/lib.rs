pub mod math;
pub mod loss;
pub mod check;
pub mod error;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use loss::softmax::{softmax_loss_naive, softmax_loss_vectorized, stable_softmax, SoftmaxOutput};
pub use loss::strategy::{softmax_loss, LossStrategy};
pub use loss::config::SoftmaxLossConfig;
pub use check::grad_check::{grad_check_sparse, eval_numerical_gradient, rel_error, GradCheckSample};
pub use error::{Result, SoftmaxLossError};
