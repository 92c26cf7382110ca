pub mod softmax;
pub mod strategy;
pub mod config;

pub use softmax::{softmax_loss_naive, softmax_loss_vectorized, stable_softmax, SoftmaxOutput};
pub use strategy::{softmax_loss, LossStrategy};
pub use config::SoftmaxLossConfig;
