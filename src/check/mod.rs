pub mod grad_check;

pub use grad_check::{eval_numerical_gradient, grad_check_sparse, rel_error, GradCheckSample};
