// Sanity-check report for the softmax loss on a random batch.
// Set SOFTMAX_LOSS_LOG (e.g. `softmax_loss=debug`) to see per-call logs.
use std::str::FromStr;
use std::time::Instant;

use rand::Rng;
use softmax_loss::check::grad_check::DEFAULT_STEP;
use softmax_loss::{
    grad_check_sparse, softmax_loss_naive, softmax_loss_vectorized, Matrix, Result,
};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

const NUM_EXAMPLES: usize = 200;
const NUM_FEATURES: usize = 64;
const NUM_CLASSES: usize = 10;
const REG: f64 = 5e-2;

fn init_tracing() {
    let targets = std::env::var("SOFTMAX_LOSS_LOG")
        .ok()
        .and_then(|filter| Targets::from_str(&filter).ok())
        .unwrap_or_default();

    tracing_subscriber::registry()
        .with(targets)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let mut rng = rand::thread_rng();
    let w = Matrix::gaussian_with(NUM_FEATURES, NUM_CLASSES, 1e-4, &mut rng);
    let x = Matrix::random(NUM_EXAMPLES, NUM_FEATURES);
    let y: Vec<usize> = (0..NUM_EXAMPLES).map(|_| rng.gen_range(0..NUM_CLASSES)).collect();

    // Near-zero weights predict every class with probability ~1/C.
    let (loss, _) = softmax_loss_naive(&w, &x, &y, 0.0)?;
    println!("loss: {loss:.6}");
    println!("sanity check: {:.6}", (NUM_CLASSES as f64).ln());

    let w = Matrix::gaussian_with(NUM_FEATURES, NUM_CLASSES, 0.1, &mut rng);

    let tic = Instant::now();
    let (naive_loss, naive_grad) = softmax_loss_naive(&w, &x, &y, REG)?;
    let naive_time = tic.elapsed();

    let tic = Instant::now();
    let (vec_loss, vec_grad) = softmax_loss_vectorized(&w, &x, &y, REG)?;
    let vec_time = tic.elapsed();

    println!("naive loss: {naive_loss:e} computed in {naive_time:?}");
    println!("vectorized loss: {vec_loss:e} computed in {vec_time:?}");
    println!("Loss difference: {:e}", (naive_loss - vec_loss).abs());
    let grad_diff = naive_grad.max_abs_diff(&vec_grad).unwrap_or(f64::NAN);
    println!("Gradient difference (max abs): {grad_diff:e}");

    let samples = grad_check_sparse(
        |probe| softmax_loss_vectorized(probe, &x, &y, REG).map(|(loss, _)| loss),
        &w,
        &vec_grad,
        10,
        DEFAULT_STEP,
        &mut rng,
    )?;
    for s in samples {
        println!(
            "numerical: {:.6} analytic: {:.6}, relative error: {:e}",
            s.numerical, s.analytic, s.rel_error
        );
    }

    Ok(())
}
