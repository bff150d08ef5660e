use std::{env, str::FromStr};

use anyhow::Context;
use log::{debug, info};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use train_strategies::{
    GateConfig, History, ImprovementGate, StepResult,
    config::{DEFAULT_PATIENCE, DEFAULT_THRESHOLD},
    history::{LOSS, VAL_LOSS},
};

const SEED: u64 = 42;
const SAMPLES: usize = 200;
const EPOCHS_PER_STEP: usize = 3;
const LEARNING_RATE: f64 = 0.01;

/// Fits `y = w * x + b` with stochastic gradient descent on the mean squared error.
struct LinearTrainer {
    w: f64,
    b: f64,
    train: Vec<(f64, f64)>,
    val: Vec<(f64, f64)>,
    rng: StdRng,
}

impl LinearTrainer {
    fn new(data: Vec<(f64, f64)>, rng: StdRng) -> Self {
        let split = data.len() * 4 / 5;
        let mut train = data;
        let val = train.split_off(split);

        Self {
            w: 0.0,
            b: 0.0,
            train,
            val,
            rng,
        }
    }

    /// Runs a few epochs and records the losses measured after each one.
    fn train(&mut self) -> History {
        let mut history = History::new();

        for _ in 0..EPOCHS_PER_STEP {
            self.train.shuffle(&mut self.rng);

            for &(x, y) in &self.train {
                let err = self.w * x + self.b - y;
                self.w -= LEARNING_RATE * 2.0 * err * x;
                self.b -= LEARNING_RATE * 2.0 * err;
            }

            history.record(LOSS, self.mse(&self.train));
            history.record(VAL_LOSS, self.mse(&self.val));
        }

        history
    }

    fn mse(&self, data: &[(f64, f64)]) -> f64 {
        let sum: f64 = data
            .iter()
            .map(|&(x, y)| (self.w * x + self.b - y).powi(2))
            .sum();

        sum / data.len().max(1) as f64
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(v) => v.parse().with_context(|| format!("invalid {key}: {v}")),
        Err(_) => Ok(default),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let threshold = env_or("THRESHOLD", DEFAULT_THRESHOLD)?;
    let patience = env_or("PATIENCE", DEFAULT_PATIENCE)?;
    let cfg = GateConfig::new(threshold, patience)?;
    info!("training with threshold {threshold} and patience {patience}");

    let mut rng = StdRng::seed_from_u64(SEED);
    let data = (0..SAMPLES)
        .map(|_| {
            let x: f64 = rng.random_range(-1.0..1.0);
            let noise: f64 = rng.random_range(-0.05..0.05);
            (x, 3.0 * x - 0.5 + noise)
        })
        .collect();

    let mut trainer = LinearTrainer::new(data, rng);
    let report = ImprovementGate::new(cfg).run(|| {
        let history = trainer.train();
        debug!("step ran {} epoch(s)", history.epochs());
        StepResult::try_from(history)
    })?;

    println!(
        "stopped after {} step(s) ({:?}): w = {:.4}, b = {:.4}",
        report.calls(),
        report.reason(),
        trainer.w,
        trainer.b
    );

    if let Some(step) = report.last_accepted() {
        println!(
            "last accepted step: loss = {:.6}, val_loss = {:.6}",
            step.final_loss(),
            step.final_val_loss()
        );
    }

    Ok(())
}
