//! Цикл обучения

use ndarray::{Array2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::TrainingConfig;
use crate::error::{PipelineError, Result};
use crate::models::loss::mean_squared_error;
use crate::models::optimizer::build_optimizer;
use crate::models::sequential::Sequential;
use crate::types::{ConvergenceWarning, EpochMetrics, TrainingHistory};

/// Подписчик на метрики эпох (например, живой график).
pub trait TrainingObserver: Send + Sync {
    fn on_epoch_end(&self, metrics: &EpochMetrics);
}

pub struct TrainingRunner {
    config: TrainingConfig,
}

impl TrainingRunner {
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn train(
        &self,
        model: &mut Sequential,
        inputs: &Array2<f64>,
        labels: &Array2<f64>,
        observers: &[&dyn TrainingObserver],
    ) -> Result<TrainingHistory> {
        self.train_with_rng(model, inputs, labels, observers, &mut rand::thread_rng())
    }

    pub fn train_with_rng<R: Rng + ?Sized>(
        &self,
        model: &mut Sequential,
        inputs: &Array2<f64>,
        labels: &Array2<f64>,
        observers: &[&dyn TrainingObserver],
        rng: &mut R,
    ) -> Result<TrainingHistory> {
        let n = inputs.nrows();
        if n == 0 {
            return Err(PipelineError::EmptyDataset);
        }
        if labels.nrows() != n {
            return Err(PipelineError::Framework(format!(
                "{} inputs but {} labels",
                n,
                labels.nrows()
            )));
        }

        let TrainingConfig {
            optimizer,
            loss,
            batch_size,
            epochs,
            shuffle,
        } = self.config.clone();

        let mut optimizer = build_optimizer(&optimizer);
        let mut order: Vec<usize> = (0..n).collect();
        let mut history = TrainingHistory::default();

        tracing::info!(
            "Training on {} examples: {} epochs, batch size {}, loss {:?}",
            n,
            epochs,
            batch_size,
            loss
        );

        for epoch in 0..epochs {
            if shuffle {
                order.shuffle(rng);
            }

            let mut loss_sum = 0.0;
            let mut mse_sum = 0.0;

            for (batch_idx, chunk) in order.chunks(batch_size).enumerate() {
                // буферы батча живут только в пределах шага
                let x = inputs.select(Axis(0), chunk);
                let y = labels.select(Axis(0), chunk);

                let (cached, predictions) = model.forward_cached(&x)?;
                let batch_loss = loss.compute(&predictions, &y);
                let batch_mse = mean_squared_error(&predictions, &y);
                if !batch_loss.is_finite() {
                    return Err(PipelineError::Framework(format!(
                        "non-finite loss at epoch {}, batch {}",
                        epoch, batch_idx
                    )));
                }

                let grads = model.backward(&cached, loss.gradient(&predictions, &y));
                model.apply_gradients(&mut *optimizer, &grads)?;

                tracing::debug!("epoch {} batch {}: loss {:.6}", epoch, batch_idx, batch_loss);

                loss_sum += batch_loss * chunk.len() as f64;
                mse_sum += batch_mse * chunk.len() as f64;
            }

            let metrics = EpochMetrics {
                epoch,
                loss: loss_sum / n as f64,
                mse: mse_sum / n as f64,
            };
            tracing::info!("Epoch {}/{}: loss {:.6}, mse {:.6}", epoch + 1, epochs, metrics.loss, metrics.mse);

            for observer in observers {
                observer.on_epoch_end(&metrics);
            }
            history.epochs.push(metrics);
        }

        if let (Some(first), Some(last)) = (history.epochs.first(), history.epochs.last()) {
            if history.epochs.len() > 1 && last.loss >= first.loss {
                let warning = ConvergenceWarning::LossNotDecreasing {
                    first: first.loss,
                    last: last.loss,
                };
                tracing::warn!("{}", warning);
                history.warnings.push(warning);
            }
        }

        Ok(history)
    }
}
