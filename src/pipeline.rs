//! Пайплайн: загрузка -> предобработка -> модель -> обучение -> оценка

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::AppConfig;
use crate::data_loader::DataLoader;
use crate::error::{PipelineError, Result};
use crate::models::evaluation::{ols_baseline, prediction_curve};
use crate::models::sequential::ModelBuilder;
use crate::models::training::{TrainingObserver, TrainingRunner};
use crate::preprocessing::TensorPreprocessor;
use crate::types::{CleanRecord, EpochMetrics, PipelineReport, ScatterPlot};
use crate::visor::Visor;

pub async fn run_pipeline(config: &AppConfig, visor: Arc<dyn Visor>) -> Result<PipelineReport> {
    config.validate()?;

    let loader = DataLoader::new(Duration::from_secs(config.fetch_timeout_secs))?;
    let records = loader.fetch_clean_records(&config.source_url).await?;

    run_on_records(records, config, visor).await
}

/// Обучение вынесено в blocking-пул, чтобы не занимать async-рантайм.
pub async fn run_on_records(
    records: Vec<CleanRecord>,
    config: &AppConfig,
    visor: Arc<dyn Visor>,
) -> Result<PipelineReport> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || train_and_evaluate(&records, &config, visor.as_ref()))
        .await
        .map_err(|e| PipelineError::Framework(format!("training task failed: {}", e)))?
}

pub fn train_and_evaluate(records: &[CleanRecord], config: &AppConfig, visor: &dyn Visor) -> Result<PipelineReport> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let original = ScatterPlot::horsepower_vs_mpg(records);
    visor.render_scatter(&original);

    let tensors = TensorPreprocessor::prepare_with_rng(records, &mut rng)?;

    let mut model = ModelBuilder::build_with_rng(&mut rng);
    visor.render_model_summary(&model.summary());

    let runner = TrainingRunner::new(config.training.clone())?;
    let forwarder = EpochForwarder(visor);
    let history = runner.train_with_rng(&mut model, &tensors.inputs, &tensors.labels, &[&forwarder], &mut rng)?;

    let predictions = prediction_curve(
        &model,
        &tensors.input_bounds,
        &tensors.label_bounds,
        config.prediction_points,
    )?;
    visor.render_predictions(&original, &predictions);

    let fit = model.effective_affine()?;
    let baseline = match ols_baseline(&tensors.inputs, &tensors.labels) {
        Ok(baseline) => Some(baseline),
        Err(e) => {
            tracing::warn!("OLS baseline unavailable: {}", e);
            None
        }
    };

    tracing::info!(
        "Learned mpg_n = {:.4} * hp_n + {:.4}{}",
        fit.slope,
        fit.intercept,
        baseline
            .map(|b| format!(" (OLS: {:.4} * hp_n + {:.4})", b.slope, b.intercept))
            .unwrap_or_default()
    );

    Ok(PipelineReport {
        records: tensors.len(),
        input_bounds: tensors.input_bounds,
        label_bounds: tensors.label_bounds,
        history,
        model: fit,
        ols_baseline: baseline,
        predictions,
        finished_at: Utc::now(),
    })
}

struct EpochForwarder<'a>(&'a dyn Visor);

impl TrainingObserver for EpochForwarder<'_> {
    fn on_epoch_end(&self, metrics: &EpochMetrics) {
        self.0.on_epoch_end(metrics);
    }
}
