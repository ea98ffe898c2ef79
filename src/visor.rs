//! Приёмники визуализации: графики и сводка модели

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::training::TrainingObserver;
use crate::types::{EpochMetrics, ModelSummary, PipelineReport, PredictionPoint, ScatterPlot};

/// Вызовы "выстрелил и забыл": ошибки приёмника не влияют на пайплайн.
pub trait Visor: TrainingObserver {
    fn render_scatter(&self, plot: &ScatterPlot);
    fn render_model_summary(&self, summary: &ModelSummary);
    fn render_predictions(&self, original: &ScatterPlot, predictions: &[PredictionPoint]);
}

/// Всё в лог.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingVisor;

impl TrainingObserver for TracingVisor {
    fn on_epoch_end(&self, metrics: &EpochMetrics) {
        tracing::info!(epoch = metrics.epoch, loss = metrics.loss, mse = metrics.mse, "training performance");
    }
}

impl Visor for TracingVisor {
    fn render_scatter(&self, plot: &ScatterPlot) {
        tracing::info!("{}: {} points ({} vs {})", plot.name, plot.points.len(), plot.x_label, plot.y_label);
    }

    fn render_model_summary(&self, summary: &ModelSummary) {
        for layer in &summary.layers {
            tracing::info!("layer {} output {:?} params {}", layer.name, layer.output_shape, layer.params);
        }
        tracing::info!("total params: {}", summary.total_params);
    }

    fn render_predictions(&self, _original: &ScatterPlot, predictions: &[PredictionPoint]) {
        if let (Some(first), Some(last)) = (predictions.first(), predictions.last()) {
            tracing::info!(
                "predictions: {:.1}hp -> {:.2}mpg .. {:.1}hp -> {:.2}mpg",
                first.horsepower,
                first.mpg,
                last.horsepower,
                last.mpg
            );
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Pending,
    Loading,
    Training,
    Finished,
    Failed,
}

/// Состояние дашборда, которое читают HTTP-обработчики.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSnapshot {
    pub status: RunStatus,
    pub error: Option<String>,
    pub scatter: Option<ScatterPlot>,
    pub model: Option<ModelSummary>,
    pub epochs: Vec<EpochMetrics>,
    pub predictions: Vec<PredictionPoint>,
    pub report: Option<PipelineReport>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    inner: Arc<Mutex<DashboardSnapshot>>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.lock().clone()
    }

    pub fn set_status(&self, status: RunStatus) {
        self.update(|s| s.status = status);
    }

    pub fn finish(&self, report: PipelineReport) {
        self.update(|s| {
            s.status = RunStatus::Finished;
            s.report = Some(report);
        });
    }

    pub fn fail(&self, error: &str) {
        self.update(|s| {
            s.status = RunStatus::Failed;
            s.error = Some(error.to_string());
        });
    }

    fn update<F: FnOnce(&mut DashboardSnapshot)>(&self, f: F) {
        let mut snapshot = self.lock();
        f(&mut snapshot);
        snapshot.updated_at = Some(Utc::now());
    }

    fn lock(&self) -> MutexGuard<'_, DashboardSnapshot> {
        // отравленный мьютекс не должен ронять пайплайн
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TrainingObserver for Dashboard {
    fn on_epoch_end(&self, metrics: &EpochMetrics) {
        self.update(|s| s.epochs.push(*metrics));
    }
}

impl Visor for Dashboard {
    fn render_scatter(&self, plot: &ScatterPlot) {
        self.update(|s| s.scatter = Some(plot.clone()));
    }

    fn render_model_summary(&self, summary: &ModelSummary) {
        // модель строится непосредственно перед обучением
        self.update(|s| {
            s.model = Some(summary.clone());
            s.status = RunStatus::Training;
        });
    }

    fn render_predictions(&self, _original: &ScatterPlot, predictions: &[PredictionPoint]) {
        self.update(|s| s.predictions = predictions.to_vec());
    }
}

/// Рассылка в несколько приёмников.
pub struct FanoutVisor {
    sinks: Vec<Arc<dyn Visor>>,
}

impl FanoutVisor {
    pub fn new(sinks: Vec<Arc<dyn Visor>>) -> Self {
        Self { sinks }
    }
}

impl TrainingObserver for FanoutVisor {
    fn on_epoch_end(&self, metrics: &EpochMetrics) {
        self.sinks.iter().for_each(|s| s.on_epoch_end(metrics));
    }
}

impl Visor for FanoutVisor {
    fn render_scatter(&self, plot: &ScatterPlot) {
        self.sinks.iter().for_each(|s| s.render_scatter(plot));
    }

    fn render_model_summary(&self, summary: &ModelSummary) {
        self.sinks.iter().for_each(|s| s.render_model_summary(summary));
    }

    fn render_predictions(&self, original: &ScatterPlot, predictions: &[PredictionPoint]) {
        self.sinks.iter().for_each(|s| s.render_predictions(original, predictions));
    }
}
