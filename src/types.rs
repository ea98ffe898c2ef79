//! Типы данных для пайплайна регрессии MPG

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Сырая запись из датасета. Используются только два поля, остальные
/// сохраняются как есть.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Miles_per_Gallon", default)]
    pub miles_per_gallon: Option<f64>,
    #[serde(rename = "Horsepower", default)]
    pub horsepower: Option<f64>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CleanRecord {
    pub mpg: f64,
    pub horsepower: f64,
}

impl CleanRecord {
    /// Проекция сырой записи; `None`, если одного из полей нет.
    pub fn from_raw(raw: &RawRecord) -> Option<Self> {
        match (raw.miles_per_gallon, raw.horsepower) {
            (Some(mpg), Some(horsepower)) => Some(Self { mpg, horsepower }),
            _ => None,
        }
    }
}

/// Границы min-max нормализации одного признака.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationBounds {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatterPlot {
    pub name: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ScatterPoint>,
}

impl ScatterPlot {
    pub fn horsepower_vs_mpg(records: &[CleanRecord]) -> Self {
        Self {
            name: "Horsepower v MPG".to_string(),
            x_label: "Horsepower".to_string(),
            y_label: "MPG".to_string(),
            points: records
                .iter()
                .map(|r| ScatterPoint {
                    x: r.horsepower,
                    y: r.mpg,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSummary {
    pub name: String,
    pub output_shape: Vec<Option<usize>>, // None = размер батча
    pub params: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub layers: Vec<LayerSummary>,
    pub total_params: usize,
}

/// Метрики одной эпохи.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub loss: f64,
    pub mse: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum ConvergenceWarning {
    /// Loss последней эпохи не ниже, чем у первой.
    #[error("loss did not decrease during training ({first:.6} -> {last:.6})")]
    LossNotDecreasing { first: f64, last: f64 },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub epochs: Vec<EpochMetrics>,
    #[serde(default)]
    pub warnings: Vec<ConvergenceWarning>,
}

impl TrainingHistory {
    pub fn final_loss(&self) -> Option<f64> {
        self.epochs.last().map(|m| m.loss)
    }
}

/// Точка кривой предсказаний в исходных единицах.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    pub horsepower: f64,
    pub mpg: f64,
}

/// Линейное отображение y = slope * x + intercept (в нормализованных единицах).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineFit {
    pub slope: f64,
    pub intercept: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub records: usize,
    pub input_bounds: NormalizationBounds,
    pub label_bounds: NormalizationBounds,
    pub history: TrainingHistory,
    pub model: AffineFit,
    pub ols_baseline: Option<AffineFit>,
    pub predictions: Vec<PredictionPoint>,
    pub finished_at: DateTime<Utc>,
}
