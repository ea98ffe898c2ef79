//! Функции потерь

use ndarray::Array2;

use crate::config::LossKind;

impl LossKind {
    /// Среднее по всем элементам батча.
    pub fn compute(&self, predictions: &Array2<f64>, targets: &Array2<f64>) -> f64 {
        let n = predictions.len().max(1) as f64;
        let diff = predictions - targets;
        match self {
            LossKind::MeanSquaredError => diff.mapv(|d| d * d).sum() / n,
            LossKind::MeanAbsoluteError => diff.mapv(f64::abs).sum() / n,
        }
    }

    /// dL/dpredictions.
    pub fn gradient(&self, predictions: &Array2<f64>, targets: &Array2<f64>) -> Array2<f64> {
        let n = predictions.len().max(1) as f64;
        let diff = predictions - targets;
        match self {
            LossKind::MeanSquaredError => diff.mapv(|d| 2.0 * d / n),
            LossKind::MeanAbsoluteError => diff.mapv(|d| if d == 0.0 { 0.0 } else { d.signum() / n }),
        }
    }
}

pub fn mean_squared_error(predictions: &Array2<f64>, targets: &Array2<f64>) -> f64 {
    LossKind::MeanSquaredError.compute(predictions, targets)
}
