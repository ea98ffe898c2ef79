//! Оценка обученной модели

use linfa::traits::Fit;
use linfa::Dataset;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2, Axis};

use crate::error::{PipelineError, Result};
use crate::models::sequential::Sequential;
use crate::types::{AffineFit, NormalizationBounds, PredictionPoint};

/// Кривая предсказаний: `points` равномерных нормализованных входов на [0, 1],
/// обе оси переводятся обратно в исходные единицы.
pub fn prediction_curve(
    model: &Sequential,
    input_bounds: &NormalizationBounds,
    label_bounds: &NormalizationBounds,
    points: usize,
) -> Result<Vec<PredictionPoint>> {
    if points < 2 {
        return Err(PipelineError::InvalidConfig(format!(
            "need at least 2 prediction points, got {}",
            points
        )));
    }

    let xs = Array1::linspace(0.0, 1.0, points).insert_axis(Axis(1));
    let preds = model.predict(&xs)?;

    Ok(xs
        .iter()
        .zip(preds.iter())
        .map(|(&x, &y)| PredictionPoint {
            horsepower: input_bounds.denormalize(x),
            mpg: label_bounds.denormalize(y),
        })
        .collect())
}

/// Аналитическая МНК-регрессия на тех же нормализованных данных.
pub fn ols_baseline(inputs: &Array2<f64>, labels: &Array2<f64>) -> Result<AffineFit> {
    if inputs.ncols() != 1 || labels.ncols() != 1 {
        return Err(PipelineError::Framework("OLS baseline expects single-column data".to_string()));
    }

    let targets = labels.column(0).to_owned();
    let dataset = Dataset::new(inputs.clone(), targets);
    let fitted = LinearRegression::new()
        .fit(&dataset)
        .map_err(|e| PipelineError::Framework(format!("OLS baseline failed: {}", e)))?;

    Ok(AffineFit {
        slope: fitted.params()[0],
        intercept: fitted.intercept(),
    })
}
