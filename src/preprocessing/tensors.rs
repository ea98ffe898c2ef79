//! Подготовка тензоров для обучения

use ndarray::{Array2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{PipelineError, Result};
use crate::preprocessing::normalization::MinMaxNormalizer;
use crate::types::{CleanRecord, NormalizationBounds};

/// Нормализованные столбцы `[n, 1]` и границы для обратного преобразования.
#[derive(Debug, Clone)]
pub struct PreparedTensors {
    pub inputs: Array2<f64>,
    pub labels: Array2<f64>,
    pub input_bounds: NormalizationBounds,
    pub label_bounds: NormalizationBounds,
}

impl PreparedTensors {
    pub fn len(&self) -> usize {
        self.inputs.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.nrows() == 0
    }
}

pub struct TensorPreprocessor;

impl TensorPreprocessor {
    pub fn prepare(records: &[CleanRecord]) -> Result<PreparedTensors> {
        Self::prepare_with_rng(records, &mut rand::thread_rng())
    }

    pub fn prepare_with_rng<R: Rng + ?Sized>(records: &[CleanRecord], rng: &mut R) -> Result<PreparedTensors> {
        if records.is_empty() {
            return Err(PipelineError::EmptyDataset);
        }

        // Перемешиваем копию: пары (horsepower, mpg) остаются вместе
        let mut shuffled = records.to_vec();
        shuffled.shuffle(rng);

        let (inputs_raw, labels_raw) = Self::to_columns(&shuffled);

        let mut input_normalizer = MinMaxNormalizer::new();
        let inputs = input_normalizer.fit_transform(&inputs_raw)?;
        let mut label_normalizer = MinMaxNormalizer::new();
        let labels = label_normalizer.fit_transform(&labels_raw)?;

        let input_bounds = Self::single_bounds(&input_normalizer)?;
        let label_bounds = Self::single_bounds(&label_normalizer)?;

        tracing::info!(
            "Prepared {} examples: horsepower [{}, {}], mpg [{}, {}]",
            inputs.nrows(),
            input_bounds.min,
            input_bounds.max,
            label_bounds.min,
            label_bounds.max
        );

        Ok(PreparedTensors {
            inputs,
            labels,
            input_bounds,
            label_bounds,
        })
    }

    /// Записи -> столбцы horsepower и mpg формы `[n, 1]`.
    pub fn to_columns(records: &[CleanRecord]) -> (Array2<f64>, Array2<f64>) {
        let horsepower: Vec<f64> = records.iter().map(|r| r.horsepower).collect();
        let mpg: Vec<f64> = records.iter().map(|r| r.mpg).collect();
        (
            ndarray::Array1::from(horsepower).insert_axis(Axis(1)),
            ndarray::Array1::from(mpg).insert_axis(Axis(1)),
        )
    }

    fn single_bounds(normalizer: &MinMaxNormalizer) -> Result<NormalizationBounds> {
        normalizer
            .bounds()
            .and_then(|b| b.first().copied())
            .ok_or(PipelineError::EmptyDataset)
    }
}
