//! Min-max нормализация данных

#![allow(non_snake_case)]

use ndarray::{Array2, Axis};

use crate::error::{PipelineError, Result};
use crate::types::NormalizationBounds;

impl NormalizationBounds {
    /// Границы по наблюдаемым значениям; `None` для пустого набора.
    pub fn from_values<'a, I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a f64>,
    {
        values.into_iter().fold(None, |acc, &v| match acc {
            None => Some(Self { min: v, max: v }),
            Some(b) => Some(Self {
                min: b.min.min(v),
                max: b.max.max(v),
            }),
        })
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_constant(&self) -> bool {
        self.range() == 0.0
    }

    /// (x - min) / (max - min). Для константного признака - 0.0.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.is_constant() {
            return 0.0;
        }
        (value - self.min) / self.range()
    }

    /// Обратное преобразование. Для константного признака - min.
    pub fn denormalize(&self, value: f64) -> f64 {
        value * self.range() + self.min
    }
}

/// Построчная min-max нормализация матрицы признаков (по столбцам).
pub struct MinMaxNormalizer {
    bounds: Option<Vec<NormalizationBounds>>,
}

impl MinMaxNormalizer {
    pub fn new() -> Self {
        Self { bounds: None }
    }

    pub fn is_fitted(&self) -> bool {
        self.bounds.is_some()
    }

    pub fn bounds(&self) -> Option<&[NormalizationBounds]> {
        self.bounds.as_deref()
    }

    pub fn fit(&mut self, X: &Array2<f64>) -> Result<()> {
        if X.nrows() == 0 {
            return Err(PipelineError::EmptyDataset);
        }

        let bounds = X
            .axis_iter(Axis(1))
            .map(|column| NormalizationBounds::from_values(column.iter()).ok_or(PipelineError::EmptyDataset))
            .collect::<Result<Vec<_>>>()?;

        for (i, b) in bounds.iter().enumerate() {
            if !b.range().is_finite() {
                return Err(PipelineError::Framework(format!(
                    "feature {} range [{}, {}] is not representable",
                    i, b.min, b.max
                )));
            }
            if b.is_constant() {
                tracing::warn!("Feature {} is constant ({}), normalizing to 0.0", i, b.min);
            }
        }

        self.bounds = Some(bounds);
        Ok(())
    }

    pub fn transform(&self, X: &Array2<f64>) -> Result<Array2<f64>> {
        self.map_columns(X, NormalizationBounds::normalize)
    }

    pub fn inverse_transform(&self, X: &Array2<f64>) -> Result<Array2<f64>> {
        self.map_columns(X, NormalizationBounds::denormalize)
    }

    pub fn fit_transform(&mut self, X: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(X)?;
        self.transform(X)
    }

    fn map_columns(&self, X: &Array2<f64>, f: fn(&NormalizationBounds, f64) -> f64) -> Result<Array2<f64>> {
        let bounds = self
            .bounds
            .as_ref()
            .ok_or_else(|| PipelineError::Framework("normalizer not fitted".to_string()))?;

        if X.ncols() != bounds.len() {
            return Err(PipelineError::Framework(format!(
                "expected {} columns, got {}",
                bounds.len(),
                X.ncols()
            )));
        }

        let mut out = X.clone();
        for mut row in out.rows_mut() {
            for (i, val) in row.iter_mut().enumerate() {
                *val = f(&bounds[i], *val);
            }
        }
        Ok(out)
    }
}

impl Default for MinMaxNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn bounds_from_values() {
        let b = NormalizationBounds::from_values(&[130.0, 80.0, 95.0]).unwrap();
        assert_eq!(b, NormalizationBounds { min: 80.0, max: 130.0 });
        assert!(NormalizationBounds::from_values(&Vec::<f64>::new()).is_none());
    }

    #[test]
    fn normalize_then_denormalize_is_identity() {
        let b = NormalizationBounds { min: 46.0, max: 230.0 };
        for x in [46.0, 71.5, 100.0, 150.25, 229.9, 230.0] {
            let n = b.normalize(x);
            assert!((0.0..=1.0).contains(&n));
            assert!((b.denormalize(n) - x).abs() < 1e-9);
        }
    }

    #[test]
    fn constant_feature_maps_to_zero() {
        let b = NormalizationBounds { min: 5.0, max: 5.0 };
        assert_eq!(b.normalize(5.0), 0.0);
        assert_eq!(b.denormalize(0.0), 5.0);
        assert!(!b.normalize(5.0).is_nan());
    }

    #[test]
    fn normalizer_works_per_column() {
        let X = array![[130.0, 18.0], [80.0, 24.0], [105.0, 21.0]];
        let mut normalizer = MinMaxNormalizer::new();
        assert!(!normalizer.is_fitted());
        let scaled = normalizer.fit_transform(&X).unwrap();
        assert!(normalizer.is_fitted());

        assert_eq!(scaled, array![[1.0, 0.0], [0.0, 1.0], [0.5, 0.5]]);
        let restored = normalizer.inverse_transform(&scaled).unwrap();
        assert!(restored.iter().zip(X.iter()).all(|(a, b)| (a - b).abs() < 1e-9));
    }

    #[test]
    fn unfitted_or_empty_is_an_error() {
        let normalizer = MinMaxNormalizer::new();
        assert!(normalizer.transform(&array![[1.0]]).is_err());

        let mut normalizer = MinMaxNormalizer::new();
        let empty = Array2::<f64>::zeros((0, 2));
        assert!(matches!(normalizer.fit(&empty), Err(PipelineError::EmptyDataset)));
    }

    #[test]
    fn overflowing_range_is_rejected() {
        let X = array![[1.7e308], [-1.7e308]];
        let mut normalizer = MinMaxNormalizer::new();
        assert!(matches!(normalizer.fit(&X), Err(PipelineError::Framework(_))));
        assert!(!normalizer.is_fitted());
    }
}
