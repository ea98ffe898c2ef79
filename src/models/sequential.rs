//! Последовательная модель и её построение

use ndarray::Array2;
use rand::Rng;

use crate::error::{PipelineError, Result};
use crate::models::dense::{Dense, DenseGradients};
use crate::models::optimizer::{Optimizer, ParamUpdate};
use crate::types::{AffineFit, ModelSummary};

#[derive(Debug, Clone)]
pub struct Sequential {
    layers: Vec<Dense>,
}

impl Sequential {
    pub fn new(layers: Vec<Dense>) -> Result<Self> {
        if layers.is_empty() {
            return Err(PipelineError::Framework("model has no layers".to_string()));
        }
        for pair in layers.windows(2) {
            if pair[0].units() != pair[1].input_dim() {
                return Err(PipelineError::Framework(format!(
                    "layer {} outputs {} units but {} expects {}",
                    pair[0].name(),
                    pair[0].units(),
                    pair[1].name(),
                    pair[1].input_dim()
                )));
            }
        }
        Ok(Self { layers })
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    pub fn summary(&self) -> ModelSummary {
        let layers: Vec<_> = self.layers.iter().map(Dense::summary).collect();
        let total_params = layers.iter().map(|l| l.params).sum();
        ModelSummary { layers, total_params }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let mut out = x.clone();
        for layer in &self.layers {
            out = layer.forward(&out)?;
        }
        Ok(out)
    }

    /// Прямой проход с сохранением входов каждого слоя.
    /// Возвращает (входы слоёв, выход).
    pub fn forward_cached(&self, x: &Array2<f64>) -> Result<(Vec<Array2<f64>>, Array2<f64>)> {
        let mut inputs = Vec::with_capacity(self.layers.len());
        let mut out = x.clone();
        for layer in &self.layers {
            let next = layer.forward(&out)?;
            inputs.push(out);
            out = next;
        }
        Ok((inputs, out))
    }

    /// Обратный проход; градиенты в порядке слоёв.
    pub fn backward(&self, inputs: &[Array2<f64>], grad_out: Array2<f64>) -> Vec<DenseGradients> {
        let mut grads = Vec::with_capacity(self.layers.len());
        let mut grad = grad_out;
        for (layer, x) in self.layers.iter().zip(inputs).rev() {
            let (g, grad_in) = layer.backward(x, &grad);
            grads.push(g);
            grad = grad_in;
        }
        grads.reverse();
        grads
    }

    pub fn apply_gradients(&mut self, optimizer: &mut dyn Optimizer, grads: &[DenseGradients]) -> Result<()> {
        if grads.len() != self.layers.len() {
            return Err(PipelineError::Framework(format!(
                "expected gradients for {} layers, got {}",
                self.layers.len(),
                grads.len()
            )));
        }

        let mut updates: Vec<ParamUpdate<'_>> = Vec::with_capacity(grads.len() * 2);
        for (layer, g) in self.layers.iter_mut().zip(grads) {
            let (w, b) = layer.params_mut();
            updates.push((w.view_mut().into_dyn(), g.weights.view().into_dyn()));
            updates.push((b.view_mut().into_dyn(), g.bias.view().into_dyn()));
        }
        optimizer.apply_gradients(updates)
    }

    /// Свёртка цепочки скалярных аффинных слоёв в одно отображение.
    pub fn effective_affine(&self) -> Result<AffineFit> {
        let mut fit = AffineFit {
            slope: 1.0,
            intercept: 0.0,
        };
        for layer in &self.layers {
            if layer.input_dim() != 1 || layer.units() != 1 {
                return Err(PipelineError::Framework(format!(
                    "layer {} is not scalar-to-scalar",
                    layer.name()
                )));
            }
            let w = layer.weights()[[0, 0]];
            let b = layer.bias()[0];
            fit = AffineFit {
                slope: fit.slope * w,
                intercept: fit.intercept * w + b,
            };
        }
        Ok(fit)
    }
}

/// Архитектура: два аффинных слоя 1 -> 1 без активации.
pub struct ModelBuilder;

impl ModelBuilder {
    pub fn build() -> Sequential {
        Self::build_with_rng(&mut rand::thread_rng())
    }

    pub fn build_with_rng<R: Rng + ?Sized>(rng: &mut R) -> Sequential {
        let layers = vec![Dense::new("dense_Dense1", 1, 1, rng), Dense::new("dense_Dense2", 1, 1, rng)];
        Sequential { layers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn fixed_model() -> Sequential {
        Sequential::new(vec![
            Dense::from_parts("a", array![[2.0]], array![1.0]).unwrap(),
            Dense::from_parts("b", array![[-3.0]], array![0.5]).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn builder_architecture() {
        let model = ModelBuilder::build();
        let summary = model.summary();
        assert_eq!(summary.layers.len(), 2);
        assert_eq!(summary.total_params, 4);
        assert!(summary.layers.iter().all(|l| l.output_shape == vec![None, Some(1)]));
    }

    #[test]
    fn two_affine_layers_collapse_to_one() {
        let model = fixed_model();
        let fit = model.effective_affine().unwrap();
        // (2x + 1) * -3 + 0.5
        assert_eq!(fit, AffineFit { slope: -6.0, intercept: -2.5 });

        let x = array![[0.0], [1.0], [0.25]];
        let y = model.predict(&x).unwrap();
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert!((fit.slope * xi + fit.intercept - yi).abs() < 1e-12);
        }
    }

    #[test]
    fn backward_matches_chain_rule() {
        let model = fixed_model();
        let x = array![[1.0]];
        let (inputs, out) = model.forward_cached(&x).unwrap();
        assert_eq!(out, array![[-8.5]]);

        let grads = model.backward(&inputs, array![[1.0]]);
        // d/dw2 = h = 3, d/db2 = 1, d/dw1 = w2 * x = -3, d/db1 = w2 = -3
        assert_eq!(grads[1].weights, array![[3.0]]);
        assert_eq!(grads[1].bias, array![1.0]);
        assert_eq!(grads[0].weights, array![[-3.0]]);
        assert_eq!(grads[0].bias, array![-3.0]);
    }

    #[test]
    fn mismatched_layers_are_rejected() {
        let layers = vec![
            Dense::from_parts("a", array![[1.0, 1.0]], array![0.0, 0.0]).unwrap(),
            Dense::from_parts("b", array![[1.0]], array![0.0]).unwrap(),
        ];
        assert!(Sequential::new(layers).is_err());
    }
}
