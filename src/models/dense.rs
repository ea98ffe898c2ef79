//! Полносвязный (аффинный) слой y = xW + b

use ndarray::{Array1, Array2, Axis};
use rand::Rng;

use crate::error::{PipelineError, Result};
use crate::types::LayerSummary;

#[derive(Debug, Clone)]
pub struct Dense {
    name: String,
    weights: Array2<f64>, // [input_dim, units]
    bias: Array1<f64>,
}

/// Градиенты параметров одного слоя.
#[derive(Debug, Clone)]
pub struct DenseGradients {
    pub weights: Array2<f64>,
    pub bias: Array1<f64>,
}

impl Dense {
    /// Glorot uniform для весов, нули для bias.
    pub fn new<R: Rng + ?Sized>(name: impl Into<String>, input_dim: usize, units: usize, rng: &mut R) -> Self {
        let limit = (6.0 / (input_dim + units) as f64).sqrt();
        let weights = Array2::from_shape_fn((input_dim, units), |_| rng.gen_range(-limit..=limit));
        Self {
            name: name.into(),
            weights,
            bias: Array1::zeros(units),
        }
    }

    pub fn from_parts(name: impl Into<String>, weights: Array2<f64>, bias: Array1<f64>) -> Result<Self> {
        if weights.ncols() != bias.len() {
            return Err(PipelineError::Framework(format!(
                "bias length {} does not match {} units",
                bias.len(),
                weights.ncols()
            )));
        }
        Ok(Self {
            name: name.into(),
            weights,
            bias,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_dim(&self) -> usize {
        self.weights.nrows()
    }

    pub fn units(&self) -> usize {
        self.weights.ncols()
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn bias(&self) -> &Array1<f64> {
        &self.bias
    }

    pub fn param_count(&self) -> usize {
        self.weights.len() + self.bias.len()
    }

    pub fn summary(&self) -> LayerSummary {
        LayerSummary {
            name: self.name.clone(),
            output_shape: vec![None, Some(self.units())],
            params: self.param_count(),
        }
    }

    pub fn forward(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.input_dim() {
            return Err(PipelineError::Framework(format!(
                "layer {} expects {} inputs, got {}",
                self.name,
                self.input_dim(),
                x.ncols()
            )));
        }
        Ok(x.dot(&self.weights) + &self.bias)
    }

    /// По входу слоя и dL/dy возвращает градиенты параметров и dL/dx.
    pub fn backward(&self, x: &Array2<f64>, grad_out: &Array2<f64>) -> (DenseGradients, Array2<f64>) {
        let grads = DenseGradients {
            weights: x.t().dot(grad_out),
            bias: grad_out.sum_axis(Axis(0)),
        };
        let grad_in = grad_out.dot(&self.weights.t());
        (grads, grad_in)
    }

    pub(crate) fn params_mut(&mut self) -> (&mut Array2<f64>, &mut Array1<f64>) {
        (&mut self.weights, &mut self.bias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn glorot_init_within_limit() {
        let mut rng = StdRng::seed_from_u64(3);
        let layer = Dense::new("dense_1", 1, 1, &mut rng);
        let limit = 3.0_f64.sqrt();
        assert!(layer.weights()[[0, 0]].abs() <= limit);
        assert_eq!(layer.bias(), &array![0.0]);
        assert_eq!(layer.param_count(), 2);
    }

    #[test]
    fn forward_and_backward() {
        let layer = Dense::from_parts("d", array![[2.0]], array![1.0]).unwrap();
        let x = array![[1.0], [3.0]];
        assert_eq!(layer.forward(&x).unwrap(), array![[3.0], [7.0]]);

        let grad_out = array![[1.0], [0.5]];
        let (grads, grad_in) = layer.backward(&x, &grad_out);
        assert_eq!(grads.weights, array![[2.5]]);
        assert_eq!(grads.bias, array![1.5]);
        assert_eq!(grad_in, array![[2.0], [1.0]]);
    }

    #[test]
    fn shape_mismatch_is_framework_error() {
        let layer = Dense::from_parts("d", array![[2.0]], array![1.0]).unwrap();
        assert!(matches!(layer.forward(&array![[1.0, 2.0]]), Err(PipelineError::Framework(_))));
        assert!(Dense::from_parts("d", array![[2.0]], array![1.0, 2.0]).is_err());
    }
}
