//! Оптимизаторы

use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD, Zip};

use crate::config::OptimizerConfig;
use crate::error::{PipelineError, Result};

/// Пара (параметр, градиент) одного тензора.
pub type ParamUpdate<'a> = (ArrayViewMutD<'a, f64>, ArrayViewD<'a, f64>);

pub trait Optimizer: Send {
    /// Один шаг обновления. Порядок тензоров должен быть одинаковым
    /// на всех шагах.
    fn apply_gradients(&mut self, updates: Vec<ParamUpdate<'_>>) -> Result<()>;
}

pub fn build_optimizer(config: &OptimizerConfig) -> Box<dyn Optimizer> {
    match *config {
        OptimizerConfig::Adam {
            learning_rate,
            beta1,
            beta2,
            epsilon,
        } => Box::new(Adam::new(learning_rate, beta1, beta2, epsilon)),
        OptimizerConfig::Sgd { learning_rate } => Box::new(Sgd::new(learning_rate)),
    }
}

#[derive(Debug)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    beta1_t: f64,
    beta2_t: f64,
    m: Vec<ArrayD<f64>>,
    v: Vec<ArrayD<f64>>,
}

impl Adam {
    pub fn new(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            beta1_t: 1.0,
            beta2_t: 1.0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    fn ensure_slots(&mut self, updates: &[ParamUpdate<'_>]) -> Result<()> {
        if self.m.is_empty() {
            self.m = updates.iter().map(|(p, _)| ArrayD::zeros(p.raw_dim())).collect();
            self.v = self.m.clone();
        }
        if self.m.len() != updates.len() {
            return Err(PipelineError::Framework(format!(
                "optimizer tracks {} tensors, got {}",
                self.m.len(),
                updates.len()
            )));
        }
        for ((p, g), m) in updates.iter().zip(&self.m) {
            if p.shape() != m.shape() || g.shape() != m.shape() {
                return Err(PipelineError::Framework(format!(
                    "shape mismatch: param {:?}, grad {:?}, slot {:?}",
                    p.shape(),
                    g.shape(),
                    m.shape()
                )));
            }
        }
        Ok(())
    }
}

impl Optimizer for Adam {
    fn apply_gradients(&mut self, updates: Vec<ParamUpdate<'_>>) -> Result<()> {
        self.ensure_slots(&updates)?;

        let Self {
            learning_rate: lr,
            beta1: b1,
            beta2: b2,
            epsilon: eps,
            ..
        } = *self;

        self.beta1_t *= b1;
        self.beta2_t *= b2;
        let bc1 = 1.0 - self.beta1_t;
        let bc2 = 1.0 - self.beta2_t;

        for ((mut p, g), (m, v)) in updates.into_iter().zip(self.m.iter_mut().zip(self.v.iter_mut())) {
            Zip::from(&mut p).and(&g).and(m).and(v).for_each(|p, &g, m, v| {
                *m = b1 * *m + (1.0 - b1) * g;
                *v = b2 * *v + (1.0 - b2) * g * g;
                *p -= lr * (*m / bc1) / ((*v / bc2).sqrt() + eps);
            });
        }

        Ok(())
    }
}

#[derive(Debug)]
pub struct Sgd {
    learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for Sgd {
    fn apply_gradients(&mut self, updates: Vec<ParamUpdate<'_>>) -> Result<()> {
        for (mut p, g) in updates {
            if p.shape() != g.shape() {
                return Err(PipelineError::Framework(format!(
                    "shape mismatch: param {:?}, grad {:?}",
                    p.shape(),
                    g.shape()
                )));
            }
            p.scaled_add(-self.learning_rate, &g);
        }
        Ok(())
    }
}
