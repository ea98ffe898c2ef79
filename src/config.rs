//! Конфигурация пайплайна

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

pub const DEFAULT_SOURCE_URL: &str = "https://storage.googleapis.com/tfjs-tutorials/carsData.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_source_url")]
    pub source_url: String,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_prediction_points")]
    pub prediction_points: usize,
    #[serde(default)]
    pub training: TrainingConfig,
}

fn default_source_url() -> String { DEFAULT_SOURCE_URL.to_string() }
fn default_fetch_timeout_secs() -> u64 { 30 }
fn default_bind_addr() -> String { "0.0.0.0:8000".to_string() }
fn default_prediction_points() -> usize { 100 }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            bind_addr: default_bind_addr(),
            seed: None,
            prediction_points: default_prediction_points(),
            training: TrainingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Загрузка из JSON-файла; без пути - значения по умолчанию.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            None => Self::default(),
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigIo {
                    path: path.to_path_buf(),
                    source,
                })?;
                serde_json::from_str(&text)
                    .map_err(|e| PipelineError::InvalidConfig(format!("{}: {}", path.display(), e)))?
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetch_timeout_secs == 0 {
            return Err(PipelineError::InvalidConfig("fetch_timeout_secs must be positive".to_string()));
        }
        if self.prediction_points < 2 {
            return Err(PipelineError::InvalidConfig("prediction_points must be at least 2".to_string()));
        }
        self.training.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossKind {
    #[default]
    MeanSquaredError,
    MeanAbsoluteError,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizerConfig {
    Adam {
        #[serde(default = "default_adam_learning_rate")]
        learning_rate: f64,
        #[serde(default = "default_beta1")]
        beta1: f64,
        #[serde(default = "default_beta2")]
        beta2: f64,
        #[serde(default = "default_epsilon")]
        epsilon: f64,
    },
    Sgd {
        learning_rate: f64,
    },
}

fn default_adam_learning_rate() -> f64 { 0.001 }
fn default_beta1() -> f64 { 0.9 }
fn default_beta2() -> f64 { 0.999 }
fn default_epsilon() -> f64 { 1e-7 }

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig::Adam {
            learning_rate: default_adam_learning_rate(),
            beta1: default_beta1(),
            beta2: default_beta2(),
            epsilon: default_epsilon(),
        }
    }
}

impl OptimizerConfig {
    pub fn learning_rate(&self) -> f64 {
        match *self {
            OptimizerConfig::Adam { learning_rate, .. } => learning_rate,
            OptimizerConfig::Sgd { learning_rate } => learning_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub loss: LossKind,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,
}

fn default_batch_size() -> usize { 32 }
fn default_epochs() -> usize { 50 }
fn default_shuffle() -> bool { true }

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            optimizer: OptimizerConfig::default(),
            loss: LossKind::default(),
            batch_size: default_batch_size(),
            epochs: default_epochs(),
            shuffle: default_shuffle(),
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(PipelineError::InvalidConfig("batch_size must be positive".to_string()));
        }
        if self.epochs == 0 {
            return Err(PipelineError::InvalidConfig("epochs must be positive".to_string()));
        }
        let lr = self.optimizer.learning_rate();
        if !(lr.is_finite() && lr > 0.0) {
            return Err(PipelineError::InvalidConfig(format!("learning rate must be positive, got {}", lr)));
        }
        if let OptimizerConfig::Adam { beta1, beta2, epsilon, .. } = self.optimizer {
            if !(0.0..1.0).contains(&beta1) || !(0.0..1.0).contains(&beta2) {
                return Err(PipelineError::InvalidConfig("adam betas must be in [0, 1)".to_string()));
            }
            if epsilon <= 0.0 {
                return Err(PipelineError::InvalidConfig("adam epsilon must be positive".to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tutorial_constants() {
        let config = AppConfig::default();
        assert_eq!(config.training.batch_size, 32);
        assert_eq!(config.training.epochs, 50);
        assert!(config.training.shuffle);
        assert_eq!(config.training.loss, LossKind::MeanSquaredError);
        assert_eq!(config.training.optimizer.learning_rate(), 0.001);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"seed": 7, "training": {"epochs": 10, "optimizer": {"kind": "sgd", "learning_rate": 0.1}}}"#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.source_url, DEFAULT_SOURCE_URL);
        assert_eq!(config.training.epochs, 10);
        assert_eq!(config.training.batch_size, 32);
        assert_eq!(config.training.optimizer, OptimizerConfig::Sgd { learning_rate: 0.1 });
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let config = TrainingConfig {
            batch_size: 0,
            ..TrainingConfig::default()
        };
        assert!(matches!(config.validate(), Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let err = AppConfig::load(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigIo { .. }));
    }
}
