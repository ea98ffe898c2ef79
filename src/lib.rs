//! Cars MPG - регрессия расхода топлива по мощности

pub mod config;
pub mod dashboard;
pub mod data_loader;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod types;
pub mod visor;

pub use config::{AppConfig, LossKind, OptimizerConfig, TrainingConfig};
pub use data_loader::DataLoader;
pub use error::{PipelineError, Result};
pub use models::*;
pub use pipeline::{run_on_records, run_pipeline, train_and_evaluate};
pub use preprocessing::*;
pub use types::*;
pub use visor::{Dashboard, FanoutVisor, TracingVisor, Visor};
