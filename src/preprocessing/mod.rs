/// Модуль предобработки данных

pub mod normalization;
pub mod tensors;

pub use normalization::MinMaxNormalizer;
pub use tensors::{PreparedTensors, TensorPreprocessor};
