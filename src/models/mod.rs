/// ML модели

pub mod dense;
pub mod evaluation;
pub mod loss;
pub mod optimizer;
pub mod sequential;
pub mod training;

pub use dense::Dense;
pub use optimizer::{Adam, Optimizer, Sgd};
pub use sequential::{ModelBuilder, Sequential};
pub use training::{TrainingObserver, TrainingRunner};
