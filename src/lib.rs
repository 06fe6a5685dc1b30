pub mod level;
pub mod scoring;
pub mod settings;
pub mod utils;

pub use level::{Band, Level};
pub use scoring::{evaluate_transcript, EvaluationResult, Evaluator};
pub use settings::{settings, Settings};
