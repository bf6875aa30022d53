//! Core analysis types: inputs, results, taxonomy, keyword tier

pub mod classifier;
pub mod color;
pub mod input;
pub mod result;
pub mod taxonomy;

pub use classifier::KeywordClassifier;
pub use input::ProductAnalysisInput;
pub use result::{
    AiAnalysisResult, AnalysisMethod, BatchAnalysisResult, ColorScheme, ProductAnalysisResult,
    ProductColors, SizeClass, SizeEstimate, AI_CONFIDENCE, FALLBACK_CONFIDENCE_SCALE,
};
pub use taxonomy::{Material, SceneType, Style};
