//! Domain layer - Core types, taxonomy and provider seams

pub mod analysis;
pub mod error;
pub mod vision;

pub use analysis::{
    AiAnalysisResult, AnalysisMethod, BatchAnalysisResult, ColorScheme, KeywordClassifier,
    Material, ProductAnalysisInput, ProductAnalysisResult, ProductColors, SceneType, SizeClass,
    SizeEstimate, Style, AI_CONFIDENCE, FALLBACK_CONFIDENCE_SCALE,
};
pub use error::DomainError;
pub use vision::{InlineImage, VisionProvider, VisionRequest};
