//! Vision-tier infrastructure: provider implementation, image
//! preparation and the analysis client

pub mod client;
pub mod gemini;
pub mod image_prep;

pub use client::{VisionAnalysisClient, VisionModels};
pub use gemini::GeminiProvider;
pub use image_prep::{ImageCodec, ImageFetcher, ImagePrepConfig, RasterCodec};
