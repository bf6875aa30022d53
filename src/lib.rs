//! Product Analysis Engine
//!
//! Tiered classification of catalog items for a scene-aware image
//! generation pipeline:
//! - Keyword heuristics first, free and synchronous
//! - Vision-model escalation only when heuristic confidence is low
//! - Content-addressed LRU/TTL caching across duplicate items
//! - Bounded batching of escalations into single provider calls

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AnalysisConfig;
pub use domain::{
    AiAnalysisResult, AnalysisMethod, BatchAnalysisResult, ProductAnalysisInput,
    ProductAnalysisResult, SceneType, Style,
};
pub use infrastructure::orchestrator::{AnalysisOrchestrator, AnalyzeOptions, EngineStats};

use std::sync::Arc;
use std::time::Duration;

use infrastructure::batch::{BatchConfig, BatchCoordinator};
use infrastructure::cache::{ContentCache, ContentCacheConfig};
use infrastructure::http_client::HttpClient;
use infrastructure::orchestrator::VisionTier;
use infrastructure::vision::{
    GeminiProvider, ImageFetcher, ImagePrepConfig, RasterCodec, VisionAnalysisClient,
    VisionModels,
};
use tracing::{info, warn};

/// Builds a fully wired orchestrator from configuration.
///
/// The instance is owned by the caller - construct one per process or
/// per worker and share it behind an `Arc`. Without a provider API key
/// the vision tier stays disabled and every escalation resolves to the
/// keyword result.
pub fn build_orchestrator(config: &AnalysisConfig) -> AnalysisOrchestrator {
    let cache = ContentCache::with_config(
        ContentCacheConfig::default()
            .with_max_entries(config.cache.max_entries)
            .with_ttl(Duration::from_secs(config.cache.ttl_secs)),
    );

    let vision = match &config.vision.api_key {
        Some(api_key) => {
            let http = Arc::new(HttpClient::new());

            let provider: Arc<dyn domain::VisionProvider> = match &config.vision.base_url {
                Some(base_url) => Arc::new(GeminiProvider::with_base_url(
                    HttpClient::new(),
                    api_key,
                    base_url,
                )),
                None => Arc::new(GeminiProvider::new(HttpClient::new(), api_key)),
            };
            info!(model = %config.vision.primary_model, "vision tier enabled");

            let fetcher = ImageFetcher::with_config(
                http,
                Some(Arc::new(RasterCodec)),
                ImagePrepConfig::default()
                    .with_max_inline_bytes(config.vision.max_inline_bytes)
                    .with_max_dimension(config.vision.max_dimension),
            );

            let client = Arc::new(VisionAnalysisClient::new(
                provider,
                fetcher,
                VisionModels {
                    primary: config.vision.primary_model.clone(),
                    fallback: config.vision.fallback_model.clone(),
                },
            ));

            Some(VisionTier {
                client: client.clone(),
                coordinator: BatchCoordinator::new(
                    client,
                    BatchConfig::default().with_max_items(config.batch.max_items),
                ),
            })
        }
        None => {
            warn!("no vision API key configured, running keyword tier only");
            None
        }
    };

    AnalysisOrchestrator::new(cache, vision)
        .with_confidence_threshold(config.tiering.confidence_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_without_credentials_runs_keyword_only() {
        let mut config = AnalysisConfig::default();
        config.vision.api_key = None;

        let orchestrator = build_orchestrator(&config);
        let input = ProductAnalysisInput::new("sku-1", "Oak Dining Table", "")
            .with_description("solid oak, 6 seats");

        let result = orchestrator.analyze_one(&input, AnalyzeOptions::default()).await;
        assert_eq!(result.analysis_method, AnalysisMethod::Fallback);
        assert_eq!(orchestrator.stats().ai_single_calls, 0);
    }

    #[test]
    fn test_build_with_credentials_enables_vision() {
        let mut config = AnalysisConfig::default();
        config.vision.api_key = Some("test-key".to_string());

        // Construction alone must not perform any I/O.
        let orchestrator = build_orchestrator(&config);
        assert_eq!(orchestrator.stats().ai_single_calls, 0);
    }
}
