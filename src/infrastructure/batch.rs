//! Batch coordination for vision-tier escalations
//!
//! Partitions pending items into fixed-size, order-preserving groups
//! and resolves each group with one provider round trip. Groups run
//! sequentially to bound outstanding request volume. A failed group
//! degrades only its own members; every item always resolves.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::vision::client::VisionAnalysisClient;
use crate::domain::{AiAnalysisResult, ProductAnalysisInput};

/// Configuration for batch partitioning
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum items per provider call
    pub max_items: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { max_items: 8 }
    }
}

impl BatchConfig {
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items.max(1);
        self
    }
}

#[derive(Debug)]
pub struct BatchCoordinator {
    client: Arc<VisionAnalysisClient>,
    config: BatchConfig,
}

impl BatchCoordinator {
    pub fn new(client: Arc<VisionAnalysisClient>, config: BatchConfig) -> Self {
        Self { client, config }
    }

    /// Number of provider calls `run` will issue for `item_count` items.
    pub fn group_count(&self, item_count: usize) -> usize {
        item_count.div_ceil(self.config.max_items.max(1))
    }

    /// Resolves every input to a vision-tier result, one group at a
    /// time. Group failures fall back to the keyword result for that
    /// group's members only.
    pub async fn run(
        &self,
        inputs: &[ProductAnalysisInput],
    ) -> HashMap<String, AiAnalysisResult> {
        let mut results = HashMap::with_capacity(inputs.len());
        let group_size = self.config.max_items.max(1);

        for (index, group) in inputs.chunks(group_size).enumerate() {
            match self.client.analyze_group(group).await {
                Ok(group_results) => {
                    info!(group = index, items = group.len(), "batch group analyzed");
                    results.extend(group_results);
                }
                Err(error) => {
                    warn!(
                        group = index,
                        items = group.len(),
                        %error,
                        "batch group failed, degrading members to keyword results"
                    );
                    for input in group {
                        results.insert(input.product_id.clone(), self.client.degraded(input));
                    }
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vision::provider::mock::MockVisionProvider;
    use crate::domain::AnalysisMethod;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use crate::infrastructure::vision::client::VisionModels;
    use crate::infrastructure::vision::image_prep::ImageFetcher;

    fn coordinator(
        provider: MockVisionProvider,
        max_items: usize,
    ) -> (Arc<MockVisionProvider>, BatchCoordinator) {
        let provider = Arc::new(provider);
        let client = Arc::new(VisionAnalysisClient::new(
            provider.clone(),
            ImageFetcher::new(Arc::new(MockHttpClient::new()), None),
            VisionModels::default(),
        ));
        (
            provider.clone(),
            BatchCoordinator::new(client, BatchConfig::default().with_max_items(max_items)),
        )
    }

    fn inputs(count: usize) -> Vec<ProductAnalysisInput> {
        (0..count)
            .map(|i| ProductAnalysisInput::new(format!("sku-{i}"), format!("Item {i}"), ""))
            .collect()
    }

    fn array_response(ids: &[&str]) -> String {
        let entries: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| {
                serde_json::json!({
                    "productId": id,
                    "productType": "chair",
                    "sceneTypes": ["Office"],
                    "colorSchemes": [],
                    "materials": ["Metal"],
                    "size": {"type": "small"},
                    "styles": ["Modern"],
                })
            })
            .collect();
        serde_json::Value::Array(entries).to_string()
    }

    #[tokio::test]
    async fn test_partitioning_issues_ceil_m_over_k_calls() {
        let items = inputs(10);
        let ids: Vec<String> = items.iter().map(|i| i.product_id.clone()).collect();
        let first: Vec<&str> = ids[..8].iter().map(String::as_str).collect();
        let second: Vec<&str> = ids[8..].iter().map(String::as_str).collect();

        let (provider, coordinator) = coordinator(
            MockVisionProvider::new()
                .with_response(array_response(&first))
                .with_response(array_response(&second)),
            8,
        );

        let results = coordinator.run(&items).await;

        assert_eq!(provider.call_count(), 2);
        assert_eq!(results.len(), 10);
        for input in &items {
            assert!(results.contains_key(&input.product_id));
        }
    }

    #[tokio::test]
    async fn test_group_failure_is_isolated() {
        let items = inputs(4);
        let second_ids: Vec<String> = items[2..].iter().map(|i| i.product_id.clone()).collect();
        let second: Vec<&str> = second_ids.iter().map(String::as_str).collect();

        let (provider, coordinator) = coordinator(
            MockVisionProvider::new()
                .with_error("boom")
                .with_response(array_response(&second)),
            2,
        );

        let results = coordinator.run(&items).await;

        assert_eq!(provider.call_count(), 2);
        assert_eq!(results["sku-0"].analysis_method, AnalysisMethod::Fallback);
        assert_eq!(results["sku-1"].analysis_method, AnalysisMethod::Fallback);
        assert_eq!(results["sku-2"].analysis_method, AnalysisMethod::Ai);
        assert_eq!(results["sku-3"].analysis_method, AnalysisMethod::Ai);
    }

    #[tokio::test]
    async fn test_every_item_resolves_even_when_all_groups_fail() {
        let items = inputs(5);
        let (provider, coordinator) = coordinator(
            MockVisionProvider::new()
                .with_error("a")
                .with_error("b")
                .with_error("c"),
            2,
        );

        let results = coordinator.run(&items).await;

        assert_eq!(provider.call_count(), 3);
        assert_eq!(results.len(), 5);
        assert!(results
            .values()
            .all(|r| r.analysis_method == AnalysisMethod::Fallback));
    }

    #[test]
    fn test_group_count() {
        let (_, coordinator) = coordinator(MockVisionProvider::new(), 8);
        assert_eq!(coordinator.group_count(0), 0);
        assert_eq!(coordinator.group_count(8), 1);
        assert_eq!(coordinator.group_count(9), 2);
        assert_eq!(coordinator.group_count(16), 2);
    }
}
