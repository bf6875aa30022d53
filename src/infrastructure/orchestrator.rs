//! Analysis orchestration
//!
//! Ties the tiers together: cache lookup first, then the keyword
//! classifier, then - only when confidence falls short of the gate or
//! the caller forces it - the vision tier. Always returns a usable
//! result; `analysis_method` and `confidence` signal degradation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use super::batch::BatchCoordinator;
use super::cache::ContentCache;
use super::vision::client::VisionAnalysisClient;
use crate::domain::{
    AiAnalysisResult, BatchAnalysisResult, KeywordClassifier, ProductAnalysisInput,
    ProductAnalysisResult, SceneType, Style,
};

/// Default heuristic confidence needed to skip the vision tier.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.6;

/// Per-call options.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeOptions {
    /// Escalate to the vision tier even when the heuristic confidence
    /// clears the threshold.
    pub force_ai: bool,
    /// Whether `analyze_collection` may use the vision tier at all.
    pub use_ai: bool,
}

impl AnalyzeOptions {
    pub fn with_force_ai(mut self) -> Self {
        self.force_ai = true;
        self
    }

    pub fn with_ai(mut self) -> Self {
        self.use_ai = true;
        self
    }
}

/// Vision tier wiring: absent when no provider credentials are
/// configured, in which case every escalation short-circuits to the
/// keyword fallback.
#[derive(Debug)]
pub struct VisionTier {
    pub client: Arc<VisionAnalysisClient>,
    pub coordinator: BatchCoordinator,
}

/// Running counters, exposed for observability only.
#[derive(Debug, Default)]
struct EngineCounters {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    heuristic_skips: AtomicU64,
    ai_single_calls: AtomicU64,
    ai_batch_calls: AtomicU64,
}

/// Snapshot of the counters plus the derived hit rate.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EngineStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub heuristic_skips: u64,
    pub ai_single_calls: u64,
    pub ai_batch_calls: u64,
    pub cache_hit_rate: f64,
}

#[derive(Debug)]
pub struct AnalysisOrchestrator {
    classifier: KeywordClassifier,
    cache: ContentCache,
    vision: Option<VisionTier>,
    confidence_threshold: f32,
    counters: EngineCounters,
}

impl AnalysisOrchestrator {
    pub fn new(cache: ContentCache, vision: Option<VisionTier>) -> Self {
        Self {
            classifier: KeywordClassifier::new(),
            cache,
            vision,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            counters: EngineCounters::default(),
        }
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Analyzes one item through the full tiering pipeline.
    pub async fn analyze_one(
        &self,
        input: &ProductAnalysisInput,
        options: AnalyzeOptions,
    ) -> AiAnalysisResult {
        let key = input.content_key();

        if let Some(hit) = self.cache.get(&key) {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            debug!(product_id = %input.product_id, "cache hit");
            return hit;
        }
        self.counters.cache_misses.fetch_add(1, Ordering::Relaxed);

        let heuristic = self.classifier.classify(input);

        let result = if !options.force_ai && heuristic.confidence >= self.confidence_threshold {
            self.counters.heuristic_skips.fetch_add(1, Ordering::Relaxed);
            debug!(
                product_id = %input.product_id,
                confidence = heuristic.confidence,
                "keyword confidence clears threshold, skipping vision tier"
            );
            AiAnalysisResult::from_heuristic(&heuristic)
        } else {
            match &self.vision {
                Some(tier) => {
                    self.counters.ai_single_calls.fetch_add(1, Ordering::Relaxed);
                    tier.client.analyze_single(input).await
                }
                None => {
                    warn!(
                        product_id = %input.product_id,
                        "vision tier not configured, degrading to keyword result"
                    );
                    AiAnalysisResult::degraded_from(&heuristic)
                }
            }
        };

        self.cache.insert(&key, result.clone());
        result
    }

    /// Applies the same tiering per item, collecting the ones that need
    /// vision analysis into bounded provider batches.
    pub async fn analyze_batch(
        &self,
        inputs: &[ProductAnalysisInput],
        options: AnalyzeOptions,
    ) -> HashMap<String, AiAnalysisResult> {
        let mut results = HashMap::with_capacity(inputs.len());
        let mut pending: Vec<ProductAnalysisInput> = Vec::new();

        for input in inputs {
            let key = input.content_key();

            if let Some(hit) = self.cache.get(&key) {
                self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
                results.insert(input.product_id.clone(), hit);
                continue;
            }
            self.counters.cache_misses.fetch_add(1, Ordering::Relaxed);

            let heuristic = self.classifier.classify(input);
            if !options.force_ai && heuristic.confidence >= self.confidence_threshold {
                self.counters.heuristic_skips.fetch_add(1, Ordering::Relaxed);
                let result = AiAnalysisResult::from_heuristic(&heuristic);
                self.cache.insert(&key, result.clone());
                results.insert(input.product_id.clone(), result);
                continue;
            }

            pending.push(input.clone());
        }

        if pending.is_empty() {
            return results;
        }

        match &self.vision {
            Some(tier) => {
                let groups = tier.coordinator.group_count(pending.len()) as u64;
                self.counters.ai_batch_calls.fetch_add(groups, Ordering::Relaxed);

                let resolved = tier.coordinator.run(&pending).await;
                for input in &pending {
                    if let Some(result) = resolved.get(&input.product_id) {
                        self.cache.insert(&input.content_key(), result.clone());
                        results.insert(input.product_id.clone(), result.clone());
                    }
                }
            }
            None => {
                warn!(
                    pending = pending.len(),
                    "vision tier not configured, degrading pending items to keyword results"
                );
                for input in &pending {
                    let result =
                        AiAnalysisResult::degraded_from(&self.classifier.classify(input));
                    self.cache.insert(&input.content_key(), result.clone());
                    results.insert(input.product_id.clone(), result);
                }
            }
        }

        results
    }

    /// Analyzes a whole collection and aggregates the results for the
    /// downstream generation pipeline.
    pub async fn analyze_collection(
        &self,
        inputs: &[ProductAnalysisInput],
        options: AnalyzeOptions,
    ) -> BatchAnalysisResult {
        let mut products: Vec<ProductAnalysisResult> = inputs
            .iter()
            .map(|input| self.classifier.classify(input))
            .collect();

        if options.use_ai {
            let ai_results = self.analyze_batch(inputs, options).await;
            for product in &mut products {
                if let Some(ai) = ai_results.get(&product.product_id) {
                    *product = product.merged_with(ai);
                }
            }
        }

        aggregate(products)
    }

    pub fn stats(&self) -> EngineStats {
        let cache_hits = self.counters.cache_hits.load(Ordering::Relaxed);
        let cache_misses = self.counters.cache_misses.load(Ordering::Relaxed);
        let lookups = cache_hits + cache_misses;
        let cache_hit_rate = if lookups > 0 {
            cache_hits as f64 / lookups as f64
        } else {
            0.0
        };

        EngineStats {
            cache_hits,
            cache_misses,
            heuristic_skips: self.counters.heuristic_skips.load(Ordering::Relaxed),
            ai_single_calls: self.counters.ai_single_calls.load(Ordering::Relaxed),
            ai_batch_calls: self.counters.ai_batch_calls.load(Ordering::Relaxed),
            cache_hit_rate,
        }
    }

    /// Drops every cached entry unconditionally.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

fn aggregate(products: Vec<ProductAnalysisResult>) -> BatchAnalysisResult {
    let mut scene_type_distribution: HashMap<SceneType, usize> = HashMap::new();
    let mut product_types: Vec<String> = Vec::new();
    let mut style_counts: HashMap<Style, usize> = HashMap::new();
    let mut product_room_assignments: HashMap<String, SceneType> = HashMap::new();

    for product in &products {
        *scene_type_distribution.entry(product.scene_type).or_insert(0) += 1;
        if !product_types.contains(&product.product_type) {
            product_types.push(product.product_type.clone());
        }
        for style in &product.style {
            *style_counts.entry(*style).or_insert(0) += 1;
        }
        product_room_assignments.insert(product.product_id.clone(), product.scene_type);
    }

    // Scene declaration order breaks frequency ties deterministically.
    let dominant_category = SceneType::ALL
        .into_iter()
        .filter(|scene| scene_type_distribution.contains_key(scene))
        .max_by_key(|scene| scene_type_distribution[scene])
        .unwrap_or(SceneType::LivingRoom);

    let mut ranked_styles: Vec<(Style, usize)> = Style::ALL
        .into_iter()
        .filter_map(|style| style_counts.get(&style).map(|count| (style, *count)))
        .collect();
    ranked_styles.sort_by(|a, b| b.1.cmp(&a.1));
    let suggested_styles: Vec<Style> = ranked_styles
        .into_iter()
        .take(5)
        .map(|(style, _)| style)
        .collect();

    let mut scenes_by_frequency: Vec<(SceneType, usize)> = SceneType::ALL
        .into_iter()
        .filter_map(|scene| scene_type_distribution.get(&scene).map(|count| (scene, *count)))
        .collect();
    scenes_by_frequency.sort_by(|a, b| b.1.cmp(&a.1));

    let mut recommended_inspiration_keywords: Vec<String> = Vec::new();
    for (scene, _) in &scenes_by_frequency {
        recommended_inspiration_keywords.push(scene.label().to_lowercase());
    }
    for style in &suggested_styles {
        let keyword = style.label().to_lowercase();
        if !recommended_inspiration_keywords.contains(&keyword) {
            recommended_inspiration_keywords.push(keyword);
        }
    }

    BatchAnalysisResult {
        scene_type_distribution,
        product_types,
        dominant_category,
        suggested_styles,
        recommended_inspiration_keywords,
        product_room_assignments,
        products,
        analyzed_at: Utc::now(),
    }
}
