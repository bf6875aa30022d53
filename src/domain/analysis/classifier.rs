//! Keyword tier: dependency-free heuristic classification
//!
//! Scores the concatenated product text against static keyword tables.
//! Cheap, synchronous, and total: every input produces a result, at
//! worst a low-confidence default.

use tracing::debug;

use super::color;
use super::input::ProductAnalysisInput;
use super::result::{ProductAnalysisResult, ProductColors};
use super::taxonomy::{Material, SceneType, Style};

/// Highest confidence the keyword tier will claim.
const MAX_KEYWORD_CONFIDENCE: f32 = 0.9;

/// Confidence floor when nothing matches.
const BASE_CONFIDENCE: f32 = 0.5;

/// Confidence gained per scene keyword hit.
const CONFIDENCE_PER_HIT: f32 = 0.1;

/// Product-type nouns recognized in names when no category is given.
const PRODUCT_TYPE_KEYWORDS: &[&str] = &[
    "sofa", "couch", "table", "chair", "bed", "desk", "lamp", "shelf", "cabinet", "stool",
    "bench", "mirror", "rug", "dresser", "wardrobe",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classifies an input from its text alone. Never fails.
    pub fn classify(&self, input: &ProductAnalysisInput) -> ProductAnalysisResult {
        let text = input.search_text();

        let (scene_type, best_score) = self.best_scene(&text);
        let styles = self.matching_styles(&text);
        let materials = self.matching_materials(&text);

        let confidence = if best_score > 0 {
            (BASE_CONFIDENCE + CONFIDENCE_PER_HIT * best_score as f32)
                .min(MAX_KEYWORD_CONFIDENCE)
        } else {
            BASE_CONFIDENCE
        };

        let suggested_scene_types = vec![scene_type, scene_type.complement()];
        let suggested_styles: Vec<Style> = styles.iter().copied().take(3).collect();
        let product_type = derive_product_type(input);
        let primary_color = color::detect_in_text(&text)
            .map(str::to_string)
            .unwrap_or_else(|| color::FALLBACK_GRAY.to_string());
        let prompt_keywords =
            build_prompt_keywords(&product_type, scene_type, &styles, &materials);

        debug!(
            product_id = %input.product_id,
            scene = %scene_type,
            score = best_score,
            confidence,
            "keyword classification"
        );

        ProductAnalysisResult {
            product_id: input.product_id.clone(),
            scene_type,
            product_type,
            style: styles,
            materials,
            colors: ProductColors {
                primary: primary_color,
            },
            suggested_scene_types,
            suggested_styles,
            prompt_keywords,
            confidence,
        }
    }

    /// Best scene by distinct keyword hits; ties keep the earliest
    /// variant, zero hits default to the first (Living Room).
    fn best_scene(&self, text: &str) -> (SceneType, usize) {
        let mut best = (SceneType::ALL[0], 0);

        for scene in SceneType::ALL {
            let score = count_hits(text, scene.keywords());
            if score > best.1 {
                best = (scene, score);
            }
        }

        best
    }

    /// Every style with at least one hit, ordered by hit count.
    fn matching_styles(&self, text: &str) -> Vec<Style> {
        let mut scored: Vec<(Style, usize)> = Style::ALL
            .into_iter()
            .map(|style| (style, count_hits(text, style.keywords())))
            .filter(|(_, score)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        if scored.is_empty() {
            return vec![Style::Modern];
        }

        scored.into_iter().map(|(style, _)| style).collect()
    }

    /// Every material with at least one hit.
    fn matching_materials(&self, text: &str) -> Vec<Material> {
        Material::ALL
            .into_iter()
            .filter(|material| count_hits(text, material.keywords()) > 0)
            .collect()
    }
}

fn count_hits(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|kw| text.contains(*kw)).count()
}

fn derive_product_type(input: &ProductAnalysisInput) -> String {
    let category = input.category.trim();
    if !category.is_empty() {
        return category.to_lowercase();
    }

    let name = input.name.to_lowercase();
    PRODUCT_TYPE_KEYWORDS
        .iter()
        .find(|kw| name.contains(*kw))
        .map(|kw| kw.to_string())
        .unwrap_or_else(|| "furniture".to_string())
}

fn build_prompt_keywords(
    product_type: &str,
    scene: SceneType,
    styles: &[Style],
    materials: &[Material],
) -> Vec<String> {
    let mut keywords = vec![product_type.to_string(), scene.label().to_lowercase()];
    keywords.extend(styles.iter().map(|s| s.label().to_lowercase()));
    keywords.extend(materials.iter().map(|m| m.label().to_lowercase()));
    keywords.dedup();
    keywords
}
