//! Analysis result types for the heuristic and vision tiers

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::taxonomy::{Material, SceneType, Style};

/// Confidence assigned to a successfully parsed vision-tier result.
pub const AI_CONFIDENCE: f32 = 0.85;

/// Factor applied to the heuristic confidence when a vision-tier
/// request degrades to the keyword result.
pub const FALLBACK_CONFIDENCE_SCALE: f32 = 0.7;

/// How a result was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMethod {
    Ai,
    Fallback,
}

/// Primary color guess attached to a heuristic result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductColors {
    pub primary: String,
}

/// Output of the keyword tier. Always produced, never fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAnalysisResult {
    pub product_id: String,
    pub scene_type: SceneType,
    pub product_type: String,
    pub style: Vec<Style>,
    pub materials: Vec<Material>,
    pub colors: ProductColors,
    /// Primary scene first, then complements.
    pub suggested_scene_types: Vec<SceneType>,
    /// Top three styles by keyword hits.
    pub suggested_styles: Vec<Style>,
    pub prompt_keywords: Vec<String>,
    /// Always within `[0, 1]`.
    pub confidence: f32,
}

/// Named color palette in a vision-tier result. Colors are canonical
/// `#RRGGBB` strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorScheme {
    pub name: String,
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Small,
    Medium,
    Large,
    Specific,
}

impl SizeClass {
    pub fn from_label(label: &str) -> Option<SizeClass> {
        match label.trim().to_lowercase().as_str() {
            "small" => Some(SizeClass::Small),
            "medium" => Some(SizeClass::Medium),
            "large" => Some(SizeClass::Large),
            "specific" => Some(SizeClass::Specific),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeEstimate {
    #[serde(rename = "type")]
    pub class: SizeClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
}

impl SizeEstimate {
    pub fn medium() -> Self {
        Self {
            class: SizeClass::Medium,
            dimensions: None,
        }
    }
}

/// Output of the vision tier, or an AI-shaped rendition of the keyword
/// result when the vision tier was skipped or failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiAnalysisResult {
    pub product_type: String,
    /// One to three scene candidates, best first.
    pub scene_types: Vec<SceneType>,
    pub color_schemes: Vec<ColorScheme>,
    pub materials: Vec<Material>,
    pub size: SizeEstimate,
    /// One to three styles.
    pub styles: Vec<Style>,
    pub confidence: f32,
    pub analysis_method: AnalysisMethod,
}

impl AiAnalysisResult {
    /// Shapes a keyword-tier result into the vision-tier schema.
    ///
    /// Used when the heuristic confidence clears the tiering gate: the
    /// result is tagged as a fallback but keeps the full heuristic
    /// confidence.
    pub fn from_heuristic(heuristic: &ProductAnalysisResult) -> Self {
        Self {
            product_type: heuristic.product_type.clone(),
            scene_types: heuristic.suggested_scene_types.iter().copied().take(3).collect(),
            color_schemes: vec![ColorScheme {
                name: "Primary".to_string(),
                colors: vec![super::color::normalize(&heuristic.colors.primary)],
            }],
            materials: heuristic.materials.clone(),
            size: SizeEstimate::medium(),
            styles: heuristic.suggested_styles.iter().copied().take(3).collect(),
            confidence: heuristic.confidence.clamp(0.0, 1.0),
            analysis_method: AnalysisMethod::Fallback,
        }
    }

    /// Degraded rendition used when a vision-tier request failed or
    /// could not be attempted: heuristic shape, confidence scaled down.
    pub fn degraded_from(heuristic: &ProductAnalysisResult) -> Self {
        let mut result = Self::from_heuristic(heuristic);
        result.confidence = (heuristic.confidence * FALLBACK_CONFIDENCE_SCALE).clamp(0.0, 1.0);
        result
    }

    pub fn primary_scene(&self) -> Option<SceneType> {
        self.scene_types.first().copied()
    }
}

impl ProductAnalysisResult {
    /// Overlays vision-tier values on this heuristic baseline. AI
    /// values win for scene type, product type, styles, materials and
    /// confidence when present.
    pub fn merged_with(&self, ai: &AiAnalysisResult) -> ProductAnalysisResult {
        let mut merged = self.clone();

        if let Some(scene) = ai.primary_scene() {
            merged.scene_type = scene;
            merged.suggested_scene_types = ai.scene_types.clone();
        }
        if !ai.product_type.is_empty() {
            merged.product_type = ai.product_type.clone();
        }
        if !ai.styles.is_empty() {
            merged.style = ai.styles.clone();
            merged.suggested_styles = ai.styles.iter().copied().take(3).collect();
        }
        if !ai.materials.is_empty() {
            merged.materials = ai.materials.clone();
        }
        if let Some(color) = ai
            .color_schemes
            .first()
            .and_then(|scheme| scheme.colors.first())
        {
            merged.colors.primary = color.clone();
        }
        merged.confidence = ai.confidence.clamp(0.0, 1.0);

        merged
    }
}

/// Aggregate over one `analyze_collection` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchAnalysisResult {
    pub scene_type_distribution: HashMap<SceneType, usize>,
    /// Unique product types in first-seen order.
    pub product_types: Vec<String>,
    pub dominant_category: SceneType,
    /// Top five styles by frequency.
    pub suggested_styles: Vec<Style>,
    pub recommended_inspiration_keywords: Vec<String>,
    pub product_room_assignments: HashMap<String, SceneType>,
    pub products: Vec<ProductAnalysisResult>,
    pub analyzed_at: DateTime<Utc>,
}
