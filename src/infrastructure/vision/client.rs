//! Vision-tier analysis client
//!
//! Turns inputs plus an instruction template into provider requests and
//! parses the structured JSON coming back. Every failure path resolves
//! to a usable result: single items retry once on the fallback model
//! and then degrade to the keyword result; nothing raises past the
//! orchestrator boundary.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::image_prep::ImageFetcher;
use crate::domain::analysis::color;
use crate::domain::{
    AiAnalysisResult, AnalysisMethod, ColorScheme, InlineImage, KeywordClassifier, Material,
    ProductAnalysisInput, SceneType, SizeClass, SizeEstimate, Style, VisionProvider,
    VisionRequest, DomainError, AI_CONFIDENCE,
};

/// Model pair used by the client: one retry on the fallback model
/// after a primary failure.
#[derive(Debug, Clone)]
pub struct VisionModels {
    pub primary: String,
    pub fallback: String,
}

impl Default for VisionModels {
    fn default() -> Self {
        Self {
            primary: "gemini-1.5-flash".to_string(),
            fallback: "gemini-1.5-flash-8b".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct VisionAnalysisClient {
    provider: Arc<dyn VisionProvider>,
    fetcher: ImageFetcher,
    classifier: KeywordClassifier,
    models: VisionModels,
}

impl VisionAnalysisClient {
    pub fn new(
        provider: Arc<dyn VisionProvider>,
        fetcher: ImageFetcher,
        models: VisionModels,
    ) -> Self {
        Self {
            provider,
            fetcher,
            classifier: KeywordClassifier::new(),
            models,
        }
    }

    /// Analyzes one item with an image. Missing or unresolvable images
    /// skip the provider entirely; request or parse failures retry once
    /// on the fallback model before degrading to the keyword result.
    pub async fn analyze_single(&self, input: &ProductAnalysisInput) -> AiAnalysisResult {
        let Some(image) = self.resolve_image(input).await else {
            warn!(
                product_id = %input.product_id,
                "no usable image for vision analysis, using keyword fallback"
            );
            return self.degraded(input);
        };

        let prompt = single_prompt(input);

        for model in [&self.models.primary, &self.models.fallback] {
            let request = VisionRequest::new(prompt.clone()).with_image(image.clone());

            match self.provider.generate(model, request).await {
                Ok(text) => match parse_single(&text) {
                    Ok(result) => return result,
                    Err(error) => {
                        warn!(product_id = %input.product_id, %model, %error, "unparseable vision response");
                    }
                },
                Err(error) => {
                    warn!(product_id = %input.product_id, %model, %error, "vision request failed");
                }
            }
        }

        self.degraded(input)
    }

    /// Analyzes a group of items in one provider round trip. The caller
    /// handles a returned error by falling back per item.
    pub async fn analyze_group(
        &self,
        inputs: &[ProductAnalysisInput],
    ) -> Result<HashMap<String, AiAnalysisResult>, DomainError> {
        let mut images = Vec::new();
        for input in inputs {
            if let Some(image) = self.resolve_image(input).await {
                images.push(image);
            }
        }

        let request = VisionRequest::new(batch_prompt(inputs)).with_images(images);
        let text = self.provider.generate(&self.models.primary, request).await?;

        let items = parse_batch_items(&text)?;

        let mut results = HashMap::with_capacity(inputs.len());
        for (index, input) in inputs.iter().enumerate() {
            let item = items
                .iter()
                .find(|item| item["productId"].as_str() == Some(input.product_id.as_str()))
                .or_else(|| items.get(index));

            let result = match item {
                Some(value) => {
                    let mut coercions = Vec::new();
                    let result = coerce_analysis(value, &mut coercions);
                    log_coercions(&input.product_id, &coercions);
                    result
                }
                None => {
                    warn!(
                        product_id = %input.product_id,
                        "item missing from batch response, using keyword fallback"
                    );
                    self.degraded(input)
                }
            };

            results.insert(input.product_id.clone(), result);
        }

        Ok(results)
    }

    /// Keyword result reshaped for the vision tier with scaled-down
    /// confidence.
    pub fn degraded(&self, input: &ProductAnalysisInput) -> AiAnalysisResult {
        AiAnalysisResult::degraded_from(&self.classifier.classify(input))
    }

    async fn resolve_image(&self, input: &ProductAnalysisInput) -> Option<InlineImage> {
        let url = input.image_url.as_deref()?;

        match self.fetcher.resolve(url).await {
            Ok(image) => Some(image),
            Err(error) => {
                warn!(product_id = %input.product_id, %error, "image resolution failed");
                None
            }
        }
    }
}

fn metadata_block(input: &ProductAnalysisInput) -> String {
    let mut block = format!("Product ID: {}\nName: {}", input.product_id, input.name);
    if let Some(description) = &input.description {
        block.push_str("\nDescription: ");
        block.push_str(description);
    }
    if !input.category.is_empty() {
        block.push_str("\nCategory: ");
        block.push_str(&input.category);
    }
    if !input.tags.is_empty() {
        block.push_str("\nTags: ");
        block.push_str(&input.tags.join(", "));
    }
    block
}

fn schema_description() -> String {
    let scenes = SceneType::ALL
        .iter()
        .map(|s| format!("\"{}\"", s.label()))
        .collect::<Vec<_>>()
        .join("|");
    let styles = Style::ALL
        .iter()
        .map(|s| format!("\"{}\"", s.label()))
        .collect::<Vec<_>>()
        .join("|");
    let materials = Material::ALL
        .iter()
        .map(|m| format!("\"{}\"", m.label()))
        .collect::<Vec<_>>()
        .join("|");

    format!(
        "{{\n  \"productId\": string,\n  \"productType\": string,\n  \
         \"sceneTypes\": [1-3 of {scenes}],\n  \
         \"colorSchemes\": [{{\"name\": string, \"colors\": [\"#RRGGBB\", ...]}}],\n  \
         \"materials\": [{materials}],\n  \
         \"size\": {{\"type\": \"small\"|\"medium\"|\"large\"|\"specific\", \"dimensions\": string (optional)}},\n  \
         \"styles\": [1-3 of {styles}]\n}}"
    )
}

fn single_prompt(input: &ProductAnalysisInput) -> String {
    format!(
        "Analyze this furniture/decor product photo and metadata.\n\n{}\n\n\
         Respond with ONLY a JSON object, no prose, matching exactly:\n{}\n\
         Colors must be 6-digit hex codes.",
        metadata_block(input),
        schema_description()
    )
}

fn batch_prompt(inputs: &[ProductAnalysisInput]) -> String {
    let blocks = inputs
        .iter()
        .enumerate()
        .map(|(i, input)| format!("--- Product {} ---\n{}", i + 1, metadata_block(input)))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Analyze each of the following {} products. Images, where present, \
         appear in the same order as the metadata blocks.\n\n{}\n\n\
         Respond with ONLY a JSON array, one entry per product in the same \
         order, each tagged with its productId and matching exactly:\n{}\n\
         Colors must be 6-digit hex codes.",
        inputs.len(),
        blocks,
        schema_description()
    )
}

/// Providers occasionally wrap JSON in markdown fences despite the
/// instructions; strip them before parsing.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn parse_single(text: &str) -> Result<AiAnalysisResult, DomainError> {
    let value: Value = serde_json::from_str(strip_code_fences(text))
        .map_err(|e| DomainError::provider("vision", format!("Invalid JSON: {}", e)))?;

    if !value.is_object() {
        return Err(DomainError::provider("vision", "Expected a JSON object"));
    }

    let mut coercions = Vec::new();
    let result = coerce_analysis(&value, &mut coercions);
    log_coercions(value["productId"].as_str().unwrap_or("?"), &coercions);

    Ok(result)
}

fn parse_batch_items(text: &str) -> Result<Vec<Value>, DomainError> {
    let value: Value = serde_json::from_str(strip_code_fences(text))
        .map_err(|e| DomainError::provider("vision", format!("Invalid JSON: {}", e)))?;

    value
        .as_array()
        .cloned()
        .ok_or_else(|| DomainError::provider("vision", "Expected a JSON array"))
}

/// One validation pass over a response object. Every unexpected shape
/// is replaced with its documented default and recorded, never failing
/// the item as a whole.
fn coerce_analysis(value: &Value, coercions: &mut Vec<String>) -> AiAnalysisResult {
    let product_type = match value["productType"].as_str() {
        Some(s) if !s.trim().is_empty() => s.trim().to_lowercase(),
        _ => {
            coercions.push("productType -> \"furniture\"".to_string());
            "furniture".to_string()
        }
    };

    let mut scene_types: Vec<SceneType> = value["sceneTypes"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let label = item.as_str()?;
                    let scene = SceneType::from_label(label);
                    if scene.is_none() {
                        coercions.push(format!("sceneTypes dropped {:?}", label));
                    }
                    scene
                })
                .collect()
        })
        .unwrap_or_default();
    scene_types.truncate(3);
    if scene_types.is_empty() {
        coercions.push("sceneTypes -> [Living Room]".to_string());
        scene_types.push(SceneType::LivingRoom);
    }

    let color_schemes: Vec<ColorScheme> = value["colorSchemes"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    if !item.is_object() {
                        coercions.push("colorSchemes dropped non-object entry".to_string());
                        return None;
                    }

                    let name = item["name"].as_str().unwrap_or("Palette").to_string();
                    let colors = item["colors"]
                        .as_array()
                        .map(|colors| {
                            colors
                                .iter()
                                .filter_map(|c| c.as_str())
                                .map(color::normalize)
                                .collect()
                        })
                        .unwrap_or_default();

                    Some(ColorScheme { name, colors })
                })
                .collect()
        })
        .unwrap_or_default();

    let materials: Vec<Material> = value["materials"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let label = item.as_str()?;
                    let material = Material::from_label(label);
                    if material.is_none() {
                        coercions.push(format!("materials dropped {:?}", label));
                    }
                    material
                })
                .collect()
        })
        .unwrap_or_default();

    let size = match value["size"].as_object() {
        Some(size_obj) => {
            let class = size_obj
                .get("type")
                .and_then(|t| t.as_str())
                .and_then(SizeClass::from_label)
                .unwrap_or_else(|| {
                    coercions.push("size.type -> medium".to_string());
                    SizeClass::Medium
                });
            SizeEstimate {
                class,
                dimensions: size_obj
                    .get("dimensions")
                    .and_then(|d| d.as_str())
                    .map(str::to_string),
            }
        }
        None => {
            coercions.push("size -> medium".to_string());
            SizeEstimate::medium()
        }
    };

    let mut styles: Vec<Style> = value["styles"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let label = item.as_str()?;
                    let style = Style::from_label(label);
                    if style.is_none() {
                        coercions.push(format!("styles dropped {:?}", label));
                    }
                    style
                })
                .collect()
        })
        .unwrap_or_default();
    styles.truncate(3);
    if styles.is_empty() {
        coercions.push("styles -> [Modern]".to_string());
        styles.push(Style::Modern);
    }

    AiAnalysisResult {
        product_type,
        scene_types,
        color_schemes,
        materials,
        size,
        styles,
        confidence: AI_CONFIDENCE,
        analysis_method: AnalysisMethod::Ai,
    }
}

fn log_coercions(product_id: &str, coercions: &[String]) {
    if !coercions.is_empty() {
        debug!(product_id, coercions = ?coercions, "coerced vision response fields");
    }
}
