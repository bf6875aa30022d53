use serde::Deserialize;

/// Engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub tiering: TieringConfig,
    pub cache: CacheSettings,
    pub batch: BatchSettings,
    pub vision: VisionSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TieringConfig {
    /// Heuristic confidence at or above which the vision tier is skipped
    pub confidence_threshold: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub max_entries: usize,
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Maximum items per vision provider call
    pub max_items: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisionSettings {
    /// Provider API key. When absent the vision tier is disabled and
    /// every escalation resolves heuristically.
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub primary_model: String,
    pub fallback_model: String,
    pub max_inline_bytes: usize,
    pub max_dimension: u32,
    pub jpeg_quality: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tiering: TieringConfig::default(),
            cache: CacheSettings::default(),
            batch: BatchSettings::default(),
            vision: VisionSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for TieringConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.6,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: 500,
            ttl_secs: 24 * 3600,
        }
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self { max_items: 8 }
    }
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").ok(),
            base_url: None,
            primary_model: "gemini-1.5-flash".to_string(),
            fallback_model: "gemini-1.5-flash-8b".to_string(),
            max_inline_bytes: 3_000_000,
            max_dimension: 1024,
            jpeg_quality: 80,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.tiering.confidence_threshold, 0.6);
        assert_eq!(config.batch.max_items, 8);
        assert_eq!(config.cache.max_entries, 500);
        assert_eq!(config.vision.primary_model, "gemini-1.5-flash");
    }
}
