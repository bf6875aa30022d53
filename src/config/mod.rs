pub mod app_config;

pub use app_config::{
    AnalysisConfig, BatchSettings, CacheSettings, LogFormat, LoggingSettings, TieringConfig,
    VisionSettings,
};
