//! Image resolution and best-effort downscaling
//!
//! An `imageUrl` may be a data URL or a remote http(s) reference; both
//! resolve to raw bytes plus a MIME type. Oversized payloads are
//! downscaled and re-encoded before going to the provider, but only
//! when a codec is wired in and succeeds - resizing is a capability,
//! not a requirement, and any codec failure sends the original bytes.

use std::fmt::Debug;
use std::sync::Arc;

use base64::Engine;
use tracing::warn;

use crate::domain::{DomainError, InlineImage};
use crate::infrastructure::http_client::HttpClientTrait;

const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

/// Configuration for image preparation
#[derive(Debug, Clone)]
pub struct ImagePrepConfig {
    /// Encoded size above which a downscale is attempted
    pub max_inline_bytes: usize,
    /// Longest edge after downscaling
    pub max_dimension: u32,
    /// JPEG quality used when re-encoding
    pub jpeg_quality: u8,
}

impl Default for ImagePrepConfig {
    fn default() -> Self {
        Self {
            max_inline_bytes: 3_000_000,
            max_dimension: 1024,
            jpeg_quality: 80,
        }
    }
}

impl ImagePrepConfig {
    pub fn with_max_inline_bytes(mut self, max_inline_bytes: usize) -> Self {
        self.max_inline_bytes = max_inline_bytes;
        self
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }
}

/// Downscaling capability. Implementations re-encode to JPEG.
pub trait ImageCodec: Send + Sync + Debug {
    fn downscale(
        &self,
        bytes: &[u8],
        max_dimension: u32,
        quality: u8,
    ) -> Result<InlineImage, DomainError>;
}

/// Codec backed by the `image` crate.
#[derive(Debug, Default)]
pub struct RasterCodec;

impl ImageCodec for RasterCodec {
    fn downscale(
        &self,
        bytes: &[u8],
        max_dimension: u32,
        quality: u8,
    ) -> Result<InlineImage, DomainError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| DomainError::image(format!("Failed to decode: {}", e)))?;

        // JPEG has no alpha channel.
        let resized = decoded.thumbnail(max_dimension, max_dimension).to_rgb8();

        let mut out = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
        resized
            .write_with_encoder(encoder)
            .map_err(|e| DomainError::image(format!("Failed to encode: {}", e)))?;

        Ok(InlineImage::new(out, "image/jpeg"))
    }
}

/// Resolves image references to inline payloads ready for a provider
/// request.
#[derive(Debug)]
pub struct ImageFetcher {
    http: Arc<dyn HttpClientTrait>,
    codec: Option<Arc<dyn ImageCodec>>,
    config: ImagePrepConfig,
}

impl ImageFetcher {
    pub fn new(http: Arc<dyn HttpClientTrait>, codec: Option<Arc<dyn ImageCodec>>) -> Self {
        Self::with_config(http, codec, ImagePrepConfig::default())
    }

    pub fn with_config(
        http: Arc<dyn HttpClientTrait>,
        codec: Option<Arc<dyn ImageCodec>>,
        config: ImagePrepConfig,
    ) -> Self {
        Self {
            http,
            codec,
            config,
        }
    }

    /// Resolves a data URL or remote reference and runs preparation.
    pub async fn resolve(&self, image_url: &str) -> Result<InlineImage, DomainError> {
        let image = if image_url.starts_with("data:") {
            decode_data_url(image_url)?
        } else {
            let (bytes, content_type) = self.http.get_bytes(image_url).await?;
            let media_type = content_type
                .filter(|ct| ct.starts_with("image/"))
                .or_else(|| {
                    mime_guess::from_path(image_url)
                        .first_raw()
                        .map(str::to_string)
                })
                .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string());

            InlineImage::new(bytes.to_vec(), media_type)
        };

        Ok(self.prepare(image))
    }

    /// Downscales oversized payloads when a codec is available. A
    /// missing codec or a codec error keeps the original bytes.
    pub fn prepare(&self, image: InlineImage) -> InlineImage {
        if image.data.len() <= self.config.max_inline_bytes {
            return image;
        }

        let Some(codec) = &self.codec else {
            return image;
        };

        match codec.downscale(
            &image.data,
            self.config.max_dimension,
            self.config.jpeg_quality,
        ) {
            Ok(resized) => resized,
            Err(error) => {
                warn!(%error, "image downscale failed, sending original bytes");
                image
            }
        }
    }
}

fn decode_data_url(url: &str) -> Result<InlineImage, DomainError> {
    let payload = url
        .strip_prefix("data:")
        .ok_or_else(|| DomainError::image("Not a data URL"))?;

    let (header, data) = payload
        .split_once(',')
        .ok_or_else(|| DomainError::image("Malformed data URL"))?;

    let media_type = header
        .split(';')
        .next()
        .filter(|mt| !mt.is_empty())
        .unwrap_or(DEFAULT_MEDIA_TYPE)
        .to_string();

    if !header.contains("base64") {
        return Err(DomainError::image("Only base64 data URLs are supported"));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| DomainError::image(format!("Invalid base64 payload: {}", e)))?;

    Ok(InlineImage::new(bytes, media_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;

    fn fetcher_with(http: MockHttpClient) -> ImageFetcher {
        ImageFetcher::new(Arc::new(http), None)
    }

    #[tokio::test]
    async fn test_data_url_decoded_in_place() {
        let fetcher = fetcher_with(MockHttpClient::new());

        let image = fetcher
            .resolve("data:image/png;base64,AQID")
            .await
            .unwrap();

        assert_eq!(image.data, vec![1, 2, 3]);
        assert_eq!(image.media_type, "image/png");
    }

    #[tokio::test]
    async fn test_remote_url_uses_content_type() {
        let http = MockHttpClient::new().with_bytes(
            "https://cdn.example.com/photo",
            vec![9u8, 9, 9],
            Some("image/webp"),
        );
        let fetcher = fetcher_with(http);

        let image = fetcher.resolve("https://cdn.example.com/photo").await.unwrap();
        assert_eq!(image.media_type, "image/webp");
    }

    #[tokio::test]
    async fn test_remote_url_falls_back_to_extension() {
        let http = MockHttpClient::new().with_bytes(
            "https://cdn.example.com/photo.png",
            vec![9u8],
            None,
        );
        let fetcher = fetcher_with(http);

        let image = fetcher
            .resolve("https://cdn.example.com/photo.png")
            .await
            .unwrap();
        assert_eq!(image.media_type, "image/png");
    }

    #[tokio::test]
    async fn test_malformed_data_url_is_an_error() {
        let fetcher = fetcher_with(MockHttpClient::new());
        assert!(fetcher.resolve("data:image/png;base64").await.is_err());
    }

    #[test]
    fn test_prepare_without_codec_keeps_original() {
        let fetcher = ImageFetcher::with_config(
            Arc::new(MockHttpClient::new()),
            None,
            ImagePrepConfig::default().with_max_inline_bytes(2),
        );

        let image = fetcher.prepare(InlineImage::new(vec![1, 2, 3, 4], "image/png"));
        assert_eq!(image.data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_prepare_small_image_untouched() {
        let fetcher = ImageFetcher::with_config(
            Arc::new(MockHttpClient::new()),
            Some(Arc::new(RasterCodec)),
            ImagePrepConfig::default(),
        );

        let image = fetcher.prepare(InlineImage::new(vec![1, 2, 3], "image/png"));
        assert_eq!(image.data, vec![1, 2, 3]);
    }

    #[test]
    fn test_codec_failure_keeps_original_bytes() {
        let fetcher = ImageFetcher::with_config(
            Arc::new(MockHttpClient::new()),
            Some(Arc::new(RasterCodec)),
            ImagePrepConfig::default().with_max_inline_bytes(2),
        );

        // Not a decodable image, so the codec fails and the bytes pass
        // through unchanged.
        let image = fetcher.prepare(InlineImage::new(vec![1, 2, 3, 4], "image/png"));
        assert_eq!(image.data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_raster_codec_downscales() {
        let mut png = Vec::new();
        let buffer = image::RgbImage::from_pixel(64, 32, image::Rgb([200, 10, 10]));
        buffer
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let resized = RasterCodec.downscale(&png, 16, 80).unwrap();
        assert_eq!(resized.media_type, "image/jpeg");

        let decoded = image::load_from_memory(&resized.data).unwrap();
        assert!(decoded.width() <= 16 && decoded.height() <= 16);
    }
}
