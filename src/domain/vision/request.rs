use base64::Engine;
use serde::{Deserialize, Serialize};

/// An image shipped inline with a provider request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineImage {
    pub data: Vec<u8>,
    pub media_type: String,
}

impl InlineImage {
    pub fn new(data: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            data,
            media_type: media_type.into(),
        }
    }

    pub fn base64_data(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

/// One provider round trip: an instruction plus zero or more images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionRequest {
    pub prompt: String,
    pub images: Vec<InlineImage>,
}

impl VisionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            images: Vec::new(),
        }
    }

    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.images.push(image);
        self
    }

    pub fn with_images(mut self, images: Vec<InlineImage>) -> Self {
        self.images = images;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_encoding() {
        let image = InlineImage::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg");
        assert_eq!(image.base64_data(), "/9j/");
    }

    #[test]
    fn test_request_builder() {
        let request = VisionRequest::new("describe this")
            .with_image(InlineImage::new(vec![1, 2, 3], "image/png"));

        assert_eq!(request.prompt, "describe this");
        assert_eq!(request.images.len(), 1);
        assert_eq!(request.images[0].media_type, "image/png");
    }
}
