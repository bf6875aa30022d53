use std::fmt::Debug;

use async_trait::async_trait;

use super::VisionRequest;
use crate::domain::DomainError;

/// Trait for multimodal vision providers.
///
/// One logical operation: generate structured JSON text from an
/// instruction plus inline images, parameterized by a model id. The
/// engine never interprets transport details beyond this seam.
#[async_trait]
pub trait VisionProvider: Send + Sync + Debug {
    /// Send a generation request and return the raw response text.
    async fn generate(&self, model: &str, request: VisionRequest) -> Result<String, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Scripted provider for tests: responses are consumed in order,
    /// and every call is recorded with its model and image count.
    #[derive(Debug, Default)]
    pub struct MockVisionProvider {
        script: Mutex<VecDeque<Result<String, String>>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub model: String,
        pub image_count: usize,
        pub prompt: String,
    }

    impl MockVisionProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(self, response: impl Into<String>) -> Self {
            self.script.lock().unwrap().push_back(Ok(response.into()));
            self
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            self.script.lock().unwrap().push_back(Err(error.into()));
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VisionProvider for MockVisionProvider {
        async fn generate(
            &self,
            model: &str,
            request: VisionRequest,
        ) -> Result<String, DomainError> {
            self.calls.lock().unwrap().push(RecordedCall {
                model: model.to_string(),
                image_count: request.images.len(),
                prompt: request.prompt.clone(),
            });

            match self.script.lock().unwrap().pop_front() {
                Some(Ok(response)) => Ok(response),
                Some(Err(error)) => Err(DomainError::provider("mock", error)),
                None => Err(DomainError::provider("mock", "no scripted response left")),
            }
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}
