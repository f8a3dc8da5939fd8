//! Text-generation providers.
//!
//! A provider turns a system prompt, a user prompt and a temperature into one
//! completion. [`CompletionProvider::generate`] adds the cleanup every caller
//! wants: the raw completion is sanitized and an empty result is an error.

pub mod cleanup;
pub mod error;
pub mod http;

pub use error::GenerateError;
pub use http::HttpProvider;

/// One generation request, already rendered from the prompt config.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

pub trait CompletionProvider {
    /// Name used in messages ("Empty response from <name>").
    fn display_name(&self) -> &str;

    /// Pre-flight check run before a batch touches any cell.
    fn ensure_ready(&self) -> Result<(), GenerateError> {
        Ok(())
    }

    /// Raw completion text as returned by the provider.
    fn complete(&self, request: &PromptRequest) -> Result<String, GenerateError>;

    /// Sanitized, non-empty completion.
    fn generate(&self, request: &PromptRequest) -> Result<String, GenerateError> {
        let raw = self.complete(request)?;
        let text = cleanup::sanitize(&raw);
        if text.is_empty() {
            return Err(GenerateError::EmptyResponse(self.display_name().to_string()));
        }
        Ok(text)
    }
}

impl<P: CompletionProvider + ?Sized> CompletionProvider for Box<P> {
    fn display_name(&self) -> &str {
        (**self).display_name()
    }

    fn ensure_ready(&self) -> Result<(), GenerateError> {
        (**self).ensure_ready()
    }

    fn complete(&self, request: &PromptRequest) -> Result<String, GenerateError> {
        (**self).complete(request)
    }
}
