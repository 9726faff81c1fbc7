//! Embedding provider abstraction
//!
//! The pipeline only needs "text in, vector out". Keeping that behind a trait
//! lets the remote client batch and retry on its own, and lets tests count
//! calls without touching the network.

use thiserror::Error;

/// Errors returned by an embedding provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success status from the API
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// HTTP 429
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Credential environment variable is unset or empty
    #[error("API key not set (expected in ${0})")]
    MissingApiKey(String),
}

impl ProviderError {
    /// Whether another attempt could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Http(_) | ProviderError::RateLimited => true,
            ProviderError::Status { status, .. } => *status >= 500,
            ProviderError::Parse(_) | ProviderError::MissingApiKey(_) => false,
        }
    }
}

/// Something that turns text into a fixed-length vector.
pub trait EmbeddingProvider {
    /// Embed a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;

    /// Embed several texts, output order matches input order
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, ProviderError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Model identifier
    fn model(&self) -> &str;
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for Box<P> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        (**self).embed(text)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, ProviderError> {
        (**self).embed_batch(texts)
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LengthProvider;

    impl EmbeddingProvider for LengthProvider {
        fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
            Ok(vec![text.len() as f32, 1.0])
        }

        fn model(&self) -> &str {
            "length"
        }
    }

    #[test]
    fn test_default_batch_preserves_order() {
        let provider = LengthProvider;
        let out = provider.embed_batch(&["a", "abc", "ab"]).unwrap();
        assert_eq!(out, vec![vec![1.0, 1.0], vec![3.0, 1.0], vec![2.0, 1.0]]);
    }

    #[test]
    fn test_boxed_provider() {
        let provider: Box<dyn EmbeddingProvider> = Box::new(LengthProvider);
        assert_eq!(provider.model(), "length");
        assert_eq!(provider.embed("rust").unwrap(), vec![4.0, 1.0]);
    }

    #[test]
    fn test_transient_errors() {
        assert!(ProviderError::RateLimited.is_transient());
        assert!(ProviderError::Http("timeout".into()).is_transient());
        assert!(ProviderError::Status {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(!ProviderError::Status {
            status: 401,
            body: String::new()
        }
        .is_transient());
        assert!(!ProviderError::Parse("bad".into()).is_transient());
    }
}
