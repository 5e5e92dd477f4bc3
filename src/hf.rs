//! Hugging Face Inference API embedding provider.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// Base URL of the Hugging Face Inference API feature-extraction pipeline.
const HF_INFERENCE_BASE_URL: &str = "https://router.huggingface.co/hf-inference/models";

/// The default sentence-transformer embedding model.
const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Dimensionality of `all-MiniLM-L6-v2` embeddings.
const DEFAULT_DIMENSIONS: usize = 384;

/// An [`EmbeddingProvider`] backed by the Hugging Face Inference API.
///
/// Sends chunk texts to the feature-extraction pipeline of a
/// sentence-transformer model and returns the pooled sentence embeddings.
///
/// # Configuration
///
/// - `model` – defaults to `sentence-transformers/all-MiniLM-L6-v2`.
/// - `api_token` – from the constructor or the `HF_API_TOKEN` environment
///   variable.
pub struct HfEmbeddingProvider {
    client: reqwest::Client,
    api_token: String,
    model: String,
    dimensions: usize,
}

impl HfEmbeddingProvider {
    /// Create a new provider with the given API token.
    ///
    /// Uses the default model and dimensionality (384).
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(RagError::Config("Hugging Face API token must not be empty".into()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_token,
            model: DEFAULT_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Create a new provider using the `HF_API_TOKEN` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_token = std::env::var("HF_API_TOKEN")
            .map_err(|_| RagError::Config("HF_API_TOKEN environment variable not set".into()))?;
        Self::new(api_token)
    }

    /// Override the model and its embedding dimensionality.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }

    fn upstream(message: impl Into<String>) -> RagError {
        RagError::UpstreamFailure { stage: "embedding".into(), message: message.into() }
    }
}

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: Vec<&'a str>,
}

#[async_trait]
impl EmbeddingProvider for HfEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| Self::upstream("API returned an empty response"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(model = %self.model, batch_size = texts.len(), "embedding batch");

        let url = format!("{HF_INFERENCE_BASE_URL}/{}/pipeline/feature-extraction", self.model);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&FeatureExtractionRequest { inputs: texts.to_vec() })
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.model, error = %e, "embedding request failed");
                Self::upstream(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(model = %self.model, %status, "embedding API error");
            return Err(Self::upstream(format!("API returned {status}: {body}")));
        }

        let embeddings: Vec<Vec<f32>> = response.json().await.map_err(|e| {
            error!(model = %self.model, error = %e, "failed to parse embedding response");
            Self::upstream(format!("failed to parse response: {e}"))
        })?;

        if embeddings.len() != texts.len() {
            return Err(Self::upstream(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }
        for embedding in &embeddings {
            if embedding.len() != self.dimensions {
                return Err(RagError::Config(format!(
                    "model '{}' returned {}-dimensional embeddings, expected {}",
                    self.model,
                    embedding.len(),
                    self.dimensions
                )));
            }
        }

        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
