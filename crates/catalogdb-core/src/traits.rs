//! Provider seams. Everything the pipeline consumes from the outside world
//! comes in through one of these, so tests can substitute fakes without
//! touching process-wide state.

use async_trait::async_trait;

use crate::types::CatalogRecord;

/// A generative text model. One call, no internal retry; the raw response may
/// wrap the payload in prose.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn invoke(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Batch embedding provider. Returned vectors correspond positionally to the
/// input texts and share a single fixed dimensionality.
#[async_trait]
pub trait EmbedProvider: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `ollama:nomic-embed-text:d768`).
    fn embedder_id(&self) -> &str;
    fn dim(&self) -> usize;
    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Produces the records a seeding run loads.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn generate(&self) -> anyhow::Result<Vec<CatalogRecord>>;
}
