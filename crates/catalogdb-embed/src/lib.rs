//! Embedding providers for the seeding pipeline.
//!
//! The real provider calls an Ollama embeddings endpoint; the fake provider
//! hashes tokens into a deterministic unit vector for tests and offline runs.
//! Both produce 768-dim vectors so rows are interchangeable at the store.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ollama_rs::generation::embeddings::request::{EmbeddingsInput, GenerateEmbeddingsRequest};
use ollama_rs::Ollama;
use tracing::info;

use catalogdb_core::traits::EmbedProvider;

pub const DEFAULT_EMBED_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const EMBEDDING_DIM: usize = 768;

/// Remote provider backed by Ollama's batch embeddings API.
pub struct OllamaEmbedder {
    inner: Ollama,
    model: String,
    id: String,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: &str) -> Result<Self> {
        let inner = Ollama::try_new(base_url)
            .map_err(|e| anyhow!("invalid embedding endpoint '{}': {}", base_url, e))?;
        Ok(Self {
            inner,
            model: model.to_string(),
            id: format!("ollama:{}:d{}", model, EMBEDDING_DIM),
        })
    }
}

#[async_trait]
impl EmbedProvider for OllamaEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        EMBEDDING_DIM
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let req = GenerateEmbeddingsRequest::new(
            self.model.clone(),
            EmbeddingsInput::Multiple(texts.to_vec()),
        );
        let res = self.inner.generate_embeddings(req).await?;
        if res.embeddings.len() != texts.len() {
            return Err(anyhow!(
                "embedding provider returned {} vectors for {} texts",
                res.embeddings.len(),
                texts.len()
            ));
        }
        Ok(res.embeddings)
    }
}

/// Deterministic stand-in: each whitespace token is hashed into one slot of a
/// fixed-size vector, then the vector is L2-normalized.
pub struct FakeEmbedder {
    dim: usize,
    id: String,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            id: format!("fake:token-hash:d{}", dim),
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

impl Default for FakeEmbedder {
    fn default() -> Self {
        Self::new(EMBEDDING_DIM)
    }
}

#[async_trait]
impl EmbedProvider for FakeEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

/// Select the provider for a run. `use_fake` keeps development and CI off the
/// network.
pub fn provider_for(use_fake: bool, base_url: &str, model: &str) -> Result<Box<dyn EmbedProvider>> {
    if use_fake {
        info!("using fake token-hash embedder");
        return Ok(Box::new(FakeEmbedder::default()));
    }
    Ok(Box::new(OllamaEmbedder::new(base_url, model)?))
}
