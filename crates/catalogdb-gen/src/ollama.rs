//! Generative model client. Wraps ollama-rs completion with a simple API.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::Ollama;

use catalogdb_core::traits::TextModel;

pub const DEFAULT_GEN_MODEL: &str = "llama3.1";
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

pub struct OllamaTextModel {
    inner: Ollama,
    model: String,
}

impl OllamaTextModel {
    pub fn new(base_url: &str, model: &str) -> Result<Self> {
        let inner = Ollama::try_new(base_url)
            .map_err(|e| anyhow!("invalid generation endpoint '{}': {}", base_url, e))?;
        Ok(Self {
            inner,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl TextModel for OllamaTextModel {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        let req = GenerationRequest::new(self.model.clone(), prompt.to_string());
        let res = self.inner.generate(req).await?;
        Ok(res.response)
    }
}
