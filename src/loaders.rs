//! Hugging Face Hub download helpers for classifier assets.
//!
//! - [`HfLoader`] - fetches one file from a model repository, retrying when
//!   another process holds the hub cache lock
//! - [`WeightsLoader`] - fetches `model.safetensors`, falling back to
//!   `pytorch_model.bin` for repositories that only ship the pickle

use hf_hub::api::tokio::{Api as HfApi, ApiBuilder};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct HfLoader {
    pub repo: String,
    pub filename: String,
}

impl HfLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            filename: filename.into(),
        }
    }

    fn api() -> anyhow::Result<HfApi> {
        Ok(ApiBuilder::new().with_progress(false).build()?)
    }

    pub async fn load(&self) -> anyhow::Result<PathBuf> {
        let hf_api = Self::api()?.model(self.repo.clone());

        let max_retries = 3;
        let mut attempt = 0;
        loop {
            match hf_api.get(self.filename.as_str()).await {
                Ok(path) => return Ok(path),
                Err(e)
                    if e.to_string().contains("Lock acquisition failed")
                        && attempt < max_retries - 1 =>
                {
                    let wait_time = std::time::Duration::from_millis(100 * (1 << attempt));
                    tracing::debug!(
                        repo = %self.repo,
                        file = %self.filename,
                        "hub cache locked, retrying in {wait_time:?}"
                    );
                    tokio::time::sleep(wait_time).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(anyhow::anyhow!(
                        "failed to fetch {} from {}: {e}",
                        self.filename,
                        self.repo
                    ))
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeightsLoader {
    pub repo: String,
}

impl WeightsLoader {
    pub fn new(repo: &str) -> Self {
        Self { repo: repo.into() }
    }

    pub async fn load(&self) -> anyhow::Result<PathBuf> {
        match HfLoader::new(&self.repo, "model.safetensors").load().await {
            Ok(path) => Ok(path),
            Err(safetensors_err) => HfLoader::new(&self.repo, "pytorch_model.bin")
                .load()
                .await
                .map_err(|e| {
                    anyhow::anyhow!(
                        "model weights not found in repo {}. Expected `model.safetensors` ({safetensors_err}) or `pytorch_model.bin` ({e})",
                        self.repo
                    )
                }),
        }
    }
}
