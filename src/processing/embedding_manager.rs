//! Download and bookkeeping for Model2Vec embedding models

use crate::config::AvailableModel;
use crate::error::{MatcherError, Result};
use hf_hub::api::tokio::Api;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Files a local Model2Vec directory needs
pub const REQUIRED_MODEL_FILES: [&str; 3] = ["tokenizer.json", "model.safetensors", "config.json"];
const OPTIONAL_MODEL_FILES: [&str; 1] = ["README.md"];

/// Tracks which catalog models are present under the models directory
pub struct EmbeddingModelManager {
    models_dir: PathBuf,
    catalog: Vec<AvailableModel>,
    downloaded_models: HashSet<String>,
}

impl EmbeddingModelManager {
    pub async fn new(models_dir: PathBuf, catalog: Vec<AvailableModel>) -> Result<Self> {
        if !models_dir.exists() {
            fs::create_dir_all(&models_dir).await.map_err(|e| {
                MatcherError::ModelError(format!("Failed to create models directory: {}", e))
            })?;
        }

        let mut manager = Self {
            models_dir,
            catalog,
            downloaded_models: HashSet::new(),
        };
        manager.scan_downloaded_models().await?;
        Ok(manager)
    }

    async fn scan_downloaded_models(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.models_dir).await.map_err(|e| {
            MatcherError::ModelError(format!("Failed to scan models directory: {}", e))
        })?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() && is_model_directory(&entry.path()).await {
                self.downloaded_models
                    .insert(entry.file_name().to_string_lossy().to_string());
            }
        }

        Ok(())
    }

    /// Fetch a catalog model from the Hugging Face Hub into `<models_dir>/<name>`
    pub async fn download_model(&mut self, name: &str, force: bool) -> Result<PathBuf> {
        let model_info = self
            .get_model_info(name)
            .cloned()
            .ok_or_else(|| MatcherError::ModelNotFound(format!("Unknown embedding model: {}", name)))?;

        let model_dir = self.models_dir.join(&model_info.name);
        if !force && self.is_model_downloaded(&model_info.name) {
            info!("Model {} already present at {}", model_info.name, model_dir.display());
            return Ok(model_dir);
        }

        info!(
            "Downloading embedding model {} from {} ({} MB)",
            model_info.name, model_info.repo_id, model_info.size_mb
        );

        fs::create_dir_all(&model_dir).await?;

        let api = Api::new()
            .map_err(|e| MatcherError::Network(format!("Failed to initialize HF API: {}", e)))?;
        let repo = api.model(model_info.repo_id.clone());

        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        progress.enable_steady_tick(Duration::from_millis(120));

        for file in REQUIRED_MODEL_FILES.iter().chain(OPTIONAL_MODEL_FILES.iter()) {
            progress.set_message(format!("{} / {}", model_info.repo_id, file));
            match repo.get(file).await {
                Ok(cached_path) => {
                    fs::copy(&cached_path, model_dir.join(file)).await.map_err(|e| {
                        MatcherError::ModelError(format!("Failed to copy {}: {}", file, e))
                    })?;
                }
                Err(e) if OPTIONAL_MODEL_FILES.contains(file) => {
                    warn!("Optional file {} not found: {}", file, e);
                }
                Err(e) => {
                    progress.finish_and_clear();
                    return Err(MatcherError::Network(format!(
                        "Failed to download required file {}: {}",
                        file, e
                    )));
                }
            }
        }

        progress.finish_and_clear();
        self.downloaded_models.insert(model_info.name.clone());
        info!("Embedding model {} downloaded to {}", model_info.name, model_dir.display());
        Ok(model_dir)
    }

    pub async fn remove_model(&mut self, name: &str) -> Result<PathBuf> {
        let model_dir = self.models_dir.join(name);
        if !self.downloaded_models.remove(name) {
            return Err(MatcherError::ModelNotFound(format!("Model '{}' is not downloaded", name)));
        }
        fs::remove_dir_all(&model_dir).await?;
        Ok(model_dir)
    }

    pub fn get_model_path(&self, name: &str) -> Option<PathBuf> {
        self.is_model_downloaded(name)
            .then(|| self.models_dir.join(name))
    }

    pub fn list_available_models(&self) -> &[AvailableModel] {
        &self.catalog
    }

    pub fn list_downloaded_models(&self) -> Vec<String> {
        let mut models: Vec<String> = self.downloaded_models.iter().cloned().collect();
        models.sort();
        models
    }

    /// Look up by catalog name, repo id, or case-insensitive name
    pub fn get_model_info(&self, input: &str) -> Option<&AvailableModel> {
        self.catalog
            .iter()
            .find(|m| m.name == input || m.repo_id == input)
            .or_else(|| self.catalog.iter().find(|m| m.name.eq_ignore_ascii_case(input)))
    }

    pub fn is_model_downloaded(&self, name: &str) -> bool {
        self.downloaded_models.contains(name)
    }
}

async fn is_model_directory(path: &Path) -> bool {
    for file in REQUIRED_MODEL_FILES {
        if fs::metadata(path.join(file)).await.is_err() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    async fn manager(temp_dir: &TempDir) -> EmbeddingModelManager {
        EmbeddingModelManager::new(
            temp_dir.path().join("models"),
            Config::default().models.available_models,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_creates_models_dir() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir).await;

        assert!(temp_dir.path().join("models").is_dir());
        assert!(!manager.list_available_models().is_empty());
        assert!(manager.list_downloaded_models().is_empty());
    }

    #[tokio::test]
    async fn test_scan_finds_complete_models_only() {
        let temp_dir = TempDir::new().unwrap();
        let models_dir = temp_dir.path().join("models");

        let complete = models_dir.join("potion-base-8M");
        std::fs::create_dir_all(&complete).unwrap();
        for file in REQUIRED_MODEL_FILES {
            std::fs::write(complete.join(file), b"{}").unwrap();
        }
        let partial = models_dir.join("m2v-base");
        std::fs::create_dir_all(&partial).unwrap();
        std::fs::write(partial.join("tokenizer.json"), b"{}").unwrap();

        let manager = manager(&temp_dir).await;
        assert_eq!(manager.list_downloaded_models(), vec!["potion-base-8M"]);
        assert_eq!(manager.get_model_path("potion-base-8M"), Some(complete));
        assert_eq!(manager.get_model_path("m2v-base"), None);
    }

    #[tokio::test]
    async fn test_get_model_info() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir).await;

        assert_eq!(manager.get_model_info("potion-base-8M").unwrap().dimensions, 256);
        assert_eq!(
            manager.get_model_info("minishlab/M2V_large_output").unwrap().name,
            "m2v-large"
        );
        assert_eq!(manager.get_model_info("M2V-BASE").unwrap().name, "m2v-base");
        assert!(manager.get_model_info("gpt-9").is_none());
    }

    #[tokio::test]
    async fn test_unknown_model_download_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = manager(&temp_dir).await;

        let result = manager.download_model("not-in-catalog", false).await;
        assert!(matches!(result, Err(MatcherError::ModelNotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_model() {
        let temp_dir = TempDir::new().unwrap();
        let model_dir = temp_dir.path().join("models").join("m2v-large");
        std::fs::create_dir_all(&model_dir).unwrap();
        for file in REQUIRED_MODEL_FILES {
            std::fs::write(model_dir.join(file), b"{}").unwrap();
        }

        let mut manager = manager(&temp_dir).await;
        manager.remove_model("m2v-large").await.unwrap();
        assert!(!model_dir.exists());
        assert!(manager.remove_model("m2v-large").await.is_err());
    }
}
