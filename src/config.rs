//! Configuration management for the job matcher

use crate::error::{MatcherError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `geocoding.api_key`
pub const GEOCODER_API_KEY_ENV: &str = "JOBMATCH_GEOCODER_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub matching: MatchingConfig,
    pub geocoding: GeocodingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    /// Entity model directory, absolute or relative to `models_dir`
    pub entity_model: String,
    pub embedding_backend: EmbeddingBackend,
    /// Embedding model directory, absolute or relative to `models_dir`
    pub embedding_model: String,
    pub hashing_dimension: usize,
    pub available_models: Vec<AvailableModel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Model2Vec static embeddings loaded from disk
    Static,
    /// Deterministic feature hashing, no model files needed
    Hashing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableModel {
    pub name: String,
    pub repo_id: String,
    pub size_mb: u64,
    pub dimensions: u32,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub top_jobs: usize,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".jobmatch")
            .join("models");

        Self {
            models: ModelConfig {
                models_dir,
                entity_model: "entity-gazetteer".to_string(),
                embedding_backend: EmbeddingBackend::Static,
                embedding_model: "potion-base-8M".to_string(),
                hashing_dimension: 256,
                available_models: vec![
                    AvailableModel {
                        name: "potion-base-8M".to_string(),
                        repo_id: "minishlab/potion-base-8M".to_string(),
                        size_mb: 33,
                        dimensions: 256,
                        description: "Small Model2Vec model, good default for profile matching".to_string(),
                    },
                    AvailableModel {
                        name: "m2v-base".to_string(),
                        repo_id: "minishlab/M2V_base_output".to_string(),
                        size_mb: 90,
                        dimensions: 256,
                        description: "Model2Vec base embeddings model".to_string(),
                    },
                    AvailableModel {
                        name: "m2v-large".to_string(),
                        repo_id: "minishlab/M2V_large_output".to_string(),
                        size_mb: 250,
                        dimensions: 512,
                        description: "Larger Model2Vec model for higher accuracy".to_string(),
                    },
                ],
            },
            matching: MatchingConfig {
                top_jobs: 3,
                batch_size: 32,
            },
            geocoding: GeocodingConfig {
                endpoint: "https://geocode.search.hereapi.com/v1/geocode".to_string(),
                api_key: None,
                timeout_secs: 30,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first use
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| MatcherError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| MatcherError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("jobmatch")
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        if self.matching.batch_size == 0 {
            return Err(MatcherError::Configuration(
                "matching.batch_size must be greater than zero".to_string(),
            ));
        }
        if self.models.hashing_dimension == 0 {
            return Err(MatcherError::Configuration(
                "models.hashing_dimension must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }

    pub fn entity_model_path(&self) -> PathBuf {
        self.resolve_model_path(&self.models.entity_model)
    }

    pub fn embedding_model_path(&self) -> PathBuf {
        self.resolve_model_path(&self.models.embedding_model)
    }

    fn resolve_model_path(&self, model: &str) -> PathBuf {
        let path = Path::new(model);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.models.models_dir.join(path)
        }
    }

    /// Geocoder API key, environment first
    pub fn geocoder_api_key(&self) -> Option<String> {
        std::env::var(GEOCODER_API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.geocoding.api_key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_writes_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.matching.top_jobs, 3);
        assert_eq!(config.models.embedding_backend, EmbeddingBackend::Static);
    }

    #[test]
    fn test_round_trip_keeps_changes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.matching.top_jobs = 5;
        config.models.embedding_backend = EmbeddingBackend::Hashing;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.matching.top_jobs, 5);
        assert_eq!(loaded.models.embedding_backend, EmbeddingBackend::Hashing);
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.matching.batch_size = 0;
        config.save_to(&path).unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(MatcherError::Configuration(_))
        ));
    }

    #[test]
    fn test_model_paths_resolve_against_models_dir() {
        let mut config = Config::default();
        config.models.models_dir = PathBuf::from("/srv/models");
        config.models.entity_model = "ner".to_string();

        assert_eq!(config.entity_model_path(), PathBuf::from("/srv/models/ner"));

        config.models.embedding_model = "/opt/minilm".to_string();
        assert_eq!(config.embedding_model_path(), PathBuf::from("/opt/minilm"));
    }
}
