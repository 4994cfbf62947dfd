//! Sentence embedding backends

use crate::config::{Config, EmbeddingBackend};
use crate::error::{MatcherError, Result};
use log::info;
use model2vec_rs::model::StaticModel;
use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::time::Instant;
use unicode_segmentation::UnicodeSegmentation;

/// Token budget per text handed to Model2Vec
const MAX_TOKENS: usize = 512;

pub trait Embedder: Send + Sync {
    /// Encode all texts in one call, one vector per input in input order
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn name(&self) -> &str;
}

/// Build the configured backend. A static model that cannot be loaded is an error,
/// never a silent switch to hashing.
pub fn embedder_from_config(config: &Config) -> Result<Box<dyn Embedder>> {
    match config.models.embedding_backend {
        EmbeddingBackend::Static => Ok(Box::new(StaticEmbedder::load(
            &config.embedding_model_path(),
            config.matching.batch_size,
        )?)),
        EmbeddingBackend::Hashing => Ok(Box::new(HashingEmbedder::new(
            config.models.hashing_dimension,
        ))),
    }
}

/// Model2Vec static embeddings read from a local model directory
pub struct StaticEmbedder {
    model: StaticModel,
    batch_size: usize,
    model_name: String,
}

impl StaticEmbedder {
    pub fn load(model_path: &Path, batch_size: usize) -> Result<Self> {
        if !model_path.exists() {
            return Err(MatcherError::ModelNotFound(format!(
                "Embedding model directory does not exist: {}",
                model_path.display()
            )));
        }

        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model from: {}", model_path.display());

        let model = StaticModel::from_pretrained(
            model_path,
            None, // token
            None, // normalize
            None, // subfolder
        )
        .map_err(|e| MatcherError::ModelLoading(format!("Failed to load model: {}", e)))?;

        info!("Model loaded in {:.2?}", start_time.elapsed());

        let model_name = model_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| model_path.display().to_string());

        Ok(Self {
            model,
            batch_size: batch_size.max(1),
            model_name,
        })
    }
}

impl Embedder for StaticEmbedder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(self
            .model
            .encode_with_args(texts, Some(MAX_TOKENS), self.batch_size))
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

/// Fixed hash keys; changing them changes every vector
const HASH_KEY_0: u64 = 0x6a6f_626d_6174_6368;
const HASH_KEY_1: u64 = 0x7072_6f66_696c_6573;

/// Signed feature hashing over lowercased words, L2-normalized.
///
/// Needs no model files and gives the same vector for the same text on every
/// platform, which makes it suitable for offline runs and tests. Scores only
/// reflect word overlap.
pub struct HashingEmbedder {
    dimension: usize,
    name: String,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            name: format!("hashing-{}", dimension),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn hash(token: &str, salt: u8) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_KEY_0, HASH_KEY_1);
        salt.hash(&mut hasher);
        token.hash(&mut hasher);
        hasher.finish()
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for word in text.unicode_words() {
            let token = word.to_lowercase();
            let idx = (Self::hash(&token, 0) % self.dimension as u64) as usize;
            let sign = if Self::hash(&token, 1) % 2 == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl Embedder for HashingEmbedder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed(text)).collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Unnormalized dot product
pub fn dot_score(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(MatcherError::Embedding(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    Ok(a.iter().zip(b.iter()).map(|(x, y)| x * y).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dot_score() {
        assert_eq!(dot_score(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap(), 32.0);
        assert!(dot_score(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_hashing_is_deterministic() {
        let embedder = HashingEmbedder::new(64);
        let texts = vec!["Rust developer".to_string(), "Rust developer".to_string()];
        let vectors = embedder.encode(&texts).unwrap();

        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0].len(), 64);
        assert_eq!(vectors[0], vectors[1]);
    }

    #[test]
    fn test_hashing_ignores_case() {
        let embedder = HashingEmbedder::new(64);
        let vectors = embedder
            .encode(&["PYTHON Engineer".to_string(), "python engineer".to_string()])
            .unwrap();
        assert_eq!(vectors[0], vectors[1]);
    }

    #[test]
    fn test_hashing_vectors_are_unit_length() {
        let embedder = HashingEmbedder::new(128);
        let vectors = embedder
            .encode(&["Data engineer. Skills: SQL, Spark".to_string(), String::new()])
            .unwrap();

        let norm: f32 = vectors[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert!(vectors[1].iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_zero_dimension_is_clamped() {
        assert_eq!(HashingEmbedder::new(0).dimension(), 1);
    }

    #[test]
    fn test_missing_static_model_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let result = StaticEmbedder::load(&temp_dir.path().join("missing-model"), 32);
        assert!(matches!(result, Err(MatcherError::ModelNotFound(_))));
    }

    #[test]
    fn test_incomplete_static_model_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let result = StaticEmbedder::load(temp_dir.path(), 32);
        assert!(matches!(result, Err(MatcherError::ModelLoading(_))));
    }
}
