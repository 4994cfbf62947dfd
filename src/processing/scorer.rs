//! Similarity scoring between two normalized profiles

use crate::error::{MatcherError, Result};
use crate::processing::embeddings::{dot_score, Embedder};

pub struct SimilarityScorer {
    embedder: Box<dyn Embedder>,
}

impl SimilarityScorer {
    pub fn new(embedder: Box<dyn Embedder>) -> Self {
        Self { embedder }
    }

    pub fn model_name(&self) -> &str {
        self.embedder.name()
    }

    /// Dot product of both profiles, encoded together in one call.
    ///
    /// Scores are unbounded and only comparable between calls that use the same
    /// embedder.
    pub fn score(&self, cv_profile: &str, job_profile: &str) -> Result<f32> {
        let texts = [cv_profile.to_string(), job_profile.to_string()];
        let embeddings = self.embedder.encode(&texts)?;

        match embeddings.as_slice() {
            [cv, job] => dot_score(cv, job),
            other => Err(MatcherError::Embedding(format!(
                "Expected 2 embeddings from '{}', got {}",
                self.embedder.name(),
                other.len()
            ))),
        }
    }
}
