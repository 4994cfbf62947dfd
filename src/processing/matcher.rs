//! Matching engine: owns the loaded models for the life of the process

use crate::config::Config;
use crate::error::Result;
use crate::processing::embeddings::{embedder_from_config, Embedder};
use crate::processing::entities::{EntityExtractor, ExtractedProfile};
use crate::processing::recognizer::{EntityRecognizer, GazetteerRecognizer};
use crate::processing::recommender::{Recommendation, Recommender};
use crate::processing::scorer::SimilarityScorer;
use log::info;
use std::time::Instant;

/// Entity extractor and similarity scorer loaded once and shared by every call.
/// Dropping the engine releases both models.
pub struct MatchingEngine {
    extractor: EntityExtractor,
    scorer: SimilarityScorer,
    default_top_jobs: usize,
}

impl MatchingEngine {
    pub fn new(
        recognizer: Box<dyn EntityRecognizer>,
        embedder: Box<dyn Embedder>,
        default_top_jobs: usize,
    ) -> Self {
        Self {
            extractor: EntityExtractor::new(recognizer),
            scorer: SimilarityScorer::new(embedder),
            default_top_jobs,
        }
    }

    /// Load both models from the paths in `config`; any load failure is fatal
    pub fn from_config(config: &Config) -> Result<Self> {
        let start_time = Instant::now();

        let recognizer = GazetteerRecognizer::from_dir(&config.entity_model_path())?;
        let embedder = embedder_from_config(config)?;

        info!(
            "Matching engine ready in {:.2?} (entities: {}, embeddings: {})",
            start_time.elapsed(),
            recognizer.name(),
            embedder.name()
        );

        Ok(Self::new(
            Box::new(recognizer),
            embedder,
            config.matching.top_jobs,
        ))
    }

    pub fn parse_document(&self, text: &str) -> Result<ExtractedProfile> {
        self.extractor.extract(text)
    }

    pub fn keywords_extraction(&self, text: &str) -> Result<String> {
        self.recommender().keywords_extraction(text)
    }

    /// Score two normalized profiles
    pub fn similarity_score(&self, cv_desc: &str, job_desc: &str) -> Result<f32> {
        self.scorer.score(cv_desc, job_desc)
    }

    /// Normalize two raw documents and score them
    pub fn score_documents(&self, cv_text: &str, job_text: &str) -> Result<f32> {
        let cv_desc = self.keywords_extraction(cv_text)?;
        let job_desc = self.keywords_extraction(job_text)?;
        self.similarity_score(&cv_desc, &job_desc)
    }

    /// `top_jobs` falls back to the configured default
    pub fn recommend_jobs(
        &self,
        candidate_profile: &str,
        job_ads: &[String],
        top_jobs: Option<usize>,
    ) -> Result<Vec<Recommendation>> {
        self.recommender().recommend_jobs(
            candidate_profile,
            job_ads,
            top_jobs.unwrap_or(self.default_top_jobs),
        )
    }

    /// Rank against a profile already produced by [`Self::keywords_extraction`]
    pub fn recommend_for_profile(
        &self,
        candidate_desc: &str,
        job_ads: &[String],
        top_jobs: Option<usize>,
    ) -> Result<Vec<Recommendation>> {
        self.recommender().recommend_for_profile(
            candidate_desc,
            job_ads,
            top_jobs.unwrap_or(self.default_top_jobs),
        )
    }

    pub fn entity_model_name(&self) -> &str {
        self.extractor.model_name()
    }

    pub fn embedding_model_name(&self) -> &str {
        self.scorer.model_name()
    }

    fn recommender(&self) -> Recommender<'_> {
        Recommender::new(&self.extractor, &self.scorer)
    }
}
