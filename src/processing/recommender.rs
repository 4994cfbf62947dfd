//! Job recommendation ranking

use crate::error::Result;
use crate::processing::entities::EntityExtractor;
use crate::processing::scorer::SimilarityScorer;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_TOP_JOBS: usize = 3;

/// A job ad paired with its similarity to the candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub job: String,
    pub score: f32,
}

/// Normalizes profiles and ranks job ads for a candidate.
///
/// Every job is scored individually against the candidate, then the pairs are
/// stable-sorted by descending score, so equal scores keep their input order.
pub struct Recommender<'a> {
    extractor: &'a EntityExtractor,
    scorer: &'a SimilarityScorer,
}

impl<'a> Recommender<'a> {
    pub fn new(extractor: &'a EntityExtractor, scorer: &'a SimilarityScorer) -> Self {
        Self { extractor, scorer }
    }

    /// Raw text to normalized profile
    pub fn keywords_extraction(&self, text: &str) -> Result<String> {
        Ok(self.extractor.extract(text)?.normalized())
    }

    pub fn recommend_jobs(
        &self,
        candidate_profile: &str,
        job_ads: &[String],
        top_jobs: usize,
    ) -> Result<Vec<Recommendation>> {
        let candidate_desc = self.keywords_extraction(candidate_profile)?;
        self.recommend_for_profile(&candidate_desc, job_ads, top_jobs)
    }

    /// Same as [`Self::recommend_jobs`] for a candidate that is already normalized
    pub fn recommend_for_profile(
        &self,
        candidate_desc: &str,
        job_ads: &[String],
        top_jobs: usize,
    ) -> Result<Vec<Recommendation>> {
        let ranked = self.rank_jobs(candidate_desc, job_ads)?;
        Ok(ranked.into_iter().take(top_jobs).collect())
    }

    /// Every job against a normalized candidate profile, best first
    pub fn rank_jobs(&self, candidate_desc: &str, job_ads: &[String]) -> Result<Vec<Recommendation>> {
        debug!("Candidate profile: {}", candidate_desc);

        let mut results = Vec::with_capacity(job_ads.len());
        for job in job_ads {
            let job_desc = self.keywords_extraction(job)?;
            let score = self.scorer.score(&candidate_desc, &job_desc)?;
            debug!("Scored {:.4} for job profile: {}", score, job_desc);
            results.push(Recommendation {
                job: job.clone(),
                score,
            });
        }

        sort_by_score(&mut results);
        Ok(results)
    }
}

/// Stable, descending; NaN scores compare equal
pub fn sort_by_score(results: &mut [Recommendation]) {
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}
