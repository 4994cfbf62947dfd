//! Report structures produced by the CLI commands

use crate::geocoding::{GeocodeError, GeocodeResult, LegacyCoordinates};
use crate::processing::entities::ExtractedProfile;
use crate::processing::recommender::Recommendation;
use crate::schema::Job;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Anything a formatter can render
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Report {
    Profile(ProfileReport),
    Score(ScoreReport),
    Recommendations(RecommendationReport),
    Geocode(GeocodeReport),
    LegacyGeocode(LegacyGeocodeReport),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub entity_model: Option<String>,
    pub embedding_model: Option<String>,
    pub tool_version: String,
}

impl ReportMetadata {
    pub fn new(entity_model: Option<&str>, embedding_model: Option<&str>) -> Self {
        Self {
            generated_at: Utc::now(),
            entity_model: entity_model.map(str::to_string),
            embedding_model: embedding_model.map(str::to_string),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileReport {
    pub source: String,
    pub entities: ExtractedProfile,
    pub normalized_profile: String,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    pub resume_source: String,
    pub job_source: String,
    pub resume_profile: String,
    pub job_profile: String,
    pub score: f32,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub candidate_source: String,
    pub candidate_profile: String,
    pub jobs_considered: usize,
    pub recommendations: Vec<RankedJob>,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedJob {
    pub rank: usize,
    pub score: f32,
    /// File path or catalog id the ad came from
    pub source: String,
    pub title: Option<String>,
    pub job: String,
}

/// Where each job ad handed to the ranker came from
#[derive(Debug, Clone)]
pub struct JobSource {
    pub source: String,
    pub title: Option<String>,
    pub text: String,
}

impl JobSource {
    pub fn from_file(path: &str, text: String) -> Self {
        Self {
            source: path.to_string(),
            title: None,
            text,
        }
    }

    pub fn from_catalog(job: &Job) -> Self {
        Self {
            source: format!("job #{}", job.job_id),
            title: Some(job.title.clone()).filter(|t| !t.trim().is_empty()),
            text: job.ad_text(),
        }
    }
}

impl RankedJob {
    /// Attach sources to ranked results. Ties are resolved in input order, so a
    /// job text that appears twice maps to its sources in turn.
    pub fn attach_sources(recommendations: Vec<Recommendation>, sources: &[JobSource]) -> Vec<Self> {
        let mut used = vec![false; sources.len()];

        recommendations
            .into_iter()
            .enumerate()
            .map(|(idx, rec)| {
                let source = sources
                    .iter()
                    .enumerate()
                    .find(|(i, s)| !used[*i] && s.text == rec.job)
                    .map(|(i, s)| {
                        used[i] = true;
                        s.clone()
                    });

                RankedJob {
                    rank: idx + 1,
                    score: rec.score,
                    source: source
                        .as_ref()
                        .map(|s| s.source.clone())
                        .unwrap_or_default(),
                    title: source.and_then(|s| s.title),
                    job: rec.job,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeocodeReport {
    pub address: String,
    pub result: Option<GeocodeResult>,
    pub error: Option<String>,
}

impl GeocodeReport {
    pub fn new(address: &str, result: std::result::Result<GeocodeResult, GeocodeError>) -> Self {
        match result {
            Ok(found) => Self {
                address: address.to_string(),
                result: Some(found),
                error: None,
            },
            Err(e) => Self {
                address: address.to_string(),
                result: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Serializes as the bare `{"lat", "lon"}` pair; the address is only shown on the console
#[derive(Debug, Clone, Serialize)]
pub struct LegacyGeocodeReport {
    #[serde(skip)]
    pub address: String,
    #[serde(flatten)]
    pub coordinates: LegacyCoordinates,
}

impl LegacyGeocodeReport {
    pub fn new(address: &str, coordinates: LegacyCoordinates) -> Self {
        Self {
            address: address.to_string(),
            coordinates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_sources_handles_duplicates() {
        let sources = vec![
            JobSource::from_file("a.txt", "same".to_string()),
            JobSource::from_file("b.txt", "other".to_string()),
            JobSource::from_file("c.txt", "same".to_string()),
        ];
        let ranked = RankedJob::attach_sources(
            vec![
                Recommendation { job: "same".to_string(), score: 0.9 },
                Recommendation { job: "same".to_string(), score: 0.9 },
                Recommendation { job: "other".to_string(), score: 0.1 },
            ],
            &sources,
        );

        let order: Vec<&str> = ranked.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(order, vec!["a.txt", "c.txt", "b.txt"]);
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn test_catalog_source_title() {
        let job: Job = serde_json::from_str(r#"{"job_id": 4, "title": "Baker"}"#).unwrap();
        let source = JobSource::from_catalog(&job);
        assert_eq!(source.source, "job #4");
        assert_eq!(source.title.as_deref(), Some("Baker"));
    }

    #[test]
    fn test_geocode_report_keeps_error_kind() {
        let report = GeocodeReport::new("", Err(GeocodeError::InvalidAddress));
        assert!(report.result.is_none());
        assert_eq!(report.error.as_deref(), Some("address is empty"));
    }

    #[test]
    fn test_legacy_report_is_the_bare_pair() {
        let report = Report::LegacyGeocode(LegacyGeocodeReport::new(
            "nowhere",
            LegacyCoordinates::unresolved(),
        ));
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({"lat": "", "lon": ""})
        );
    }
}
