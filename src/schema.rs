//! Records exported by the job board
//!
//! Plain serde mirrors of the `job`, `Candidate_application` and
//! `Candidate_Docs` tables. Nothing here talks to a database; the CLI reads job
//! catalogs exported as JSON.

use crate::error::{MatcherError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: i64,
    #[serde(default, alias = "job_title")]
    pub title: String,
    #[serde(default, alias = "job_position")]
    pub position: String,
    #[serde(default)]
    pub company: String,
    #[serde(default, alias = "job_location")]
    pub location: String,
    #[serde(default, rename = "type", alias = "job_type")]
    pub job_type: String,
    #[serde(default, alias = "job_desc")]
    pub description: String,
    #[serde(default, alias = "job_role")]
    pub role: String,
    #[serde(default, alias = "job_options")]
    pub options: String,
}

impl Job {
    /// Text fed to entity extraction: non-blank fields joined one per line
    pub fn ad_text(&self) -> String {
        [
            &self.title,
            &self.position,
            &self.company,
            &self.location,
            &self.role,
            &self.description,
        ]
        .iter()
        .map(|field| field.trim())
        .filter(|field| !field.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateApplication {
    pub app_id: i64,
    #[serde(alias = "app_status")]
    pub status: String,
    pub candidate_id: i64,
    pub job_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateDoc {
    pub doc_id: i64,
    #[serde(alias = "doc_name")]
    pub name: String,
    /// Stored file, relative to the media root (e.g. `resumes/jane.pdf`)
    #[serde(alias = "doc_data")]
    pub file: PathBuf,
    pub candidate_id: i64,
}

impl CandidateDoc {
    pub fn resolve(&self, media_root: &Path) -> PathBuf {
        media_root.join(&self.file)
    }
}

/// Read a JSON array of jobs
pub fn load_job_catalog(path: &Path) -> Result<Vec<Job>> {
    let content = std::fs::read_to_string(path)?;
    let jobs: Vec<Job> = serde_json::from_str(&content).map_err(|e| {
        MatcherError::InvalidInput(format!("Invalid job catalog {}: {}", path.display(), e))
    })?;
    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_job_accepts_column_names() {
        let job: Job = serde_json::from_str(
            r#"{"job_id": 7, "job_title": "Chef", "company": "Bistro", "job_desc": "Cook things", "job_type": "full-time"}"#,
        )
        .unwrap();

        assert_eq!(job.title, "Chef");
        assert_eq!(job.job_type, "full-time");
        assert_eq!(job.ad_text(), "Chef\nBistro\nCook things");
    }

    #[test]
    fn test_application_status() {
        let app: CandidateApplication = serde_json::from_str(
            r#"{"app_id": 1, "app_status": "under_review", "candidate_id": 3, "job_id": 7}"#,
        )
        .unwrap();
        assert_eq!(app.status, "under_review");
    }

    #[test]
    fn test_candidate_doc_resolves_under_media_root() {
        let doc = CandidateDoc {
            doc_id: 1,
            name: "CV".to_string(),
            file: PathBuf::from("resumes/jane.pdf"),
            candidate_id: 3,
        };
        assert_eq!(
            doc.resolve(Path::new("/srv/media")),
            PathBuf::from("/srv/media/resumes/jane.pdf")
        );
    }

    #[test]
    fn test_load_job_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("jobs.json");
        std::fs::write(&path, r#"[{"job_id": 1, "title": "Welder"}, {"job_id": 2}]"#).unwrap();

        let jobs = load_job_catalog(&path).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[1].ad_text(), "");

        std::fs::write(&path, "{}").unwrap();
        assert!(matches!(
            load_job_catalog(&path),
            Err(MatcherError::InvalidInput(_))
        ));
    }
}
