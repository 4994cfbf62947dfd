//! Integration tests for the job matcher

use jobmatch::config::{Config, EmbeddingBackend};
use jobmatch::input::InputManager;
use jobmatch::output::report::{JobSource, RankedJob};
use jobmatch::processing::MatchingEngine;
use jobmatch::schema::load_job_catalog;
use jobmatch::MatcherError;
use std::path::{Path, PathBuf};

fn offline_config() -> Config {
    let mut config = Config::default();
    config.models.models_dir = PathBuf::from("tests/fixtures/models");
    config.models.embedding_backend = EmbeddingBackend::Hashing;
    config
}

#[tokio::test]
async fn test_text_extraction_from_txt() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/sample_resume.txt");

    let text = manager.extract_text(path).await.unwrap();
    assert!(text.contains("John Doe"));
    assert!(text.contains("Software Engineer"));
    assert!(text.contains("React"));
    assert!(text.contains("Node.js"));
}

#[tokio::test]
async fn test_text_extraction_from_markdown() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/sample_resume.md");

    let text = manager.extract_text(path).await.unwrap();
    assert!(text.contains("John Doe"));
    assert!(text.contains("Software Engineer"));
    assert!(text.contains("Node.js"));
    assert!(!text.contains("**"));
    assert!(!text.contains("##"));
}

#[tokio::test]
async fn test_caching_functionality() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/sample_resume.txt");

    let text1 = manager.extract_text(path).await.unwrap();
    assert_eq!(manager.cache_size(), 1);

    let text2 = manager.extract_text(path).await.unwrap();
    assert_eq!(text1, text2);
    assert_eq!(manager.cache_size(), 1);
}

#[tokio::test]
async fn test_unsupported_file_type() {
    let mut manager = InputManager::new();
    let result = manager.extract_text(Path::new("tests/fixtures/unsupported.xyz")).await;
    assert!(matches!(result, Err(MatcherError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn test_nonexistent_file() {
    let mut manager = InputManager::new();
    let result = manager.extract_text(Path::new("tests/fixtures/nonexistent.txt")).await;
    assert!(matches!(result, Err(MatcherError::InvalidInput(_))));
}

#[tokio::test]
async fn test_resume_profile_from_fixture_model() {
    let mut manager = InputManager::new();
    let text = manager
        .extract_text(Path::new("tests/fixtures/sample_resume.txt"))
        .await
        .unwrap();

    let engine = MatchingEngine::from_config(&offline_config()).unwrap();
    let profile = engine.parse_document(&text).unwrap();

    assert_eq!(profile.job_title, "Software Engineer");
    assert_eq!(profile.skills, vec!["React", "Node.js", "Python", "PostgreSQL"]);
    assert_eq!(profile.companies, vec!["Acme Corp"]);
    assert_eq!(profile.emails, vec!["john.doe@example.com"]);
    assert_eq!(profile.links, vec!["https://github.com/johndoe"]);

    assert_eq!(
        engine.keywords_extraction(&text).unwrap(),
        "Software Engineer. Skills: React, Node.js, Python, PostgreSQL. Education: Master of Computer Science"
    );
}

#[tokio::test]
async fn test_recommend_job_files() {
    let mut manager = InputManager::new();
    let resume = manager
        .extract_text(Path::new("tests/fixtures/sample_resume.txt"))
        .await
        .unwrap();
    let ads = manager
        .extract_all(&["tests/fixtures/chef.txt", "tests/fixtures/python_engineer.txt"])
        .await
        .unwrap();

    let engine = MatchingEngine::from_config(&offline_config()).unwrap();
    let recommendations = engine.recommend_jobs(&resume, &ads, Some(2)).unwrap();

    assert_eq!(recommendations.len(), 2);
    assert_eq!(recommendations[0].job, ads[1]);
    assert!(recommendations[0].score > recommendations[1].score);
}

#[tokio::test]
async fn test_recommend_from_catalog() {
    let mut manager = InputManager::new();
    let resume = manager
        .extract_text(Path::new("tests/fixtures/sample_resume.md"))
        .await
        .unwrap();

    let catalog = load_job_catalog(Path::new("tests/fixtures/jobs.json")).unwrap();
    let sources: Vec<JobSource> = catalog.iter().map(JobSource::from_catalog).collect();
    let ads: Vec<String> = sources.iter().map(|s| s.text.clone()).collect();

    let engine = MatchingEngine::from_config(&offline_config()).unwrap();
    let ranked = RankedJob::attach_sources(engine.recommend_jobs(&resume, &ads, Some(1)).unwrap(), &sources);

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].rank, 1);
    assert_eq!(ranked[0].source, "job #2");
    assert_eq!(ranked[0].title.as_deref(), Some("Software Engineer"));
}

#[test]
fn test_top_jobs_defaults_to_config() {
    let engine = MatchingEngine::from_config(&offline_config()).unwrap();
    let ads: Vec<String> = (0..5).map(|i| format!("Chef number {}", i)).collect();

    assert_eq!(engine.recommend_jobs("Chef", &ads, None).unwrap().len(), 3);
    assert!(engine.recommend_jobs("Chef", &[], None).unwrap().is_empty());
}

#[tokio::test]
async fn test_cache_can_be_disabled_and_cleared() {
    let path = Path::new("tests/fixtures/chef.txt");

    let mut uncached = InputManager::new().with_cache(false);
    uncached.extract_text(path).await.unwrap();
    assert_eq!(uncached.cache_size(), 0);

    let mut cached = InputManager::new();
    cached.extract_text(path).await.unwrap();
    cached.clear_cache();
    assert_eq!(cached.cache_size(), 0);
}
