//! Entity recognition models
//!
//! An [`EntityRecognizer`] is the pre-trained sequence-labeling model seen from
//! the outside: text in, labelled spans out. Labels are the model's own
//! vocabulary; mapping them onto known categories happens in
//! [`crate::processing::entities`].

use crate::error::{MatcherError, Result};
use aho_corasick::{AhoCorasick, MatchKind};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::path::Path;
use std::time::Instant;

/// File holding the gazetteer patterns inside an entity model directory
pub const PATTERNS_FILE: &str = "patterns.jsonl";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedSpan {
    pub label: String,
    pub text: String,
    /// Byte offsets into the source text
    pub start: usize,
    pub end: usize,
}

pub trait EntityRecognizer: Send + Sync {
    /// Tag spans in `text`, in document order
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedSpan>>;

    fn name(&self) -> &str;
}

/// One line of `patterns.jsonl`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPattern {
    pub label: String,
    pub pattern: String,
}

/// Phrase-list model: case-insensitive, leftmost-longest, whole words only.
///
/// Case folding is ASCII only, so a pattern such as `Développeur` does not
/// match `DÉVELOPPEUR`. Patterns with non-ASCII letters must be listed in
/// every casing that should match.
pub struct GazetteerRecognizer {
    matcher: AhoCorasick,
    labels: Vec<String>,
    name: String,
}

impl GazetteerRecognizer {
    /// Load a model directory containing `patterns.jsonl`
    pub fn from_dir(model_dir: &Path) -> Result<Self> {
        let start_time = Instant::now();
        let patterns_path = model_dir.join(PATTERNS_FILE);

        if !patterns_path.exists() {
            return Err(MatcherError::ModelNotFound(format!(
                "No entity model at {} (missing {})",
                model_dir.display(),
                PATTERNS_FILE
            )));
        }

        let content = std::fs::read_to_string(&patterns_path)?;
        let patterns = Self::parse_patterns(&content)?;

        let name = model_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| model_dir.display().to_string());

        let recognizer = Self::from_patterns(name, patterns)?;
        info!(
            "Loaded entity model '{}' ({} patterns) in {:.2?}",
            recognizer.name,
            recognizer.labels.len(),
            start_time.elapsed()
        );
        Ok(recognizer)
    }

    pub fn from_patterns(name: impl Into<String>, patterns: Vec<EntityPattern>) -> Result<Self> {
        let mut labels = Vec::with_capacity(patterns.len());
        let mut phrases = Vec::with_capacity(patterns.len());

        for pattern in patterns {
            let phrase = pattern.pattern.trim();
            if phrase.is_empty() {
                warn!("Skipping empty pattern for label {}", pattern.label);
                continue;
            }
            phrases.push(phrase.to_string());
            labels.push(pattern.label);
        }

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(&phrases)
            .map_err(|e| MatcherError::ModelLoading(format!("Failed to build entity matcher: {}", e)))?;

        Ok(Self {
            matcher,
            labels,
            name: name.into(),
        })
    }

    fn parse_patterns(content: &str) -> Result<Vec<EntityPattern>> {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str::<EntityPattern>(line).map_err(|e| {
                    MatcherError::ModelLoading(format!(
                        "{} line {}: {}",
                        PATTERNS_FILE,
                        idx + 1,
                        e
                    ))
                })
            })
            .collect()
    }

    pub fn pattern_count(&self) -> usize {
        self.labels.len()
    }

    fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    }
}

impl EntityRecognizer for GazetteerRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedSpan>> {
        // Word boundaries first, then leftmost-longest among the survivors
        let mut candidates: Vec<_> = self
            .matcher
            .find_overlapping_iter(text)
            .filter(|m| Self::is_word_boundary(text, m.start(), m.end()))
            .collect();
        candidates.sort_by_key(|m| (m.start(), Reverse(m.end()), m.pattern().as_usize()));

        let mut spans = Vec::new();
        let mut covered_to = 0;
        for m in candidates {
            if m.start() < covered_to {
                continue;
            }
            covered_to = m.end();
            spans.push(RecognizedSpan {
                label: self.labels[m.pattern().as_usize()].clone(),
                text: text[m.start()..m.end()].to_string(),
                start: m.start(),
                end: m.end(),
            });
        }
        Ok(spans)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
