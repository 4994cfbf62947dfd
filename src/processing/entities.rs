//! Entity extraction: recognizer output plus email/URL token heuristics

use crate::error::{MatcherError, Result};
use crate::processing::recognizer::EntityRecognizer;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Categories the matcher understands; anything else a model emits is ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityLabel {
    JobTitle,
    Skill,
    Company,
    Diploma,
    Email,
    Link,
}

impl EntityLabel {
    pub const ALL: [EntityLabel; 6] = [
        EntityLabel::JobTitle,
        EntityLabel::Skill,
        EntityLabel::Company,
        EntityLabel::Diploma,
        EntityLabel::Email,
        EntityLabel::Link,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLabel::JobTitle => "JOB_TITLE",
            EntityLabel::Skill => "SKILL",
            EntityLabel::Company => "COMPANY",
            EntityLabel::Diploma => "DIPLOMA",
            EntityLabel::Email => "EMAIL",
            EntityLabel::Link => "LINK",
        }
    }
}

impl FromStr for EntityLabel {
    type Err = MatcherError;

    fn from_str(s: &str) -> Result<Self> {
        EntityLabel::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MatcherError::EntityExtraction(format!("Unknown entity label: {}", s)))
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entities found in one resume or job ad
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedProfile {
    /// First detected job title, empty when none was found
    #[serde(rename = "JOB_TITLE")]
    pub job_title: String,
    /// Duplicate-free
    #[serde(rename = "SKILL")]
    pub skills: Vec<String>,
    /// Duplicate-free
    #[serde(rename = "COMPANY")]
    pub companies: Vec<String>,
    #[serde(rename = "DIPLOMA")]
    pub diplomas: Vec<String>,
    #[serde(rename = "EMAIL")]
    pub emails: Vec<String>,
    #[serde(rename = "LINK")]
    pub links: Vec<String>,
}

impl ExtractedProfile {
    pub fn entity_count(&self) -> usize {
        usize::from(!self.job_title.is_empty())
            + self.skills.len()
            + self.companies.len()
            + self.diplomas.len()
            + self.emails.len()
            + self.links.len()
    }
}

pub struct EntityExtractor {
    recognizer: Box<dyn EntityRecognizer>,
    heuristics: TokenHeuristics,
}

impl EntityExtractor {
    pub fn new(recognizer: Box<dyn EntityRecognizer>) -> Self {
        Self {
            recognizer,
            heuristics: TokenHeuristics::new(),
        }
    }

    pub fn model_name(&self) -> &str {
        self.recognizer.name()
    }

    pub fn extract(&self, text: &str) -> Result<ExtractedProfile> {
        let mut job_titles = Vec::new();
        let mut profile = ExtractedProfile::default();

        for span in self.recognizer.recognize(text)? {
            let label = match span.label.parse::<EntityLabel>() {
                Ok(label) => label,
                Err(_) => {
                    debug!("Ignoring span '{}' with unknown label {}", span.text, span.label);
                    continue;
                }
            };

            match label {
                EntityLabel::JobTitle => job_titles.push(span.text),
                EntityLabel::Skill => profile.skills.push(span.text),
                EntityLabel::Company => profile.companies.push(span.text),
                EntityLabel::Diploma => profile.diplomas.push(span.text),
                EntityLabel::Email => profile.emails.push(span.text),
                EntityLabel::Link => profile.links.push(span.text),
            }
        }

        // Lexical checks run on top of the model; overlaps with model tags are kept
        for token in tokenize(text) {
            if self.heuristics.like_email(token) {
                profile.emails.push(token.to_string());
            }
            if self.heuristics.like_url(token) {
                profile.links.push(token.to_string());
            }
        }

        dedup_in_place(&mut profile.skills);
        dedup_in_place(&mut profile.companies);
        profile.job_title = job_titles.into_iter().next().unwrap_or_default();

        debug!(
            "Extracted {} entities with model '{}'",
            profile.entity_count(),
            self.recognizer.name()
        );

        Ok(profile)
    }
}

/// Keep the first occurrence of each entry
fn dedup_in_place(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}

/// Whitespace tokens with surrounding punctuation removed
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .map(|token| {
            token
                .trim_start_matches(['(', '[', '{', '<', '"', '\''])
                .trim_end_matches([')', ']', '}', '>', '"', '\'', ',', ';', ':', '!', '?', '.'])
        })
        .filter(|token| !token.is_empty())
}

/// Top-level domains accepted for scheme-less links such as `github.com/user`.
/// Compared case-sensitively, so `ASP.NET` is not a link.
const KNOWN_TLDS: &[&str] = &[
    "com", "org", "net", "io", "dev", "ai", "co", "edu", "gov", "app", "info", "me", "tech", "fr",
    "de", "uk", "ca", "us", "eu", "nl", "es", "it", "ch", "be", "in", "au",
];

pub struct TokenHeuristics {
    email_regex: Regex,
    scheme_url_regex: Regex,
    host_url_regex: Regex,
}

impl Default for TokenHeuristics {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenHeuristics {
    pub fn new() -> Self {
        let email_regex =
            Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
                .expect("Invalid email regex");

        let scheme_url_regex =
            Regex::new(r"(?i)^(?:https?://|www\.)\S+$").expect("Invalid URL regex");

        let host_url_regex = Regex::new(r"(?i)^(?:[a-z0-9-]+\.)+([a-z]{2,24})(?::\d+)?(?:/\S*)?$")
            .expect("Invalid host regex");

        Self {
            email_regex,
            scheme_url_regex,
            host_url_regex,
        }
    }

    pub fn like_email(&self, token: &str) -> bool {
        self.email_regex.is_match(token)
    }

    pub fn like_url(&self, token: &str) -> bool {
        if token.contains('@') {
            return false;
        }
        if self.scheme_url_regex.is_match(token) {
            return true;
        }
        self.host_url_regex
            .captures(token)
            .and_then(|caps| caps.get(1))
            .map(|tld| KNOWN_TLDS.contains(&tld.as_str()))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::recognizer::{EntityPattern, GazetteerRecognizer};

    fn extractor(patterns: &[(&str, &str)]) -> EntityExtractor {
        let patterns = patterns
            .iter()
            .map(|(label, pattern)| EntityPattern {
                label: label.to_string(),
                pattern: pattern.to_string(),
            })
            .collect();
        EntityExtractor::new(Box::new(
            GazetteerRecognizer::from_patterns("test", patterns).unwrap(),
        ))
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!("JOB_TITLE".parse::<EntityLabel>().unwrap(), EntityLabel::JobTitle);
        assert_eq!("skill".parse::<EntityLabel>().unwrap(), EntityLabel::Skill);
        assert!("LOCATION".parse::<EntityLabel>().is_err());
    }

    #[test]
    fn test_skills_and_companies_are_deduplicated() {
        let extractor = extractor(&[("SKILL", "python"), ("COMPANY", "acme")]);
        let profile = extractor
            .extract("Python at Acme, more Python at ACME and Acme again. python!")
            .unwrap();

        assert_eq!(profile.skills, vec!["Python", "python"]);
        assert_eq!(profile.companies, vec!["Acme", "ACME"]);

        let mut skills = profile.skills.clone();
        skills.dedup();
        assert_eq!(skills.len(), profile.skills.len());
    }

    #[test]
    fn test_first_job_title_wins() {
        let extractor = extractor(&[("JOB_TITLE", "data scientist"), ("JOB_TITLE", "chef")]);
        let profile = extractor
            .extract("Former chef, now a data scientist.")
            .unwrap();
        assert_eq!(profile.job_title, "chef");
    }

    #[test]
    fn test_missing_job_title_is_empty() {
        let extractor = extractor(&[("SKILL", "rust")]);
        let profile = extractor.extract("Rust and more Rust").unwrap();
        assert_eq!(profile.job_title, "");
    }

    #[test]
    fn test_unknown_labels_are_ignored() {
        let extractor = extractor(&[("LOCATION", "paris"), ("SKILL", "sql")]);
        let profile = extractor.extract("SQL developer in Paris").unwrap();
        assert_eq!(profile.skills, vec!["SQL"]);
        assert_eq!(profile.entity_count(), 1);
    }

    #[test]
    fn test_diplomas_keep_duplicates_and_order() {
        let extractor = extractor(&[("DIPLOMA", "msc"), ("DIPLOMA", "bsc")]);
        let profile = extractor.extract("MSc, BSc, MSc").unwrap();
        assert_eq!(profile.diplomas, vec!["MSc", "BSc", "MSc"]);
    }

    #[test]
    fn test_email_and_link_heuristics_stack_on_model_tags() {
        let extractor = extractor(&[("EMAIL", "jane@example.com")]);
        let profile = extractor
            .extract("Contact: jane@example.com (https://jane.dev/blog), github.com/jane.")
            .unwrap();

        assert_eq!(profile.emails, vec!["jane@example.com", "jane@example.com"]);
        assert_eq!(profile.links, vec!["https://jane.dev/blog", "github.com/jane"]);
    }

    #[test]
    fn test_url_heuristic_rejects_file_like_tokens() {
        let heuristics = TokenHeuristics::new();
        assert!(heuristics.like_url("www.example.org"));
        assert!(heuristics.like_url("HTTP://EXAMPLE.COM"));
        assert!(!heuristics.like_url("Node.js"));
        assert!(!heuristics.like_url("ASP.NET"));
        assert!(!heuristics.like_url("VB.NET"));
        assert!(heuristics.like_url("github.com/jane"));
        assert!(!heuristics.like_url("resume.pdf"));
        assert!(!heuristics.like_url("jane@example.com"));
    }

    #[test]
    fn test_tokenize_strips_punctuation() {
        let tokens: Vec<&str> = tokenize("(hello), \"world\"! ...").collect();
        assert_eq!(tokens, vec!["hello", "world"]);
    }

    #[test]
    fn test_profile_serializes_with_category_keys() {
        let profile = ExtractedProfile {
            job_title: "Chef".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["JOB_TITLE"], "Chef");
        assert!(json["SKILL"].as_array().unwrap().is_empty());
    }
}
