//! Profile extraction, normalization, embedding and ranking

pub mod entities;
pub mod recognizer;
pub mod normalizer;
pub mod embeddings;
pub mod embedding_manager;
pub mod scorer;
pub mod recommender;
pub mod matcher;

pub use entities::{EntityExtractor, EntityLabel, ExtractedProfile};
pub use matcher::MatchingEngine;
pub use recommender::{Recommendation, DEFAULT_TOP_JOBS};
