//! Job matcher library
//!
//! Turns resumes and job ads into normalized profiles, scores them against each
//! other with a sentence-embedding model, ranks job recommendations, and resolves
//! addresses to coordinates.

pub mod cli;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod input;
pub mod output;
pub mod processing;
pub mod schema;

pub use config::Config;
pub use error::{MatcherError, Result};
