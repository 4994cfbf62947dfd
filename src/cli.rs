//! CLI interface for the job matcher

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "jobmatch")]
#[command(about = "Resume parsing, job recommendations and address geocoding")]
#[command(long_about = "Extract job titles, skills and diplomas from resumes and job ads, rank job ads for a candidate with sentence embeddings, and geocode addresses")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format: console, json, markdown (defaults to the configured one)
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    /// Show full job texts, profiles and model details
    #[arg(short, long, global = true)]
    pub detailed: bool,

    /// Disable colored console output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract entities from a resume or job ad
    Parse {
        /// Path to document (PDF, TXT, MD)
        file: PathBuf,
    },

    /// Similarity between a resume and a single job ad
    Score {
        /// Path to resume file (PDF, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to job ad file (PDF, TXT, MD)
        #[arg(short, long)]
        job: PathBuf,
    },

    /// Rank job ads for a candidate
    Recommend {
        /// Path to resume file (PDF, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Job ad files
        #[arg(short, long, num_args = 1.., required_unless_present = "catalog", conflicts_with = "catalog")]
        jobs: Vec<PathBuf>,

        /// JSON job catalog exported from the job board
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Number of recommendations (defaults to matching.top_jobs)
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Resolve an address to coordinates
    Geocode {
        /// Free-text address
        address: String,

        /// Print only the legacy {"lat", "lon"} pair, empty strings when unresolved
        #[arg(long)]
        legacy: bool,
    },

    /// Embedding model management
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List embedding models in the catalog
    List,

    /// Download an embedding model from the Hugging Face Hub
    Download {
        /// Catalog name or HuggingFace repo ID
        model: String,

        /// Force re-download if model exists
        #[arg(short, long)]
        force: bool,
    },

    /// Remove a downloaded model
    Remove {
        /// Model name to remove
        model: String,
    },

    /// Show model information
    Info {
        /// Model name
        model: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<crate::config::OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(crate::config::OutputFormat::Console),
        "json" => Ok(crate::config::OutputFormat::Json),
        "markdown" | "md" => Ok(crate::config::OutputFormat::Markdown),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown",
            format
        )),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
