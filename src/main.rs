//! jobmatch: resume parsing, job recommendations and geocoding

use clap::Parser;
use jobmatch::cli::{self, Cli, Commands, ConfigAction, ModelAction};
use jobmatch::config::Config;
use jobmatch::error::{MatcherError, Result};
use jobmatch::geocoding::Geocoder;
use jobmatch::input::InputManager;
use jobmatch::output::report::{
    GeocodeReport, JobSource, LegacyGeocodeReport, ProfileReport, RankedJob, RecommendationReport,
    ReportMetadata, ScoreReport,
};
use jobmatch::output::{Report, ReportGenerator};
use jobmatch::processing::embedding_manager::EmbeddingModelManager;
use jobmatch::processing::MatchingEngine;
use jobmatch::schema::load_job_catalog;
use log::{error, info};
use std::path::Path;
use std::process;

const DOCUMENT_EXTENSIONS: [&str; 5] = ["pdf", "txt", "text", "md", "markdown"];

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let mut config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = apply_output_overrides(&cli, &mut config) {
        error!("{}", e);
        process::exit(1);
    }

    if let Err(e) = run_command(cli, config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn apply_output_overrides(cli: &Cli, config: &mut Config) -> Result<()> {
    if let Some(format) = &cli.output {
        config.output.format = cli::parse_output_format(format).map_err(MatcherError::InvalidInput)?;
    }
    if cli.detailed {
        config.output.detailed = true;
    }
    if cli.no_color {
        config.output.color_output = false;
    }
    Ok(())
}

async fn run_command(cli: Cli, config: Config) -> Result<()> {
    let generator = ReportGenerator::from_config(&config.output);

    match cli.command {
        Commands::Parse { file } => {
            validate_document(&file, "Document")?;
            let text = InputManager::new().extract_text(&file).await?;

            let engine = MatchingEngine::from_config(&config)?;
            let entities = engine.parse_document(&text)?;

            let report = ProfileReport {
                source: file.display().to_string(),
                normalized_profile: entities.normalized(),
                entities,
                metadata: ReportMetadata::new(Some(engine.entity_model_name()), None),
            };
            emit(&generator, &Report::Profile(report))?;
        }

        Commands::Score { resume, job } => {
            validate_document(&resume, "Resume")?;
            validate_document(&job, "Job ad")?;

            let mut input_manager = InputManager::new();
            let resume_text = input_manager.extract_text(&resume).await?;
            let job_text = input_manager.extract_text(&job).await?;

            let engine = MatchingEngine::from_config(&config)?;
            let resume_profile = engine.keywords_extraction(&resume_text)?;
            let job_profile = engine.keywords_extraction(&job_text)?;
            let score = engine.similarity_score(&resume_profile, &job_profile)?;

            let report = ScoreReport {
                resume_source: resume.display().to_string(),
                job_source: job.display().to_string(),
                resume_profile,
                job_profile,
                score,
                metadata: ReportMetadata::new(
                    Some(engine.entity_model_name()),
                    Some(engine.embedding_model_name()),
                ),
            };
            emit(&generator, &Report::Score(report))?;
        }

        Commands::Recommend {
            resume,
            jobs,
            catalog,
            top,
        } => {
            validate_document(&resume, "Resume")?;

            let mut input_manager = InputManager::new();
            let resume_text = input_manager.extract_text(&resume).await?;

            let sources = match catalog {
                Some(catalog_path) => {
                    let catalog = load_job_catalog(&catalog_path)?;
                    info!("Loaded {} jobs from {}", catalog.len(), catalog_path.display());
                    catalog.iter().map(JobSource::from_catalog).collect::<Vec<_>>()
                }
                None => {
                    let mut sources = Vec::with_capacity(jobs.len());
                    for path in &jobs {
                        validate_document(path, "Job ad")?;
                        let text = input_manager.extract_text(path).await?;
                        sources.push(JobSource::from_file(&path.display().to_string(), text));
                    }
                    sources
                }
            };

            let engine = MatchingEngine::from_config(&config)?;
            let job_ads: Vec<String> = sources.iter().map(|s| s.text.clone()).collect();
            let candidate_profile = engine.keywords_extraction(&resume_text)?;
            let recommendations = engine.recommend_for_profile(&candidate_profile, &job_ads, top)?;

            let report = RecommendationReport {
                candidate_source: resume.display().to_string(),
                candidate_profile,
                jobs_considered: job_ads.len(),
                recommendations: RankedJob::attach_sources(recommendations, &sources),
                metadata: ReportMetadata::new(
                    Some(engine.entity_model_name()),
                    Some(engine.embedding_model_name()),
                ),
            };
            emit(&generator, &Report::Recommendations(report))?;
        }

        Commands::Geocode { address, legacy } => {
            let geocoder = Geocoder::from_config(&config)?;

            let report = if legacy {
                Report::LegacyGeocode(LegacyGeocodeReport::new(
                    &address,
                    geocoder.geocode_address(&address).await,
                ))
            } else {
                Report::Geocode(GeocodeReport::new(&address, geocoder.lookup(&address).await))
            };
            emit(&generator, &report)?;
        }

        Commands::Models { action } => {
            let mut manager = EmbeddingModelManager::new(
                config.models_dir().clone(),
                config.models.available_models.clone(),
            )
            .await?;

            match action {
                ModelAction::List => {
                    println!("Embedding models:");
                    for model in manager.list_available_models() {
                        let status = if manager.is_model_downloaded(&model.name) {
                            "downloaded"
                        } else {
                            "available"
                        };
                        println!(
                            "  - {} ({}) {} MB, {} dims [{}]",
                            model.name, model.repo_id, model.size_mb, model.dimensions, status
                        );
                        println!("    {}", model.description);
                    }
                    if manager.list_downloaded_models().is_empty() {
                        println!("\nNo models downloaded yet. Get started with:");
                        println!("  jobmatch models download {}", config.models.embedding_model);
                    }
                }

                ModelAction::Download { model, force } => {
                    let model_path = manager.download_model(&model, force).await?;
                    println!("Model '{}' ready at {}", model, model_path.display());
                }

                ModelAction::Remove { model } => {
                    let model_path = manager.remove_model(&model).await?;
                    println!("Removed {}", model_path.display());
                }

                ModelAction::Info { model } => {
                    let info = manager
                        .get_model_info(&model)
                        .ok_or_else(|| MatcherError::ModelNotFound(model.clone()))?;

                    println!("Name: {}", info.name);
                    println!("Repository: {}", info.repo_id);
                    println!("Size: {} MB", info.size_mb);
                    println!("Dimensions: {}", info.dimensions);
                    println!("Description: {}", info.description);
                    match manager.get_model_path(&info.name) {
                        Some(path) => println!("Location: {}", path.display()),
                        None => println!("Status: not downloaded (jobmatch models download {})", info.name),
                    }
                }
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let content = toml::to_string_pretty(&config).map_err(|e| {
                    MatcherError::Configuration(format!("Failed to serialize config: {}", e))
                })?;
                println!("{}", content);
            }

            Some(ConfigAction::Reset) => {
                let default_config = Config::default();
                match &cli.config {
                    Some(path) => default_config.save_to(path)?,
                    None => default_config.save()?,
                }
                println!("Configuration reset to defaults");
            }

            Some(ConfigAction::Path) => {
                let path = cli.config.clone().unwrap_or_else(Config::config_path);
                println!("{}", path.display());
            }
        },
    }

    Ok(())
}

fn validate_document(path: &Path, what: &str) -> Result<()> {
    cli::validate_file_extension(path, &DOCUMENT_EXTENSIONS)
        .map_err(|e| MatcherError::InvalidInput(format!("{} file: {}", what, e)))
}

fn emit(generator: &ReportGenerator, report: &Report) -> Result<()> {
    let rendered = generator.render(report)?;
    println!("{}", rendered);
    Ok(())
}
