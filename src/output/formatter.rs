//! Output formatters: console, JSON and Markdown

use crate::config::{OutputConfig, OutputFormat};
use crate::error::Result;
use crate::geocoding::Coordinate;
use crate::output::report::*;
use colored::{Color, Colorize};
use std::fmt::Write;

/// Longest job excerpt shown on the console when not in detailed mode
const EXCERPT_CHARS: usize = 120;

pub trait OutputFormatter {
    fn format_report(&self, report: &Report) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Picks the formatter for the configured output format
pub struct ReportGenerator {
    format: OutputFormat,
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ReportGenerator {
    pub fn new(format: OutputFormat, use_colors: bool, detailed: bool) -> Self {
        Self {
            format,
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(detailed),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.format, config.color_output, config.detailed)
    }

    pub fn render(&self, report: &Report) -> Result<String> {
        match self.format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{}\n", title.color(Color::Cyan).bold())
        } else {
            format!("\n{}\n", title)
        }
    }

    fn list(&self, out: &mut String, name: &str, items: &[String]) {
        let value = if items.is_empty() {
            self.colorize("(none)", Color::BrightBlack)
        } else {
            items.join(", ")
        };
        let _ = writeln!(out, "  {:<10} {}", format!("{}:", name), value);
    }

    fn footer(&self, out: &mut String, metadata: &ReportMetadata) {
        if !self.detailed {
            return;
        }
        let _ = writeln!(out);
        if let Some(model) = &metadata.entity_model {
            let _ = writeln!(out, "  Entity model:    {}", model);
        }
        if let Some(model) = &metadata.embedding_model {
            let _ = writeln!(out, "  Embedding model: {}", model);
        }
        let _ = writeln!(out, "  Generated:       {}", metadata.generated_at.to_rfc3339());
    }

    fn profile(&self, report: &ProfileReport) -> String {
        let mut out = self.header(&format!("Profile: {}", report.source));
        let entities = &report.entities;

        let title = if entities.job_title.is_empty() {
            self.colorize("(none)", Color::BrightBlack)
        } else {
            self.colorize(&entities.job_title, Color::Green)
        };
        let _ = writeln!(out, "  {:<10} {}", "Title:", title);
        self.list(&mut out, "Skills", &entities.skills);
        self.list(&mut out, "Companies", &entities.companies);
        self.list(&mut out, "Diplomas", &entities.diplomas);
        self.list(&mut out, "Emails", &entities.emails);
        self.list(&mut out, "Links", &entities.links);

        let _ = writeln!(out, "\n  Normalized: {}", report.normalized_profile);
        self.footer(&mut out, &report.metadata);
        out
    }

    fn score(&self, report: &ScoreReport) -> String {
        let mut out = self.header("Similarity");
        let _ = writeln!(out, "  Resume: {}", report.resume_source);
        let _ = writeln!(out, "  Job:    {}", report.job_source);
        if self.detailed {
            let _ = writeln!(out, "\n  Resume profile: {}", report.resume_profile);
            let _ = writeln!(out, "  Job profile:    {}", report.job_profile);
        }
        let _ = writeln!(
            out,
            "\n  Score: {}",
            self.colorize(&format!("{:.4}", report.score), Color::Green)
        );
        self.footer(&mut out, &report.metadata);
        out
    }

    fn recommendations(&self, report: &RecommendationReport) -> String {
        let mut out = self.header(&format!(
            "Top {} of {} jobs for {}",
            report.recommendations.len(),
            report.jobs_considered,
            report.candidate_source
        ));
        let _ = writeln!(out, "  Candidate profile: {}\n", report.candidate_profile);

        if report.recommendations.is_empty() {
            let _ = writeln!(out, "  {}", self.colorize("No job ads to rank", Color::Yellow));
        }

        for job in &report.recommendations {
            let heading = match &job.title {
                Some(title) => format!("{} ({})", title, job.source),
                None => job.source.clone(),
            };
            let _ = writeln!(
                out,
                "  {}. {}  {}",
                job.rank,
                self.colorize(&format!("{:.4}", job.score), Color::Green),
                heading
            );

            let text = if self.detailed {
                job.job.clone()
            } else {
                excerpt(&job.job, EXCERPT_CHARS)
            };
            let _ = writeln!(out, "     {}", self.colorize(&text, Color::BrightBlack));
        }

        self.footer(&mut out, &report.metadata);
        out
    }

    fn geocode(&self, report: &GeocodeReport) -> String {
        let mut out = self.header(&format!("Geocode: {}", report.address));

        match (&report.result, &report.error) {
            (Some(found), _) => {
                if let Some(label) = &found.label {
                    let _ = writeln!(out, "  {}", self.colorize(label, Color::Green));
                }
                let _ = writeln!(out, "  lat: {:.6}  lon: {:.6}", found.lat, found.lon);
                if let Some(score) = found.query_score {
                    let _ = writeln!(out, "  query score: {:.2}", score);
                }
            }
            (None, Some(error)) => {
                let _ = writeln!(out, "  {}", self.colorize(&format!("Unresolved: {}", error), Color::Red));
            }
            (None, None) => {
                let _ = writeln!(out, "  {}", self.colorize("Unresolved", Color::Red));
            }
        }
        out
    }

    fn legacy_geocode(&self, report: &LegacyGeocodeReport) -> String {
        let mut out = self.header(&format!("Geocode: {}", report.address));
        let _ = writeln!(out, "  lat: {}", coordinate(&report.coordinates.lat));
        let _ = writeln!(out, "  lon: {}", coordinate(&report.coordinates.lon));
        out
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        Ok(match report {
            Report::Profile(r) => self.profile(r),
            Report::Score(r) => self.score(r),
            Report::Recommendations(r) => self.recommendations(r),
            Report::Geocode(r) => self.geocode(r),
            Report::LegacyGeocode(r) => self.legacy_geocode(r),
        })
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn metadata(&self, out: &mut String, metadata: &ReportMetadata) {
        if !self.include_metadata {
            return;
        }
        let _ = writeln!(out, "\n---\n");
        let _ = writeln!(out, "- Generated: {}", metadata.generated_at.to_rfc3339());
        if let Some(model) = &metadata.entity_model {
            let _ = writeln!(out, "- Entity model: `{}`", model);
        }
        if let Some(model) = &metadata.embedding_model {
            let _ = writeln!(out, "- Embedding model: `{}`", model);
        }
        let _ = writeln!(out, "- jobmatch {}", metadata.tool_version);
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        let mut out = String::new();

        match report {
            Report::Profile(r) => {
                let _ = writeln!(out, "# Profile: {}\n", r.source);
                let _ = writeln!(out, "| Category | Values |");
                let _ = writeln!(out, "|---|---|");
                let _ = writeln!(out, "| Job title | {} |", md_cell(&r.entities.job_title));
                let _ = writeln!(out, "| Skills | {} |", md_cell(&r.entities.skills.join(", ")));
                let _ = writeln!(out, "| Companies | {} |", md_cell(&r.entities.companies.join(", ")));
                let _ = writeln!(out, "| Diplomas | {} |", md_cell(&r.entities.diplomas.join(", ")));
                let _ = writeln!(out, "| Emails | {} |", md_cell(&r.entities.emails.join(", ")));
                let _ = writeln!(out, "| Links | {} |", md_cell(&r.entities.links.join(", ")));
                let _ = writeln!(out, "\n**Normalized profile:** {}", r.normalized_profile);
                self.metadata(&mut out, &r.metadata);
            }
            Report::Score(r) => {
                let _ = writeln!(out, "# Similarity\n");
                let _ = writeln!(out, "- Resume: `{}`", r.resume_source);
                let _ = writeln!(out, "- Job: `{}`", r.job_source);
                let _ = writeln!(out, "- Score: **{:.4}**", r.score);
                let _ = writeln!(out, "\n> {}\n>\n> {}", r.resume_profile, r.job_profile);
                self.metadata(&mut out, &r.metadata);
            }
            Report::Recommendations(r) => {
                let _ = writeln!(out, "# Job recommendations for {}\n", r.candidate_source);
                let _ = writeln!(out, "Candidate profile: {}\n", r.candidate_profile);
                let _ = writeln!(out, "| Rank | Score | Source | Title | Excerpt |");
                let _ = writeln!(out, "|---|---|---|---|---|");
                for job in &r.recommendations {
                    let _ = writeln!(
                        out,
                        "| {} | {:.4} | {} | {} | {} |",
                        job.rank,
                        job.score,
                        md_cell(&job.source),
                        md_cell(job.title.as_deref().unwrap_or("")),
                        md_cell(&excerpt(&job.job, EXCERPT_CHARS))
                    );
                }
                let _ = writeln!(
                    out,
                    "\n{} of {} jobs shown.",
                    r.recommendations.len(),
                    r.jobs_considered
                );
                self.metadata(&mut out, &r.metadata);
            }
            Report::Geocode(r) => {
                let _ = writeln!(out, "# Geocode: {}\n", r.address);
                if let Some(found) = &r.result {
                    let _ = writeln!(out, "- lat: {}", found.lat);
                    let _ = writeln!(out, "- lon: {}", found.lon);
                    if let Some(label) = &found.label {
                        let _ = writeln!(out, "- label: {}", label);
                    }
                } else if let Some(error) = &r.error {
                    let _ = writeln!(out, "Unresolved: {}", error);
                }
            }
            Report::LegacyGeocode(r) => {
                let _ = writeln!(out, "# Geocode: {}\n", r.address);
                let _ = writeln!(out, "- lat: {}", coordinate(&r.coordinates.lat));
                let _ = writeln!(out, "- lon: {}", coordinate(&r.coordinates.lon));
            }
        }

        Ok(out)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

fn coordinate(value: &Coordinate) -> String {
    match value {
        Coordinate::Value(v) => v.to_string(),
        Coordinate::Unresolved => "\"\"".to_string(),
    }
}

/// Single-line prefix of `text`, at most `max_chars` characters
fn excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars).collect();
    let cut = match cut.rfind(' ') {
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}...", cut)
}

fn md_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
