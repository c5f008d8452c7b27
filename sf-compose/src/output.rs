//! Rendering of posts, previews and reports for the terminal

use std::str::FromStr;

use anyhow::Result;
use libsocialflow::preview::{MediaLayout, PlatformPreview};
use libsocialflow::types::CaptionVariant;
use libsocialflow::validation::ValidationReport;
use libsocialflow::{Post, SocialFlowError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = SocialFlowError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(SocialFlowError::InvalidInput(format!(
                "Invalid format '{}'. Valid formats: text, json",
                s
            ))),
        }
    }
}

/// Print the finalized post on stdout
pub fn print_post(post: &Post, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(post)?),
        OutputFormat::Text => {
            println!("{} post {}", post.status, post.id);
            println!(
                "Platforms: {}",
                post.platforms
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            if let Some(at) = post.scheduled_at {
                println!("Scheduled at: {}", at.to_rfc3339());
            }
            println!("Content: {}", post.content);
            if !post.media.is_empty() {
                println!("Media: {} item(s)", post.media.len());
            }
            for (platform, o) in post.overrides.iter().flatten() {
                println!("[{}] {} ({} media)", platform, o.content, o.media.len());
            }
        }
    }
    Ok(())
}

/// Print a preview on stdout
pub fn print_preview(preview: &PlatformPreview, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(preview)?),
        OutputFormat::Text => {
            println!("{} preview", preview.platform);
            println!("{}", preview.text);
            match &preview.media {
                MediaLayout::None => {}
                MediaLayout::Grid { columns, items } => {
                    println!("[{} media in {} column(s)]", items.len(), columns)
                }
                MediaLayout::Hero { item } => println!("[{} {}]", item.kind, item.url),
                MediaLayout::MediaRequired => println!("[Media Required]"),
            }
            let marker = if preview.over_limit { " (over limit)" } else { "" };
            println!("{}/{} characters{}", preview.char_count, preview.max_chars, marker);
        }
    }
    Ok(())
}

/// Print caption variations on stderr
pub fn print_suggestions(variants: &[CaptionVariant]) {
    for (i, variant) in variants.iter().enumerate() {
        eprintln!("{}. {} {}", i + 1, variant.text, variant.hashtags.join(" "));
    }
}

/// Print validation findings on stderr
pub fn print_validation(report: &ValidationReport) {
    for result in &report.results {
        for error in &result.errors {
            eprintln!("Error [{}]: {}", result.platform, error);
        }
        for warning in &result.warnings {
            eprintln!("Warning [{}]: {}", result.platform, warning);
        }
    }
}
