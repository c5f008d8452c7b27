//! sf-compose - Compose one post for several social platforms

mod output;

use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use libsocialflow::composer::{Action, ComposerSession, GenerationOutcome};
use libsocialflow::generation::ContentGenerator;
use libsocialflow::logging::LoggingConfig;
use libsocialflow::{
    preview, validation, AccountRegistry, Config, EventBus, GeminiClient, GenerationError,
    MockGenerator, Platform, PostQueue, SocialFlowError,
};
use tracing::{debug, warn};

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "sf-compose")]
#[command(version, about = "Compose one post for several social platforms")]
#[command(long_about = r#"Compose one post for several social platforms, tune it per platform,
and schedule it or save it as a draft.

EXAMPLES:
    # Schedule for every connected account
    sf-compose "We just shipped v2!" --all-connected --date 2025-06-01 --time 14:30

    # Shorter version for Twitter only
    sf-compose "Long announcement..." -p linkedin,twitter --tune "twitter=Shipped v2 🚀"

    # Let the generative service propose captions and keep the first
    sf-compose "product launch" -p instagram --suggest --image "studio shot of our app"

    # Save as draft, JSON output
    echo "Draft text" | sf-compose -p facebook --draft --format json

    # Show the preview without finalizing
    sf-compose "Hello" -p twitter --preview

CONFIGURATION:
    ~/.config/socialflow/config.toml, or the file named by SOCIALFLOW_CONFIG.
    The generative service key is read from GEMINI_API_KEY (or API_KEY).

EXIT CODES:
    0 - Success
    1 - Generation or configuration error
    2 - Missing or invalid API key
    3 - Invalid input or no platform selected
"#)]
struct Cli {
    /// Master content (reads from stdin if not provided)
    content: Option<String>,

    /// Target platform(s), comma-separated
    #[arg(short, long, value_name = "PLATFORMS", value_delimiter = ',')]
    platform: Vec<String>,

    /// Target every connected account
    #[arg(long)]
    all_connected: bool,

    /// Connect an account first (simulated OAuth, repeatable)
    #[arg(long, value_name = "PLATFORM")]
    connect: Vec<String>,

    /// Platform-specific content, e.g. "twitter=Short version" (repeatable)
    #[arg(long, value_name = "PLATFORM=TEXT")]
    tune: Vec<String>,

    /// Schedule date
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<String>,

    /// Schedule time
    #[arg(long, value_name = "HH:MM")]
    time: Option<String>,

    /// Save as draft instead of scheduling
    #[arg(short, long)]
    draft: bool,

    /// Generate caption variations and use the first one
    #[arg(long)]
    suggest: bool,

    /// Shorten the content with the generative service
    #[arg(long)]
    summarize: bool,

    /// Generate and attach an image
    #[arg(long, value_name = "PROMPT")]
    image: Option<String>,

    /// Style hint appended to the image prompt (repeatable)
    #[arg(long, value_name = "STYLE", requires = "image")]
    image_style: Vec<String>,

    /// Generate and attach a video
    #[arg(long, value_name = "PROMPT")]
    video: Option<String>,

    /// Print the preview of the post and exit without finalizing
    #[arg(long)]
    preview: bool,

    /// Output format
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Path to the configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Use the offline generator (for testing)
    #[arg(long, hide = true)]
    mock: bool,
}

impl Cli {
    fn needs_generation(&self) -> bool {
        self.suggest || self.summarize || self.image.is_some() || self.video.is_some()
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    LoggingConfig::from_env(cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<SocialFlowError>()
        .map(SocialFlowError::exit_code)
        .unwrap_or(1)
}

async fn run(cli: Cli) -> Result<()> {
    let format: OutputFormat = cli.format.parse()?;
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Loading {}", path.display()))?,
        None => Config::load()?,
    };
    let content = read_content(cli.content.as_deref())?;
    let tunes = cli
        .tune
        .iter()
        .map(|t| parse_tune(t))
        .collect::<libsocialflow::Result<Vec<_>>>()?;

    let events = EventBus::default();
    let registry = AccountRegistry::from_config(&config, events.clone())?;
    let to_connect = cli
        .connect
        .iter()
        .map(|name| name.parse::<Platform>())
        .collect::<libsocialflow::Result<Vec<_>>>()?;
    for account in registry.connect_all(&to_connect).await? {
        eprintln!("Connected {} as {}", account.platform, account.username);
    }

    let generator = build_generator(&cli, &config)?;
    let queue = PostQueue::new();
    let mut session = ComposerSession::from_config(&config, generator, Arc::new(queue), events)?;

    session.dispatch(Action::SetContent(content));
    select_platforms(&mut session, &registry, &cli)?;

    if cli.suggest {
        let outcome = session.request_captions().await;
        if report(outcome) {
            output::print_suggestions(session.state().suggestions());
            session.dispatch(Action::ApplySuggestion(0));
        }
    }
    if cli.summarize {
        report(session.request_summary().await);
    }
    if let Some(prompt) = &cli.image {
        session.dispatch(Action::SetImagePrompt(prompt.clone()));
        for style in &cli.image_style {
            session.dispatch(Action::AppendImageStyle(style.clone()));
        }
        report(session.request_image().await);
    }
    if let Some(prompt) = &cli.video {
        session.dispatch(Action::SetVideoPrompt(prompt.clone()));
        report(session.request_video().await);
    }

    for (platform, text) in tunes {
        if !session.state().selection().is_selected(platform) {
            return Err(SocialFlowError::InvalidInput(format!(
                "--tune {}: platform is not a target",
                platform
            ))
            .into());
        }
        session.dispatch(Action::LeaveTuning);
        session.dispatch(Action::SetPreview(platform));
        session.dispatch(Action::EnterTuning);
        session.dispatch(Action::SetContent(text));
    }

    session.dispatch(Action::SetScheduleDate(cli.date.clone()));
    session.dispatch(Action::SetScheduleTime(cli.time.clone()));

    if session.state().has_pending_uploads() {
        eprintln!("Waiting for uploads to finish...");
        session.settle_uploads().await;
    }

    if cli.preview {
        let preview = preview::render_draft(session.state()).ok_or_else(|| {
            SocialFlowError::InvalidInput("Select a platform to preview".to_string())
        })?;
        return output::print_preview(&preview, format);
    }

    output::print_validation(&validation::validate(session.state()));

    let post = if cli.draft {
        session.save_draft().await?
    } else {
        session.schedule().await?
    };
    output::print_post(&post, format)
}

/// Content from the argument, or from stdin when it is piped
fn read_content(arg: Option<&str>) -> libsocialflow::Result<String> {
    if let Some(content) = arg {
        return Ok(content.to_string());
    }

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(SocialFlowError::InvalidInput(
            "No content provided. Pass it as an argument or pipe it on stdin".to_string(),
        ));
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer).map_err(|e| {
        SocialFlowError::InvalidInput(format!("Failed to read stdin: {}", e))
    })?;
    Ok(buffer.trim_end_matches(['\n', '\r']).to_string())
}

/// Parse `PLATFORM=TEXT`
fn parse_tune(value: &str) -> libsocialflow::Result<(Platform, String)> {
    let (platform, text) = value.split_once('=').ok_or_else(|| {
        SocialFlowError::InvalidInput(format!("--tune expects PLATFORM=TEXT, got '{}'", value))
    })?;
    Ok((platform.trim().parse()?, text.to_string()))
}

fn select_platforms(
    session: &mut ComposerSession,
    registry: &AccountRegistry,
    cli: &Cli,
) -> libsocialflow::Result<()> {
    if cli.all_connected {
        session.dispatch(Action::SelectAllConnected(registry.accounts()));
    }
    for name in cli.platform.iter().filter(|n| !n.trim().is_empty()) {
        let platform: Platform = name.trim().parse()?;
        if !registry.is_connected(platform) {
            warn!(%platform, "Targeting a platform without a connected account");
        }
        if !session.state().selection().is_selected(platform) {
            session.dispatch(Action::TogglePlatform(platform));
        }
    }
    debug!(targets = ?session.state().targets(), "Selected platforms");
    Ok(())
}

fn build_generator(cli: &Cli, config: &Config) -> libsocialflow::Result<Arc<dyn ContentGenerator>> {
    if cli.mock {
        return Ok(Arc::new(MockGenerator::success()));
    }
    match GeminiClient::from_config(&config.generation) {
        Ok(client) => Ok(Arc::new(client)),
        Err(SocialFlowError::Generation(GenerationError::MissingApiKey)) if !cli.needs_generation() => {
            // No request will be issued
            Ok(Arc::new(MockGenerator::failing(GenerationError::MissingApiKey)))
        }
        Err(e) => Err(e),
    }
}

/// Print a generation outcome; returns true if it was applied
fn report(outcome: GenerationOutcome) -> bool {
    match outcome {
        GenerationOutcome::Applied => true,
        GenerationOutcome::Skipped => {
            eprintln!("Nothing to generate from: content or prompt is empty");
            false
        }
        GenerationOutcome::Discarded => false,
        GenerationOutcome::Failed(message) => {
            eprintln!("Warning: {}", message);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tune() {
        let (platform, text) = parse_tune("Twitter=Short = sweet").unwrap();
        assert_eq!(platform, Platform::Twitter);
        assert_eq!(text, "Short = sweet");
    }

    #[test]
    fn test_parse_tune_rejects_bad_input() {
        assert!(matches!(parse_tune("twitter"), Err(SocialFlowError::InvalidInput(_))));
        assert!(matches!(parse_tune("myspace=hi"), Err(SocialFlowError::InvalidInput(_))));
    }

    #[test]
    fn test_exit_code_through_context() {
        let err = anyhow::Error::from(SocialFlowError::ValidationBlocked("none".to_string()))
            .context("Finalizing");
        assert_eq!(exit_code(&err), 3);
        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }

    #[test]
    fn test_cli_parses_platform_list() {
        let cli = Cli::parse_from(["sf-compose", "hi", "-p", "linkedin,twitter", "--tune", "twitter=yo"]);
        assert_eq!(cli.platform, vec!["linkedin", "twitter"]);
        assert_eq!(cli.tune, vec!["twitter=yo"]);
        assert!(!cli.needs_generation());
    }
}
