mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use draftbot_ai::{GeminiClient, GenerativeClient, ModelGateway};
use draftbot_core::channel::{Channel, DiscordChannel};
use draftbot_core::config::BotConfig;
use draftbot_core::orchestrator::{run_dispatch_loop, Orchestrator};
use draftbot_core::paths;
use draftbot_core::triage::{BrandContext, InteractionLog};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => BotConfig::load_from_path(Some(path.clone())),
        None => BotConfig::load(),
    };
    config.apply_env_overrides();

    // Console plus a file under the data dir; the file is informational,
    // not a contract surface.
    let log_dir = paths::ensure_logs_dir().context("creating log directory")?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "draftbot.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking.and(std::io::stdout))
        .with_ansi(false)
        .with_target(false)
        .init();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(config).await,
        Commands::Models => list_models(config).await,
    }
}

async fn run(config: BotConfig) -> Result<()> {
    config.validate()?;

    let bot_token = config.bot_token().unwrap_or_default().to_string();
    let api_key = config.api_key().unwrap_or_default().to_string();

    let channel: Arc<dyn Channel> = Arc::new(DiscordChannel::with_token(&bot_token));
    let gateway = Arc::new(
        ModelGateway::new(Arc::new(GeminiClient::new(api_key)))
            .with_timeout(config.generation_timeout()),
    );
    let context = BrandContext::load(config.context_path());
    let log = InteractionLog::new(config.log_path());

    info!(
        watch = config.triage.watch_channel.as_deref().unwrap_or("<all>"),
        review = config.triage.review_channel.as_deref().unwrap_or("<local log>"),
        auto_post = config.triage.auto_post,
        "Starting draftbot"
    );

    let orchestrator = Arc::new(Orchestrator::new(config, context, gateway, log, channel));
    orchestrator.startup().await;

    run_dispatch_loop(orchestrator).await;
    Ok(())
}

async fn list_models(config: BotConfig) -> Result<()> {
    let api_key = config
        .api_key()
        .context("Gemini API key is not configured (set GEMINI_API_KEY or [gemini].api_key)")?;

    let client = GeminiClient::new(api_key);
    let models = client.list_models().await?;
    if models.is_empty() {
        println!("No models visible to this credential.");
        return Ok(());
    }
    for model in models {
        println!("{model}");
    }
    Ok(())
}
