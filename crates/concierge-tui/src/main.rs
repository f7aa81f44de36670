use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{error, info};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use concierge_core::assets::fetch_text_asset;
use concierge_core::config::Config;
use concierge_core::transport::{CompletionTransport, Transport};
use concierge_core::{OpenRouterClient, ProxyClient};

#[derive(Parser)]
#[command(name = "concierge")]
#[command(about = "Embeddable AI assistant chat widget for the terminal")]
struct Cli {
    /// Completion transport: "proxy" or "openrouter"
    #[arg(short, long)]
    transport: Option<String>,

    /// Model identifier (openrouter transport only)
    #[arg(short, long)]
    model: Option<String>,

    /// Base URL for the system prompt and credential assets
    #[arg(long)]
    asset_base: Option<String>,

    /// Completion endpoint URL
    #[arg(long)]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    let mut config = Config::load().unwrap_or_else(|_| Config::new());
    if cli.transport.is_some() {
        config.transport = cli.transport;
    }
    if cli.model.is_some() {
        config.model = cli.model;
    }
    if cli.asset_base.is_some() {
        config.asset_base = cli.asset_base;
    }
    if cli.endpoint.is_some() {
        config.completion_url = cli.endpoint;
    }

    let http = reqwest::Client::new();
    let (system_prompt, transport) = match init_widget(&http, &config).await {
        Ok(parts) => parts,
        Err(err) => {
            // Initialization failure is fatal to the widget instance: log it
            // and exit without constructing any UI.
            error!("chat init error: {:#}", err);
            return Ok(());
        }
    };

    info!(
        "widget initialized with {} transport against {}",
        config.transport_kind().as_str(),
        config.completion_url()
    );

    let mut app = App::new(config.title(), system_prompt, transport);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;
        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event).await?;
        }
    }

    app.abort_turn();
    tui::restore()?;
    Ok(())
}

/// Fetches the assets the widget needs and builds the configured transport.
/// The openrouter variant loads the system prompt and the bearer credential
/// in parallel; both must succeed or the widget never comes up.
async fn init_widget(
    http: &reqwest::Client,
    config: &Config,
) -> Result<(String, Arc<dyn CompletionTransport>)> {
    match config.transport_kind() {
        Transport::Proxy => {
            let system_prompt = fetch_text_asset(http, &config.system_prompt_url()).await?;
            let transport: Arc<dyn CompletionTransport> =
                Arc::new(ProxyClient::new(&config.completion_url()));
            Ok((system_prompt, transport))
        }
        Transport::OpenRouter => {
            let system_prompt_url = config.system_prompt_url();
            let api_key_url = config.api_key_url();
            let (system_prompt, api_key) = tokio::try_join!(
                fetch_text_asset(http, &system_prompt_url),
                fetch_text_asset(http, &api_key_url),
            )?;
            let transport: Arc<dyn CompletionTransport> = Arc::new(OpenRouterClient::new(
                &config.completion_url(),
                &api_key,
                &config.model(),
                &config.referrer(),
                &config.title(),
            ));
            Ok((system_prompt, transport))
        }
    }
}

/// Diagnostics go to a file; the terminal itself runs in raw mode.
fn init_tracing() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory"))?
        .join("concierge");
    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::File::create(log_dir.join("concierge.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}
