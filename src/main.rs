use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use mcp_relay::agent::{self, AgentExit, RelayOptions};
use mcp_relay::config::{AgentConfig, validate_server_url};
use mcp_relay::model::{GeminiClient, GenerativeModel};
use mcp_relay::secret;
use mcp_relay::theme as t;

// ── CLI ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "mcp-relay",
    version,
    about = "AI agent for Browser MCP: relays server messages through Google Gemini"
)]
struct Cli {
    /// The WebSocket address of the Browser MCP server.
    #[arg(long = "mcp_server", value_name = "URL")]
    mcp_server: Option<String>,
    /// Model to answer with.
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,
    /// Path to a TOML config file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Log full message content instead of truncated previews.
    #[arg(long, short)]
    verbose: bool,
    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    t::init_color(cli.no_color);

    let mut config = AgentConfig::load(cli.config)?;
    if let Some(server) = cli.mcp_server {
        config.mcp_server = server;
    }
    if let Some(model) = cli.model {
        config.model = model;
    }
    validate_server_url(&config.mcp_server)?;

    t::print_header("mcp-relay");
    println!("Initializing AI agent...");

    // The credential is read exactly once and handed to the client as a
    // value; nothing below this point touches the environment.
    let api_key = secret::resolve_api_key()?;
    // Clear the variables so child processes don't inherit the key.
    // SAFETY: no other threads have been spawned yet.
    unsafe {
        std::env::remove_var(secret::API_KEY_ENV);
        std::env::remove_var(secret::API_KEY_ENV_FALLBACK);
    }

    let model = GeminiClient::new(
        api_key,
        config.model.clone(),
        config.base_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;
    println!(
        "{}",
        t::icon_ok(&format!("Gemini model initialized: {}", t::info(&model.describe())))
    );
    println!("{}", t::label_value("MCP server", &config.mcp_server));
    println!(
        "{}",
        t::muted(&format!(
            "Started at {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ))
    );

    // Graceful shutdown on Ctrl+C (all platforms).
    let cancel = CancellationToken::new();
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        cancel_for_signal.cancel();
    });

    // On Unix, also treat SIGTERM as a request to stop.
    #[cfg(unix)]
    {
        let cancel_for_term = cancel.clone();
        tokio::spawn(async move {
            use tokio::signal::unix::{SignalKind, signal};
            if let Ok(mut sig) = signal(SignalKind::terminate()) {
                sig.recv().await;
                cancel_for_term.cancel();
            }
        });
    }

    let opts = RelayOptions {
        server_url: config.mcp_server.clone(),
        verbose: cli.verbose,
    };
    let exit = agent::run(&opts, &model, cancel).await;

    match exit {
        AgentExit::Cancelled => println!("Agent shut down by user."),
        _ => println!("Agent has shut down."),
    }

    Ok(())
}
