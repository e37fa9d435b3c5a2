//! Assistant Desk - Entry Point
//!
//! Modes:
//! - Default: interactive console against the backend
//! - --webhook / -w: intent webhook server

use assistant_desk::{Config, Console, WebhookServer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Parse args
    let args: Vec<String> = std::env::args().collect();
    let webhook_mode = args.iter().any(|a| a == "--webhook" || a == "-w");
    let help_mode = args.iter().any(|a| a == "--help" || a == "-h");

    if help_mode {
        println!("Assistant Desk v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage: assistant-desk [OPTIONS]");
        println!();
        println!("Options:");
        println!("  --webhook, -w      Run the intent webhook server");
        println!("  --help, -h         Show this help");
        println!();
        println!("Default: interactive console");
        println!();
        println!("Environment variables:");
        println!("  BACKEND_URL          Backend base URL (default: https://localhost:9000)");
        println!("  INTERNAL_API_KEY     API key sent as x-api-key");
        println!("  TTS_VOICE            Voice for spoken replies (default: alloy)");
        println!("  SESSION_ID           Session id (default: default)");
        println!("  WEBHOOK_BIND_ADDR    Webhook bind address (default: 127.0.0.1)");
        println!("  WEBHOOK_PORT         Webhook port (default: 8088)");
        return Ok(());
    }

    let log_level = std::env::var("RUST_LOG")
        .map(|s| match s.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        })
        .unwrap_or(if webhook_mode { Level::INFO } else { Level::WARN });

    if webhook_mode {
        // Server mode - log to stdout with colors
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_ansi(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        // Console mode - keep logs on stderr, away from the conversation
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    let config = Config::from_env()?;

    if webhook_mode {
        info!("Assistant Desk webhook v{}", env!("CARGO_PKG_VERSION"));

        WebhookServer::from_config(&config).run().await?;
    } else {
        info!("Assistant Desk console v{}", env!("CARGO_PKG_VERSION"));

        Console::new(&config)?.run().await?;
    }

    Ok(())
}
