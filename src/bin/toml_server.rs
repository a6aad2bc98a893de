use anyhow::Context;
use clap::Parser;
use marketplace_flow::config::toml_config::TomlConfig;
use marketplace_flow::core::ConfigProvider;
use marketplace_flow::utils::{logger, validation::Validate};
use marketplace_flow::{spawn_session_reaper, AppState, InMemorySessionStore, JsonRenderer};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "toml-server")]
#[command(about = "Serve the marketplace flows from a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "marketplace.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the bind address from config
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger(args.verbose || config.verbose());
    } else {
        logger::init_cli_logger(args.verbose || config.verbose());
    }

    tracing::info!("🚀 Starting TOML-configured marketplace server");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(bind) = args.bind {
        tracing::info!("🔧 Bind address overridden to: {}", bind);
        config.server.bind = bind;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let sessions = InMemorySessionStore::new(config.session_idle_minutes());
    spawn_session_reaper(sessions.clone(), Duration::from_secs(60));

    let state = AppState::from_config(&config, Arc::new(sessions), Arc::new(JsonRenderer));
    for page in config.page_keys() {
        tracing::info!("📄 Page '{}' -> {}", page, config.page_manifest(page).unwrap_or("?"));
    }

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;

    marketplace_flow::serve(listener, state)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
