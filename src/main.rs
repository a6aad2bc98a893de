use anyhow::Context;
use clap::Parser;
use marketplace_flow::core::ConfigProvider;
use marketplace_flow::utils::error::ErrorSeverity;
use marketplace_flow::utils::{logger, validation::Validate};
use marketplace_flow::{spawn_session_reaper, AppState, CliConfig, InMemorySessionStore, JsonRenderer};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting marketplace-flow");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let sessions = InMemorySessionStore::new(config.session_idle_minutes());
    spawn_session_reaper(sessions.clone(), Duration::from_secs(60));

    let state = AppState::from_config(&config, Arc::new(sessions), Arc::new(JsonRenderer));
    tracing::info!(
        "📂 Serving manifests from {} ({} page(s) configured)",
        config.manifests_root(),
        config.page_keys().len()
    );

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;

    if let Err(e) = marketplace_flow::serve(listener, state).await {
        tracing::error!(
            "❌ Server stopped: {} (Severity: {:?})",
            e,
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());

        let exit_code = match e.severity() {
            ErrorSeverity::Low | ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}
