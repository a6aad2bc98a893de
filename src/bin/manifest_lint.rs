use clap::Parser;
use marketplace_flow::config::toml_config::TomlConfig;
use marketplace_flow::core::lint::{lint, LintLevel};
use marketplace_flow::core::ConfigProvider;
use marketplace_flow::utils::{logger, validation::Validate};
use marketplace_flow::{FlowEngine, FsManifestSource};
use std::path::Path;

#[derive(Parser)]
#[command(name = "manifest-lint")]
#[command(about = "Check page and price manifests for parse errors and duplicate question ids")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "marketplace.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let config = TomlConfig::from_file(&args.config)?;
    config.validate()?;

    let price_root = Path::new(config.manifests_root()).join(config.price_manifest_dir());
    let provisioning_types = list_provisioning_types(&price_root)?;
    tracing::info!(
        "🔍 Checking {} page(s) and {} provisioning type(s)",
        config.page_keys().len(),
        provisioning_types.len()
    );

    let engine = FlowEngine::from_config(FsManifestSource::new(config.manifests_root()), &config);
    let report = lint(&engine, &provisioning_types).await;

    for finding in &report.findings {
        match finding.level {
            LintLevel::Warning => println!("⚠️  {}: {}", finding.manifest, finding.problem),
            LintLevel::Error => println!("❌ {}: {}", finding.manifest, finding.problem),
        }
    }
    println!(
        "📊 {} manifest(s) checked, {} finding(s)",
        report.checked,
        report.findings.len()
    );

    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

/// 價格目錄下每個子目錄就是一個 provisioning type
fn list_provisioning_types(price_root: &Path) -> anyhow::Result<Vec<String>> {
    if !price_root.exists() {
        tracing::warn!("Price manifest directory {} does not exist", price_root.display());
        return Ok(Vec::new());
    }

    let mut types = Vec::new();
    for entry in std::fs::read_dir(price_root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            types.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    types.sort();
    Ok(types)
}
