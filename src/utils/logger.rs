use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` 未設定時的預設過濾規則
///
/// verbose 模式下額外打開 axum 的 extractor rejection（表單、路徑解析失敗），
/// hyper 連線層的雜訊一律壓到 warn。
pub fn default_directives(verbose: bool) -> String {
    if verbose {
        "marketplace_flow=debug,axum::rejection=trace,hyper=warn,info".to_string()
    } else {
        "marketplace_flow=info,hyper=warn,warn".to_string()
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)))
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(verbose)
                .with_line_number(verbose)
                .compact(),
        )
        .init();
}

/// 容器部署時使用 JSON 格式，保留 target 以便依模組篩選
pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_target(true),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        for verbose in [false, true] {
            let directives = default_directives(verbose);
            assert!(directives.starts_with("marketplace_flow="));
            assert!(EnvFilter::try_new(&directives).is_ok());
        }
        assert!(default_directives(true).contains("axum::rejection=trace"));
        assert!(!default_directives(false).contains("axum::rejection"));
    }
}
