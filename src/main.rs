use clap::Parser;
use std::sync::Arc;
use wp_feed::core::{ConfigProvider, Storage};
use wp_feed::utils::error::{ErrorSeverity, FeedError};
use wp_feed::utils::{logger, validation::Validate};
use wp_feed::{CliConfig, FeedApp, FeedOptions, LocalStorage, ReqwestTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting wp-feed CLI");
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

    let transport = Arc::new(ReqwestTransport::new(config.request_timeout())?);
    let mut app = FeedApp::new(transport, FeedOptions::from_provider(&config));

    let report = match app.load_pages(config.site_url(), config.max_pages()).await {
        Ok(report) => report,
        Err(e) => exit_with(&e),
    };

    for failure in report.failures() {
        eprintln!("⚠️  {}", failure.error_text());
    }

    let html = app.render_html().await;
    let (storage, file_name) = LocalStorage::for_output_file(config.output_path());
    if let Err(e) = storage.write_file(&file_name, html.as_bytes()).await {
        exit_with(&e);
    }

    tracing::info!(
        "✅ Rendered {} posts from {} pages",
        report.posts_rendered(),
        report.pages_loaded()
    );
    println!(
        "✅ Rendered {} posts from {} pages",
        report.posts_rendered(),
        report.pages_loaded()
    );
    println!("📁 Output saved to: {}", config.output_path());

    Ok(())
}

fn exit_with(e: &FeedError) -> ! {
    tracing::error!(
        "❌ wp-feed failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
