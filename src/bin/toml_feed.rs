use clap::Parser;
use std::sync::Arc;
use wp_feed::app::feed_app::normalize_site_link;
use wp_feed::core::registry::{page_range, posts_route, ResourceRegistry, POSTS_RESOURCE};
use wp_feed::core::{ConfigProvider, Storage};
use wp_feed::utils::{logger, validation::Validate};
use wp_feed::{FeedApp, FeedOptions, LocalStorage, ReqwestTransport, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-feed")]
#[command(about = "Render a WordPress feed using a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "wp-feed.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override feed.max_pages from config
    #[arg(long)]
    pages: Option<usize>,

    /// Dry run - show the request plan without fetching anything
    #[arg(long)]
    dry_run: bool,
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

    // 初始化日誌: 命令列 --verbose 優先於設定檔的 level
    let filter = match (args.verbose, config.log_level()) {
        (true, _) => "wp_feed=debug,info".to_string(),
        (false, Some(level)) => format!("wp_feed={}", level),
        (false, None) => "wp_feed=info".to_string(),
    };
    logger::init_logger(&filter, config.json_logs());

    tracing::info!("🚀 Starting TOML-based wp-feed");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(pages) = args.pages {
        config.feed.max_pages = Some(pages);
        tracing::info!("🔧 max_pages overridden to: {}", pages);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No requests will be made");
        perform_dry_run(&config);
        return Ok(());
    }

    let transport = Arc::new(ReqwestTransport::new(config.request_timeout())?);
    let mut app = FeedApp::new(transport, FeedOptions::from_provider(&config));

    let report = match app.load_pages(config.site_url(), config.max_pages()).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("❌ Feed failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    for failure in report.failures() {
        eprintln!("⚠️  {}", failure.error_text());
    }

    let html = app.render_html().await;
    let (storage, file_name) = LocalStorage::for_output_file(config.output_path());
    storage.write_file(&file_name, html.as_bytes()).await?;

    println!(
        "✅ Rendered {} posts from {} pages",
        report.posts_rendered(),
        report.pages_loaded()
    );
    println!("📁 Output saved to: {}", config.output_path());

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Configuration Summary:");
    tracing::info!("   Site: {}", config.site_url());
    tracing::info!(
        "   Pages: up to {} x {} posts",
        config.max_pages(),
        config.per_page()
    );
    tracing::info!("   Request timeout: {:?}", config.request_timeout());
    tracing::info!("   Halt on failure: {}", config.halt_on_failure());
    tracing::info!("   Output: {}", config.output_path());
}

fn perform_dry_run(config: &TomlConfig) {
    let mut registry = ResourceRegistry::new(normalize_site_link(config.site_url()));

    println!("🔍 Dry run for {}", registry.domain());
    println!("   GET {}", registry.api_root());
    if u32::try_from(config.max_pages()).is_err() {
        tracing::warn!(
            "max_pages {} exceeds the page counter; plan is cut at {}",
            config.max_pages(),
            u32::MAX
        );
    }
    for page in page_range(1, config.max_pages()) {
        let uri = registry.set_resource(POSTS_RESOURCE, &posts_route(config.per_page(), page));
        println!("   GET {}", uri);
    }
    println!("   write {}", config.output_path());
}
