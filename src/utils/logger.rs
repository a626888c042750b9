use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_cli_logger(verbose: bool) {
    init_logger(default_filter(verbose), false);
}

pub fn init_json_logger(verbose: bool) {
    init_logger(default_filter(verbose), true);
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "wp_feed=debug,info"
    } else {
        "wp_feed=info"
    }
}

/// `RUST_LOG` 優先；否則使用 `default_filter`
pub fn init_logger(default_filter: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    // try_init: 重複初始化（例如測試）時不 panic
    let _ = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .try_init()
    };
}
