pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::time::Duration;

/// WordPress REST API 允許的最大 `per_page`
pub const MAX_PER_PAGE: usize = 100;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "wp-feed")]
#[command(about = "Render a WordPress site's identity block and an infinitely scrolling post feed")]
pub struct CliConfig {
    /// Site base URL, e.g. https://example.com
    #[arg(long)]
    pub site: String,

    /// Pages to load, including the first one
    #[arg(long, default_value = "1")]
    pub pages: usize,

    #[arg(long, default_value = "4")]
    pub per_page: usize,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    /// Keep paginating after a failed page instead of halting
    #[arg(long)]
    pub keep_observing_on_failure: bool,

    /// HTML tag used for error placeholders
    #[arg(long, default_value = "h2")]
    pub error_tag: String,

    #[arg(long, default_value = "%d/%m/%Y, %H:%M:%S")]
    pub date_format: String,

    #[arg(long, default_value = "./output/feed.html")]
    pub output: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn site_url(&self) -> &str {
        &self.site
    }

    fn per_page(&self) -> usize {
        self.per_page
    }

    fn max_pages(&self) -> usize {
        self.pages
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn halt_on_failure(&self) -> bool {
        !self.keep_observing_on_failure
    }

    fn error_tag(&self) -> &str {
        &self.error_tag
    }

    fn date_format(&self) -> &str {
        &self.date_format
    }

    fn output_path(&self) -> &str {
        &self.output
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("site", self.site.trim().trim_end_matches('/'))?;
        validation::validate_range("per_page", self.per_page, 1, MAX_PER_PAGE)?;
        validation::validate_positive_number("pages", self.pages, 1)?;
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 600)?;
        validation::validate_tag_name("error_tag", &self.error_tag)?;
        validation::validate_date_format("date_format", &self.date_format)?;
        validation::validate_output_path("output", &self.output)?;
        Ok(())
    }
}
