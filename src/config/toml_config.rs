use crate::app::session::{DEFAULT_ERROR_TAG, DEFAULT_PER_PAGE};
use crate::config::MAX_PER_PAGE;
use crate::core::loader::DEFAULT_REQUEST_TIMEOUT;
use crate::core::normalize::DEFAULT_DATE_FORMAT;
use crate::core::ConfigProvider;
use crate::utils::error::{FeedError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_OUTPUT_PATH: &str = "./output/feed.html";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub site: SiteConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedConfig {
    pub per_page: Option<usize>,
    pub max_pages: Option<usize>,
    pub request_timeout_seconds: Option<u64>,
    /// 失敗後是否停止分頁（預設 true）
    pub halt_on_failure: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_error_tag")]
    pub error_tag: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            error_tag: default_error_tag(),
            date_format: default_date_format(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

fn default_error_tag() -> String {
    DEFAULT_ERROR_TAG.to_string()
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FeedError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FeedError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換 `${VAR}` 與 `${VAR:-預設值}`；沒有預設值且變數不存在時保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").map_err(|e| {
            FeedError::ConfigError {
                message: format!("Invalid environment variable pattern: {}", e),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            match (std::env::var(&caps[1]), caps.get(2)) {
                (Ok(value), _) => value,
                (Err(_), Some(fallback)) => fallback.as_str().to_string(),
                (Err(_), None) => caps[0].to_string(),
            }
        });
        Ok(result.into_owned())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("site.url", self.site.url.trim().trim_end_matches('/'))?;
        validation::validate_range("feed.per_page", self.per_page(), 1, MAX_PER_PAGE)?;
        validation::validate_positive_number("feed.max_pages", self.max_pages(), 1)?;
        validation::validate_range(
            "feed.request_timeout_seconds",
            self.request_timeout().as_secs(),
            1,
            600,
        )?;
        validation::validate_tag_name("render.error_tag", &self.render.error_tag)?;
        validation::validate_date_format("render.date_format", &self.render.date_format)?;
        validation::validate_output_path("output.path", &self.output.path)?;
        Ok(())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn site_url(&self) -> &str {
        &self.site.url
    }

    fn per_page(&self) -> usize {
        self.feed.per_page.unwrap_or(DEFAULT_PER_PAGE)
    }

    fn max_pages(&self) -> usize {
        self.feed.max_pages.unwrap_or(1)
    }

    fn request_timeout(&self) -> Duration {
        self.feed
            .request_timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }

    fn halt_on_failure(&self) -> bool {
        self.feed.halt_on_failure.unwrap_or(true)
    }

    fn error_tag(&self) -> &str {
        &self.render.error_tag
    }

    fn date_format(&self) -> &str {
        &self.render.date_format
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
