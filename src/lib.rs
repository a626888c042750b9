pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::http::ReqwestTransport;
pub use app::feed_app::FeedApp;
pub use app::session::{FeedOptions, FeedSession, InitialLoad};
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::pagination::{PageOutcome, PaginationController};
pub use core::registry::ResourceRegistry;
pub use utils::error::{FeedError, FetchFailure, Result};
