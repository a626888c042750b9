pub mod document;
pub mod dom;
pub mod loader;
pub mod normalize;
pub mod pagination;
pub mod registry;
pub mod render;
pub mod sentinel;
pub mod terms;

pub use crate::domain::model::{NormalizedPost, Post, SiteInfo, Term};
pub use crate::domain::ports::{ConfigProvider, HttpResponse, Storage, Transport};
pub use crate::utils::error::{FetchFailure, Result};
