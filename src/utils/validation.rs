use crate::utils::error::{FeedError, Result};
use chrono::format::{Item, StrftimeItems};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> FeedError {
    FeedError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// 網站網址: http(s)、必須有主機，且不能帶查詢字串或片段，
/// 否則 `{domain}/wp-json` 會組出錯誤的路徑
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    let url = Url::parse(url_str)
        .map_err(|e| invalid(field_name, url_str, format!("Invalid URL format: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field_name,
            url_str,
            format!("Unsupported URL scheme: {}", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(invalid(field_name, url_str, "URL has no host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(
            field_name,
            url_str,
            "Site URL must not contain a query string or fragment",
        ));
    }
    Ok(())
}

/// 輸出檔路徑: 非空、沒有 NUL，且不能是目錄
pub fn validate_output_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }
    if path.ends_with('/') || path.ends_with('\\') {
        return Err(invalid(field_name, path, "Path must name a file, not a directory"));
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field_name, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

/// 錯誤佔位元素只允許單純的 HTML 標籤名稱
pub fn validate_tag_name(field_name: &str, tag: &str) -> Result<()> {
    let valid = tag.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');

    if !valid {
        return Err(invalid(
            field_name,
            tag,
            "Must be a plain HTML tag name such as h2 or p",
        ));
    }
    Ok(())
}

/// 日期格式必須是 chrono 認得的 strftime 格式
pub fn validate_date_format(field_name: &str, format: &str) -> Result<()> {
    validate_non_empty_string(field_name, format)?;

    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(invalid(field_name, format, "Not a valid strftime date format"));
    }
    Ok(())
}
