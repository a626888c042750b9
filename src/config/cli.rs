use crate::core::Storage;
use crate::utils::error::Result;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    /// 以輸出檔的上層目錄為根，回傳 storage 與檔名
    pub fn for_output_file(output_path: &str) -> (Self, String) {
        let path = Path::new(output_path);
        let base = path
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| ".".to_string());
        let file_name = path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| "feed.html".to_string());

        (Self::new(base), file_name)
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_nested_dir() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_string_lossy().to_string());

        storage.write_file("out/feed.html", b"<html></html>").await.unwrap();
        let data = tokio::fs::read(temp_dir.path().join("out/feed.html")).await.unwrap();

        assert_eq!(data, b"<html></html>");
    }

    #[test]
    fn test_for_output_file() {
        let (storage, name) = LocalStorage::for_output_file("./output/feed.html");
        assert_eq!(storage.base_path, "./output");
        assert_eq!(name, "feed.html");

        let (storage, name) = LocalStorage::for_output_file("feed.html");
        assert_eq!(storage.base_path, ".");
        assert_eq!(name, "feed.html");
    }
}
