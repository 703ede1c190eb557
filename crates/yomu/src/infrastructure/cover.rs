use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::{
    entities::series::Series,
    repositories::cover::{CoverRepository, CoverRepositoryError},
};

#[derive(Clone)]
pub struct CoverRepositoryImpl {
    client: reqwest::Client,
    thumbnail_dir: PathBuf,
}

impl CoverRepositoryImpl {
    pub fn new<P: AsRef<Path>>(thumbnail_dir: P) -> Self {
        Self {
            client: reqwest::Client::new(),
            thumbnail_dir: PathBuf::new().join(thumbnail_dir),
        }
    }

    // Thumbnails are stored as <series id>.<ext>. The extension follows the
    // cover url, so lookup goes by stem only.
    fn find_thumbnail(&self, series: &Series) -> Option<PathBuf> {
        let stem = series.id.to_string();

        std::fs::read_dir(&self.thumbnail_dir)
            .ok()?
            .flatten()
            .map(|entry| entry.path())
            .find(|path| path.file_stem().and_then(|s| s.to_str()) == Some(stem.as_str()))
    }

    fn thumbnail_path(&self, series: &Series) -> PathBuf {
        self.thumbnail_dir.join(format!(
            "{}.{}",
            series.id,
            extension_from_url(&series.cover_url)
        ))
    }
}

fn extension_from_url(url: &str) -> &str {
    let extension = url.split('.').next_back();

    match extension {
        Some(ext) => match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => "jpg",
            "png" => "png",
            "gif" => "gif",
            "bmp" => "bmp",
            "webp" => "webp",
            _ => "jpg",
        },
        None => "jpg",
    }
}

#[async_trait]
impl CoverRepository for CoverRepositoryImpl {
    fn thumbnail_exists(&self, series: &Series) -> bool {
        self.find_thumbnail(series).is_some()
    }

    fn delete_thumbnail(&self, series: &Series) {
        if let Some(path) = self.find_thumbnail(series) {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("failed to remove {}: {e}", path.display());
            }
        }
    }

    async fn download_cover(&self, series: &Series) -> Result<(), CoverRepositoryError> {
        if series.cover_url.is_empty() {
            return Ok(());
        }

        let bytes = self
            .client
            .get(&series.cover_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        tokio::fs::create_dir_all(&self.thumbnail_dir).await?;

        let path = self.thumbnail_path(series);
        tokio::fs::write(&path, &bytes).await?;

        debug!("saved cover for {} to {}", series.title, path.display());
        Ok(())
    }
}
