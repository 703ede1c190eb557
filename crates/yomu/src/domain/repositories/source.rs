use async_trait::async_trait;

use thiserror::Error;

use crate::domain::entities::source::{ChapterInfo, SeriesInfo, SourceInfo};

#[derive(Debug, Error)]
pub enum SourceRepositoryError {
    #[error("request return error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("source not found")]
    NotFound,
    #[error("other error: {0}")]
    Other(String),
}

/// Extension gateway. Every call is a suspension point and may fail; a
/// `NotFound` from `get_source_info` means the source has been removed.
#[async_trait]
pub trait SourceRepository: Clone + Send + Sync + 'static {
    async fn get_source_info(&self, source_id: i64) -> Result<SourceInfo, SourceRepositoryError>;

    async fn get_series_detail(
        &self,
        source_id: i64,
        path: &str,
    ) -> Result<SeriesInfo, SourceRepositoryError>;

    async fn get_chapters(
        &self,
        source_id: i64,
        path: &str,
    ) -> Result<Vec<ChapterInfo>, SourceRepositoryError>;
}
