use async_trait::async_trait;

use thiserror::Error;

use crate::domain::entities::{chapter::Chapter, series::Series};

#[derive(Debug, Error)]
pub enum LibraryRepositoryError {
    #[error("database error: {0}")]
    DbError(#[from] sqlx::Error),
    #[error("series {0} not found")]
    SeriesNotFound(i64),
}

/// Persistence gateway for the library. Upserts are atomic per call; no
/// transaction spans the series and chapter writes.
#[async_trait]
pub trait LibraryRepository: Clone + Send + Sync + 'static {
    async fn get_series_list(&self) -> Result<Vec<Series>, LibraryRepositoryError>;

    async fn get_series_by_id(&self, id: i64) -> Result<Series, LibraryRepositoryError>;

    async fn get_chapters_by_series_id(
        &self,
        series_id: i64,
    ) -> Result<Vec<Chapter>, LibraryRepositoryError>;

    /// Insert or update a series, assigning an id if it has none. Returns the
    /// canonical stored form.
    async fn upsert_series(&self, series: &Series) -> Result<Series, LibraryRepositoryError>;

    async fn upsert_chapters(
        &self,
        chapters: &[Chapter],
        series_id: i64,
    ) -> Result<(), LibraryRepositoryError>;

    async fn delete_series(&self, id: i64) -> Result<(), LibraryRepositoryError>;

    async fn delete_chapters(
        &self,
        ids: &[i64],
        series_id: i64,
    ) -> Result<(), LibraryRepositoryError>;
}
