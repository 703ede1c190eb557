use async_trait::async_trait;

use thiserror::Error;

use crate::domain::entities::series::Series;

#[derive(Debug, Error)]
pub enum CoverRepositoryError {
    #[error("request return error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Local thumbnail store. Downloads are best-effort; callers never fail
/// because a cover could not be fetched.
#[async_trait]
pub trait CoverRepository: Clone + Send + Sync + 'static {
    fn thumbnail_exists(&self, series: &Series) -> bool;

    fn delete_thumbnail(&self, series: &Series);

    async fn download_cover(&self, series: &Series) -> Result<(), CoverRepositoryError>;
}
