use std::collections::HashMap;

use async_trait::async_trait;

use crate::{
    domain::{
        entities::source::{ChapterInfo, SeriesInfo, SourceInfo},
        repositories::source::{SourceRepository, SourceRepositoryError},
    },
    infrastructure::config::SourceConfig,
};

/// Extension gateway over HTTP. Sources are declared in config; series and
/// chapter metadata are fetched as JSON from the source's endpoints.
#[derive(Clone)]
pub struct SourceRepositoryImpl {
    client: reqwest::Client,
    sources: HashMap<i64, SourceInfo>,
}

impl SourceRepositoryImpl {
    pub fn new(sources: &[SourceConfig]) -> Self {
        Self {
            client: reqwest::Client::new(),
            sources: sources
                .iter()
                .map(|s| {
                    (
                        s.id,
                        SourceInfo {
                            id: s.id,
                            name: s.name.clone(),
                            url: s.url.trim_end_matches('/').to_string(),
                        },
                    )
                })
                .collect(),
        }
    }

    fn source(&self, source_id: i64) -> Result<&SourceInfo, SourceRepositoryError> {
        self.sources
            .get(&source_id)
            .ok_or(SourceRepositoryError::NotFound)
    }
}

#[async_trait]
impl SourceRepository for SourceRepositoryImpl {
    async fn get_source_info(&self, source_id: i64) -> Result<SourceInfo, SourceRepositoryError> {
        self.source(source_id).cloned()
    }

    async fn get_series_detail(
        &self,
        source_id: i64,
        path: &str,
    ) -> Result<SeriesInfo, SourceRepositoryError> {
        let source = self.source(source_id)?;
        let url = format!("{}/series/{path}", source.url);

        let resp = self.client.get(&url).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceRepositoryError::NotFound);
        }

        let info = resp.error_for_status()?.json::<SeriesInfo>().await?;

        debug!("fetched series detail from {url}");
        Ok(info)
    }

    async fn get_chapters(
        &self,
        source_id: i64,
        path: &str,
    ) -> Result<Vec<ChapterInfo>, SourceRepositoryError> {
        let source = self.source(source_id)?;
        let url = format!("{}/series/{path}/chapters", source.url);

        let resp = self.client.get(&url).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceRepositoryError::NotFound);
        }

        let chapters = resp.error_for_status()?.json::<Vec<ChapterInfo>>().await?;

        debug!("fetched {} chapters from {url}", chapters.len());
        Ok(chapters)
    }
}
