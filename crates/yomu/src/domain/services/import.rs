use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::domain::{
    entities::{chapter::Chapter, series::Series, source::LOCAL_SOURCE_ID},
    repositories::{
        cover::CoverRepository,
        library::{LibraryRepository, LibraryRepositoryError},
        source::{SourceRepository, SourceRepositoryError},
    },
};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("source return error: {0}")]
    Source(#[from] SourceRepositoryError),
    #[error("repository error: {0}")]
    Repository(#[from] LibraryRepositoryError),
}

#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("{0} is not in library")]
    NotInLibrary(String),
    #[error("source {0} is not installed")]
    SourceUnavailable(i64),
    #[error("no metadata found for {0}")]
    MissingMetadata(String),
    #[error("no chapters found for {0}")]
    MissingChapters(String),
    #[error("source return error: {0}")]
    Source(SourceRepositoryError),
    #[error("repository error: {0}")]
    Repository(#[from] LibraryRepositoryError),
}

/// Outcome of a batch reload. Every series in the batch is attempted;
/// failures are collected, never short-circuited.
#[derive(Debug, Default)]
pub struct ReloadSummary {
    pub attempted: usize,
    pub failures: Vec<(String, ReloadError)>,
}

impl ReloadSummary {
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn message(&self) -> String {
        if self.failures.is_empty() {
            format!("Reloaded {} series", self.attempted)
        } else if self.attempted == 1 {
            format!("Failed to reload {}", self.failures[0].0)
        } else {
            format!(
                "Reloaded {} of {} series, {} failed",
                self.succeeded(),
                self.attempted,
                self.failures.len()
            )
        }
    }
}

/// Sort chapters by title with numeric-aware ordering, so "Chapter 2" comes
/// before "Chapter 10" regardless of how the source orders them.
pub fn sort_chapters(chapters: &mut [Chapter]) {
    chapters.sort_by(|a, b| human_sort::compare(&a.title, &b.title));
}

/// Count unread chapters whose language passes the filter. An empty filter
/// matches every language.
pub fn count_unread(chapters: &[Chapter], chapter_languages: &[String]) -> i64 {
    chapters
        .iter()
        .filter(|c| chapter_languages.is_empty() || chapter_languages.contains(&c.language))
        .filter(|c| !c.read)
        .count() as i64
}

#[derive(Clone)]
pub struct ImportService<L, S, C>
where
    L: LibraryRepository,
    S: SourceRepository,
    C: CoverRepository,
{
    library: L,
    sources: S,
    covers: C,
}

impl<L, S, C> ImportService<L, S, C>
where
    L: LibraryRepository,
    S: SourceRepository,
    C: CoverRepository,
{
    pub fn new(library: L, sources: S, covers: C) -> Self {
        Self {
            library,
            sources,
            covers,
        }
    }

    /// Materialize a series and its chapters into the library.
    ///
    /// With `get_first` the full metadata is re-fetched from the source and
    /// the caller-supplied cover url and categories are restored onto it;
    /// otherwise the given series is persisted as-is. Both source fetches
    /// happen before any write, so a fetch failure never leaves a partial
    /// import behind.
    pub async fn import_series(
        &self,
        series: &Series,
        chapter_languages: &[String],
        get_first: bool,
    ) -> Result<Series, ImportError> {
        let mut incoming = if get_first {
            let mut fetched: Series = self
                .sources
                .get_series_detail(series.source_id, &series.path)
                .await?
                .into();
            fetched.id = series.id;
            fetched.cover_url = series.cover_url.clone();
            fetched.categories = series.categories.clone();
            fetched
        } else {
            series.clone()
        };
        incoming.preview = false;
        if incoming.date_added == NaiveDateTime::default() {
            incoming.date_added = chrono::Utc::now().naive_utc();
        }

        let infos = self
            .sources
            .get_chapters(series.source_id, &series.path)
            .await?;

        let stored = self.library.upsert_series(&incoming).await?;

        let mut chapters: Vec<Chapter> = infos
            .into_iter()
            .map(|info| {
                let mut chapter: Chapter = info.into();
                chapter.series_id = stored.id;
                chapter.source_id = stored.source_id;
                chapter
            })
            .collect();

        sort_chapters(&mut chapters);
        self.library.upsert_chapters(&chapters, stored.id).await?;

        let stored = self.refresh_number_unread(stored, chapter_languages).await?;

        Ok(stored)
    }

    /// Re-synchronize one persisted series against its content source.
    ///
    /// Fetched metadata replaces local fields except the locally owned ones
    /// (id, categories, trackers); a series from the local filesystem source
    /// keeps its record untouched. Chapters are matched by source identifier
    /// so local ids and read state survive, and chapters gone from the source
    /// are pruned.
    pub async fn reload_series(
        &self,
        series: &Series,
        chapter_languages: &[String],
    ) -> Result<Series, ReloadError> {
        if series.id == 0 {
            return Err(ReloadError::NotInLibrary(series.title.clone()));
        }

        if let Err(e) = self.sources.get_source_info(series.source_id).await {
            return Err(match e {
                SourceRepositoryError::NotFound => ReloadError::SourceUnavailable(series.source_id),
                e => ReloadError::Source(e),
            });
        }

        let fetched = match self
            .sources
            .get_series_detail(series.source_id, &series.path)
            .await
        {
            Ok(info) => info,
            Err(SourceRepositoryError::NotFound) => {
                return Err(ReloadError::MissingMetadata(series.title.clone()));
            }
            Err(e) => return Err(ReloadError::Source(e)),
        };

        let new_series = if series.source_id == LOCAL_SOURCE_ID {
            series.clone()
        } else {
            let mut s: Series = fetched.into();
            s.id = series.id;
            s.categories = series.categories.clone();
            s.trackers = series.trackers.clone();
            s.number_unread = series.number_unread;
            s.date_added = series.date_added;
            s
        };

        let infos = match self
            .sources
            .get_chapters(series.source_id, &series.path)
            .await
        {
            Ok(infos) if infos.is_empty() => {
                return Err(ReloadError::MissingChapters(series.title.clone()));
            }
            Ok(infos) => infos,
            Err(SourceRepositoryError::NotFound) => {
                return Err(ReloadError::MissingChapters(series.title.clone()));
            }
            Err(e) => return Err(ReloadError::Source(e)),
        };

        let existing = self.library.get_chapters_by_series_id(series.id).await?;

        let mut chapters: Vec<Chapter> = infos
            .into_iter()
            .map(|info| {
                let mut chapter: Chapter = info.into();
                chapter.series_id = series.id;
                chapter.source_id = series.source_id;
                chapter
            })
            .collect();

        // Match by source identifier, never by title; titles may be
        // re-localized between fetches.
        let existing_by_path: HashMap<&str, &Chapter> =
            existing.iter().map(|c| (c.path.as_str(), c)).collect();
        for chapter in chapters.iter_mut() {
            if let Some(old) = existing_by_path.get(chapter.path.as_str()) {
                chapter.id = old.id;
                chapter.read = old.read;
                chapter.date_added = old.date_added;
            }
        }

        let fetched_paths: HashSet<&str> = chapters.iter().map(|c| c.path.as_str()).collect();
        let orphaned: Vec<i64> = existing
            .iter()
            .filter(|c| !fetched_paths.contains(c.path.as_str()))
            .map(|c| c.id)
            .collect();

        let stored = self.library.upsert_series(&new_series).await?;

        sort_chapters(&mut chapters);
        self.library.upsert_chapters(&chapters, stored.id).await?;

        if !orphaned.is_empty() {
            self.library.delete_chapters(&orphaned, stored.id).await?;
        }

        let stored = self.refresh_number_unread(stored, chapter_languages).await?;

        if stored.cover_url != series.cover_url || !self.covers.thumbnail_exists(&stored) {
            self.covers.delete_thumbnail(&stored);

            let covers = self.covers.clone();
            let snapshot = stored.clone();
            tokio::spawn(async move {
                if let Err(e) = covers.download_cover(&snapshot).await {
                    warn!("failed to download cover for {}: {e}", snapshot.title);
                }
            });
        }

        Ok(stored)
    }

    /// Reload a list of series strictly sequentially, sorted by title for
    /// legible progress. One failure never stops the rest of the batch.
    pub async fn reload_series_list<F>(
        &self,
        mut series_list: Vec<Series>,
        chapter_languages: &[String],
        mut on_progress: F,
    ) -> ReloadSummary
    where
        F: FnMut(usize, usize),
    {
        series_list.sort_by(|a, b| human_sort::compare(&a.title, &b.title));

        let total = series_list.len();
        let mut summary = ReloadSummary {
            attempted: total,
            failures: vec![],
        };

        for (i, series) in series_list.iter().enumerate() {
            on_progress(i + 1, total);

            if let Err(e) = self.reload_series(series, chapter_languages).await {
                error!("failed to reload {}: {e}", series.title);
                summary.failures.push((series.title.clone(), e));
            }
        }

        summary
    }

    async fn refresh_number_unread(
        &self,
        mut series: Series,
        chapter_languages: &[String],
    ) -> Result<Series, LibraryRepositoryError> {
        let chapters = self.library.get_chapters_by_series_id(series.id).await?;
        series.number_unread = count_unread(&chapters, chapter_languages);

        self.library.upsert_series(&series).await
    }
}
