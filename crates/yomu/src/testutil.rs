//! In-memory fakes for the library, source, and cover ports.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use crate::domain::{
    entities::{
        chapter::Chapter,
        series::Series,
        source::{ChapterInfo, SeriesInfo, SourceInfo},
    },
    repositories::{
        cover::{CoverRepository, CoverRepositoryError},
        library::{LibraryRepository, LibraryRepositoryError},
        source::{SourceRepository, SourceRepositoryError},
    },
};

#[derive(Default)]
pub struct LibraryState {
    next_series_id: i64,
    next_chapter_id: i64,
    pub series: BTreeMap<i64, Series>,
    pub chapters: BTreeMap<i64, Chapter>,
}

impl LibraryState {
    fn upsert_series(&mut self, series: &Series) -> Series {
        let existing_id = if series.id != 0 && self.series.contains_key(&series.id) {
            Some(series.id)
        } else {
            self.series
                .values()
                .find(|s| s.source_id == series.source_id && s.path == series.path)
                .map(|s| s.id)
        };

        let mut stored = series.clone();
        stored.preview = false;
        match existing_id {
            Some(id) => stored.id = id,
            None => {
                self.next_series_id += 1;
                stored.id = self.next_series_id;
            }
        }

        self.series.insert(stored.id, stored.clone());
        stored
    }

    fn upsert_chapter(&mut self, chapter: &Chapter, series_id: i64) -> Chapter {
        let existing_id = if chapter.id != 0 && self.chapters.contains_key(&chapter.id) {
            Some(chapter.id)
        } else {
            self.chapters
                .values()
                .find(|c| c.series_id == series_id && c.path == chapter.path)
                .map(|c| c.id)
        };

        let mut stored = chapter.clone();
        stored.series_id = series_id;
        match existing_id {
            Some(id) => stored.id = id,
            None => {
                self.next_chapter_id += 1;
                stored.id = self.next_chapter_id;
            }
        }

        self.chapters.insert(stored.id, stored.clone());
        stored
    }
}

/// Library fake backed by id-ordered maps, so chapter iteration order is the
/// order ids were assigned in.
#[derive(Clone, Default)]
pub struct InMemoryLibrary {
    pub state: Arc<Mutex<LibraryState>>,
    pub fail_series_list: Arc<AtomicBool>,
}

impl InMemoryLibrary {
    pub fn seed_series(&self, series: Series) -> Series {
        self.state.lock().unwrap().upsert_series(&series)
    }

    pub fn seed_chapter(&self, chapter: Chapter) -> Chapter {
        let series_id = chapter.series_id;
        self.state.lock().unwrap().upsert_chapter(&chapter, series_id)
    }

    pub fn series_count(&self) -> usize {
        self.state.lock().unwrap().series.len()
    }

    pub fn chapters_of(&self, series_id: i64) -> Vec<Chapter> {
        self.state
            .lock()
            .unwrap()
            .chapters
            .values()
            .filter(|c| c.series_id == series_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl LibraryRepository for InMemoryLibrary {
    async fn get_series_list(&self) -> Result<Vec<Series>, LibraryRepositoryError> {
        if self.fail_series_list.load(Ordering::SeqCst) {
            return Err(LibraryRepositoryError::DbError(sqlx::Error::PoolClosed));
        }

        Ok(self.state.lock().unwrap().series.values().cloned().collect())
    }

    async fn get_series_by_id(&self, id: i64) -> Result<Series, LibraryRepositoryError> {
        self.state
            .lock()
            .unwrap()
            .series
            .get(&id)
            .cloned()
            .ok_or(LibraryRepositoryError::SeriesNotFound(id))
    }

    async fn get_chapters_by_series_id(
        &self,
        series_id: i64,
    ) -> Result<Vec<Chapter>, LibraryRepositoryError> {
        Ok(self.chapters_of(series_id))
    }

    async fn upsert_series(&self, series: &Series) -> Result<Series, LibraryRepositoryError> {
        Ok(self.state.lock().unwrap().upsert_series(series))
    }

    async fn upsert_chapters(
        &self,
        chapters: &[Chapter],
        series_id: i64,
    ) -> Result<(), LibraryRepositoryError> {
        let mut state = self.state.lock().unwrap();
        for chapter in chapters {
            state.upsert_chapter(chapter, series_id);
        }
        Ok(())
    }

    async fn delete_series(&self, id: i64) -> Result<(), LibraryRepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.series.remove(&id);
        state.chapters.retain(|_, c| c.series_id != id);
        Ok(())
    }

    async fn delete_chapters(
        &self,
        ids: &[i64],
        series_id: i64,
    ) -> Result<(), LibraryRepositoryError> {
        let mut state = self.state.lock().unwrap();
        state
            .chapters
            .retain(|id, c| c.series_id != series_id || !ids.contains(id));
        Ok(())
    }
}

#[derive(Default)]
pub struct SourceState {
    pub sources: HashMap<i64, SourceInfo>,
    pub series: HashMap<(i64, String), SeriesInfo>,
    pub chapters: HashMap<(i64, String), Vec<ChapterInfo>>,
    pub fail_chapters: HashSet<(i64, String)>,
    pub fetch_order: Vec<String>,
}

/// Source fake that records chapter-fetch order and the highest number of
/// concurrent chapter fetches it ever saw.
#[derive(Clone, Default)]
pub struct FakeSource {
    pub state: Arc<Mutex<SourceState>>,
    in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
}

impl FakeSource {
    pub fn add_source(&self, id: i64, name: &str) {
        self.state.lock().unwrap().sources.insert(
            id,
            SourceInfo {
                id,
                name: name.to_string(),
                url: format!("http://{name}.test"),
            },
        );
    }

    pub fn put_series(&self, info: SeriesInfo) {
        self.state
            .lock()
            .unwrap()
            .series
            .insert((info.source_id, info.path.clone()), info);
    }

    pub fn put_chapters(&self, source_id: i64, path: &str, chapters: Vec<ChapterInfo>) {
        self.state
            .lock()
            .unwrap()
            .chapters
            .insert((source_id, path.to_string()), chapters);
    }

    pub fn fail_chapters_for(&self, source_id: i64, path: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_chapters
            .insert((source_id, path.to_string()));
    }

    pub fn fetch_order(&self) -> Vec<String> {
        self.state.lock().unwrap().fetch_order.clone()
    }
}

#[async_trait]
impl SourceRepository for FakeSource {
    async fn get_source_info(&self, source_id: i64) -> Result<SourceInfo, SourceRepositoryError> {
        self.state
            .lock()
            .unwrap()
            .sources
            .get(&source_id)
            .cloned()
            .ok_or(SourceRepositoryError::NotFound)
    }

    async fn get_series_detail(
        &self,
        source_id: i64,
        path: &str,
    ) -> Result<SeriesInfo, SourceRepositoryError> {
        self.state
            .lock()
            .unwrap()
            .series
            .get(&(source_id, path.to_string()))
            .cloned()
            .ok_or(SourceRepositoryError::NotFound)
    }

    async fn get_chapters(
        &self,
        source_id: i64,
        path: &str,
    ) -> Result<Vec<ChapterInfo>, SourceRepositoryError> {
        let cur = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(cur, Ordering::SeqCst);

        // yield so overlapping fetches would be observable
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let result = {
            let mut state = self.state.lock().unwrap();
            state.fetch_order.push(path.to_string());

            if state.fail_chapters.contains(&(source_id, path.to_string())) {
                Err(SourceRepositoryError::Other(
                    "chapter fetch failed".to_string(),
                ))
            } else {
                state
                    .chapters
                    .get(&(source_id, path.to_string()))
                    .cloned()
                    .ok_or(SourceRepositoryError::NotFound)
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        result
    }
}

#[derive(Clone, Default)]
pub struct FakeCovers {
    pub exists: Arc<AtomicBool>,
    pub fail_download: Arc<AtomicBool>,
    pub deleted: Arc<AtomicUsize>,
    pub downloaded: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl CoverRepository for FakeCovers {
    fn thumbnail_exists(&self, _series: &Series) -> bool {
        self.exists.load(Ordering::SeqCst)
    }

    fn delete_thumbnail(&self, _series: &Series) {
        self.deleted.fetch_add(1, Ordering::SeqCst);
    }

    async fn download_cover(&self, series: &Series) -> Result<(), CoverRepositoryError> {
        if self.fail_download.load(Ordering::SeqCst) {
            return Err(CoverRepositoryError::IoError(std::io::Error::other(
                "no space left",
            )));
        }

        self.downloaded
            .lock()
            .unwrap()
            .push(series.cover_url.clone());
        Ok(())
    }
}

pub fn series_info(source_id: i64, path: &str, title: &str, cover_url: &str) -> SeriesInfo {
    SeriesInfo {
        source_id,
        path: path.to_string(),
        title: title.to_string(),
        status: None,
        cover_url: cover_url.to_string(),
    }
}

pub fn chapter_info(source_id: i64, path: &str, title: &str, language: &str) -> ChapterInfo {
    ChapterInfo {
        source_id,
        path: path.to_string(),
        title: title.to_string(),
        language: Some(language.to_string()),
    }
}
