use chrono::NaiveDateTime;

use super::source::ChapterInfo;

/// A single installment of a series. `path` is the identifier the content
/// source uses for the chapter and is unique within a series; `id` is
/// assigned on first persistence and carries through reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub id: i64,
    pub source_id: i64,
    pub series_id: i64,
    pub path: String,
    pub title: String,
    pub language: String,
    pub read: bool,
    pub date_added: NaiveDateTime,
}

impl Default for Chapter {
    fn default() -> Self {
        Self {
            id: 0,
            source_id: 0,
            series_id: 0,
            path: "".to_string(),
            title: "".to_string(),
            language: "".to_string(),
            read: false,
            date_added: NaiveDateTime::default(),
        }
    }
}

impl From<ChapterInfo> for Chapter {
    fn from(ch: ChapterInfo) -> Self {
        Self {
            id: 0,
            source_id: ch.source_id,
            series_id: 0,
            path: ch.path,
            title: ch.title,
            language: ch.language.unwrap_or_default(),
            read: false,
            date_added: chrono::Utc::now().naive_utc(),
        }
    }
}
