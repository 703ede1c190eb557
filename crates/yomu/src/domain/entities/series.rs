use std::collections::HashMap;

use chrono::NaiveDateTime;

use super::source::SeriesInfo;

/// A logical work tracked by the library. `id` is 0 until the series is first
/// persisted and stable afterwards; `(source_id, path)` identifies it at the
/// content source across re-syncs.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub id: i64,
    pub source_id: i64,
    pub path: String,
    pub title: String,
    pub status: Option<String>,
    pub cover_url: String,
    pub categories: Vec<String>,
    pub trackers: HashMap<String, String>,
    pub number_unread: i64,
    /// Ephemeral instance shown before an import decision, never persisted.
    pub preview: bool,
    pub date_added: NaiveDateTime,
}

impl Default for Series {
    fn default() -> Self {
        Self {
            id: 0,
            source_id: 0,
            path: "".to_string(),
            title: "".to_string(),
            status: None,
            cover_url: "".to_string(),
            categories: vec![],
            trackers: HashMap::new(),
            number_unread: 0,
            preview: false,
            date_added: NaiveDateTime::default(),
        }
    }
}

impl From<SeriesInfo> for Series {
    fn from(s: SeriesInfo) -> Self {
        Self {
            id: 0,
            source_id: s.source_id,
            path: s.path,
            title: s.title,
            status: s.status,
            cover_url: s.cover_url,
            categories: vec![],
            trackers: HashMap::new(),
            number_unread: 0,
            preview: false,
            date_added: NaiveDateTime::default(),
        }
    }
}
