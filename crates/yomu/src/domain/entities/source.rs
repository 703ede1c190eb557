use serde::Deserialize;

/// Source id reserved for the local filesystem source. A series from this
/// source has no external metadata authority, so reloads keep the local
/// record and only reconcile chapters.
pub const LOCAL_SOURCE_ID: i64 = 1;

#[derive(Debug, Clone, Deserialize)]
pub struct SourceInfo {
    pub id: i64,
    pub name: String,
    pub url: String,
}

/// Series metadata as a content source reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesInfo {
    pub source_id: i64,
    pub path: String,
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub cover_url: String,
}

/// Chapter metadata as a content source reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct ChapterInfo {
    pub source_id: i64,
    pub path: String,
    pub title: String,
    #[serde(default)]
    pub language: Option<String>,
}
