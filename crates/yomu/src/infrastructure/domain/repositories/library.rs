use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::{
    domain::{
        entities::{chapter::Chapter, series::Series},
        repositories::library::{LibraryRepository, LibraryRepositoryError},
    },
    infrastructure::database::Pool,
};

#[derive(Clone)]
pub struct LibraryRepositoryImpl {
    pool: Pool,
}

impl LibraryRepositoryImpl {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn get_series_by_source_path(
        &self,
        source_id: i64,
        path: &str,
    ) -> Result<Series, LibraryRepositoryError> {
        let row = sqlx::query(r#"SELECT * FROM series WHERE source_id = ? AND path = ?"#)
            .bind(source_id)
            .bind(path)
            .fetch_one(&self.pool as &SqlitePool)
            .await?;

        Ok(map_series(&row))
    }
}

fn map_series(row: &SqliteRow) -> Series {
    Series {
        id: row.get(0),
        source_id: row.get(1),
        path: row.get(2),
        title: row.get(3),
        status: row.get(4),
        cover_url: row.get(5),
        categories: serde_json::from_str(row.get::<String, _>(6).as_str()).unwrap_or_default(),
        trackers: serde_json::from_str(row.get::<String, _>(7).as_str()).unwrap_or_default(),
        number_unread: row.get(8),
        preview: false,
        date_added: row.get(9),
    }
}

fn map_chapter(row: &SqliteRow) -> Chapter {
    Chapter {
        id: row.get(0),
        source_id: row.get(1),
        series_id: row.get(2),
        path: row.get(3),
        title: row.get(4),
        language: row.get(5),
        read: row.get(6),
        date_added: row.get(7),
    }
}

#[async_trait]
impl LibraryRepository for LibraryRepositoryImpl {
    async fn get_series_list(&self) -> Result<Vec<Series>, LibraryRepositoryError> {
        let series = sqlx::query(r#"SELECT * FROM series ORDER BY title"#)
            .fetch_all(&self.pool as &SqlitePool)
            .await?
            .iter()
            .map(map_series)
            .collect();

        Ok(series)
    }

    async fn get_series_by_id(&self, id: i64) -> Result<Series, LibraryRepositoryError> {
        let row = sqlx::query(r#"SELECT * FROM series WHERE id = ?"#)
            .bind(id)
            .fetch_optional(&self.pool as &SqlitePool)
            .await?
            .ok_or(LibraryRepositoryError::SeriesNotFound(id))?;

        Ok(map_series(&row))
    }

    async fn get_chapters_by_series_id(
        &self,
        series_id: i64,
    ) -> Result<Vec<Chapter>, LibraryRepositoryError> {
        let chapters = sqlx::query(r#"SELECT * FROM chapter WHERE series_id = ? ORDER BY id"#)
            .bind(series_id)
            .fetch_all(&self.pool as &SqlitePool)
            .await?
            .iter()
            .map(map_chapter)
            .collect();

        Ok(chapters)
    }

    async fn upsert_series(&self, series: &Series) -> Result<Series, LibraryRepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO series(
                source_id,
                path,
                title,
                status,
                cover_url,
                categories,
                trackers,
                number_unread,
                date_added
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(source_id, path)
            DO UPDATE SET
                title=excluded.title,
                status=excluded.status,
                cover_url=excluded.cover_url,
                categories=excluded.categories,
                trackers=excluded.trackers,
                number_unread=excluded.number_unread
        "#,
        )
        .bind(series.source_id)
        .bind(&series.path)
        .bind(&series.title)
        .bind(&series.status)
        .bind(&series.cover_url)
        .bind(serde_json::to_string(&series.categories).unwrap_or_else(|_| "[]".to_string()))
        .bind(serde_json::to_string(&series.trackers).unwrap_or_else(|_| "{}".to_string()))
        .bind(series.number_unread)
        .bind(series.date_added)
        .execute(&self.pool as &SqlitePool)
        .await?;

        self.get_series_by_source_path(series.source_id, &series.path)
            .await
    }

    async fn upsert_chapters(
        &self,
        chapters: &[Chapter],
        series_id: i64,
    ) -> Result<(), LibraryRepositoryError> {
        if chapters.is_empty() {
            return Ok(());
        }

        let mut values = vec![];
        values.resize(chapters.len(), "(?, ?, ?, ?, ?, ?, ?)");

        let query_str = format!(
            r#"INSERT INTO chapter(
            source_id,
            series_id,
            path,
            title,
            language,
            is_read,
            date_added
        ) VALUES {} ON CONFLICT(series_id, path) DO UPDATE SET
            source_id=excluded.source_id,
            title=excluded.title,
            language=excluded.language,
            is_read=excluded.is_read
        "#,
            values.join(",")
        );

        let mut query = sqlx::query(&query_str);
        for chapter in chapters {
            query = query
                .bind(chapter.source_id)
                .bind(series_id)
                .bind(&chapter.path)
                .bind(&chapter.title)
                .bind(&chapter.language)
                .bind(chapter.read)
                .bind(chapter.date_added);
        }

        query.execute(&self.pool as &SqlitePool).await?;

        Ok(())
    }

    async fn delete_series(&self, id: i64) -> Result<(), LibraryRepositoryError> {
        sqlx::query(r#"DELETE FROM chapter WHERE series_id = ?"#)
            .bind(id)
            .execute(&self.pool as &SqlitePool)
            .await?;

        sqlx::query(r#"DELETE FROM series WHERE id = ?"#)
            .bind(id)
            .execute(&self.pool as &SqlitePool)
            .await?;

        Ok(())
    }

    async fn delete_chapters(
        &self,
        ids: &[i64],
        series_id: i64,
    ) -> Result<(), LibraryRepositoryError> {
        if ids.is_empty() {
            return Ok(());
        }

        let query_str = format!(
            r#"DELETE FROM chapter WHERE series_id = ? AND id IN ({})"#,
            vec!["?"; ids.len()].join(",")
        );

        let mut query = sqlx::query(&query_str).bind(series_id);
        for id in ids {
            query = query.bind(id);
        }

        query.execute(&self.pool as &SqlitePool).await?;

        Ok(())
    }
}
