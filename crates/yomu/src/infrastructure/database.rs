use std::{ops::Deref, time::Duration};

use sqlx::{
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions},
};

#[derive(Clone)]
pub struct Pool(SqlitePool);

impl Deref for Pool {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Open the library database, creating and migrating it when asked. The pool
/// stays small: the import worker is the only sustained writer.
pub async fn establish_connection(
    database_path: &str,
    create: bool,
) -> Result<Pool, anyhow::Error> {
    let opts = SqliteConnectOptions::new()
        .filename(database_path)
        .create_if_missing(create)
        .journal_mode(SqliteJournalMode::Wal)
        // chapter rows cascade on series deletion
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect_with(opts)
        .await?;

    match sqlx::migrate!("./migrations").run(&pool).await {
        Err(MigrateError::VersionMismatch(version)) => {
            warn!("migration {version} was previously applied but has been modified")
        }
        Err(e) => {
            return Err(e.into());
        }
        _ => {}
    }

    Ok(Pool(pool))
}

#[cfg(test)]
mod test {
    use sqlx::Row;

    use super::*;

    #[tokio::test]
    async fn test_establish_connection_migrates_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db").display().to_string();

        let pool = establish_connection(&path, true).await.unwrap();

        let row = sqlx::query("SELECT COUNT(*) FROM series")
            .fetch_one(&pool as &SqlitePool)
            .await
            .unwrap();
        assert_eq!(row.get::<i64, _>(0), 0);

        let row = sqlx::query("PRAGMA foreign_keys")
            .fetch_one(&pool as &SqlitePool)
            .await
            .unwrap();
        assert_eq!(row.get::<i64, _>(0), 1);
    }
}
