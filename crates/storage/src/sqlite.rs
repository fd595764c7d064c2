use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use shared::domain::{ClassConfig, SavedClasses};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use tracing::debug;

use crate::{ensure_parent_dir_exists, sqlite_path, ClassStore};

/// Classes kept in a SQLite table, one row per class with its config as JSON.
#[derive(Clone)]
pub struct SqliteClassStore {
    pool: Pool<Sqlite>,
}

impl SqliteClassStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        if let Some(path) = sqlite_path(database_url) {
            ensure_parent_dir_exists(&path)?;
        }

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // a single long-lived connection keeps `sqlite::memory:` databases alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_options)
            .await?;

        let store = Self { pool };
        store.ensure_classes_table().await?;
        Ok(store)
    }

    async fn ensure_classes_table(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS classes (
                name        TEXT PRIMARY KEY NOT NULL,
                config_json TEXT NOT NULL,
                updated_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure classes table exists")?;
        Ok(())
    }
}

#[async_trait]
impl ClassStore for SqliteClassStore {
    async fn load(&self) -> Result<SavedClasses> {
        let rows = sqlx::query("SELECT name, config_json FROM classes ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("failed to read classes")?;

        let mut classes = SavedClasses::new();
        for row in rows {
            let name: String = row.try_get("name")?;
            let config_json: String = row.try_get("config_json")?;
            let config: ClassConfig = serde_json::from_str(&config_json)
                .with_context(|| format!("stored config for class '{name}' is corrupt"))?;
            classes.insert(name, config);
        }
        Ok(classes)
    }

    /// Replaces every stored class in one transaction.
    async fn save(&self, classes: &SavedClasses) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM classes")
            .execute(&mut *tx)
            .await
            .context("failed to clear classes")?;

        for (name, config) in classes {
            let config_json = serde_json::to_string(config)?;
            sqlx::query("INSERT INTO classes (name, config_json) VALUES (?1, ?2)")
                .bind(name.as_str())
                .bind(config_json)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("failed to store class '{name}'"))?;
        }

        tx.commit().await.context("failed to commit classes")?;
        debug!(classes = classes.len(), "classes saved to sqlite");
        Ok(())
    }
}
