//! Saved class rosters, keyed by class name.
//!
//! The session core only ever sees [`ClassStore::load`] and
//! [`ClassStore::save`] of the whole mapping; [`ClassCatalog`] layers the
//! per-class edits on top.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use shared::domain::SavedClasses;

mod catalog;
mod json;
mod sqlite;

pub use catalog::ClassCatalog;
pub use json::JsonFileStore;
pub use sqlite::SqliteClassStore;

#[async_trait]
pub trait ClassStore: Send + Sync {
    async fn load(&self) -> Result<SavedClasses>;
    async fn save(&self, classes: &SavedClasses) -> Result<()>;
}

#[async_trait]
impl<T: ClassStore + ?Sized> ClassStore for Box<T> {
    async fn load(&self) -> Result<SavedClasses> {
        (**self).load().await
    }

    async fn save(&self, classes: &SavedClasses) -> Result<()> {
        (**self).save(classes).await
    }
}

/// Opens the store behind `url`: `sqlite:` URLs go to SQLite, anything else
/// is the path of a JSON file.
pub async fn open_store(url: &str) -> Result<Box<dyn ClassStore>> {
    let url = url.trim();
    if url.starts_with("sqlite:") {
        let store = SqliteClassStore::new(url)
            .await
            .with_context(|| format!("failed to open class database '{url}'"))?;
        Ok(Box::new(store))
    } else {
        Ok(Box::new(JsonFileStore::new(url)))
    }
}

pub(crate) fn ensure_parent_dir_exists(path: &Path) -> Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for '{}'",
            parent.display(),
            path.display()
        )
    })
}

pub(crate) fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
