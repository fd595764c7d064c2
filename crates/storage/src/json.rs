use std::{
    io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use shared::domain::{
    ClassConfig, SavedClasses, DEFAULT_DUR_EXPERT, DEFAULT_DUR_READ, DEFAULT_DUR_STAMM,
};
use tracing::{debug, warn};

use crate::{ensure_parent_dir_exists, ClassStore};

/// Classes kept in one pretty-printed JSON object, class name → config.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ClassStore for JsonFileStore {
    async fn load(&self) -> Result<SavedClasses> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "class file missing, starting empty");
                return Ok(SavedClasses::new());
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read class file '{}'", self.path.display())
                })
            }
        };

        let value: Value = serde_json::from_str(&raw)
            .with_context(|| format!("class file '{}' is not valid JSON", self.path.display()))?;
        Ok(classes_from_value(value))
    }

    async fn save(&self, classes: &SavedClasses) -> Result<()> {
        ensure_parent_dir_exists(&self.path)?;

        // serde_json maps are key-sorted, so round-tripping through a Value
        // sorts the fields inside every entry as well.
        let value = serde_json::to_value(classes).context("failed to encode classes")?;
        let mut body = serde_json::to_string_pretty(&value).context("failed to encode classes")?;
        body.push('\n');

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, body)
            .await
            .with_context(|| format!("failed to write '{}'", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("failed to replace class file '{}'", self.path.display()))?;

        debug!(path = %self.path.display(), classes = classes.len(), "class file saved");
        Ok(())
    }
}

/// Lenient decoding of a class file: a non-object root yields no classes and
/// malformed entries are skipped rather than failing the whole load.
fn classes_from_value(value: Value) -> SavedClasses {
    let Value::Object(entries) = value else {
        warn!("class file root is not an object, ignoring its contents");
        return SavedClasses::new();
    };

    entries
        .into_iter()
        .filter_map(|(name, entry)| match entry {
            Value::Object(fields) => Some((name, class_from_fields(&fields))),
            _ => {
                warn!(class = %name, "skipping malformed class entry");
                None
            }
        })
        .collect()
}

fn class_from_fields(fields: &Map<String, Value>) -> ClassConfig {
    let durations = (
        minutes(fields.get("dur_read"), DEFAULT_DUR_READ),
        minutes(fields.get("dur_expert"), DEFAULT_DUR_EXPERT),
        minutes(fields.get("dur_stamm"), DEFAULT_DUR_STAMM),
    );
    // one unreadable duration resets all three
    let (dur_read, dur_expert, dur_stamm) = match durations {
        (Some(read), Some(expert), Some(stamm)) => (read, expert, stamm),
        _ => (
            i64::from(DEFAULT_DUR_READ),
            i64::from(DEFAULT_DUR_EXPERT),
            i64::from(DEFAULT_DUR_STAMM),
        ),
    };

    ClassConfig {
        students: text_list(fields.get("students")),
        topics: text_list(fields.get("topics")),
        dur_read: clamp_minutes(dur_read),
        dur_expert: clamp_minutes(dur_expert),
        dur_stamm: clamp_minutes(dur_stamm),
    }
}

fn text_list(value: Option<&Value>) -> Vec<String> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(text) => text.trim().to_string(),
            other => other.to_string(),
        })
        .filter(|text| !text.is_empty())
        .collect()
}

/// Missing means default; present but unreadable means `None`.
fn minutes(value: Option<&Value>, default: u32) -> Option<i64> {
    match value {
        None => Some(i64::from(default)),
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float.trunc() as i64)),
        Some(Value::String(text)) => text.trim().parse().ok(),
        Some(Value::Bool(flag)) => Some(i64::from(*flag)),
        Some(_) => None,
    }
}

fn clamp_minutes(minutes: i64) -> u32 {
    u32::try_from(minutes.max(1)).unwrap_or(u32::MAX)
}
