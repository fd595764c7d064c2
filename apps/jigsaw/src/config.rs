use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use shared::domain::Durations;

pub const SETTINGS_FILE: &str = "jigsaw.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// JSON file path, or a `sqlite:` URL.
    pub classes_url: String,
    pub durations: Durations,
    pub tick: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            classes_url: "./classes.json".into(),
            durations: Durations::default(),
            tick: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    classes_url: Option<String>,
    dur_read: Option<u32>,
    dur_expert: Option<u32>,
    dur_stamm: Option<u32>,
    tick_millis: Option<u64>,
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the settings file if it parses, then the environment.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, file_cfg),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "ignoring unreadable settings file")
            }
        }
    }

    apply_env(&mut settings, env);
    settings
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.classes_url {
        settings.classes_url = v;
    }
    if let Some(v) = file_cfg.dur_read {
        settings.durations.read = v;
    }
    if let Some(v) = file_cfg.dur_expert {
        settings.durations.expert = v;
    }
    if let Some(v) = file_cfg.dur_stamm {
        settings.durations.stamm = v;
    }
    if let Some(v) = file_cfg.tick_millis {
        settings.tick = Duration::from_millis(v.max(1));
    }
}

fn apply_env(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("JIGSAW_CLASSES_URL") {
        settings.classes_url = v;
    }
    if let Some(v) = env("APP__CLASSES_URL") {
        settings.classes_url = v;
    }

    if let Some(v) = env("APP__DUR_READ").and_then(|v| v.trim().parse().ok()) {
        settings.durations.read = v;
    }
    if let Some(v) = env("APP__DUR_EXPERT").and_then(|v| v.trim().parse().ok()) {
        settings.durations.expert = v;
    }
    if let Some(v) = env("APP__DUR_STAMM").and_then(|v| v.trim().parse().ok()) {
        settings.durations.stamm = v;
    }

    if let Some(v) = env("APP__TICK_MILLIS").and_then(|v| v.trim().parse::<u64>().ok()) {
        settings.tick = Duration::from_millis(v.max(1));
    }
}

/// Turns a plain database path with a `.db`/`.sqlite` extension into a
/// `sqlite://` URL; JSON paths and existing URLs pass through.
pub fn normalize_classes_url(raw: &str) -> String {
    let raw = raw.trim();

    if raw.is_empty() {
        return Settings::default().classes_url;
    }

    if raw.starts_with("sqlite:") {
        return raw.replace('\\', "/");
    }

    let is_database = Path::new(raw)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "db" | "sqlite" | "sqlite3"));
    if is_database {
        return format!("sqlite://{}", raw.replace('\\', "/"));
    }

    raw.to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
