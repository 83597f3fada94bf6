use std::env;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

pub(crate) const SETTINGS_FILE_NAME: &str = "settings.json";
pub(crate) const SINGLE_PLAYER_ENV_VAR: &str = "MINIJIM_SINGLE_PLAYER";
pub(crate) const LEVEL_ENV_VAR: &str = "MINIJIM_LEVEL";

/// Player-facing options from `assets/settings.json`. Every field is optional
/// in the file; unknown keys are rejected so typos surface.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) single_player: bool,
    /// 1-based.
    pub(crate) starting_level: u32,
    pub(crate) level_count: u32,
    pub(crate) editor_open_name: String,
    pub(crate) editor_save_name: String,
    pub(crate) new_map_width: i64,
    pub(crate) new_map_height: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            single_player: false,
            starting_level: 1,
            level_count: 3,
            editor_open_name: "level_1.lvl".to_string(),
            editor_save_name: "untitled.lvl".to_string(),
            new_map_width: 64,
            new_map_height: 48,
        }
    }
}

impl Settings {
    /// Missing or malformed files fall back to defaults with a log line; the
    /// game can always start without this file.
    pub(crate) fn load(path: &Path) -> Settings {
        let settings = match fs::read_to_string(path) {
            Ok(raw) => match parse_settings_json(&raw) {
                Ok(settings) => {
                    info!(path = %path.display(), "settings_loaded");
                    settings
                }
                Err(error) => {
                    warn!(path = %path.display(), error = %error, "settings_invalid_using_defaults");
                    Settings::default()
                }
            },
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "settings_missing_using_defaults");
                Settings::default()
            }
            Err(error) => {
                warn!(path = %path.display(), error = %error, "settings_unreadable_using_defaults");
                Settings::default()
            }
        };
        settings
            .with_overrides(
                env::var(SINGLE_PLAYER_ENV_VAR).ok().as_deref(),
                env::var(LEVEL_ENV_VAR).ok().as_deref(),
            )
            .normalized()
    }

    pub(crate) fn with_overrides(mut self, single_player: Option<&str>, level: Option<&str>) -> Self {
        if let Some(raw) = single_player {
            match parse_flag(raw) {
                Some(value) => self.single_player = value,
                None => warn!(env_var = SINGLE_PLAYER_ENV_VAR, value = raw, "invalid_env_override_ignored"),
            }
        }
        if let Some(raw) = level {
            match raw.trim().parse::<u32>() {
                Ok(value) => self.starting_level = value,
                Err(_) => warn!(env_var = LEVEL_ENV_VAR, value = raw, "invalid_env_override_ignored"),
            }
        }
        self
    }

    /// Keeps `starting_level` inside `1..=level_count`.
    pub(crate) fn normalized(mut self) -> Self {
        self.level_count = self.level_count.max(1);
        self.starting_level = self.starting_level.clamp(1, self.level_count);
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub(crate) fn parse_settings_json(raw: &str) -> Result<Settings, String> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, Settings>(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        let source = error.into_inner();
        if path.is_empty() || path == "." {
            format!("parse settings json: {source}")
        } else {
            format!("parse settings json at {path}: {source}")
        }
    })
}
