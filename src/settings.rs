// settings.rs
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the JSON settings file.
pub const CONFIG_ENV: &str = "CONQUERDIA_CONFIG";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default = "default_map_directory")]
    pub map_directory: PathBuf,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_map_directory() -> PathBuf {
    PathBuf::from("maps")
}
fn default_log_filter() -> String {
    "info".to_string()
}
fn default_channel_capacity() -> usize {
    100
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            map_directory: default_map_directory(),
            log_filter: default_log_filter(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Settings {
    /// Settings from the file named by `CONQUERDIA_CONFIG`, defaults when the
    /// variable is unset.
    pub fn from_env() -> Result<Self, String> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        Self::from_json_str(&content, path)
    }

    pub fn from_json_str(content: &str, source_path: &Path) -> Result<Self, String> {
        let settings: Settings = serde_json::from_str(content)
            .map_err(|e| format!("{}: {}", source_path.display(), e))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if self.map_directory.as_os_str().is_empty() {
            errors.push("map_directory must not be empty. Example: \"map_directory\": \"maps\"".to_string());
        }
        if self.log_filter.trim().is_empty() {
            errors.push("log_filter must not be empty. Example: \"log_filter\": \"info\"".to_string());
        }
        if self.channel_capacity == 0 {
            errors.push("channel_capacity must be > 0. Example: \"channel_capacity\": 100".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }
}
