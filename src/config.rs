use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sink configuration consumed once at logger construction.
///
/// The zero value enables nothing: a logger built from `Config::default()`
/// discards every message. Level and formatter strings are resolved when the
/// logger is constructed (unrecognized level → `INFO`, unrecognized
/// formatter → text); changing a `Config` afterwards requires constructing a
/// new logger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub console: ConsoleConfig,
    pub file: FileConfig,
    /// Include the call site (`file:line`) in emitted records.
    pub add_source: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub level: String,
    pub formatter: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub name: String,
    pub level: String,
    pub formatter: String,
    pub rotation: RotationConfig,
}

/// Rotation policy for the file sink. Zero `max_size_mb` disables size
/// rotation, zero `max_age_days` keeps every backup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub max_size_mb: u64,
    pub max_age_days: u64,
    pub compress: bool,
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }

    pub fn with_console(mut self, enabled: bool) -> Config {
        self.console.enabled = enabled;
        self
    }

    pub fn with_console_level(mut self, level: impl Into<String>) -> Config {
        self.console.level = level.into();
        self
    }

    pub fn with_console_formatter(mut self, formatter: impl Into<String>) -> Config {
        self.console.formatter = formatter.into();
        self
    }

    pub fn with_file(
        mut self,
        enabled: bool,
        path: impl Into<PathBuf>,
        name: impl Into<String>,
    ) -> Config {
        self.file.enabled = enabled;
        self.file.path = path.into();
        self.file.name = name.into();
        self
    }

    pub fn with_file_level(mut self, level: impl Into<String>) -> Config {
        self.file.level = level.into();
        self
    }

    pub fn with_file_formatter(mut self, formatter: impl Into<String>) -> Config {
        self.file.formatter = formatter.into();
        self
    }

    pub fn with_file_rotation(
        mut self,
        max_size_mb: u64,
        max_age_days: u64,
        compress: bool,
    ) -> Config {
        self.file.rotation = RotationConfig { max_size_mb, max_age_days, compress };
        self
    }

    pub fn with_add_source(mut self, enabled: bool) -> Config {
        self.add_source = enabled;
        self
    }
}
