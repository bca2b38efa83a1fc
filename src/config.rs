//! Configuration file handling for snapgif.
//!
//! Loads configuration from `~/.config/snapgif/config.toml` or a custom
//! path. Every field is optional: command-line flags win over file values,
//! and file values win over built-in defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration file structure for snapgif.
/// Loaded from ~/.config/snapgif/config.toml (or custom path via --config).
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub recording: RecordingConfig,
    #[serde(default)]
    pub encoder: EncoderConfigFile,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct RecordingConfig {
    pub fps: Option<u32>,
    pub threads: Option<usize>,
    pub strict_fps: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct EncoderConfigFile {
    pub repeat: Option<i32>,
    pub sample: Option<u32>,
    pub global_color_table: Option<bool>,
    /// Transparent color as an RRGGBB hex string
    pub transparent: Option<String>,
    pub disposal: Option<u8>,
}

#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    /// Resolution as a WIDTHxHEIGHT string
    pub resolution: Option<String>,
    /// Directory GIFs are written into when no explicit output path is given
    pub directory: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("snapgif/config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/snapgif/config.toml")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/snapgif.toml"))).unwrap();
        assert!(config.recording.fps.is_none());
        assert!(config.output.resolution.is_none());
    }

    #[test]
    fn test_load_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[recording]
fps = 30
threads = 4
strict_fps = 2.5

[encoder]
repeat = -1
sample = 5
global_color_table = true
transparent = "00ff00"
disposal = 2

[output]
resolution = "640x480"
directory = "/tmp/gifs"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.recording.fps, Some(30));
        assert_eq!(config.recording.threads, Some(4));
        assert_eq!(config.recording.strict_fps, Some(2.5));
        assert_eq!(config.encoder.repeat, Some(-1));
        assert_eq!(config.encoder.sample, Some(5));
        assert_eq!(config.encoder.global_color_table, Some(true));
        assert_eq!(config.encoder.transparent.as_deref(), Some("00ff00"));
        assert_eq!(config.encoder.disposal, Some(2));
        assert_eq!(config.output.resolution.as_deref(), Some("640x480"));
        assert_eq!(config.output.directory, Some(PathBuf::from("/tmp/gifs")));
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[recording]\nfps = 12\n").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.recording.fps, Some(12));
        assert!(config.recording.threads.is_none());
        assert!(config.encoder.repeat.is_none());
    }

    #[test]
    fn test_load_malformed_file_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[recording\nfps = ").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_default_path_ends_with_config_toml() {
        let path = default_path();
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }
}
