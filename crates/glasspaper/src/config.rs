//! TOML settings file, merged underneath the CLI flags.
//!
//! ```toml
//! mode = "wallpaper"
//! width = 2560
//! height = 1440
//! fps = 60
//! seed = 12345
//! antialias = "4"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use renderer::Antialiasing;

use crate::cli::parse_antialias;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeSetting {
    Wallpaper,
    Window,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub mode: Option<ModeSetting>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub fps: Option<f32>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    antialias: Option<String>,
}

impl Settings {
    pub fn from_toml_str(raw: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads the supplied file, or the default location when `path` is
    /// `None`. A missing default file is not an error; a missing explicit
    /// file is.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let resolved = match path {
            Some(explicit) => explicit.to_path_buf(),
            None => match default_settings_path() {
                Some(default) if default.exists() => default,
                _ => return Ok(Settings::default()),
            },
        };

        let raw = fs::read_to_string(&resolved).map_err(|source| SettingsError::Io {
            path: resolved.clone(),
            source,
        })?;
        let settings = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %resolved.display(), "loaded settings");
        Ok(settings)
    }

    pub fn antialiasing(&self) -> Option<Antialiasing> {
        self.antialias
            .as_deref()
            .map(|raw| parse_antialias(raw).expect("validated at load time"))
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(width), Some(height)) => Some((width, height)),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if let Some(raw) = self.antialias.as_deref() {
            parse_antialias(raw).map_err(SettingsError::Invalid)?;
        }
        if let Some(fps) = self.fps {
            if !fps.is_finite() || fps < 0.0 {
                return Err(SettingsError::Invalid(format!(
                    "fps must be a non-negative number, got {fps}"
                )));
            }
        }
        if self.width == Some(0) || self.height == Some(0) {
            return Err(SettingsError::Invalid(
                "width and height must be greater than zero".to_string(),
            ));
        }
        if self.width.is_some() != self.height.is_some() {
            return Err(SettingsError::Invalid(
                "width and height must be set together".to_string(),
            ));
        }
        Ok(())
    }
}

/// `$XDG_CONFIG_HOME/glasspaper/config.toml` (or the platform equivalent).
pub fn default_settings_path() -> Option<PathBuf> {
    directories_next::ProjectDirs::from("", "", "glasspaper")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_a_full_settings_file() {
        let settings = Settings::from_toml_str(
            r#"
mode = "window"
width = 1280
height = 720
fps = 48
seed = 7
antialias = "8"
"#,
        )
        .unwrap();
        assert_eq!(settings.mode, Some(ModeSetting::Window));
        assert_eq!(settings.size(), Some((1280, 720)));
        assert_eq!(settings.fps, Some(48.0));
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.antialiasing(), Some(Antialiasing::Samples(8)));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings.mode, None);
        assert_eq!(settings.size(), None);
        assert_eq!(settings.antialiasing(), None);
    }

    #[test]
    fn rejects_invalid_antialias() {
        assert!(matches!(
            Settings::from_toml_str("antialias = \"3\""),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_negative_fps() {
        assert!(matches!(
            Settings::from_toml_str("fps = -1.0"),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_half_specified_size() {
        assert!(matches!(
            Settings::from_toml_str("width = 1280"),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            Settings::from_toml_str("shard_count = 24"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn loads_an_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "fps = 30").unwrap();
        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.fps, Some(30.0));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(matches!(
            Settings::load(Some(Path::new("/nonexistent/glasspaper.toml"))),
            Err(SettingsError::Io { .. })
        ));
    }
}
