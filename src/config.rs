//! Configuration for the display daemon
//!
//! Read once at startup. Values come from built-in defaults, then an optional
//! YAML file, then CLI flags / environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

use crate::convert::BYTES_PER_PIXEL;
use crate::error::DisplayError;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Framebuffer device; absent or empty selects the image-file sink
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<PathBuf>,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Bold font file; absent uses the system fallbacks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<PathBuf>,
    /// Directory for images written by the file sink
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Metadata source (`-` for stdin)
    #[serde(default = "default_metadata")]
    pub metadata: String,
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub device: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub font: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub metadata: Option<String>,
}

impl DisplayConfig {
    /// Load configuration from a YAML file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: DisplayConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path))?;

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI/env values on top of this configuration
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(device) = overrides.device {
            self.device = Some(device);
        }
        if let Some(width) = overrides.width {
            self.width = width;
        }
        if let Some(height) = overrides.height {
            self.height = height;
        }
        if let Some(font) = overrides.font {
            self.font = Some(font);
        }
        if let Some(output_dir) = overrides.output_dir {
            self.output_dir = output_dir;
        }
        if let Some(metadata) = overrides.metadata {
            self.metadata = metadata;
        }
    }

    /// Device path, treating an empty or blank path as absent
    pub fn device_path(&self) -> Option<&std::path::Path> {
        self.device
            .as_deref()
            .filter(|p| !p.to_string_lossy().trim().is_empty())
    }

    /// Size of one device frame in bytes
    pub fn frame_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(BYTES_PER_PIXEL)
    }

    /// Validate configuration for correctness
    pub fn validate(&self) -> std::result::Result<(), DisplayError> {
        if self.width == 0 || self.height == 0 {
            return Err(DisplayError::Configuration(format!(
                "display size must be non-zero (got {}x{})",
                self.width, self.height
            )));
        }
        if self.frame_len().is_none() {
            return Err(DisplayError::Configuration(format!(
                "display size {}x{} is too large",
                self.width, self.height
            )));
        }
        if self.metadata.trim().is_empty() {
            return Err(DisplayError::Configuration(
                "metadata source cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            device: None,
            width: default_width(),
            height: default_height(),
            font: None,
            output_dir: default_output_dir(),
            metadata: default_metadata(),
        }
    }
}

// Default value functions
fn default_width() -> u32 { 320 }
fn default_height() -> u32 { 240 }
fn default_output_dir() -> PathBuf { PathBuf::from(".") }
fn default_metadata() -> String { "-".to_string() }

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_yaml() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("display.yaml");

        std::fs::write(
            &config_path,
            r#"
device: /dev/fb1
width: 480
metadata: /tmp/metadata-pipe
"#,
        )?;

        let config = DisplayConfig::load(&config_path.to_string_lossy()).await?;
        assert_eq!(config.device_path(), Some(Path::new("/dev/fb1")));
        assert_eq!(config.width, 480);
        assert_eq!(config.height, 240);
        assert_eq!(config.metadata, "/tmp/metadata-pipe");
        assert_eq!(config.output_dir, PathBuf::from("."));

        Ok(())
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_size() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("display.yaml");
        std::fs::write(&config_path, "width: 0\n")?;

        assert!(DisplayConfig::load(&config_path.to_string_lossy()).await.is_err());
        Ok(())
    }

    #[test]
    fn test_overrides_win() {
        let mut config = DisplayConfig {
            device: Some(PathBuf::from("/dev/fb0")),
            ..DisplayConfig::default()
        };
        config.apply_overrides(ConfigOverrides {
            height: Some(480),
            output_dir: Some(PathBuf::from("/tmp")),
            ..ConfigOverrides::default()
        });

        assert_eq!(config.device_path(), Some(Path::new("/dev/fb0")));
        assert_eq!(config.width, 320);
        assert_eq!(config.height, 480);
        assert_eq!(config.output_dir, PathBuf::from("/tmp"));
    }

    #[test]
    fn test_blank_device_is_absent() {
        let config = DisplayConfig {
            device: Some(PathBuf::from("  ")),
            ..DisplayConfig::default()
        };
        assert_eq!(config.device_path(), None);
    }

    #[test]
    fn test_validate() {
        assert!(DisplayConfig::default().validate().is_ok());
        assert_eq!(DisplayConfig::default().frame_len(), Some(320 * 240 * 4));

        let empty_source = DisplayConfig {
            metadata: " ".to_string(),
            ..DisplayConfig::default()
        };
        assert!(matches!(
            empty_source.validate(),
            Err(DisplayError::Configuration(_))
        ));
    }
}
