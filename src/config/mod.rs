//! Configuration management for the input panel
//!
//! This module handles loading, parsing, and validating configuration
//! from TOML files: slide animation parameters, layer diagnostics and
//! general settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main configuration struct containing all input panel settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct InputPanelConfig {
    /// Slide-in animation used whenever a panel surface is revealed
    #[serde(default)]
    pub slide: SlideConfig,

    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SlideConfig {
    /// Run the slide animation on reveal
    pub enabled: bool,

    /// Slide duration (milliseconds)
    pub duration: u32,

    /// Animation curve ("linear", "ease", "ease-in", "ease-out", "ease-in-out")
    pub curve: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable debug logging
    pub debug: bool,
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration: Self::default_duration(),
            curve: "ease-out".to_string(),
        }
    }
}

impl SlideConfig {
    fn default_duration() -> u32 {
        250
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { debug: false }
    }
}

impl InputPanelConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Expand ~ to home directory
        let expanded_path = if path.to_string_lossy().starts_with('~') {
            let home = std::env::var("HOME").context("Failed to get HOME environment variable")?;
            Path::new(&home).join(path.strip_prefix("~").unwrap_or(path))
        } else {
            path.to_path_buf()
        };

        let contents = fs::read_to_string(&expanded_path)
            .with_context(|| format!("Failed to read config file: {}", expanded_path.display()))?;

        let config: InputPanelConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", expanded_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let valid_curves = ["linear", "ease", "ease-in", "ease-out", "ease-in-out"];
        if !valid_curves.contains(&self.slide.curve.as_str()) {
            anyhow::bail!("Invalid slide curve: {}", self.slide.curve);
        }

        if self.slide.enabled && self.slide.duration == 0 {
            anyhow::bail!("Invalid slide duration: must be greater than 0 when enabled");
        }

        if self.slide.duration > 10_000 {
            anyhow::bail!("Invalid slide duration: must be at most 10000 ms");
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, contents).context("Failed to write configuration file")?;

        Ok(())
    }

    /// Merge a partial configuration into this one.
    /// Sections of `partial` that differ from the defaults override this config.
    pub fn merge_partial(mut self, partial: InputPanelConfig) -> Self {
        let default_config = InputPanelConfig::default();

        if partial.slide != default_config.slide {
            self.slide = partial.slide;
        }
        if partial.general != default_config.general {
            self.general = partial.general;
        }

        self
    }
}
