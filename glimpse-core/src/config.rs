use crate::error::{GlimpseError, Result};
use crate::layout::{DEFAULT_BREAKPOINT_PX, ViewportClass};
use crate::session::PlaybackTiming;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlimpseConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub viewer: ViewerConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_total_duration")]
    pub total_duration_ms: u64,
}

const fn default_tick_interval() -> u64 {
    50
}

const fn default_total_duration() -> u64 {
    5000
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            total_duration_ms: default_total_duration(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Width at which the conversation screen shows list and detail side by side
    #[serde(default = "default_breakpoint")]
    pub breakpoint_px: u32,
    /// Viewport width reported by the host
    #[serde(default = "default_width")]
    pub width_px: u32,
    #[serde(default = "default_true")]
    pub show_fills: bool,
}

const fn default_breakpoint() -> u32 {
    DEFAULT_BREAKPOINT_PX
}

const fn default_width() -> u32 {
    390
}

const fn default_true() -> bool {
    true
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            breakpoint_px: default_breakpoint(),
            width_px: default_width(),
            show_fills: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Optional JSON file of stories; the demo stories are used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to the cache directory
    #[serde(default)]
    pub enabled: bool,
}

impl GlimpseConfig {
    /// Get the configuration directory path (~/.config/glimpse/)
    #[must_use]
    pub fn config_dir() -> PathBuf {
        crate::paths::config_dir()
    }

    /// Get the config file path (~/.config/glimpse/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from the default location or create a template on first run
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` after writing the template, or an error if the
    /// file cannot be read, parsed or validated.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path())
    }

    /// [`GlimpseConfig::load_or_create`] against an explicit path.
    ///
    /// # Errors
    ///
    /// See [`GlimpseConfig::load_or_create`].
    pub fn load_or_create_at(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            // Create config directory if it doesn't exist
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::write(config_path, CONFIG_TEMPLATE)?;

            return Err(GlimpseError::ConfigNotFound {
                path: config_path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(config_path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigParseError` on TOML syntax errors and `ConfigInvalid`
    /// when a value is out of range.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigInvalid` describing the first offending field.
    pub fn validate(&self) -> Result<()> {
        self.playback_timing()?;
        if self.viewer.breakpoint_px == 0 {
            return Err(GlimpseError::ConfigInvalid {
                message: "viewer.breakpoint_px must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the `[playback]` values do not form a usable timing.
    pub fn playback_timing(&self) -> Result<PlaybackTiming> {
        PlaybackTiming::from_millis(
            self.playback.tick_interval_ms,
            self.playback.total_duration_ms,
        )
        .map_err(|e| GlimpseError::ConfigInvalid {
            message: format!("[playback] {e}"),
        })
    }

    #[must_use]
    pub const fn viewport(&self) -> ViewportClass {
        ViewportClass::from_width(self.viewer.width_px, self.viewer.breakpoint_px)
    }
}

pub const CONFIG_TEMPLATE: &str = r#"# Glimpse Configuration
# ~/.config/glimpse/config.toml

[playback]
# Each story advances by tick_interval_ms / total_duration_ms per tick
tick_interval_ms = 50
total_duration_ms = 5000

[viewer]
# Both conversation panes are shown at or above this width
breakpoint_px = 768
# Viewport width reported to the layout
width_px = 390
show_fills = true

[feed]
# Optional: JSON array of stories; the built-in demo stories are used when unset
# path = "/path/to/stories.json"

[logging]
# Also write logs to ~/.cache/glimpse/glimpse.log
enabled = false
"#;
