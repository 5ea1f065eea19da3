use std::time::Duration;

use serde::{Deserialize, Serialize};

use webdeck_core::focus::GridMode;

/// Data-driven configuration for the shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Delay before a held direction starts repeating (ms).
    pub repeat_initial_delay_ms: u64,
    /// Interval between synthesized repeats once started (ms).
    pub repeat_interval_ms: u64,
    /// Body navigation style for the launcher grid.
    pub grid_mode: GridMode,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            repeat_initial_delay_ms: 300,
            repeat_interval_ms: 120,
            grid_mode: GridMode::Grid,
        }
    }
}

impl ShellConfig {
    /// Load config from environment or TOML file, falling back to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("WEBDECK_SHELL_CONFIG")
            && let Ok(contents) = std::fs::read_to_string(&path)
        {
            match toml::from_str(&contents) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("Failed to parse {path}: {e}, using defaults"),
            }
        }
        if let Ok(contents) = std::fs::read_to_string("config/shell.toml")
            && let Ok(config) = toml::from_str::<Self>(&contents)
        {
            return config;
        }
        Self::default()
    }

    pub fn repeat_initial_delay(&self) -> Duration {
        Duration::from_millis(self.repeat_initial_delay_ms)
    }

    pub fn repeat_interval(&self) -> Duration {
        Duration::from_millis(self.repeat_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_shell() {
        let config = ShellConfig::default();
        assert_eq!(config.repeat_initial_delay(), Duration::from_millis(300));
        assert_eq!(config.repeat_interval(), Duration::from_millis(120));
        assert_eq!(config.grid_mode, GridMode::Grid);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: ShellConfig =
            toml::from_str("repeat_interval_ms = 90\ngrid_mode = \"carousel\"").unwrap();
        assert_eq!(config.repeat_interval_ms, 90);
        assert_eq!(config.repeat_initial_delay_ms, 300);
        assert_eq!(config.grid_mode, GridMode::Carousel);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = ShellConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: ShellConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.repeat_interval_ms, config.repeat_interval_ms);
        assert_eq!(parsed.grid_mode, config.grid_mode);
    }
}
