// File: src/config.rs
// Purpose: Configuration parsing from trailhead.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// Application-level settings handed to every request context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_name")]
    pub name: String,

    /// Directory views are loaded from (default: "views")
    #[serde(default = "default_views_root")]
    pub views_root: String,

    /// Layout view wrapped around rendered views; empty disables layouts
    #[serde(default)]
    pub layout: String,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// One of error, warn, info, debug, trace
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values
fn default_name() -> String {
    "trailhead-app".to_string()
}

fn default_views_root() -> String {
    "views".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_cookie_name() -> String {
    "trailhead.session".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// Default implementations
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            views_root: default_views_root(),
            layout: String::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist or is empty, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from default path (./trailhead.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("trailhead.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.app.views_root, "views");
        assert!(config.app.layout.is_empty());
        assert_eq!(config.session.cookie_name, "trailhead.session");
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_empty_config() {
        let config = toml::from_str::<Config>("").unwrap_or_default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.app.name, "trailhead-app");
    }

    #[test]
    fn test_partial_sections() {
        let toml = r#"
            [app]
            views_root = "templates"
            layout = "layout"

            [log]
            level = "debug"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.app.views_root, "templates");
        assert_eq!(config.app.layout, "layout");
        assert_eq!(config.app.name, "trailhead-app");
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load("definitely/not/here.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }
}
