//! # Shell Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOREFRONT_SIGN_IN_PATH=/account/login                             │
//! │     STOREFRONT_FETCH_TIMEOUT_MS=5000                                   │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/storefront/storefront.toml (Linux)                       │
//! │     ~/Library/Application Support/com.storefront.shell/... (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     /login, /, ?redirect=, 10 s fetch timeout, light theme             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # storefront.toml
//! [routing]
//! sign_in_path = "/login"
//! landing_path = "/"
//! return_param = "redirect"
//! max_redirects = 4
//!
//! [loader]
//! fetch_timeout_ms = 10000
//!
//! [theme]
//! default = "light"
//!
//! [notifications]
//! position = "top-right"
//! auto_close_ms = 5000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use storefront_core::validation::validate_redirect_path;
use storefront_core::{RedirectTargets, LANDING_PATH, MAX_REDIRECTS, RETURN_PARAM, SIGN_IN_PATH};
use tracing::{debug, info, warn};

use crate::error::{ShellError, ShellResult};
use crate::notify::{NotificationConfig, ToastPosition};
use crate::theme::Theme;

/// Upper bound for a single view fetch.
const MAX_FETCH_TIMEOUT_MS: u64 = 600_000;

// =============================================================================
// Routing Settings
// =============================================================================

/// Global redirect behaviour. Applies to every route alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingSettings {
    /// Where Private routes send anonymous viewers.
    #[serde(default = "default_sign_in_path")]
    pub sign_in_path: String,

    /// Where AuthOnly routes send signed-in viewers.
    #[serde(default = "default_landing_path")]
    pub landing_path: String,

    /// Query parameter carrying the return target.
    #[serde(default = "default_return_param")]
    pub return_param: String,

    /// Longest redirect chain followed for one navigation.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_sign_in_path() -> String {
    SIGN_IN_PATH.to_string()
}

fn default_landing_path() -> String {
    LANDING_PATH.to_string()
}

fn default_return_param() -> String {
    RETURN_PARAM.to_string()
}

fn default_max_redirects() -> usize {
    MAX_REDIRECTS
}

impl Default for RoutingSettings {
    fn default() -> Self {
        RoutingSettings {
            sign_in_path: default_sign_in_path(),
            landing_path: default_landing_path(),
            return_param: default_return_param(),
            max_redirects: default_max_redirects(),
        }
    }
}

// =============================================================================
// Loader & Theme Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderSettings {
    /// A fetch still pending after this long fails with `TimedOut`.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_ms: u64,
}

fn default_fetch_timeout() -> u64 {
    10_000
}

impl Default for LoaderSettings {
    fn default() -> Self {
        LoaderSettings {
            fetch_timeout_ms: default_fetch_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSettings {
    #[serde(default)]
    pub default: Theme,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete shell configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub routing: RoutingSettings,

    #[serde(default)]
    pub loader: LoaderSettings,

    #[serde(default)]
    pub theme: ThemeSettings,

    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl StorefrontConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`storefront.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ShellResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> ShellResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> ShellResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ShellResult<()> {
        validate_redirect_path(&self.routing.sign_in_path)
            .map_err(|e| ShellError::InvalidConfig(format!("routing.sign_in_path: {}", e)))?;
        validate_redirect_path(&self.routing.landing_path)
            .map_err(|e| ShellError::InvalidConfig(format!("routing.landing_path: {}", e)))?;

        if self.routing.sign_in_path == self.routing.landing_path {
            return Err(ShellError::InvalidConfig(
                "routing.sign_in_path and routing.landing_path must differ".into(),
            ));
        }

        let param = &self.routing.return_param;
        if param.is_empty()
            || !param
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ShellError::InvalidConfig(format!(
                "routing.return_param '{}' must be a non-empty identifier",
                param
            )));
        }

        if self.routing.max_redirects == 0 {
            return Err(ShellError::InvalidConfig(
                "routing.max_redirects must be greater than 0".into(),
            ));
        }

        if self.loader.fetch_timeout_ms == 0 || self.loader.fetch_timeout_ms > MAX_FETCH_TIMEOUT_MS
        {
            return Err(ShellError::InvalidConfig(format!(
                "loader.fetch_timeout_ms must be between 1 and {}",
                MAX_FETCH_TIMEOUT_MS
            )));
        }

        Ok(())
    }

    /// Applies `STOREFRONT_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("STOREFRONT_SIGN_IN_PATH") {
            debug!(path = %path, "Overriding sign-in path from environment");
            self.routing.sign_in_path = path;
        }

        if let Some(path) = lookup("STOREFRONT_LANDING_PATH") {
            debug!(path = %path, "Overriding landing path from environment");
            self.routing.landing_path = path;
        }

        if let Some(timeout) = lookup("STOREFRONT_FETCH_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(ms) => self.loader.fetch_timeout_ms = ms,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric fetch timeout"),
            }
        }

        if let Some(theme) = lookup("STOREFRONT_THEME") {
            match theme.parse::<Theme>() {
                Ok(parsed) => self.theme.default = parsed,
                Err(e) => warn!(error = %e, "Ignoring theme from environment"),
            }
        }

        if let Some(position) = lookup("STOREFRONT_TOAST_POSITION") {
            match position.parse::<ToastPosition>() {
                Ok(parsed) => self.notifications.position = parsed,
                Err(e) => warn!(error = %e, "Ignoring toast position from environment"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "storefront", "shell")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn redirect_targets(&self) -> RedirectTargets {
        RedirectTargets {
            sign_in: self.routing.sign_in_path.clone(),
            landing: self.routing.landing_path.clone(),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.loader.fetch_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = StorefrontConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.redirect_targets(), RedirectTargets::default());
        assert_eq!(config.routing.return_param, "redirect");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.theme.default, Theme::Light);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = StorefrontConfig::from_toml_str(
            r#"
            [routing]
            sign_in_path = "/account/login"

            [theme]
            default = "dark"
            "#,
        )
        .unwrap();

        assert_eq!(config.routing.sign_in_path, "/account/login");
        assert_eq!(config.routing.landing_path, "/");
        assert_eq!(config.loader.fetch_timeout_ms, 10_000);
        assert_eq!(config.theme.default, Theme::Dark);
        assert!(config.notifications.newest_on_top);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let err = StorefrontConfig::from_toml_str("[routing\nsign_in_path = 1").unwrap_err();
        assert!(matches!(err, ShellError::ConfigLoadFailed(_)));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_config_validation() {
        let mut config = StorefrontConfig::default();

        config.routing.sign_in_path = "login".into();
        assert!(config.validate().is_err());

        config.routing.sign_in_path = "/".into();
        assert!(config.validate().is_err());

        config.routing.sign_in_path = "/login".into();
        config.routing.return_param = "next page".into();
        assert!(config.validate().is_err());

        config.routing.return_param = "next".into();
        config.loader.fetch_timeout_ms = 0;
        assert!(config.validate().is_err());

        config.loader.fetch_timeout_ms = 500;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("STOREFRONT_SIGN_IN_PATH", "/signin"),
            ("STOREFRONT_FETCH_TIMEOUT_MS", "2500"),
            ("STOREFRONT_THEME", "dark"),
            ("STOREFRONT_TOAST_POSITION", "bottom-center"),
        ]
        .into_iter()
        .collect();

        let mut config = StorefrontConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.routing.sign_in_path, "/signin");
        assert_eq!(config.loader.fetch_timeout_ms, 2500);
        assert_eq!(config.theme.default, Theme::Dark);
        assert_eq!(config.notifications.position, ToastPosition::BottomCenter);
    }

    #[test]
    fn test_bad_override_is_ignored() {
        let mut config = StorefrontConfig::default();
        config.apply_overrides(|key| {
            (key == "STOREFRONT_FETCH_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert_eq!(config.loader.fetch_timeout_ms, 10_000);
    }

    #[test]
    fn test_toml_serialization() {
        let config = StorefrontConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[routing]"));
        assert!(toml_str.contains("[loader]"));
    }
}
