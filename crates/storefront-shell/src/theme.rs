//! Theme scope.
//!
//! Holds the active light/dark preference for views to read. Computing
//! visual styles from it is the views' business, not the shell's.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Light or dark presentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}

/// Shared theme state. Clones share the same preference.
#[derive(Debug, Clone, Default)]
pub struct ThemeScope {
    current: Arc<Mutex<Theme>>,
}

impl ThemeScope {
    pub fn new(initial: Theme) -> Self {
        ThemeScope {
            current: Arc::new(Mutex::new(initial)),
        }
    }

    pub fn current(&self) -> Theme {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, theme: Theme) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = theme;
        debug!(%theme, "Theme changed");
    }

    /// Flips between light and dark, returning the new theme.
    pub fn toggle(&self) -> Theme {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = current.toggled();
        debug!(theme = %*current, "Theme toggled");
        *current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_theme() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(" Light ".parse::<Theme>().unwrap(), Theme::Light);
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn test_toggle_is_shared() {
        let scope = ThemeScope::new(Theme::Light);
        let other = scope.clone();

        assert_eq!(other.toggle(), Theme::Dark);
        assert_eq!(scope.current(), Theme::Dark);

        scope.set(Theme::Light);
        assert_eq!(other.current(), Theme::Light);
    }
}
