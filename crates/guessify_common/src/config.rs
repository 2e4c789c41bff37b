//! Guessify configuration.
//!
//! Config file: $GUESSIFY_CONFIG, ~/.config/guessify/config.toml or
//! /etc/guessify/config.toml. Every field has a default, so an empty file
//! (or no file at all) is valid.

use crate::classifier::ModelConfig;
use crate::questions::QuestionBook;
use crate::selector::SelectorConfig;
use crate::turn::{StopPolicy, TurnController};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the catalog lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/celebrities.csv")
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuessifyConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub selector: SelectorConfig,

    /// Question limits
    #[serde(default)]
    pub game: StopPolicy,

    /// Per-attribute question text overrides
    #[serde(default)]
    pub questions: HashMap<String, String>,
}

impl GuessifyConfig {
    /// Get default user config path: ~/.config/guessify/config.toml
    pub fn user_config_path() -> Result<PathBuf> {
        let config_dir = match std::env::var("XDG_CONFIG_HOME") {
            Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
            _ => {
                let home = std::env::var("HOME").context("Cannot determine home directory")?;
                Path::new(&home).join(".config")
            }
        };
        Ok(config_dir.join("guessify").join("config.toml"))
    }

    /// Get system config path: /etc/guessify/config.toml
    pub fn system_config_path() -> PathBuf {
        PathBuf::from("/etc/guessify/config.toml")
    }

    /// Load configuration
    ///
    /// Priority:
    /// 1. $GUESSIFY_CONFIG
    /// 2. User config (~/.config/guessify/config.toml)
    /// 3. System config (/etc/guessify/config.toml)
    /// 4. Defaults
    pub fn load() -> Result<Self> {
        if let Ok(explicit) = std::env::var("GUESSIFY_CONFIG") {
            return Self::load_from(Path::new(&explicit));
        }

        if let Ok(user_path) = Self::user_config_path() {
            if user_path.exists() {
                return Self::load_from(&user_path);
            }
        }

        let system_path = Self::system_config_path();
        if system_path.exists() {
            return Self::load_from(&system_path);
        }

        Ok(Self::default())
    }

    /// Load and validate a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: GuessifyConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.game.min_questions > self.game.max_questions {
            anyhow::bail!(
                "game.min_questions ({}) exceeds game.max_questions ({})",
                self.game.min_questions,
                self.game.max_questions
            );
        }
        if self.selector.early_pool == 0 || self.selector.late_pool == 0 {
            anyhow::bail!("selector pool sizes must be at least 1");
        }
        if !(0.0..1.0).contains(&self.selector.importance_threshold) {
            anyhow::bail!(
                "selector.importance_threshold must be in [0, 1), got {}",
                self.selector.importance_threshold
            );
        }
        Ok(())
    }

    /// Turn controller built from this config
    pub fn turn_controller(&self) -> TurnController {
        TurnController::new(
            self.game.clone(),
            self.selector.clone(),
            QuestionBook::with_overrides(&self.questions),
        )
    }
}
