//! Application configuration model.
//!
//! # Responsibility
//! - Define the persisted settings shape shared with the UI shell.
//! - Validate settings before they are stored.
//!
//! # Invariants
//! - Missing optional sections deserialize to defaults.
//! - `git.save_path` stays relative to the repository root.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Component, Path};

/// Current config schema version.
pub const CONFIG_VERSION: u32 = 1;

/// How finalized records are committed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitMode {
    #[default]
    Direct,
    FeatureBranch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitConfig {
    pub repository_path: String,
    /// Directory for exported records, relative to `repository_path`.
    pub save_path: String,
    pub default_branch: String,
    pub commit_mode: CommitMode,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            repository_path: String::new(),
            save_path: "docs/runbooks".to_string(),
            default_branch: "main".to_string(),
            commit_mode: CommitMode::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorConfig {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShortcutsConfig {
    pub quick_input: String,
}

impl Default for ShortcutsConfig {
    fn default() -> Self {
        Self {
            quick_input: "CommandOrControl+J".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferencesConfig {
    pub launch_at_login: bool,
    pub show_in_menu_bar: bool,
    pub show_notifications: bool,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            launch_at_login: false,
            show_in_menu_bar: true,
            show_notifications: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofreadConfig {
    pub prompt: String,
}

/// Top-level application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub version: u32,
    pub git: GitConfig,
    /// Older configs stored author explicitly; newer shells may omit it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorConfig>,
    pub shortcuts: ShortcutsConfig,
    pub preferences: PreferencesConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proofread: Option<ProofreadConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            git: GitConfig::default(),
            author: None,
            shortcuts: ShortcutsConfig::default(),
            preferences: PreferencesConfig::default(),
            proofread: None,
        }
    }
}

impl Config {
    /// Validates settings that must hold before the config is persisted.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.git.repository_path.trim().is_empty() {
            return Err(ConfigValidationError::EmptyRepositoryPath);
        }

        let save_path = self.git.save_path.trim();
        if save_path.is_empty() {
            return Err(ConfigValidationError::EmptySavePath);
        }
        let path = Path::new(save_path);
        if path.is_absolute() || save_path.starts_with('/') || save_path.starts_with('\\') {
            return Err(ConfigValidationError::AbsoluteSavePath(save_path.to_string()));
        }
        if path
            .components()
            .any(|component| matches!(component, Component::ParentDir))
        {
            return Err(ConfigValidationError::SavePathEscapesRepository(
                save_path.to_string(),
            ));
        }

        if self.git.default_branch.trim().is_empty() {
            return Err(ConfigValidationError::EmptyDefaultBranch);
        }

        Ok(())
    }

    /// Author display name, when configured and non-blank.
    pub fn author_name(&self) -> Option<&str> {
        self.author
            .as_ref()
            .map(|author| author.name.trim())
            .filter(|name| !name.is_empty())
    }
}

/// Config validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    EmptyRepositoryPath,
    EmptySavePath,
    AbsoluteSavePath(String),
    SavePathEscapesRepository(String),
    EmptyDefaultBranch,
}

impl Display for ConfigValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRepositoryPath => write!(f, "repository path is empty"),
            Self::EmptySavePath => write!(f, "save path is empty"),
            Self::AbsoluteSavePath(value) => {
                write!(f, "save path must be relative to the repository: {value}")
            }
            Self::SavePathEscapesRepository(value) => {
                write!(f, "save path must stay inside the repository: {value}")
            }
            Self::EmptyDefaultBranch => write!(f, "default branch is empty"),
        }
    }
}

impl Error for ConfigValidationError {}
