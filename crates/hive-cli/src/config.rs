//! Configuration file management for hive.
//!
//! Provides a TOML-based config file at `~/.config/hive/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use hive_core::executor::ContextType;
use hive_core::model::CommandModel;
use hive_core::plan::PlanningWorkflow;

/// Model identifier used when nothing else is configured.
pub const DEFAULT_MODEL_ID: &str = "sonnet";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub model: ModelSection,
    pub planner: PlannerSection,
    pub scenarios: ScenarioSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    /// Model identifier passed to the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Program that answers prompts on stdin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Arguments for `command`; `{model}` is replaced by the model id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextType>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recursive: Option<bool>,
}

impl ConfigFile {
    /// A config file with every setting spelled out at its default.
    pub fn with_defaults() -> Self {
        Self {
            model: ModelSection {
                id: Some(DEFAULT_MODEL_ID.to_string()),
                command: Some(CommandModel::DEFAULT_PROGRAM.to_string()),
                args: Some(CommandModel::default_args()),
            },
            planner: PlannerSection {
                max_retries: Some(PlanningWorkflow::DEFAULT_MAX_RETRIES),
                context: Some(ContextType::default()),
            },
            scenarios: ScenarioSection {
                recursive: Some(false),
            },
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the hive config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/hive` or `~/.config/hive`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("hive");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("hive")
}

/// Return the path to the hive config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns `Ok(None)` if it does not exist.
pub fn load_config() -> Result<Option<ConfigFile>> {
    let path = config_path();
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(Some(config))
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    Ok(path)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiveConfig {
    pub model_id: String,
    pub command: String,
    pub args: Vec<String>,
    pub max_retries: u32,
    pub context: ContextType,
    pub recursive: bool,
}

impl HiveConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Model id: `cli_model_id` > `HIVE_MODEL_ID` env > `model.id` > [`DEFAULT_MODEL_ID`]
    /// - Command: `HIVE_MODEL_COMMAND` env > `model.command` > `claude`
    /// - Everything else: config file > default
    pub fn resolve(cli_model_id: Option<&str>) -> Result<Self> {
        let file = load_config()?.unwrap_or_default();
        Ok(Self::from_file(file, cli_model_id))
    }

    fn from_file(file: ConfigFile, cli_model_id: Option<&str>) -> Self {
        let model_id = if let Some(id) = cli_model_id {
            id.to_string()
        } else if let Ok(id) = std::env::var("HIVE_MODEL_ID") {
            id
        } else {
            file.model
                .id
                .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string())
        };

        let command = std::env::var("HIVE_MODEL_COMMAND")
            .ok()
            .or(file.model.command)
            .unwrap_or_else(|| CommandModel::DEFAULT_PROGRAM.to_string());

        Self {
            model_id,
            command,
            args: file.model.args.unwrap_or_else(CommandModel::default_args),
            max_retries: file
                .planner
                .max_retries
                .unwrap_or(PlanningWorkflow::DEFAULT_MAX_RETRIES),
            context: file.planner.context.unwrap_or_default(),
            recursive: file.scenarios.recursive.unwrap_or(false),
        }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
