//! Agent roster types.
//!
//! An [`Agent`] is supplied by whoever hosts the planner and is never
//! modified here. A [`GoalTask`] pairs the goal text with the agents
//! allowed to work on it. Rosters are authored as TOML:
//!
//! ```toml
//! [[agents]]
//! name = "IoTAgent"
//! description = "Retrieves sites, assets and sensor data."
//! task_examples = ["List all sites"]
//! tools = ["sites", "history"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named capability provider that can be bound to a planned task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Agent {
    /// Name the model must echo back in `#Agent<n>` lines.
    pub name: String,
    /// Free-text description of what the agent is good at.
    pub description: String,
    /// Example requests this agent has handled well.
    #[serde(default)]
    pub task_examples: Vec<String>,
    /// Identifiers of the tools available to the agent.
    #[serde(default)]
    pub tools: Vec<String>,
}

impl Agent {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            task_examples: Vec::new(),
            tools: Vec::new(),
        }
    }

    pub fn with_task_examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.task_examples = examples.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }
}

/// The single goal handed to a planning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalTask {
    /// Natural-language description of what should be achieved.
    pub description: String,
    /// Agents the planner may assign sub-tasks to.
    pub agents: Vec<Agent>,
}

impl GoalTask {
    pub fn new(description: impl Into<String>, agents: Vec<Agent>) -> Self {
        Self {
            description: description.into(),
            agents,
        }
    }
}

/// Errors from loading an agent roster file.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read roster file {path:?}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse roster file {path:?}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("roster file {path:?} defines no agents")]
    Empty { path: String },
}

#[derive(Debug, Deserialize)]
struct RosterFile {
    #[serde(default)]
    agents: Vec<Agent>,
}

/// Parse a roster from TOML text. An empty `agents` list is allowed here;
/// the planner decides whether that is acceptable.
pub fn parse_roster(content: &str) -> Result<Vec<Agent>, toml::de::Error> {
    let file: RosterFile = toml::from_str(content)?;
    Ok(file.agents)
}

/// Load a roster TOML file, rejecting files that define no agents.
pub fn load_roster(path: &Path) -> Result<Vec<Agent>, RosterError> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| RosterError::Read {
        path: display.clone(),
        source,
    })?;
    let agents = parse_roster(&content).map_err(|source| RosterError::Parse {
        path: display.clone(),
        source,
    })?;
    if agents.is_empty() {
        return Err(RosterError::Empty { path: display });
    }
    Ok(agents)
}
