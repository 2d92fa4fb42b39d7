//! Execution boundary for generated plans.
//!
//! A plan is handed to an [`Executor`] together with a [`ContextType`]
//! that decides which earlier results each task gets to see.
//! [`SequentialExecutor`] is the built-in implementation: it runs tasks
//! one after another through a [`crate::model::Model`].

pub mod sequential;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::plan::Plan;

pub use sequential::SequentialExecutor;

/// Which earlier results a task receives as context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextType {
    /// No earlier results.
    None,
    /// Only the results of the tasks listed in the task's own context.
    #[default]
    Selected,
    /// Every earlier result.
    All,
}

impl ContextType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Selected => "selected",
            Self::All => "all",
        }
    }

    /// Indices of the earlier tasks whose results `index` should see.
    pub fn select(self, plan: &Plan, index: usize) -> Vec<usize> {
        match self {
            Self::None => Vec::new(),
            Self::Selected => plan
                .tasks
                .get(index)
                .map(|t| t.context.clone())
                .unwrap_or_default(),
            Self::All => (0..index.min(plan.len())).collect(),
        }
    }
}

impl fmt::Display for ContextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "selected" => Ok(Self::Selected),
            "all" => Ok(Self::All),
            other => Err(format!(
                "invalid context type {other:?} (expected none, selected, or all)"
            )),
        }
    }
}

/// The result of running one planned task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// 0-based index of the task in the plan.
    pub task: usize,
    /// Name of the agent that ran it.
    pub agent: String,
    pub output: String,
    /// Model calls made, including the successful one.
    pub attempts: u32,
}

/// Runs a plan's tasks and reports their results in plan order.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, plan: &Plan, context_type: ContextType) -> Result<Vec<StepOutcome>>;
}

// Compile-time assertion: Executor must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Executor) {}
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::plan::PlannedTask;

    fn plan() -> Plan {
        let task = |context: Vec<usize>| PlannedTask {
            description: "t".to_string(),
            expected_output: String::new(),
            agent: Agent::new("a", "b"),
            context,
        };
        Plan {
            tasks: vec![task(vec![]), task(vec![0]), task(vec![0])],
            diagnostics: vec![],
        }
    }

    #[test]
    fn parse_and_display_roundtrip() {
        for ct in [ContextType::None, ContextType::Selected, ContextType::All] {
            assert_eq!(ct.to_string().parse::<ContextType>().unwrap(), ct);
        }
        assert!("every".parse::<ContextType>().is_err());
    }

    #[test]
    fn default_is_selected() {
        assert_eq!(ContextType::default(), ContextType::Selected);
    }

    #[test]
    fn selection_per_mode() {
        let plan = plan();
        assert!(ContextType::None.select(&plan, 2).is_empty());
        assert_eq!(ContextType::Selected.select(&plan, 2), vec![0]);
        assert_eq!(ContextType::All.select(&plan, 2), vec![0, 1]);
        assert!(ContextType::All.select(&plan, 0).is_empty());
    }
}
