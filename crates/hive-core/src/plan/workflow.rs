//! The planning workflow: one goal in, one model call, one plan out.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::agent::GoalTask;
use crate::executor::{ContextType, Executor, StepOutcome};
use crate::model::Model;

use super::builder::{Plan, Severity, build_plan};
use super::parser::parse_reply;
use super::persist::save_plan;
use super::prompt::{build_prompt, render_agent_descriptions};

/// Errors from setting up or running a planning workflow.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("planning supports exactly one task, got {0}")]
    TaskCount(usize),

    #[error("task must have at least one agent")]
    NoAgents,

    #[error("model {model_id:?} failed to generate a plan: {source:#}")]
    Model {
        model_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to save plan to {path:?}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("generated plan is invalid:\n  {}", .errors.join("\n  "))]
    InvalidPlan { errors: Vec<String> },

    #[error("plan execution failed: {0:#}")]
    Execution(#[source] anyhow::Error),
}

/// Per-call knobs for [`PlanningWorkflow::generate_steps`].
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Write the goal and raw reply to this path (`.txt` is appended when
    /// missing).
    pub save_plan: Option<PathBuf>,
}

/// Result of one generation call.
#[derive(Debug, Clone)]
pub struct GeneratedPlan {
    pub plan: Plan,
    /// The model's reply, unmodified.
    pub reply: String,
    /// Where the audit copy was written, if requested.
    pub saved_to: Option<PathBuf>,
}

/// Decomposes a single goal task into a [`Plan`] using a language model.
#[derive(Debug, Clone)]
pub struct PlanningWorkflow {
    task: GoalTask,
    model_id: String,
    max_retries: u32,
}

impl PlanningWorkflow {
    /// Retry budget handed to executors unless overridden.
    pub const DEFAULT_MAX_RETRIES: u32 = 5;

    /// Create a workflow for exactly one goal task with at least one agent.
    ///
    /// Shape errors are reported here, before any model is contacted.
    pub fn new(tasks: Vec<GoalTask>, model_id: impl Into<String>) -> Result<Self, PlanError> {
        let task = match <[GoalTask; 1]>::try_from(tasks) {
            Ok([task]) => task,
            Err(tasks) => return Err(PlanError::TaskCount(tasks.len())),
        };
        if task.agents.is_empty() {
            return Err(PlanError::NoAgents);
        }
        Ok(Self {
            task,
            model_id: model_id.into(),
            max_retries: Self::DEFAULT_MAX_RETRIES,
        })
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn task(&self) -> &GoalTask {
        &self.task
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// The prompt [`Self::generate_steps`] would send.
    pub fn render_prompt(&self) -> String {
        let agents = render_agent_descriptions(&self.task.agents);
        build_prompt(&self.task.description, &agents)
    }

    /// Ask `model` for a plan and parse its reply.
    ///
    /// A reply with no recognisable steps yields an empty plan, not an
    /// error. Problems in individual steps are attached to the plan as
    /// diagnostics.
    pub async fn generate_steps(
        &self,
        model: &dyn Model,
        options: &GenerateOptions,
    ) -> Result<GeneratedPlan, PlanError> {
        let prompt = self.render_prompt();
        info!(
            model = model.name(),
            model_id = %self.model_id,
            agents = self.task.agents.len(),
            "requesting plan"
        );
        debug!(%prompt, "plan generation prompt");

        let reply = model
            .generate(&prompt, &self.model_id)
            .await
            .map_err(|source| PlanError::Model {
                model_id: self.model_id.clone(),
                source,
            })?;
        debug!(%reply, "plan generation reply");

        let saved_to = match &options.save_plan {
            Some(path) => Some(save_plan(path, &self.task.description, &reply).map_err(
                |source| PlanError::Persist {
                    path: path.clone(),
                    source,
                },
            )?),
            None => None,
        };

        let plan = build_plan(&parse_reply(&reply), &self.task.agents);
        info!(
            tasks = plan.len(),
            diagnostics = plan.diagnostics.len(),
            "plan generated"
        );

        Ok(GeneratedPlan {
            plan,
            reply,
            saved_to,
        })
    }

    /// Generate a plan and hand it to `executor`.
    ///
    /// A plan carrying error diagnostics is refused with
    /// [`PlanError::InvalidPlan`] and never reaches the executor.
    pub async fn run(
        &self,
        model: &dyn Model,
        executor: &dyn Executor,
        context_type: ContextType,
    ) -> Result<Vec<StepOutcome>, PlanError> {
        let generated = self
            .generate_steps(model, &GenerateOptions::default())
            .await?;
        self.execute_plan(&generated.plan, executor, context_type)
            .await
    }

    /// Hand an already generated plan to `executor`, refusing it with
    /// [`PlanError::InvalidPlan`] when it carries error diagnostics.
    pub async fn execute_plan(
        &self,
        plan: &Plan,
        executor: &dyn Executor,
        context_type: ContextType,
    ) -> Result<Vec<StepOutcome>, PlanError> {
        if plan.has_errors() {
            return Err(PlanError::InvalidPlan {
                errors: plan
                    .diagnostics
                    .iter()
                    .filter(|d| d.severity == Severity::Error)
                    .map(ToString::to_string)
                    .collect(),
            });
        }

        info!(tasks = plan.len(), context = %context_type, "executing plan");
        executor
            .execute(plan, context_type)
            .await
            .map_err(PlanError::Execution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::model::ReplayModel;
    use tempfile::TempDir;

    fn goal() -> GoalTask {
        GoalTask::new(
            "Which sensors matter for chiller fouling?",
            vec![
                Agent::new("IoTAgent", "sensor data"),
                Agent::new("FMSRAgent", "failure modes"),
            ],
        )
    }

    #[test]
    fn rejects_zero_tasks() {
        let err = PlanningWorkflow::new(vec![], "m").unwrap_err();
        assert!(matches!(err, PlanError::TaskCount(0)), "got: {err}");
    }

    #[test]
    fn rejects_two_tasks() {
        let err = PlanningWorkflow::new(vec![goal(), goal()], "m").unwrap_err();
        assert!(matches!(err, PlanError::TaskCount(2)), "got: {err}");
    }

    #[test]
    fn rejects_task_without_agents() {
        let err = PlanningWorkflow::new(vec![GoalTask::new("g", vec![])], "m").unwrap_err();
        assert!(matches!(err, PlanError::NoAgents), "got: {err}");
    }

    #[test]
    fn defaults_and_overrides() {
        let wf = PlanningWorkflow::new(vec![goal()], "granite").unwrap();
        assert_eq!(wf.model_id(), "granite");
        assert_eq!(wf.max_retries(), PlanningWorkflow::DEFAULT_MAX_RETRIES);
        assert_eq!(wf.with_max_retries(2).max_retries(), 2);
    }

    #[test]
    fn prompt_mentions_goal_and_agents() {
        let wf = PlanningWorkflow::new(vec![goal()], "m").unwrap();
        let prompt = wf.render_prompt();
        assert!(prompt.contains("chiller fouling"));
        assert!(prompt.contains("Name: FMSRAgent"));
    }

    #[tokio::test]
    async fn garbage_reply_gives_empty_plan() {
        let wf = PlanningWorkflow::new(vec![goal()], "m").unwrap();
        let generated = wf
            .generate_steps(&ReplayModel::new("no plan here"), &GenerateOptions::default())
            .await
            .unwrap();
        assert!(generated.plan.is_empty());
        assert!(generated.saved_to.is_none());
        assert_eq!(generated.reply, "no plan here");
    }

    #[tokio::test]
    async fn save_plan_option_writes_audit_file() {
        let dir = TempDir::new().unwrap();
        let wf = PlanningWorkflow::new(vec![goal()], "m").unwrap();
        let options = GenerateOptions {
            save_plan: Some(dir.path().join("audit")),
        };
        let generated = wf
            .generate_steps(&ReplayModel::new("#Task1: a\n#Agent1: IoTAgent\n"), &options)
            .await
            .unwrap();
        let saved = generated.saved_to.expect("should be saved");
        assert_eq!(saved, dir.path().join("audit.txt"));
        let content = std::fs::read_to_string(saved).unwrap();
        assert!(content.starts_with("Question: Which sensors matter"));
        assert!(content.ends_with("#Task1: a\n#Agent1: IoTAgent\n"));
    }

    #[tokio::test]
    async fn save_failure_is_reported() {
        let wf = PlanningWorkflow::new(vec![goal()], "m").unwrap();
        let options = GenerateOptions {
            save_plan: Some(PathBuf::from("/nonexistent/dir/audit")),
        };
        let err = wf
            .generate_steps(&ReplayModel::new("#Task1: a\n#Agent1: IoTAgent\n"), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, PlanError::Persist { .. }), "got: {err}");
    }

    #[test]
    fn invalid_plan_message_lists_errors() {
        let err = PlanError::InvalidPlan {
            errors: vec!["first".to_string(), "second".to_string()],
        };
        assert_eq!(err.to_string(), "generated plan is invalid:\n  first\n  second");
    }
}
