//! Sequential, model-backed executor.
//!
//! Each task becomes one prompt naming the bound agent, the task, its
//! expected output and the results selected by the [`ContextType`]. A
//! failing model call is retried up to `max_retries` times before the
//! whole run fails.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::model::Model;
use crate::plan::{Plan, PlannedTask};

use super::{ContextType, Executor, StepOutcome};

/// Runs tasks in plan order through a single model.
pub struct SequentialExecutor<'a> {
    model: &'a dyn Model,
    model_id: String,
    max_retries: u32,
}

impl<'a> SequentialExecutor<'a> {
    /// `max_retries` is the total number of attempts per task; zero is
    /// treated as one.
    pub fn new(model: &'a dyn Model, model_id: impl Into<String>, max_retries: u32) -> Self {
        Self {
            model,
            model_id: model_id.into(),
            max_retries: max_retries.max(1),
        }
    }
}

/// Build the prompt for one task.
pub fn build_step_prompt(task: &PlannedTask, context: &[(usize, &PlannedTask, &str)]) -> String {
    let mut prompt = String::with_capacity(512);
    prompt.push_str(&format!(
        "You are {}. {}\n\n",
        task.agent.name, task.agent.description
    ));
    prompt.push_str("## Task\n\n");
    prompt.push_str(&task.description);
    prompt.push_str("\n\n");

    if !task.expected_output.is_empty() {
        prompt.push_str("## Expected Output\n\n");
        prompt.push_str(&task.expected_output);
        prompt.push_str("\n\n");
    }

    if !context.is_empty() {
        prompt.push_str("## Results From Earlier Steps\n");
        for (index, earlier, output) in context {
            prompt.push_str(&format!(
                "\n### Step {}: {}\n{}\n",
                index + 1,
                earlier.description,
                output.trim_end()
            ));
        }
        prompt.push('\n');
    }

    prompt
}

#[async_trait]
impl Executor for SequentialExecutor<'_> {
    async fn execute(&self, plan: &Plan, context_type: ContextType) -> Result<Vec<StepOutcome>> {
        let mut outcomes: Vec<StepOutcome> = Vec::with_capacity(plan.len());

        for (index, task) in plan.tasks.iter().enumerate() {
            let prompt = {
                let context: Vec<(usize, &PlannedTask, &str)> = context_type
                    .select(plan, index)
                    .into_iter()
                    .filter_map(|i| {
                        let earlier = plan.tasks.get(i)?;
                        let outcome = outcomes.get(i)?;
                        Some((i, earlier, outcome.output.as_str()))
                    })
                    .collect();
                build_step_prompt(task, &context)
            };

            let mut attempts = 0;
            let output = loop {
                attempts += 1;
                match self.model.generate(&prompt, &self.model_id).await {
                    Ok(output) => break output,
                    Err(e) if attempts < self.max_retries => {
                        warn!(
                            task = index + 1,
                            attempt = attempts,
                            error = %e,
                            "model call failed, retrying"
                        );
                    }
                    Err(e) => {
                        return Err(anyhow!(
                            "task {} ({}) failed after {attempts} attempt(s): {e:#}",
                            index + 1,
                            task.agent.name
                        ));
                    }
                }
            };

            info!(task = index + 1, agent = %task.agent.name, attempts, "task completed");
            outcomes.push(StepOutcome {
                task: index,
                agent: task.agent.name.clone(),
                output,
                attempts,
            });
        }

        Ok(outcomes)
    }
}
