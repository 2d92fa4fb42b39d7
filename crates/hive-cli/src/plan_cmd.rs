//! Handlers for `hive prompt` and `hive plan`.
//!
//! Implements:
//! - `hive prompt <goal> --agents <roster>` -- print the planning prompt
//! - `hive plan <goal> --agents <roster>`   -- generate, print and optionally run a plan

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;

use hive_core::agent::{GoalTask, load_roster};
use hive_core::executor::{ContextType, SequentialExecutor, StepOutcome};
use hive_core::model::{CommandModel, Model, ReplayModel};
use hive_core::plan::{GenerateOptions, GeneratedPlan, Plan, PlanningWorkflow};

use crate::config::HiveConfig;

/// Options for `hive plan`, after config resolution.
#[derive(Debug)]
pub struct PlanOptions {
    pub goal: String,
    pub agents: PathBuf,
    pub reply_file: Option<PathBuf>,
    pub save_plan: Option<PathBuf>,
    pub json: bool,
    pub run: bool,
    pub context: Option<ContextType>,
}

fn build_workflow(goal: &str, agents: &Path, config: &HiveConfig) -> Result<PlanningWorkflow> {
    let roster = load_roster(agents)?;
    let workflow = PlanningWorkflow::new(vec![GoalTask::new(goal, roster)], &config.model_id)?
        .with_max_retries(config.max_retries);
    Ok(workflow)
}

/// Pick the model backend: a captured reply when one is supplied,
/// otherwise the configured command.
fn select_model(config: &HiveConfig, reply_file: Option<&Path>) -> Result<Box<dyn Model>> {
    let model: Box<dyn Model> = match reply_file {
        Some(path) => Box::new(ReplayModel::from_file(path)?),
        None => Box::new(CommandModel::new(&config.command, config.args.clone())),
    };
    info!(backend = model.name(), "selected model backend");
    Ok(model)
}

// -----------------------------------------------------------------------
// hive prompt
// -----------------------------------------------------------------------

pub fn run_prompt(goal: &str, agents: &Path, config: &HiveConfig) -> Result<()> {
    let workflow = build_workflow(goal, agents, config)?;
    print!("{}", workflow.render_prompt());
    Ok(())
}

// -----------------------------------------------------------------------
// hive plan
// -----------------------------------------------------------------------

pub async fn run_plan(options: PlanOptions, config: &HiveConfig) -> Result<()> {
    let workflow = build_workflow(&options.goal, &options.agents, config)?;
    let model = select_model(config, options.reply_file.as_deref())?;
    let model = model.as_ref();

    let generate_options = GenerateOptions {
        save_plan: options.save_plan.clone(),
    };
    let generated = workflow.generate_steps(model, &generate_options).await?;

    let outcomes = if options.run {
        let context = options.context.unwrap_or(config.context);
        let executor = SequentialExecutor::new(model, workflow.model_id(), workflow.max_retries());
        let outcomes = workflow
            .execute_plan(&generated.plan, &executor, context)
            .await?;
        info!(tasks = outcomes.len(), "plan executed");
        Some(outcomes)
    } else {
        None
    };

    if options.json {
        let value = json!({
            "plan": generated.plan,
            "saved_to": generated.saved_to,
            "outcomes": outcomes,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&value).context("failed to serialize plan")?
        );
    } else {
        print_plan(&generated);
        if let Some(outcomes) = &outcomes {
            print_outcomes(&generated.plan, outcomes);
        }
    }

    Ok(())
}

fn print_plan(generated: &GeneratedPlan) {
    let plan = &generated.plan;
    if plan.is_empty() {
        println!("No tasks found in the model reply.");
    } else {
        println!("Plan: {} task(s)", plan.len());
        for (i, task) in plan.tasks.iter().enumerate() {
            println!();
            println!("  {}. [{}] {}", i + 1, task.agent.name, task.description);
            if task.context.is_empty() {
                println!("     Depends on: none");
            } else {
                let refs: Vec<String> = task.context.iter().map(|c| format!("#S{}", c + 1)).collect();
                println!("     Depends on: {}", refs.join(", "));
            }
            if !task.expected_output.is_empty() {
                println!("     Expected:   {}", task.expected_output);
            }
        }
    }

    if !plan.diagnostics.is_empty() {
        println!();
        println!("Diagnostics:");
        for d in &plan.diagnostics {
            println!("  - {d}");
        }
    }

    if let Some(path) = &generated.saved_to {
        println!();
        println!("Plan saved to {}", path.display());
    }
}

fn print_outcomes(plan: &Plan, outcomes: &[StepOutcome]) {
    println!();
    println!("Results:");
    for outcome in outcomes {
        let description = plan
            .tasks
            .get(outcome.task)
            .map(|t| t.description.as_str())
            .unwrap_or_default();
        println!();
        println!(
            "  {}. [{}] {} ({} attempt(s))",
            outcome.task + 1,
            outcome.agent,
            description,
            outcome.attempts
        );
        for line in outcome.output.lines() {
            println!("     {line}");
        }
    }
}
