//! Plan generation: prompt construction, reply parsing, plan building and
//! the workflow that ties them to a model.

pub mod builder;
pub mod parser;
pub mod persist;
pub mod prompt;
pub mod workflow;

pub use builder::{DiagnosticKind, Plan, PlanDiagnostic, PlannedTask, Severity, build_plan};
pub use parser::{ParseIssue, ParsedReply, ParsedStep, StepField, dependency_refs, parse_reply};
pub use persist::{plan_file_path, save_plan};
pub use prompt::{build_prompt, render_agent_descriptions};
pub use workflow::{GenerateOptions, GeneratedPlan, PlanError, PlanningWorkflow};
