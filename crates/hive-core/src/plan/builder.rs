//! Turns parsed steps into a [`Plan`] bound to a concrete agent roster.
//!
//! Every context entry of a [`PlannedTask`] is the index of a task that
//! precedes it in the same plan. A reference that would break this (zero,
//! self, forward or past the end) is dropped and reported as an
//! error-severity [`PlanDiagnostic`] on the step that made it.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::agent::Agent;

use super::parser::{ParseIssue, ParsedReply, ParsedStep, dependency_refs};

/// A generated sub-task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedTask {
    pub description: String,
    pub expected_output: String,
    /// The one agent responsible for this task.
    pub agent: Agent,
    /// Indices of earlier tasks in the plan whose results this task needs.
    pub context: Vec<usize>,
}

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The plan is usable; something was substituted or skipped.
    Warning,
    /// The plan does not reflect what the model asked for.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// What a diagnostic is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The reply could not be parsed cleanly.
    Parse(ParseIssue),
    /// The named agent is not in the roster; `fallback` was bound instead.
    UnknownAgent { requested: String, fallback: String },
    /// `#S<reference>` does not name an earlier task. `available` is how
    /// many tasks had been built at that point.
    DependencyOutOfRange { reference: usize, available: usize },
    /// Dependency text was neither `None` nor contained any `#S<n>`.
    UnreadableDependency { text: String },
}

/// A problem attached to a plan, optionally to one of its tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanDiagnostic {
    /// 1-based position of the task in the plan, when it applies to one.
    pub task: Option<usize>,
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl fmt::Display for PlanDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(task) = self.task {
            write!(f, " (task {task})")?;
        }
        match &self.kind {
            DiagnosticKind::Parse(issue) => write!(f, ": {issue}"),
            DiagnosticKind::UnknownAgent {
                requested,
                fallback,
            } => write!(f, ": unknown agent {requested:?}, using {fallback:?}"),
            DiagnosticKind::DependencyOutOfRange {
                reference,
                available,
            } => {
                if *reference == usize::MAX {
                    write!(f, ": dependency reference is too large")
                } else {
                    write!(
                        f,
                        ": dependency #S{reference} does not refer to one of the {available} earlier task(s)"
                    )
                }
            }
            DiagnosticKind::UnreadableDependency { text } => {
                write!(f, ": dependency {text:?} has no #S<n> reference, treated as none")
            }
        }
    }
}

/// An ordered list of dependent sub-tasks generated from one goal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub tasks: Vec<PlannedTask>,
    pub diagnostics: Vec<PlanDiagnostic>,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Whether any diagnostic has [`Severity::Error`].
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// The tasks that `index` depends on, in reference order.
    pub fn context_of(&self, index: usize) -> impl Iterator<Item = &PlannedTask> + '_ {
        self.tasks
            .get(index)
            .map(|t| t.context.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|&i| self.tasks.get(i))
    }
}

/// Build a plan from a parsed reply.
///
/// `roster` must not be empty; the workflow guarantees this before any
/// model call. With an empty roster every step is skipped.
pub fn build_plan(reply: &ParsedReply, roster: &[Agent]) -> Plan {
    let mut plan = Plan {
        tasks: Vec::with_capacity(reply.steps.len()),
        diagnostics: reply
            .issues
            .iter()
            .cloned()
            .map(|issue| PlanDiagnostic {
                task: None,
                severity: Severity::Warning,
                kind: DiagnosticKind::Parse(issue),
            })
            .collect(),
    };

    let Some(default_agent) = roster.first() else {
        return plan;
    };

    for step in &reply.steps {
        let position = plan.tasks.len() + 1;
        let agent = resolve_agent(step, roster, default_agent, position, &mut plan.diagnostics);
        let context = resolve_context(step, plan.tasks.len(), position, &mut plan.diagnostics);

        plan.tasks.push(PlannedTask {
            description: step.description.clone(),
            expected_output: step.expected_output.clone(),
            agent: agent.clone(),
            context,
        });
    }

    plan
}

fn resolve_agent<'a>(
    step: &ParsedStep,
    roster: &'a [Agent],
    default_agent: &'a Agent,
    position: usize,
    diagnostics: &mut Vec<PlanDiagnostic>,
) -> &'a Agent {
    if let Some(agent) = roster.iter().find(|a| a.name == step.agent) {
        return agent;
    }

    warn!(
        task = position,
        requested = %step.agent,
        fallback = %default_agent.name,
        "model named an unknown agent, falling back to the first roster agent"
    );
    diagnostics.push(PlanDiagnostic {
        task: Some(position),
        severity: Severity::Warning,
        kind: DiagnosticKind::UnknownAgent {
            requested: step.agent.clone(),
            fallback: default_agent.name.clone(),
        },
    });
    default_agent
}

fn resolve_context(
    step: &ParsedStep,
    built: usize,
    position: usize,
    diagnostics: &mut Vec<PlanDiagnostic>,
) -> Vec<usize> {
    let Some(refs) = dependency_refs(&step.dependency) else {
        return Vec::new();
    };

    if refs.is_empty() {
        diagnostics.push(PlanDiagnostic {
            task: Some(position),
            severity: Severity::Warning,
            kind: DiagnosticKind::UnreadableDependency {
                text: step.dependency.clone(),
            },
        });
        return Vec::new();
    }

    let mut context = Vec::with_capacity(refs.len());
    for reference in refs {
        if (1..=built).contains(&reference) {
            context.push(reference - 1);
        } else {
            warn!(
                task = position,
                reference,
                available = built,
                "dropping dependency on a task that does not precede this one"
            );
            diagnostics.push(PlanDiagnostic {
                task: Some(position),
                severity: Severity::Error,
                kind: DiagnosticKind::DependencyOutOfRange {
                    reference,
                    available: built,
                },
            });
        }
    }
    context
}
