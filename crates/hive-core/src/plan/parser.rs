//! Model reply parser.
//!
//! Extracts step records from the free-form reply to the planning prompt.
//! Recognised labels are `#Task2: ...`, `#Agent2: ...`,
//! `#Dependency2: ...` and `#ExpectedOutput2: ...`. A label's value runs to
//! the next label or the end of the line, so several labels may share one
//! line. The fields sharing a step number form one record, which is
//! validated on its own:
//!
//! - A step without a task description or without an agent is dropped and
//!   reported, so one malformed step never hides the steps after it.
//! - A missing dependency line means `None`; a missing expected output is
//!   the empty string.
//! - Repeated lines for the same step keep the first value and are
//!   reported.
//!
//! Text that contains no recognised lines parses to zero steps.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Matches a step label such as `#Agent3:`; the value follows it.
static STEP_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#(Task|Agent|Dependency|ExpectedOutput)(\d+)\s*:")
        .expect("step label pattern is valid")
});

/// Matches a `#S<n>` reference inside dependency text.
static STEP_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#S(\d+)").expect("step reference pattern is valid"));

/// Dependency text meaning "no earlier step is needed".
pub const NO_DEPENDENCY: &str = "None";

/// The four labelled fields of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepField {
    Task,
    Agent,
    Dependency,
    ExpectedOutput,
}

impl StepField {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "Task" => Some(Self::Task),
            "Agent" => Some(Self::Agent),
            "Dependency" => Some(Self::Dependency),
            "ExpectedOutput" => Some(Self::ExpectedOutput),
            _ => None,
        }
    }

    /// The label as it appears in model output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Task => "Task",
            Self::Agent => "Agent",
            Self::Dependency => "Dependency",
            Self::ExpectedOutput => "ExpectedOutput",
        }
    }
}

impl fmt::Display for StepField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One validated step record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStep {
    /// Step number as written by the model.
    pub number: u32,
    pub description: String,
    /// Agent name as written by the model; resolved later.
    pub agent: String,
    /// Raw dependency text (`None` or `#S<n>` references).
    pub dependency: String,
    pub expected_output: String,
}

/// A problem found while parsing a reply. None of these abort parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ParseIssue {
    /// A step number too large to represent.
    InvalidStepNumber { line: usize, raw: String },
    /// The same field appeared twice for one step; the first value is kept.
    DuplicateField {
        line: usize,
        step: u32,
        field: StepField,
    },
    /// A required field is absent or empty; the step was dropped.
    MissingField { step: u32, field: StepField },
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStepNumber { line, raw } => {
                write!(f, "line {line}: invalid step number {raw:?}")
            }
            Self::DuplicateField { line, step, field } => {
                write!(f, "line {line}: duplicate #{field}{step} ignored")
            }
            Self::MissingField { step, field } => {
                write!(f, "step {step} dropped: missing #{field}{step}")
            }
        }
    }
}

/// Steps and issues extracted from one reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReply {
    pub steps: Vec<ParsedStep>,
    pub issues: Vec<ParseIssue>,
}

#[derive(Debug, Default)]
struct StepDraft {
    number: u32,
    task: Option<String>,
    agent: Option<String>,
    dependency: Option<String>,
    expected_output: Option<String>,
}

impl StepDraft {
    fn slot(&mut self, field: StepField) -> &mut Option<String> {
        match field {
            StepField::Task => &mut self.task,
            StepField::Agent => &mut self.agent,
            StepField::Dependency => &mut self.dependency,
            StepField::ExpectedOutput => &mut self.expected_output,
        }
    }

    fn finish(self, issues: &mut Vec<ParseIssue>) -> Option<ParsedStep> {
        let number = self.number;
        let required = |value: Option<String>, field: StepField, issues: &mut Vec<ParseIssue>| {
            match value.filter(|v| !v.is_empty()) {
                Some(v) => Some(v),
                None => {
                    issues.push(ParseIssue::MissingField {
                        step: number,
                        field,
                    });
                    None
                }
            }
        };

        let description = required(self.task, StepField::Task, issues)?;
        let agent = required(self.agent, StepField::Agent, issues)?;
        let dependency = self
            .dependency
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| NO_DEPENDENCY.to_string());

        Some(ParsedStep {
            number,
            description,
            agent,
            dependency,
            expected_output: self.expected_output.unwrap_or_default(),
        })
    }
}

/// Parse a model reply into step records.
///
/// Steps are returned in the order their number first appears in the
/// text.
pub fn parse_reply(text: &str) -> ParsedReply {
    let mut drafts: Vec<StepDraft> = Vec::new();
    let mut by_number: HashMap<u32, usize> = HashMap::new();
    let mut issues = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let labels: Vec<_> = STEP_LABEL.captures_iter(line).collect();

        for (i, caps) in labels.iter().enumerate() {
            let Some(field) = StepField::from_label(&caps[1]) else {
                continue;
            };
            let number: u32 = match caps[2].parse() {
                Ok(n) => n,
                Err(_) => {
                    issues.push(ParseIssue::InvalidStepNumber {
                        line: line_no,
                        raw: caps[2].to_string(),
                    });
                    continue;
                }
            };
            let value_start = caps.get(0).map_or(line.len(), |m| m.end());
            let value_end = labels
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(line.len(), |m| m.start());
            let value = line[value_start..value_end].trim().to_string();

            let slot_idx = *by_number.entry(number).or_insert_with(|| {
                drafts.push(StepDraft {
                    number,
                    ..StepDraft::default()
                });
                drafts.len() - 1
            });

            let slot = drafts[slot_idx].slot(field);
            if slot.is_some() {
                issues.push(ParseIssue::DuplicateField {
                    line: line_no,
                    step: number,
                    field,
                });
                continue;
            }
            *slot = Some(value);
        }
    }

    let steps = drafts
        .into_iter()
        .filter_map(|d| d.finish(&mut issues))
        .collect();

    ParsedReply { steps, issues }
}

/// Extract the 1-based step references from dependency text.
///
/// Returns `None` when the text is the literal `None` (case-insensitive)
/// or empty. References too large to represent are returned as
/// `usize::MAX` so the caller reports them as out of range. Repeated
/// references are returned once, in first-seen order.
pub fn dependency_refs(text: &str) -> Option<Vec<usize>> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case(NO_DEPENDENCY) {
        return None;
    }
    let mut refs: Vec<usize> = Vec::new();
    for caps in STEP_REF.captures_iter(text) {
        let n = caps[1].parse::<usize>().unwrap_or(usize::MAX);
        if !refs.contains(&n) {
            refs.push(n);
        }
    }
    Some(refs)
}
