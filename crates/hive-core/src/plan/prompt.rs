//! Planning prompt construction.
//!
//! Pure string assembly: an agent roster section plus a fixed prompt that
//! tells the model which step format to emit. The step format is what
//! [`super::parser`] understands.

use crate::agent::Agent;

/// Number of task examples and tools quoted per agent.
const MAX_LISTED: usize = 3;

/// Strategy and rules given to the model before the agent section.
const PLANNING_GUIDELINES: &str = r#"## Planning Strategy

1. Identify the kind of work: data retrieval, analysis, or both.
2. Order the agents so that data is gathered before it is analysed.
3. Keep the plan short. Two to four steps is usually enough.
4. Every step must build on the results it depends on.

## Rules

- Use ONLY the agents listed below, spelled exactly as shown after "Name:".
- Each step is one block with four lines: Task, Agent, Dependency, ExpectedOutput.
- Number the four lines of a block with the same step number.
- A dependency is `None` or a list of earlier steps such as `#S1, #S2`.
- Never depend on the current step or on a later step.
"#;

/// The block format the parser expects.
const STEP_FORMAT: &str = r#"## Required Format

```
#Task1: <specific, actionable task description>
#Agent1: <exact agent name from the list>
#Dependency1: None
#ExpectedOutput1: <what this step must produce>

#Task2: <next task>
#Agent2: <exact agent name from the list>
#Dependency2: #S1
#ExpectedOutput2: <what this step must produce>
```
"#;

/// Render the roster section of the prompt.
///
/// Agents are numbered from 1. At most three task examples and three
/// tools are quoted per agent; the remainder is summarised as a count.
pub fn render_agent_descriptions(agents: &[Agent]) -> String {
    let mut out = String::with_capacity(256 * agents.len().max(1));
    out.push_str("## Available Agents\n");

    for (i, agent) in agents.iter().enumerate() {
        out.push_str(&format!("\n### Agent {}: {}\n", i + 1, agent.name.to_uppercase()));
        out.push_str(&format!("- Name: {}\n", agent.name));
        out.push_str(&format!("- Description: {}\n", agent.description));

        if !agent.task_examples.is_empty() {
            out.push_str("- Example tasks:\n");
            for (n, example) in agent.task_examples.iter().take(MAX_LISTED).enumerate() {
                out.push_str(&format!("  {}. {}\n", n + 1, example));
            }
            if agent.task_examples.len() > MAX_LISTED {
                out.push_str(&format!(
                    "  ... and {} more\n",
                    agent.task_examples.len() - MAX_LISTED
                ));
            }
        }

        if !agent.tools.is_empty() {
            let shown: Vec<&str> = agent
                .tools
                .iter()
                .take(MAX_LISTED)
                .map(String::as_str)
                .collect();
            out.push_str(&format!("- Tools: {}", shown.join(", ")));
            if agent.tools.len() > MAX_LISTED {
                out.push_str(&format!(" (+{} more)", agent.tools.len() - MAX_LISTED));
            }
            out.push('\n');
        }
    }

    out
}

/// Build the full planning prompt for `goal`.
pub fn build_prompt(goal: &str, agent_descriptions: &str) -> String {
    let mut prompt = String::with_capacity(
        PLANNING_GUIDELINES.len() + STEP_FORMAT.len() + agent_descriptions.len() + goal.len() + 256,
    );

    prompt.push_str("# Task Planner\n\n");
    prompt.push_str(
        "You are an expert task planner. Decompose the problem below into an \
         ordered sequence of steps, each carried out by one of the specialised \
         agents listed further down.\n\n",
    );

    prompt.push_str(PLANNING_GUIDELINES);
    prompt.push('\n');
    prompt.push_str(STEP_FORMAT);
    prompt.push('\n');
    prompt.push_str(agent_descriptions);
    prompt.push('\n');

    prompt.push_str("## Problem\n\n");
    prompt.push_str(goal.trim());
    prompt.push_str("\n\n");
    prompt.push_str("Your plan:\n");

    prompt
}
