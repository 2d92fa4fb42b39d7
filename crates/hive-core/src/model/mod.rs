//! Language-model boundary.
//!
//! Planning and execution only ever see the [`Model`] trait: prompt text
//! and a model identifier in, generated text out. Concrete backends:
//!
//! - [`CommandModel`] pipes the prompt into a CLI (by default `claude -p`)
//!   and returns its stdout.
//! - [`ReplayModel`] returns a reply captured earlier, for offline runs.
//!
//! ```text
//! PlanningWorkflow --generate(prompt, model_id)--> &dyn Model
//! ```

pub mod command;
pub mod replay;
pub mod trait_def;

pub use command::CommandModel;
pub use replay::ReplayModel;
pub use trait_def::Model;
