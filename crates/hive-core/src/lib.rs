//! Core library for hive: agent task planning and benchmark scenario
//! validation.
//!
//! - [`plan`] turns one goal plus an agent roster into an ordered list of
//!   dependent sub-tasks by prompting a [`model::Model`] and parsing its
//!   reply.
//! - [`executor`] is the hand-off point for running a generated plan.
//! - [`scenario`] validates benchmark scenario records stored as JSON or
//!   JSONL files.

pub mod agent;
pub mod executor;
pub mod model;
pub mod plan;
pub mod scenario;
