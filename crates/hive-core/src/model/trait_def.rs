//! The `Model` trait -- the adapter interface for inference backends.
//!
//! The trait is object-safe so backends can be chosen at runtime and
//! passed around as `&dyn Model`.

use anyhow::Result;
use async_trait::async_trait;

/// A black-box text generator.
///
/// Failure semantics (transport errors, empty replies) are the
/// implementor's to report through the returned `Result`; callers decide
/// whether to retry.
#[async_trait]
pub trait Model: Send + Sync {
    /// Short backend name (e.g. "command", "replay").
    fn name(&self) -> &str;

    /// Generate a completion for `prompt` using the model `model_id`.
    async fn generate(&self, prompt: &str, model_id: &str) -> Result<String>;
}

// Compile-time assertion: Model must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Model) {}
};
