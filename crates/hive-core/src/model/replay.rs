//! Replay model: answers every prompt with a reply captured earlier.
//!
//! Lets a saved model reply be re-parsed into a plan without calling an
//! inference backend.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::trait_def::Model;

/// A [`Model`] that ignores the prompt and returns a fixed reply.
#[derive(Debug, Clone)]
pub struct ReplayModel {
    reply: String,
}

impl ReplayModel {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }

    /// Load the reply from a text file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let reply = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read reply file: {}", path.display()))?;
        Ok(Self::new(reply))
    }
}

#[async_trait]
impl Model for ReplayModel {
    fn name(&self) -> &str {
        "replay"
    }

    async fn generate(&self, _prompt: &str, _model_id: &str) -> Result<String> {
        Ok(self.reply.clone())
    }
}
