//! Shared test utilities for hive integration tests.
//!
//! Provides scripted [`Model`] implementations that record the prompts
//! they receive, a sample agent roster with a matching model reply, and
//! the benchmark scenario records used across scenario tests.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde_json::{Value, json};

use hive_core::agent::Agent;
use hive_core::model::Model;

/// A model that answers from a queue of scripted replies.
///
/// Each call pops the next entry: `Ok` is returned as the reply, `Err`
/// becomes a model failure. An exhausted queue is a failure too.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let model = Self::default();
        for reply in replies {
            model.push_reply(reply);
        }
        model
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Err(message.into()));
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Model for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str, _model_id: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => bail!("{message}"),
            None => bail!("scripted model has no replies left"),
        }
    }
}

/// A model whose every call fails.
#[derive(Debug, Default)]
pub struct FailingModel {
    calls: AtomicU32,
}

impl FailingModel {
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Model for FailingModel {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _prompt: &str, model_id: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        bail!("model {model_id} is unavailable")
    }
}

/// Two-agent roster used by planning tests.
pub fn sample_roster() -> Vec<Agent> {
    vec![
        Agent::new("IoTAgent", "Retrieves sites, assets and sensor readings.")
            .with_task_examples(["List all sites", "Get the assets at site MAIN"])
            .with_tools(["sites", "assets", "history"]),
        Agent::new("FMSRAgent", "Maps failure modes to the sensors that detect them.")
            .with_task_examples(["Which sensors detect evaporator fouling?"]),
    ]
}

/// Roster TOML equivalent to [`sample_roster`].
pub const SAMPLE_ROSTER_TOML: &str = r#"
[[agents]]
name = "IoTAgent"
description = "Retrieves sites, assets and sensor readings."
task_examples = ["List all sites", "Get the assets at site MAIN"]
tools = ["sites", "assets", "history"]

[[agents]]
name = "FMSRAgent"
description = "Maps failure modes to the sensors that detect them."
task_examples = ["Which sensors detect evaporator fouling?"]
"#;

/// A well-formed three-step reply for [`sample_roster`].
pub const SAMPLE_REPLY: &str = "\
#Task1: List all available IoT sites
#Agent1: IoTAgent
#Dependency1: None
#ExpectedOutput1: A list of site names

#Task2: List the assets at the first site
#Agent2: IoTAgent
#Dependency2: #S1
#ExpectedOutput2: A list of asset names

#Task3: Identify sensors relevant to evaporator fouling
#Agent3: FMSRAgent
#Dependency3: #S1, #S2
#ExpectedOutput3: A list of sensor names
";

/// Scenario 113 from the FMSR utterance set.
pub fn scenario_113() -> Value {
    json!({
        "id": "113",
        "type": "FMSR",
        "deterministic": false,
        "characteristic_form": "the answer should contain one of more sensors of Chiller 6. The sensors of Chiller 6 need to be from the list [Chiller 6 Chiller % Loaded, Chiller 6 Chiller Efficiency, Chiller 6 Condenser Water Flow, Chiller 6 Condenser Water Return To Tower Temperature, Chiller 6 Liquid Refrigerant Evaporator Temperature, Chiller 6 Power Input, Chiller 6 Return Temperature, Chiller 6 Schedule, Chiller 6 Supply Temperature, Chiller 6 Tonnage.] ",
        "text": " If Evaporator Water side fouling occurs for Chiller 6, which sensor is most relevant for monitoring this specific failure?"
    })
}

/// Scenario 217 from the TSFM utterance set.
pub fn scenario_217() -> Value {
    json!({
        "id": "217",
        "type": "TSFM",
        "text": "Forecast 'Chiller 9 Condenser Water Flow' using data in 'chiller9_annotated_small_test.csv'. Use parameter 'Timestamp' as a timestamp.",
        "category": "Inference Query",
        "characteristic_form": "The expected response should be: Forecasting results of 'Chiller 9 Condenser Water Flow' using data in 'chiller9_annotated_small_test.csv' are stored in json file"
    })
}

/// Write `records` to `dir/name`: a JSON array for `.json`, one record
/// per line otherwise.
pub fn write_scenario_file(dir: &Path, name: &str, records: &[Value]) -> PathBuf {
    let path = dir.join(name);
    let body = if name.ends_with(".json") {
        Value::Array(records.to_vec()).to_string()
    } else {
        records
            .iter()
            .map(|r| format!("{r}\n"))
            .collect::<String>()
    };
    std::fs::write(&path, body).expect("failed to write scenario file");
    path
}
