//! Test doubles for the completion and ledger boundaries

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::completion::CompletionClient;
use crate::error::{CompletionError, LedgerError};
use crate::ledger::{Filters, Ledger, Record, ResourceKind};

type Outcome = Result<String, CompletionError>;

#[derive(Default)]
struct ScriptState {
    script: VecDeque<Outcome>,
    fallback: Option<Outcome>,
    calls: usize,
    prompts: Vec<String>,
    models: Vec<String>,
}

/// Completion client that replays scripted outcomes and records its calls
#[derive(Clone, Default)]
pub struct ScriptedClient {
    state: Arc<Mutex<ScriptState>>,
    delay: Option<Duration>,
}

impl ScriptedClient {
    pub fn new(script: Vec<Outcome>) -> Self {
        let state = ScriptState {
            script: script.into(),
            ..ScriptState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            delay: None,
        }
    }

    pub fn always(outcome: Outcome) -> Self {
        let state = ScriptState {
            fallback: Some(outcome),
            ..ScriptState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.state.lock().unwrap().prompts.last().cloned()
    }

    pub fn last_model(&self) -> Option<String> {
        self.state.lock().unwrap().models.last().cloned()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, prompt: &str, model: &str, _timeout: Duration) -> Outcome {
        let outcome = {
            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            state.prompts.push(prompt.to_string());
            state.models.push(model.to_string());
            match state.script.pop_front() {
                Some(outcome) => outcome,
                None => state.fallback.clone().unwrap_or_else(|| {
                    Err(CompletionError::TransientError("script exhausted".to_string()))
                }),
            }
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        outcome
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Completion client that panics mid-call
pub struct PanickingClient;

#[async_trait]
impl CompletionClient for PanickingClient {
    async fn complete(&self, _prompt: &str, _model: &str, _timeout: Duration) -> Outcome {
        panic!("completion client exploded");
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

/// Ledger that fails every fetch with the same error
pub struct FailingLedger(pub LedgerError);

#[async_trait]
impl Ledger for FailingLedger {
    async fn fetch(
        &self,
        _kind: ResourceKind,
        _filters: &Filters,
    ) -> Result<Vec<Record>, LedgerError> {
        Err(self.0.clone())
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}
