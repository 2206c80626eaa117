//! Agent trait and the four accounting agents
//!
//! Agents are stateless: each `handle` call builds a prompt, optionally pulls
//! ledger data, calls the completion client and wraps the answer. Completion
//! failures come back as `success = false` responses; `Err` is reserved for
//! failures to build the request itself.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::completion::CompletionClient;
use crate::ledger::{DataRequest, Ledger, Record};
use crate::models::{AgentInfo, AgentKind, AgentResponse, Query};
use crate::Result;

pub mod cash_flow;
pub mod financial_summary;
pub mod prompt;
pub mod reconciler;
pub mod transaction_categorizer;

pub use cash_flow::CashFlowAnalyzerAgent;
pub use financial_summary::FinancialSummaryAgent;
pub use reconciler::AccountReconcilerAgent;
pub use transaction_categorizer::TransactionCategorizerAgent;

use prompt::PromptBuilder;

/// External collaborators every agent calls through
#[derive(Clone)]
pub struct AgentRuntime {
    completion: Arc<dyn CompletionClient>,
    ledger: Option<Arc<dyn Ledger>>,
    model: String,
    timeout: Duration,
}

impl AgentRuntime {
    pub fn new(completion: Arc<dyn CompletionClient>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            completion,
            ledger: None,
            model: model.into(),
            timeout,
        }
    }

    pub fn with_ledger(mut self, ledger: Arc<dyn Ledger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Fetch every request that can be served; failures only drop that section.
    /// Returns the fetched sections and the number of failed fetches.
    async fn gather(
        &self,
        kind: AgentKind,
        requests: Vec<DataRequest>,
    ) -> (Vec<(DataRequest, Vec<Record>)>, usize) {
        let Some(ledger) = &self.ledger else {
            if !requests.is_empty() {
                debug!(agent = %kind, "No ledger configured, answering from prompt only");
            }
            return (Vec::new(), 0);
        };

        let mut fetched = Vec::with_capacity(requests.len());
        let mut failures = 0;
        for request in requests {
            match ledger.fetch(request.kind, &request.filters).await {
                Ok(records) => {
                    debug!(
                        agent = %kind,
                        resource = %request.kind,
                        count = records.len(),
                        "Ledger data fetched"
                    );
                    fetched.push((request, records));
                }
                Err(e) => {
                    warn!(
                        agent = %kind,
                        resource = %request.kind,
                        ledger = ledger.name(),
                        error = %e,
                        "Ledger fetch failed, continuing without it"
                    );
                    failures += 1;
                }
            }
        }
        (fetched, failures)
    }

    /// Run the prompt → data → completion pipeline for one agent
    pub async fn run(
        &self,
        kind: AgentKind,
        instructions: &'static str,
        query: &Query,
        requests: Vec<DataRequest>,
    ) -> Result<AgentResponse> {
        let (fetched, failures) = self.gather(kind, requests).await;

        let mut builder = PromptBuilder::new(kind, instructions).context(&query.context)?;
        let mut resources = Map::new();
        for (request, records) in &fetched {
            builder = builder.ledger_data(request.kind, records)?;
            resources.insert(request.kind.to_string(), json!(records.len()));
        }
        if failures > 0 {
            builder = builder.note(
                "Some ledger data could not be retrieved. Say so where it limits the answer.",
            );
        }
        let prompt = builder.query(&query.text).build();

        info!(
            agent = %kind,
            model = %self.model,
            client = self.completion.name(),
            ledger_sections = fetched.len(),
            "Requesting completion"
        );

        let data = json!({ "resources": Value::Object(resources) });

        match self.completion.complete(&prompt, &self.model, self.timeout).await {
            Ok(text) => Ok(AgentResponse::success(kind, text).with_data(data)),
            Err(e) => {
                warn!(agent = %kind, error = %e, "Completion failed");
                Ok(AgentResponse::failure(kind, e.to_string()).with_data(data))
            }
        }
    }
}

/// Trait for an accounting agent
#[async_trait]
pub trait Agent: Send + Sync {
    fn kind(&self) -> AgentKind;
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn capabilities(&self) -> &'static [&'static str];

    /// Routing keywords used when the caller supplies none
    fn default_keywords(&self) -> &'static [&'static str];

    /// Fixed instruction template placed at the top of every prompt
    fn instructions(&self) -> &'static str;

    fn runtime(&self) -> &AgentRuntime;

    /// Ledger fetches derived from the query context
    fn data_requests(&self, query: &Query) -> Result<Vec<DataRequest>>;

    fn info(&self) -> AgentInfo {
        AgentInfo {
            kind: self.kind(),
            name: self.name().to_string(),
            description: self.description().to_string(),
            capabilities: self.capabilities().iter().map(|c| c.to_string()).collect(),
        }
    }

    async fn handle(&self, query: &Query) -> Result<AgentResponse> {
        let requests = self.data_requests(query)?;
        self.runtime()
            .run(self.kind(), self.instructions(), query, requests)
            .await
    }
}

/// The four accounting agents in routing priority order
pub fn create_default_agents(runtime: AgentRuntime) -> Vec<Arc<dyn Agent>> {
    vec![
        Arc::new(FinancialSummaryAgent::new(runtime.clone())),
        Arc::new(TransactionCategorizerAgent::new(runtime.clone())),
        Arc::new(CashFlowAnalyzerAgent::new(runtime.clone())),
        Arc::new(AccountReconcilerAgent::new(runtime)),
    ]
}
