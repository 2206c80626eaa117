//! Query orchestrator
//!
//! CLASSIFY → DISPATCH → ANNOTATE → RECORD
//!
//! Every path returns a well-formed `AgentResponse`: agent errors and panics
//! are converted into `success = false` responses here.

use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::agents::{create_default_agents, Agent, AgentRuntime};
use crate::classifier::RoutingTable;
use crate::error::AgentError;
use crate::models::{
    AgentInfo, AgentKind, AgentResponse, Query, RoutingDecision, RoutingMetadata, SharedQuery,
};
use crate::stats::{Stats, StatsSnapshot};
use crate::Result;

/// Routes queries to registered agents
pub struct Orchestrator {
    agents: Vec<Arc<dyn Agent>>,
    routing: RoutingTable,
    stats: Arc<Stats>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::with_stats(Arc::new(Stats::new(AgentKind::AGENTS)))
    }

    /// Use an externally owned `Stats`, e.g. to share counters with a reporter
    pub fn with_stats(stats: Arc<Stats>) -> Self {
        Self {
            agents: Vec::new(),
            routing: RoutingTable::new(),
            stats,
        }
    }

    /// Orchestrator with the four accounting agents and their default keywords
    pub fn with_default_agents(runtime: AgentRuntime) -> Result<Self> {
        let mut orchestrator = Self::new();
        for agent in create_default_agents(runtime) {
            orchestrator.register_default(agent)?;
        }
        Ok(orchestrator)
    }

    /// Add an agent to the routing table; each kind at most once
    pub fn register<I, S>(&mut self, agent: Arc<dyn Agent>, keywords: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let kind = agent.kind();
        if kind == AgentKind::Unknown {
            return Err(AgentError::Invocation(
                "agents must declare a concrete kind".to_string(),
            ));
        }
        self.routing.register(kind, keywords)?;
        self.stats.track(kind);
        self.agents.push(agent);

        info!(agent = %kind, total = self.agents.len(), "Agent registered");
        Ok(())
    }

    pub fn register_default(&mut self, agent: Arc<dyn Agent>) -> Result<()> {
        let keywords = agent.default_keywords();
        self.register(agent, keywords.iter().copied())
    }

    pub fn classify(&self, query: &Query) -> RoutingDecision {
        self.routing.classify(query)
    }

    /// Route a query to one agent and return its response
    pub async fn process_query(&self, query: Query) -> AgentResponse {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("query", %request_id);

        async move {
            let started = Instant::now();
            let query: SharedQuery = Arc::new(query);
            let decision = self.classify(&query);

            info!(
                agent = %decision.agent,
                score = decision.score,
                fallback = decision.fallback,
                matched = ?decision.matched_keywords,
                user_id = ?query.user_id,
                session_id = ?query.session_id,
                "Query routed"
            );

            self.dispatch(query, decision, request_id, started).await
        }
        .instrument(span)
        .await
    }

    /// Ask every agent with a keyword match; the default agent when none match
    pub async fn process_multi_agent_query(&self, query: Query) -> Vec<AgentResponse> {
        let relevant: Vec<RoutingDecision> = self
            .routing
            .score_all(&query)
            .into_iter()
            .filter(|d| d.score > 0)
            .collect();

        if relevant.is_empty() {
            return vec![self.process_query(query).await];
        }

        info!(
            agents = ?relevant.iter().map(|d| d.agent).collect::<Vec<_>>(),
            "Multi-agent query"
        );

        let query: SharedQuery = Arc::new(query);
        let mut responses = Vec::with_capacity(relevant.len());
        for decision in relevant {
            let started = Instant::now();
            responses.push(
                self.dispatch(Arc::clone(&query), decision, Uuid::new_v4(), started)
                    .await,
            );
        }
        responses
    }

    pub fn list_agents(&self) -> Vec<AgentInfo> {
        self.agents.iter().map(|a| a.info()).collect()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn agent(&self, kind: AgentKind) -> Option<Arc<dyn Agent>> {
        self.agents.iter().find(|a| a.kind() == kind).cloned()
    }

    async fn dispatch(
        &self,
        query: SharedQuery,
        decision: RoutingDecision,
        request_id: Uuid,
        started: Instant,
    ) -> AgentResponse {
        let mut response = match self.agent(decision.agent) {
            Some(agent) => invoke(agent, Arc::clone(&query)).await,
            None => {
                warn!("No agents registered, cannot answer query");
                AgentResponse::failure(AgentKind::Unknown, "no agents are registered")
            }
        };

        response.routing = Some(RoutingMetadata {
            request_id,
            selected_agent: decision.agent,
            score: decision.score,
            matched_keywords: decision.matched_keywords,
            routing_confidence: decision.confidence,
            fallback: decision.fallback,
            processing_time_ms: started.elapsed().as_millis() as u64,
        });

        self.stats
            .record(response.agent_type, response.success, &query.text);

        info!(
            agent = %response.agent_type,
            success = response.success,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Query processed"
        );

        response
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the agent on its own task so a panic cannot reach the caller
async fn invoke(agent: Arc<dyn Agent>, query: SharedQuery) -> AgentResponse {
    let kind = agent.kind();
    let task = tokio::spawn(async move { agent.handle(&query).await });

    match task.await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            warn!(agent = %kind, error = %e, "Agent invocation failed");
            AgentResponse::failure(kind, e.to_string())
        }
        Err(join_error) => {
            error!(agent = %kind, error = %join_error, "Agent task aborted");
            let reason = if join_error.is_panic() {
                "agent panicked while handling the query"
            } else {
                "agent task was cancelled"
            };
            AgentResponse::failure(kind, reason)
        }
    }
}
