//! Core data models for the accounts agent

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Free-form key/value context supplied alongside a query
pub type Context = Map<String, Value>;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    FinancialSummary,
    TransactionCategorizer,
    CashFlowAnalyzer,
    AccountReconciler,
    Unknown,
}

impl AgentKind {
    /// Every kind that maps to a concrete agent
    pub const AGENTS: [AgentKind; 4] = [
        AgentKind::FinancialSummary,
        AgentKind::TransactionCategorizer,
        AgentKind::CashFlowAnalyzer,
        AgentKind::AccountReconciler,
    ];

    /// Stable identifier used in routing metadata, stats keys and JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::FinancialSummary => "financial_summary",
            AgentKind::TransactionCategorizer => "transaction_categorizer",
            AgentKind::CashFlowAnalyzer => "cash_flow_analyzer",
            AgentKind::AccountReconciler => "account_reconciler",
            AgentKind::Unknown => "unknown",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.trim() {
            "financial_summary" => Some(AgentKind::FinancialSummary),
            "transaction_categorizer" => Some(AgentKind::TransactionCategorizer),
            "cash_flow_analyzer" => Some(AgentKind::CashFlowAnalyzer),
            "account_reconciler" => Some(AgentKind::AccountReconciler),
            "unknown" => Some(AgentKind::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ================= Query =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub context: Context,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            user_id: None,
            session_id: None,
            context: Context::new(),
        }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn with_user(mut self, user_id: Option<String>, session_id: Option<String>) -> Self {
        self.user_id = user_id;
        self.session_id = session_id;
        self
    }

    /// String-valued context entry, if present
    pub fn context_str(&self, key: &str) -> Option<&str> {
        self.context.get(key).and_then(Value::as_str)
    }
}

/// Queries are shared read-only between the orchestrator and the agent task
pub type SharedQuery = Arc<Query>;

//
// ================= Routing =================
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub agent: AgentKind,
    pub score: usize,
    pub confidence: f32,
    pub matched_keywords: Vec<String>,
    pub fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingMetadata {
    pub request_id: Uuid,
    pub selected_agent: AgentKind,
    pub score: usize,
    pub matched_keywords: Vec<String>,
    pub routing_confidence: f32,
    pub fallback: bool,
    pub processing_time_ms: u64,
}

//
// ================= Response =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub agent_type: AgentKind,
    pub message: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingMetadata>,
}

impl AgentResponse {
    pub fn success(agent_type: AgentKind, message: String) -> Self {
        Self {
            agent_type,
            message,
            success: true,
            error: None,
            timestamp: Utc::now(),
            data: None,
            routing: None,
        }
    }

    pub fn failure(agent_type: AgentKind, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            agent_type,
            message: format!(
                "I'm sorry, I couldn't complete that request: {}",
                error
            ),
            success: false,
            error: Some(error),
            timestamp: Utc::now(),
            data: None,
            routing: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

//
// ================= Agent Info =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInfo {
    pub kind: AgentKind,
    pub name: String,
    pub description: String,
    pub capabilities: Vec<String>,
}
