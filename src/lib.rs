//! Accounts Agent
//!
//! Routes natural-language accounting questions to one of four specialised
//! agents (financial summary, transaction categorization, cash flow analysis,
//! account reconciliation). Each agent pulls what it needs from the ledger,
//! asks the completion service and returns a structured response.
//!
//! REQUEST FLOW:
//! QUERY → CLASSIFY → AGENT (LEDGER → PROMPT → COMPLETION) → ANNOTATE → RECORD

pub mod agents;
pub mod api;
pub mod classifier;
pub mod completion;
pub mod config;
pub mod demo;
pub mod error;
pub mod gemini;
pub mod ledger;
pub mod models;
pub mod orchestrator;
pub mod stats;

#[cfg(test)]
pub mod testing;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use classifier::RoutingTable;
pub use orchestrator::Orchestrator;
