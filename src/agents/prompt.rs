//! Prompt assembly shared by all agents
//!
//! Layout: agent header line, fixed instructions, optional context and ledger
//! sections, then the user's request last.

use serde_json::Value;

use crate::ledger::{Record, ResourceKind};
use crate::models::{AgentKind, Context};
use crate::Result;

const HEADER_PREFIX: &str = "Agent: ";

pub struct PromptBuilder {
    kind: AgentKind,
    instructions: &'static str,
    sections: Vec<String>,
    query: String,
}

impl PromptBuilder {
    pub fn new(kind: AgentKind, instructions: &'static str) -> Self {
        Self {
            kind,
            instructions,
            sections: Vec::new(),
            query: String::new(),
        }
    }

    /// Render the caller's context as JSON; skipped when empty
    pub fn context(mut self, context: &Context) -> Result<Self> {
        if !context.is_empty() {
            let rendered = serde_json::to_string_pretty(context)?;
            self.sections
                .push(format!("## Context\n```json\n{}\n```", rendered));
        }
        Ok(self)
    }

    pub fn ledger_data(mut self, kind: ResourceKind, records: &[Record]) -> Result<Self> {
        let rendered = serde_json::to_string_pretty(records)?;
        self.sections.push(format!(
            "## Ledger data: {} ({} record{})\n```json\n{}\n```",
            kind,
            records.len(),
            if records.len() == 1 { "" } else { "s" },
            rendered
        ));
        Ok(self)
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.sections.push(format!("## Note\n{}", note.into()));
        self
    }

    pub fn query(mut self, text: &str) -> Self {
        self.query = text.trim().to_string();
        self
    }

    pub fn build(self) -> String {
        let mut out = format!("{}{}\n\n{}\n", HEADER_PREFIX, self.kind, self.instructions.trim());
        for section in &self.sections {
            out.push('\n');
            out.push_str(section);
            out.push('\n');
        }
        out.push_str("\n## Request\n");
        out.push_str(&self.query);
        out.push('\n');
        out
    }
}

/// Which agent produced a prompt, read back from its header line
pub fn agent_from_prompt(prompt: &str) -> Option<AgentKind> {
    prompt
        .lines()
        .next()
        .and_then(|line| line.strip_prefix(HEADER_PREFIX))
        .and_then(AgentKind::from_slug)
}

/// Whether a context value is a list of JSON objects
pub(crate) fn is_record_list(value: &Value) -> bool {
    value
        .as_array()
        .map(|items| items.iter().all(Value::is_object))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prompt_layout() {
        let context = json!({"period": "monthly"}).as_object().cloned().unwrap();
        let record = json!({"TransactionID": "txn-001"}).as_object().cloned().unwrap();

        let prompt = PromptBuilder::new(AgentKind::FinancialSummary, "Summarize the books.")
            .context(&context)
            .unwrap()
            .ledger_data(ResourceKind::Transactions, &[record])
            .unwrap()
            .query("  Generate a financial summary  ")
            .build();

        assert!(prompt.starts_with("Agent: financial_summary\n\nSummarize the books."));
        assert!(prompt.contains("\"period\": \"monthly\""));
        assert!(prompt.contains("## Ledger data: transactions (1 record)"));
        assert!(prompt.ends_with("## Request\nGenerate a financial summary\n"));

        let context_at = prompt.find("## Context").unwrap();
        let request_at = prompt.find("## Request").unwrap();
        assert!(context_at < request_at);
    }

    #[test]
    fn test_empty_context_is_omitted() {
        let prompt = PromptBuilder::new(AgentKind::AccountReconciler, "Reconcile.")
            .context(&Context::new())
            .unwrap()
            .query("reconcile")
            .build();
        assert!(!prompt.contains("## Context"));
    }

    #[test]
    fn test_header_round_trip() {
        let prompt = PromptBuilder::new(AgentKind::TransactionCategorizer, "x").build();
        assert_eq!(
            agent_from_prompt(&prompt),
            Some(AgentKind::TransactionCategorizer)
        );
        assert_eq!(agent_from_prompt("Hello"), None);
    }

    #[test]
    fn test_record_list_detection() {
        assert!(is_record_list(&json!([{"id": 1}, {"id": 2}])));
        assert!(is_record_list(&json!([])));
        assert!(!is_record_list(&json!([1, 2])));
        assert!(!is_record_list(&json!({"id": 1})));
    }
}
