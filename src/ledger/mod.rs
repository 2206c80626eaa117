//! Accounting-data boundary
//!
//! Agents pull supporting records through the `Ledger` trait. A missing ledger
//! or a failed fetch never aborts an agent; it only drops that data section.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::LedgerError;

pub mod sample;
pub mod xero;

pub use sample::SampleLedger;
pub use xero::XeroLedger;

/// Filter arguments for a fetch (e.g. `status`, `date_from`, `limit`)
pub type Filters = Map<String, Value>;

/// One ledger record as returned by the accounting system
pub type Record = Map<String, Value>;

pub const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Contacts,
    Invoices,
    Transactions,
    Accounts,
    FinancialSummary,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Contacts => "contacts",
            ResourceKind::Invoices => "invoices",
            ResourceKind::Transactions => "transactions",
            ResourceKind::Accounts => "accounts",
            ResourceKind::FinancialSummary => "financial_summary",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fetch an agent would like to make before prompting
#[derive(Debug, Clone, PartialEq)]
pub struct DataRequest {
    pub kind: ResourceKind,
    pub filters: Filters,
}

impl DataRequest {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            filters: Filters::new(),
        }
    }

    pub fn filter(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.filters.insert(key.to_string(), value.into());
        self
    }

    /// Copy `keys` from the query context into the filters when present
    pub fn filters_from(mut self, context: &Map<String, Value>, keys: &[&str]) -> Self {
        for key in keys {
            if let Some(value) = context.get(*key) {
                if !value.is_null() {
                    self.filters.insert(key.to_string(), value.clone());
                }
            }
        }
        self
    }
}

/// Trait for an accounting data source
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn fetch(
        &self,
        kind: ResourceKind,
        filters: &Filters,
    ) -> Result<Vec<Record>, LedgerError>;

    fn name(&self) -> &'static str;
}

/// `limit` filter, falling back to the default page size
pub(crate) fn limit_of(filters: &Filters) -> usize {
    filters
        .get("limit")
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(DEFAULT_LIMIT)
}

pub(crate) fn str_filter<'a>(filters: &'a Filters, key: &str) -> Option<&'a str> {
    filters
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filters_from_context_skips_missing_and_null() {
        let context = json!({"date_from": "2024-01-01", "bank_account_id": null})
            .as_object()
            .cloned()
            .unwrap();

        let request = DataRequest::new(ResourceKind::Transactions)
            .filters_from(&context, &["date_from", "date_to", "bank_account_id"])
            .filter("limit", 25);

        assert_eq!(request.filters.len(), 2);
        assert_eq!(str_filter(&request.filters, "date_from"), Some("2024-01-01"));
        assert_eq!(limit_of(&request.filters), 25);
    }

    #[test]
    fn test_limit_defaults() {
        assert_eq!(limit_of(&Filters::new()), DEFAULT_LIMIT);
    }
}
