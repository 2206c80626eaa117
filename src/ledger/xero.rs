//! Xero accounting API client
//!
//! Read-only access to contacts, invoices, bank transactions, accounts and
//! reports. Token acquisition (OAuth2) happens outside this process; the
//! client expects a ready bearer token.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};
use uuid::Uuid;

use super::{limit_of, str_filter, Filters, Ledger, Record, ResourceKind};
use crate::config::Settings;
use crate::error::LedgerError;

#[derive(Clone)]
pub struct XeroLedger {
    client: Client,
    base_url: String,
    access_token: String,
    tenant_id: Option<String>,
}

impl XeroLedger {
    /// Build a client when an access token is configured
    pub fn from_settings(settings: &Settings) -> crate::Result<Option<Self>> {
        let Some(access_token) = settings.xero_access_token.clone() else {
            return Ok(None);
        };

        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(settings.timeout())
            .build()?;

        Ok(Some(Self {
            client,
            base_url: settings.xero_base_url.trim_end_matches('/').to_string(),
            access_token,
            tenant_id: settings.xero_tenant_id.clone(),
        }))
    }

    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value, LedgerError> {
        let url = format!("{}/{}", self.base_url, path);

        let mut request = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
            .query(query);
        if let Some(tenant) = &self.tenant_id {
            request = request.header("xero-tenant-id", tenant);
        }

        let response = request.send().await.map_err(|e| {
            error!("Xero request failed for {}: {}", path, e);
            LedgerError::TransientError(format!("Xero request failed for {}: {}", path, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, path, body));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| LedgerError::TransientError(format!("Invalid JSON response: {}", e)))
    }
}

#[async_trait]
impl Ledger for XeroLedger {
    async fn fetch(
        &self,
        kind: ResourceKind,
        filters: &Filters,
    ) -> Result<Vec<Record>, LedgerError> {
        let (path, field) = endpoint(kind, filters);
        let query = query_params(kind, filters)?;

        debug!(resource = %kind, path = %path, "Fetching from Xero");

        let body = self.get_json(&path, &query).await?;
        let items = body
            .get(field)
            .and_then(Value::as_array)
            .ok_or_else(|| LedgerError::TransientError(format!("Xero response missing '{}'", field)))?;

        Ok(items
            .iter()
            .filter_map(|item| item.as_object().cloned())
            .take(limit_of(filters))
            .collect())
    }

    fn name(&self) -> &'static str {
        "xero"
    }
}

/// Path under the API root and the array field holding the results
fn endpoint(kind: ResourceKind, filters: &Filters) -> (String, &'static str) {
    match kind {
        ResourceKind::Contacts => ("Contacts".to_string(), "Contacts"),
        ResourceKind::Invoices => ("Invoices".to_string(), "Invoices"),
        ResourceKind::Transactions => ("BankTransactions".to_string(), "BankTransactions"),
        ResourceKind::Accounts => ("Accounts".to_string(), "Accounts"),
        ResourceKind::FinancialSummary => {
            let report = match str_filter(filters, "summary_type") {
                Some("balance_sheet") => "BalanceSheet",
                Some("cash_flow") => "BankSummary",
                _ => "ProfitAndLoss",
            };
            (format!("Reports/{}", report), "Reports")
        }
    }
}

fn query_params(kind: ResourceKind, filters: &Filters) -> Result<Vec<(String, String)>, LedgerError> {
    let mut params = Vec::new();
    let mut clauses = Vec::new();

    match kind {
        ResourceKind::Contacts => {
            if let Some(search) = str_filter(filters, "search") {
                params.push(("searchTerm".to_string(), search.to_string()));
            }
        }
        ResourceKind::Invoices => {
            if let Some(status) = str_filter(filters, "status") {
                params.push(("Statuses".to_string(), status.to_string()));
            }
        }
        ResourceKind::Transactions => {
            if let Some(account) = str_filter(filters, "bank_account_id") {
                let account = Uuid::parse_str(account).map_err(|_| {
                    LedgerError::InvalidFilter(format!("bank_account_id '{}' is not a GUID", account))
                })?;
                clauses.push(format!("BankAccount.AccountID==guid(\"{}\")", account));
            }
        }
        ResourceKind::Accounts => {
            if let Some(ty) = str_filter(filters, "account_type") {
                if !ty.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(LedgerError::InvalidFilter(format!(
                        "account_type '{}' must be a plain identifier",
                        ty
                    )));
                }
                clauses.push(format!("(Type==\"{0}\" OR Class==\"{0}\")", ty));
            }
        }
        ResourceKind::FinancialSummary => {
            if let Some(from) = str_filter(filters, "date_from") {
                params.push(("fromDate".to_string(), from.to_string()));
            }
            if let Some(to) = str_filter(filters, "date_to") {
                params.push(("toDate".to_string(), to.to_string()));
            }
            return Ok(params);
        }
    }

    if let Some(from) = str_filter(filters, "date_from").and_then(xero_date) {
        clauses.push(format!("Date>={}", from));
    }
    if let Some(to) = str_filter(filters, "date_to").and_then(xero_date) {
        clauses.push(format!("Date<={}", to));
    }
    if !clauses.is_empty() {
        params.push(("where".to_string(), clauses.join(" AND ")));
    }

    Ok(params)
}

/// `2024-01-31` → `DateTime(2024,01,31)`
fn xero_date(iso: &str) -> Option<String> {
    let date = chrono::NaiveDate::parse_from_str(iso, "%Y-%m-%d").ok()?;
    Some(date.format("DateTime(%Y,%m,%d)").to_string())
}

fn classify_status(status: StatusCode, path: &str, body: String) -> LedgerError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LedgerError::AuthError(body),
        StatusCode::NOT_FOUND => LedgerError::NotFound(path.to_string()),
        _ => LedgerError::TransientError(format!("Xero returned {} for {}: {}", status, path, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filters(value: Value) -> Filters {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_transaction_where_clause() {
        let params = query_params(
            ResourceKind::Transactions,
            &filters(json!({
                "bank_account_id": "6f0c1a52-3b7e-4c1d-9a0e-2f4b8d7c1e35",
                "date_from": "2024-01-01",
                "date_to": "2024-01-31"
            })),
        )
        .unwrap();
        assert_eq!(
            params,
            vec![(
                "where".to_string(),
                "BankAccount.AccountID==guid(\"6f0c1a52-3b7e-4c1d-9a0e-2f4b8d7c1e35\") AND Date>=DateTime(2024,01,01) AND Date<=DateTime(2024,01,31)"
                    .to_string()
            )]
        );
    }

    #[test]
    fn test_report_endpoint_follows_summary_type() {
        let (path, field) = endpoint(
            ResourceKind::FinancialSummary,
            &filters(json!({"summary_type": "balance_sheet"})),
        );
        assert_eq!(path, "Reports/BalanceSheet");
        assert_eq!(field, "Reports");

        let (path, _) = endpoint(ResourceKind::FinancialSummary, &Filters::new());
        assert_eq!(path, "Reports/ProfitAndLoss");
    }

    #[test]
    fn test_filters_cannot_rewrite_where_clause() {
        let injected = query_params(
            ResourceKind::Transactions,
            &filters(json!({"bank_account_id": "x\") OR (1==1"})),
        );
        assert!(matches!(injected, Err(LedgerError::InvalidFilter(_))));

        let injected = query_params(
            ResourceKind::Accounts,
            &filters(json!({"account_type": "BANK\" OR Type!=\""})),
        );
        assert!(matches!(injected, Err(LedgerError::InvalidFilter(_))));

        let params = query_params(ResourceKind::Accounts, &filters(json!({"account_type": "BANK"}))).unwrap();
        assert_eq!(params[0].1, "(Type==\"BANK\" OR Class==\"BANK\")");
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, "Invoices", String::new()),
            LedgerError::AuthError(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "Invoices", String::new()),
            LedgerError::NotFound(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, "Invoices", String::new()),
            LedgerError::TransientError(_)
        ));
    }

    #[test]
    fn test_not_configured_without_token() {
        let settings = Settings::default();
        assert!(XeroLedger::from_settings(&settings).unwrap().is_none());
    }
}
