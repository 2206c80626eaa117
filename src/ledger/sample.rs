//! In-memory sample books
//!
//! Mirrors the shape of Xero records so agents and prompts behave the same
//! in demo mode as against a live organisation.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

use super::{limit_of, str_filter, Filters, Ledger, Record, ResourceKind};
use crate::error::LedgerError;

pub struct SampleLedger {
    contacts: Vec<Record>,
    invoices: Vec<Record>,
    transactions: Vec<Record>,
    accounts: Vec<Record>,
}

impl SampleLedger {
    pub fn new() -> Self {
        Self {
            contacts: records(json!([
                {
                    "ContactID": "12345678-1234-1234-1234-123456789012",
                    "Name": "ABC Corporation",
                    "EmailAddress": "contact@abccorp.com",
                    "IsCustomer": true,
                    "IsSupplier": false,
                    "ContactStatus": "ACTIVE"
                },
                {
                    "ContactID": "87654321-4321-4321-4321-210987654321",
                    "Name": "XYZ Suppliers Ltd",
                    "EmailAddress": "orders@xyzsuppliers.com",
                    "IsCustomer": false,
                    "IsSupplier": true,
                    "ContactStatus": "ACTIVE"
                }
            ])),
            invoices: records(json!([
                {
                    "InvoiceID": "inv-001",
                    "InvoiceNumber": "INV-2024-001",
                    "Type": "ACCREC",
                    "Status": "AUTHORISED",
                    "Date": "2024-01-15",
                    "DueDate": "2024-02-15",
                    "Total": 1500.00,
                    "AmountPaid": 0.00,
                    "AmountDue": 1500.00,
                    "Contact": {"ContactID": "12345678-1234-1234-1234-123456789012", "Name": "ABC Corporation"}
                },
                {
                    "InvoiceID": "inv-002",
                    "InvoiceNumber": "INV-2024-002",
                    "Type": "ACCREC",
                    "Status": "PAID",
                    "Date": "2024-01-10",
                    "DueDate": "2024-02-10",
                    "Total": 2500.00,
                    "AmountPaid": 2500.00,
                    "AmountDue": 0.00,
                    "Contact": {"ContactID": "87654321-4321-4321-4321-210987654321", "Name": "XYZ Suppliers Ltd"}
                }
            ])),
            transactions: records(json!([
                {
                    "TransactionID": "txn-001",
                    "BankAccount": {"AccountID": "bank-001", "Name": "Business Checking"},
                    "Date": "2024-01-15",
                    "Reference": "Office supplies purchase",
                    "Amount": -150.00,
                    "Type": "SPEND",
                    "Status": "RECONCILED"
                },
                {
                    "TransactionID": "txn-002",
                    "BankAccount": {"AccountID": "bank-001", "Name": "Business Checking"},
                    "Date": "2024-01-14",
                    "Reference": "Customer payment - ABC Corp",
                    "Amount": 5000.00,
                    "Type": "RECEIVE",
                    "Status": "RECONCILED"
                },
                {
                    "TransactionID": "txn-003",
                    "BankAccount": {"AccountID": "bank-001", "Name": "Business Checking"},
                    "Date": "2024-01-31",
                    "Reference": "Monthly account fee",
                    "Amount": -15.00,
                    "Type": "SPEND",
                    "Status": "AUTHORISED"
                },
                {
                    "TransactionID": "txn-004",
                    "BankAccount": {"AccountID": "bank-002", "Name": "Business Savings"},
                    "Date": "2024-01-31",
                    "Reference": "Interest earned",
                    "Amount": 25.00,
                    "Type": "RECEIVE",
                    "Status": "AUTHORISED"
                }
            ])),
            accounts: records(json!([
                {"AccountID": "acc-001", "Code": "4000", "Name": "Sales Revenue", "Type": "REVENUE", "Class": "REVENUE", "Status": "ACTIVE"},
                {"AccountID": "acc-002", "Code": "5000", "Name": "Office Supplies", "Type": "EXPENSE", "Class": "EXPENSE", "Status": "ACTIVE"},
                {"AccountID": "acc-003", "Code": "1000", "Name": "Business Checking", "Type": "BANK", "Class": "ASSET", "Status": "ACTIVE"}
            ])),
        }
    }

    fn financial_summary(&self, filters: &Filters) -> Result<Vec<Record>, LedgerError> {
        let summary_type = str_filter(filters, "summary_type").unwrap_or("profit_loss");
        let date_from = str_filter(filters, "date_from").unwrap_or("2024-01-01");
        let date_to = str_filter(filters, "date_to").unwrap_or("2024-01-31");

        let data = match summary_type {
            "profit_loss" => json!({
                "revenue": {
                    "total": 125000.00,
                    "accounts": [
                        {"name": "Sales Revenue", "amount": 120000.00},
                        {"name": "Service Revenue", "amount": 5000.00}
                    ]
                },
                "expenses": {
                    "total": 95000.00,
                    "accounts": [
                        {"name": "Office Supplies", "amount": 5000.00},
                        {"name": "Rent", "amount": 20000.00},
                        {"name": "Salaries", "amount": 60000.00},
                        {"name": "Utilities", "amount": 10000.00}
                    ]
                },
                "net_profit": 30000.00
            }),
            "cash_flow" => json!({
                "opening_balance": 15000.00,
                "inflows": 125000.00,
                "outflows": 95000.00,
                "closing_balance": 45000.00
            }),
            "balance_sheet" => json!({
                "assets": {"total": 180000.00},
                "liabilities": {"total": 60000.00},
                "equity": {"total": 120000.00}
            }),
            other => {
                return Err(LedgerError::NotFound(format!(
                    "summary type '{}' is not available",
                    other
                )))
            }
        };

        Ok(records(json!([{
            "summary_type": summary_type,
            "period": {"from": date_from, "to": date_to},
            "data": data
        }])))
    }
}

impl Default for SampleLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for SampleLedger {
    async fn fetch(
        &self,
        kind: ResourceKind,
        filters: &Filters,
    ) -> Result<Vec<Record>, LedgerError> {
        let range = DateRange::from_filters(filters)?;

        let selected: Vec<Record> = match kind {
            ResourceKind::FinancialSummary => return self.financial_summary(filters),
            ResourceKind::Contacts => {
                let search = str_filter(filters, "search").map(str::to_lowercase);
                self.contacts
                    .iter()
                    .filter(|c| match &search {
                        Some(term) => field(c, "Name").to_lowercase().contains(term.as_str()),
                        None => true,
                    })
                    .cloned()
                    .collect()
            }
            ResourceKind::Invoices => {
                let status = str_filter(filters, "status");
                self.invoices
                    .iter()
                    .filter(|i| status.map_or(true, |s| field(i, "Status") == s))
                    .filter(|i| range.contains(field(i, "Date")))
                    .cloned()
                    .collect()
            }
            ResourceKind::Transactions => {
                let account = str_filter(filters, "bank_account_id");
                self.transactions
                    .iter()
                    .filter(|t| {
                        account.map_or(true, |id| {
                            t.get("BankAccount")
                                .and_then(|b| b.get("AccountID"))
                                .and_then(Value::as_str)
                                == Some(id)
                        })
                    })
                    .filter(|t| range.contains(field(t, "Date")))
                    .cloned()
                    .collect()
            }
            ResourceKind::Accounts => {
                let account_type = str_filter(filters, "account_type");
                self.accounts
                    .iter()
                    .filter(|a| {
                        account_type.map_or(true, |ty| field(a, "Type") == ty || field(a, "Class") == ty)
                    })
                    .cloned()
                    .collect()
            }
        };

        Ok(selected.into_iter().take(limit_of(filters)).collect())
    }

    fn name(&self) -> &'static str {
        "sample"
    }
}

fn records(value: Value) -> Vec<Record> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn field<'a>(record: &'a Record, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// Inclusive ISO date range from `date_from` / `date_to`
struct DateRange {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl DateRange {
    fn from_filters(filters: &Filters) -> Result<Self, LedgerError> {
        Ok(Self {
            from: parse_date(filters, "date_from")?,
            to: parse_date(filters, "date_to")?,
        })
    }

    fn contains(&self, date: &str) -> bool {
        let Ok(date) = NaiveDate::parse_from_str(date, "%Y-%m-%d") else {
            return self.from.is_none() && self.to.is_none();
        };
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

fn parse_date(filters: &Filters, key: &str) -> Result<Option<NaiveDate>, LedgerError> {
    str_filter(filters, key)
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                LedgerError::TransientError(format!("{} must be YYYY-MM-DD, got '{}'", key, raw))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(value: Value) -> Filters {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_contact_search_is_case_insensitive() {
        let ledger = SampleLedger::new();
        let found = ledger
            .fetch(ResourceKind::Contacts, &filters(json!({"search": "xyz"})))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(field(&found[0], "Name"), "XYZ Suppliers Ltd");
    }

    #[tokio::test]
    async fn test_invoice_status_filter() {
        let ledger = SampleLedger::new();
        let paid = ledger
            .fetch(ResourceKind::Invoices, &filters(json!({"status": "PAID"})))
            .await
            .unwrap();
        assert_eq!(paid.len(), 1);
        assert_eq!(field(&paid[0], "InvoiceID"), "inv-002");
    }

    #[tokio::test]
    async fn test_transactions_by_account_and_date() {
        let ledger = SampleLedger::new();
        let found = ledger
            .fetch(
                ResourceKind::Transactions,
                &filters(json!({
                    "bank_account_id": "bank-001",
                    "date_from": "2024-01-15",
                    "date_to": "2024-01-31"
                })),
            )
            .await
            .unwrap();
        let ids: Vec<&str> = found.iter().map(|t| field(t, "TransactionID")).collect();
        assert_eq!(ids, vec!["txn-001", "txn-003"]);
    }

    #[tokio::test]
    async fn test_limit_and_account_class() {
        let ledger = SampleLedger::new();
        let limited = ledger
            .fetch(ResourceKind::Transactions, &filters(json!({"limit": 2})))
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);

        let assets = ledger
            .fetch(ResourceKind::Accounts, &filters(json!({"account_type": "ASSET"})))
            .await
            .unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(field(&assets[0], "Code"), "1000");
    }

    #[tokio::test]
    async fn test_summary_types() {
        let ledger = SampleLedger::new();
        let pnl = ledger
            .fetch(ResourceKind::FinancialSummary, &Filters::new())
            .await
            .unwrap();
        assert_eq!(pnl[0]["data"]["net_profit"], json!(30000.0));

        let missing = ledger
            .fetch(
                ResourceKind::FinancialSummary,
                &filters(json!({"summary_type": "trial_balance"})),
            )
            .await;
        assert!(matches!(missing, Err(LedgerError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_bad_date_is_rejected() {
        let ledger = SampleLedger::new();
        let result = ledger
            .fetch(ResourceKind::Invoices, &filters(json!({"date_from": "last month"})))
            .await;
        assert!(matches!(result, Err(LedgerError::TransientError(_))));
    }
}
