//! Keyword routing table
//!
//! Scores each registered agent by how many of its keywords appear in the
//! query and picks the strictly highest score. Ties go to the agent that was
//! registered first; a query with no matches falls back to the default agent.

use std::collections::HashSet;

use crate::error::AgentError;
use crate::models::{AgentKind, Query, RoutingDecision};
use crate::Result;

/// Agent answering queries that match no keywords
pub const DEFAULT_AGENT: AgentKind = AgentKind::FinancialSummary;

/// Context keys that can steer routing towards an agent
const HINT_KEYS: &[&str] = &["analysis_type", "report_type"];

#[derive(Debug, Clone)]
struct Keyword {
    text: String,
    /// Multi-token keywords ("cash flow", "p&l") match as substrings
    phrase: bool,
}

impl Keyword {
    fn parse(raw: &str) -> Option<Self> {
        let text = normalize(raw);
        if text.is_empty() {
            return None;
        }
        let tokens = tokenize(&text);
        let phrase = tokens.len() != 1 || tokens[0] != text;
        Some(Self { text, phrase })
    }

    fn matches(&self, text: &str, tokens: &HashSet<&str>) -> bool {
        if self.phrase {
            text.contains(self.text.as_str())
        } else {
            tokens.contains(self.text.as_str())
        }
    }
}

#[derive(Debug, Clone)]
struct Route {
    kind: AgentKind,
    keywords: Vec<Keyword>,
}

/// Static routing table, built once at startup
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    routes: Vec<Route>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent kind with its keywords; each kind at most once
    pub fn register<I, S>(&mut self, kind: AgentKind, keywords: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.contains(kind) {
            return Err(AgentError::DuplicateAgent(kind));
        }

        let mut parsed: Vec<Keyword> = Vec::new();
        for raw in keywords {
            if let Some(keyword) = Keyword::parse(raw.as_ref()) {
                if !parsed.iter().any(|k| k.text == keyword.text) {
                    parsed.push(keyword);
                }
            }
        }

        self.routes.push(Route {
            kind,
            keywords: parsed,
        });
        Ok(())
    }

    pub fn contains(&self, kind: AgentKind) -> bool {
        self.routes.iter().any(|r| r.kind == kind)
    }

    pub fn keywords(&self, kind: AgentKind) -> Option<Vec<&str>> {
        self.routes
            .iter()
            .find(|r| r.kind == kind)
            .map(|r| r.keywords.iter().map(|k| k.text.as_str()).collect())
    }

    /// Agent chosen when nothing matches
    pub fn default_agent(&self) -> AgentKind {
        if self.contains(DEFAULT_AGENT) {
            DEFAULT_AGENT
        } else {
            self.routes
                .first()
                .map(|r| r.kind)
                .unwrap_or(AgentKind::Unknown)
        }
    }

    /// Score every registered agent, in registration order
    pub fn score_all(&self, query: &Query) -> Vec<RoutingDecision> {
        self.rank(query).into_iter().map(|(decision, _)| decision).collect()
    }

    /// Decisions paired with their context hint boost. The boost only applies
    /// to agents that already matched a keyword and never enters `score`.
    fn rank(&self, query: &Query) -> Vec<(RoutingDecision, usize)> {
        let text = normalize(&query.text);
        let tokens: HashSet<&str> = tokenize(&text).into_iter().collect();
        let hints: Vec<String> = HINT_KEYS
            .iter()
            .filter_map(|key| query.context_str(key))
            .map(normalize)
            .filter(|hint| !hint.is_empty())
            .collect();

        self.routes
            .iter()
            .map(|route| {
                let matched_keywords: Vec<String> = route
                    .keywords
                    .iter()
                    .filter(|k| k.matches(&text, &tokens))
                    .map(|k| k.text.clone())
                    .collect();

                let boost = if matched_keywords.is_empty() {
                    0
                } else {
                    hints
                        .iter()
                        .filter(|hint| {
                            hint.as_str() == route.kind.as_str()
                                || route.keywords.iter().any(|k| &k.text == *hint)
                        })
                        .count()
                };

                let decision = RoutingDecision {
                    agent: route.kind,
                    score: matched_keywords.len(),
                    confidence: confidence(matched_keywords.len(), boost),
                    matched_keywords,
                    fallback: false,
                };
                (decision, boost)
            })
            .collect()
    }

    /// Pick the best agent for a query; never fails
    pub fn classify(&self, query: &Query) -> RoutingDecision {
        let mut best: Option<(RoutingDecision, usize)> = None;

        for (decision, boost) in self.rank(query) {
            if decision.score == 0 {
                continue;
            }
            let better = match &best {
                Some((current, current_boost)) => {
                    decision.score + boost > current.score + current_boost
                }
                None => true,
            };
            if better {
                best = Some((decision, boost));
            }
        }

        best.map(|(decision, _)| decision)
            .unwrap_or_else(|| RoutingDecision {
                agent: self.default_agent(),
                score: 0,
                confidence: 0.0,
                matched_keywords: Vec::new(),
                fallback: true,
            })
    }
}

fn confidence(keyword_matches: usize, boost: usize) -> f32 {
    if keyword_matches + boost == 0 {
        return 0.0;
    }
    let keyword_part = (keyword_matches as f32 * 0.1).min(0.3);
    let hint_part = boost as f32 * 0.2;
    (0.5 + keyword_part + hint_part).min(1.0)
}

/// Lower-case, treat hyphens as spaces and collapse whitespace
fn normalize(text: &str) -> String {
    text.replace('-', " ")
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs of alphanumerics and apostrophes
fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> RoutingTable {
        let mut table = RoutingTable::new();
        table
            .register(AgentKind::FinancialSummary, ["financial", "summary", "report", "p&l"])
            .unwrap();
        table
            .register(AgentKind::TransactionCategorizer, ["categorize", "transactions", "spending"])
            .unwrap();
        table
            .register(AgentKind::CashFlowAnalyzer, ["cash flow", "forecast", "liquidity"])
            .unwrap();
        table
            .register(AgentKind::AccountReconciler, ["reconcile", "discrepancies", "transactions"])
            .unwrap();
        table
    }

    #[test]
    fn test_unique_keyword_selects_its_agent() {
        let table = table();
        let cases = vec![
            ("please categorize this", AgentKind::TransactionCategorizer),
            ("what is our liquidity position", AgentKind::CashFlowAnalyzer),
            ("Reconcile the January statement", AgentKind::AccountReconciler),
            ("send me the REPORT", AgentKind::FinancialSummary),
        ];

        for (text, expected) in cases {
            let decision = table.classify(&Query::new(text));
            assert_eq!(decision.agent, expected, "query: {}", text);
            assert_eq!(decision.score, 1);
            assert!(!decision.fallback);
        }
    }

    #[test]
    fn test_financial_summary_example() {
        let decision = table().classify(&Query::new("Generate a financial summary for this month"));
        assert_eq!(decision.agent, AgentKind::FinancialSummary);
        assert_eq!(decision.score, 2);
        assert_eq!(decision.matched_keywords, vec!["financial", "summary"]);
        assert!((decision.confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_no_match_falls_back_to_default() {
        let decision = table().classify(&Query::new("asdlkj qweoiu"));
        assert_eq!(decision.agent, DEFAULT_AGENT);
        assert_eq!(decision.score, 0);
        assert!(decision.fallback);
        assert!(decision.matched_keywords.is_empty());
        assert_eq!(decision.confidence, 0.0);
    }

    #[test]
    fn test_tie_goes_to_earlier_registration() {
        // "transactions" is shared by the categorizer and the reconciler
        let table = table();
        for _ in 0..5 {
            let decision = table.classify(&Query::new("look at my transactions"));
            assert_eq!(decision.agent, AgentKind::TransactionCategorizer);
            assert_eq!(decision.score, 1);
        }
    }

    #[test]
    fn test_higher_score_beats_registration_order() {
        let decision = table().classify(&Query::new("reconcile transactions and flag discrepancies"));
        assert_eq!(decision.agent, AgentKind::AccountReconciler);
        assert_eq!(decision.score, 3);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let table = table();
        let query = Query::new("Forecast cash flow and spending");
        let first = table.classify(&query);
        for _ in 0..10 {
            assert_eq!(table.classify(&query), first);
        }
    }

    #[test]
    fn test_single_word_keywords_match_whole_tokens_only() {
        // "reports" is not the token "report"; "summary," still is "summary"
        let table = table();
        let decision = table.classify(&Query::new("quarterly reports"));
        assert!(decision.fallback);

        let decision = table.classify(&Query::new("a summary, please"));
        assert_eq!(decision.agent, AgentKind::FinancialSummary);
    }

    #[test]
    fn test_phrase_keywords_match_across_whitespace() {
        let table = table();
        let decision = table.classify(&Query::new("How does our   CASH\tFLOW look?"));
        assert_eq!(decision.agent, AgentKind::CashFlowAnalyzer);

        let decision = table.classify(&Query::new("show me the P&L"));
        assert_eq!(decision.agent, AgentKind::FinancialSummary);
        assert_eq!(decision.matched_keywords, vec!["p&l"]);
    }

    #[test]
    fn test_context_hint_breaks_keyword_tie() {
        // Without the hint the categorizer wins the "transactions" tie
        let table = table();
        let context = json!({"analysis_type": "account_reconciler"});
        let query = Query::new("look at my transactions")
            .with_context(context.as_object().cloned().unwrap());

        let decision = table.classify(&query);
        assert_eq!(decision.agent, AgentKind::AccountReconciler);
        assert_eq!(decision.score, 1);
        assert_eq!(decision.matched_keywords, vec!["transactions"]);
        assert!((decision.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_context_hint_alone_does_not_route() {
        let table = table();
        for hint in ["cash_flow_analyzer", "forecast"] {
            let context = json!({"analysis_type": hint});
            let query = Query::new("asdlkj qweoiu")
                .with_context(context.as_object().cloned().unwrap());

            let decision = table.classify(&query);
            assert_eq!(decision.agent, DEFAULT_AGENT);
            assert_eq!(decision.score, 0);
            assert!(decision.fallback);
            assert!(table.score_all(&query).iter().all(|d| d.score == 0));
        }
    }

    #[test]
    fn test_hyphenated_words_match_keywords() {
        let table = table();
        let decision = table.classify(&Query::new("Show our cash-flow position"));
        assert_eq!(decision.agent, AgentKind::CashFlowAnalyzer);
        assert_eq!(decision.matched_keywords, vec!["cash flow"]);

        let decision = table.classify(&Query::new("a financial-summary please"));
        assert_eq!(decision.agent, AgentKind::FinancialSummary);
        assert_eq!(decision.score, 2);
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut table = table();
        let err = table
            .register(AgentKind::CashFlowAnalyzer, ["cash"])
            .unwrap_err();
        assert!(matches!(err, AgentError::DuplicateAgent(AgentKind::CashFlowAnalyzer)));
    }

    #[test]
    fn test_keywords_are_normalized_and_deduplicated() {
        let mut table = RoutingTable::new();
        table
            .register(AgentKind::CashFlowAnalyzer, ["  Cash ", "cash", "", "Cash  Flow"])
            .unwrap();
        assert_eq!(
            table.keywords(AgentKind::CashFlowAnalyzer).unwrap(),
            vec!["cash", "cash flow"]
        );
    }

    #[test]
    fn test_default_without_financial_summary() {
        let mut table = RoutingTable::new();
        table.register(AgentKind::AccountReconciler, ["reconcile"]).unwrap();
        assert_eq!(table.default_agent(), AgentKind::AccountReconciler);
        assert_eq!(RoutingTable::new().default_agent(), AgentKind::Unknown);
    }
}
