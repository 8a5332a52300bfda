use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::LlmError;
use crate::models::{AnalysisResult, Report, Summary, UrgencyLevel};
use crate::services::llm_service::LlmProvider;

/// System message sent with every analysis request. The wording steers the
/// model's output style and is part of the behavioral contract.
const SYSTEM_MESSAGE: &str = "You are a financial intent analyzer. Use specific, clear language \
     to describe financial intents. Include urgency levels and identify both alerts and \
     suggestions. Always respond with valid JSON.";

/// Extracts financial intents from free-form text via one completion call,
/// then derives summary statistics locally.
pub struct IntentAnalyzer {
    provider: Arc<dyn LlmProvider>,
}

impl IntentAnalyzer {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Single completion round-trip, returned as a tagged outcome so
    /// callers can tell a failed analysis apart from a genuinely empty one.
    pub async fn try_extract(&self, text: &str) -> Result<AnalysisResult, LlmError> {
        let prompt = build_intent_prompt(text);

        let body = self.provider.complete_json(SYSTEM_MESSAGE, prompt).await?;

        serde_json::from_str(&body).map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    /// Legacy contract: never fails. Any provider or parse error is folded
    /// into an empty result carrying `"Error: <message>"` in
    /// `relevant_details`.
    pub async fn extract_financial_intents(&self, text: &str) -> AnalysisResult {
        match self.try_extract(text).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("Intent extraction failed, returning empty analysis: {}", e);
                AnalysisResult::from_error(&e)
            }
        }
    }

    /// Combined analysis: one extraction call plus the pure aggregation
    /// step.
    pub async fn analyze_financial_text(&self, text: &str) -> Report {
        let analysis = self.extract_financial_intents(text).await;
        let summary = summarize(&analysis);

        info!(
            "Analysis complete: {} intents ({} high urgency), {} alerts, {} suggestions, overall urgency {}",
            summary.total_intents,
            summary.high_urgency_intents,
            summary.total_alerts,
            summary.total_suggestions,
            summary.overall_urgency
        );

        Report {
            financial_intents: analysis,
            summary,
        }
    }
}

/// Derive summary counts and overall urgency. Pure, no I/O.
///
/// Overall urgency is a short-circuit priority rule: any high intent wins,
/// then any medium, else low. Zero detected intents also yields low, which
/// conflates "nothing detected" with "all low concern"; kept for wire
/// compatibility.
pub fn summarize(analysis: &AnalysisResult) -> Summary {
    let intents = &analysis.detected_intents;

    let high_urgency_intents = intents
        .iter()
        .filter(|i| i.urgency_level == UrgencyLevel::High)
        .count();

    let overall_urgency = if high_urgency_intents > 0 {
        UrgencyLevel::High
    } else if intents
        .iter()
        .any(|i| i.urgency_level == UrgencyLevel::Medium)
    {
        UrgencyLevel::Medium
    } else {
        UrgencyLevel::Low
    };

    Summary {
        total_intents: intents.len(),
        high_urgency_intents,
        total_alerts: analysis.alerts.len(),
        total_suggestions: analysis.suggestions.len(),
        overall_urgency,
    }
}

/// Render the analysis prompt around the caller's text.
///
/// The three intent categories, their examples, and the spelled-out JSON
/// schema all steer model behavior; changing this wording is a behavioral
/// change, not a cosmetic one.
fn build_intent_prompt(text: &str) -> String {
    format!(
        r#"Analyze the following text and identify all financial-related intents, concerns, and topics.
Pay special attention to:
1. Direct financial actions that will require spending money, such as:
   - Hiring new staff (e.g., "Hiring 2 operations team members and 1 junior accountant")
   - Purchasing equipment (e.g., "Buying new office computers")
   - Marketing initiatives (e.g., "Launching new marketing campaign")
   - Operational expenses (e.g., "Increasing monthly operational budget")
   - Capital investments (e.g., "Investing in new production equipment")
   - Contract-based hires (e.g., "Hiring temporary contractors")
   - Supplier payments (e.g., "Paying increased supplier costs")
   - Legal actions (e.g., "Initiating legal collection process")
   - Any other expenditures

2. Financial commitments and obligations:
   - Loan applications (e.g., "Applying for RM250,000 working capital loan")
   - Credit lines (e.g., "Setting up new credit line with bank")
   - Grant applications (e.g., "Applying for government SME grant")
   - Payment schedules (e.g., "Scheduling payments for outstanding invoices")
   - Contractual obligations (e.g., "Renewing vendor contracts")
   - Salary commitments (e.g., "Committing to new staff salaries")
   - Vendor agreements (e.g., "Signing new supplier agreement")

3. Revenue-related intents:
   - Sales targets (e.g., "Aiming for RM500,000 in Q2 sales")
   - Collection efforts (e.g., "Collecting RM180,000 in overdue payments")
   - Payment follow-ups (e.g., "Following up with clients on late payments")
   - Revenue generation plans (e.g., "Launching new product line for revenue")
   - Pricing changes (e.g., "Increasing product prices by 12%")
   - Product launches (e.g., "Launching new product in Southeast Asia")

For each intent, use clear, specific language that describes the exact action or situation.
Avoid vague terms like "staffing" - instead use specific descriptions like "Hiring 2 operations team members".

Also identify:
1. Alerts: Critical issues that need immediate attention (e.g., "Critical cash flow shortage expected by June")
2. Suggestions: Recommendations for improvement (e.g., "Consider renegotiating supplier contracts to reduce costs")

Text: {text}

Return the analysis in JSON format with the following structure:
{{
    "detected_intents": [
        {{
            "description": "Specific, clear description of the financial intent",
            "urgency_level": "low/medium/high",
            "urgency_score": 0.0 to 1.0,
            "timeline": "when this needs to be addressed",
            "impact": "description of financial impact"
        }}
    ],
    "confidence_score": 0.0,
    "relevant_details": "any specific details mentioned",
    "financial_topics": ["list", "of", "all", "financial", "topics", "discussed"],
    "action_items": ["list", "of", "any", "financial", "actions", "needed"],
    "expenditures": [
        {{
            "type": "type of expenditure",
            "amount": "amount or range if specified",
            "timeline": "when it will occur",
            "description": "details about the expenditure"
        }}
    ],
    "revenue_actions": [
        {{
            "type": "type of revenue action",
            "target": "target amount or goal",
            "timeline": "expected timeline",
            "description": "details about the action"
        }}
    ],
    "alerts": [
        {{
            "message": "description of the alert",
            "severity": "low/medium/high",
            "impact": "potential impact if not addressed",
            "recommendation": "suggestion for addressing the alert"
        }}
    ],
    "suggestions": [
        {{
            "message": "description of the suggestion",
            "benefit": "expected benefit if implemented",
            "implementation": "how to implement this suggestion",
            "priority": "low/medium/high"
        }}
    ]
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Intent;
    use async_trait::async_trait;

    /// Deterministic stand-in for the completion service.
    struct StubProvider {
        body: Result<String, String>,
    }

    impl StubProvider {
        fn ok(body: &str) -> Arc<Self> {
            Arc::new(Self {
                body: Ok(body.to_string()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                body: Err(message.to_string()),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for StubProvider {
        async fn complete_json(
            &self,
            _system_message: &str,
            _prompt: String,
        ) -> Result<String, LlmError> {
            match &self.body {
                Ok(body) => Ok(body.clone()),
                Err(message) => Err(LlmError::NetworkError(message.clone())),
            }
        }
    }

    fn intent(level: UrgencyLevel) -> Intent {
        Intent {
            description: "test intent".to_string(),
            urgency_level: level,
            urgency_score: 0.5,
            timeline: "soon".to_string(),
            impact: "some impact".to_string(),
        }
    }

    #[test]
    fn summary_counts_match_collections() {
        let analysis = AnalysisResult {
            detected_intents: vec![
                intent(UrgencyLevel::High),
                intent(UrgencyLevel::Low),
                intent(UrgencyLevel::High),
            ],
            ..Default::default()
        };

        let summary = summarize(&analysis);
        assert_eq!(summary.total_intents, 3);
        assert_eq!(summary.high_urgency_intents, 2);
        assert!(summary.high_urgency_intents <= summary.total_intents);
        assert_eq!(summary.total_alerts, 0);
        assert_eq!(summary.total_suggestions, 0);
    }

    #[test]
    fn any_high_intent_dominates_overall_urgency() {
        let analysis = AnalysisResult {
            detected_intents: vec![
                intent(UrgencyLevel::Low),
                intent(UrgencyLevel::Medium),
                intent(UrgencyLevel::High),
            ],
            ..Default::default()
        };

        assert_eq!(summarize(&analysis).overall_urgency, UrgencyLevel::High);
    }

    #[test]
    fn medium_wins_when_no_high_present() {
        let analysis = AnalysisResult {
            detected_intents: vec![intent(UrgencyLevel::Low), intent(UrgencyLevel::Medium)],
            ..Default::default()
        };

        assert_eq!(summarize(&analysis).overall_urgency, UrgencyLevel::Medium);
    }

    #[test]
    fn zero_intents_and_all_low_both_yield_low() {
        let empty = AnalysisResult::default();
        assert_eq!(summarize(&empty).overall_urgency, UrgencyLevel::Low);
        assert_eq!(summarize(&empty).total_intents, 0);

        let all_low = AnalysisResult {
            detected_intents: vec![intent(UrgencyLevel::Low), intent(UrgencyLevel::Low)],
            ..Default::default()
        };
        assert_eq!(summarize(&all_low).overall_urgency, UrgencyLevel::Low);
    }

    #[test]
    fn prompt_embeds_input_and_schema() {
        let prompt = build_intent_prompt("We plan on hiring two operations team members.");

        assert!(prompt.contains("Text: We plan on hiring two operations team members."));
        assert!(prompt.contains("Revenue-related intents"));
        assert!(prompt.contains("Financial commitments and obligations"));
        assert!(prompt.contains("\"detected_intents\""));
        assert!(prompt.contains("\"urgency_level\": \"low/medium/high\""));
        // The schema block must render literal braces, not format captures.
        assert!(prompt.contains("\"description\": \"Specific, clear description of the financial intent\""));
        assert!(!prompt.contains("{{"));
    }

    #[tokio::test]
    async fn network_failure_folds_into_error_sentinel() {
        let analyzer = IntentAnalyzer::new(StubProvider::failing("connection refused"));

        let result = analyzer.extract_financial_intents("any text").await;

        assert!(result.relevant_details.starts_with("Error: "));
        assert!(result.relevant_details.contains("connection refused"));
        assert_eq!(result.confidence_score, 0.0);
        assert!(result.detected_intents.is_empty());
        assert!(result.financial_topics.is_empty());
        assert!(result.action_items.is_empty());
        assert!(result.alerts.is_empty());
        assert!(result.suggestions.is_empty());
    }

    #[tokio::test]
    async fn malformed_completion_folds_into_error_sentinel() {
        let analyzer = IntentAnalyzer::new(StubProvider::ok("not json at all"));

        let result = analyzer.extract_financial_intents("any text").await;

        assert!(result.relevant_details.starts_with("Error: "));
        assert!(result.detected_intents.is_empty());
    }

    #[tokio::test]
    async fn try_extract_distinguishes_failure_from_empty_success() {
        let failing = IntentAnalyzer::new(StubProvider::failing("down"));
        assert!(failing.try_extract("text").await.is_err());

        let empty_success = IntentAnalyzer::new(StubProvider::ok("{}"));
        let analysis = empty_success.try_extract("text").await.unwrap();
        assert!(analysis.detected_intents.is_empty());
        assert!(!analysis.relevant_details.starts_with("Error: "));
    }

    #[tokio::test]
    async fn end_to_end_high_urgency_transcript() {
        let completion = r#"{
            "detected_intents": [
                {
                    "description": "Hiring two operations team members",
                    "urgency_level": "high",
                    "urgency_score": 0.9,
                    "timeline": "immediately",
                    "impact": "increased payroll alongside RM180,000 overdue collections"
                }
            ],
            "confidence_score": 0.92,
            "relevant_details": "RM180,000 overdue payment outstanding past 30 days",
            "financial_topics": ["hiring", "collections"],
            "action_items": ["Proceed with recruitment", "Escalate overdue payment"],
            "expenditures": [],
            "revenue_actions": [
                {
                    "type": "collection effort",
                    "target": "RM180,000",
                    "timeline": "mid-May",
                    "description": "Collect overdue payments from two major clients"
                }
            ],
            "alerts": [],
            "suggestions": []
        }"#;
        let analyzer = IntentAnalyzer::new(StubProvider::ok(completion));

        let report = analyzer
            .analyze_financial_text(
                "Hiring two operations team members. RM180,000 overdue payment outstanding.",
            )
            .await;

        assert_eq!(report.summary.total_intents, 1);
        assert_eq!(report.summary.high_urgency_intents, 1);
        assert_eq!(report.summary.overall_urgency, UrgencyLevel::High);
        assert_eq!(report.financial_intents.detected_intents.len(), 1);
        assert_eq!(report.financial_intents.revenue_actions.len(), 1);
        assert_eq!(
            report.summary.total_intents,
            report.financial_intents.detected_intents.len()
        );
    }
}
