use serde::{Deserialize, Serialize};

use crate::errors::LlmError;

/// Urgency tier shared by intents, alerts, suggestions, and the derived
/// summary. Serialized lowercase to match the wire contract the completion
/// model is instructed to emit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrgencyLevel::Low => write!(f, "low"),
            UrgencyLevel::Medium => write!(f, "medium"),
            UrgencyLevel::High => write!(f, "high"),
        }
    }
}

/// A single financial action or concern detected in the input text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Intent {
    pub description: String,
    pub urgency_level: UrgencyLevel,
    /// Continuous urgency in [0.0, 1.0]. Passed through from the model
    /// without clamping.
    pub urgency_score: f64,
    pub timeline: String,
    pub impact: String,
}

/// A planned or committed spend mentioned in the text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expenditure {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: String,
    pub timeline: String,
    pub description: String,
}

/// A revenue-related plan (sales target, collection effort, launch).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevenueAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub target: String,
    pub timeline: String,
    pub description: String,
}

/// A flagged risk that needs attention, with a recommended mitigation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub message: String,
    pub severity: UrgencyLevel,
    pub impact: String,
    pub recommendation: String,
}

/// A recommended improvement with its expected benefit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub message: String,
    pub benefit: String,
    pub implementation: String,
    pub priority: UrgencyLevel,
}

/// Structured output of one completion call.
///
/// Every field is defaulted so a response that omits empty arrays still
/// deserializes; the schema is a contract requested of the model, not an
/// invariant we enforce.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisResult {
    pub detected_intents: Vec<Intent>,
    pub confidence_score: f64,
    pub relevant_details: String,
    pub financial_topics: Vec<String>,
    pub action_items: Vec<String>,
    pub expenditures: Vec<Expenditure>,
    pub revenue_actions: Vec<RevenueAction>,
    pub alerts: Vec<Alert>,
    pub suggestions: Vec<Suggestion>,
}

impl AnalysisResult {
    /// Legacy failure shape: every collection empty, confidence 0.0, and
    /// the error message folded into `relevant_details`. Existing callers
    /// key off the `"Error: "` prefix.
    pub fn from_error(err: &LlmError) -> Self {
        Self {
            relevant_details: format!("Error: {err}"),
            ..Self::default()
        }
    }
}

/// Counts and overall urgency derived from an [`AnalysisResult`].
/// Never sourced from the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub total_intents: usize,
    pub high_urgency_intents: usize,
    pub total_alerts: usize,
    pub total_suggestions: usize,
    pub overall_urgency: UrgencyLevel,
}

/// Final response body for `POST /analyze`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub financial_intents: AnalysisResult,
    pub summary: Summary,
}
