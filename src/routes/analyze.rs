use axum::extract::{Query, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::Report;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(analyze_text))
}

/// Request body for `POST /analyze`.
#[derive(Debug, Deserialize)]
pub struct TextInput {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeParams {
    /// When true, a completion-service failure is surfaced as an error
    /// response instead of being folded into an empty report.
    #[serde(default)]
    pub strict: bool,
}

/// POST /analyze
///
/// Analyze free-form narrative text (e.g. a meeting transcript) and return
/// the structured financial-intent report with derived summary statistics.
async fn analyze_text(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
    Json(input): Json<TextInput>,
) -> Result<Json<Report>, AppError> {
    info!(
        "POST /analyze - Received {} chars of input (strict: {})",
        input.text.len(),
        params.strict
    );

    if input.text.trim().is_empty() {
        return Err(AppError::Validation("text must not be empty".to_string()));
    }

    let report = if params.strict {
        let analysis = state.analyzer.try_extract(&input.text).await.map_err(|e| {
            error!("Strict analysis failed: {}", e);
            e
        })?;
        let summary = crate::services::intent_service::summarize(&analysis);
        Report {
            financial_intents: analysis,
            summary,
        }
    } else {
        state.analyzer.analyze_financial_text(&input.text).await
    };

    info!(
        "POST /analyze - {} intents detected, overall urgency {}",
        report.summary.total_intents, report.summary.overall_urgency
    );

    Ok(Json(report))
}
