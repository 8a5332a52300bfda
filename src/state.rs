use std::sync::Arc;

use crate::services::intent_service::IntentAnalyzer;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<IntentAnalyzer>,
}
