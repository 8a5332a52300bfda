mod intent;

pub use intent::{
    Alert, AnalysisResult, Expenditure, Intent, Report, RevenueAction, Suggestion, Summary,
    UrgencyLevel,
};
