pub mod intent_service;
pub mod llm_service;
