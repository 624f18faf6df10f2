pub mod ai_gateway;
pub mod analytics;
pub mod fallback;
pub mod json_extract;
pub mod llm_provider;
pub mod modules;
pub mod profile;
pub mod progress;
pub mod prompts;
pub mod quiz_session;
pub mod schedule;
pub mod todos;
pub mod upload;
pub mod users;
pub mod validator;
