//! ELARA client core.
//!
//! Persistence, the AI gateway, analytics and quiz orchestration around the
//! pure algorithms in `elara-algo`. The presentation layer lives in the host
//! application and talks to [`state::AppState`].

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

pub use config::{Config, LlmSettings};
pub use error::{ElaraError, ElaraResult};
pub use logging::{init_tracing, LogSettings};
pub use services::ai_gateway::{
    AiGateway, FallbackReason, GatewayReply, GatewaySettings, Provenance,
};
pub use services::llm_provider::{LLMError, LLMProvider, TextModel};
pub use state::AppState;
pub use store::{KeyValueStore, KeyValueStoreExt, MemoryStore, SqliteStore, StoreError};
