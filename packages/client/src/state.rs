use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::ElaraResult;
use crate::services::ai_gateway::AiGateway;
use crate::services::quiz_session::AdaptiveQuizSession;
use crate::store::{keys, KeyValueStore, SqliteStore};

/// Shared handles a host holds for the lifetime of the app.
pub struct AppState {
    config: Config,
    store: Arc<dyn KeyValueStore>,
    gateway: AiGateway,
    quiz: AdaptiveQuizSession,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn KeyValueStore>, gateway: AiGateway) -> Self {
        let quiz = AdaptiveQuizSession::new(Arc::clone(&store), gateway.clone());
        Self {
            config,
            store,
            gateway,
            quiz,
        }
    }

    /// Open the SQLite store at the configured path with the remote model
    /// from the configuration.
    pub fn open(config: Config) -> ElaraResult<Self> {
        let store = SqliteStore::open(&config.db_path)?;
        info!(
            db_path = %config.db_path.display(),
            questions_per_quiz = config.questions_per_quiz,
            llm_configured = config.llm.api_key.is_some(),
            "elara client opened"
        );
        let gateway = AiGateway::from_config(&config);
        Ok(Self::new(config, Arc::new(store), gateway))
    }

    /// Load `.env`, read the environment, and open the store.
    pub fn from_env() -> ElaraResult<Self> {
        let _ = dotenvy::dotenv();
        Self::open(Config::from_env())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn gateway(&self) -> &AiGateway {
        &self.gateway
    }

    pub fn quiz(&self) -> &AdaptiveQuizSession {
        &self.quiz
    }

    /// Remove every persisted document. Returns how many keys held data.
    pub fn clear_local_data(&self) -> ElaraResult<usize> {
        let mut removed = 0;
        for key in keys::all_keys() {
            if self.store.remove(key)? {
                removed += 1;
            }
        }
        info!(removed, "local data cleared");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ai_gateway::GatewaySettings;
    use crate::services::llm_provider::LLMProvider;
    use crate::services::todos::add_todo;
    use crate::store::MemoryStore;

    #[test]
    fn clear_removes_known_keys() {
        let config = Config {
            log_level: "info".into(),
            db_path: "unused.db".into(),
            llm: Default::default(),
            questions_per_quiz: 5,
        };
        let provider = Arc::new(LLMProvider::new(config.llm.clone()));
        let gateway = AiGateway::new(provider, GatewaySettings::default());
        let state = AppState::new(config, Arc::new(MemoryStore::new()), gateway);

        add_todo(state.store(), "Baca", "2024-06-01").unwrap();
        assert_eq!(state.clear_local_data().unwrap(), 1);
        assert_eq!(state.clear_local_data().unwrap(), 0);
    }

    #[test]
    fn open_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            log_level: "info".into(),
            db_path: dir.path().join("nested").join("elara.db"),
            llm: Default::default(),
            questions_per_quiz: 5,
        };
        let state = AppState::open(config).unwrap();
        assert!(state.config().db_path.exists());
        assert!(state.store().get(keys::MODULES).unwrap().is_none());
    }
}
