//! Adaptive quiz orchestration.
//!
//! Each `prepare` call takes a new generation token before awaiting the
//! model. When it resolves, the result is returned only if no newer
//! generation was started in the meantime, so a restart never shows the
//! questions of an abandoned request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use elara_algo::{Difficulty, DifficultyConfig, DifficultySelector, LearningProfile, QuizHistory};

use crate::error::{ElaraError, ElaraResult};
use crate::models::{QuizQuestion, UserProgress};
use crate::services::ai_gateway::AiGateway;
use crate::services::analytics::{load_analytics, record_quiz_performance};
use crate::services::modules::find_module;
use crate::services::profile::load_profile;
use crate::services::progress::{complete_module, complete_quiz};
use crate::services::prompts::QuizMode;
use crate::store::{KeyValueStore, StoreResult};

const MISSING_CONTENT: &str = "Konten modul tidak tersedia. Gunakan soal standar.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationToken(u64);

#[derive(Clone, Debug)]
pub struct PreparedQuiz {
    pub token: GenerationToken,
    pub module_id: String,
    pub difficulty: Difficulty,
    pub questions: Vec<QuizQuestion>,
    /// Set when the questions came from a local fallback
    pub notice: Option<&'static str>,
}

#[derive(Clone, Debug)]
pub struct QuizOutcome {
    pub correct: u32,
    pub total: u32,
    /// Module average after this attempt
    pub average: f64,
    pub progress: UserProgress,
}

pub struct AdaptiveQuizSession {
    store: Arc<dyn KeyValueStore>,
    gateway: AiGateway,
    selector: DifficultySelector,
    generation: AtomicU64,
}

impl AdaptiveQuizSession {
    pub fn new(store: Arc<dyn KeyValueStore>, gateway: AiGateway) -> Self {
        let config = DifficultyConfig {
            questions_per_quiz: gateway.settings().questions_per_quiz,
            ..Default::default()
        };
        Self {
            store,
            gateway,
            selector: DifficultySelector::new(config),
            generation: AtomicU64::new(0),
        }
    }

    /// Start a new generation, superseding every earlier token.
    pub fn begin(&self) -> GenerationToken {
        GenerationToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: GenerationToken) -> bool {
        self.generation.load(Ordering::SeqCst) == token.0
    }

    /// Difficulty for the next quiz on a module.
    pub fn select_difficulty(
        &self,
        module_id: &str,
        profile: Option<&LearningProfile>,
    ) -> StoreResult<Difficulty> {
        let analytics = load_analytics(self.store.as_ref())?;
        let history = analytics
            .quiz_performance
            .get(module_id)
            .map(QuizHistory::from)
            .unwrap_or_default();
        Ok(self.selector.select(&history, profile))
    }

    /// Generate questions for a module. `Ok(None)` means a newer
    /// generation started while this one was waiting on the model.
    pub async fn prepare(&self, module_id: &str) -> ElaraResult<Option<PreparedQuiz>> {
        let token = self.begin();
        let store = self.store.as_ref();

        let module = find_module(store, module_id)?
            .ok_or_else(|| ElaraError::ModuleNotFound(module_id.to_string()))?;
        let profile = load_profile(store)?;
        let difficulty = self.select_difficulty(module_id, profile.as_ref())?;

        let (questions, notice) = match profile.as_ref() {
            Some(profile) => {
                let source = match module.quiz_source() {
                    "" => MISSING_CONTENT,
                    text => text,
                };
                let reply = self
                    .gateway
                    .generate_quiz(source, Some(profile), QuizMode::Adaptive(difficulty))
                    .await;
                let notice = reply.notice();
                let questions = reply
                    .into_value()
                    .into_iter()
                    .filter_map(|q| q.into_stored())
                    .collect();
                (questions, notice)
            }
            None => (vec![reflection_question()], None),
        };

        if !self.is_current(token) {
            debug!(module_id, token = token.0, "discarding superseded quiz generation");
            return Ok(None);
        }

        info!(
            module_id,
            difficulty = difficulty.as_str(),
            questions = questions.len(),
            "adaptive quiz ready"
        );
        Ok(Some(PreparedQuiz {
            token,
            module_id: module_id.to_string(),
            difficulty,
            questions,
            notice,
        }))
    }

    /// Record a finished attempt in analytics and progress and mark the
    /// module completed.
    pub fn finish(&self, module_id: &str, correct: u32, total: u32) -> ElaraResult<QuizOutcome> {
        let store = self.store.as_ref();
        let correct = correct.min(total);
        let average = record_quiz_performance(store, module_id, correct as f64, total as f64)?;
        complete_quiz(store, module_id, correct as f64)?;
        let progress = complete_module(store, module_id)?;
        Ok(QuizOutcome {
            correct,
            total,
            average,
            progress,
        })
    }
}

/// Single self-assessment question used when there is no profile.
fn reflection_question() -> QuizQuestion {
    QuizQuestion {
        question: "Apa yang telah Anda pelajari dari modul ini?".to_string(),
        options: ["Sedikit", "Cukup", "Banyak", "Sangat Banyak"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        answer: "Cukup".to_string(),
        explanation: "Penjelasan tidak tersedia".to_string(),
    }
}
