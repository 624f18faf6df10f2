//! AI gateway: prompt, call, parse, and fall back.
//!
//! Every public operation resolves to a value. Remote failures are retried
//! once after a fixed delay when the model reports overload, then replaced
//! by a deterministic local result; the reply records which path produced
//! it so hosts can tell the learner.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use elara_algo::LearningProfile;

use crate::config::Config;
use crate::models::{GeneratedQuestion, ModuleSummary};
use crate::services::fallback::{
    fallback_quiz, fallback_style_advice, fallback_summary, normalize_objectives, CHAT_FALLBACK,
};
use crate::services::json_extract::{parse_embedded, ExtractError, JsonShape};
use crate::services::llm_provider::{LLMError, LLMProvider, TextModel};
use crate::services::prompts::{self, QuizMode, SYSTEM_PROMPT};

/// Markers the model uses to say it could not read the document.
const EMPTY_DOCUMENT_MARKERS: [&str; 3] = [
    "DOKUMEN KOSONG",
    "Tidak dapat menganalisis dokumen",
    "Tidak dapat membuat soal",
];

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub timeout: Duration,
    pub retry_delay: Duration,
    pub questions_per_quiz: u32,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            retry_delay: Duration::from_secs(2),
            questions_per_quiz: elara_algo::DEFAULT_QUESTIONS_PER_QUIZ,
        }
    }
}

impl From<&Config> for GatewaySettings {
    fn from(config: &Config) -> Self {
        Self {
            timeout: config.llm.timeout,
            retry_delay: config.llm.retry_delay,
            questions_per_quiz: config.questions_per_quiz,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum FallbackReason {
    NotConfigured,
    Timeout,
    Overloaded,
    RemoteError(String),
    InvalidResponse(String),
}

impl From<&LLMError> for FallbackReason {
    fn from(err: &LLMError) -> Self {
        match err {
            LLMError::NotConfigured(_) => FallbackReason::NotConfigured,
            LLMError::Timeout(_) => FallbackReason::Timeout,
            e if e.is_overloaded() => FallbackReason::Overloaded,
            e => FallbackReason::RemoteError(e.to_string()),
        }
    }
}

impl From<ExtractError> for FallbackReason {
    fn from(err: ExtractError) -> Self {
        FallbackReason::InvalidResponse(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum Provenance {
    Remote,
    Fallback { reason: FallbackReason },
}

/// A gateway result and where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayReply<T> {
    pub value: T,
    pub provenance: Provenance,
}

impl<T> GatewayReply<T> {
    fn remote(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Remote,
        }
    }

    fn fallback(value: T, reason: FallbackReason) -> Self {
        Self {
            value,
            provenance: Provenance::Fallback { reason },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.provenance, Provenance::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match &self.provenance {
            Provenance::Fallback { reason } => Some(reason),
            Provenance::Remote => None,
        }
    }

    /// Learner-facing notice when the local fallback was used.
    pub fn notice(&self) -> Option<&'static str> {
        self.fallback_reason().map(|reason| match reason {
            FallbackReason::NotConfigured => {
                "Layanan AI belum dikonfigurasi. Menggunakan hasil sederhana dari isi dokumen."
            }
            FallbackReason::Overloaded | FallbackReason::Timeout => {
                "Layanan AI sedang sibuk. Menggunakan hasil sederhana dari isi dokumen."
            }
            _ => {
                "Terjadi kesalahan pada layanan AI. Menggunakan hasil sederhana dari isi dokumen."
            }
        })
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleAdvice {
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub adaptive_content: String,
    #[serde(default)]
    pub strategy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiKeyStatus {
    pub success: bool,
    pub message: String,
}

#[derive(Clone)]
pub struct AiGateway {
    model: Arc<dyn TextModel>,
    settings: GatewaySettings,
}

impl AiGateway {
    pub fn new(model: Arc<dyn TextModel>, settings: GatewaySettings) -> Self {
        Self { model, settings }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(LLMProvider::new(config.llm.clone())),
            GatewaySettings::from(config),
        )
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    pub async fn summarize(
        &self,
        text: &str,
        profile: Option<&LearningProfile>,
    ) -> GatewayReply<ModuleSummary> {
        let prompt = prompts::summary_prompt(text, profile);
        let result = match self.call_model(&prompt).await {
            Ok(raw) => parse_summary(&raw),
            Err(err) => Err(FallbackReason::from(&err)),
        };

        match result {
            Ok(summary) => GatewayReply::remote(finish_summary(summary)),
            Err(reason) => {
                warn!(?reason, "summary generation fell back to local heuristic");
                GatewayReply::fallback(finish_summary(fallback_summary(text)), reason)
            }
        }
    }

    pub async fn generate_quiz(
        &self,
        text: &str,
        profile: Option<&LearningProfile>,
        mode: QuizMode,
    ) -> GatewayReply<Vec<GeneratedQuestion>> {
        let count = self.settings.questions_per_quiz.max(1);
        let prompt = prompts::quiz_prompt(text, profile, mode, count);
        let result = match self.call_model(&prompt).await {
            Ok(raw) => parse_questions(&raw, count as usize),
            Err(err) => Err(FallbackReason::from(&err)),
        };

        match result {
            Ok(questions) => GatewayReply::remote(questions),
            Err(reason) => {
                warn!(
                    ?reason,
                    mode = mode.as_str(),
                    "quiz generation fell back to local heuristic"
                );
                GatewayReply::fallback(fallback_quiz(text, count), reason)
            }
        }
    }

    pub async fn chat(&self, question: &str, context: &str) -> GatewayReply<String> {
        let prompt = prompts::chat_prompt(question, context);
        match self.call_model(&prompt).await {
            Ok(answer) if !answer.trim().is_empty() => {
                GatewayReply::remote(answer.trim().to_string())
            }
            Ok(_) => GatewayReply::fallback(
                CHAT_FALLBACK.to_string(),
                FallbackReason::InvalidResponse("empty answer".to_string()),
            ),
            Err(err) => {
                let reason = FallbackReason::from(&err);
                warn!(?reason, "chat fell back to apology");
                GatewayReply::fallback(CHAT_FALLBACK.to_string(), reason)
            }
        }
    }

    pub async fn analyze_learning_style(
        &self,
        profile: &LearningProfile,
    ) -> GatewayReply<StyleAdvice> {
        let prompt = prompts::style_advice_prompt(profile);
        let result = match self.call_model(&prompt).await {
            Ok(raw) => parse_embedded::<StyleAdvice>(&raw, JsonShape::Object)
                .map_err(FallbackReason::from)
                .and_then(|advice| {
                    if advice.recommendations.is_empty() {
                        Err(FallbackReason::InvalidResponse("no recommendations".to_string()))
                    } else {
                        Ok(advice)
                    }
                }),
            Err(err) => Err(FallbackReason::from(&err)),
        };

        match result {
            Ok(advice) => GatewayReply::remote(advice),
            Err(reason) => {
                warn!(?reason, "style analysis fell back to defaults");
                GatewayReply::fallback(fallback_style_advice(), reason)
            }
        }
    }

    /// Send the model a short prompt to check the key. No retry.
    pub async fn check_api_key(&self) -> ApiKeyStatus {
        if !self.model.is_available() {
            return ApiKeyStatus {
                success: false,
                message: "API key tidak ditemukan atau tidak valid".to_string(),
            };
        }
        match self.attempt(prompts::API_KEY_CHECK_PROMPT).await {
            Ok(text) if !text.trim().is_empty() => ApiKeyStatus {
                success: true,
                message: "API key valid dan berfungsi".to_string(),
            },
            Ok(_) => ApiKeyStatus {
                success: false,
                message: "API key diterima tetapi tidak menghasilkan respon".to_string(),
            },
            Err(err) => ApiKeyStatus {
                success: false,
                message: format!("API key bermasalah: {err}"),
            },
        }
    }

    /// One attempt, plus one delayed retry when the model is overloaded.
    async fn call_model(&self, prompt: &str) -> Result<String, LLMError> {
        if !self.model.is_available() {
            return Err(LLMError::NotConfigured("LLM_API_KEY"));
        }

        match self.attempt(prompt).await {
            Err(err) if err.is_overloaded() => {
                info!(
                    delay_ms = self.settings.retry_delay.as_millis() as u64,
                    error = %err,
                    "model overloaded, retrying once"
                );
                sleep(self.settings.retry_delay).await;
                self.attempt(prompt).await
            }
            other => other,
        }
    }

    async fn attempt(&self, prompt: &str) -> Result<String, LLMError> {
        let started = std::time::Instant::now();
        let result = timeout(self.settings.timeout, self.model.complete(SYSTEM_PROMPT, prompt))
            .await
            .map_err(|_| LLMError::Timeout(self.settings.timeout.as_millis() as u64))?;
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "model call finished"
        );
        result
    }
}

fn unreadable_document() -> FallbackReason {
    FallbackReason::InvalidResponse("model could not read the document".to_string())
}

fn mentions_empty_document(raw: &str) -> bool {
    EMPTY_DOCUMENT_MARKERS.iter().any(|m| raw.contains(m))
}

fn parse_summary(raw: &str) -> Result<ModuleSummary, FallbackReason> {
    if mentions_empty_document(raw) {
        return Err(unreadable_document());
    }
    let summary: ModuleSummary = parse_embedded(raw, JsonShape::Object)?;
    if summary.summary.trim().is_empty() && summary.learning_style_summary.trim().is_empty() {
        return Err(FallbackReason::InvalidResponse("summary is empty".to_string()));
    }
    Ok(summary)
}

/// Well-formed questions only, at most `limit`.
fn parse_questions(raw: &str, limit: usize) -> Result<Vec<GeneratedQuestion>, FallbackReason> {
    if mentions_empty_document(raw) {
        return Err(unreadable_document());
    }
    let items: Vec<serde_json::Value> = parse_embedded(raw, JsonShape::Array)?;
    let total = items.len();
    let questions: Vec<GeneratedQuestion> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<GeneratedQuestion>(item).ok())
        .filter(GeneratedQuestion::is_well_formed)
        .take(limit)
        .collect();

    if questions.is_empty() {
        return Err(FallbackReason::InvalidResponse(format!(
            "none of {total} questions were well formed"
        )));
    }
    if questions.len() < total.min(limit) {
        debug!(kept = questions.len(), total, "dropped malformed questions");
    }
    Ok(questions)
}

fn finish_summary(mut summary: ModuleSummary) -> ModuleSummary {
    if summary.summary.trim().is_empty() {
        summary.summary = if summary.learning_style_summary.trim().is_empty() {
            "Ringkasan tidak tersedia.".to_string()
        } else {
            summary.learning_style_summary.clone()
        };
    }
    summary.learning_objectives =
        normalize_objectives(std::mem::take(&mut summary.learning_objectives));
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_questions_filters_and_limits() {
        let raw = r#"Tentu! ```json
[
  {"question": "Q1", "options": ["a","b","c","d"], "correctAnswer": 1, "explanation": "e"},
  {"question": "Q2", "options": ["a","b"], "correctAnswer": 0},
  {"question": "Q3", "options": ["a","b","c","d"], "correctAnswer": 7},
  {"question": "Q4", "options": ["a","b","c","d"], "correctAnswer": 3},
  {"question": "Q5", "options": ["a","b","c","d"], "correctAnswer": 0}
]
```"#;
        let questions = parse_questions(raw, 2).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question, "Q1");
        assert_eq!(questions[1].question, "Q4");
    }

    #[test]
    fn parse_questions_rejects_all_malformed() {
        let err = parse_questions(r#"[{"question": "Q", "options": []}]"#, 5).unwrap_err();
        assert!(matches!(err, FallbackReason::InvalidResponse(_)));
    }

    #[test]
    fn parse_summary_detects_empty_document_marker() {
        let err = parse_summary("Tidak dapat menganalisis dokumen karena kosong").unwrap_err();
        assert!(matches!(err, FallbackReason::InvalidResponse(_)));
    }

    #[test]
    fn finish_summary_fills_gaps() {
        let summary = finish_summary(ModuleSummary {
            learning_style_summary: "gaya".into(),
            learning_objectives: vec!["a".into()],
            ..Default::default()
        });
        assert_eq!(summary.summary, "gaya");
        assert_eq!(summary.learning_objectives.len(), 3);
    }

    #[test]
    fn fallback_reason_from_errors() {
        assert_eq!(
            FallbackReason::from(&LLMError::NotConfigured("LLM_API_KEY")),
            FallbackReason::NotConfigured
        );
        assert_eq!(FallbackReason::from(&LLMError::Timeout(5)), FallbackReason::Timeout);
        let overloaded = LLMError::HttpStatus {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            body: String::new(),
        };
        assert_eq!(FallbackReason::from(&overloaded), FallbackReason::Overloaded);
    }

    #[test]
    fn reply_notice_only_for_fallback() {
        let remote = GatewayReply::remote(1);
        assert!(remote.notice().is_none());
        let local = GatewayReply::fallback(1, FallbackReason::Overloaded);
        assert!(local.is_fallback());
        assert!(local.notice().unwrap().contains("sibuk"));
    }
}
