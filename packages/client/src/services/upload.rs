//! Module upload: validate, summarize, generate the review quiz, persist.

use chrono::{SecondsFormat, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::ElaraResult;
use crate::models::{Module, ModuleSummary, QuizQuestion};
use crate::services::ai_gateway::AiGateway;
use crate::services::modules::{generate_module_id, save_module_info, save_quiz, save_summary};
use crate::services::profile::load_profile;
use crate::services::prompts::QuizMode;
use crate::services::validator::{
    validate_complete_module, validate_text_content, validate_upload_file, ValidationReport,
};
use crate::store::KeyValueStore;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Format file tidak didukung: {0}. Gunakan PDF, DOC, DOCX, atau TXT.")]
    UnsupportedFileType(String),
    #[error("Ukuran file {size} byte melebihi batas {max} byte.")]
    FileTooLarge { size: u64, max: u64 },
    #[error("Tidak dapat mengekstrak teks dari file. File mungkin kosong atau tidak didukung.")]
    EmptyContent,
}

/// A document whose text has already been extracted by the host.
#[derive(Clone, Debug)]
pub struct UploadRequest<'a> {
    pub file_name: &'a str,
    pub size_bytes: u64,
    pub text: &'a str,
}

#[derive(Clone, Debug)]
pub struct UploadOutcome {
    pub module: Module,
    pub summary: ModuleSummary,
    pub questions: Vec<QuizQuestion>,
    pub report: ValidationReport,
    /// Learner-facing notices for steps that used a local fallback
    pub notices: Vec<&'static str>,
}

pub async fn upload_module(
    store: &dyn KeyValueStore,
    gateway: &AiGateway,
    request: UploadRequest<'_>,
) -> ElaraResult<UploadOutcome> {
    validate_upload_file(request.file_name, request.size_bytes)?;
    if !validate_text_content(request.text).is_valid {
        return Err(UploadError::EmptyContent.into());
    }

    let profile = load_profile(store)?;
    let summary_reply = gateway.summarize(request.text, profile.as_ref()).await;
    let quiz_reply = gateway
        .generate_quiz(request.text, profile.as_ref(), QuizMode::Review)
        .await;

    let notices: Vec<&'static str> = [summary_reply.notice(), quiz_reply.notice()]
        .into_iter()
        .flatten()
        .collect();
    let summary = summary_reply.into_value();
    let questions: Vec<QuizQuestion> = quiz_reply
        .into_value()
        .into_iter()
        .filter_map(|q| q.into_stored())
        .collect();

    let module = Module {
        id: generate_module_id(),
        title: request.file_name.to_string(),
        original_content: request.text.to_string(),
        summary: summary.summary.clone(),
        learning_style_summary: summary.learning_style_summary.clone(),
        key_topics: summary.key_topics.clone(),
        difficulty: summary.difficulty.clone(),
        estimated_time: summary.estimated_time.clone(),
        learning_objectives: summary.learning_objectives.clone(),
        upload_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        question_count: questions.len() as u32,
    };

    let report = validate_complete_module(request.text, &questions, &module);
    if !report.ready_for_upload {
        warn!(
            module_id = %module.id,
            errors = ?report.errors,
            "module saved with validation errors"
        );
    }

    if !questions.is_empty() {
        save_quiz(store, &module.id, &questions)?;
    }
    save_summary(store, &module.id, &summary)?;
    save_module_info(store, &module)?;

    info!(
        module_id = %module.id,
        questions = questions.len(),
        quality = report.overall_quality,
        fallback_steps = notices.len(),
        "module uploaded"
    );

    Ok(UploadOutcome {
        module,
        summary,
        questions,
        report,
        notices,
    })
}
