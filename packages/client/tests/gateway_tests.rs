//! AI gateway behavior against a scripted model: retry on overload,
//! timeouts, and the deterministic fallbacks.

mod common;

use std::time::Duration;

use common::{gateway, quiz_json, ScriptedModel, Step, DOCUMENT};
use elara_algo::{Difficulty, LearningProfile, LearningStyle};
use elara_client::services::fallback::CHAT_FALLBACK;
use elara_client::services::prompts::QuizMode;
use elara_client::{FallbackReason, Provenance};

fn profile() -> LearningProfile {
    LearningProfile {
        learning_style: LearningStyle::Visual,
        ability: 2,
        focus_time: "30-45 menit".into(),
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn overload_then_success_returns_remote_quiz() {
    let model = ScriptedModel::new(vec![Step::Status(503), Step::Reply(quiz_json(5))]);
    let gw = gateway(model.clone(), 5);

    let started = tokio::time::Instant::now();
    let reply = gw.generate_quiz(DOCUMENT, Some(&profile()), QuizMode::Review).await;

    assert_eq!(reply.provenance, Provenance::Remote);
    assert_eq!(reply.value.len(), 5);
    assert_eq!(model.calls(), 2);
    assert!(started.elapsed() >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn two_overloads_fall_back_within_question_limit() {
    let model = ScriptedModel::new(vec![Step::Status(503), Step::Status(503)]);
    let gw = gateway(model.clone(), 3);

    let reply = gw.generate_quiz(DOCUMENT, Some(&profile()), QuizMode::Review).await;

    assert!(reply.is_fallback());
    assert_eq!(reply.fallback_reason(), Some(&FallbackReason::Overloaded));
    assert!(!reply.value.is_empty());
    assert!(reply.value.len() <= 3);
    assert!(reply.value.iter().all(|q| q.is_well_formed()));
    assert_eq!(model.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn non_overload_errors_are_not_retried() {
    let model = ScriptedModel::new(vec![Step::Status(400), Step::Reply(quiz_json(5))]);
    let gw = gateway(model.clone(), 5);

    let reply = gw.summarize(DOCUMENT, None).await;

    assert!(reply.is_fallback());
    assert!(matches!(reply.fallback_reason(), Some(FallbackReason::RemoteError(_))));
    assert!(reply.value.summary.starts_with("Ringkasan:"));
    assert_eq!(model.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn hanging_model_times_out() {
    let model = ScriptedModel::new(vec![Step::Hang]);
    let gw = gateway(model.clone(), 5);

    let reply = gw.chat("Apa itu klorofil?", "Modul fotosintesis").await;

    assert_eq!(reply.value, CHAT_FALLBACK);
    assert_eq!(reply.fallback_reason(), Some(&FallbackReason::Timeout));
    assert!(reply.notice().is_some());
}

#[tokio::test]
async fn unavailable_model_is_never_called() {
    let model = ScriptedModel::unavailable();
    let gw = gateway(model.clone(), 5);

    let quiz = gw.generate_quiz(DOCUMENT, None, QuizMode::Adaptive(Difficulty::Easy)).await;
    let advice = gw.analyze_learning_style(&profile()).await;
    let status = gw.check_api_key().await;

    assert_eq!(quiz.fallback_reason(), Some(&FallbackReason::NotConfigured));
    assert_eq!(advice.value.recommendations.len(), 3);
    assert!(!status.success);
    assert_eq!(status.message, "API key tidak ditemukan atau tidak valid");
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn summary_is_parsed_from_prose() {
    let raw = "Berikut ringkasannya:\n{\"summary\": \"Fotosintesis mengubah cahaya menjadi energi.\", \
               \"keyTopics\": [\"klorofil\"], \"difficulty\": \"mudah\", \"learningObjectives\": [\"Memahami fotosintesis\"]}\nSelesai.";
    let model = ScriptedModel::new(vec![Step::Reply(raw.to_string())]);
    let gw = gateway(model.clone(), 5);

    let reply = gw.summarize(DOCUMENT, Some(&profile())).await;

    assert_eq!(reply.provenance, Provenance::Remote);
    assert_eq!(reply.value.key_topics, vec!["klorofil".to_string()]);
    assert_eq!(reply.value.learning_objectives.len(), 3);
    assert_eq!(reply.value.learning_objectives[0], "Memahami fotosintesis");
    assert!(model.last_prompt().unwrap().contains("Skor Visual"));
}

#[tokio::test]
async fn malformed_quiz_falls_back() {
    let model = ScriptedModel::new(vec![Step::Reply("Maaf, saya tidak bisa.".to_string())]);
    let gw = gateway(model.clone(), 5);

    let reply = gw.generate_quiz(DOCUMENT, None, QuizMode::Review).await;

    assert!(matches!(reply.fallback_reason(), Some(FallbackReason::InvalidResponse(_))));
    assert!(!reply.value.is_empty());
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn remote_quiz_is_truncated_to_limit() {
    let model = ScriptedModel::new(vec![Step::Reply(quiz_json(8))]);
    let gw = gateway(model, 5);

    let reply = gw
        .generate_quiz(DOCUMENT, Some(&profile()), QuizMode::Adaptive(Difficulty::Hard))
        .await;

    assert_eq!(reply.provenance, Provenance::Remote);
    assert_eq!(reply.value.len(), 5);
}

#[tokio::test]
async fn api_key_check_reports_outcome() {
    let model = ScriptedModel::new(vec![Step::Reply("Ya, berfungsi.".to_string())]);
    let status = gateway(model, 5).check_api_key().await;
    assert!(status.success);
    assert_eq!(status.message, "API key valid dan berfungsi");

    let model = ScriptedModel::new(vec![Step::Status(401)]);
    let status = gateway(model, 5).check_api_key().await;
    assert!(!status.success);
    assert!(status.message.starts_with("API key bermasalah:"));
}
