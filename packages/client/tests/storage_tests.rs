//! Repositories over a real SQLite file, plus the upload and adaptive quiz
//! flows end to end.

mod common;

use std::sync::Arc;

use common::{gateway, quiz_json, ScriptedModel, Step, DOCUMENT};
use elara_algo::{AnswerPolicy, DiagnosticAnswer, DIAGNOSTIC_QUESTIONS};
use elara_client::models::Module;
use elara_client::services::modules::{
    delete_module, load_all_modules, load_quiz, load_summary, save_module_info,
};
use elara_client::services::profile::submit_diagnostic;
use elara_client::services::quiz_session::AdaptiveQuizSession;
use elara_client::services::upload::{upload_module, UploadError, UploadRequest};
use elara_client::{ElaraError, KeyValueStore, SqliteStore};

fn open_store(dir: &tempfile::TempDir) -> SqliteStore {
    SqliteStore::open(dir.path().join("elara.db")).unwrap()
}

#[test]
fn module_round_trip_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let module = Module {
        id: "1717000000000".into(),
        title: "Fotosintesis.pdf".into(),
        summary: "Ringkasan fotosintesis".into(),
        upload_date: "2024-06-01T08:00:00.000Z".into(),
        question_count: 5,
        ..Default::default()
    };

    {
        let store = open_store(&dir);
        save_module_info(&store, &module).unwrap();
    }

    let store = open_store(&dir);
    let modules = load_all_modules(&store).unwrap();
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0].id, module.id);
    assert_eq!(modules[0].title, module.title);
    assert_eq!(modules[0].summary, module.summary);
}

#[tokio::test]
async fn upload_persists_module_quiz_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let summary = r#"{"summary": "Fotosintesis menghasilkan glukosa.", "learningStyleSummary": "Diagram alur cahaya.",
        "keyTopics": ["klorofil", "kloroplas"], "difficulty": "menengah", "estimatedTime": "20-30 menit",
        "learningObjectives": ["a", "b", "c"]}"#;
    let model = ScriptedModel::new(vec![
        Step::Reply(summary.to_string()),
        Step::Reply(quiz_json(5)),
    ]);
    let gw = gateway(model, 5);

    let outcome = upload_module(
        &store,
        &gw,
        UploadRequest {
            file_name: "fotosintesis.txt",
            size_bytes: DOCUMENT.len() as u64,
            text: DOCUMENT,
        },
    )
    .await
    .unwrap();

    assert!(outcome.notices.is_empty());
    assert_eq!(outcome.module.question_count, 5);
    assert!(outcome.report.ready_for_upload, "{:?}", outcome.report.errors);

    let id = &outcome.module.id;
    assert_eq!(load_quiz(&store, id).unwrap().len(), 5);
    assert_eq!(load_summary(&store, id).unwrap().unwrap().key_topics.len(), 2);

    assert!(delete_module(&store, id).unwrap());
    assert!(load_quiz(&store, id).unwrap().is_empty());
    assert!(load_summary(&store, id).unwrap().is_none());
}

#[tokio::test]
async fn upload_rejects_bad_files_before_calling_model() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let model = ScriptedModel::new(vec![]);
    let gw = gateway(model.clone(), 5);

    let err = upload_module(
        &store,
        &gw,
        UploadRequest {
            file_name: "foto.png",
            size_bytes: 10,
            text: DOCUMENT,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ElaraError::Upload(UploadError::UnsupportedFileType(_))));

    let err = upload_module(
        &store,
        &gw,
        UploadRequest {
            file_name: "kosong.txt",
            size_bytes: 3,
            text: "   ",
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ElaraError::Upload(UploadError::EmptyContent)));
    assert_eq!(model.calls(), 0);
    assert!(store.get("modules").unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn restarted_quiz_discards_stale_generation() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(open_store(&dir));

    let answers: Vec<DiagnosticAnswer> = DIAGNOSTIC_QUESTIONS
        .iter()
        .map(|q| DiagnosticAnswer::new(q.id, q.options[2]))
        .collect();
    submit_diagnostic(store.as_ref(), &answers, AnswerPolicy::Strict).unwrap();
    save_module_info(
        store.as_ref(),
        &Module {
            id: "m1".into(),
            title: "Bab 1".into(),
            original_content: DOCUMENT.into(),
            upload_date: "2024-06-01T08:00:00Z".into(),
            ..Default::default()
        },
    )
    .unwrap();

    // first generation hits an overload and waits out the retry delay
    let model = ScriptedModel::new(vec![
        Step::Status(503),
        Step::Reply(quiz_json(5)),
        Step::Reply(quiz_json(5)),
    ]);
    let session = Arc::new(AdaptiveQuizSession::new(Arc::clone(&store), gateway(model, 5)));

    let first = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.prepare("m1").await })
    };
    tokio::task::yield_now().await;
    let second = session.prepare("m1").await.unwrap();

    let first = first.await.unwrap().unwrap();
    assert!(first.is_none(), "superseded generation must be discarded");
    let second = second.expect("latest generation is kept");
    assert_eq!(second.questions.len(), 5);
    assert!(session.is_current(second.token));

    let outcome = session.finish("m1", 4, 5).unwrap();
    assert_eq!(outcome.average, 4.0);
}
