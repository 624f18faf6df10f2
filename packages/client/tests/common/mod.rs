#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use elara_client::{AiGateway, GatewaySettings, LLMError, TextModel};

/// One scripted model turn.
pub enum Step {
    Reply(String),
    Status(u16),
    /// Never resolves within any reasonable timeout
    Hang,
}

/// Text model that plays back a fixed script and counts calls.
pub struct ScriptedModel {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
    available: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
            available: true,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            available: false,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn complete(&self, _system: &str, user: &str) -> Result<String, LLMError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(user.to_string());
        let step = self.steps.lock().pop_front();
        match step {
            Some(Step::Reply(text)) => Ok(text),
            Some(Step::Status(code)) => Err(LLMError::HttpStatus {
                status: reqwest::StatusCode::from_u16(code).unwrap(),
                body: "scripted failure".to_string(),
            }),
            Some(Step::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(LLMError::EmptyChoices)
            }
            None => Err(LLMError::EmptyChoices),
        }
    }
}

pub fn settings(questions_per_quiz: u32) -> GatewaySettings {
    GatewaySettings {
        timeout: Duration::from_secs(5),
        retry_delay: Duration::from_secs(2),
        questions_per_quiz,
    }
}

pub fn gateway(model: Arc<ScriptedModel>, questions_per_quiz: u32) -> AiGateway {
    AiGateway::new(model, settings(questions_per_quiz))
}

pub fn quiz_json(count: usize) -> String {
    let items: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"{{"question": "Pertanyaan nomor {i} tentang fotosintesis?", "options": ["Klorofil", "Glukosa", "Oksigen", "Air"], "correctAnswer": {}, "explanation": "Dijelaskan pada paragraf pertama modul."}}"#,
                i % 4
            )
        })
        .collect();
    format!("```json\n[{}]\n```", items.join(",\n"))
}

pub const DOCUMENT: &str = "Fotosintesis adalah proses tumbuhan mengubah cahaya menjadi energi kimia. \
    Klorofil menyerap cahaya matahari pada daun tumbuhan hijau. \
    Karbon dioksida dan air diubah menjadi glukosa serta oksigen. \
    Proses ini berlangsung di dalam kloroplas sel tumbuhan. \
    Hasil fotosintesis menjadi sumber energi bagi makhluk hidup lainnya. \
    Tanpa fotosintesis kehidupan di bumi tidak akan bertahan lama.";
