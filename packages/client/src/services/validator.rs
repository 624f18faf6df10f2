//! Quality checks for uploaded module text, generated quizzes and module
//! records. Findings are collected, never thrown: errors block an upload,
//! warnings only lower the reported quality.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use crate::models::{Module, QuizQuestion};
use crate::services::upload::UploadError;

pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["pdf", "doc", "docx", "txt"];

const MIN_TEXT_CHARS: usize = 100;
const MIN_TEXT_WORDS: usize = 20;
const RECOMMENDED_QUESTIONS: usize = 5;
const MAX_SCORED_QUESTIONS: usize = 10;
const LONG_QUIZ_QUESTIONS: usize = 20;
const MIN_QUESTION_CHARS: usize = 10;
const MIN_EXPLANATION_CHARS: usize = 10;
const REQUIRED_OPTIONS: usize = 4;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TextMetrics {
    pub characters: usize,
    pub words: usize,
    pub sentences: usize,
    pub lines: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub metrics: Option<TextMetrics>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// 0-100
    pub score: u32,
    pub valid_question_count: usize,
    pub total_questions: usize,
    pub quality_percentage: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub text: TextValidation,
    pub quiz: QuizValidation,
    pub info: InfoValidation,
    pub overall_quality: u32,
    pub ready_for_upload: bool,
}

/// Common view over quiz and complete-module results.
pub trait QualityAssessment {
    fn errors(&self) -> &[String];
    fn warnings(&self) -> &[String];
    fn quality_score(&self) -> u32;
    fn total_questions(&self) -> usize;
}

impl QualityAssessment for QuizValidation {
    fn errors(&self) -> &[String] {
        &self.errors
    }
    fn warnings(&self) -> &[String] {
        &self.warnings
    }
    fn quality_score(&self) -> u32 {
        self.score
    }
    fn total_questions(&self) -> usize {
        self.total_questions
    }
}

impl QualityAssessment for ValidationReport {
    fn errors(&self) -> &[String] {
        &self.errors
    }
    fn warnings(&self) -> &[String] {
        &self.warnings
    }
    fn quality_score(&self) -> u32 {
        self.overall_quality
    }
    fn total_questions(&self) -> usize {
        self.quiz.total_questions
    }
}

pub fn validate_text_content(text: &str) -> TextValidation {
    if text.is_empty() {
        return TextValidation {
            errors: vec!["Teks kosong. File mungkin kosong atau gagal diekstrak.".to_string()],
            ..Default::default()
        };
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return TextValidation {
            errors: vec!["Teks hanya mengandung spasi atau karakter kosong.".to_string()],
            ..Default::default()
        };
    }

    let mut warnings = Vec::new();
    let characters = trimmed.chars().count();
    let words = trimmed.split_whitespace().count();
    let lines = text.lines().count();

    if characters < MIN_TEXT_CHARS {
        warnings.push(format!(
            "Teks sangat singkat ({characters} karakter). Kualitas kuis mungkin berkurang."
        ));
    }
    if words < MIN_TEXT_WORDS {
        warnings.push(format!(
            "Teks hanya mengandung {words} kata. Minimal 20 kata diperlukan untuk kuis yang baik."
        ));
    }
    let lower = text.to_lowercase();
    if lower.contains("scanned") || lower.contains("[image]") || (lines > 100 && words < 50) {
        warnings.push(
            "File mungkin adalah PDF berbasis gambar. Hasil ekstraksi mungkin tidak akurat."
                .to_string(),
        );
    }

    TextValidation {
        is_valid: true,
        errors: Vec::new(),
        warnings,
        metrics: Some(TextMetrics {
            characters,
            words,
            sentences: trimmed
                .split(['.', '!', '?'])
                .filter(|s| !s.trim().is_empty())
                .count(),
            lines,
        }),
    }
}

pub fn validate_quiz_questions(questions: &[QuizQuestion]) -> QuizValidation {
    if questions.is_empty() {
        return QuizValidation {
            errors: vec!["Tidak ada pertanyaan kuis yang dihasilkan.".to_string()],
            ..Default::default()
        };
    }

    let total = questions.len();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut score = match total {
        n if n < RECOMMENDED_QUESTIONS => {
            warnings.push(format!("Hanya {n} pertanyaan dihasilkan. Minimal 5 disarankan."));
            0.0
        }
        n if n <= MAX_SCORED_QUESTIONS => 20.0,
        _ => 25.0,
    };

    let mut valid = 0usize;
    for (i, q) in questions.iter().enumerate() {
        let n = i + 1;
        let mut question_errors = Vec::new();

        let text = q.question.trim();
        if text.is_empty() {
            question_errors.push(format!("Pertanyaan {n}: tidak memiliki teks pertanyaan"));
        } else if text.chars().count() < MIN_QUESTION_CHARS {
            question_errors.push(format!("Pertanyaan {n}: teks pertanyaan terlalu singkat"));
        }

        if q.options.len() != REQUIRED_OPTIONS {
            question_errors.push(format!(
                "Pertanyaan {n}: harus memiliki 4 opsi (memiliki {})",
                q.options.len()
            ));
        } else {
            if q.options.iter().any(|o| o.trim().is_empty()) {
                question_errors
                    .push(format!("Pertanyaan {n}: beberapa opsi kosong atau tidak valid"));
            }
            let unique: HashSet<String> = q.options.iter().map(|o| o.to_lowercase()).collect();
            if unique.len() < q.options.len() {
                warnings.push(format!("Pertanyaan {n}: ada opsi yang duplikat"));
            }
        }

        if q.answer.is_empty() {
            question_errors.push(format!("Pertanyaan {n}: tidak memiliki jawaban yang valid"));
        } else if !q.options.contains(&q.answer) {
            question_errors.push(format!("Pertanyaan {n}: jawaban tidak ada dalam opsi"));
        }

        let explanation = q.explanation.trim();
        if explanation.is_empty() {
            warnings.push(format!("Pertanyaan {n}: tidak memiliki penjelasan"));
        } else if explanation.chars().count() < MIN_EXPLANATION_CHARS {
            warnings.push(format!("Pertanyaan {n}: penjelasan terlalu singkat"));
        }

        if question_errors.is_empty() {
            valid += 1;
            score += 80.0 / total as f64;
        } else {
            errors.append(&mut question_errors);
        }
    }

    if total >= 2 {
        let unique: HashSet<String> = questions.iter().map(|q| q.question.to_lowercase()).collect();
        if (unique.len() as f64) < total as f64 * 0.8 {
            warnings.push(
                "Beberapa pertanyaan tampak sangat mirip. Coba tingkatkan keragaman pertanyaan."
                    .to_string(),
            );
        }
    }

    QuizValidation {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        score: score.round().min(100.0) as u32,
        valid_question_count: valid,
        total_questions: total,
        quality_percentage: valid as f64 / total as f64 * 100.0,
    }
}

pub fn validate_module_info(module: &Module) -> InfoValidation {
    let mut errors = Vec::new();
    if module.id.trim().is_empty() {
        errors.push("Module ID tidak ada.".to_string());
    }
    if module.title.trim().is_empty() {
        errors.push("Judul modul tidak valid.".to_string());
    }
    if module.upload_date.trim().is_empty() {
        errors.push("Tanggal upload tidak ada.".to_string());
    } else if chrono::DateTime::parse_from_rfc3339(&module.upload_date).is_err() {
        errors.push("Format tanggal upload tidak valid.".to_string());
    }
    InfoValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}

pub fn validate_complete_module(
    text: &str,
    quiz: &[QuizQuestion],
    module: &Module,
) -> ValidationReport {
    let text = validate_text_content(text);
    let quiz = validate_quiz_questions(quiz);
    let info = validate_module_info(module);

    let errors: Vec<String> = text
        .errors
        .iter()
        .chain(&quiz.errors)
        .chain(&info.errors)
        .cloned()
        .collect();
    let warnings: Vec<String> = text.warnings.iter().chain(&quiz.warnings).cloned().collect();
    let ok = errors.is_empty();

    ValidationReport {
        is_valid: ok,
        errors,
        warnings,
        overall_quality: quiz.score,
        text,
        quiz,
        info,
        ready_for_upload: ok,
    }
}

pub fn quality_message(result: &impl QualityAssessment) -> String {
    if !result.errors().is_empty() {
        return format!("❌ Validasi gagal: {} error ditemukan.", result.errors().len());
    }
    if !result.warnings().is_empty() {
        return format!("⚠️ Modul valid tetapi ada {} peringatan.", result.warnings().len());
    }
    let score = result.quality_score();
    match score {
        90.. => format!("✅ Kualitas Excellent! Skor: {score}/100"),
        75..=89 => format!("✅ Kualitas Good! Skor: {score}/100"),
        60..=74 => format!(
            "⚠️ Kualitas Fair! Skor: {score}/100. Coba gunakan file dengan konten lebih lengkap."
        ),
        _ => format!(
            "⚠️ Kualitas Poor! Skor: {score}/100. Disarankan menggunakan file dengan konten lebih terstruktur."
        ),
    }
}

pub fn suggest_improvements(result: &impl QualityAssessment) -> Vec<String> {
    let mut suggestions = Vec::new();
    if !result.errors().is_empty() {
        suggestions.push("Perbaiki error yang tercantum sebelum upload.".to_string());
    }
    if !result.warnings().is_empty() {
        suggestions.push(format!(
            "Ada {} peringatan. Pertimbangkan untuk perbaiki.",
            result.warnings().len()
        ));
    }
    let total = result.total_questions();
    if total > 0 && total < RECOMMENDED_QUESTIONS {
        suggestions
            .push("Tambahkan minimal 5 pertanyaan untuk kuis yang komprehensif.".to_string());
    }
    if total > LONG_QUIZ_QUESTIONS {
        suggestions
            .push("Pertanyaan lebih dari 20 mungkin membuat kuis terlalu panjang.".to_string());
    }
    suggestions
}

/// Accept files up to 10 MiB with a supported extension.
pub fn validate_upload_file(file_name: &str, size_bytes: u64) -> Result<(), UploadError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(UploadError::UnsupportedFileType(file_name.to_string()));
    }
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(UploadError::FileTooLarge {
            size: size_bytes,
            max: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}
