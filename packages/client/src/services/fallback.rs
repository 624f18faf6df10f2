//! Deterministic local stand-ins used when the remote model is unavailable.

use crate::models::{GeneratedQuestion, ModuleSummary};
use crate::services::ai_gateway::StyleAdvice;

/// Characters of the document scanned for a fallback summary
const SUMMARY_SCAN_CHARS: usize = 1000;
/// Characters of the document scanned for fallback questions
const QUIZ_SCAN_CHARS: usize = 2000;
const MIN_SUMMARY_SENTENCE_CHARS: usize = 10;
const MIN_QUIZ_SENTENCE_CHARS: usize = 15;
const KEY_TOPIC_CHARS: usize = 50;
const MAX_BLANK_CANDIDATES: usize = 10;

pub const CHAT_FALLBACK: &str =
    "Mohon maaf, layanan AI sedang tidak tersedia. Silakan coba lagi nanti.";

pub const DEFAULT_OBJECTIVES: [&str; 3] = [
    "Memahami konsep utama dari modul",
    "Mengidentifikasi informasi penting dalam materi",
    "Mengaplikasikan pengetahuan dalam konteks nyata",
];

const GENERIC_OPTIONS: [&str; 4] = ["Opsi A", "Opsi B", "Opsi C", "Opsi D"];
const BLANK: &str = "...";

pub fn fallback_summary(text: &str) -> ModuleSummary {
    let sentences = sentences(prefix(text, SUMMARY_SCAN_CHARS), MIN_SUMMARY_SENTENCE_CHARS);

    let first = sentences
        .first()
        .copied()
        .unwrap_or("Konten tidak dapat diekstrak secara lengkap.");
    let summary = match sentences.get(1) {
        Some(second) => format!("Ringkasan: {first} {second}"),
        None => format!("Ringkasan: {first}"),
    };

    let mut key_topics: Vec<String> = sentences
        .iter()
        .take(3)
        .map(|s| format!("{}...", prefix(s, KEY_TOPIC_CHARS)))
        .collect();
    if key_topics.is_empty() {
        key_topics.push("Tidak dapat mengekstrak topik dari dokumen".to_string());
    }

    ModuleSummary {
        summary,
        learning_style_summary: "Ringkasan dari konten disesuaikan berdasarkan isi dokumen."
            .to_string(),
        key_topics,
        difficulty: "menengah".to_string(),
        estimated_time: "30-45 menit".to_string(),
        learning_objectives: DEFAULT_OBJECTIVES.iter().map(|s| s.to_string()).collect(),
    }
}

/// Exactly three non-empty objectives, padded from [`DEFAULT_OBJECTIVES`].
pub fn normalize_objectives(objectives: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = objectives
        .into_iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .take(DEFAULT_OBJECTIVES.len())
        .collect();
    while out.len() < DEFAULT_OBJECTIVES.len() {
        out.push(DEFAULT_OBJECTIVES[out.len()].to_string());
    }
    out
}

/// Fill-in-the-blank questions built from the document itself.
///
/// Never returns an empty list and never more than `max_questions` (at
/// least one).
pub fn fallback_quiz(text: &str, max_questions: u32) -> Vec<GeneratedQuestion> {
    let limit = max_questions.max(1) as usize;
    let sentences = sentences(prefix(text, QUIZ_SCAN_CHARS), MIN_QUIZ_SENTENCE_CHARS);
    if sentences.is_empty() {
        return vec![unprocessable_content_question()];
    }

    let vocabulary = vocabulary(text);
    // unusable sentences are skipped, so later ones can fill the quiz
    let mut questions: Vec<GeneratedQuestion> = Vec::with_capacity(limit);
    for sentence in &sentences {
        if questions.len() == limit {
            break;
        }
        if let Some(question) = blank_question(sentence, questions.len(), &vocabulary) {
            questions.push(question);
        }
    }

    if questions.is_empty() {
        vec![sample_question()]
    } else {
        questions
    }
}

pub fn fallback_style_advice() -> StyleAdvice {
    StyleAdvice {
        recommendations: vec![
            "Gunakan diagram, grafik, dan visualisasi untuk memahami konsep-konsep kompleks."
                .to_string(),
            "Usahakan belajar dalam sesi 30-45 menit dengan istirahat 5 menit di antaranya."
                .to_string(),
            "Latih pemahaman dengan mengerjakan kuis setelah setiap modul.".to_string(),
        ],
        adaptive_content:
            "Konten akan disesuaikan dengan gaya belajar dan tingkat pemahaman awal Anda."
                .to_string(),
        strategy: "Kami akan menyesuaikan jenis materi dengan preferensi belajar Anda.".to_string(),
    }
}

fn blank_question(sentence: &str, index: usize, vocabulary: &[&str]) -> Option<GeneratedQuestion> {
    let tokens: Vec<&str> = sentence.split_whitespace().collect();
    let candidates: Vec<&str> = tokens
        .iter()
        .map(|t| core_word(t))
        .filter(|w| w.chars().count() > 3)
        .collect();
    if candidates.len() <= 3 {
        return None;
    }

    // longest of the first candidates, earliest on ties
    let answer = candidates
        .iter()
        .take(MAX_BLANK_CANDIDATES)
        .copied()
        .fold("", |best, w| if w.chars().count() > best.chars().count() { w } else { best });
    let answer_lower = answer.to_lowercase();

    let question: Vec<String> = tokens
        .iter()
        .map(|t| {
            let core = core_word(t);
            if core.to_lowercase() == answer_lower {
                t.replacen(core, BLANK, 1)
            } else {
                t.to_string()
            }
        })
        .collect();

    let mut options: Vec<String> = vec![answer.to_string()];
    if !vocabulary.is_empty() {
        let start = (index * 7) % vocabulary.len();
        for offset in 0..vocabulary.len() {
            if options.len() == 4 {
                break;
            }
            let word = vocabulary[(start + offset) % vocabulary.len()];
            if !options.iter().any(|o| o.to_lowercase() == word.to_lowercase()) {
                options.push(word.to_string());
            }
        }
    }
    for generic in GENERIC_OPTIONS {
        if options.len() == 4 {
            break;
        }
        if !options.iter().any(|o| o == generic) {
            options.push(generic.to_string());
        }
    }

    // place the answer at a position that varies per question
    let correct_answer = index % 4;
    options.rotate_right(correct_answer);

    Some(GeneratedQuestion {
        question: format!("{}?", question.join(" ")),
        options,
        correct_answer,
        explanation: "Pertanyaan dibuat berdasarkan konten modul untuk menguji pemahaman Anda."
            .to_string(),
    })
}

fn unprocessable_content_question() -> GeneratedQuestion {
    GeneratedQuestion {
        question: "Apa topik utama dari modul ini?".to_string(),
        options: vec![
            "Topik tidak dapat ditentukan".to_string(),
            "Informasi tidak tersedia".to_string(),
            "Perlu diupload ulang".to_string(),
            "Konten tidak dapat diproses".to_string(),
        ],
        correct_answer: 0,
        explanation:
            "Konten modul tidak dapat diproses untuk membuat kuis. Silakan coba upload ulang."
                .to_string(),
    }
}

fn sample_question() -> GeneratedQuestion {
    GeneratedQuestion {
        question: "Pertanyaan contoh berdasarkan gaya belajar Anda".to_string(),
        options: GENERIC_OPTIONS.iter().map(|s| s.to_string()).collect(),
        correct_answer: 0,
        explanation: "Penjelasan untuk jawaban benar".to_string(),
    }
}

/// Trimmed sentences split on `.`, `!`, `?` longer than `min_chars`.
fn sentences(text: &str, min_chars: usize) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.chars().count() > min_chars)
        .collect()
}

/// Distinct document words longer than four characters, in first-seen order.
fn vocabulary(text: &str) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    text.split_whitespace()
        .map(core_word)
        .filter(|w| w.chars().count() > 4)
        .filter(|w| seen.insert(w.to_lowercase()))
        .collect()
}

fn core_word(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric())
}

fn prefix(text: &str, max_chars: usize) -> &str {
    crate::services::prompts::truncate_chars(text, max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "Fotosintesis adalah proses tumbuhan mengubah cahaya menjadi energi kimia. \
        Klorofil menyerap cahaya matahari pada daun tumbuhan hijau. \
        Karbon dioksida dan air diubah menjadi glukosa serta oksigen. \
        Proses ini berlangsung di dalam kloroplas sel tumbuhan. \
        Hasil fotosintesis menjadi sumber energi bagi makhluk hidup lainnya. \
        Tanpa fotosintesis kehidupan di bumi tidak akan bertahan lama.";

    #[test]
    fn summary_uses_first_sentences() {
        let summary = fallback_summary(DOC);
        assert!(summary.summary.starts_with("Ringkasan: Fotosintesis adalah proses"));
        assert!(summary.summary.contains("Klorofil menyerap"));
        assert_eq!(summary.key_topics.len(), 3);
        assert!(summary.key_topics.iter().all(|t| t.ends_with("...")));
        assert_eq!(summary.difficulty, "menengah");
        assert_eq!(summary.learning_objectives.len(), 3);
    }

    #[test]
    fn summary_of_empty_text() {
        let summary = fallback_summary("");
        assert_eq!(summary.summary, "Ringkasan: Konten tidak dapat diekstrak secara lengkap.");
        assert_eq!(
            summary.key_topics,
            vec!["Tidak dapat mengekstrak topik dari dokumen".to_string()]
        );
    }

    #[test]
    fn objectives_are_normalized_to_three() {
        let out = normalize_objectives(vec!["  ".into(), "Satu".into()]);
        assert_eq!(
            out,
            vec![
                "Satu".to_string(),
                DEFAULT_OBJECTIVES[1].to_string(),
                DEFAULT_OBJECTIVES[2].to_string()
            ]
        );

        let many = (0..5).map(|i| format!("T{i}")).collect();
        assert_eq!(normalize_objectives(many).len(), 3);
    }

    #[test]
    fn quiz_respects_limit_and_shape() {
        let quiz = fallback_quiz(DOC, 5);
        assert!(!quiz.is_empty());
        assert!(quiz.len() <= 5);
        for (i, q) in quiz.iter().enumerate() {
            assert!(q.is_well_formed(), "question {i} malformed: {q:?}");
            assert!(q.question.contains(BLANK));
            assert!(q.question.ends_with('?'));
            let answer = &q.options[q.correct_answer];
            let revealed = q.question.to_lowercase().contains(&answer.to_lowercase());
            assert!(!revealed || answer.len() < 4);
            let mut distinct: Vec<String> = q.options.iter().map(|o| o.to_lowercase()).collect();
            distinct.sort();
            distinct.dedup();
            assert_eq!(distinct.len(), 4);
        }
    }

    #[test]
    fn quiz_is_deterministic() {
        assert_eq!(fallback_quiz(DOC, 3), fallback_quiz(DOC, 3));
        assert_eq!(fallback_quiz(DOC, 2).len(), 2);
    }

    #[test]
    fn quiz_of_unusable_text_is_single_placeholder() {
        let quiz = fallback_quiz("pendek.", 5);
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz[0].question, "Apa topik utama dari modul ini?");

        // long enough sentence but too few long words
        let quiz = fallback_quiz("a b c d e f g h i j k l m n o p q", 5);
        assert_eq!(quiz.len(), 1);
        assert!(quiz[0].is_well_formed());
    }

    #[test]
    fn unusable_sentences_do_not_use_up_the_limit() {
        let text = format!("a b c d e f g h i j k l m n o p q. x y z w v u t s r q p. {DOC}");
        let quiz = fallback_quiz(&text, 3);
        assert_eq!(quiz.len(), 3);
        assert_eq!(quiz, fallback_quiz(DOC, 3));
    }

    #[test]
    fn zero_limit_still_yields_one_question() {
        assert_eq!(fallback_quiz(DOC, 0).len(), 1);
    }
}
