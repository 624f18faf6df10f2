//! Diagnostic Profile Builder
//!
//! Maps the 15 fixed-choice answers of the diagnostic quiz to a
//! [`LearningProfile`]. Questions 1-7 score the VARK styles, questions
//! 8-15 are direct lookups.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{LearningProfile, LearningStyle, StyleScores, DIAGNOSTIC_QUESTION_COUNT};

// ==================== Question Bank ====================

/// What a diagnostic question measures
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionKind {
    Vark,
    Ability,
    Focus,
    Assessment,
    Pace,
    Frequency,
    ProblemSolving,
    Foundational,
    Preference,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct DiagnosticQuestion {
    pub id: u8,
    pub question: &'static str,
    pub options: [&'static str; 4],
    pub kind: QuestionKind,
}

/// Fixed diagnostic quiz. For VARK questions option order is always
/// visual, aural, readWrite, kinesthetic.
pub const DIAGNOSTIC_QUESTIONS: [DiagnosticQuestion; DIAGNOSTIC_QUESTION_COUNT] = [
    DiagnosticQuestion {
        id: 1,
        question: "Saat belajar, saya lebih suka menggunakan?",
        options: [
            "Gambar, diagram, bagan, dan peta konsep",
            "Mendengarkan penjelasan atau diskusi",
            "Membaca teks dan mengambil catatan tertulis",
            "Langsung mencoba atau mempraktikkan konsep yang dipelajari",
        ],
        kind: QuestionKind::Vark,
    },
    DiagnosticQuestion {
        id: 2,
        question: "Untuk memahami informasi baru, saya sering?",
        options: [
            "Membuat atau menggunakan visual seperti sketsa atau diagram",
            "Mendiskusikan topik dengan orang lain atau menjelaskan dengan kata-kata",
            "Menulis ulang atau membuat catatan terperinci",
            "Mengerjakan latihan langsung atau menangani contoh nyata",
        ],
        kind: QuestionKind::Vark,
    },
    DiagnosticQuestion {
        id: 3,
        question: "Saat memecahkan masalah, saya cenderung?",
        options: [
            "Membayangkan atau menggambarkan situasi dalam bentuk visual",
            "Berbicara pada diri sendiri atau membicarakan langkah-langkah dengan orang lain",
            "Membaca instruksi secara rinci dan menuliskan langkah-langkah",
            "Mencoba secara langsung dan belajar sambil praktik",
        ],
        kind: QuestionKind::Vark,
    },
    DiagnosticQuestion {
        id: 4,
        question: "Dalam lingkungan belajar, saya paling produktif saat?",
        options: [
            "Ada elemen visual yang jelas seperti grafik, video, atau demonstrasi",
            "Ada diskusi, ceramah, atau penjelasan lisan",
            "Saya bisa membaca materi secara tertulis atau mencatat",
            "Saya bisa terlibat dalam aktivitas fisik atau praktik",
        ],
        kind: QuestionKind::Vark,
    },
    DiagnosticQuestion {
        id: 5,
        question: "Ketika harus mengingat sesuatu, saya biasanya?",
        options: [
            "Mengingatnya dalam bentuk gambar atau visual",
            "Mengingatnya dalam bentuk suara atau pembicaraan",
            "Mengingatnya dalam bentuk teks tertulis",
            "Mengingatnya melalui gerakan atau pengalaman fisik",
        ],
        kind: QuestionKind::Vark,
    },
    DiagnosticQuestion {
        id: 6,
        question: "Saya lebih baik dalam memahami instruksi jika?",
        options: [
            "Disertai dengan gambar atau demonstrasi visual",
            "Dijelaskan secara lisan atau didiskusikan",
            "Ditulis secara rinci dan langkah-demi-langkah",
            "Saya bisa mencoba langsung atau melihat contoh nyata",
        ],
        kind: QuestionKind::Vark,
    },
    DiagnosticQuestion {
        id: 7,
        question: "Dalam proyek kelompok, saya biasanya berkontribusi dengan?",
        options: [
            "Membuat presentasi visual atau bagan",
            "Menjadi pembicara atau fasilitator diskusi",
            "Menulis laporan atau dokumentasi",
            "Melakukan aktivitas praktis atau eksperimen",
        ],
        kind: QuestionKind::Vark,
    },
    DiagnosticQuestion {
        id: 8,
        question: "Seberapa baik kamu mengenal konsep dasar pada mata kuliah ini?",
        options: ["Sangat tidak tahu", "Kurang tahu", "Cukup tahu", "Sangat tahu"],
        kind: QuestionKind::Ability,
    },
    DiagnosticQuestion {
        id: 9,
        question: "Berapa lama kamu biasanya bisa fokus belajar dalam satu sesi?",
        options: [
            "Kurang dari 15 menit",
            "15-30 menit",
            "30-45 menit",
            "Lebih dari 45 menit",
        ],
        kind: QuestionKind::Focus,
    },
    DiagnosticQuestion {
        id: 10,
        question: "Metode evaluasi yang paling kamu sukai?",
        options: [
            "Ujian tertulis/essay",
            "Presentasi lisan",
            "Ujian objektif/pilihan ganda",
            "Proyek praktik/penilaian kinerja",
        ],
        kind: QuestionKind::Assessment,
    },
    DiagnosticQuestion {
        id: 11,
        question: "Seberapa cepat kamu biasanya memahami konsep baru?",
        options: ["Sangat cepat", "Cepat", "Agak lambat", "Sangat lambat"],
        kind: QuestionKind::Pace,
    },
    DiagnosticQuestion {
        id: 12,
        question: "Kamu lebih suka belajar dalam?",
        options: [
            "Sesi singkat tapi sering",
            "Sesi panjang seminggu sekali",
            "Sesi sedang dengan frekuensi sedang",
            "Tergantung suasana hati",
        ],
        kind: QuestionKind::Frequency,
    },
    DiagnosticQuestion {
        id: 13,
        question: "Ketika menghadapi konsep yang sulit, kamu cenderung?",
        options: [
            "Mencari ilustrasi atau gambar terkait",
            "Mendiskusikan dengan teman atau dosen",
            "Membaca ulang dan mencari penjelasan tertulis",
            "Mencoba langsung dengan contoh atau latihan",
        ],
        kind: QuestionKind::ProblemSolving,
    },
    DiagnosticQuestion {
        id: 14,
        question: "Seberapa penting kamu merasa perlu memahami dasar-dasar sebelum ke topik lanjutan?",
        options: [
            "Sangat penting",
            "Cukup penting",
            "Agak penting",
            "Tidak terlalu penting",
        ],
        kind: QuestionKind::Foundational,
    },
    DiagnosticQuestion {
        id: 15,
        question: "Kamu lebih suka belajar dengan?",
        options: [
            "Menonton video pembelajaran",
            "Mendengarkan podcast atau rekaman kuliah",
            "Membaca buku teks atau modul",
            "Melakukan eksperimen atau simulasi",
        ],
        kind: QuestionKind::Preference,
    },
];

// ==================== Input / Errors ====================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticAnswer {
    pub question_id: u8,
    pub answer: String,
}

impl DiagnosticAnswer {
    pub fn new(question_id: u8, answer: impl Into<String>) -> Self {
        Self {
            question_id,
            answer: answer.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("expected {expected} answers, got {actual}")]
    WrongAnswerCount { expected: usize, actual: usize },
    #[error("question id {0} is not part of the diagnostic quiz")]
    InvalidQuestionId(u8),
    #[error("question {0} answered more than once")]
    DuplicateQuestion(u8),
    #[error("answer {answer:?} is not an option of question {question_id}")]
    UnknownAnswer { question_id: u8, answer: String },
}

/// How unrecognized VARK answers are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnswerPolicy {
    /// Unknown VARK answers score nothing
    #[default]
    Lenient,
    /// Unknown VARK answers are rejected
    Strict,
}

// ==================== Builder ====================

/// Build a profile with the lenient answer policy.
pub fn build_profile(answers: &[DiagnosticAnswer]) -> Result<LearningProfile, ProfileError> {
    build_profile_with(answers, AnswerPolicy::Lenient)
}

pub fn build_profile_with(
    answers: &[DiagnosticAnswer],
    policy: AnswerPolicy,
) -> Result<LearningProfile, ProfileError> {
    let ordered = order_answers(answers)?;

    let mut scores = StyleScores::default();
    let mut profile = LearningProfile::default();

    for (question, answer) in DIAGNOSTIC_QUESTIONS.iter().zip(ordered) {
        let text = answer.answer.as_str();
        match question.kind {
            QuestionKind::Vark => match vark_style(text) {
                Some(style) => scores.increment(style),
                None if policy == AnswerPolicy::Strict => {
                    return Err(ProfileError::UnknownAnswer {
                        question_id: question.id,
                        answer: answer.answer.clone(),
                    })
                }
                None => {}
            },
            QuestionKind::Ability => profile.ability = ability_level(text),
            QuestionKind::Focus => profile.focus_time = text.to_string(),
            QuestionKind::Assessment => profile.assessment = text.to_string(),
            QuestionKind::Pace => profile.learning_pace = text.to_string(),
            QuestionKind::Frequency => profile.frequency = text.to_string(),
            QuestionKind::ProblemSolving => profile.problem_solving = problem_solving_style(text),
            QuestionKind::Foundational => profile.foundational = text.to_string(),
            QuestionKind::Preference => profile.preference = preference_style(text),
        }
    }

    profile.learning_style = scores.dominant();
    profile.learning_style_detail = scores;
    Ok(profile)
}

/// Validate count and ids, then return answers sorted by question id.
fn order_answers(answers: &[DiagnosticAnswer]) -> Result<Vec<&DiagnosticAnswer>, ProfileError> {
    if answers.len() != DIAGNOSTIC_QUESTION_COUNT {
        return Err(ProfileError::WrongAnswerCount {
            expected: DIAGNOSTIC_QUESTION_COUNT,
            actual: answers.len(),
        });
    }

    let mut slots: [Option<&DiagnosticAnswer>; DIAGNOSTIC_QUESTION_COUNT] =
        [None; DIAGNOSTIC_QUESTION_COUNT];
    for answer in answers {
        let id = answer.question_id;
        if id == 0 || id as usize > DIAGNOSTIC_QUESTION_COUNT {
            return Err(ProfileError::InvalidQuestionId(id));
        }
        let slot = &mut slots[id as usize - 1];
        if slot.is_some() {
            return Err(ProfileError::DuplicateQuestion(id));
        }
        *slot = Some(answer);
    }

    // count matches and ids are unique, so every slot is filled
    Ok(slots.into_iter().flatten().collect())
}

/// VARK style of an answer to any of questions 1-7.
pub fn vark_style(answer: &str) -> Option<LearningStyle> {
    DIAGNOSTIC_QUESTIONS
        .iter()
        .filter(|q| q.kind == QuestionKind::Vark)
        .find_map(|q| {
            q.options
                .iter()
                .position(|opt| *opt == answer)
                .map(|idx| LearningStyle::VARK[idx])
        })
}

pub fn ability_level(answer: &str) -> u8 {
    match answer {
        "Sangat tidak tahu" => 0,
        "Kurang tahu" => 1,
        "Cukup tahu" => 2,
        "Sangat tahu" => 3,
        _ => 0,
    }
}

pub fn problem_solving_style(answer: &str) -> LearningStyle {
    match answer {
        "Mencari ilustrasi atau gambar terkait" => LearningStyle::Visual,
        "Mendiskusikan dengan teman atau dosen" => LearningStyle::Aural,
        "Membaca ulang dan mencari penjelasan tertulis" => LearningStyle::ReadWrite,
        "Mencoba langsung dengan contoh atau latihan" => LearningStyle::Kinesthetic,
        _ => LearningStyle::Mixed,
    }
}

pub fn preference_style(answer: &str) -> LearningStyle {
    match answer {
        "Menonton video pembelajaran" => LearningStyle::Visual,
        "Mendengarkan podcast atau rekaman kuliah" => LearningStyle::Aural,
        "Membaca buku teks atau modul" => LearningStyle::ReadWrite,
        "Melakukan eksperimen atau simulasi" => LearningStyle::Kinesthetic,
        _ => LearningStyle::Mixed,
    }
}
