//! Prompt templates for the AI gateway. Learner-facing text is Indonesian.

use elara_algo::{Difficulty, LearningProfile, LearningStyle};

/// Character budget of document text sent for summaries
pub const SUMMARY_CHAR_BUDGET: usize = 3000;
/// Character budget of document text sent for quiz generation
pub const QUIZ_CHAR_BUDGET: usize = 4000;

pub const SYSTEM_PROMPT: &str = "Anda adalah asisten pembelajaran AI untuk platform ELARA. \
Jawab dalam Bahasa Indonesia. Jika diminta format JSON, berikan hanya JSON yang valid tanpa kata pengantar.";

const EMPTY_DOCUMENT: &str = "[DOKUMEN KOSONG]";

/// How a quiz is requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizMode {
    /// Review quiz generated at upload time
    Review,
    /// Quiz targeted at a selected difficulty
    Adaptive(Difficulty),
}

impl QuizMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizMode::Review => "review",
            QuizMode::Adaptive(_) => "adaptive",
        }
    }
}

/// Prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn summary_prompt(text: &str, profile: Option<&LearningProfile>) -> String {
    let style_block = match profile {
        Some(p) => {
            let d = &p.learning_style_detail;
            format!(
                "Profil Gaya Belajar Siswa:\n\
                 - Gaya Belajar Utama: {}\n\
                 - Skor Visual: {}\n\
                 - Skor Aural: {}\n\
                 - Skor Read/Write: {}\n\
                 - Skor Kinesthetic: {}\n\
                 - Kemampuan Awal: {}/3\n\
                 - Waktu Fokus: {}\n\n\
                 Mohon buatkan ringkasan yang disesuaikan dengan gaya belajar ini.",
                p.learning_style.as_str(),
                d.visual,
                d.aural,
                d.read_write,
                d.kinesthetic,
                p.ability,
                p.focus_time
            )
        }
        None => "Mohon buatkan ringkasan umum karena tidak ada profil gaya belajar.".to_string(),
    };

    let content = non_empty(truncate_chars(text, SUMMARY_CHAR_BUDGET));

    format!(
        "Analisis KONTEN BERIKUT INI dan buatkan ringkasan serta elemen pembelajaran yang AKURAT.\n\n\
         {style_block}\n\n\
         KONTEN DOKUMEN (JANGAN BUAT INFORMASI TAMBAHAN):\n{content}\n\n\
         PETUNJUK:\n\
         1. Semua informasi harus ditemukan dalam teks dokumen di atas\n\
         2. Ringkasan mencerminkan konsep utama dokumen, maksimal 100 kata\n\
         3. Gunakan bahasa yang jelas dan sederhana\n\n\
         BERIKAN OUTPUT DALAM FORMAT JSON:\n\
         {{\n  \"summary\": \"ringkasan\",\n  \"learningStyleSummary\": \"ringkasan sesuai gaya belajar\",\n  \
         \"keyTopics\": [\"topik 1\", \"topik 2\", \"topik 3\"],\n  \"difficulty\": \"mudah/sedang/sulit\",\n  \
         \"estimatedTime\": \"X-Y menit\",\n  \"learningObjectives\": [\"tujuan 1\", \"tujuan 2\", \"tujuan 3\"]\n}}"
    )
}

pub fn quiz_prompt(
    text: &str,
    profile: Option<&LearningProfile>,
    mode: QuizMode,
    count: u32,
) -> String {
    let style = profile.map(|p| p.learning_style).unwrap_or_default();
    let ability = profile.map(|p| p.ability);
    let content = non_empty(truncate_chars(text, QUIZ_CHAR_BUDGET));

    let difficulty_line = match mode {
        QuizMode::Adaptive(d) => format!("\nTingkat kesulitan soal yang diminta: {}.", d.label()),
        QuizMode::Review => String::new(),
    };

    format!(
        "Buatkan {count} pertanyaan pilihan ganda yang SESUAI PERSIS dengan konten modul berikut.\n\n\
         {style_hint}\n\n{complexity_hint}{difficulty_line}\n\n\
         KONTEN MODUL:\n{content}\n\n\
         PROFIL BELAJAR SISWA:\n\
         - Gaya Belajar: {style}\n\
         - Kemampuan Awal: {ability}/3\n\
         - Waktu Fokus: {focus}\n\
         - Tipe Kuis: {mode}\n\n\
         PETUNJUK:\n\
         1. Semua pertanyaan merujuk pada informasi yang disebutkan dalam konten modul\n\
         2. Setiap pertanyaan memiliki tepat 4 opsi\n\
         3. Jawaban benar dapat diverifikasi dari konten modul\n\
         4. Sertakan penjelasan yang mengacu pada isi modul\n\n\
         BERIKAN OUTPUT DALAM FORMAT JSON:\n\
         [\n  {{\n    \"question\": \"pertanyaan\",\n    \"options\": [\"A\", \"B\", \"C\", \"D\"],\n    \
         \"correctAnswer\": 0,\n    \"explanation\": \"penjelasan\"\n  }}\n]",
        style_hint = style_modifier(style),
        complexity_hint = complexity_modifier(ability.unwrap_or(1)),
        style = style.as_str(),
        ability = ability.map(|a| a.to_string()).unwrap_or_else(|| "Tidak dikenal".to_string()),
        focus = profile
            .map(|p| p.focus_time.as_str())
            .filter(|f| !f.is_empty())
            .unwrap_or("Tidak dikenal"),
        mode = mode.as_str(),
    )
}

pub fn chat_prompt(question: &str, context: &str) -> String {
    format!(
        "Sebagai AI Tutor dalam sistem pembelajaran adaptif, jawab pertanyaan siswa berikut berdasarkan konteks yang tersedia.\n\n\
         Pertanyaan Siswa: {question}\n\n\
         Konteks Pembelajaran: {context}\n\n\
         Jawab dengan bahasa yang mudah dimengerti dan sesuaikan dengan gaya belajar siswa. \
         Berikan penjelasan yang mendalam namun ringkas."
    )
}

pub fn style_advice_prompt(profile: &LearningProfile) -> String {
    format!(
        "Berdasarkan profil gaya belajar siswa berikut, berikan rekomendasi pembelajaran personal.\n\n\
         Profil Belajar:\n\
         - Gaya Belajar: {}\n\
         - Kemampuan Awal: {}/3\n\
         - Waktu Fokus: {}\n\
         - Penyelesaian Masalah: {}\n\
         - Kecepatan Belajar: {}\n\
         - Preferensi: {}\n\n\
         Berikan jawaban dalam format JSON:\n\
         {{\n  \"recommendations\": [\"rekomendasi 1\", \"rekomendasi 2\", \"rekomendasi 3\"],\n  \
         \"adaptiveContent\": \"deskripsi konten adaptif\",\n  \"strategy\": \"strategi pengajaran personal\"\n}}",
        profile.learning_style.as_str(),
        profile.ability,
        profile.focus_time,
        profile.problem_solving.as_str(),
        profile.learning_pace,
        profile.preference.as_str(),
    )
}

pub const API_KEY_CHECK_PROMPT: &str = "Hai, apakah API berfungsi? Jawab singkat saja.";

fn style_modifier(style: LearningStyle) -> &'static str {
    match style {
        LearningStyle::Visual => {
            "Sertakan deskripsi yang membantu membayangkan konsep, gunakan istilah yang mudah divisualisasikan."
        }
        LearningStyle::Aural => "Gunakan istilah dan analogi yang mudah diingat dan dipahami secara lisan.",
        LearningStyle::ReadWrite => {
            "Fokus pada istilah kunci dan konsep tertulis, pastikan pertanyaan dan opsi jelas dan terstruktur."
        }
        LearningStyle::Kinesthetic => {
            "Gunakan contoh praktis dan skenario aplikatif, hubungkan dengan pengalaman atau tindakan nyata."
        }
        LearningStyle::Mixed => "Gunakan pendekatan seimbang untuk berbagai gaya belajar.",
    }
}

fn complexity_modifier(ability: u8) -> &'static str {
    match ability {
        0 => "Pertanyaan harus mudah dan langsung pada inti masalah.",
        1 => "Pertanyaan harus sedang dengan beberapa langkah berpikir.",
        2 => "Pertanyaan harus menengah hingga sulit dengan analisis sederhana.",
        _ => "Pertanyaan harus kompleks dengan analisis kritis.",
    }
}

fn non_empty(text: &str) -> &str {
    if text.trim().is_empty() {
        EMPTY_DOCUMENT
    } else {
        text
    }
}
