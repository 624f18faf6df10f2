//! Common Types and Constants
//!
//! Shared data structures used across all algorithm modules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Number of questions in the diagnostic quiz
pub const DIAGNOSTIC_QUESTION_COUNT: usize = 15;

/// Number of VARK questions at the start of the diagnostic quiz
pub const VARK_QUESTION_COUNT: usize = 7;

/// Highest ability level produced by the diagnostic quiz
pub const MAX_ABILITY: u8 = 3;

/// Default number of questions per generated quiz
pub const DEFAULT_QUESTIONS_PER_QUIZ: u32 = 5;

/// Maximum feature absolute value accepted by clustering
pub const MAX_FEATURE_ABS: f64 = 1e9;

// ==================== Learning Style ====================

/// VARK learning style. `Mixed` means no single style dominates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LearningStyle {
    Visual,
    Aural,
    ReadWrite,
    Kinesthetic,
    #[default]
    Mixed,
}

impl LearningStyle {
    /// The four concrete VARK styles, in tie-break priority order.
    pub const VARK: [LearningStyle; 4] = [
        LearningStyle::Visual,
        LearningStyle::Aural,
        LearningStyle::ReadWrite,
        LearningStyle::Kinesthetic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::Aural => "aural",
            Self::ReadWrite => "readWrite",
            Self::Kinesthetic => "kinesthetic",
            Self::Mixed => "mixed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "visual" => Some(Self::Visual),
            "aural" => Some(Self::Aural),
            "readWrite" => Some(Self::ReadWrite),
            "kinesthetic" => Some(Self::Kinesthetic),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }

    /// Indonesian display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Visual => "Visual",
            Self::Aural => "Auditori",
            Self::ReadWrite => "Baca/Tulis",
            Self::Kinesthetic => "Kinestetik",
            Self::Mixed => "Campuran",
        }
    }
}

/// Per-style VARK counters (`learningStyleDetail`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleScores {
    pub visual: u32,
    pub aural: u32,
    pub read_write: u32,
    pub kinesthetic: u32,
}

impl StyleScores {
    pub fn get(&self, style: LearningStyle) -> u32 {
        match style {
            LearningStyle::Visual => self.visual,
            LearningStyle::Aural => self.aural,
            LearningStyle::ReadWrite => self.read_write,
            LearningStyle::Kinesthetic => self.kinesthetic,
            LearningStyle::Mixed => 0,
        }
    }

    pub fn increment(&mut self, style: LearningStyle) {
        match style {
            LearningStyle::Visual => self.visual += 1,
            LearningStyle::Aural => self.aural += 1,
            LearningStyle::ReadWrite => self.read_write += 1,
            LearningStyle::Kinesthetic => self.kinesthetic += 1,
            LearningStyle::Mixed => {}
        }
    }

    pub fn total(&self) -> u32 {
        self.visual + self.aural + self.read_write + self.kinesthetic
    }

    /// Highest-scoring style. Ties resolve visual > aural > readWrite >
    /// kinesthetic; an all-zero vector is `Mixed`.
    pub fn dominant(&self) -> LearningStyle {
        let max = LearningStyle::VARK
            .iter()
            .map(|s| self.get(*s))
            .max()
            .unwrap_or(0);
        if max == 0 {
            return LearningStyle::Mixed;
        }
        LearningStyle::VARK
            .into_iter()
            .find(|s| self.get(*s) == max)
            .unwrap_or(LearningStyle::Mixed)
    }
}

// ==================== Learning Profile ====================

/// Result of the diagnostic quiz. Overwritten on retake.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningProfile {
    pub learning_style: LearningStyle,
    pub learning_style_detail: StyleScores,
    /// 0 = no prior knowledge, 3 = knows the basics well
    pub ability: u8,
    pub focus_time: String,
    pub problem_solving: LearningStyle,
    pub learning_pace: String,
    pub frequency: String,
    pub assessment: String,
    #[serde(default)]
    pub foundational: String,
    #[serde(default)]
    pub preference: LearningStyle,
}

// ==================== Difficulty ====================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    /// Indonesian label used in prompts and summaries
    pub fn label(&self) -> &'static str {
        match self {
            Self::Easy => "mudah",
            Self::Medium => "menengah",
            Self::Hard => "sulit",
        }
    }
}

// ==================== Analytics Records ====================

/// Per-module quiz history. `average` always equals the mean of `scores`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizPerformanceRecord {
    pub attempts: u32,
    pub scores: Vec<f64>,
    pub average: f64,
}

impl QuizPerformanceRecord {
    /// Append a score and recompute the running average.
    pub fn push(&mut self, score: f64) {
        self.scores.push(score);
        self.attempts = self.scores.len() as u32;
        self.average = self.scores.iter().sum::<f64>() / self.scores.len() as f64;
    }

    pub fn total(&self) -> f64 {
        self.scores.iter().sum()
    }
}

/// Snapshot of the analytics maps the pattern classifier reads.
#[derive(Clone, Debug, Default)]
pub struct AnalyticsSnapshot {
    /// Seconds spent per module
    pub time_spent: BTreeMap<String, f64>,
    /// Open count per module
    pub access_frequency: BTreeMap<String, u32>,
    pub quiz_performance: BTreeMap<String, QuizPerformanceRecord>,
}
