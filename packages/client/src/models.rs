//! Persisted records. Field names serialize in camelCase to match the
//! stored JSON documents.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use elara_algo::{AnalyticsSnapshot, ModulePattern, QuizPerformanceRecord};

// ==================== Modules ====================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Module {
    pub id: String,
    pub title: String,
    /// Extracted document text; empty for records saved without it
    pub original_content: String,
    pub summary: String,
    pub learning_style_summary: String,
    pub key_topics: Vec<String>,
    pub difficulty: String,
    pub estimated_time: String,
    pub learning_objectives: Vec<String>,
    /// RFC 3339 timestamp
    pub upload_date: String,
    pub question_count: u32,
}

impl Module {
    /// Copy summary fields that this record lacks from a stored summary.
    pub fn merge_summary(&mut self, summary: &ModuleSummary) {
        if self.summary.trim().is_empty() {
            self.summary = summary.summary.clone();
        }
        if self.learning_style_summary.trim().is_empty() {
            self.learning_style_summary = summary.learning_style_summary.clone();
        }
        if self.key_topics.is_empty() {
            self.key_topics = summary.key_topics.clone();
        }
        if self.difficulty.trim().is_empty() {
            self.difficulty = summary.difficulty.clone();
        }
        if self.estimated_time.trim().is_empty() {
            self.estimated_time = summary.estimated_time.clone();
        }
        if self.learning_objectives.is_empty() {
            self.learning_objectives = summary.learning_objectives.clone();
        }
    }

    /// Text the quiz generator should read.
    pub fn quiz_source(&self) -> &str {
        [&self.original_content, &self.summary, &self.learning_style_summary]
            .into_iter()
            .map(String::as_str)
            .find(|s| !s.trim().is_empty())
            .unwrap_or("")
    }
}

/// Summary as produced by the AI gateway and stored under `summaries`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModuleSummary {
    pub summary: String,
    pub learning_style_summary: String,
    pub key_topics: Vec<String>,
    pub difficulty: String,
    pub estimated_time: String,
    pub learning_objectives: Vec<String>,
}

// ==================== Quizzes ====================

/// Question as returned by the model: answer given by index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
}

impl GeneratedQuestion {
    /// Exactly four options and an in-range answer index.
    pub fn is_well_formed(&self) -> bool {
        !self.question.trim().is_empty()
            && self.options.len() == 4
            && self.correct_answer < self.options.len()
    }

    pub fn into_stored(self) -> Option<QuizQuestion> {
        let answer = self.options.get(self.correct_answer)?.clone();
        Some(QuizQuestion {
            question: self.question,
            options: self.options,
            answer,
            explanation: self.explanation,
        })
    }
}

/// Question as stored: answer given by option text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl QuizQuestion {
    pub fn is_correct(&self, choice: &str) -> bool {
        self.answer == choice
    }
}

// ==================== Analytics ====================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds
    pub duration: f64,
    pub subject: String,
    pub score: Option<f64>,
    pub notes: Option<String>,
    pub start_time: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearningStatistics {
    /// Seconds
    pub total_study_time: f64,
    pub completed_quizzes: u32,
    pub total_modules: u32,
    pub study_days: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearningAnalytics {
    pub sessions: Vec<StudySession>,
    pub time_spent: BTreeMap<String, f64>,
    pub access_frequency: BTreeMap<String, u32>,
    pub quiz_performance: BTreeMap<String, QuizPerformanceRecord>,
    pub learning_patterns: BTreeMap<String, ModulePattern>,
    pub statistics: LearningStatistics,
}

impl LearningAnalytics {
    pub fn snapshot(&self) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            time_spent: self.time_spent.clone(),
            access_frequency: self.access_frequency.clone(),
            quiz_performance: self.quiz_performance.clone(),
        }
    }
}

// ==================== Progress / Todos / Users ====================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProgress {
    pub modules_completed: Vec<String>,
    pub quizzes_taken: Vec<String>,
    /// Latest score per module
    pub scores: BTreeMap<String, f64>,
    pub achievements: Vec<String>,
    pub last_activity: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub text: String,
    /// Due date as entered by the user
    pub date: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub nim: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_deserializes_with_missing_fields() {
        let raw = r#"{"id":"1","title":"Bab 1","uploadDate":"2024-01-01T00:00:00Z","questionCount":5}"#;
        let module: Module = serde_json::from_str(raw).unwrap();
        assert_eq!(module.title, "Bab 1");
        assert!(module.summary.is_empty());
        assert_eq!(module.question_count, 5);
    }

    #[test]
    fn merge_keeps_existing_fields() {
        let mut module = Module {
            summary: "own".into(),
            ..Default::default()
        };
        let stored = ModuleSummary {
            summary: "stored".into(),
            learning_objectives: vec!["a".into()],
            ..Default::default()
        };
        module.merge_summary(&stored);
        assert_eq!(module.summary, "own");
        assert_eq!(module.learning_objectives, vec!["a".to_string()]);
    }

    #[test]
    fn quiz_source_prefers_original_content() {
        let mut module = Module {
            summary: "ringkasan".into(),
            ..Default::default()
        };
        assert_eq!(module.quiz_source(), "ringkasan");
        module.original_content = "isi".into();
        assert_eq!(module.quiz_source(), "isi");
    }

    #[test]
    fn generated_question_conversion() {
        let q = GeneratedQuestion {
            question: "Apa?".into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer: 2,
            explanation: String::new(),
        };
        assert!(q.is_well_formed());
        let stored = q.into_stored().unwrap();
        assert_eq!(stored.answer, "c");
        assert!(stored.is_correct("c"));
    }

    #[test]
    fn analytics_default_json_shape() {
        let value = serde_json::to_value(LearningAnalytics::default()).unwrap();
        let keys = [
            "sessions",
            "timeSpent",
            "accessFrequency",
            "quizPerformance",
            "learningPatterns",
        ];
        for key in keys {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["statistics"]["totalStudyTime"], 0.0);
    }
}
