//! Adaptive Difficulty Selector
//!
//! Chooses the difficulty of the next quiz from the module's quiz history,
//! or from the learner's self-reported ability when there is no history.

use serde::{Deserialize, Serialize};

use crate::types::{Difficulty, LearningProfile, QuizPerformanceRecord, DEFAULT_QUESTIONS_PER_QUIZ};

/// Thresholds are percentages of correct answers, inclusive.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DifficultyConfig {
    pub questions_per_quiz: u32,
    pub hard_threshold: f64,
    pub medium_threshold: f64,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            questions_per_quiz: DEFAULT_QUESTIONS_PER_QUIZ,
            hard_threshold: 80.0,
            medium_threshold: 60.0,
        }
    }
}

/// Raw correct-answer counts of previous quizzes on a module.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuizHistory {
    pub scores: Vec<f64>,
    pub count: u32,
}

impl QuizHistory {
    pub fn new(scores: Vec<f64>) -> Self {
        let count = scores.len() as u32;
        Self { scores, count }
    }
}

impl From<&QuizPerformanceRecord> for QuizHistory {
    fn from(record: &QuizPerformanceRecord) -> Self {
        Self {
            scores: record.scores.clone(),
            count: record.attempts,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DifficultySelector {
    config: DifficultyConfig,
}

impl DifficultySelector {
    pub fn new(config: DifficultyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DifficultyConfig {
        &self.config
    }

    pub fn select(&self, history: &QuizHistory, profile: Option<&LearningProfile>) -> Difficulty {
        match self.average_percent(history) {
            Some(avg) if avg >= self.config.hard_threshold => Difficulty::Hard,
            Some(avg) if avg >= self.config.medium_threshold => Difficulty::Medium,
            Some(_) => Difficulty::Easy,
            None => match profile {
                Some(p) => difficulty_for_ability(p.ability),
                None => Difficulty::Medium,
            },
        }
    }

    /// Mean percentage of correct answers, `None` without history.
    pub fn average_percent(&self, history: &QuizHistory) -> Option<f64> {
        if history.count == 0 {
            return None;
        }
        let per_quiz = self.config.questions_per_quiz.max(1) as f64;
        let total: f64 = history.scores.iter().sum();
        Some(total * 100.0 / (history.count as f64 * per_quiz))
    }
}

pub fn difficulty_for_ability(ability: u8) -> Difficulty {
    match ability {
        0 | 1 => Difficulty::Easy,
        2 => Difficulty::Medium,
        _ => Difficulty::Hard,
    }
}

/// Select with the default configuration.
pub fn select_difficulty(history: &QuizHistory, profile: Option<&LearningProfile>) -> Difficulty {
    DifficultySelector::default().select(history, profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with_ability(ability: u8) -> LearningProfile {
        LearningProfile {
            ability,
            ..Default::default()
        }
    }

    #[test]
    fn history_thresholds() {
        assert_eq!(
            select_difficulty(&QuizHistory::new(vec![4.0; 5]), None),
            Difficulty::Hard
        );
        assert_eq!(
            select_difficulty(&QuizHistory::new(vec![3.0; 5]), None),
            Difficulty::Medium
        );
        assert_eq!(
            select_difficulty(&QuizHistory::new(vec![2.0, 2.0]), None),
            Difficulty::Easy
        );
    }

    #[test]
    fn boundaries_are_inclusive() {
        let selector = DifficultySelector::default();
        // 4/5 = exactly 80%
        let h = QuizHistory::new(vec![4.0]);
        assert_eq!(selector.average_percent(&h), Some(80.0));
        assert_eq!(selector.select(&h, None), Difficulty::Hard);
        // 3/5 = exactly 60%
        let h = QuizHistory::new(vec![3.0]);
        assert_eq!(selector.select(&h, None), Difficulty::Medium);
    }

    #[test]
    fn history_overrides_profile() {
        let expert = profile_with_ability(3);
        assert_eq!(
            select_difficulty(&QuizHistory::new(vec![1.0]), Some(&expert)),
            Difficulty::Easy
        );
    }

    #[test]
    fn no_history_uses_ability() {
        let empty = QuizHistory::default();
        let cases = [
            (0, Difficulty::Easy),
            (1, Difficulty::Easy),
            (2, Difficulty::Medium),
            (3, Difficulty::Hard),
        ];
        for (ability, expected) in cases {
            assert_eq!(
                select_difficulty(&empty, Some(&profile_with_ability(ability))),
                expected,
                "ability {ability}"
            );
        }
        assert_eq!(select_difficulty(&empty, None), Difficulty::Medium);
    }

    #[test]
    fn questions_per_quiz_is_configurable() {
        let selector = DifficultySelector::new(DifficultyConfig {
            questions_per_quiz: 10,
            ..Default::default()
        });
        // 8/10 = 80%
        assert_eq!(
            selector.select(&QuizHistory::new(vec![8.0]), None),
            Difficulty::Hard
        );
        // 4/10 = 40%
        assert_eq!(
            selector.select(&QuizHistory::new(vec![4.0]), None),
            Difficulty::Easy
        );
    }

    #[test]
    fn history_from_record() {
        let mut record = QuizPerformanceRecord::default();
        record.push(5.0);
        record.push(4.0);
        let history = QuizHistory::from(&record);
        assert_eq!(history.count, 2);
        assert_eq!(select_difficulty(&history, None), Difficulty::Hard);
    }
}
