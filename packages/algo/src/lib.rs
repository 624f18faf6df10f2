//! # elara-algo - adaptive learning core algorithms
//!
//! Pure, synchronous algorithms behind the ELARA learning client:
//!
//! - **Profile Builder** - 15 diagnostic answers to a VARK learning profile
//! - **Difficulty Selector** - next quiz difficulty from history or ability
//! - **K-Means** - small-sample clustering with injected randomness
//! - **Patterns** - learner archetypes, decision-tree advice, rule buckets
//!
//! ## Modules
//!
//! - [`profile`] - diagnostic question bank and profile builder
//! - [`difficulty`] - adaptive difficulty selection
//! - [`kmeans`] - K-Means clustering
//! - [`patterns`] - learning pattern analysis
//! - [`sanitize`] - numeric hygiene for features
//! - [`types`] - shared types and constants
//!
//! ## Example
//!
//! ```rust
//! use elara_algo::{select_difficulty, Difficulty, QuizHistory};
//!
//! let history = QuizHistory::new(vec![4.0, 5.0, 4.0]);
//! assert_eq!(select_difficulty(&history, None), Difficulty::Hard);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod difficulty;
pub mod kmeans;
pub mod patterns;
pub mod profile;
pub mod sanitize;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

/// Shared types and constants
pub use types::*;

pub use difficulty::{select_difficulty, DifficultyConfig, DifficultySelector, QuizHistory};

pub use kmeans::{
    cluster, kmeans, ClusterAssignment, KMeansConfig, KMeansError, KMeansResult, NumericFeatures,
};

pub use patterns::{
    analyze_learning_patterns, bucket_module_patterns, decision_tree_recommendation,
    extract_features, identify_rule_patterns, Archetype, LearningPattern, LearningPatternFeature,
    Level, ModulePattern, Recommendation, RecommendationKind, RulePattern,
};

pub use profile::{
    build_profile, build_profile_with, AnswerPolicy, DiagnosticAnswer, DiagnosticQuestion,
    ProfileError, QuestionKind, DIAGNOSTIC_QUESTIONS,
};
