//! Learning analytics: study sessions, per-module time/access/quiz history,
//! and the pattern views derived from them.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, warn};

use elara_algo::{
    analyze_learning_patterns, bucket_module_patterns, identify_rule_patterns, LearningPattern,
    LearningProfile, ModulePattern, RulePattern,
};

use crate::error::ElaraResult;
use crate::models::{LearningAnalytics, StudySession};
use crate::store::{keys, KeyValueStore, KeyValueStoreExt, StoreResult};

/// Input for [`record_study_session`]. Missing times default to now.
#[derive(Clone, Debug, Default)]
pub struct SessionInput {
    pub subject: String,
    /// Seconds
    pub duration: f64,
    pub score: Option<f64>,
    pub notes: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub start_time: Option<DateTime<Utc>>,
}

pub fn load_analytics(store: &dyn KeyValueStore) -> StoreResult<LearningAnalytics> {
    store.load_or_default(keys::LEARNING_ANALYTICS)
}

fn update<T>(
    store: &dyn KeyValueStore,
    change: impl FnOnce(&mut LearningAnalytics) -> T,
) -> StoreResult<T> {
    let mut analytics = load_analytics(store)?;
    let out = change(&mut analytics);
    analytics.statistics.total_modules = tracked_modules(&analytics);
    store.set_json(keys::LEARNING_ANALYTICS, &analytics)?;
    Ok(out)
}

pub fn record_study_session(
    store: &dyn KeyValueStore,
    input: SessionInput,
) -> StoreResult<StudySession> {
    let now = Utc::now();
    let session = StudySession {
        id: uuid::Uuid::new_v4().to_string(),
        timestamp: input.timestamp.unwrap_or(now),
        duration: non_negative(input.duration, "duration"),
        subject: input.subject,
        score: input.score.filter(|s| s.is_finite()),
        notes: input.notes,
        start_time: input.start_time.unwrap_or(now),
    };

    update(store, |analytics| {
        analytics.statistics.total_study_time += session.duration;
        analytics.sessions.push(session.clone());
        analytics.statistics.study_days = distinct_days(&analytics.sessions);
        session
    })
}

pub fn record_time_spent(
    store: &dyn KeyValueStore,
    module_id: &str,
    seconds: f64,
) -> StoreResult<()> {
    let seconds = non_negative(seconds, "seconds");
    update(store, |analytics| {
        *analytics.time_spent.entry(module_id.to_string()).or_insert(0.0) += seconds;
    })
}

pub fn record_access(store: &dyn KeyValueStore, module_id: &str) -> StoreResult<u32> {
    update(store, |analytics| {
        let count = analytics.access_frequency.entry(module_id.to_string()).or_insert(0);
        *count += 1;
        *count
    })
}

/// Append a quiz score (correct answers, clamped to `0..=max_score`) and
/// return the new average for the module.
pub fn record_quiz_performance(
    store: &dyn KeyValueStore,
    module_id: &str,
    score: f64,
    max_score: f64,
) -> StoreResult<f64> {
    let score = if score.is_finite() {
        score.clamp(0.0, max_score.max(0.0))
    } else {
        warn!(module_id, score, "non-finite quiz score recorded as 0");
        0.0
    };

    update(store, |analytics| {
        let record = analytics.quiz_performance.entry(module_id.to_string()).or_default();
        record.push(score);
        analytics.statistics.completed_quizzes += 1;
        debug!(
            module_id,
            attempts = record.attempts,
            average = record.average,
            "quiz performance recorded"
        );
        record.average
    })
}

/// Bucket every tracked module and persist the result as `learningPatterns`.
pub fn analyze_module_patterns(
    store: &dyn KeyValueStore,
) -> StoreResult<BTreeMap<String, ModulePattern>> {
    update(store, |analytics| {
        let patterns = bucket_module_patterns(&analytics.snapshot());
        analytics.learning_patterns = patterns.clone();
        patterns
    })
}

/// Rule-based pattern summary over the last persisted buckets.
pub fn identify_patterns(store: &dyn KeyValueStore) -> StoreResult<Vec<RulePattern>> {
    let analytics = load_analytics(store)?;
    Ok(identify_rule_patterns(&analytics.learning_patterns))
}

/// K-Means archetypes over the recorded quiz history.
pub fn cluster_patterns<R: Rng + ?Sized>(
    store: &dyn KeyValueStore,
    profile: Option<&LearningProfile>,
    rng: &mut R,
) -> ElaraResult<Vec<LearningPattern>> {
    let analytics = load_analytics(store)?;
    Ok(analyze_learning_patterns(&analytics.snapshot(), profile, rng)?)
}

pub fn reset(store: &dyn KeyValueStore) -> StoreResult<()> {
    store.set_json(keys::LEARNING_ANALYTICS, &LearningAnalytics::default())
}

fn non_negative(value: f64, field: &'static str) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!(field, value, "invalid duration recorded as 0");
        0.0
    }
}

fn distinct_days(sessions: &[StudySession]) -> u32 {
    sessions
        .iter()
        .map(|s| s.timestamp.date_naive())
        .collect::<BTreeSet<_>>()
        .len() as u32
}

fn tracked_modules(analytics: &LearningAnalytics) -> u32 {
    analytics
        .time_spent
        .keys()
        .chain(analytics.access_frequency.keys())
        .chain(analytics.quiz_performance.keys())
        .collect::<BTreeSet<_>>()
        .len() as u32
}
