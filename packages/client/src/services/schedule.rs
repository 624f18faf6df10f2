//! Study schedule recommendations from session history and the profile.
//!
//! Session timestamps are stored in UTC; callers pass the learner's offset
//! so hours and weekdays are local.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Timelike, Utc};
use serde::Serialize;

use rand::Rng;

use elara_algo::{
    analyze_learning_patterns, decision_tree_recommendation, KMeansError, LearningPattern,
    LearningProfile, LearningStyle, Recommendation,
};

use crate::models::{LearningAnalytics, StudySession};

pub const DEFAULT_SESSION_MINUTES: u32 = 45;
const TOP_SLOTS: usize = 3;
const WEEKDAYS: usize = 5;

/// Indonesian day names, Sunday first.
pub const DAY_NAMES: [&str; 7] = ["Minggu", "Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu"];
const DEFAULT_BEST_DAYS: [&str; 3] = ["Senin", "Rabu", "Jumat"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    pub day: String,
    pub time: String,
    pub activity: String,
    /// Minutes
    pub duration: u32,
    /// 1 high, 2 medium, 3 low
    pub priority: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartSchedule {
    pub optimal_times: Vec<String>,
    pub personalized_schedule: Vec<ScheduleEntry>,
    pub best_study_days: Vec<String>,
    pub study_streak: u32,
    pub recommended_session_duration: u32,
    pub recommendation: Option<Recommendation>,
    /// K-Means archetypes over the quiz history, largest first
    pub patterns: Vec<LearningPattern>,
}

pub fn style_time_slots(style: LearningStyle) -> [&'static str; 2] {
    match style {
        LearningStyle::Aural => ["10:00-12:00", "15:00-17:00"],
        LearningStyle::ReadWrite => ["08:00-10:00", "19:00-21:00"],
        LearningStyle::Kinesthetic => ["13:00-15:00", "16:00-18:00"],
        LearningStyle::Visual | LearningStyle::Mixed => ["09:00-11:00", "14:00-16:00"],
    }
}

/// Up to three one-hour slots with the best mean session score, or the
/// slots suited to the learning style when there is no history.
pub fn optimal_study_times(
    sessions: &[StudySession],
    profile: Option<&LearningProfile>,
    offset: FixedOffset,
) -> Vec<String> {
    let ranked = rank_by_mean_score(sessions, |s| {
        let hour = local(s, offset).hour();
        format!("{hour}:00-{}:00", hour + 1)
    });
    if ranked.is_empty() {
        let style = profile.map(|p| p.learning_style).unwrap_or_default();
        return style_time_slots(style).iter().map(|s| s.to_string()).collect();
    }
    ranked
}

/// One high-priority slot per time, spread over Monday to Friday.
pub fn personalized_schedule(optimal_times: &[String], session_minutes: u32) -> Vec<ScheduleEntry> {
    optimal_times
        .iter()
        .enumerate()
        .map(|(i, time)| ScheduleEntry {
            day: DAY_NAMES[(i % WEEKDAYS) + 1].to_string(),
            time: time.clone(),
            activity: "Belajar Modul Baru".to_string(),
            duration: session_minutes,
            priority: 1,
        })
        .collect()
}

pub fn best_study_days(sessions: &[StudySession], offset: FixedOffset) -> Vec<String> {
    let ranked = rank_by_mean_score(sessions, |s| {
        DAY_NAMES[local(s, offset).weekday().num_days_from_sunday() as usize].to_string()
    });
    if ranked.is_empty() {
        return DEFAULT_BEST_DAYS.iter().map(|s| s.to_string()).collect();
    }
    ranked
}

/// Consecutive local days with at least one session, ending today or
/// yesterday.
pub fn study_streak(sessions: &[StudySession], today: NaiveDate, offset: FixedOffset) -> u32 {
    let days: BTreeSet<NaiveDate> =
        sessions.iter().map(|s| local(s, offset).date_naive()).collect();

    let mut cursor = if days.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if days.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        cursor = cursor - Duration::days(1);
    }
    streak
}

pub fn smart_schedule<R: Rng + ?Sized>(
    analytics: &LearningAnalytics,
    profile: Option<&LearningProfile>,
    now: DateTime<Utc>,
    offset: FixedOffset,
    rng: &mut R,
) -> Result<SmartSchedule, KMeansError> {
    let patterns = analyze_learning_patterns(&analytics.snapshot(), profile, rng)?;
    let today = now.with_timezone(&offset).date_naive();
    let optimal_times = optimal_study_times(&analytics.sessions, profile, offset);
    let personalized_schedule = personalized_schedule(&optimal_times, DEFAULT_SESSION_MINUTES);
    Ok(SmartSchedule {
        personalized_schedule,
        optimal_times,
        best_study_days: best_study_days(&analytics.sessions, offset),
        study_streak: study_streak(&analytics.sessions, today, offset),
        recommended_session_duration: DEFAULT_SESSION_MINUTES,
        recommendation: profile.map(decision_tree_recommendation),
        patterns,
    })
}

fn local(session: &StudySession, offset: FixedOffset) -> DateTime<FixedOffset> {
    session.timestamp.with_timezone(&offset)
}

/// Top groups by mean score; ties keep first-seen order. Missing scores
/// count as 0.
fn rank_by_mean_score(
    sessions: &[StudySession],
    key: impl Fn(&StudySession) -> String,
) -> Vec<String> {
    let mut groups: Vec<(String, f64, u32)> = Vec::new();
    for session in sessions {
        let k = key(session);
        let score = session.score.unwrap_or(0.0);
        match groups.iter_mut().find(|(g, _, _)| *g == k) {
            Some((_, total, count)) => {
                *total += score;
                *count += 1;
            }
            None => groups.push((k, score, 1)),
        }
    }
    let mut ranked: Vec<(String, f64)> = groups
        .into_iter()
        .map(|(k, total, count)| (k, total / count as f64))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.into_iter().take(TOP_SLOTS).map(|(k, _)| k).collect()
}
