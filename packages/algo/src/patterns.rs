//! Learning pattern analysis
//!
//! - K-Means archetypes over per-module features, labeled by cluster quality
//! - Fixed decision-tree study recommendation from the profile
//! - Threshold buckets per module and the rule-based pattern summary

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::kmeans::{cluster, ClusterAssignment, KMeansError, NumericFeatures};
use crate::sanitize::safe_ratio;
use crate::types::{AnalyticsSnapshot, LearningProfile, LearningStyle};

/// Number of learner archetypes
pub const ARCHETYPE_COUNT: usize = 3;

/// Module id used for the synthetic feature built from the profile
pub const PROFILE_FEATURE_ID: &str = "profile-based";

// ==================== Features ====================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPatternFeature {
    pub module_id: String,
    /// Seconds
    pub time_spent: f64,
    pub access_count: f64,
    pub avg_score: f64,
    /// Score per minute of study
    pub efficiency: f64,
}

impl NumericFeatures for LearningPatternFeature {
    fn features(&self) -> Vec<f64> {
        vec![self.time_spent, self.access_count, self.avg_score, self.efficiency]
    }
}

/// One feature per module with quiz data, or a single profile-derived
/// feature when there is none.
pub fn extract_features(
    snapshot: &AnalyticsSnapshot,
    profile: Option<&LearningProfile>,
) -> Vec<LearningPatternFeature> {
    let features: Vec<LearningPatternFeature> = snapshot
        .quiz_performance
        .iter()
        .map(|(module_id, perf)| {
            let time_spent = snapshot.time_spent.get(module_id).copied().unwrap_or(0.0);
            let access_count =
                snapshot.access_frequency.get(module_id).copied().unwrap_or(0) as f64;
            let avg_score = perf.average;
            let minutes = if time_spent > 0.0 { time_spent / 60.0 } else { 1.0 };
            let efficiency = if avg_score > 0.0 { safe_ratio(avg_score, minutes) } else { 0.0 };
            LearningPatternFeature {
                module_id: module_id.clone(),
                time_spent,
                access_count,
                avg_score,
                efficiency,
            }
        })
        .collect();

    if features.is_empty() {
        vec![profile_feature(profile)]
    } else {
        features
    }
}

fn profile_feature(profile: Option<&LearningProfile>) -> LearningPatternFeature {
    let (time_spent, access_count, avg_score, efficiency) = match profile {
        Some(p) => {
            let focus_minutes = if p.focus_time.to_lowercase().contains("kurang") {
                15.0
            } else {
                45.0
            };
            let access = if p.frequency.to_lowercase().contains("sesi singkat") {
                5.0
            } else {
                3.0
            };
            let ability = p.ability as f64;
            (focus_minutes * 60.0, access, ability * 1.5, ability * 0.02)
        }
        None => (1800.0, 3.0, 2.5, 0.01),
    };
    LearningPatternFeature {
        module_id: PROFILE_FEATURE_ID.to_string(),
        time_spent,
        access_count,
        avg_score,
        efficiency,
    }
}

// ==================== Archetypes ====================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Archetype {
    EfficientLearner,
    IntensiveLearner,
    StrugglingLearner,
}

impl Archetype {
    /// Archetypes ordered from best to worst cluster quality.
    pub const RANKED: [Archetype; ARCHETYPE_COUNT] = [
        Archetype::EfficientLearner,
        Archetype::IntensiveLearner,
        Archetype::StrugglingLearner,
    ];

    pub fn id(&self) -> u8 {
        match self {
            Self::EfficientLearner => 1,
            Self::IntensiveLearner => 2,
            Self::StrugglingLearner => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::EfficientLearner => "Efficient Learner",
            Self::IntensiveLearner => "Intensive Learner",
            Self::StrugglingLearner => "Struggling Learner",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::EfficientLearner => {
                "Mahasiswa yang belajar secara efisien - menghasilkan skor tinggi \
                 dengan waktu belajar yang relatif singkat"
            }
            Self::IntensiveLearner => {
                "Mahasiswa yang belajar intensif - menghabiskan banyak waktu belajar \
                 untuk mencapai pemahaman"
            }
            Self::StrugglingLearner => {
                "Mahasiswa yang mengalami kesulitan - menghabiskan banyak waktu \
                 tetapi skor tetap rendah"
            }
        }
    }

    pub fn characteristics(&self) -> &'static str {
        match self {
            Self::EfficientLearner => "Skor tinggi, waktu belajar efisien",
            Self::IntensiveLearner => "Waktu belajar lama, frekuensi akses tinggi",
            Self::StrugglingLearner => "Waktu belajar lama, skor rendah",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPattern {
    pub id: u8,
    pub archetype: Archetype,
    pub name: String,
    pub description: String,
    pub characteristics: String,
    /// Number of features in this cluster
    pub members: usize,
    /// Raw K-Means index backing this archetype
    pub cluster: usize,
    /// Mean avgScore of the members, 0 for an empty cluster
    pub mean_score: f64,
    pub module_ids: Vec<String>,
}

/// Cluster features into three archetypes and label them by mean avgScore.
///
/// Result is sorted by member count, descending; ties keep archetype order.
pub fn analyze_learning_patterns<R: Rng + ?Sized>(
    snapshot: &AnalyticsSnapshot,
    profile: Option<&LearningProfile>,
    rng: &mut R,
) -> Result<Vec<LearningPattern>, KMeansError> {
    let features = extract_features(snapshot, profile);
    let assignments = cluster(&features, ARCHETYPE_COUNT, rng)?;
    let mut patterns = label_clusters(&assignments, ARCHETYPE_COUNT);
    patterns.sort_by(|a, b| b.members.cmp(&a.members));
    Ok(patterns)
}

/// Rank clusters by mean avgScore (non-empty first) and attach archetypes.
pub fn label_clusters(
    assignments: &[ClusterAssignment<LearningPatternFeature>],
    k: usize,
) -> Vec<LearningPattern> {
    let mut groups: Vec<Vec<&LearningPatternFeature>> = vec![Vec::new(); k];
    for a in assignments {
        if let Some(group) = groups.get_mut(a.cluster) {
            group.push(&a.data);
        }
    }

    let mut ranked: Vec<(usize, Option<f64>)> = groups
        .iter()
        .enumerate()
        .map(|(idx, members)| {
            let mean = (!members.is_empty())
                .then(|| members.iter().map(|f| f.avg_score).sum::<f64>() / members.len() as f64);
            (idx, mean)
        })
        .collect();
    ranked.sort_by(|a, b| match (a.1, b.1) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });

    ranked
        .into_iter()
        .zip(Archetype::RANKED)
        .map(|((cluster, mean), archetype)| LearningPattern {
            id: archetype.id(),
            archetype,
            name: archetype.name().to_string(),
            description: archetype.description().to_string(),
            characteristics: archetype.characteristics().to_string(),
            members: groups[cluster].len(),
            cluster,
            mean_score: mean.unwrap_or(0.0),
            module_ids: groups[cluster].iter().map(|f| f.module_id.clone()).collect(),
        })
        .collect()
}

// ==================== Decision Tree ====================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationKind {
    FoundationalVisual,
    FoundationalReading,
    FoundationalGeneral,
    AdvancedPractical,
    AdvancedDiscussion,
    AdvancedGeneral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Normal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl Recommendation {
    fn new(kind: RecommendationKind, title: &str, description: &str, priority: Priority) -> Self {
        Self {
            kind,
            title: title.to_string(),
            description: description.to_string(),
            priority,
        }
    }
}

pub fn decision_tree_recommendation(profile: &LearningProfile) -> Recommendation {
    let mut rec = if profile.ability <= 1 {
        match profile.learning_style {
            LearningStyle::Visual => Recommendation::new(
                RecommendationKind::FoundationalVisual,
                "Perkuat Dasar dengan Representasi Visual",
                "Gunakan diagram, peta konsep, dan video untuk membangun pemahaman dasar secara visual.",
                Priority::High,
            ),
            LearningStyle::ReadWrite => Recommendation::new(
                RecommendationKind::FoundationalReading,
                "Fokus pada Membaca dan Mencatat",
                "Gunakan sumber bacaan tambahan dan buat catatan terperinci untuk memperkuat konsep dasar.",
                Priority::High,
            ),
            _ => Recommendation::new(
                RecommendationKind::FoundationalGeneral,
                "Bangun Fondasi Kuat",
                "Fokuskan belajar pada konsep-konsep dasar sebelum melanjut ke topik lanjutan.",
                Priority::High,
            ),
        }
    } else {
        match profile.problem_solving {
            LearningStyle::Kinesthetic => Recommendation::new(
                RecommendationKind::AdvancedPractical,
                "Aplikasi Praktis Konsep",
                "Terapkan langsung konsep-konsep yang dipelajari dalam proyek atau latihan praktis.",
                Priority::Normal,
            ),
            LearningStyle::Aural => Recommendation::new(
                RecommendationKind::AdvancedDiscussion,
                "Diskusi dan Penjelasan Lisan",
                "Berdiskusi dengan sesama mahasiswa atau jelaskan konsep dengan suara Anda sendiri.",
                Priority::Normal,
            ),
            _ => Recommendation::new(
                RecommendationKind::AdvancedGeneral,
                "Pendalaman Konsep",
                "Perdalam pemahaman dengan pendekatan yang sesuai dengan gaya belajar Anda.",
                Priority::Normal,
            ),
        }
    };

    let focus = profile.focus_time.to_lowercase();
    if focus.contains("kurang dari") {
        rec.description
            .push_str(" Belajar dalam sesi pendek namun sering untuk menjaga fokus.");
    } else if focus.contains("lebih dari 45") {
        rec.description.push_str(
            " Anda memiliki durasi fokus yang baik, gunakan untuk belajar dalam sesi yang lebih panjang.",
        );
    }
    rec
}

// ==================== Rule Buckets ====================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    /// >1h high, >30min medium
    pub fn for_time_spent(seconds: f64) -> Self {
        if seconds > 3600.0 {
            Level::High
        } else if seconds > 1800.0 {
            Level::Medium
        } else {
            Level::Low
        }
    }

    pub fn for_access_count(count: u32) -> Self {
        if count > 5 {
            Level::High
        } else if count > 2 {
            Level::Medium
        } else {
            Level::Low
        }
    }

    /// Average correct answers out of five
    pub fn for_average_score(avg: f64) -> Self {
        if avg >= 4.0 {
            Level::High
        } else if avg >= 3.0 {
            Level::Medium
        } else {
            Level::Low
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulePattern {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<Level>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_frequency: Option<Level>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<Level>,
}

pub fn bucket_module_patterns(snapshot: &AnalyticsSnapshot) -> BTreeMap<String, ModulePattern> {
    let mut patterns: BTreeMap<String, ModulePattern> = BTreeMap::new();
    for (module_id, &seconds) in &snapshot.time_spent {
        patterns.entry(module_id.clone()).or_default().time_spent =
            Some(Level::for_time_spent(seconds));
    }
    for (module_id, &count) in &snapshot.access_frequency {
        patterns.entry(module_id.clone()).or_default().access_frequency =
            Some(Level::for_access_count(count));
    }
    for (module_id, perf) in &snapshot.quiz_performance {
        patterns.entry(module_id.clone()).or_default().performance =
            Some(Level::for_average_score(perf.average));
    }
    patterns
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulePattern {
    pub id: u8,
    pub name: String,
    pub description: String,
    pub count: usize,
}

/// Count modules matching each rule; `Emerging Pattern` when none match.
pub fn identify_rule_patterns(modules: &BTreeMap<String, ModulePattern>) -> Vec<RulePattern> {
    let count =
        |pred: &dyn Fn(&ModulePattern) -> bool| modules.values().filter(|p| pred(p)).count();

    let intensive = count(&|p| {
        p.access_frequency == Some(Level::High)
            && p.time_spent == Some(Level::High)
            && p.performance == Some(Level::High)
    });
    let consistent = count(&|p| {
        p.access_frequency == Some(Level::Medium)
            && p.time_spent == Some(Level::Medium)
            && p.performance == Some(Level::Medium)
    });
    let struggling = count(&|p| {
        matches!(p.access_frequency, Some(Level::High) | Some(Level::Low))
            && p.performance == Some(Level::Low)
    });

    let rules = [
        (
            1,
            "Intensive Learner",
            "Mahasiswa yang belajar intensif dengan frekuensi tinggi, waktu lama, dan performa baik",
            intensive,
        ),
        (
            2,
            "Consistent Learner",
            "Mahasiswa yang belajar secara konsisten dengan intensitas sedang",
            consistent,
        ),
        (
            3,
            "Struggling Learner",
            "Mahasiswa yang mengalami kesulitan dalam proses belajar",
            struggling,
        ),
    ];

    let mut patterns: Vec<RulePattern> = rules
        .into_iter()
        .filter(|(_, _, _, n)| *n > 0)
        .map(|(id, name, description, n)| RulePattern {
            id,
            name: name.to_string(),
            description: description.to_string(),
            count: n,
        })
        .collect();

    if patterns.is_empty() {
        patterns.push(RulePattern {
            id: 4,
            name: "Emerging Pattern".to_string(),
            description: "Pola belajar masih dalam tahap terbentuk, perlu lebih banyak data"
                .to_string(),
            count: modules.len(),
        });
    }
    patterns
}
