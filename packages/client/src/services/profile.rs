use tracing::info;

use elara_algo::{build_profile_with, AnswerPolicy, DiagnosticAnswer, LearningProfile};

use crate::error::ElaraResult;
use crate::store::{keys, KeyValueStore, KeyValueStoreExt, StoreResult};

pub fn save_profile(store: &dyn KeyValueStore, profile: &LearningProfile) -> StoreResult<()> {
    store.set_json(keys::LEARNING_PROFILE, profile)
}

/// `None` when no diagnostic was taken or the stored profile is unreadable.
pub fn load_profile(store: &dyn KeyValueStore) -> StoreResult<Option<LearningProfile>> {
    store.load_or_default::<Option<LearningProfile>>(keys::LEARNING_PROFILE)
}

/// Build a profile from diagnostic answers and persist it, replacing any
/// earlier one.
pub fn submit_diagnostic(
    store: &dyn KeyValueStore,
    answers: &[DiagnosticAnswer],
    policy: AnswerPolicy,
) -> ElaraResult<LearningProfile> {
    let profile = build_profile_with(answers, policy)?;
    save_profile(store, &profile)?;
    info!(
        style = profile.learning_style.as_str(),
        ability = profile.ability,
        "learning profile saved"
    );
    Ok(profile)
}
