use chrono::Utc;

use crate::models::UserProgress;
use crate::store::{keys, KeyValueStore, KeyValueStoreExt, StoreResult};

pub fn load_progress(store: &dyn KeyValueStore) -> StoreResult<UserProgress> {
    store.load_or_default(keys::USER_PROGRESS)
}

/// Mark a module completed. Repeated completions are recorded once.
pub fn complete_module(store: &dyn KeyValueStore, module_id: &str) -> StoreResult<UserProgress> {
    let mut progress = load_progress(store)?;
    push_unique(&mut progress.modules_completed, module_id);
    progress.last_activity = Some(Utc::now());
    store.set_json(keys::USER_PROGRESS, &progress)?;
    Ok(progress)
}

/// Record a finished quiz; the score replaces any earlier one for the module.
pub fn complete_quiz(
    store: &dyn KeyValueStore,
    module_id: &str,
    score: f64,
) -> StoreResult<UserProgress> {
    let mut progress = load_progress(store)?;
    push_unique(&mut progress.quizzes_taken, module_id);
    progress.scores.insert(module_id.to_string(), score);
    progress.last_activity = Some(Utc::now());
    store.set_json(keys::USER_PROGRESS, &progress)?;
    Ok(progress)
}

pub fn reset_progress(store: &dyn KeyValueStore) -> StoreResult<()> {
    store.set_json(keys::USER_PROGRESS, &UserProgress::default())
}

fn push_unique(ids: &mut Vec<String>, id: &str) {
    if !ids.iter().any(|existing| existing == id) {
        ids.push(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn completions_are_deduplicated() {
        let store = MemoryStore::new();
        complete_module(&store, "m1").unwrap();
        let progress = complete_module(&store, "m1").unwrap();
        assert_eq!(progress.modules_completed, vec!["m1".to_string()]);
        assert!(progress.last_activity.is_some());
    }

    #[test]
    fn quiz_score_is_latest() {
        let store = MemoryStore::new();
        complete_quiz(&store, "m1", 3.0).unwrap();
        let progress = complete_quiz(&store, "m1", 5.0).unwrap();
        assert_eq!(progress.quizzes_taken.len(), 1);
        assert_eq!(progress.scores["m1"], 5.0);
        assert_eq!(load_progress(&store).unwrap(), progress);
    }

    #[test]
    fn reset_clears_everything() {
        let store = MemoryStore::new();
        complete_quiz(&store, "m1", 4.0).unwrap();
        reset_progress(&store).unwrap();
        assert_eq!(load_progress(&store).unwrap(), UserProgress::default());
    }
}
