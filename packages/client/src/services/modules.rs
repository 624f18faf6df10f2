//! Module records with their quizzes and summaries.
//!
//! Modules live in one array under `modules`; quizzes and summaries are
//! maps keyed by module id so they can be loaded without the module list.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::models::{Module, ModuleSummary, QuizQuestion};
use crate::store::{keys, KeyValueStore, KeyValueStoreExt, StoreResult};

pub type QuizMap = BTreeMap<String, Vec<QuizQuestion>>;
pub type SummaryMap = BTreeMap<String, ModuleSummary>;

pub fn generate_module_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Insert or replace the record with the same id.
pub fn save_module_info(store: &dyn KeyValueStore, module: &Module) -> StoreResult<()> {
    let mut modules: Vec<Module> = store.load_or_default(keys::MODULES)?;
    match modules.iter_mut().find(|m| m.id == module.id) {
        Some(existing) => *existing = module.clone(),
        None => modules.push(module.clone()),
    }
    store.set_json(keys::MODULES, &modules)?;
    debug!(module_id = %module.id, total = modules.len(), "module saved");
    Ok(())
}

/// All modules, with stored summaries merged into records that lack them.
pub fn load_all_modules(store: &dyn KeyValueStore) -> StoreResult<Vec<Module>> {
    let mut modules: Vec<Module> = store.load_or_default(keys::MODULES)?;
    let summaries: SummaryMap = store.load_or_default(keys::SUMMARIES)?;
    for module in &mut modules {
        if let Some(summary) = summaries.get(&module.id) {
            module.merge_summary(summary);
        }
    }
    Ok(modules)
}

pub fn find_module(store: &dyn KeyValueStore, module_id: &str) -> StoreResult<Option<Module>> {
    Ok(load_all_modules(store)?.into_iter().find(|m| m.id == module_id))
}

/// Remove the module with its quiz and summary. Analytics history is kept.
pub fn delete_module(store: &dyn KeyValueStore, module_id: &str) -> StoreResult<bool> {
    let mut modules: Vec<Module> = store.load_or_default(keys::MODULES)?;
    let before = modules.len();
    modules.retain(|m| m.id != module_id);
    let removed = modules.len() != before;
    if removed {
        store.set_json(keys::MODULES, &modules)?;
    }

    let mut quizzes: QuizMap = store.load_or_default(keys::QUIZZES)?;
    if quizzes.remove(module_id).is_some() {
        store.set_json(keys::QUIZZES, &quizzes)?;
    }

    let mut summaries: SummaryMap = store.load_or_default(keys::SUMMARIES)?;
    if summaries.remove(module_id).is_some() {
        store.set_json(keys::SUMMARIES, &summaries)?;
    }

    if removed {
        info!(module_id, "module deleted");
    }
    Ok(removed)
}

pub fn save_quiz(
    store: &dyn KeyValueStore,
    module_id: &str,
    questions: &[QuizQuestion],
) -> StoreResult<()> {
    let mut quizzes: QuizMap = store.load_or_default(keys::QUIZZES)?;
    quizzes.insert(module_id.to_string(), questions.to_vec());
    store.set_json(keys::QUIZZES, &quizzes)
}

/// Stored questions for a module; empty when none were saved.
pub fn load_quiz(store: &dyn KeyValueStore, module_id: &str) -> StoreResult<Vec<QuizQuestion>> {
    let mut quizzes: QuizMap = store.load_or_default(keys::QUIZZES)?;
    Ok(quizzes.remove(module_id).unwrap_or_default())
}

pub fn save_summary(
    store: &dyn KeyValueStore,
    module_id: &str,
    summary: &ModuleSummary,
) -> StoreResult<()> {
    let mut summaries: SummaryMap = store.load_or_default(keys::SUMMARIES)?;
    summaries.insert(module_id.to_string(), summary.clone());
    store.set_json(keys::SUMMARIES, &summaries)
}

pub fn load_summary(
    store: &dyn KeyValueStore,
    module_id: &str,
) -> StoreResult<Option<ModuleSummary>> {
    let mut summaries: SummaryMap = store.load_or_default(keys::SUMMARIES)?;
    Ok(summaries.remove(module_id))
}
