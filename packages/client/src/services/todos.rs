use chrono::Utc;
use tracing::debug;

use crate::models::Todo;
use crate::store::{keys, KeyValueStore, KeyValueStoreExt, StoreResult};

/// Newest first.
pub fn list_todos(store: &dyn KeyValueStore) -> StoreResult<Vec<Todo>> {
    store.load_or_default(keys::TODOS)
}

pub fn add_todo(store: &dyn KeyValueStore, text: &str, date: &str) -> StoreResult<Todo> {
    let todo = Todo {
        id: uuid::Uuid::new_v4().to_string(),
        text: text.trim().to_string(),
        date: date.to_string(),
        completed: false,
        created_at: Utc::now(),
    };
    let mut todos = list_todos(store)?;
    todos.insert(0, todo.clone());
    store.set_json(keys::TODOS, &todos)?;
    debug!(todo_id = %todo.id, "todo added");
    Ok(todo)
}

/// Flip the completion flag. Returns the updated item, `None` if unknown.
pub fn toggle_todo(store: &dyn KeyValueStore, id: &str) -> StoreResult<Option<Todo>> {
    modify(store, id, |todo| todo.completed = !todo.completed)
}

pub fn update_todo(
    store: &dyn KeyValueStore,
    id: &str,
    text: &str,
    date: &str,
) -> StoreResult<Option<Todo>> {
    modify(store, id, |todo| {
        todo.text = text.trim().to_string();
        todo.date = date.to_string();
    })
}

pub fn delete_todo(store: &dyn KeyValueStore, id: &str) -> StoreResult<bool> {
    let mut todos = list_todos(store)?;
    let before = todos.len();
    todos.retain(|t| t.id != id);
    if todos.len() == before {
        return Ok(false);
    }
    store.set_json(keys::TODOS, &todos)?;
    Ok(true)
}

fn modify(
    store: &dyn KeyValueStore,
    id: &str,
    change: impl FnOnce(&mut Todo),
) -> StoreResult<Option<Todo>> {
    let mut todos = list_todos(store)?;
    let Some(todo) = todos.iter_mut().find(|t| t.id == id) else {
        return Ok(None);
    };
    change(todo);
    let updated = todo.clone();
    store.set_json(keys::TODOS, &todos)?;
    Ok(Some(updated))
}
