//! Storage key names. Values are JSON documents.

pub const LEARNING_PROFILE: &str = "learningProfile";
/// Array of module records
pub const MODULES: &str = "modules";
/// Map of module id to quiz questions
pub const QUIZZES: &str = "quizzes";
/// Map of module id to summary
pub const SUMMARIES: &str = "summaries";
pub const USER_PROGRESS: &str = "userProgress";
pub const TODOS: &str = "todos";
pub const LEARNING_ANALYTICS: &str = "learningAnalytics";
pub const USERS: &str = "users";
pub const CURRENT_USER: &str = "currentUser";

pub fn all_keys() -> &'static [&'static str] {
    &[
        LEARNING_PROFILE,
        MODULES,
        QUIZZES,
        SUMMARIES,
        USER_PROGRESS,
        TODOS,
        LEARNING_ANALYTICS,
        USERS,
        CURRENT_USER,
    ]
}
