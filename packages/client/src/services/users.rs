//! Local accounts keyed by NIM (student number).
//!
//! Passwords are stored as entered, matching the stored `users` schema.
//! This offers no protection for the password at rest.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::error::{ElaraError, ElaraResult};
use crate::models::UserAccount;
use crate::store::{keys, KeyValueStore, KeyValueStoreExt, StoreResult};

pub const MIN_CREDENTIAL_CHARS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("NIM harus diisi")]
    MissingNim,
    #[error("NIM harus terdiri dari minimal 6 karakter")]
    NimTooShort,
    #[error("Password harus diisi")]
    MissingPassword,
    #[error("Password harus terdiri dari minimal 6 karakter")]
    PasswordTooShort,
    #[error("Password dan konfirmasi password tidak cocok")]
    PasswordMismatch,
    #[error("NIM sudah terdaftar. Silakan gunakan NIM lain.")]
    NimTaken,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub nim: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user: CurrentUser,
    /// No learning profile yet; the diagnostic quiz comes first
    pub needs_diagnostic: bool,
}

pub fn validate_registration(
    nim: &str,
    password: &str,
    confirmation: &str,
) -> Result<(), RegistrationError> {
    let nim = nim.trim();
    if nim.is_empty() {
        return Err(RegistrationError::MissingNim);
    }
    if nim.chars().count() < MIN_CREDENTIAL_CHARS {
        return Err(RegistrationError::NimTooShort);
    }
    if password.is_empty() {
        return Err(RegistrationError::MissingPassword);
    }
    if password.chars().count() < MIN_CREDENTIAL_CHARS {
        return Err(RegistrationError::PasswordTooShort);
    }
    if password != confirmation {
        return Err(RegistrationError::PasswordMismatch);
    }
    Ok(())
}

pub fn register(
    store: &dyn KeyValueStore,
    nim: &str,
    password: &str,
    confirmation: &str,
) -> ElaraResult<UserAccount> {
    validate_registration(nim, password, confirmation)?;
    let nim = nim.trim();

    let mut users: Vec<UserAccount> = store.load_or_default(keys::USERS)?;
    if users.iter().any(|u| u.nim == nim) {
        return Err(RegistrationError::NimTaken.into());
    }

    let account = UserAccount {
        nim: nim.to_string(),
        password: password.to_string(),
        created_at: Utc::now(),
    };
    users.push(account.clone());
    store.set_json(keys::USERS, &users)?;
    info!(nim = %account.nim, "account registered");
    Ok(account)
}

/// Check credentials and remember the signed-in user.
pub fn login(store: &dyn KeyValueStore, nim: &str, password: &str) -> ElaraResult<LoginOutcome> {
    let nim = nim.trim();
    if nim.is_empty() || password.is_empty() {
        return Err(ElaraError::InvalidCredentials);
    }
    let users: Vec<UserAccount> = store.load_or_default(keys::USERS)?;
    if !users.iter().any(|u| u.nim == nim && u.password == password) {
        return Err(ElaraError::InvalidCredentials);
    }

    let user = CurrentUser { nim: nim.to_string() };
    store.set_json(keys::CURRENT_USER, &user)?;
    let needs_diagnostic = store.get(keys::LEARNING_PROFILE)?.is_none();
    info!(nim, needs_diagnostic, "user signed in");
    Ok(LoginOutcome { user, needs_diagnostic })
}

pub fn current_user(store: &dyn KeyValueStore) -> StoreResult<Option<CurrentUser>> {
    store.load_or_default(keys::CURRENT_USER)
}

pub fn logout(store: &dyn KeyValueStore) -> StoreResult<()> {
    store.remove(keys::CURRENT_USER).map(|_| ())
}
