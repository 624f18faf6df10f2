use thiserror::Error;

use elara_algo::{KMeansError, ProfileError};

use crate::services::upload::UploadError;
use crate::services::users::RegistrationError;
use crate::store::StoreError;

/// Errors surfaced by client operations. Remote AI failures never appear
/// here; the gateway absorbs them into a fallback reply.
#[derive(Debug, Error)]
pub enum ElaraError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid diagnostic submission: {0}")]
    Profile(#[from] ProfileError),
    #[error("clustering failed: {0}")]
    Clustering(#[from] KMeansError),
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("module {0} not found")]
    ModuleNotFound(String),
    #[error("invalid credentials")]
    InvalidCredentials,
}

pub type ElaraResult<T> = Result<T, ElaraError>;
