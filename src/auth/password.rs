//! Password hashing interface.
//!
//! bcrypt is CPU-heavy, so both operations run on the blocking pool; the
//! request task suspends instead of stalling the worker.

use crate::error::AppError;

pub async fn hash(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(AppError::internal)?
        .map_err(AppError::internal)
}

pub async fn verify(password: String, password_hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(&password, &password_hash))
        .await
        .map_err(AppError::internal)?
        .map_err(AppError::internal)
}
