use thiserror::Error;

/// Storage operation error.
///
/// These are **infrastructure errors** (IO, encoding) as opposed to domain
/// errors. They stay inside the backends: the public `StorageBackend` methods
/// log them and degrade instead of propagating.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv encoding error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("unsupported entity type: {0}")]
    UnknownEntity(String),

    #[error("malformed data in {entity_type}: {reason}")]
    Malformed { entity_type: String, reason: String },
}

/// Entity types become file names, so keep them to a safe alphabet.
pub(crate) fn check_entity_type(entity_type: &str) -> Result<(), StorageError> {
    let ok = !entity_type.is_empty()
        && entity_type
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-');
    if ok {
        Ok(())
    } else {
        Err(StorageError::UnknownEntity(entity_type.to_string()))
    }
}
