/// Storage errors surfaced by key-value store adapters.
/// Use code-style identifiers for all error variants for i18n compatibility.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository.read_failed")]
    ReadFailed,
    #[error("repository.write_failed")]
    WriteFailed,
    #[error("repository.database_error")]
    DatabaseError,
}

impl RepositoryError {
    pub fn read_failed() -> Self {
        RepositoryError::ReadFailed
    }
    pub fn write_failed() -> Self {
        RepositoryError::WriteFailed
    }
    pub fn database_error() -> Self {
        RepositoryError::DatabaseError
    }
}
