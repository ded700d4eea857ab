#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CartError {
    /// The cart was reached through a handle that is not bound to an
    /// active provider.
    #[error("cart.outside_scope")]
    OutsideScope,
    /// The persisted snapshot could not be decoded.
    #[error("cart.corrupted: {0}")]
    Corrupted(String),
    #[error("cart.serialization")]
    Serialization,
    #[error("repository.persistence")]
    Repository(#[from] crate::domain::errors::RepositoryError),
}
