use std::fmt;
use thiserror::Error;

/// The kind of entity a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Pos,
    User,
    Review,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Pos => f.write_str("POS"),
            Entity::User => f.write_str("User"),
            Entity::Review => f.write_str("Review"),
        }
    }
}

/// Business rules a request can violate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    DuplicateReview,
    SelfApproval,
    InvalidUser,
    EmptyText,
    ApprovalLimit,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DuplicateReview => {
                f.write_str("duplicate review: the user has already reviewed this POS")
            }
            Violation::SelfApproval => {
                f.write_str("self-approval: users cannot approve their own reviews")
            }
            Violation::InvalidUser => f.write_str("invalid user"),
            Violation::EmptyText => f.write_str("review text must not be empty"),
            Violation::ApprovalLimit => f.write_str("approval count limit reached"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("{entity} with ID {} not found", display_id(.id))]
    NotFound { entity: Entity, id: Option<u64> },
    #[error("Validation error: {0}")]
    ValidationError(Violation),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ReviewError {
    pub fn not_found(entity: Entity, id: impl Into<u64>) -> Self {
        Self::NotFound {
            entity,
            id: Some(id.into()),
        }
    }

    /// Returns the violated rule when this is a validation failure.
    pub fn violation(&self) -> Option<Violation> {
        match self {
            Self::ValidationError(v) => Some(*v),
            _ => None,
        }
    }
}

fn display_id(id: &Option<u64>) -> String {
    id.map_or_else(|| "<none>".to_string(), |id| id.to_string())
}

pub type Result<T> = std::result::Result<T, ReviewError>;
