//! Error types for ec-migrate

use ec_core::{CoreError, Direction};
use ec_db::DbError;
use thiserror::Error;

/// Error type returned by migration code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Migration engine errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Missing or invalid migrations directory or database name (M001)
    #[error("[M001] Configuration error: {message}")]
    Configuration { message: String },

    /// Two migration files resolve to the same version (M002)
    #[error("[M002] Duplicate migration version {version}: '{first}' and '{second}'")]
    DuplicateVersion {
        version: String,
        first: String,
        second: String,
    },

    /// A rollback would undo more migrations than allowed (M003)
    #[error(
        "[M003] Rolling back to {target} would roll back {pending} migration(s); \
         at most {limit} may be rolled back at once"
    )]
    RollbackLimitExceeded {
        target: String,
        pending: usize,
        limit: usize,
    },

    /// A migration's up/down code failed (M004)
    #[error("[M004] Migration {migration} failed while migrating {direction}: {source}")]
    Execution {
        migration: String,
        direction: Direction,
        source: BoxError,
    },

    /// Ledger query or write failed (M005)
    #[error("[M005] Ledger storage failed: {0}")]
    Storage(#[from] DbError),

    /// Code for a migration could not be resolved or read (M006)
    #[error("[M006] Cannot load code for migration {migration} from {path}: {message}")]
    CodeLoad {
        migration: String,
        path: String,
        message: String,
    },

    /// An SQL migration script is malformed (M007)
    #[error("[M007] Invalid migration script {path}: {reason}")]
    InvalidScript { path: String, reason: String },

    /// Filesystem error outside of code loading (M008)
    #[error("[M008] IO error on '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;

impl From<CoreError> for MigrateError {
    fn from(err: CoreError) -> Self {
        MigrateError::Configuration {
            message: err.to_string(),
        }
    }
}
