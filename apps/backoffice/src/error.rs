//! # Back Office Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Category          Variants                       Caller sees           │
//! │  ────────────────  ─────────────────────────────  ──────────────────    │
//! │  Collaborator      Database, Core                 propagated as-is      │
//! │  Authorization     StoreAccessDenied              rejected switch       │
//! │  Configuration     ConfigLoad, ConfigParse,       startup failure       │
//! │                    InvalidConfig                                        │
//! │  Worker            Channel, ShuttingDown          publish failed        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A missing sale return is not an error at all; the settlement service
//! returns `Ok(())` for it.

use harbor_core::session::DenialReason;
use harbor_core::CoreError;
use harbor_db::DbError;
use thiserror::Error;

pub type BackofficeResult<T> = Result<T, BackofficeError>;

#[derive(Debug, Error)]
pub enum BackofficeError {
    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Authorization
    // =========================================================================
    /// A select or switch named a store the user may not use.
    #[error("Store {store_id} is not available: {reason}")]
    StoreAccessDenied {
        store_id: String,
        reason: DenialReason,
    },

    // =========================================================================
    // Configuration
    // =========================================================================
    #[error("Failed to load config: {0}")]
    ConfigLoad(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // Worker
    // =========================================================================
    #[error("Channel error: {0}")]
    Channel(String),

    /// The settlement worker has stopped accepting events.
    #[error("Settlement worker is shutting down")]
    ShuttingDown,
}

impl BackofficeError {
    /// Whether redelivering the same event could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            BackofficeError::Database(db) => db.is_transient(),
            BackofficeError::Channel(_) => true,
            _ => false,
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            BackofficeError::ConfigLoad(_)
                | BackofficeError::ConfigParse(_)
                | BackofficeError::InvalidConfig(_)
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(BackofficeError::Database(DbError::PoolExhausted).is_retryable());
        assert!(!BackofficeError::Database(DbError::not_found("SaleReturn", "x")).is_retryable());
        assert!(!BackofficeError::InvalidConfig("bad".into()).is_retryable());
        assert!(!BackofficeError::StoreAccessDenied {
            store_id: "s2".into(),
            reason: DenialReason::NotAMember,
        }
        .is_retryable());
    }

    #[test]
    fn test_core_error_passes_through_display() {
        let err: BackofficeError = CoreError::MissingAccountRole("refunds_payable".into()).into();
        assert_eq!(
            err.to_string(),
            "Account map has no account for role 'refunds_payable'"
        );
        assert!(!err.is_config_error());
    }
}
