//! # Validation Module
//!
//! Input checks shared by the journal builder, configuration loading and
//! the repositories.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Where checks run                                                       │
//! │                                                                         │
//! │  Config load ──► validate_account_map    (required roles present)      │
//! │  Journal     ──► validate_refund         (0 <= tax <= total)           │
//! │  CLI args    ──► validate_id             (non-empty, bounded)          │
//! │                                                                         │
//! │  SQLite CHECK constraints back up the refund rule at rest.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::accounting::AccountMap;
use crate::error::{CoreError, CoreResult, ValidationError};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest identifier accepted from outside (UUIDs are 36).
pub const MAX_ID_LEN: usize = 64;

// =============================================================================
// Identifiers
// =============================================================================

/// Validates an externally supplied record id.
///
/// Ids are usually UUIDs but seeded and imported data may use other
/// opaque strings, so only emptiness and length are enforced here.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.len() > MAX_ID_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_LEN,
        });
    }

    Ok(())
}

/// Validates a UUID string.
///
/// ```rust
/// use harbor_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    validate_id("id", id)?;

    uuid::Uuid::parse_str(id.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Amounts
// =============================================================================

/// Checks `0 <= tax_refund <= total_refund`.
pub fn validate_refund(total_refund_cents: i64, tax_refund_cents: i64) -> CoreResult<()> {
    if total_refund_cents < 0 {
        return Err(CoreError::InvalidRefund {
            reason: format!("total refund {total_refund_cents} is negative"),
        });
    }
    if tax_refund_cents < 0 {
        return Err(CoreError::InvalidRefund {
            reason: format!("tax refund {tax_refund_cents} is negative"),
        });
    }
    if tax_refund_cents > total_refund_cents {
        return Err(CoreError::InvalidRefund {
            reason: format!(
                "tax refund {tax_refund_cents} exceeds total refund {total_refund_cents}"
            ),
        });
    }
    Ok(())
}

/// Credit amounts must be non-negative.
pub fn validate_credit_amount(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "credit amount".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

// =============================================================================
// Configuration
// =============================================================================

/// Every required account role must map to a non-blank code.
pub fn validate_account_map(map: &AccountMap) -> CoreResult<()> {
    match map.missing_required() {
        Some(role) => Err(CoreError::MissingAccountRole(role.key().to_string())),
        None => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
