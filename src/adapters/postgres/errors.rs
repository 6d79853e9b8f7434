//! Mapping of sqlx failures onto domain error codes.

use crate::domain::foundation::{DomainError, ErrorCode};

/// Unique constraint that keeps one live booking per (table, slot).
pub(crate) const CLAIM_CONSTRAINT: &str = "booking_claims_table_slot_key";

/// Classifies a PostgreSQL SQLSTATE.
///
/// `constraint` is only consulted for unique violations: a duplicate on the
/// claim constraint is a double booking, any other duplicate is a plain
/// database error.
pub fn classify_sqlstate(code: Option<&str>, constraint: Option<&str>) -> ErrorCode {
    match code {
        Some("40001") | Some("40P01") => ErrorCode::SerializationFailure,
        Some("23505") if constraint == Some(CLAIM_CONSTRAINT) => ErrorCode::BookingConflict,
        Some("57014") => ErrorCode::Timeout,
        _ => ErrorCode::DatabaseError,
    }
}

/// Builds a `map_err` closure that keeps the operation name in the message.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| map_sqlx_error(context, e)
}

pub(crate) fn map_sqlx_error(context: &str, error: sqlx::Error) -> DomainError {
    let code = match &error {
        sqlx::Error::Database(db) => {
            classify_sqlstate(db.code().as_deref(), db.constraint())
        }
        sqlx::Error::PoolTimedOut => ErrorCode::Timeout,
        _ => ErrorCode::DatabaseError,
    };

    match code {
        ErrorCode::BookingConflict => {
            DomainError::new(code, "selected tables or time already taken")
        }
        ErrorCode::SerializationFailure | ErrorCode::Timeout => {
            tracing::warn!(context, error = %error, code = %code, "transaction aborted");
            DomainError::new(code, format!("{}: {}", context, error))
        }
        _ => {
            tracing::error!(context, error = %error, "database failure");
            DomainError::new(code, format!("Failed to {}: {}", context, error))
        }
    }
}
