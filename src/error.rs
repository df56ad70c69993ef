//! Error kinds raised by the record store.

use rusqlite::ffi;
use thiserror::Error;

/// Input rejected before any storage access happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{entity} name is required")]
    MissingName { entity: &'static str },

    #[error("invalid date/time '{value}'. Use format: YYYY-MM-DD HH:MM")]
    InvalidDateTime { value: String },

    #[error("invalid date '{value}'. Use format: YYYY-MM-DD")]
    InvalidDate { value: String },
}

/// Failures surfaced by the record store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A required field was blank or a date string had the wrong layout.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// SQLite's foreign keys rejected an appointment insert.
    #[error("doctor {doctor_id} or patient {patient_id} does not exist")]
    Referential { doctor_id: i64, patient_id: i64 },

    /// Any other storage failure.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The data directory could not be created.
    #[error("failed to prepare data directory: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// True when the input was rejected before the database was touched.
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }

    /// True when an appointment pointed at a doctor or patient that does not
    /// exist.
    pub fn is_referential(&self) -> bool {
        matches!(self, StoreError::Referential { .. })
    }
}

/// True when SQLite rejected a statement because of a foreign-key constraint.
pub(crate) fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_name_the_expected_format() {
        let err = StoreError::from(ValidationError::InvalidDateTime {
            value: "02-30-2024 10:00".into(),
        });
        assert!(err.is_validation());
        assert!(!err.is_referential());
        assert!(err.to_string().contains("YYYY-MM-DD HH:MM"));
    }

    #[test]
    fn unrelated_sqlite_errors_are_not_foreign_key_violations() {
        assert!(!is_foreign_key_violation(
            &rusqlite::Error::QueryReturnedNoRows
        ));
    }
}
