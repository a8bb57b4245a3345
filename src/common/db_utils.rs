// src/common/db_utils.rs

use sqlx::{postgres::PgRow, FromRow};

/// Decodes rows one at a time. A row that does not decode is logged and
/// skipped so one corrupt record cannot blank out a whole listing.
pub(crate) fn decode_rows<T>(rows: Vec<PgRow>, table: &'static str) -> Vec<T>
where
    T: for<'r> FromRow<'r, PgRow>,
{
    let total = rows.len();
    let decoded: Vec<T> = rows
        .iter()
        .filter_map(|row| match T::from_row(row) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping malformed row in '{}': {}", table, e);
                None
            }
        })
        .collect();

    if decoded.len() < total {
        tracing::warn!(
            "{} of {} rows in '{}' could not be decoded",
            total - decoded.len(),
            total,
            table
        );
    }

    decoded
}

/// Returns the violated constraint name when `err` is a unique violation.
pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<String> {
    let db_err = err.as_database_error()?;
    if db_err.is_unique_violation() {
        Some(db_err.constraint().unwrap_or_default().to_string())
    } else {
        None
    }
}
