//! Mapping of `sqlx` failures onto `DomainError`.

use loreweave_core::error::DomainError;

/// Converts a database error, turning unique-constraint violations into
/// `DomainError::Conflict`.
#[must_use]
pub fn db_error(context: &str, err: &sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = err {
        if db.is_unique_violation() {
            let constraint = db.constraint().unwrap_or("unique constraint");
            return DomainError::Conflict(format!("{context}: {constraint} violated"));
        }
    }
    DomainError::Infrastructure(format!("{context}: {err}"))
}

/// Closure form of [`db_error`] for `map_err`.
pub fn map_db(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |err| db_error(context, &err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_error_is_infrastructure() {
        let err = db_error("load scenes", &sqlx::Error::RowNotFound);
        match err {
            DomainError::Infrastructure(msg) => assert!(msg.starts_with("load scenes: ")),
            other => panic!("expected Infrastructure, got {other:?}"),
        }
    }

    #[test]
    fn test_map_db_keeps_context() {
        let err = map_db("save summary")(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, DomainError::Infrastructure(msg) if msg.contains("save summary")));
    }
}
