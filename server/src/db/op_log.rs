//! Database access for the processed operations ledger.
//!
//! The ledger is append-only: one row per operation id ever applied, with
//! the primary key standing in for an explicit uniqueness check under
//! concurrency.

use sqlx::PgConnection;

/// Check whether an operation id is already in the ledger.
pub async fn op_exists(conn: &mut PgConnection, op_id: &str) -> Result<bool, sqlx::Error> {
    let result: (bool,) =
        sqlx::query_as(r#"SELECT EXISTS(SELECT 1 FROM processed_ops WHERE op_id = $1)"#)
            .bind(op_id)
            .fetch_one(&mut *conn)
            .await?;

    Ok(result.0)
}

/// Record an operation id in the ledger.
pub async fn record_op(conn: &mut PgConnection, op_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"INSERT INTO processed_ops (op_id) VALUES ($1)"#)
        .bind(op_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Check if a SQL error is a unique constraint violation.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = e {
        // PostgreSQL unique violation code is "23505"
        db_err.code().map(|c| c == "23505").unwrap_or(false)
    } else {
        false
    }
}
