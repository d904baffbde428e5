//! Database access for the entities table.

use mend_engine::Entity;
use sqlx::{PgConnection, PgPool, Row};

/// A stored entity row from the database.
#[derive(Debug)]
pub struct EntityRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub updated_at: String,
    pub version: i64,
    pub deleted: bool,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for EntityRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(EntityRow {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            updated_at: row.try_get("updated_at")?,
            version: row.try_get("version")?,
            deleted: row.try_get("deleted")?,
        })
    }
}

impl EntityRow {
    /// Convert a database row to an engine entity.
    pub fn into_entity(self) -> Entity {
        Entity {
            id: self.id,
            title: self.title,
            description: self.description,
            updated_at: self.updated_at,
            version: self.version as u64,
            deleted: self.deleted,
        }
    }
}

/// Take a transaction-scoped lock on an entity id, row or no row.
///
/// `FOR UPDATE` only locks rows that exist, so two concurrent first
/// creates of one id would both read absent and both write version 1.
/// An advisory lock on the id itself covers that gap; it releases when
/// the transaction commits or rolls back.
pub async fn lock_entity(conn: &mut PgConnection, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Fetch an entity by id, tombstoned or not, holding a row lock for the
/// rest of the transaction. Callers serialize on [`lock_entity`] first;
/// the row lock only covers entities that already exist.
pub async fn get_entity_for_update(
    conn: &mut PgConnection,
    id: &str,
) -> Result<Option<Entity>, sqlx::Error> {
    let row = sqlx::query_as::<_, EntityRow>(
        r#"
        SELECT id, title, description, updated_at, version, deleted
        FROM entities
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(EntityRow::into_entity))
}

/// Upsert an entity (insert or full replace).
pub async fn upsert_entity(conn: &mut PgConnection, entity: &Entity) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO entities (id, title, description, updated_at, version, deleted)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (id) DO UPDATE SET
            title = EXCLUDED.title,
            description = EXCLUDED.description,
            updated_at = EXCLUDED.updated_at,
            version = EXCLUDED.version,
            deleted = EXCLUDED.deleted
        "#,
    )
    .bind(&entity.id)
    .bind(&entity.title)
    .bind(&entity.description)
    .bind(&entity.updated_at)
    .bind(entity.version as i64)
    .bind(entity.deleted)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// All live entities ordered by id, as one consistent read.
pub async fn list_active_entities(pool: &PgPool) -> Result<Vec<Entity>, sqlx::Error> {
    let rows = sqlx::query_as::<_, EntityRow>(
        r#"
        SELECT id, title, description, updated_at, version, deleted
        FROM entities
        WHERE deleted = FALSE
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(EntityRow::into_entity).collect())
}
