//! Repository for the `pads` table.

use faser_core::types::DbId;
use faser_core::validation::{FieldErrors, Validatable};
use sqlx::PgConnection;

use crate::models::pad::Pad;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, created_at, updated_at, name, port, player_id";

/// Provides CRUD operations for pads.
pub struct PadRepo;

impl PadRepo {
    /// Every pad in the table. No ordering is applied; callers must not
    /// rely on the order rows come back in.
    pub async fn all(conn: &mut PgConnection) -> Result<Vec<Pad>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pads");
        sqlx::query_as::<_, Pad>(&query).fetch_all(conn).await
    }

    pub async fn count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pads")
            .fetch_one(conn)
            .await?;
        Ok(count)
    }

    pub async fn find(conn: &mut PgConnection, id: DbId) -> Result<Option<Pad>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pads WHERE id = $1");
        sqlx::query_as::<_, Pad>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Insert `pad` as-is (no validation). Both timestamps are set by the
    /// database and copied back into `pad`.
    pub async fn create(conn: &mut PgConnection, pad: &mut Pad) -> Result<(), sqlx::Error> {
        let query = format!(
            "INSERT INTO pads (id, created_at, updated_at, name, port, player_id)
             VALUES ($1, NOW(), NOW(), $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let saved = sqlx::query_as::<_, Pad>(&query)
            .bind(pad.id)
            .bind(&pad.name)
            .bind(&pad.port)
            .bind(pad.player_id)
            .fetch_one(conn)
            .await?;
        *pad = saved;
        Ok(())
    }

    /// Write every mutable column of `pad` and bump `updated_at`.
    ///
    /// Fails with `RowNotFound` if the pad does not exist.
    pub async fn update(conn: &mut PgConnection, pad: &mut Pad) -> Result<(), sqlx::Error> {
        let query = format!(
            "UPDATE pads SET
                name = $2,
                port = $3,
                player_id = $4,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let saved = sqlx::query_as::<_, Pad>(&query)
            .bind(pad.id)
            .bind(&pad.name)
            .bind(&pad.port)
            .bind(pad.player_id)
            .fetch_one(conn)
            .await?;
        *pad = saved;
        Ok(())
    }

    /// Permanently delete a pad by ID. Returns `true` if a row was removed.
    pub async fn destroy(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pads WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Validate for creation, then insert. Nothing is written when the
    /// returned collection is non-empty.
    pub async fn validate_and_create(
        conn: &mut PgConnection,
        pad: &mut Pad,
    ) -> Result<FieldErrors, sqlx::Error> {
        let errors = pad.validate_for_create();
        if errors.has_any() {
            tracing::debug!(pad_id = %pad.id, %errors, "Pad failed validation on create");
            return Ok(errors);
        }
        Self::create(conn, pad).await?;
        Ok(errors)
    }

    /// Validate for update, then write. Nothing is written when the
    /// returned collection is non-empty.
    pub async fn validate_and_update(
        conn: &mut PgConnection,
        pad: &mut Pad,
    ) -> Result<FieldErrors, sqlx::Error> {
        let errors = pad.validate_for_update();
        if errors.has_any() {
            tracing::debug!(pad_id = %pad.id, %errors, "Pad failed validation on update");
            return Ok(errors);
        }
        Self::update(conn, pad).await?;
        Ok(errors)
    }
}
