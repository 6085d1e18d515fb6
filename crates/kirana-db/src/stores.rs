//! Database operations for `stores`.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crate::DbError;

/// A row from the `stores` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreRow {
    pub id: i64,
    pub vendor_id: i64,
    pub name: String,
    /// `general`, `medical`, or `restaurant`; parsed with
    /// [`kirana_core::StoreType::from_declared`].
    pub store_type: String,
    pub is_active: bool,
    /// Aggregate maintained by bulk uploads; see
    /// [`increment_store_total_products`].
    pub total_products: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoreRow {
    #[must_use]
    pub fn store_type(&self) -> kirana_core::StoreType {
        kirana_core::StoreType::from_declared(&self.store_type)
    }
}

/// Returns the active store owned by `vendor_id`, if any.
///
/// A vendor owns at most one store; the oldest active store wins if the
/// schema ever holds more.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_store_for_vendor(
    pool: &PgPool,
    vendor_id: i64,
) -> Result<Option<StoreRow>, DbError> {
    let row = sqlx::query_as::<_, StoreRow>(
        "SELECT id, vendor_id, name, store_type, is_active, total_products, \
                created_at, updated_at \
         FROM stores \
         WHERE vendor_id = $1 AND is_active = true \
         ORDER BY created_at ASC, id ASC \
         LIMIT 1",
    )
    .bind(vendor_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns a store by primary key, active or not.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_store_by_id(pool: &PgPool, store_id: i64) -> Result<Option<StoreRow>, DbError> {
    let row = sqlx::query_as::<_, StoreRow>(
        "SELECT id, vendor_id, name, store_type, is_active, total_products, \
                created_at, updated_at \
         FROM stores \
         WHERE id = $1",
    )
    .bind(store_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Adds `by` to `stores.total_products` in a single atomic `UPDATE`.
///
/// Bulk uploads go through
/// [`commit_catalog_entries`](crate::catalog_entries::commit_catalog_entries),
/// which runs the same update inside the insert transaction.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the store does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn increment_store_total_products(
    pool: &PgPool,
    store_id: i64,
    by: u64,
) -> Result<(), DbError> {
    let mut conn = pool.acquire().await?;
    increment_total_products_on(&mut conn, store_id, by).await
}

pub(crate) async fn increment_total_products_on(
    conn: &mut PgConnection,
    store_id: i64,
    by: u64,
) -> Result<(), DbError> {
    let by = i64::try_from(by).map_err(|_| DbError::CountOverflow(by))?;

    let result = sqlx::query(
        "UPDATE stores \
         SET total_products = total_products + $1, updated_at = NOW() \
         WHERE id = $2",
    )
    .bind(by)
    .bind(store_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
