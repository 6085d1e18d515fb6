//! Database operations for `catalog_entries`.

use kirana_core::CatalogEntryDraft;
use sqlx::{Connection, PgConnection, PgPool};

use crate::DbError;

/// Bulk-inserts drafts for one store and returns how many rows actually landed.
///
/// The batch goes in as one `INSERT … SELECT FROM UNNEST(…) ON CONFLICT DO
/// NOTHING`. A unique-key collision (an SKU that already exists in the store,
/// or appears twice in the batch) skips that row. Any other row-level failure
/// (a check constraint, numeric overflow, bytes Postgres will not store)
/// rolls the batch statement back and the drafts are retried one by one, each
/// under its own savepoint, so only the offending rows are lost. The returned
/// count is what landed, never `drafts.len()`.
///
/// # Errors
///
/// Returns [`DbError::Meta`] if a meta block cannot be encoded, or
/// [`DbError::Sqlx`] for failures that are not tied to a single row.
pub async fn insert_catalog_entries(
    pool: &PgPool,
    store_id: i64,
    drafts: &[CatalogEntryDraft],
) -> Result<u64, DbError> {
    if drafts.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let inserted = insert_tolerant(&mut tx, store_id, drafts).await?;
    tx.commit().await?;
    Ok(inserted)
}

/// Inserts drafts and adds the landed count to `stores.total_products` in one
/// transaction, so the counter always matches the committed rows.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the store does not exist, or any error
/// from [`insert_catalog_entries`]. Nothing is committed on error.
pub async fn commit_catalog_entries(
    pool: &PgPool,
    store_id: i64,
    drafts: &[CatalogEntryDraft],
) -> Result<u64, DbError> {
    if drafts.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let inserted = insert_tolerant(&mut tx, store_id, drafts).await?;
    if inserted > 0 {
        crate::stores::increment_total_products_on(&mut tx, store_id, inserted).await?;
    }
    tx.commit().await?;
    Ok(inserted)
}

/// Batch insert under a savepoint, falling back to per-row savepoints when a
/// row-level error aborts the batch.
async fn insert_tolerant(
    conn: &mut PgConnection,
    store_id: i64,
    drafts: &[CatalogEntryDraft],
) -> Result<u64, DbError> {
    let mut batch = conn.begin().await?;
    match insert_unnest(&mut batch, store_id, drafts).await {
        Ok(inserted) => {
            batch.commit().await?;
            return Ok(inserted);
        }
        Err(DbError::Sqlx(e)) if is_row_level(&e) => {
            batch.rollback().await?;
            tracing::warn!(
                store_id,
                attempted = drafts.len(),
                error = %e,
                "batch insert rejected a row; retrying row by row"
            );
        }
        Err(e) => return Err(e),
    }

    let mut inserted = 0;
    for draft in drafts {
        let mut row = conn.begin().await?;
        match insert_unnest(&mut row, store_id, std::slice::from_ref(draft)).await {
            Ok(n) => {
                row.commit().await?;
                inserted += n;
            }
            Err(DbError::Sqlx(e)) if is_row_level(&e) => {
                row.rollback().await?;
                tracing::warn!(store_id, name = %draft.name, error = %e, "catalog entry rejected");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(inserted)
}

/// SQLSTATE classes 22 (data exception) and 23 (integrity constraint
/// violation) are caused by the row's values, not by the connection.
fn is_row_level(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db
            .code()
            .is_some_and(|code| code.starts_with("22") || code.starts_with("23")),
        _ => false,
    }
}

async fn insert_unnest(
    conn: &mut PgConnection,
    store_id: i64,
    drafts: &[CatalogEntryDraft],
) -> Result<u64, DbError> {
    // Collect each column into a parallel Vec for UNNEST binding.
    let n = drafts.len();
    let mut vendor_ids: Vec<i64> = Vec::with_capacity(n);
    let mut names: Vec<String> = Vec::with_capacity(n);
    let mut descriptions: Vec<String> = Vec::with_capacity(n);
    let mut categories: Vec<String> = Vec::with_capacity(n);
    let mut subcategories: Vec<String> = Vec::with_capacity(n);
    let mut brands: Vec<String> = Vec::with_capacity(n);
    let mut prices: Vec<f64> = Vec::with_capacity(n);
    let mut discount_prices: Vec<f64> = Vec::with_capacity(n);
    let mut stocks: Vec<i64> = Vec::with_capacity(n);
    let mut in_stocks: Vec<bool> = Vec::with_capacity(n);
    let mut units: Vec<String> = Vec::with_capacity(n);
    let mut skus: Vec<Option<String>> = Vec::with_capacity(n);
    let mut images: Vec<serde_json::Value> = Vec::with_capacity(n);
    let mut tags: Vec<serde_json::Value> = Vec::with_capacity(n);
    let mut is_actives: Vec<bool> = Vec::with_capacity(n);
    let mut is_availables: Vec<bool> = Vec::with_capacity(n);
    let mut metas: Vec<serde_json::Value> = Vec::with_capacity(n);

    for draft in drafts {
        vendor_ids.push(draft.vendor_id);
        names.push(draft.name.clone());
        descriptions.push(draft.description.clone());
        categories.push(draft.category.clone());
        subcategories.push(draft.subcategory.clone());
        brands.push(draft.brand.clone());
        prices.push(draft.price);
        discount_prices.push(draft.discount_price);
        stocks.push(draft.stock);
        in_stocks.push(draft.in_stock);
        units.push(draft.unit.clone());
        skus.push(draft.sku.clone());
        images.push(serde_json::to_value(&draft.images)?);
        tags.push(serde_json::to_value(&draft.tags)?);
        is_actives.push(draft.is_active);
        is_availables.push(draft.is_available);
        metas.push(serde_json::to_value(&draft.meta)?);
    }

    let rows_affected = sqlx::query(
        "INSERT INTO catalog_entries \
             (store_id, vendor_id, name, description, category, subcategory, brand, \
              price, discount_price, stock, in_stock, unit, sku, images, tags, \
              is_active, is_available, meta) \
         SELECT $1, t.vendor_id, t.name, t.description, t.category, t.subcategory, t.brand, \
                t.price::numeric(10,2), t.discount_price::numeric(10,2), t.stock, t.in_stock, \
                t.unit, t.sku, t.images, t.tags, t.is_active, t.is_available, t.meta \
         FROM UNNEST( \
             $2::bigint[], $3::text[], $4::text[], $5::text[], $6::text[], $7::text[], \
             $8::float8[], $9::float8[], $10::bigint[], $11::bool[], $12::text[], \
             $13::text[], $14::jsonb[], $15::jsonb[], $16::bool[], $17::bool[], $18::jsonb[] \
         ) AS t(vendor_id, name, description, category, subcategory, brand, \
                price, discount_price, stock, in_stock, unit, \
                sku, images, tags, is_active, is_available, meta) \
         ON CONFLICT DO NOTHING",
    )
    .bind(store_id)
    .bind(&vendor_ids)
    .bind(&names)
    .bind(&descriptions)
    .bind(&categories)
    .bind(&subcategories)
    .bind(&brands)
    .bind(&prices)
    .bind(&discount_prices)
    .bind(&stocks)
    .bind(&in_stocks)
    .bind(&units)
    .bind(&skus)
    .bind(&images)
    .bind(&tags)
    .bind(&is_actives)
    .bind(&is_availables)
    .bind(&metas)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok(rows_affected)
}

/// Counts active catalog entries for a store.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_catalog_entries(pool: &PgPool, store_id: i64) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM catalog_entries WHERE store_id = $1 AND is_active = true",
    )
    .bind(store_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
