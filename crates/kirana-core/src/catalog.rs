use serde::{Deserialize, Serialize};

/// Cap on per-row error entries echoed back in an [`UploadSummary`].
pub const MAX_REPORTED_ERRORS: usize = 10;

/// A normalized, not-yet-persisted catalog entry produced from one spreadsheet
/// row.
///
/// A draft only exists when `name` is non-empty and at least one of the
/// resolved prices was strictly positive; `discount_price` never exceeds
/// `price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntryDraft {
    pub store_id: i64,
    pub vendor_id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub subcategory: String,
    pub brand: String,
    /// Base (MRP) price. Converted to `NUMERIC(10,2)` when persisted.
    pub price: f64,
    /// Price actually charged; equal to `price` when there is no discount.
    pub discount_price: f64,
    pub stock: i64,
    pub in_stock: bool,
    pub unit: String,
    pub sku: Option<String>,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub is_available: bool,
    pub meta: EntryMeta,
}

/// Store-type-specific attributes stored in the `meta` JSONB column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntryMeta {
    General,
    Medical(MedicalMeta),
    Restaurant(RestaurantMeta),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalMeta {
    pub mrp: f64,
    pub brand: String,
    pub salt_name: String,
    pub batch_no: String,
    /// Expiry as entered by the vendor; Excel date cells arrive as `YYYY-MM-DD`.
    pub expiry_date: String,
    pub prescription_required: bool,
    pub pack_size: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantMeta {
    pub is_veg: bool,
    /// Preparation time in minutes.
    pub prep_time: i64,
    pub serves: i64,
    pub spice_level: String,
    pub cuisine: String,
}

/// One rejected or failed spreadsheet row, numbered the way the vendor sees it
/// in their spreadsheet (header is row 1, first data row is row 2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub error: String,
}

/// Result of one bulk upload, returned once to the caller and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub success: bool,
    pub uploaded_count: u64,
    pub skipped_count: usize,
    pub total_rows: usize,
    pub errors: Vec<RowError>,
    pub message: String,
}

impl UploadSummary {
    /// Builds a summary, truncating `errors` to [`MAX_REPORTED_ERRORS`].
    #[must_use]
    pub fn new(
        uploaded_count: u64,
        skipped_count: usize,
        total_rows: usize,
        mut errors: Vec<RowError>,
    ) -> Self {
        errors.truncate(MAX_REPORTED_ERRORS);
        let message = if skipped_count == 0 {
            format!("{uploaded_count} products uploaded successfully")
        } else {
            format!("{uploaded_count} products uploaded successfully, {skipped_count} rows skipped")
        };
        Self {
            success: true,
            uploaded_count,
            skipped_count,
            total_rows,
            errors,
            message,
        }
    }
}
