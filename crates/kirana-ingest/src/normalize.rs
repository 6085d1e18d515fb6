//! Row Normalizer: one raw row -> one validated catalog-entry draft.
//!
//! A single implementation serves every store type. What differs between
//! general, medical and restaurant rows (alias lists, defaults, stock model,
//! meta block) comes from the [`StoreProfile`] passed in.

use kirana_core::{
    CatalogEntryDraft, EntryMeta, Field, MedicalMeta, RestaurantMeta, StockPolicy, StoreProfile,
    StoreType,
};
use thiserror::Error;

use crate::coerce::{to_boolean, to_integer, to_list, to_number, to_text};
use crate::extract::extract;
use crate::food_type::is_veg;
use crate::row::{CellValue, RawRow};

const DEFAULT_PREP_TIME_MINS: i64 = 20;
const DEFAULT_SERVES: i64 = 1;

/// Largest price a `NUMERIC(10,2)` column holds.
pub const MAX_PRICE: f64 = 99_999_999.99;

/// Why a row produced no draft. Rejected rows are skipped, never half-filled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowRejection {
    #[error("missing product name")]
    MissingName,
    #[error("no valid price")]
    NoValidPrice,
    #[error("price exceeds 99999999.99")]
    PriceOutOfRange,
    #[error("row contains a NUL character")]
    NulCharacter,
}

/// Resolved base and discount price for a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub price: f64,
    pub discount_price: f64,
}

/// Applies the pricing rules to a base price and a selling price.
///
/// Both prices are rounded to cents first, so a value that would store as
/// `0.00` counts as absent. The base price wins when positive, otherwise the
/// selling price stands in. The selling price is a discount only when
/// positive and strictly below the final price; an equal or higher value
/// collapses to no discount.
///
/// # Errors
///
/// Returns [`RowRejection::NoValidPrice`] when neither price is positive and
/// [`RowRejection::PriceOutOfRange`] when the final price exceeds
/// [`MAX_PRICE`].
pub fn resolve_pricing(base: f64, selling: f64) -> Result<Pricing, RowRejection> {
    let base = round_to_cents(base);
    let selling = round_to_cents(selling);
    if base <= 0.0 && selling <= 0.0 {
        return Err(RowRejection::NoValidPrice);
    }
    let price = if base > 0.0 { base } else { selling };
    if price > MAX_PRICE {
        return Err(RowRejection::PriceOutOfRange);
    }
    let discount_price = if selling > 0.0 && selling < price {
        selling
    } else {
        price
    };
    Ok(Pricing {
        price,
        discount_price,
    })
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn has_nul(row: &RawRow) -> bool {
    row.iter()
        .any(|(_, value)| matches!(value, CellValue::Text(text) if text.contains('\0')))
}

/// Normalizes one row under `profile`.
///
/// # Errors
///
/// Returns a [`RowRejection`] if the row has no name, no usable price, or a
/// cell Postgres cannot store.
pub fn normalize_row(
    profile: &StoreProfile,
    row: &RawRow,
    store_id: i64,
    vendor_id: i64,
) -> Result<CatalogEntryDraft, RowRejection> {
    let field = |f: Field| extract(row, profile.aliases.get(f));
    let text = |f: Field, default: &str| to_text(field(f), default);

    let name = text(Field::Name, "");
    if name.is_empty() {
        return Err(RowRejection::MissingName);
    }
    if has_nul(row) {
        return Err(RowRejection::NulCharacter);
    }

    let pricing = resolve_pricing(
        to_number(field(Field::Price), 0.0),
        to_number(field(Field::SellingPrice), 0.0),
    )?;

    let (stock, in_stock) = match profile.stock_policy {
        StockPolicy::Tracked { default_stock } => {
            let stock = to_integer(field(Field::Stock), default_stock).max(0);
            (stock, stock > 0)
        }
        StockPolicy::AlwaysAvailable { stock } => (stock, true),
    };

    let brand = text(Field::Brand, "");
    let sku = Some(text(Field::Sku, "")).filter(|s| !s.is_empty());

    let meta = match profile.store_type {
        StoreType::General => EntryMeta::General,
        StoreType::Medical => EntryMeta::Medical(MedicalMeta {
            mrp: pricing.price,
            brand: brand.clone(),
            salt_name: text(Field::SaltName, ""),
            batch_no: text(Field::BatchNo, ""),
            expiry_date: text(Field::ExpiryDate, ""),
            prescription_required: to_boolean(field(Field::PrescriptionRequired), false),
            pack_size: text(Field::PackSize, ""),
        }),
        StoreType::Restaurant => EntryMeta::Restaurant(RestaurantMeta {
            is_veg: is_veg(&text(Field::FoodType, "")),
            prep_time: to_integer(field(Field::PrepTime), DEFAULT_PREP_TIME_MINS).max(1),
            serves: to_integer(field(Field::Serves), DEFAULT_SERVES).max(1),
            spice_level: text(Field::SpiceLevel, ""),
            cuisine: text(Field::Cuisine, ""),
        }),
    };

    Ok(CatalogEntryDraft {
        store_id,
        vendor_id,
        name,
        description: text(Field::Description, ""),
        category: text(Field::Category, &profile.category_default),
        subcategory: text(Field::Subcategory, ""),
        brand,
        price: pricing.price,
        discount_price: pricing.discount_price,
        stock,
        in_stock,
        unit: text(Field::Unit, &profile.unit_default),
        sku,
        images: to_list(field(Field::Images)),
        tags: to_list(field(Field::Tags)),
        is_active: true,
        is_available: to_boolean(field(Field::Available), true),
        meta,
    })
}
