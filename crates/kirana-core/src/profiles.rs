//! Per-store-type normalization profiles.
//!
//! A [`StoreProfile`] is immutable configuration data: which header spellings
//! locate each logical field, what defaults fill missing values, and how stock
//! is modelled. The row normalizer and template generator are both driven by
//! it, so a template header is always the primary alias the normalizer tries
//! first.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::store_type::StoreType;
use crate::ConfigError;

/// Logical fields a spreadsheet row can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Price,
    SellingPrice,
    Category,
    Subcategory,
    Brand,
    Stock,
    Unit,
    Description,
    Sku,
    Images,
    Tags,
    Available,
    SaltName,
    BatchNo,
    ExpiryDate,
    PrescriptionRequired,
    PackSize,
    FoodType,
    PrepTime,
    Serves,
    SpiceLevel,
    Cuisine,
}

/// Ordered header spellings per logical field. The first alias is primary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasSet {
    aliases: HashMap<Field, Vec<String>>,
}

impl AliasSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; replaces any existing list for `field`.
    #[must_use]
    pub fn with(mut self, field: Field, aliases: &[&str]) -> Self {
        self.set(field, aliases.iter().map(|a| (*a).to_string()).collect());
        self
    }

    pub fn set(&mut self, field: Field, aliases: Vec<String>) {
        self.aliases.insert(field, aliases);
    }

    /// Aliases for `field` in priority order; empty if the field is unmapped.
    #[must_use]
    pub fn get(&self, field: Field) -> &[String] {
        self.aliases.get(&field).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn primary(&self, field: Field) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }
}

/// How a profile models stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockPolicy {
    /// Stock is an inventory count; missing values default to `default_stock`
    /// and `in_stock` follows `stock > 0`.
    Tracked { default_stock: i64 },
    /// Stock models availability, not inventory: every entry gets `stock` and
    /// is always in stock.
    AlwaysAvailable { stock: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreProfile {
    pub store_type: StoreType,
    pub aliases: AliasSet,
    pub category_default: String,
    pub unit_default: String,
    pub stock_policy: StockPolicy,
    /// Columns of the downloadable template, in order.
    pub template_fields: Vec<Field>,
}

impl StoreProfile {
    /// Template header row: the primary alias of every template field.
    #[must_use]
    pub fn template_headers(&self) -> Vec<&str> {
        self.template_fields
            .iter()
            .filter_map(|f| self.aliases.primary(*f))
            .collect()
    }
}

/// The full set of profiles, one per [`StoreType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreProfiles {
    pub general: StoreProfile,
    pub medical: StoreProfile,
    pub restaurant: StoreProfile,
}

impl Default for StoreProfiles {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StoreProfiles {
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            general: general_profile(),
            medical: medical_profile(),
            restaurant: restaurant_profile(),
        }
    }

    #[must_use]
    pub fn for_type(&self, store_type: StoreType) -> &StoreProfile {
        match store_type {
            StoreType::General => &self.general,
            StoreType::Medical => &self.medical,
            StoreType::Restaurant => &self.restaurant,
        }
    }

    /// Builds profiles from the built-in defaults with YAML overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ProfilesFileParse`] for malformed YAML and
    /// [`ConfigError::Validation`] for overrides that would leave a profile
    /// unusable.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ProfilesFile = serde_yaml::from_str(content)?;
        let mut profiles = Self::builtin();
        if let Some(o) = file.general {
            apply_override(&mut profiles.general, o)?;
        }
        if let Some(o) = file.medical {
            apply_override(&mut profiles.medical, o)?;
        }
        if let Some(o) = file.restaurant {
            apply_override(&mut profiles.restaurant, o)?;
        }
        Ok(profiles)
    }
}

/// Load store profiles from a YAML override file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_store_profiles(path: &Path) -> Result<StoreProfiles, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProfilesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    StoreProfiles::from_yaml_str(&content)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfilesFile {
    general: Option<ProfileOverride>,
    medical: Option<ProfileOverride>,
    restaurant: Option<ProfileOverride>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileOverride {
    category_default: Option<String>,
    unit_default: Option<String>,
    default_stock: Option<i64>,
    #[serde(default)]
    aliases: HashMap<Field, Vec<String>>,
}

fn apply_override(profile: &mut StoreProfile, o: ProfileOverride) -> Result<(), ConfigError> {
    let label = profile.store_type;

    if let Some(category) = o.category_default {
        if category.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "{label}: category_default must be non-empty"
            )));
        }
        profile.category_default = category.trim().to_string();
    }

    if let Some(unit) = o.unit_default {
        profile.unit_default = unit.trim().to_string();
    }

    if let Some(stock) = o.default_stock {
        match profile.stock_policy {
            StockPolicy::Tracked { .. } if stock >= 0 => {
                profile.stock_policy = StockPolicy::Tracked {
                    default_stock: stock,
                };
            }
            StockPolicy::Tracked { .. } => {
                return Err(ConfigError::Validation(format!(
                    "{label}: default_stock must be >= 0, got {stock}"
                )));
            }
            StockPolicy::AlwaysAvailable { .. } => {
                return Err(ConfigError::Validation(format!(
                    "{label}: default_stock is fixed for this store type"
                )));
            }
        }
    }

    for (field, aliases) in o.aliases {
        let aliases: Vec<String> = aliases.iter().map(|a| a.trim().to_string()).collect();
        if aliases.is_empty() || aliases.iter().any(String::is_empty) {
            return Err(ConfigError::Validation(format!(
                "{label}: aliases for {field:?} must be a non-empty list of non-blank names"
            )));
        }
        profile.aliases.set(field, aliases);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Built-in profiles
// ---------------------------------------------------------------------------

const STOCK_ALIASES: &[&str] = &["Stock", "Quantity", "Qty", "Stock Quantity", "Inventory"];
const UNIT_ALIASES: &[&str] = &["Unit", "UOM", "Unit of Measure"];
const DESCRIPTION_ALIASES: &[&str] = &["Description", "Details", "Product Description"];
const SKU_ALIASES: &[&str] = &["SKU", "Barcode", "Product Code", "Item Code"];
const IMAGE_ALIASES: &[&str] = &["Images", "Image URLs", "Image URL", "Image"];
const TAG_ALIASES: &[&str] = &["Tags", "Keywords"];
const AVAILABLE_ALIASES: &[&str] = &["Available", "Is Available", "Active"];
const SUBCATEGORY_ALIASES: &[&str] = &["Subcategory", "Sub Category", "Sub-Category"];

fn general_profile() -> StoreProfile {
    let aliases = AliasSet::new()
        .with(Field::Name, &["Product Name", "Name", "Item Name", "Product"])
        .with(Field::Price, &["MRP", "Price", "Base Price", "Max Retail Price"])
        .with(
            Field::SellingPrice,
            &[
                "Selling Price",
                "Sale Price",
                "Offer Price",
                "Discount Price",
                "Discounted Price",
                "Special Price",
            ],
        )
        .with(Field::Category, &["Category", "Product Category"])
        .with(Field::Subcategory, SUBCATEGORY_ALIASES)
        .with(Field::Brand, &["Brand", "Brand Name", "Manufacturer"])
        .with(Field::Stock, STOCK_ALIASES)
        .with(Field::Unit, UNIT_ALIASES)
        .with(Field::Description, DESCRIPTION_ALIASES)
        .with(Field::Sku, SKU_ALIASES)
        .with(Field::Images, IMAGE_ALIASES)
        .with(Field::Tags, TAG_ALIASES)
        .with(Field::Available, AVAILABLE_ALIASES);

    StoreProfile {
        store_type: StoreType::General,
        aliases,
        category_default: "General".to_string(),
        unit_default: "pcs".to_string(),
        stock_policy: StockPolicy::Tracked { default_stock: 10 },
        template_fields: vec![
            Field::Name,
            Field::Price,
            Field::SellingPrice,
            Field::Category,
            Field::Subcategory,
            Field::Brand,
            Field::Stock,
            Field::Unit,
            Field::Sku,
            Field::Description,
            Field::Images,
            Field::Tags,
        ],
    }
}

fn medical_profile() -> StoreProfile {
    let aliases = AliasSet::new()
        .with(
            Field::Name,
            &["Medicine Name", "Name", "Product Name", "Drug Name"],
        )
        .with(Field::Price, &["MRP", "Price", "Max Retail Price"])
        .with(
            Field::SellingPrice,
            &["Selling Price", "Sale Price", "Offer Price", "Discount Price"],
        )
        .with(Field::Category, &["Category", "Medicine Type"])
        .with(Field::Subcategory, SUBCATEGORY_ALIASES)
        .with(Field::Brand, &["Brand", "Manufacturer", "Company"])
        .with(
            Field::SaltName,
            &["Salt Name", "Composition", "Generic Name", "Salt"],
        )
        .with(Field::BatchNo, &["Batch No", "Batch Number", "Batch"])
        .with(Field::ExpiryDate, &["Expiry Date", "Expiry", "Exp Date"])
        .with(
            Field::PrescriptionRequired,
            &[
                "Prescription Required",
                "Rx Required",
                "Prescription",
                "Requires Prescription",
            ],
        )
        .with(Field::PackSize, &["Pack Size", "Pack", "Packing"])
        .with(Field::Stock, STOCK_ALIASES)
        .with(Field::Unit, UNIT_ALIASES)
        .with(Field::Description, DESCRIPTION_ALIASES)
        .with(Field::Sku, SKU_ALIASES)
        .with(Field::Images, IMAGE_ALIASES)
        .with(Field::Tags, TAG_ALIASES)
        .with(Field::Available, AVAILABLE_ALIASES);

    StoreProfile {
        store_type: StoreType::Medical,
        aliases,
        category_default: "Medicine".to_string(),
        unit_default: "strip".to_string(),
        stock_policy: StockPolicy::Tracked { default_stock: 10 },
        template_fields: vec![
            Field::Name,
            Field::SaltName,
            Field::Brand,
            Field::Price,
            Field::SellingPrice,
            Field::Category,
            Field::Stock,
            Field::Unit,
            Field::PackSize,
            Field::BatchNo,
            Field::ExpiryDate,
            Field::PrescriptionRequired,
            Field::Description,
        ],
    }
}

fn restaurant_profile() -> StoreProfile {
    let aliases = AliasSet::new()
        .with(
            Field::Name,
            &["Item Name", "Dish Name", "Name", "Product Name"],
        )
        .with(Field::Price, &["Price", "MRP", "Base Price"])
        .with(
            Field::SellingPrice,
            &["Offer Price", "Selling Price", "Discount Price", "Sale Price"],
        )
        .with(Field::Category, &["Category", "Menu Category", "Course"])
        .with(Field::Subcategory, SUBCATEGORY_ALIASES)
        .with(
            Field::FoodType,
            &["Veg/Non-Veg", "Veg/Non Veg", "Food Type", "Is Veg", "Veg"],
        )
        .with(
            Field::PrepTime,
            &["Prep Time", "Preparation Time", "Prep Time (mins)"],
        )
        .with(Field::Serves, &["Serves", "Serving Size"])
        .with(Field::SpiceLevel, &["Spice Level", "Spicy"])
        .with(Field::Cuisine, &["Cuisine"])
        .with(Field::Unit, UNIT_ALIASES)
        .with(Field::Description, DESCRIPTION_ALIASES)
        .with(Field::Sku, SKU_ALIASES)
        .with(Field::Images, IMAGE_ALIASES)
        .with(Field::Tags, TAG_ALIASES)
        .with(Field::Available, AVAILABLE_ALIASES);

    StoreProfile {
        store_type: StoreType::Restaurant,
        aliases,
        category_default: "Main Course".to_string(),
        unit_default: "plate".to_string(),
        stock_policy: StockPolicy::AlwaysAvailable { stock: 100 },
        template_fields: vec![
            Field::Name,
            Field::Price,
            Field::SellingPrice,
            Field::Category,
            Field::FoodType,
            Field::PrepTime,
            Field::Serves,
            Field::SpiceLevel,
            Field::Cuisine,
            Field::Description,
            Field::Available,
        ],
    }
}
