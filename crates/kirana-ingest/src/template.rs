//! Template Generator: a blank upload workbook per store type.
//!
//! Headers are the primary aliases of the profile's template fields, so a
//! filled-in template always resolves on the normalizer's first alias.

use kirana_core::{Field, StoreProfiles, TemplateKind};
use rust_xlsxwriter::{Format, Workbook};

use crate::error::IngestError;
use SampleValue::{Number as N, Text as T};

/// MIME type of generated templates.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SHEET_NAME: &str = "Products";
const MIN_COLUMN_WIDTH: usize = 10;
const MAX_COLUMN_WIDTH: usize = 60;

/// One illustrative cell value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    Text(&'static str),
    Number(f64),
}

impl SampleValue {
    fn display_len(self) -> usize {
        match self {
            SampleValue::Text(s) => s.chars().count(),
            SampleValue::Number(n) => n.to_string().len(),
        }
    }
}

/// A sample row: values keyed by logical field. Fields without a value are
/// written blank.
pub type SampleRow = &'static [(Field, SampleValue)];

/// Builds the xlsx bytes for `kind`.
///
/// # Errors
///
/// Returns [`IngestError::Template`] if the workbook cannot be written.
pub fn generate_template(
    kind: TemplateKind,
    profiles: &StoreProfiles,
) -> Result<Vec<u8>, IngestError> {
    let profile = profiles.for_type(kind.store_type());
    let samples = sample_rows(kind);

    let columns: Vec<(Field, &str)> = profile
        .template_fields
        .iter()
        .filter_map(|f| profile.aliases.primary(*f).map(|alias| (*f, alias)))
        .collect();

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let header_format = Format::new().set_bold();

    for (col, (field, header)) in (0u16..).zip(&columns) {
        worksheet.write_string_with_format(0, col, *header, &header_format)?;

        let mut width = header.chars().count();
        for (row, sample) in (1u32..).zip(samples) {
            let Some(value) = sample_value(*sample, *field) else {
                continue;
            };
            match value {
                SampleValue::Text(s) => worksheet.write_string(row, col, s)?,
                SampleValue::Number(n) => worksheet.write_number(row, col, n)?,
            };
            width = width.max(value.display_len());
        }

        #[allow(clippy::cast_precision_loss)]
        let width = (width + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH) as f64;
        worksheet.set_column_width(col, width)?;
    }

    worksheet.set_freeze_panes(1, 0)?;

    tracing::debug!(kind = kind.as_str(), columns = columns.len(), "generated template");
    Ok(workbook.save_to_buffer()?)
}

/// Illustrative rows for `kind`.
#[must_use]
pub fn sample_rows(kind: TemplateKind) -> &'static [SampleRow] {
    match kind {
        TemplateKind::General => GENERAL_SAMPLES,
        TemplateKind::Grocery => GROCERY_SAMPLES,
        TemplateKind::Medical => MEDICAL_SAMPLES,
        TemplateKind::Restaurant => RESTAURANT_SAMPLES,
    }
}

fn sample_value(row: SampleRow, field: Field) -> Option<SampleValue> {
    row.iter().find(|(f, _)| *f == field).map(|(_, v)| *v)
}

const GENERAL_SAMPLES: &[SampleRow] = &[
    &[
        (Field::Name, T("Classmate Notebook 200 Pages")),
        (Field::Price, N(60.0)),
        (Field::SellingPrice, N(55.0)),
        (Field::Category, T("Stationery")),
        (Field::Subcategory, T("Notebooks")),
        (Field::Brand, T("Classmate")),
        (Field::Stock, N(50.0)),
        (Field::Unit, T("pcs")),
        (Field::Sku, T("CLM-NB-200")),
        (Field::Description, T("Single line ruled notebook")),
        (Field::Images, T("https://example.com/images/notebook.jpg")),
        (Field::Tags, T("stationery, school")),
    ],
    &[
        (Field::Name, T("Milton Steel Water Bottle 1L")),
        (Field::Price, N(450.0)),
        (Field::SellingPrice, N(399.0)),
        (Field::Category, T("Home & Kitchen")),
        (Field::Subcategory, T("Bottles")),
        (Field::Brand, T("Milton")),
        (Field::Stock, N(20.0)),
        (Field::Unit, T("pcs")),
        (Field::Sku, T("MLT-WB-1L")),
        (Field::Description, T("Insulated stainless steel bottle")),
        (Field::Tags, T("kitchen | travel")),
    ],
];

const GROCERY_SAMPLES: &[SampleRow] = &[
    &[
        (Field::Name, T("Tata Salt 1kg")),
        (Field::Price, N(28.0)),
        (Field::SellingPrice, N(26.0)),
        (Field::Category, T("Grocery")),
        (Field::Subcategory, T("Salt & Spices")),
        (Field::Brand, T("Tata")),
        (Field::Stock, N(100.0)),
        (Field::Unit, T("pack")),
        (Field::Sku, T("TATA-SALT-1KG")),
        (Field::Description, T("Iodised salt")),
        (Field::Tags, T("staples")),
    ],
    &[
        (Field::Name, T("Aashirvaad Atta 5kg")),
        (Field::Price, N(295.0)),
        (Field::SellingPrice, N(279.0)),
        (Field::Category, T("Grocery")),
        (Field::Subcategory, T("Flour")),
        (Field::Brand, T("Aashirvaad")),
        (Field::Stock, N(40.0)),
        (Field::Unit, T("pack")),
        (Field::Sku, T("ASH-ATTA-5KG")),
        (Field::Description, T("Whole wheat flour")),
        (Field::Tags, T("staples, flour")),
    ],
];

const MEDICAL_SAMPLES: &[SampleRow] = &[
    &[
        (Field::Name, T("Dolo 650")),
        (Field::SaltName, T("Paracetamol 650mg")),
        (Field::Brand, T("Micro Labs")),
        (Field::Price, N(32.5)),
        (Field::SellingPrice, N(30.0)),
        (Field::Category, T("Tablets")),
        (Field::Stock, N(100.0)),
        (Field::Unit, T("strip")),
        (Field::PackSize, T("15 tablets")),
        (Field::BatchNo, T("DL2405")),
        (Field::ExpiryDate, T("2027-03-31")),
        (Field::PrescriptionRequired, T("No")),
        (Field::Description, T("Fever and pain relief")),
    ],
    &[
        (Field::Name, T("Azithral 500")),
        (Field::SaltName, T("Azithromycin 500mg")),
        (Field::Brand, T("Alembic")),
        (Field::Price, N(119.5)),
        (Field::SellingPrice, N(110.0)),
        (Field::Category, T("Antibiotics")),
        (Field::Stock, N(30.0)),
        (Field::Unit, T("strip")),
        (Field::PackSize, T("5 tablets")),
        (Field::BatchNo, T("AZ1123")),
        (Field::ExpiryDate, T("2026-12-31")),
        (Field::PrescriptionRequired, T("Yes")),
        (Field::Description, T("Antibiotic, course as prescribed")),
    ],
];

const RESTAURANT_SAMPLES: &[SampleRow] = &[
    &[
        (Field::Name, T("Paneer Butter Masala")),
        (Field::Price, N(260.0)),
        (Field::SellingPrice, N(240.0)),
        (Field::Category, T("Main Course")),
        (Field::FoodType, T("Veg")),
        (Field::PrepTime, N(20.0)),
        (Field::Serves, N(2.0)),
        (Field::SpiceLevel, T("Medium")),
        (Field::Cuisine, T("North Indian")),
        (Field::Description, T("Cottage cheese in tomato butter gravy")),
        (Field::Available, T("Yes")),
    ],
    &[
        (Field::Name, T("Chicken Biryani")),
        (Field::Price, N(320.0)),
        (Field::SellingPrice, N(299.0)),
        (Field::Category, T("Biryani")),
        (Field::FoodType, T("Non-Veg")),
        (Field::PrepTime, N(30.0)),
        (Field::Serves, N(1.0)),
        (Field::SpiceLevel, T("Spicy")),
        (Field::Cuisine, T("Hyderabadi")),
        (Field::Description, T("Dum cooked basmati rice with chicken")),
        (Field::Available, T("Yes")),
    ],
];
