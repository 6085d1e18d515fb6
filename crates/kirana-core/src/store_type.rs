use serde::{Deserialize, Serialize};

/// Vendor-declared store category selecting which normalization rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreType {
    General,
    Medical,
    Restaurant,
}

impl StoreType {
    /// Parses a declared store type. Matching is case-insensitive and anything
    /// other than `medical` or `restaurant` falls back to general rules.
    #[must_use]
    pub fn from_declared(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "medical" => StoreType::Medical,
            "restaurant" => StoreType::Restaurant,
            _ => StoreType::General,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StoreType::General => "general",
            StoreType::Medical => "medical",
            StoreType::Restaurant => "restaurant",
        }
    }
}

impl std::fmt::Display for StoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of downloadable upload templates.
///
/// `Grocery` shares the general profile but ships grocery sample rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    General,
    Grocery,
    Medical,
    Restaurant,
}

impl TemplateKind {
    /// Parses a template type from a path segment; `None` for unknown types.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "general" => Some(TemplateKind::General),
            "grocery" => Some(TemplateKind::Grocery),
            "medical" => Some(TemplateKind::Medical),
            "restaurant" => Some(TemplateKind::Restaurant),
            _ => None,
        }
    }

    /// The normalization rules a filled-in template of this kind is read with.
    #[must_use]
    pub fn store_type(self) -> StoreType {
        match self {
            TemplateKind::General | TemplateKind::Grocery => StoreType::General,
            TemplateKind::Medical => StoreType::Medical,
            TemplateKind::Restaurant => StoreType::Restaurant,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKind::General => "general",
            TemplateKind::Grocery => "grocery",
            TemplateKind::Medical => "medical",
            TemplateKind::Restaurant => "restaurant",
        }
    }

    /// Download filename, e.g. `"medical-template.xlsx"`.
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}-template.xlsx", self.as_str())
    }
}
