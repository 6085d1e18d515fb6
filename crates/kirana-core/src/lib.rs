pub mod app_config;
pub mod catalog;
pub mod config;
pub mod profiles;
pub mod store_type;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use catalog::{
    CatalogEntryDraft, EntryMeta, MedicalMeta, RestaurantMeta, RowError, UploadSummary,
    MAX_REPORTED_ERRORS,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use profiles::{
    load_store_profiles, AliasSet, Field, StockPolicy, StoreProfile, StoreProfiles,
};
pub use store_type::{StoreType, TemplateKind};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read store profiles file {path}: {source}")]
    ProfilesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse store profiles file: {0}")]
    ProfilesFileParse(#[from] serde_yaml::Error),

    #[error("store profile validation failed: {0}")]
    Validation(String),
}
