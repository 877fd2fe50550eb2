//! Error types

use std::path::PathBuf;

use thiserror::Error;

/// A requested item that is neither craftable nor a known material
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownItem {
    pub name: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Error)]
pub enum CalcError {
    #[error("unknown item(s): {}", item_names(.0))]
    UnknownRootItems(Vec<UnknownItem>),

    #[error("recipe catalog is empty; the recipe table could not be loaded")]
    EmptyCatalog,

    #[error("recipe cycle detected involving: {}", .items.join(", "))]
    CyclicRecipe { items: Vec<String> },
}

fn item_names(items: &[UnknownItem]) -> String {
    items
        .iter()
        .map(|u| u.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel parse error: {0}")]
    Excel(String),

    #[error("unsupported recipe table format: {0} (expected .csv, .xlsx, .xls, .db, .sqlite)")]
    UnsupportedFormat(String),

    #[error("missing column: {0}")]
    MissingColumn(&'static str),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Why a single table row was skipped
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedRow {
    #[error("output item is empty")]
    EmptyOutput,

    #[error("yield '{0}' is not a positive integer")]
    InvalidYield(String),

    #[error("slot {slot}: material '{material}' has invalid quantity '{quantity}'")]
    InvalidQuantity {
        slot: usize,
        material: String,
        quantity: String,
    },

    #[error("slot {slot}: quantity '{quantity}' has no material")]
    MissingMaterial { slot: usize, quantity: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("request is empty")]
    Empty,

    #[error("'{0}' is not in Item:Quantity form")]
    MissingSeparator(String),

    #[error("'{0}' has an empty item name")]
    EmptyName(String),

    #[error("'{quantity}' is not a valid quantity for {item}")]
    InvalidQuantity { item: String, quantity: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
