use std::path::PathBuf;
use thiserror::Error;

use crate::document::{DocumentKind, DocumentStatus};

#[derive(Error, Debug)]
pub enum ErpError {
    #[error("Config directory not found at {0}. Run 'erpcli init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Not logged in. Run 'erpcli login --email <email>' first.")]
    NotLoggedIn,

    #[error("API request failed ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),

    #[error("Unexpected response from {endpoint}: {source}")]
    UnexpectedResponse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("A {0} is required before the document can be submitted")]
    MissingParty(&'static str),

    #[error("No line items. Use --item <product>:<quantity> to add line items.")]
    NoItems,

    #[error("Line {line}: {reason}")]
    IncompleteItem { line: usize, reason: &'static str },

    #[error("Line item index {index} is out of range ({count} item(s))")]
    ItemOutOfRange { index: usize, count: usize },

    #[error("Invalid item format '{0}'. Expected 'product:quantity[:price[:tax]]' (e.g., 'oak-table:2')")]
    InvalidItemFormat(String),

    #[error("Product '{0}' not found in the catalog")]
    ProductNotFound(String),

    #[error("Cannot {action} a {kind} in '{status}' status")]
    ActionNotAllowed {
        action: &'static str,
        kind: DocumentKind,
        status: DocumentStatus,
    },

    #[error("A {kind} does not support the '{action}' action")]
    ActionNotSupported {
        action: &'static str,
        kind: DocumentKind,
    },

    #[error("Invoice {0} is already fully paid")]
    AlreadyPaid(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Payment amount must be greater than zero")]
    InvalidPaymentAmount,

    #[error("Exactly one of --invoice or --bill is required")]
    MissingPaymentTarget,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ErpError>;
