pub mod api;
pub mod config;
pub mod document;
pub mod error;

pub use api::{ApiClient, ListQuery};
pub use config::{Config, Session};
pub use document::{DocumentKind, DocumentStatus, DraftDocument, LineItem, PaymentStatus};
pub use error::{ErpError, Result};
