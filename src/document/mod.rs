mod draft;
mod item;
mod kind;
mod lifecycle;

pub use draft::DraftDocument;
pub use item::{totals, ItemField, LineItem, Totals, DEFAULT_TAX_RATE};
pub use kind::{Direction, DocumentKind};
pub use lifecycle::{
    available_actions, transition_target, Action, DocumentStatus, PaymentStatus,
};
