use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::DocumentKind;
use crate::error::{ErpError, Result};

/// Server-authoritative document status. The client only uses this to gate
/// which actions it offers; the server independently rejects anything stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Draft,
    Confirmed,
    Delivered,
    Received,
    Posted,
    Cancelled,
}

impl DocumentStatus {
    /// Delivered, received and cancelled accept no further transitions.
    /// Posted is semi-terminal: no status transition is offered, but
    /// payment status keeps evolving on its own axis.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DocumentStatus::Delivered | DocumentStatus::Received | DocumentStatus::Cancelled
        )
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Confirmed => "confirmed",
            DocumentStatus::Delivered => "delivered",
            DocumentStatus::Received => "received",
            DocumentStatus::Posted => "posted",
            DocumentStatus::Cancelled => "cancelled",
        };
        write!(f, "{label}")
    }
}

/// Payment progress on invoices and bills. Driven entirely by the server as
/// payments are recorded and reconciled; the client never computes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    NotPaid,
    PartiallyPaid,
    Paid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentStatus::NotPaid => "NOT PAID",
            PaymentStatus::PartiallyPaid => "PARTIAL",
            PaymentStatus::Paid => "PAID",
        };
        write!(f, "{label}")
    }
}

/// Everything a user can do to a document, lifecycle transitions included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Confirm,
    Post,
    Deliver,
    Receive,
    Cancel,
    Edit,
    Delete,
    SendEmail,
    GeneratePdf,
    RecordPayment,
}

impl Action {
    /// REST verb for transition endpoints (POST /{collection}/{id}/{verb}),
    /// None for actions that are not status transitions.
    pub fn verb(self) -> Option<&'static str> {
        match self {
            Action::Confirm => Some("confirm"),
            Action::Post => Some("post"),
            Action::Deliver => Some("deliver"),
            Action::Receive => Some("receive"),
            Action::Cancel => Some("cancel"),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::Confirm => "confirm",
            Action::Post => "post",
            Action::Deliver => "deliver",
            Action::Receive => "receive",
            Action::Cancel => "cancel",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::SendEmail => "send-email",
            Action::GeneratePdf => "generate-pdf",
            Action::RecordPayment => "record-payment",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The status a transition lands in, if the kind's state machine permits it
/// from `status`. Orders go draft -> confirmed -> delivered/received,
/// invoices and bills go draft -> posted, and any non-terminal,
/// not-yet-posted document can be cancelled.
pub fn transition_target(
    kind: DocumentKind,
    status: DocumentStatus,
    action: Action,
) -> Result<DocumentStatus> {
    use DocumentKind::*;
    use DocumentStatus::*;

    let target = match (kind, action) {
        (SalesOrder | PurchaseOrder, Action::Confirm) => Confirmed,
        (CustomerInvoice | VendorBill, Action::Post) => Posted,
        (SalesOrder, Action::Deliver) => Delivered,
        (PurchaseOrder, Action::Receive) => Received,
        (_, Action::Cancel) => Cancelled,
        _ => {
            return Err(ErpError::ActionNotSupported {
                action: action.label(),
                kind,
            })
        }
    };

    let allowed = match action {
        Action::Confirm | Action::Post => status == Draft,
        Action::Deliver | Action::Receive => status == Confirmed,
        // posted is semi-terminal: no transition offered, cancel included
        Action::Cancel => !status.is_terminal() && status != Posted,
        _ => false,
    };

    if allowed {
        Ok(target)
    } else {
        Err(ErpError::ActionNotAllowed {
            action: action.label(),
            kind,
            status,
        })
    }
}

/// The actions the client offers for a document in the given state. This is
/// advisory gating only; the server enforces its own rules on every call.
pub fn available_actions(
    kind: DocumentKind,
    status: DocumentStatus,
    payment_status: Option<PaymentStatus>,
) -> Vec<Action> {
    use DocumentKind::*;
    use DocumentStatus::*;

    match status {
        Draft => {
            let open = match kind {
                SalesOrder | PurchaseOrder => Action::Confirm,
                CustomerInvoice | VendorBill => Action::Post,
            };
            vec![open, Action::Edit, Action::Delete]
        }
        Confirmed => {
            let close = match kind {
                SalesOrder => Action::Deliver,
                PurchaseOrder => Action::Receive,
                // invoices and bills never reach confirmed
                CustomerInvoice | VendorBill => return vec![Action::GeneratePdf],
            };
            vec![close, Action::Cancel]
        }
        Posted => {
            let mut actions = Vec::new();
            if kind == CustomerInvoice {
                actions.push(Action::SendEmail);
            }
            actions.push(Action::GeneratePdf);
            if payment_status != Some(PaymentStatus::Paid) {
                actions.push(Action::RecordPayment);
            }
            actions
        }
        Delivered | Received | Cancelled => vec![Action::GeneratePdf],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DocumentKind::*;
    use DocumentStatus::*;

    #[test]
    fn order_lifecycle_happy_path() {
        assert_eq!(
            transition_target(SalesOrder, Draft, Action::Confirm).unwrap(),
            Confirmed
        );
        assert_eq!(
            transition_target(SalesOrder, Confirmed, Action::Deliver).unwrap(),
            Delivered
        );
        assert_eq!(
            transition_target(PurchaseOrder, Confirmed, Action::Receive).unwrap(),
            Received
        );
        assert_eq!(
            transition_target(CustomerInvoice, Draft, Action::Post).unwrap(),
            Posted
        );
    }

    #[test]
    fn cancel_only_from_non_terminal_states() {
        assert!(transition_target(SalesOrder, Draft, Action::Cancel).is_ok());
        assert!(transition_target(SalesOrder, Confirmed, Action::Cancel).is_ok());
        assert!(transition_target(SalesOrder, Delivered, Action::Cancel).is_err());
        assert!(transition_target(VendorBill, Posted, Action::Cancel).is_err());
        assert!(transition_target(VendorBill, Cancelled, Action::Cancel).is_err());
    }

    #[test]
    fn kind_mismatched_actions_are_rejected() {
        assert!(matches!(
            transition_target(CustomerInvoice, Draft, Action::Confirm),
            Err(crate::error::ErpError::ActionNotSupported { .. })
        ));
        assert!(matches!(
            transition_target(SalesOrder, Draft, Action::Post),
            Err(crate::error::ErpError::ActionNotSupported { .. })
        ));
        assert!(matches!(
            transition_target(PurchaseOrder, Confirmed, Action::Deliver),
            Err(crate::error::ErpError::ActionNotSupported { .. })
        ));
    }

    #[test]
    fn repeated_transitions_are_rejected_client_side() {
        assert!(matches!(
            transition_target(SalesOrder, Confirmed, Action::Confirm),
            Err(crate::error::ErpError::ActionNotAllowed { .. })
        ));
        assert!(matches!(
            transition_target(VendorBill, Posted, Action::Post),
            Err(crate::error::ErpError::ActionNotAllowed { .. })
        ));
    }

    #[test]
    fn draft_offers_open_edit_delete() {
        let actions = available_actions(SalesOrder, Draft, None);
        assert_eq!(actions, vec![Action::Confirm, Action::Edit, Action::Delete]);
        let actions = available_actions(VendorBill, Draft, None);
        assert_eq!(actions, vec![Action::Post, Action::Edit, Action::Delete]);
    }

    #[test]
    fn paid_invoice_offers_no_payment_action() {
        let actions = available_actions(CustomerInvoice, Posted, Some(PaymentStatus::Paid));
        assert!(!actions.contains(&Action::RecordPayment));
        assert!(actions.contains(&Action::SendEmail));

        let actions = available_actions(CustomerInvoice, Posted, Some(PaymentStatus::PartiallyPaid));
        assert!(actions.contains(&Action::RecordPayment));
    }

    #[test]
    fn terminal_states_are_read_mostly() {
        for (kind, status) in [
            (SalesOrder, Delivered),
            (PurchaseOrder, Received),
            (CustomerInvoice, Cancelled),
        ] {
            assert_eq!(available_actions(kind, status, None), vec![Action::GeneratePdf]);
        }
    }

    #[test]
    fn bills_never_offer_send_email() {
        let actions = available_actions(VendorBill, Posted, Some(PaymentStatus::NotPaid));
        assert!(!actions.contains(&Action::SendEmail));
        assert!(actions.contains(&Action::RecordPayment));
    }
}
