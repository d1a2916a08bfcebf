pub mod types;

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use ureq::Agent;

use crate::document::{Action, DocumentKind, DraftDocument};
use crate::error::{ErpError, Result};

use self::types::{
    ApiDocument, Contact, ContactPage, DashboardSummary, DocumentPage, LoginResponse, Payment,
    PaymentOrder, PaymentPage, PaymentProof, PdfLink, Product, ProductPage, RazorpayKey,
    UnreadCount, User,
};

/// Filters for document listings. Empty fields are omitted from the query.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    pub search: Option<String>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

/// Thin client over the ERP REST API. Holds the base URL and, when logged
/// in, the bearer token; all business rules live server-side. No call is
/// retried; a failed mutation is reported and the user re-triggers it.
pub struct ApiClient {
    agent: Agent,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout_secs: u64, token: Option<String>) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(timeout_secs)))
            // surface non-2xx as responses, not transport errors
            .http_status_as_error(false)
            .build()
            .into();

        ApiClient {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let mut req = self.agent.get(self.url(path));
        for (key, value) in query {
            if !value.is_empty() {
                req = req.query(*key, value);
            }
        }
        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        log::debug!("GET {path}");
        let res = req.call()?;
        decode(path, res)
    }

    fn post(&self, path: &str, body: Option<&Value>) -> Result<Value> {
        let mut req = self.agent.post(self.url(path));
        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        log::debug!("POST {path}");
        let res = match body {
            Some(body) => req.send_json(body)?,
            None => req.send_empty()?,
        };
        decode(path, res)
    }

    fn delete(&self, path: &str) -> Result<Value> {
        let mut req = self.agent.delete(self.url(path));
        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        log::debug!("DELETE {path}");
        let res = req.call()?;
        decode(path, res)
    }

    fn parse<T: DeserializeOwned>(&self, path: &str, value: Value) -> Result<T> {
        serde_json::from_value(value).map_err(|e| ErpError::UnexpectedResponse {
            endpoint: path.to_string(),
            source: e,
        })
    }

    // --- auth ---

    pub fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let body = json!({ "email": email, "password": password });
        let value = self.post("/auth/login", Some(&body))?;
        self.parse("/auth/login", value)
    }

    /// Current user. Some deployments wrap the user in `{"user": ...}`.
    pub fn me(&self) -> Result<User> {
        let value = self.get("/auth/me", &[])?;
        let value = match value {
            Value::Object(mut map) if map.contains_key("user") => {
                map.remove("user").unwrap_or(Value::Null)
            }
            other => other,
        };
        self.parse("/auth/me", value)
    }

    // --- catalog ---

    pub fn products(&self, per_page: u32) -> Result<Vec<Product>> {
        let value = self.get("/products", &[("per_page", per_page.to_string())])?;
        let page: ProductPage = self.parse("/products", value)?;
        Ok(page.products)
    }

    pub fn contacts(&self, search: Option<&str>) -> Result<Vec<Contact>> {
        let query = [("search", search.unwrap_or_default().to_string())];
        let value = self.get("/contacts", &query)?;
        let page: ContactPage = self.parse("/contacts", value)?;
        Ok(page.contacts)
    }

    pub fn customers(&self) -> Result<Vec<Contact>> {
        let value = self.get("/contacts/customers", &[])?;
        let page: ContactPage = self.parse("/contacts/customers", value)?;
        Ok(page.contacts)
    }

    pub fn vendors(&self) -> Result<Vec<Contact>> {
        let value = self.get("/contacts/vendors", &[])?;
        let page: ContactPage = self.parse("/contacts/vendors", value)?;
        Ok(page.contacts)
    }

    // --- documents ---

    pub fn list_documents(&self, kind: DocumentKind, query: &ListQuery) -> Result<DocumentPage> {
        let path = format!("/{}", kind.collection());
        let params = [
            ("page", query.page.to_string()),
            ("per_page", query.per_page.to_string()),
            ("search", query.search.clone().unwrap_or_default()),
            ("status", query.status.clone().unwrap_or_default()),
            (
                "payment_status",
                query.payment_status.clone().unwrap_or_default(),
            ),
        ];
        let value = self.get(&path, &params)?;
        self.parse(&path, value)
    }

    pub fn get_document(&self, kind: DocumentKind, id: &str) -> Result<ApiDocument> {
        let path = format!("/{}/{}", kind.collection(), id);
        let value = self.get(&path, &[])?;
        self.parse(&path, value)
    }

    /// Submit a validated draft. The server recomputes all totals; whatever
    /// it echoes back is authoritative, the local preview is discarded.
    pub fn create_document(
        &self,
        kind: DocumentKind,
        draft: &DraftDocument,
    ) -> Result<Option<ApiDocument>> {
        let path = format!("/{}", kind.collection());
        let value = self.post(&path, Some(&draft.payload()))?;
        Ok(extract_document(value))
    }

    pub fn delete_document(&self, kind: DocumentKind, id: &str) -> Result<()> {
        let path = format!("/{}/{}", kind.collection(), id);
        self.delete(&path)?;
        Ok(())
    }

    /// Drive one lifecycle transition. Each call is independent; a failure
    /// leaves local state untouched and the caller re-fetches on success.
    pub fn transition(&self, kind: DocumentKind, id: &str, action: Action) -> Result<()> {
        let verb = action.verb().ok_or(ErpError::ActionNotSupported {
            action: action.label(),
            kind,
        })?;
        let path = format!("/{}/{}/{}", kind.collection(), id, verb);
        self.post(&path, None)?;
        Ok(())
    }

    pub fn send_email(&self, id: &str) -> Result<()> {
        let path = format!("/customer-invoices/{id}/send-email");
        self.post(&path, None)?;
        Ok(())
    }

    pub fn document_pdf(&self, kind: DocumentKind, id: &str) -> Result<PdfLink> {
        let path = format!("/{}/{}/pdf", kind.collection(), id);
        let value = self.get(&path, &[])?;
        self.parse(&path, value)
    }

    /// Fetch a rendered artifact from its (typically pre-signed) URL.
    pub fn download(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("GET {url}");
        let mut res = self.agent.get(url).call()?;
        let status = res.status();
        if !status.is_success() {
            return Err(ErpError::Api {
                status: status.as_u16(),
                message: format!("download failed for {url}"),
            });
        }
        Ok(res.body_mut().read_to_vec()?)
    }

    // --- payments ---

    pub fn payments(
        &self,
        invoice_id: Option<&str>,
        bill_id: Option<&str>,
    ) -> Result<Vec<Payment>> {
        let query = [
            ("invoice_id", invoice_id.unwrap_or_default().to_string()),
            ("bill_id", bill_id.unwrap_or_default().to_string()),
        ];
        let value = self.get("/payments", &query)?;
        let page: PaymentPage = self.parse("/payments", value)?;
        Ok(page.payments)
    }

    pub fn create_payment(&self, body: &Value) -> Result<()> {
        self.post("/payments", Some(body))?;
        Ok(())
    }

    // --- portal payment capture ---

    pub fn razorpay_key(&self) -> Result<RazorpayKey> {
        let value = self.get("/portal/payments/razorpay-key", &[])?;
        self.parse("/portal/payments/razorpay-key", value)
    }

    pub fn portal_invoice(&self, id: &str) -> Result<ApiDocument> {
        let path = format!("/portal/invoices/{id}");
        let value = self.get(&path, &[])?;
        self.parse(&path, value)
    }

    pub fn create_payment_order(&self, invoice_id: &str) -> Result<PaymentOrder> {
        let path = format!("/portal/invoices/{invoice_id}/create-payment-order");
        let value = self.post(&path, None)?;
        self.parse(&path, value)
    }

    pub fn verify_payment(&self, invoice_id: &str, proof: &PaymentProof) -> Result<()> {
        let path = format!("/portal/invoices/{invoice_id}/verify-payment");
        let body = json!({
            "razorpay_order_id": proof.razorpay_order_id,
            "razorpay_payment_id": proof.razorpay_payment_id,
            "razorpay_signature": proof.razorpay_signature,
        });
        self.post(&path, Some(&body))?;
        Ok(())
    }

    // --- reports & notifications ---

    pub fn dashboard(&self) -> Result<DashboardSummary> {
        let value = self.get("/reports/dashboard", &[])?;
        self.parse("/reports/dashboard", value)
    }

    pub fn unread_count(&self) -> Result<u64> {
        let value = self.get("/notifications/unread-count", &[])?;
        let count: UnreadCount = self.parse("/notifications/unread-count", value)?;
        Ok(count.count)
    }
}

fn decode(path: &str, mut res: ureq::http::Response<ureq::Body>) -> Result<Value> {
    let status = res.status();
    let text = res.body_mut().read_to_string()?;

    if !status.is_success() {
        return Err(ErpError::Api {
            status: status.as_u16(),
            message: error_message(&text),
        });
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&text).map_err(|e| ErpError::UnexpectedResponse {
        endpoint: path.to_string(),
        source: e,
    })
}

/// Best-effort extraction of the server's error detail; falls back to the
/// raw body so the user always sees something actionable.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["error", "message", "detail"] {
            if let Some(msg) = value.get(key).and_then(Value::as_str) {
                return msg.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no error detail provided".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

/// Create responses vary between deployments: the document itself, or the
/// document under its singular key, or just a message. Take what we can.
fn extract_document(value: Value) -> Option<ApiDocument> {
    if let Ok(doc) = serde_json::from_value::<ApiDocument>(value.clone()) {
        return Some(doc);
    }
    for key in [
        "sales_order",
        "purchase_order",
        "customer_invoice",
        "vendor_bill",
    ] {
        if let Some(inner) = value.get(key) {
            if let Ok(doc) = serde_json::from_value::<ApiDocument>(inner.clone()) {
                return Some(doc);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentStatus, PaymentStatus};

    #[test]
    fn document_page_accepts_every_collection_key() {
        for key in [
            "sales_orders",
            "purchase_orders",
            "customer_invoices",
            "vendor_bills",
            "invoices",
        ] {
            let body = format!(
                r#"{{"{key}": [{{"_id": "d1", "so_number": "SO-001", "status": "draft"}}],
                    "total": 1, "page": 1, "per_page": 20}}"#
            );
            let page: DocumentPage = serde_json::from_str(&body).unwrap();
            assert_eq!(page.items.len(), 1, "key {key}");
            assert_eq!(page.items[0].status, DocumentStatus::Draft);
        }
    }

    #[test]
    fn api_document_folds_kind_specific_field_names() {
        let body = r#"{
            "_id": "inv-9",
            "invoice_number": "INV-2026-0009",
            "customer_id": "c-3",
            "invoice_date": "2026-01-15",
            "due_date": "2026-02-14",
            "status": "posted",
            "payment_status": "partially_paid",
            "subtotal": 250.0,
            "tax_amount": 36.0,
            "total_amount": 286.0,
            "amount_paid": 100.0,
            "amount_due": 186.0
        }"#;
        let doc: ApiDocument = serde_json::from_str(body).unwrap();
        assert_eq!(doc.number, "INV-2026-0009");
        assert_eq!(doc.party_id, "c-3");
        assert_eq!(doc.date, "2026-01-15");
        assert_eq!(doc.due_date.as_deref(), Some("2026-02-14"));
        assert_eq!(doc.status, DocumentStatus::Posted);
        assert_eq!(doc.payment_status, Some(PaymentStatus::PartiallyPaid));
        assert_eq!(doc.amount_due, 186.0);
    }

    #[test]
    fn error_message_prefers_structured_detail() {
        assert_eq!(
            error_message(r#"{"error": "Invoice already posted"}"#),
            "Invoice already posted"
        );
        assert_eq!(
            error_message(r#"{"message": "validation failed"}"#),
            "validation failed"
        );
        assert_eq!(error_message("plain text"), "plain text");
        assert_eq!(error_message("  "), "no error detail provided");
    }
}
