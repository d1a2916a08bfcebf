use serde::{Deserialize, Serialize};

use crate::document::{DocumentStatus, PaymentStatus};

/// Catalog product. `sale_price`/`purchase_price` seed line items depending
/// on the document direction.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub sale_price: f64,
    #[serde(default)]
    pub purchase_price: f64,
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductPage {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub total: u64,
}

/// A customer or vendor.
#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub contact_type: String,
    #[serde(default)]
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactPage {
    #[serde(default, alias = "customers", alias = "vendors")]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(default, rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: User,
}

/// A line item as echoed by the server. Richer than what the client submits
/// (the server adds SKU, unit and its own per-line totals).
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentItem {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub product_sku: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub tax_amount: f64,
    #[serde(default, alias = "total")]
    pub amount: f64,
}

/// Server-side view of any of the four document kinds. Field-name aliases
/// fold the kind-specific wire names into one shape; totals come from the
/// server and are never recomputed locally.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(
        default,
        alias = "so_number",
        alias = "po_number",
        alias = "invoice_number",
        alias = "bill_number"
    )]
    pub number: String,
    #[serde(default, alias = "customer_id", alias = "vendor_id")]
    pub party_id: String,
    #[serde(default, alias = "customer", alias = "vendor")]
    pub party: Option<Contact>,
    #[serde(
        default,
        alias = "order_date",
        alias = "invoice_date",
        alias = "bill_date"
    )]
    pub date: String,
    #[serde(
        default,
        alias = "delivery_date",
        alias = "expected_date",
        alias = "due_date"
    )]
    pub due_date: Option<String>,
    pub status: DocumentStatus,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub items: Vec<DocumentItem>,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub tax_amount: f64,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub amount_paid: f64,
    #[serde(default)]
    pub amount_due: f64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub document_url: Option<String>,
}

/// One page of a document listing. Each collection names its array after
/// itself; the aliases cover all of them, portal routes included.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentPage {
    #[serde(
        default,
        alias = "sales_orders",
        alias = "purchase_orders",
        alias = "customer_invoices",
        alias = "vendor_bills",
        alias = "invoices",
        alias = "bills"
    )]
    pub items: Vec<ApiDocument>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub payment_number: String,
    #[serde(default)]
    pub payment_type: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub invoice_id: Option<String>,
    #[serde(default)]
    pub bill_id: Option<String>,
    #[serde(default)]
    pub payment_date: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub is_reconciled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentPage {
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub total: u64,
}

/// Counters for the admin dashboard.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardSummary {
    #[serde(default)]
    pub total_customers: u64,
    #[serde(default)]
    pub total_vendors: u64,
    #[serde(default)]
    pub total_products: u64,
    #[serde(default)]
    pub pending_invoices: u64,
    #[serde(default)]
    pub pending_bills: u64,
    #[serde(default)]
    pub total_sales_this_month: f64,
    #[serde(default)]
    pub total_purchases_this_month: f64,
    #[serde(default)]
    pub total_receivable: f64,
    #[serde(default)]
    pub total_payable: f64,
    #[serde(default)]
    pub net_position: f64,
}

/// Link to a server-rendered PDF artifact.
#[derive(Debug, Clone, Deserialize)]
pub struct PdfLink {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayKey {
    #[serde(alias = "key", alias = "razorpay_key")]
    pub key_id: String,
}

/// Gateway order created server-side for checkout; amounts come from the
/// server's `amount_due`, never computed here.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentOrder {
    #[serde(alias = "id", alias = "razorpay_order_id")]
    pub order_id: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub currency: String,
}

/// Checkout result submitted back for server-side signature verification.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentProof {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnreadCount {
    #[serde(default, alias = "unread_count")]
    pub count: u64,
}
