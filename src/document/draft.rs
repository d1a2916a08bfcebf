use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::api::types::Product;
use crate::document::{totals, DocumentKind, ItemField, LineItem, Totals};
use crate::error::{ErpError, Result};

/// An unsubmitted document being assembled client-side. Lives only for the
/// duration of one command; once created, the server owns identity, status
/// and totals, and this preview is discarded.
#[derive(Debug, Clone)]
pub struct DraftDocument {
    pub kind: DocumentKind,
    pub party_id: String,
    pub date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub items: Vec<LineItem>,
}

impl DraftDocument {
    pub fn new(kind: DocumentKind, party_id: &str, date: NaiveDate) -> Self {
        DraftDocument {
            kind,
            party_id: party_id.to_string(),
            date,
            due_date: None,
            notes: None,
            items: Vec::new(),
        }
    }

    /// Append a blank row at the end; existing rows keep their order.
    pub fn add_item(&mut self) -> usize {
        self.items.push(LineItem::new());
        self.items.len() - 1
    }

    /// Remove the row at `index`, shifting later rows down by one.
    /// Out-of-range indices are a hard error rather than a silent no-op.
    pub fn remove_item(&mut self, index: usize) -> Result<LineItem> {
        if index >= self.items.len() {
            return Err(ErpError::ItemOutOfRange {
                index,
                count: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// Snapshot a catalog product onto the row at `index` and recompute it.
    pub fn select_product(&mut self, index: usize, product: &Product) -> Result<()> {
        let direction = self.kind.direction();
        let include_tax = self.kind.tax_in_amount();
        let item = self.item_mut(index)?;
        item.select_product(product, direction, include_tax);
        Ok(())
    }

    /// Set one editable field on the row at `index` and recompute it.
    pub fn set_field(&mut self, index: usize, field: ItemField, raw: &str) -> Result<()> {
        let include_tax = self.kind.tax_in_amount();
        let item = self.item_mut(index)?;
        item.set_field(field, raw, include_tax);
        Ok(())
    }

    fn item_mut(&mut self, index: usize) -> Result<&mut LineItem> {
        let count = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(ErpError::ItemOutOfRange { index, count })
    }

    /// Preview totals, recomputed from scratch on every call. The server's
    /// echoed totals are authoritative after submission.
    pub fn totals(&self) -> Totals {
        totals(&self.items)
    }

    /// Refuse submission before any network call: a party, at least one
    /// item, and complete rows are required.
    pub fn validate(&self) -> Result<()> {
        if self.party_id.trim().is_empty() {
            return Err(ErpError::MissingParty(self.kind.party_label()));
        }
        if self.items.is_empty() {
            return Err(ErpError::NoItems);
        }
        for (i, item) in self.items.iter().enumerate() {
            if item.product_id.is_empty() {
                return Err(ErpError::IncompleteItem {
                    line: i + 1,
                    reason: "no product selected",
                });
            }
            if item.quantity < 1 {
                return Err(ErpError::IncompleteItem {
                    line: i + 1,
                    reason: "quantity must be at least 1",
                });
            }
        }
        Ok(())
    }

    /// The JSON body for POST /{collection}. Field names vary by kind
    /// (customer_id vs vendor_id, order/invoice/bill date); the item rows
    /// and notes are identical across kinds.
    pub fn payload(&self) -> Value {
        let mut body = serde_json::Map::new();
        body.insert(self.kind.party_field().to_string(), json!(self.party_id));
        body.insert(
            self.kind.date_field().to_string(),
            json!(self.date.format("%Y-%m-%d").to_string()),
        );
        if let Some(due) = self.due_date {
            body.insert(
                self.kind.due_field().to_string(),
                json!(due.format("%Y-%m-%d").to_string()),
            );
        }
        body.insert("items".to_string(), json!(self.items));
        body.insert(
            "notes".to_string(),
            json!(self.notes.clone().unwrap_or_default()),
        );
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(kind: DocumentKind) -> DraftDocument {
        DraftDocument::new(kind, "c-1", NaiveDate::from_ymd_opt(2026, 2, 3).unwrap())
    }

    fn priced_item(doc: &mut DraftDocument, qty: &str, price: &str, tax: &str) -> usize {
        let i = doc.add_item();
        doc.items[i].product_id = format!("p-{i}");
        doc.set_field(i, ItemField::Quantity, qty).unwrap();
        doc.set_field(i, ItemField::UnitPrice, price).unwrap();
        doc.set_field(i, ItemField::TaxRate, tax).unwrap();
        i
    }

    #[test]
    fn add_item_appends_without_touching_existing_rows() {
        let mut doc = draft(DocumentKind::SalesOrder);
        priced_item(&mut doc, "2", "100", "18");
        let before = doc.totals();

        doc.add_item();
        assert_eq!(doc.items.len(), 2);
        assert_eq!(doc.items[1].quantity, 1);
        assert_eq!(doc.items[1].unit_price, 0.0);
        assert_eq!(doc.items[1].amount, 0.0);

        // a fresh zero-priced row must not move the totals
        let after = doc.totals();
        assert_eq!(before.subtotal, after.subtotal);
        assert_eq!(before.tax_total, after.tax_total);
        assert_eq!(before.total, after.total);
    }

    #[test]
    fn remove_item_shifts_later_rows_down() {
        let mut doc = draft(DocumentKind::SalesOrder);
        priced_item(&mut doc, "1", "10", "0");
        priced_item(&mut doc, "1", "20", "0");
        priced_item(&mut doc, "1", "30", "0");

        let removed = doc.remove_item(1).unwrap();
        assert_eq!(removed.unit_price, 20.0);
        assert_eq!(doc.items.len(), 2);
        assert_eq!(doc.items[0].unit_price, 10.0);
        assert_eq!(doc.items[1].unit_price, 30.0);
    }

    #[test]
    fn remove_item_out_of_range_is_an_error() {
        let mut doc = draft(DocumentKind::SalesOrder);
        priced_item(&mut doc, "1", "10", "0");
        let err = doc.remove_item(5).unwrap_err();
        assert!(matches!(err, ErpError::ItemOutOfRange { index: 5, count: 1 }));
    }

    #[test]
    fn validate_requires_party_items_and_complete_rows() {
        let mut doc = draft(DocumentKind::CustomerInvoice);
        doc.party_id = String::new();
        assert!(matches!(doc.validate(), Err(ErpError::MissingParty(_))));

        doc.party_id = "c-1".to_string();
        assert!(matches!(doc.validate(), Err(ErpError::NoItems)));

        doc.add_item();
        assert!(matches!(
            doc.validate(),
            Err(ErpError::IncompleteItem { line: 1, .. })
        ));

        doc.items[0].product_id = "p-0".to_string();
        doc.set_field(0, ItemField::Quantity, "0").unwrap();
        assert!(matches!(
            doc.validate(),
            Err(ErpError::IncompleteItem { line: 1, .. })
        ));

        doc.set_field(0, ItemField::Quantity, "2").unwrap();
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn payload_uses_kind_specific_field_names() {
        let mut doc = draft(DocumentKind::VendorBill);
        doc.due_date = NaiveDate::from_ymd_opt(2026, 3, 5);
        priced_item(&mut doc, "2", "100", "18");

        let body = doc.payload();
        assert_eq!(body["vendor_id"], "c-1");
        assert_eq!(body["bill_date"], "2026-02-03");
        assert_eq!(body["due_date"], "2026-03-05");
        assert!(body.get("customer_id").is_none());
        // vendor bill line amounts leave tax out
        assert_eq!(body["items"][0]["amount"], 200.0);

        let mut so = draft(DocumentKind::SalesOrder);
        priced_item(&mut so, "2", "100", "18");
        let body = so.payload();
        assert_eq!(body["customer_id"], "c-1");
        assert_eq!(body["order_date"], "2026-02-03");
        assert_eq!(body["items"][0]["amount"], 236.0);
    }

    #[test]
    fn preview_totals_are_a_fresh_view() {
        let mut doc = draft(DocumentKind::PurchaseOrder);
        priced_item(&mut doc, "2", "100", "18");
        priced_item(&mut doc, "1", "50", "0");
        let t = doc.totals();
        assert_eq!(t.subtotal, 250.0);
        assert_eq!(t.tax_total, 36.0);
        assert_eq!(t.total, 286.0);

        doc.remove_item(0).unwrap();
        let t = doc.totals();
        assert_eq!(t.subtotal, 50.0);
        assert_eq!(t.total, 50.0);
    }
}
