use serde::Serialize;

use crate::api::types::Product;
use crate::document::Direction;

/// GST rate the ERP seeds new line items with.
pub const DEFAULT_TAX_RATE: f64 = 18.0;

/// One row in a document: product, quantity, price, tax.
/// `amount` is derived and never set directly.
#[derive(Debug, Clone, Serialize)]
pub struct LineItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub tax_rate: f64,
    pub amount: f64,
}

/// The three user-editable numeric fields of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Quantity,
    UnitPrice,
    TaxRate,
}

impl LineItem {
    /// A blank row: quantity 1, nothing priced yet.
    pub fn new() -> Self {
        LineItem {
            product_id: String::new(),
            product_name: String::new(),
            quantity: 1,
            unit_price: 0.0,
            tax_rate: DEFAULT_TAX_RATE,
            amount: 0.0,
        }
    }

    /// Snapshot the catalog product onto this row: name, direction-appropriate
    /// price, and tax rate. Quantity is left alone. The snapshot is not
    /// live-linked; later catalog edits do not alter this item.
    pub fn select_product(&mut self, product: &Product, direction: Direction, include_tax: bool) {
        self.product_id = product.id.clone();
        self.product_name = product.name.clone();
        self.unit_price = match direction {
            Direction::Sales => product.sale_price,
            Direction::Purchase => product.purchase_price,
        };
        self.tax_rate = product.tax_rate;
        self.recompute_amount(include_tax);
    }

    /// Assign one editable field from raw user input. Unparsable or negative
    /// input coerces to zero so totals stay a total function; validation
    /// rejects zero quantities at submit time.
    pub fn set_field(&mut self, field: ItemField, raw: &str, include_tax: bool) {
        match field {
            ItemField::Quantity => {
                self.quantity = raw.trim().parse().unwrap_or(0);
            }
            ItemField::UnitPrice => {
                self.unit_price = parse_non_negative(raw);
            }
            ItemField::TaxRate => {
                self.tax_rate = parse_non_negative(raw);
            }
        }
        self.recompute_amount(include_tax);
    }

    /// Recompute the derived amount from the current fields. Idempotent.
    /// Vendor bills keep tax out of the per-line amount (`include_tax` false).
    pub fn recompute_amount(&mut self, include_tax: bool) {
        let base = self.quantity as f64 * self.unit_price;
        self.amount = if include_tax {
            base + base * self.tax_rate / 100.0
        } else {
            base
        };
    }
}

impl Default for LineItem {
    fn default() -> Self {
        LineItem::new()
    }
}

fn parse_non_negative(raw: &str) -> f64 {
    let value: f64 = raw.trim().parse().unwrap_or(0.0);
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Document-level totals, always recomputed from scratch across all items
/// rather than maintained incrementally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub tax_total: f64,
    pub total: f64,
}

/// Sum subtotal, tax and grand total over the items. Tax is computed per
/// line, so mixed rates are never blended through the subtotal. The empty
/// list yields all zeros.
pub fn totals(items: &[LineItem]) -> Totals {
    let subtotal: f64 = items
        .iter()
        .map(|i| i.quantity as f64 * i.unit_price)
        .sum();
    let tax_total: f64 = items
        .iter()
        .map(|i| i.quantity as f64 * i.unit_price * i.tax_rate / 100.0)
        .sum();
    Totals {
        subtotal,
        tax_total,
        total: subtotal + tax_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, sale: f64, purchase: f64, tax: f64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("{id} product"),
            sku: id.to_uppercase(),
            unit: "unit".to_string(),
            sale_price: sale,
            purchase_price: purchase,
            tax_rate: tax,
            category: None,
        }
    }

    #[test]
    fn sales_amount_includes_tax() {
        let mut item = LineItem::new();
        item.set_field(ItemField::Quantity, "2", true);
        item.set_field(ItemField::UnitPrice, "100", true);
        item.set_field(ItemField::TaxRate, "18", true);
        assert_eq!(item.amount, 236.0); // 200 base + 36 tax
    }

    #[test]
    fn vendor_bill_amount_excludes_tax() {
        let mut item = LineItem::new();
        item.set_field(ItemField::Quantity, "2", false);
        item.set_field(ItemField::UnitPrice, "100", false);
        item.set_field(ItemField::TaxRate, "18", false);
        assert_eq!(item.amount, 200.0);
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut item = LineItem::new();
        item.set_field(ItemField::Quantity, "3", true);
        item.set_field(ItemField::UnitPrice, "49.50", true);
        let first = item.amount;
        item.recompute_amount(true);
        item.recompute_amount(true);
        assert_eq!(item.amount, first);
    }

    #[test]
    fn unparsable_input_coerces_to_zero() {
        let mut item = LineItem::new();
        item.set_field(ItemField::Quantity, "abc", true);
        assert_eq!(item.quantity, 0);
        item.set_field(ItemField::UnitPrice, "1,50", true);
        assert_eq!(item.unit_price, 0.0);
        item.set_field(ItemField::TaxRate, "-5", true);
        assert_eq!(item.tax_rate, 0.0);
        assert_eq!(item.amount, 0.0);
    }

    #[test]
    fn negative_quantity_coerces_to_zero() {
        let mut item = LineItem::new();
        item.set_field(ItemField::Quantity, "-3", true);
        assert_eq!(item.quantity, 0);
    }

    #[test]
    fn select_product_keeps_quantity_and_seeds_prices() {
        let mut item = LineItem::new();
        item.set_field(ItemField::Quantity, "4", true);
        let p = product("oak-table", 250.0, 180.0, 12.0);

        item.select_product(&p, Direction::Sales, true);
        assert_eq!(item.quantity, 4);
        assert_eq!(item.unit_price, 250.0);
        assert_eq!(item.tax_rate, 12.0);
        assert_eq!(item.amount, 1120.0); // 1000 base + 120 tax

        item.select_product(&p, Direction::Purchase, true);
        assert_eq!(item.unit_price, 180.0);
    }

    #[test]
    fn totals_sum_per_line_without_blending_rates() {
        let mut a = LineItem::new();
        a.set_field(ItemField::Quantity, "2", true);
        a.set_field(ItemField::UnitPrice, "100", true);
        a.set_field(ItemField::TaxRate, "18", true);

        let mut b = LineItem::new();
        b.set_field(ItemField::Quantity, "1", true);
        b.set_field(ItemField::UnitPrice, "50", true);
        b.set_field(ItemField::TaxRate, "0", true);

        let t = totals(&[a, b]);
        assert_eq!(t.subtotal, 250.0);
        assert_eq!(t.tax_total, 36.0);
        assert_eq!(t.total, 286.0);
    }

    #[test]
    fn totals_of_empty_list_are_zero() {
        let t = totals(&[]);
        assert_eq!(t.subtotal, 0.0);
        assert_eq!(t.tax_total, 0.0);
        assert_eq!(t.total, 0.0);
    }

    #[test]
    fn totals_satisfy_total_equals_subtotal_plus_tax() {
        let mut items = Vec::new();
        for (qty, price, tax) in [(1u32, 19.99, 5.0), (7, 3.25, 18.0), (2, 450.0, 28.0)] {
            let mut item = LineItem::new();
            item.set_field(ItemField::Quantity, &qty.to_string(), true);
            item.set_field(ItemField::UnitPrice, &price.to_string(), true);
            item.set_field(ItemField::TaxRate, &tax.to_string(), true);
            items.push(item);
        }
        let t = totals(&items);
        assert!((t.total - (t.subtotal + t.tax_total)).abs() < 1e-9);
    }
}
