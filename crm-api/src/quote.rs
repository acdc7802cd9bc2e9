//! QuoteDraft: working copy of a new quote and its line items.
//!
//! Line totals and the quote total are derived: every edit that can change
//! them recomputes them, so a draft never carries a stale total.

use chrono::{Duration, Local, NaiveDate};
use crm_fields::ValidationErrors;
use serde::{Deserialize, Serialize};

/// Days between the quote date and its default expiration.
pub const VALIDITY_DAYS: i64 = 30;

/// A catalogue entry that can be put on a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItem {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub line_total: f64,
}

impl Default for QuoteItem {
    fn default() -> Self {
        Self {
            product_id: String::new(),
            quantity: 1,
            unit_price: 0.0,
            line_total: 0.0,
        }
    }
}

impl QuoteItem {
    fn recompute(&mut self) {
        self.line_total = self.unit_price * f64::from(self.quantity);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDraft {
    pub customer_id: String,
    pub quote_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub items: Vec<QuoteItem>,
    pub notes: String,
    pub total_amount: f64,
}

impl QuoteDraft {
    /// Empty draft dated `today`, expiring after the default validity period.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            customer_id: String::new(),
            quote_date: today,
            expiration_date: today + Duration::days(VALIDITY_DAYS),
            items: Vec::new(),
            notes: String::new(),
            total_amount: 0.0,
        }
    }

    /// Empty draft dated with the local date.
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn set_customer(&mut self, customer_id: impl Into<String>) {
        self.customer_id = customer_id.into();
    }

    /// Append a blank line item and return its index.
    pub fn add_item(&mut self) -> usize {
        self.items.push(QuoteItem::default());
        self.items.len() - 1
    }

    pub fn remove_item(&mut self, index: usize) -> Option<QuoteItem> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        self.recompute_total();
        Some(removed)
    }

    /// Put `product` on line `index`, taking over its price.
    pub fn select_product(&mut self, index: usize, product: &Product) -> Option<&QuoteItem> {
        let item = self.items.get_mut(index)?;
        item.product_id = product.id.clone();
        item.unit_price = product.price;
        item.recompute();
        self.recompute_total();
        self.items.get(index)
    }

    pub fn set_quantity(&mut self, index: usize, quantity: u32) -> Option<&QuoteItem> {
        let item = self.items.get_mut(index)?;
        item.quantity = quantity;
        item.recompute();
        self.recompute_total();
        self.items.get(index)
    }

    /// Local checks run before the draft is sent. Every failure is reported.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.customer_id.trim().is_empty() {
            errors.insert("customerId", "Customer is required");
        }
        if self.expiration_date < self.quote_date {
            errors.insert(
                "expirationDate",
                "Expiration date cannot be before the quote date",
            );
        }
        if self.items.is_empty() {
            errors.insert("items", "Add at least one item to the quote");
        }
        for (i, item) in self.items.iter().enumerate() {
            if item.product_id.trim().is_empty() {
                errors.insert(format!("items[{i}].productId"), "Product is required");
            }
            if item.quantity == 0 {
                errors.insert(format!("items[{i}].quantity"), "Quantity must be at least 1");
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn recompute_total(&mut self) {
        self.total_amount = self.items.iter().map(|item| item.line_total).sum();
    }
}

impl Default for QuoteDraft {
    fn default() -> Self {
        Self::today()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn product(id: &str, price: f64) -> Product {
        Product {
            id: id.into(),
            name: format!("Product {id}"),
            sku: String::new(),
            description: String::new(),
            price,
        }
    }

    #[test]
    fn new_draft_expires_after_thirty_days() {
        let draft = QuoteDraft::new(date(2026, 10, 18));
        assert_eq!(draft.expiration_date, date(2026, 11, 17));
        assert_eq!(draft.total_amount, 0.0);
    }

    #[test]
    fn selecting_product_prices_the_line() {
        let mut draft = QuoteDraft::new(date(2026, 1, 1));
        let idx = draft.add_item();
        let item = draft.select_product(idx, &product("1", 2500.0)).unwrap();
        assert_eq!(item.unit_price, 2500.0);
        assert_eq!(item.line_total, 2500.0);
        assert_eq!(draft.total_amount, 2500.0);
    }

    #[test]
    fn quantity_and_removal_recompute_totals() {
        let mut draft = QuoteDraft::new(date(2026, 1, 1));
        let a = draft.add_item();
        let b = draft.add_item();
        draft.select_product(a, &product("1", 2500.0));
        draft.select_product(b, &product("3", 1500.0));
        draft.set_quantity(b, 2);
        assert_eq!(draft.items[b].line_total, 3000.0);
        assert_eq!(draft.total_amount, 5500.0);

        draft.remove_item(a);
        assert_eq!(draft.total_amount, 3000.0);
        assert!(draft.remove_item(7).is_none());
        assert!(draft.set_quantity(7, 1).is_none());
    }

    #[test]
    fn validation_requires_customer_and_items() {
        let draft = QuoteDraft::new(date(2026, 1, 1));
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.get("customerId"), Some("Customer is required"));
        assert_eq!(errors.get("items"), Some("Add at least one item to the quote"));
    }

    #[test]
    fn validation_checks_each_line() {
        let mut draft = QuoteDraft::new(date(2026, 1, 1));
        draft.set_customer("1");
        let idx = draft.add_item();
        draft.set_quantity(idx, 0);
        let errors = draft.validate().unwrap_err();
        assert!(errors.contains_key("items[0].productId"));
        assert!(errors.contains_key("items[0].quantity"));

        draft.select_product(idx, &product("2", 4000.0));
        draft.set_quantity(idx, 1);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn serializes_with_backend_field_names() {
        let mut draft = QuoteDraft::new(date(2026, 3, 1));
        draft.set_customer("7");
        let idx = draft.add_item();
        draft.select_product(idx, &product("1", 10.0));
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["customerId"], "7");
        assert_eq!(json["quoteDate"], "2026-03-01");
        assert_eq!(json["expirationDate"], "2026-03-31");
        assert_eq!(json["items"][0]["unitPrice"], 10.0);
        assert_eq!(json["totalAmount"], 10.0);
    }
}
