//! Quote arithmetic.
//!
//! `total = max(subtotal - discounts, 0)`, where percent discounts apply to the
//! subtotal (not compounded) and fixed discounts are absolute amounts in the
//! quote's currency.

use crate::model::{Discount, DiscountKind, LineItem, Quote};

pub fn line_total(item: &LineItem) -> f64 {
    item.unit_price * item.quantity
}

pub fn subtotal(items: &[LineItem]) -> f64 {
    items.iter().map(line_total).sum()
}

pub fn discount_amount(discount: &Discount, subtotal: f64) -> f64 {
    match discount.kind {
        DiscountKind::Percent => subtotal * discount.value.min(100.0) / 100.0,
        DiscountKind::Fixed => discount.value,
    }
}

pub fn discount_total(items: &[LineItem], discounts: &[Discount]) -> f64 {
    let base = subtotal(items);
    discounts.iter().map(|d| discount_amount(d, base)).sum()
}

pub fn total(items: &[LineItem], discounts: &[Discount]) -> f64 {
    (subtotal(items) - discount_total(items, discounts)).max(0.0)
}

pub fn total_quantity(items: &[LineItem]) -> f64 {
    items.iter().map(|item| item.quantity).sum()
}

/// Totals as the quote would print them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteTotals {
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
}

impl QuoteTotals {
    pub fn of(quote: &Quote) -> Self {
        Self {
            subtotal: subtotal(&quote.items),
            discount: discount_total(&quote.items, &quote.discounts),
            total: total(&quote.items, &quote.discounts),
        }
    }
}

/// `12.5` → `"EUR 12.50"`; symbols for the currencies the front end knows.
pub fn format_amount(amount: f64, currency: &str) -> String {
    let symbol = match currency {
        "EUR" => "€",
        "USD" => "$",
        "GBP" => "£",
        other => return format!("{} {:.2}", other, amount),
    };
    format!("{}{:.2}", symbol, amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: f64, qty: f64) -> LineItem {
        LineItem {
            id: 1,
            code: "A".into(),
            description: "Widget".into(),
            unit_price: price,
            quantity: qty,
            is_service: false,
        }
    }

    #[test]
    fn subtotal_sums_lines() {
        let items = vec![item(10.0, 3.0), item(2.5, 2.0)];
        assert_eq!(subtotal(&items), 35.0);
        assert_eq!(total_quantity(&items), 5.0);
    }

    #[test]
    fn total_without_discounts_is_subtotal() {
        let items = vec![item(100.0, 1.0)];
        assert_eq!(total(&items, &[]), 100.0);
    }

    #[test]
    fn percent_and_fixed_discounts() {
        let items = vec![item(100.0, 2.0)];
        let discounts = vec![
            Discount {
                description: "loyalty".into(),
                kind: DiscountKind::Percent,
                value: 10.0,
            },
            Discount {
                description: "promo".into(),
                kind: DiscountKind::Fixed,
                value: 5.0,
            },
        ];
        assert_eq!(discount_total(&items, &discounts), 25.0);
        assert_eq!(total(&items, &discounts), 175.0);
    }

    #[test]
    fn total_never_goes_negative() {
        let items = vec![item(10.0, 1.0)];
        let discounts = vec![Discount {
            description: String::new(),
            kind: DiscountKind::Fixed,
            value: 50.0,
        }];
        assert_eq!(total(&items, &discounts), 0.0);
    }

    #[test]
    fn formats_known_and_unknown_currencies() {
        assert_eq!(format_amount(12.5, "EUR"), "€12.50");
        assert_eq!(format_amount(3.0, "CHF"), "CHF 3.00");
    }
}
