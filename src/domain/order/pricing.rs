use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::value_objects::{Order, OrderItem};

// ============================================================================
// Order Pricing - display reconciliation only
// ============================================================================
//
// The store's `total_price` is authoritative. Nothing computed here is ever
// written back; it only lets an operator compare line items against the
// recorded total.
//
// ============================================================================

// Amounts saturate at the Decimal bounds instead of panicking, so a corrupt
// record still renders (and fails to reconcile).

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

pub fn subtotal(items: &[OrderItem]) -> Decimal {
    items
        .iter()
        .fold(Decimal::ZERO, |sum, item| sum.saturating_add(item.line_total()))
}

/// Tax and shipping rule applied on top of the item subtotal
pub trait PricingPolicy: Send + Sync {
    fn tax(&self, subtotal: Decimal) -> Decimal;
    fn shipping(&self, subtotal: Decimal) -> Decimal;
}

/// No tax, no shipping.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCharges;

impl PricingPolicy for NoCharges {
    fn tax(&self, _subtotal: Decimal) -> Decimal {
        Decimal::ZERO
    }

    fn shipping(&self, _subtotal: Decimal) -> Decimal {
        Decimal::ZERO
    }
}

/// Percentage tax plus a fixed shipping fee
#[derive(Debug, Clone, Copy)]
pub struct FlatRate {
    /// Fraction, e.g. 0.1 for 10%
    pub tax_rate: Decimal,
    pub shipping_fee: Decimal,
}

impl PricingPolicy for FlatRate {
    fn tax(&self, subtotal: Decimal) -> Decimal {
        subtotal
            .saturating_mul(self.tax_rate)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    fn shipping(&self, _subtotal: Decimal) -> Decimal {
        self.shipping_fee
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub computed_total: Decimal,
    pub recorded_total: Decimal,
    /// recorded minus computed
    pub discrepancy: Decimal,
}

impl OrderSummary {
    pub fn compute(order: &Order, policy: &dyn PricingPolicy) -> Self {
        let subtotal = subtotal(&order.items);
        let tax = policy.tax(subtotal);
        let shipping = policy.shipping(subtotal);
        let computed_total = subtotal.saturating_add(tax).saturating_add(shipping);

        Self {
            subtotal,
            tax,
            shipping,
            computed_total,
            recorded_total: order.total_price,
            discrepancy: order.total_price.saturating_sub(computed_total),
        }
    }

    pub fn reconciles(&self) -> bool {
        self.discrepancy.is_zero()
    }
}

/// Format an amount as US dollars, e.g. `$1,234.50`
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}${grouped}.{cents}")
}
