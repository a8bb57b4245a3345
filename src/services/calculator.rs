// src/services/calculator.rs

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::error::AppError;
use crate::models::invoice::LineItem;

/// Rounds to the minor unit (kobo).
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// A VAT rate as a fraction of one (0.075 == 7.5%).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VatRate(Decimal);

impl VatRate {
    pub fn new(rate: Decimal) -> Result<Self, AppError> {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(AppError::invalid_amount(
                "vatRate",
                format!("{rate} is outside [0, 1]"),
            ));
        }
        Ok(Self(rate))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Default for VatRate {
    fn default() -> Self {
        Self(Decimal::new(75, 3))
    }
}

/// What to do with a negative or unreadable amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountPolicy {
    /// Treat it as zero, the way the invoice form always has.
    #[default]
    Coerce,
    /// Fail with `InvalidAmount`.
    Reject,
}

impl FromStr for AmountPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coerce" => Ok(AmountPolicy::Coerce),
            "reject" => Ok(AmountPolicy::Reject),
            other => Err(format!("unknown amount policy '{other}' (expected coerce or reject)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub vat_amount: Decimal,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseTotals {
    pub vat_amount: Decimal,
    pub total_amount: Decimal,
}

/// VAT and total computation. Every call recomputes from its inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calculator {
    vat_rate: VatRate,
    policy: AmountPolicy,
}

impl Calculator {
    pub fn new(vat_rate: VatRate, policy: AmountPolicy) -> Self {
        Self { vat_rate, policy }
    }

    pub fn vat_rate(&self) -> VatRate {
        self.vat_rate
    }

    pub fn policy(&self) -> AmountPolicy {
        self.policy
    }

    /// Applies the amount policy to a single input value.
    pub fn sanitize(&self, field: &'static str, value: Decimal) -> Result<Decimal, AppError> {
        if value >= Decimal::ZERO {
            return Ok(value);
        }
        match self.policy {
            AmountPolicy::Coerce => Ok(Decimal::ZERO),
            AmountPolicy::Reject => Err(AppError::invalid_amount(field, format!("{value} is negative"))),
        }
    }

    /// Reads a textual amount the way a form field is read. Falls back to a
    /// float parse; NaN, infinities and garbage follow the amount policy.
    pub fn parse_amount(&self, field: &'static str, raw: &str) -> Result<Decimal, AppError> {
        let raw = raw.trim();
        let parsed = Decimal::from_str(raw).ok().or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .and_then(Decimal::from_f64)
        });

        match parsed {
            Some(value) => self.sanitize(field, value),
            None => match self.policy {
                AmountPolicy::Coerce => Ok(Decimal::ZERO),
                AmountPolicy::Reject => Err(AppError::invalid_amount(
                    field,
                    format!("'{raw}' is not a finite number"),
                )),
            },
        }
    }

    pub fn line_total(&self, quantity: Decimal, unit_price: Decimal) -> Result<Decimal, AppError> {
        let quantity = self.sanitize("quantity", quantity)?;
        let unit_price = self.sanitize("unitPrice", unit_price)?;
        Ok(round2(quantity * unit_price))
    }

    /// Returns the items with every `line_total` rebuilt from quantity and unit price.
    pub fn price_line_items(&self, items: &[LineItem]) -> Result<Vec<LineItem>, AppError> {
        items
            .iter()
            .map(|item| {
                Ok(LineItem {
                    description: item.description.clone(),
                    quantity: self.sanitize("quantity", item.quantity)?,
                    unit_price: self.sanitize("unitPrice", item.unit_price)?,
                    line_total: self.line_total(item.quantity, item.unit_price)?,
                })
            })
            .collect()
    }

    pub fn invoice_totals(&self, items: &[LineItem], apply_vat: bool) -> Result<InvoiceTotals, AppError> {
        let mut subtotal = Decimal::ZERO;
        for item in items {
            subtotal += self.line_total(item.quantity, item.unit_price)?;
        }

        let vat_amount = self.vat_on(subtotal, apply_vat);
        Ok(InvoiceTotals {
            subtotal,
            vat_amount,
            total_amount: subtotal + vat_amount,
        })
    }

    pub fn expense_totals(&self, amount: Decimal, apply_vat: bool) -> Result<ExpenseTotals, AppError> {
        let amount = round2(self.sanitize("amount", amount)?);
        let vat_amount = self.vat_on(amount, apply_vat);
        Ok(ExpenseTotals {
            vat_amount,
            total_amount: amount + vat_amount,
        })
    }

    fn vat_on(&self, base: Decimal, apply_vat: bool) -> Decimal {
        if apply_vat {
            round2(base * self.vat_rate.value())
        } else {
            Decimal::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(quantity: &str, unit_price: &str) -> LineItem {
        LineItem {
            description: "Item".to_string(),
            quantity: dec(quantity),
            unit_price: dec(unit_price),
            line_total: Decimal::ZERO,
        }
    }

    #[test]
    fn two_line_invoice_with_vat() {
        let calc = Calculator::default();
        let items = vec![item("2", "500"), item("1", "1500")];

        let totals = calc.invoice_totals(&items, true).unwrap();

        assert_eq!(totals.subtotal, dec("2500"));
        assert_eq!(totals.vat_amount, dec("187.50"));
        assert_eq!(totals.total_amount, dec("2687.50"));
    }

    #[test]
    fn invoice_totals_match_summed_line_totals() {
        let calc = Calculator::default();
        let items = vec![item("3", "19.99"), item("0.5", "1234.57"), item("7", "0.33")];

        let summed: Decimal = items
            .iter()
            .map(|i| calc.line_total(i.quantity, i.unit_price).unwrap())
            .sum();
        let totals = calc.invoice_totals(&items, true).unwrap();

        assert_eq!(totals.subtotal, summed);
        assert_eq!(totals.vat_amount, round2(summed * dec("0.075")));
        assert_eq!(totals.total_amount, totals.subtotal + totals.vat_amount);
    }

    #[test]
    fn totals_are_idempotent() {
        let calc = Calculator::default();
        let items = vec![item("2", "500"), item("1", "1500")];

        let first = calc.invoice_totals(&items, true).unwrap();
        let second = calc.invoice_totals(&items, true).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn no_vat_when_flag_is_off() {
        let calc = Calculator::default();
        let totals = calc.invoice_totals(&[item("4", "250")], false).unwrap();

        assert_eq!(totals.vat_amount, Decimal::ZERO);
        assert_eq!(totals.total_amount, dec("1000"));
    }

    #[test]
    fn empty_invoice_totals_are_zero() {
        let totals = Calculator::default().invoice_totals(&[], true).unwrap();
        assert_eq!(totals.total_amount, Decimal::ZERO);
    }

    #[test]
    fn line_total_rounds_to_kobo() {
        let calc = Calculator::default();
        assert_eq!(calc.line_total(dec("3"), dec("0.335")).unwrap(), dec("1.01"));
        assert_eq!(calc.line_total(dec("1"), dec("0.005")).unwrap(), dec("0.01"));
    }

    #[test]
    fn coerce_policy_zeroes_negative_inputs() {
        let calc = Calculator::default();
        assert_eq!(calc.line_total(dec("-2"), dec("500")).unwrap(), Decimal::ZERO);

        let totals = calc.expense_totals(dec("-100"), true).unwrap();
        assert_eq!(totals.total_amount, Decimal::ZERO);
    }

    #[test]
    fn reject_policy_fails_on_negative_inputs() {
        let calc = Calculator::new(VatRate::default(), AmountPolicy::Reject);

        let err = calc.line_total(dec("2"), dec("-1")).unwrap_err();
        assert!(matches!(err, AppError::InvalidAmount { field: "unitPrice", .. }));

        let err = calc.expense_totals(dec("-0.01"), false).unwrap_err();
        assert!(matches!(err, AppError::InvalidAmount { field: "amount", .. }));
    }

    #[test]
    fn parse_amount_follows_policy() {
        let coerce = Calculator::default();
        assert_eq!(coerce.parse_amount("amount", "12.5").unwrap(), dec("12.5"));
        assert_eq!(coerce.parse_amount("amount", "1e3").unwrap(), dec("1000"));
        assert_eq!(coerce.parse_amount("amount", "abc").unwrap(), Decimal::ZERO);
        assert_eq!(coerce.parse_amount("amount", "NaN").unwrap(), Decimal::ZERO);
        assert_eq!(coerce.parse_amount("amount", "inf").unwrap(), Decimal::ZERO);

        let reject = Calculator::new(VatRate::default(), AmountPolicy::Reject);
        assert!(reject.parse_amount("amount", "").is_err());
        assert!(reject.parse_amount("amount", "-5").is_err());
    }

    #[test]
    fn expense_totals_with_vat() {
        let totals = Calculator::default().expense_totals(dec("12000"), true).unwrap();
        assert_eq!(totals.vat_amount, dec("900"));
        assert_eq!(totals.total_amount, dec("12900"));
    }

    #[test]
    fn configurable_rate() {
        let calc = Calculator::new(VatRate::new(dec("0.2")).unwrap(), AmountPolicy::Coerce);
        assert_eq!(calc.expense_totals(dec("50"), true).unwrap().vat_amount, dec("10"));

        assert!(VatRate::new(dec("1.5")).is_err());
        assert!(VatRate::new(dec("-0.1")).is_err());
    }

    #[test]
    fn price_line_items_discards_client_totals() {
        let calc = Calculator::default();
        let mut stale = item("2", "500");
        stale.line_total = dec("9999");

        let priced = calc.price_line_items(&[stale]).unwrap();
        assert_eq!(priced[0].line_total, dec("1000"));
    }

    #[test]
    fn amount_policy_parses_from_env_strings() {
        assert_eq!("Reject".parse::<AmountPolicy>().unwrap(), AmountPolicy::Reject);
        assert_eq!(" coerce ".parse::<AmountPolicy>().unwrap(), AmountPolicy::Coerce);
        assert!("strict".parse::<AmountPolicy>().is_err());
    }
}
