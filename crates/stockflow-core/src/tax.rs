//! # Tax Calculator
//!
//! Turns priced lines into header totals.
//!
//! ## Order VAT Split
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Lines                                                                  │
//! │   ├── Exclusive (VAT on top)   ──► taxable      ──► floor(× rate)       │
//! │   │                                                 = additional_vat    │
//! │   └── Inclusive (VAT embedded) ──► non_taxable  ──► floor(× r/(1+r))    │
//! │                                                     = included_vat      │
//! │                                                                         │
//! │  subtotal = taxable + non_taxable                                       │
//! │  vat      = additional_vat + included_vat      (shown to the buyer)     │
//! │  total    = subtotal + additional_vat          (included VAT is already │
//! │                                                 inside the subtotal)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Purchases skip the split and apply one supplied rate to the subtotal.
//!
//! Every sum is checked; an overflow is a validation error, never a wrap.

use serde::{Deserialize, Serialize};

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{TaxRate, TaxType};

/// A line total tagged with how its price treats VAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxLine {
    pub line_total: Money,
    pub tax_type: TaxType,
}

impl TaxLine {
    pub fn new(line_total: Money, tax_type: TaxType) -> Self {
        TaxLine {
            line_total,
            tax_type,
        }
    }
}

/// Header amounts for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub taxable: Money,
    pub non_taxable: Money,
    pub additional_vat: Money,
    pub included_vat: Money,
    pub vat: Money,
    pub total: Money,
}

/// Header amounts for a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

/// Computes the VAT split for an order.
///
/// The subtotal is the plain sum of line totals, so it always matches the
/// persisted lines.
pub fn compute_order_tax(lines: &[TaxLine], rate: TaxRate) -> CoreResult<OrderTotals> {
    let mut taxable = Money::zero();
    let mut non_taxable = Money::zero();

    for line in lines {
        match line.tax_type {
            TaxType::Exclusive => taxable = add(taxable, line.line_total, "taxable")?,
            TaxType::Inclusive => non_taxable = add(non_taxable, line.line_total, "non_taxable")?,
        }
    }

    let subtotal = add(taxable, non_taxable, "subtotal")?;
    let additional_vat = taxable.tax_on_top(rate);
    let included_vat = non_taxable.tax_included(rate);

    Ok(OrderTotals {
        subtotal,
        taxable,
        non_taxable,
        additional_vat,
        included_vat,
        vat: add(additional_vat, included_vat, "vat")?,
        total: add(subtotal, additional_vat, "total")?,
    })
}

/// Computes purchase totals with a single flat rate.
pub fn compute_flat_tax(line_totals: &[Money], rate: TaxRate) -> CoreResult<PurchaseTotals> {
    let subtotal = line_totals
        .iter()
        .try_fold(Money::zero(), |acc, line| add(acc, *line, "subtotal"))?;
    let tax = subtotal.tax_on_top(rate);

    Ok(PurchaseTotals {
        subtotal,
        tax,
        total: add(subtotal, tax, "total")?,
    })
}

fn add(a: Money, b: Money, field: &str) -> CoreResult<Money> {
    a.checked_add(b)
        .ok_or_else(|| ValidationError::overflow(field).into())
}

// =============================================================================
// Unit Tests
// =============================================================================
