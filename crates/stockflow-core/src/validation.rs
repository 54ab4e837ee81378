//! # Validation Module
//!
//! Input validation for orchestrator requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Orchestrator entry (stockflow-engine)                        │
//! │  └── THIS MODULE: tenant, ids, quantities, amounts, line counts        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Stock ledger                                                 │
//! │  └── Conditional UPDATE ... WHERE stock_quantity >= ?                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock_quantity >= 0)                                       │
//! │  ├── UNIQUE (invoice_no), UNIQUE (purchase_no)                         │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_AMOUNT_MINOR, MAX_LINES_PER_DOCUMENT, MAX_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Identifiers
// =============================================================================

/// Validates a tenant identifier.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most 64 characters
pub fn validate_tenant_id(tenant_id: &str) -> ValidationResult<()> {
    let tenant_id = tenant_id.trim();

    if tenant_id.is_empty() {
        return Err(ValidationError::required("tenant"));
    }

    if tenant_id.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "tenant".to_string(),
            max: 64,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a caller-supplied decimal amount (price or payment).
///
/// ## Rules
/// - Must be a finite number
/// - Must not be negative
/// - Must not exceed MAX_AMOUNT_MINOR once converted to cents
pub fn validate_decimal_amount(field: &str, amount: f64) -> ValidationResult<()> {
    if !amount.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if amount < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    if amount * 100.0 > MAX_AMOUNT_MINOR as f64 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_MINOR / 100,
        });
    }

    Ok(())
}

/// Validates a payment amount in cents for a due payment.
///
/// Paying nothing is rejected; it would change no state.
pub fn validate_payment_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0 % to 100 %).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of lines on an order or purchase.
pub fn validate_line_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::required("lines"));
    }

    if count > MAX_LINES_PER_DOCUMENT {
        return Err(ValidationError::OutOfRange {
            field: "lines".to_string(),
            min: 1,
            max: MAX_LINES_PER_DOCUMENT as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tenant_id() {
        assert!(validate_tenant_id("acme").is_ok());
        assert!(validate_tenant_id("").is_err());
        assert!(validate_tenant_id("   ").is_err());
        assert!(validate_tenant_id(&"t".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_decimal_amount() {
        assert!(validate_decimal_amount("amount_paid", 0.0).is_ok());
        assert!(validate_decimal_amount("amount_paid", 23.2).is_ok());
        assert!(validate_decimal_amount("amount_paid", -0.01).is_err());
        assert!(validate_decimal_amount("amount_paid", f64::INFINITY).is_err());
        assert!(validate_decimal_amount("amount_paid", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_decimal_amount_upper_bound() {
        let max_major = (MAX_AMOUNT_MINOR / 100) as f64;
        assert!(validate_decimal_amount("amount", max_major).is_ok());
        assert!(matches!(
            validate_decimal_amount("amount", max_major + 1.0),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_decimal_amount("amount", 1e17).is_err());
    }

    #[test]
    fn test_validate_payment_cents() {
        assert!(validate_payment_cents(1).is_ok());
        assert!(validate_payment_cents(0).is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(1600).is_ok());
        assert!(validate_tax_rate_bps(10_001).is_err());
    }

    #[test]
    fn test_validate_line_count() {
        assert!(validate_line_count(1).is_ok());
        assert!(validate_line_count(0).is_err());
        assert!(validate_line_count(MAX_LINES_PER_DOCUMENT + 1).is_err());
    }
}
