//! # Status State Machines
//!
//! Order and purchase lifecycles as closed enums with explicit transition
//! functions. Illegal transitions are errors, never silent no-ops.
//!
//! ```text
//!   Order                                Purchase
//!   ─────                                ────────
//!   Pending ──(due ≤ 0)──► Complete      Pending ──approve──► Approved
//!      │                      │             │
//!      └──────cancel──────────┴──►          └──delete──► (gone)
//!                          Cancelled
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Order Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created, money still owed.
    Pending,
    /// Fully paid.
    Complete,
    /// Terminal. Stock has been returned.
    Cancelled,
}

impl OrderStatus {
    /// Status an order is born with.
    pub fn at_creation(due: Money) -> Self {
        if due.is_positive() {
            OrderStatus::Pending
        } else {
            OrderStatus::Complete
        }
    }

    /// Transition to `Cancelled`. Allowed from Pending and Complete.
    pub fn cancel(self) -> CoreResult<Self> {
        match self {
            OrderStatus::Pending | OrderStatus::Complete => Ok(OrderStatus::Cancelled),
            OrderStatus::Cancelled => Err(self.rejected("cancel")),
        }
    }

    /// Status after a payment leaves `due` outstanding.
    ///
    /// Only Pending orders accept payments.
    pub fn after_payment(self, due: Money) -> CoreResult<Self> {
        match self {
            OrderStatus::Pending => Ok(OrderStatus::at_creation(due)),
            OrderStatus::Complete | OrderStatus::Cancelled => Err(self.rejected("accept payment")),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Complete => "complete",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    fn rejected(self, action: &'static str) -> CoreError {
        CoreError::InvalidTransition {
            entity: "Order",
            status: self.as_str().to_string(),
            action,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Purchase Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    /// Recorded, stock not yet credited. May be deleted.
    #[default]
    Pending,
    /// Stock credited. Terminal and immutable.
    Approved,
}

impl PurchaseStatus {
    /// Transition to `Approved`. There is no way back.
    pub fn approve(self) -> CoreResult<Self> {
        match self {
            PurchaseStatus::Pending => Ok(PurchaseStatus::Approved),
            PurchaseStatus::Approved => Err(self.rejected("approve")),
        }
    }

    /// Checks that a purchase in this state may be deleted.
    ///
    /// Approved purchases already credited stock; deleting one would orphan
    /// that credit.
    pub fn ensure_deletable(self) -> CoreResult<()> {
        match self {
            PurchaseStatus::Pending => Ok(()),
            PurchaseStatus::Approved => Err(self.rejected("delete")),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Approved => "approved",
        }
    }

    fn rejected(self, action: &'static str) -> CoreError {
        CoreError::InvalidTransition {
            entity: "Purchase",
            status: self.as_str().to_string(),
            action,
        }
    }
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_at_creation() {
        assert_eq!(OrderStatus::at_creation(Money::zero()), OrderStatus::Complete);
        assert_eq!(
            OrderStatus::at_creation(Money::from_cents(1)),
            OrderStatus::Pending
        );
    }

    #[test]
    fn test_cancel_transitions() {
        assert_eq!(OrderStatus::Pending.cancel().unwrap(), OrderStatus::Cancelled);
        assert_eq!(OrderStatus::Complete.cancel().unwrap(), OrderStatus::Cancelled);

        let err = OrderStatus::Cancelled.cancel().unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { entity: "Order", .. }));
    }

    #[test]
    fn test_payment_transitions() {
        assert_eq!(
            OrderStatus::Pending.after_payment(Money::from_cents(500)).unwrap(),
            OrderStatus::Pending
        );
        assert_eq!(
            OrderStatus::Pending.after_payment(Money::zero()).unwrap(),
            OrderStatus::Complete
        );
        assert!(OrderStatus::Complete.after_payment(Money::zero()).is_err());
        assert!(OrderStatus::Cancelled.after_payment(Money::zero()).is_err());
    }

    #[test]
    fn test_purchase_transitions() {
        assert_eq!(
            PurchaseStatus::Pending.approve().unwrap(),
            PurchaseStatus::Approved
        );
        assert!(PurchaseStatus::Approved.approve().is_err());

        assert!(PurchaseStatus::Pending.ensure_deletable().is_ok());
        let err = PurchaseStatus::Approved.ensure_deletable().unwrap_err();
        assert_eq!(err.to_string(), "Purchase is already approved, cannot delete");
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
        assert_eq!(PurchaseStatus::default(), PurchaseStatus::Pending);
    }
}
