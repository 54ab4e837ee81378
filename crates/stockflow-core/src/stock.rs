//! # Stock Batches
//!
//! The unit of work handed to the stock ledger: a set of
//! `(product_id, quantity)` pairs that must be applied together or not at
//! all.
//!
//! Entries are kept in a `BTreeMap` so that every batch touches rows in the
//! same (sorted) order, and repeated product ids are merged by summing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::validation::{validate_quantity, ValidationResult};

/// Quantities per product id, all strictly positive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockBatch {
    entries: BTreeMap<String, i64>,
}

impl StockBatch {
    pub fn new() -> Self {
        StockBatch::default()
    }

    /// Adds `quantity` for `product_id`, merging with any existing entry.
    pub fn add(&mut self, product_id: impl Into<String>, quantity: i64) -> ValidationResult<()> {
        validate_quantity(quantity)?;
        let slot = self.entries.entry(product_id.into()).or_insert(0);
        *slot = slot
            .checked_add(quantity)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: i64::MAX,
            })?;
        Ok(())
    }

    /// Builds a batch from pairs, merging duplicates.
    pub fn from_pairs<I, S>(pairs: I) -> ValidationResult<Self>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut batch = StockBatch::new();
        for (product_id, quantity) in pairs {
            batch.add(product_id, quantity)?;
        }
        Ok(batch)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn quantity_of(&self, product_id: &str) -> Option<i64> {
        self.entries.get(product_id).copied()
    }

    /// Iterates entries in product id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(id, qty)| (id.as_str(), *qty))
    }

    pub fn product_ids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// Why a stock counter moved. Recorded next to every ledger mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockMovementReason {
    /// Decrement for a new order.
    Sale,
    /// Compensating increment after an order failed to persist.
    SaleReversal,
    /// Increment for a cancelled order.
    Cancellation,
    /// Increment for an approved purchase.
    PurchaseApproval,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_ids_are_merged() {
        let batch = StockBatch::from_pairs([("b", 2), ("a", 1), ("b", 3)]).unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.quantity_of("b"), Some(5));
        let ids: Vec<&str> = batch.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        assert!(StockBatch::from_pairs([("a", 0)]).is_err());
        assert!(StockBatch::from_pairs([("a", -4)]).is_err());
        assert!(StockBatch::new().is_empty());
    }

    #[test]
    fn test_reason_serialization() {
        assert_eq!(
            serde_json::to_string(&StockMovementReason::SaleReversal).unwrap(),
            "\"sale_reversal\""
        );
    }
}
