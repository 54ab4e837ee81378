//! Human-readable document numbers.
//!
//! `{PREFIX}-{YYYYMMDD}-{8 hex chars}`; e.g. `INV-20260314-3F9A0C21`.
//! Uniqueness is enforced by the schema, not here.

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub(crate) const INVOICE_PREFIX: &str = "INV";
pub(crate) const PURCHASE_PREFIX: &str = "PUR";

pub(crate) fn document_number(prefix: &str, at: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect::<String>()
        .to_uppercase();

    format!("{prefix}-{}-{suffix}", at.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        let number = document_number(INVOICE_PREFIX, at);

        assert!(number.starts_with("INV-20260314-"));
        assert_eq!(number.len(), "INV-20260314-".len() + 8);
        assert!(number[13..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_numbers_differ() {
        let at = Utc::now();
        assert_ne!(
            document_number(PURCHASE_PREFIX, at),
            document_number(PURCHASE_PREFIX, at)
        );
    }
}
