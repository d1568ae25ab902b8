//! Human-readable document codes.
//!
//! Orders and POS sales use `<PREFIX>-<year>-<seq>` where the sequence comes
//! from a durable per-(prefix, year) counter (see `db::counters`). Service
//! tickets keep the original timestamp-derived form `SRV-<unix-seconds>`.

use chrono::{DateTime, Datelike, Utc};

pub const ORDER_PREFIX: &str = "ORD";
pub const POS_PREFIX: &str = "POS";

pub fn document_code(prefix: &str, year: i32, sequence: i64) -> String {
    format!("{}-{}-{:04}", prefix, year, sequence)
}

pub fn service_code(now: DateTime<Utc>) -> String {
    format!("SRV-{}", now.timestamp())
}

pub fn current_year(now: DateTime<Utc>) -> i32 {
    now.year()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_order_code_format() {
        assert_eq!(document_code(ORDER_PREFIX, 2024, 7), "ORD-2024-0007");
        assert_eq!(document_code(POS_PREFIX, 2025, 12345), "POS-2025-12345");
    }

    #[test]
    fn test_service_code_uses_epoch_seconds() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(service_code(now), format!("SRV-{}", now.timestamp()));
    }
}
