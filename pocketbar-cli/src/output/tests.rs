//! CLI output formatting tests.
//!
//! These tests verify that sensors render correctly in both text and JSON
//! output modes.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::text::{TextFormatter, format_age, transaction_accounts};
    use chrono::{Duration, TimeZone, Utc};
    use pocketbar_core::{DeviceClass, SensorSnapshot, SensorValue};
    use rust_decimal::Decimal;
    use serde_json::json;

    fn balance(available: bool) -> SensorSnapshot {
        let mut snapshot = SensorSnapshot::new(
            "pocketsmith_1_everyday_balance",
            "PocketSmith Account Everyday Balance",
            "NZD",
            DeviceClass::Monetary,
            "mdi:currency-usd",
        );
        if available {
            snapshot.state = Some(SensorValue::Money(Decimal::new(15230, 2)));
            snapshot.available = true;
            snapshot.attributes.insert(
                "transaction_accounts".to_string(),
                json!([{"id": 11, "account_id": 1, "name": "Main", "current_balance": 152.3}]),
            );
        }
        snapshot
    }

    #[test]
    fn test_available_balance() {
        let output = TextFormatter::new(false).format_snapshot(&balance(true));
        assert!(output.contains("PocketSmith Account Everyday Balance"));
        assert!(output.contains("152.30 NZD"));
        assert!(output.contains("• Main: 152.30"));
    }

    #[test]
    fn test_unavailable_balance() {
        let mut snapshot = balance(false);
        snapshot.last_error = Some("HTTP 500 from /accounts/1".to_string());
        let output = TextFormatter::new(false).format_snapshot(&snapshot);
        assert!(output.contains("unavailable"));
        assert!(output.contains("Last error: HTTP 500"));
    }

    #[test]
    fn test_colors() {
        let colored = TextFormatter::new(true).format_snapshot(&balance(true));
        assert!(colored.contains("\x1b[32m152.30 NZD"));

        let plain = TextFormatter::new(false).format_snapshot(&balance(true));
        assert!(!plain.contains('\x1b'));
    }

    #[test]
    fn test_negative_balance_is_red() {
        let mut snapshot = balance(true);
        snapshot.state = Some(SensorValue::Money(Decimal::new(-500, 2)));
        let output = TextFormatter::new(true).format_snapshot(&snapshot);
        assert!(output.contains("\x1b[31m-5.00 NZD"));
    }

    #[test]
    fn test_uncategorised_count() {
        let mut snapshot = SensorSnapshot::new(
            "pocketsmith_42_uncategorised_transactions",
            "Pocketsmith Uncategorised Transactions",
            "transactions",
            DeviceClass::Count,
            "mdi:alert-circle-outline",
        );
        snapshot.state = Some(SensorValue::Count(2));
        snapshot.available = true;
        let output = TextFormatter::new(false).format_snapshot(&snapshot);
        assert!(output.contains("2 transactions"));
    }

    #[test]
    fn test_no_sensors() {
        assert_eq!(TextFormatter::new(false).format_snapshots(&[]), "No sensors");
    }

    #[test]
    fn test_missing_attribute_fields() {
        let mut snapshot = balance(false);
        snapshot
            .attributes
            .insert("transaction_accounts".to_string(), json!([{"id": 3}]));
        assert_eq!(
            transaction_accounts(&snapshot),
            vec![("Unnamed".to_string(), "-".to_string())]
        );
    }

    #[test]
    fn test_format_age() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(format_age(now, now), "just now");
        assert_eq!(format_age(now - Duration::seconds(42), now), "42s ago");
        assert_eq!(format_age(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_age(now - Duration::minutes(125), now), "2h 5m ago");
        // Clock skew never goes negative.
        assert_eq!(format_age(now + Duration::seconds(30), now), "just now");
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::JsonFormatter;
    use chrono::{TimeZone, Utc};
    use pocketbar_core::{DeviceClass, SensorSnapshot, SensorValue};
    use rust_decimal::Decimal;
    use serde_json::Value;

    #[test]
    fn test_snapshot_fields() {
        let mut snapshot = SensorSnapshot::new(
            "pocketsmith_1_everyday_balance",
            "PocketSmith Account Everyday Balance",
            "NZD",
            DeviceClass::Monetary,
            "mdi:currency-usd",
        );
        snapshot.state = Some(SensorValue::Money(Decimal::new(15230, 2)));
        snapshot.available = true;
        snapshot.last_updated = Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());

        let output = JsonFormatter::new(false).format_snapshots(&[snapshot]).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        let item = &parsed[0];

        assert_eq!(item["uniqueId"], "pocketsmith_1_everyday_balance");
        assert_eq!(item["state"], "152.30");
        assert_eq!(item["unit"], "NZD");
        assert_eq!(item["deviceClass"], "monetary");
        assert_eq!(item["available"], true);
        assert_eq!(item["lastUpdated"], "2024-05-01T12:00:00+00:00");
        assert!(item.get("lastError").is_none());
        assert!(item.get("attributes").is_none());
    }

    #[test]
    fn test_unavailable_snapshot() {
        let snapshot = SensorSnapshot::new(
            "pocketsmith_42_uncategorised_transactions",
            "Pocketsmith Uncategorised Transactions",
            "transactions",
            DeviceClass::Count,
            "mdi:alert-circle-outline",
        );

        let output = JsonFormatter::new(false).format_snapshots(&[snapshot]).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["state"], "unavailable");
        assert_eq!(parsed[0]["available"], false);
        assert!(parsed[0].get("lastUpdated").is_none());
    }
}
