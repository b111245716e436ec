//! Serialization tests for sensor and remote models.

use rust_decimal::Decimal;
use serde_json::json;

use super::*;

#[test]
fn test_device_class_wire_names() {
    assert_eq!(serde_json::to_value(DeviceClass::Monetary).unwrap(), json!("monetary"));
    assert_eq!(serde_json::to_value(DeviceClass::Count).unwrap(), json!("count"));
}

#[test]
fn test_snapshot_roundtrip_keeps_state() {
    let mut snapshot = SensorSnapshot::new(
        "pocketsmith_1_everyday_balance",
        "PocketSmith Account Everyday Balance",
        "NZD",
        DeviceClass::Monetary,
        "mdi:currency-usd",
    );
    snapshot.state = Some(SensorValue::Money(Decimal::new(15230, 2)));
    snapshot.available = true;

    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: SensorSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.unique_id, snapshot.unique_id);
    assert_eq!(parsed.state_text(), "152.30");
}

#[test]
fn test_state_text_before_first_refresh() {
    let snapshot = SensorSnapshot::new("id", "name", "transactions", DeviceClass::Count, "icon");
    assert!(!snapshot.has_state());
    assert_eq!(snapshot.state_text(), "unavailable");
}

#[test]
fn test_account_decode_ignores_extra_fields() {
    let account: Account = serde_json::from_value(json!({
        "id": 1,
        "title": "Everyday",
        "currency_code": "nzd",
        "current_balance": 152.30,
        "type": "bank",
        "institution": {"id": 9, "title": "Kiwibank"},
        "transaction_accounts": [{
            "id": 11,
            "account_id": 1,
            "name": "Everyday",
            "current_balance": 152.30,
            "number": "38-9000-0000000-00",
            "starting_balance": 10.0
        }]
    }))
    .unwrap();

    assert_eq!(account.balance(), Decimal::new(15230, 2));
    let attribute = account.transaction_accounts()[0].to_attribute();
    let keys: Vec<&str> = attribute
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys.len(), 4);
    for key in ["id", "account_id", "name", "current_balance"] {
        assert!(keys.contains(&key), "missing {key}");
    }
}
