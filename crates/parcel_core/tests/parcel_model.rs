use parcel_core::{Parcel, ParcelStatus};

#[test]
fn parcel_new_starts_registered_and_unsaved() {
    let parcel = Parcel::new(1000, "test");

    assert_eq!(parcel.number, 0);
    assert!(!parcel.is_persisted());
    assert_eq!(parcel.client, 1000);
    assert_eq!(parcel.status, ParcelStatus::Registered);
    assert_eq!(parcel.address, "test");
    assert!(chrono::DateTime::parse_from_rfc3339(&parcel.created_at).is_ok());
}

#[test]
fn status_advances_forward_and_stops_at_delivered() {
    assert_eq!(ParcelStatus::Registered.next(), Some(ParcelStatus::Sent));
    assert_eq!(ParcelStatus::Sent.next(), Some(ParcelStatus::Delivered));
    assert_eq!(ParcelStatus::Delivered.next(), None);
}

#[test]
fn parcel_serialization_uses_lowercase_status_and_snake_case_fields() {
    let parcel = Parcel {
        number: 7,
        client: 1000,
        status: ParcelStatus::Sent,
        address: "test".to_string(),
        created_at: "2024-01-01T00:00:00Z".to_string(),
    };

    let json = serde_json::to_value(&parcel).unwrap();
    assert_eq!(json["number"], 7);
    assert_eq!(json["status"], "sent");
    assert_eq!(json["created_at"], "2024-01-01T00:00:00Z");

    let decoded: Parcel = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, parcel);
}
