//! Parcel domain model.
//!
//! # Responsibility
//! - Define the canonical shipment record stored in the `parcel` table.
//! - Own the lifecycle status set and the registered-only mutation guard.
//!
//! # Invariants
//! - `number` is assigned by storage and never reused for another parcel.
//! - `client` and `created_at` never change after creation.
//! - `address` may change and the record may be removed only while
//!   `status == ParcelStatus::Registered`.
//!
//! # See also
//! - `repo::parcel_repo` for the SQL side of the guard.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Storage-assigned parcel identifier.
///
/// `0` marks a parcel that has not been persisted yet.
pub type ParcelNumber = i64;

/// External identifier of the client owning a parcel.
pub type ClientId = i64;

/// Shipment lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParcelStatus {
    /// Accepted but not yet handed to the carrier.
    Registered,
    /// In transit.
    Sent,
    /// Handed to the recipient.
    Delivered,
}

impl ParcelStatus {
    /// The only status in which address changes and deletion are allowed.
    pub const MUTABLE: ParcelStatus = ParcelStatus::Registered;

    /// Returns the persisted text form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
        }
    }

    /// Parses the persisted text form. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "registered" => Some(Self::Registered),
            "sent" => Some(Self::Sent),
            "delivered" => Some(Self::Delivered),
            _ => None,
        }
    }

    /// Returns the forward successor, or `None` once delivered.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Registered => Some(Self::Sent),
            Self::Sent => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }

    /// Whether a parcel in this status may have its address changed or be
    /// deleted.
    pub fn allows_mutation(self) -> bool {
        self == Self::MUTABLE
    }
}

impl std::fmt::Display for ParcelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical shipment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    /// Primary key. Ignored on insert.
    pub number: ParcelNumber,
    pub client: ClientId,
    pub status: ParcelStatus,
    /// Free-form destination text.
    pub address: String,
    /// RFC3339 UTC timestamp, e.g. `2024-01-01T00:00:00Z`.
    pub created_at: String,
}

impl Parcel {
    /// Creates an unsaved `registered` parcel stamped with the current UTC
    /// time.
    pub fn new(client: ClientId, address: impl Into<String>) -> Self {
        Self {
            number: 0,
            client,
            status: ParcelStatus::Registered,
            address: address.into(),
            created_at: now_rfc3339(),
        }
    }

    /// Returns whether this parcel has been assigned a storage number.
    pub fn is_persisted(&self) -> bool {
        self.number > 0
    }
}

/// Current UTC time in RFC3339 with second precision and `Z` suffix.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::{now_rfc3339, ParcelStatus};

    #[test]
    fn status_text_roundtrip_covers_all_variants() {
        for status in [
            ParcelStatus::Registered,
            ParcelStatus::Sent,
            ParcelStatus::Delivered,
        ] {
            assert_eq!(ParcelStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ParcelStatus::parse("Registered"), None);
        assert_eq!(ParcelStatus::parse(""), None);
    }

    #[test]
    fn only_registered_allows_mutation() {
        assert!(ParcelStatus::Registered.allows_mutation());
        assert!(!ParcelStatus::Sent.allows_mutation());
        assert!(!ParcelStatus::Delivered.allows_mutation());
    }

    #[test]
    fn now_rfc3339_is_utc_with_z_suffix() {
        let stamp = now_rfc3339();
        assert!(stamp.ends_with('Z'), "unexpected timestamp {stamp}");
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
    }
}
