//! Domain model for parcel tracking.
//!
//! # Responsibility
//! - Define the parcel record and its lifecycle status set.
//!
//! # Invariants
//! - The registered-only mutation rule is expressed once, by
//!   `ParcelStatus::allows_mutation`.

pub mod parcel;
