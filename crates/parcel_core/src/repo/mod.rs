//! Repository layer for parcel persistence.
//!
//! # Responsibility
//! - Define the data-access contract consumed by services.
//! - Keep SQLite query details out of service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`,
//!   `PreconditionFailed`) in addition to DB transport errors.

pub mod parcel_repo;
