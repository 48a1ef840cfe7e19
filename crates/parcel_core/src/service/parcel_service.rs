//! Parcel use-case service.
//!
//! # Responsibility
//! - Provide the tracker use-cases (register, list, advance, re-address,
//!   delete) on top of any `ParcelRepository`.
//! - Emit one metadata-only log line per use-case.
//!
//! # Invariants
//! - Service APIs never bypass the repository's registered-only guard.
//! - Log lines never include address text.

use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use crate::repo::parcel_repo::{ParcelRepository, RepoResult};
use log::{info, warn};

/// Use-case service wrapper for parcel operations.
pub struct ParcelService<R: ParcelRepository> {
    repo: R,
}

impl<R: ParcelRepository> ParcelService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new parcel for `client` and returns it with its number.
    ///
    /// # Contract
    /// - Status starts as `registered`.
    /// - `created_at` is the current UTC time.
    pub fn register(&self, client: ClientId, address: impl Into<String>) -> RepoResult<Parcel> {
        let mut parcel = Parcel::new(client, address);
        let result = self.repo.add_parcel(&parcel);
        log_outcome("parcel_register", result.as_ref().ok().copied(), &result);
        parcel.number = result?;
        Ok(parcel)
    }

    /// Loads one parcel by number.
    pub fn get(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        self.repo.get_parcel(number)
    }

    /// Lists every parcel owned by `client`, in storage order.
    pub fn client_parcels(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let result = self.repo.get_parcels_by_client(client);
        match &result {
            Ok(parcels) => info!(
                "event=parcel_list module=service status=ok client={client} count={}",
                parcels.len()
            ),
            Err(err) => warn!(
                "event=parcel_list module=service status=error client={client} error={err}"
            ),
        }
        result
    }

    /// Moves a parcel one step forward in its lifecycle.
    ///
    /// Returns the new status, or `None` when the parcel is already
    /// delivered (nothing is written in that case).
    pub fn next_status(&self, number: ParcelNumber) -> RepoResult<Option<ParcelStatus>> {
        let parcel = self.repo.get_parcel(number)?;
        let Some(next) = parcel.status.next() else {
            info!(
                "event=parcel_next_status module=service status=skipped number={number} current={}",
                parcel.status
            );
            return Ok(None);
        };

        let result = self.repo.set_status(number, next);
        log_outcome("parcel_next_status", Some(number), &result);
        result.map(|()| Some(next))
    }

    /// Overwrites the status without any ordering check.
    pub fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<()> {
        let result = self.repo.set_status(number, status);
        log_outcome("parcel_set_status", Some(number), &result);
        result
    }

    /// Changes the address of a registered parcel.
    pub fn change_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        let result = self.repo.set_address(number, address);
        log_outcome("parcel_change_address", Some(number), &result);
        result
    }

    /// Deletes a registered parcel; other parcels are left untouched.
    pub fn delete(&self, number: ParcelNumber) -> RepoResult<()> {
        let result = self.repo.delete_parcel(number);
        log_outcome("parcel_delete", Some(number), &result);
        result
    }
}

fn log_outcome<T>(event: &str, number: Option<ParcelNumber>, result: &RepoResult<T>) {
    let number = number.map_or_else(|| "-".to_string(), |value| value.to_string());
    match result {
        Ok(_) => info!("event={event} module=service status=ok number={number}"),
        Err(err) => warn!("event={event} module=service status=error number={number} error={err}"),
    }
}
