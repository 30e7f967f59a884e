pub(crate) mod conflict;
mod error;
mod mutations;
mod queries;

pub use error::{BookingError, Result};

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;
use ulid::Ulid;

use crate::catalog::ResourceCatalog;
use crate::model::*;

/// One resource's exclusion domain: its reservations behind its own lock.
pub type SharedResourceState = Arc<RwLock<ResourceState>>;

/// Owner of every live reservation, and the only place a booking decision is made.
///
/// Each resource gets its own `RwLock`; a create on one room never waits for a
/// create on another. The map of domains is itself concurrent, and inserting a
/// domain for a never-seen resource goes through `DashMap::entry`, so two first
/// bookings of the same room always end up sharing one lock.
pub struct ReservationStore {
    catalog: Arc<ResourceCatalog>,
    pub(super) domains: DashMap<Ulid, SharedResourceState>,
    /// Reverse lookup: reservation id → resource id
    pub(super) reservation_to_resource: DashMap<Ulid, Ulid>,
}

impl ReservationStore {
    pub fn new(catalog: Arc<ResourceCatalog>) -> Self {
        Self {
            catalog,
            domains: DashMap::new(),
            reservation_to_resource: DashMap::new(),
        }
    }

    pub fn catalog(&self) -> &Arc<ResourceCatalog> {
        &self.catalog
    }

    /// Existing domain for a resource, if any booking path has touched it.
    pub(super) fn domain(&self, resource_id: &Ulid) -> Option<SharedResourceState> {
        self.domains.get(resource_id).map(|e| e.value().clone())
    }

    /// Find-or-create the resource's domain. The shard lock taken by `entry` is held
    /// only for the lookup/insert, never across the booking check.
    pub(super) fn domain_or_insert(&self, resource_id: Ulid) -> SharedResourceState {
        self.domains
            .entry(resource_id)
            .or_insert_with(|| Arc::new(RwLock::new(ResourceState::new(resource_id))))
            .value()
            .clone()
    }

    /// Every domain, cloned out so no map shard is held across an `.await`.
    pub(super) fn all_domains(&self) -> Vec<SharedResourceState> {
        self.domains.iter().map(|e| e.value().clone()).collect()
    }

    pub fn get_resource_for_reservation(&self, reservation_id: &Ulid) -> Option<Ulid> {
        self.reservation_to_resource
            .get(reservation_id)
            .map(|e| *e.value())
    }

    /// Lookup reservation → resource, get domain, acquire write lock.
    pub(super) async fn resolve_reservation_write(
        &self,
        reservation_id: &Ulid,
    ) -> Result<(Ulid, tokio::sync::OwnedRwLockWriteGuard<ResourceState>)> {
        let resource_id = self
            .get_resource_for_reservation(reservation_id)
            .ok_or(BookingError::NotFound(*reservation_id))?;
        let rs = self
            .domain(&resource_id)
            .ok_or(BookingError::NotFound(*reservation_id))?;
        let guard = rs.write_owned().await;
        Ok((resource_id, guard))
    }
}
