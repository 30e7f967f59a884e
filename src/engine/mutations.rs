use std::sync::Arc;

use tracing::{debug, info};
use ulid::Ulid;

use crate::model::*;

use super::conflict::{check_no_conflict, now, validate_range, validate_title};
use super::{BookingError, ReservationStore, Result, SharedResourceState};

impl ReservationStore {
    /// Check-and-commit a reservation.
    ///
    /// Validation runs in a fixed order (title, range, duration, resource, overlap) and
    /// the existence check, overlap scan and insert all happen under the resource's
    /// write lock. Either the reservation is stored and returned, or nothing changes.
    pub async fn try_create(
        &self,
        resource_id: Ulid,
        start: Timestamp,
        end: Timestamp,
        title: &str,
        owner: &str,
    ) -> Result<Reservation> {
        let title = validate_title(title)?;
        let span = validate_range(start, end)?;
        // Cheap rejection before a domain is allocated for an id nobody ever created.
        if !self.catalog().exists(resource_id).await {
            return Err(BookingError::ResourceNotFound(resource_id));
        }

        let rs = self.domain_or_insert(resource_id);
        let mut guard = rs.write().await;

        // A delete may have won the lock first.
        if !self.catalog().exists(resource_id).await {
            drop(guard);
            self.forget_domain(resource_id, &rs);
            return Err(BookingError::ResourceNotFound(resource_id));
        }

        if let Err(e) = check_no_conflict(&guard, &span) {
            debug!(%resource_id, %owner, "booking refused: {e}");
            return Err(e);
        }

        let reservation = Reservation {
            id: Ulid::new(),
            resource_id,
            title,
            start: span.start,
            end: span.end,
            owner: owner.to_string(),
            created_at: now(),
        };
        guard.insert(reservation.clone());
        self.reservation_to_resource
            .insert(reservation.id, resource_id);
        info!(
            id = %reservation.id,
            %resource_id,
            %owner,
            start = %reservation.start,
            end = %reservation.end,
            "reservation committed"
        );
        Ok(reservation)
    }

    /// Remove a reservation on behalf of `owner`. Only the creator may cancel.
    pub async fn try_cancel(&self, reservation_id: Ulid, owner: &str) -> Result<Reservation> {
        let (resource_id, mut guard) = self.resolve_reservation_write(&reservation_id).await?;
        // The lookup and the lock are not atomic; re-read under the lock.
        let existing = guard
            .get(reservation_id)
            .ok_or(BookingError::NotFound(reservation_id))?;
        if existing.owner != owner {
            return Err(BookingError::NotOwner(reservation_id));
        }

        let removed = guard
            .remove(reservation_id)
            .ok_or(BookingError::NotFound(reservation_id))?;
        self.reservation_to_resource.remove(&reservation_id);
        info!(id = %reservation_id, %resource_id, %owner, "reservation cancelled");
        Ok(removed)
    }

    /// Delete a resource from the catalog and purge every reservation on it.
    ///
    /// Runs under the resource's write lock, so it is ordered against any in-flight
    /// `try_create`: a create that loses the race sees the resource gone and fails with
    /// `ResourceNotFound`. Returns the number of reservations purged, or `None` if the
    /// resource did not exist.
    pub async fn retire_resource(&self, resource_id: Ulid) -> Option<usize> {
        let rs = self.domain_or_insert(resource_id);
        let mut guard = rs.write().await;

        let existed = self.catalog().delete(resource_id).await;
        let purged: Vec<Reservation> = guard.reservations.drain(..).collect();
        for r in &purged {
            self.reservation_to_resource.remove(&r.id);
        }
        drop(guard);
        self.forget_domain(resource_id, &rs);

        if existed {
            info!(%resource_id, purged = purged.len(), "resource deleted");
            Some(purged.len())
        } else {
            None
        }
    }

    /// Drop a domain from the map, unless someone already replaced it.
    fn forget_domain(&self, resource_id: Ulid, rs: &SharedResourceState) {
        self.domains
            .remove_if(&resource_id, |_, current| Arc::ptr_eq(current, rs));
    }
}
