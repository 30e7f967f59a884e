use ulid::Ulid;

use crate::model::*;

use super::ReservationStore;

impl ReservationStore {
    /// Live reservations on one resource overlapping `window`, ordered by start.
    pub async fn reservations_overlapping(&self, resource_id: Ulid, window: Span) -> Vec<Reservation> {
        let rs = match self.domain(&resource_id) {
            Some(rs) => rs,
            None => return vec![],
        };
        let guard = rs.read().await;
        guard.overlapping(&window).cloned().collect()
    }

    /// Live reservations on every resource overlapping `window`, ordered by start.
    pub async fn reservations_in(&self, window: Span) -> Vec<Reservation> {
        let mut out = Vec::new();
        for rs in self.all_domains() {
            let guard = rs.read().await;
            out.extend(guard.overlapping(&window).cloned());
        }
        out.sort_by(|a, b| a.start.cmp(&b.start).then(a.resource_id.cmp(&b.resource_id)));
        out
    }

    /// Reservations created by `owner` that start at or after `now`, soonest first.
    pub async fn upcoming_for(&self, owner: &str, now: Timestamp) -> Vec<Reservation> {
        let mut out = Vec::new();
        for rs in self.all_domains() {
            let guard = rs.read().await;
            let first = guard.reservations.partition_point(|r| r.start < now);
            out.extend(
                guard.reservations[first..]
                    .iter()
                    .filter(|r| r.owner == owner)
                    .cloned(),
            );
        }
        out.sort_by_key(|r| r.start);
        out
    }

    pub async fn get(&self, reservation_id: Ulid) -> Option<Reservation> {
        let resource_id = self.get_resource_for_reservation(&reservation_id)?;
        let rs = self.domain(&resource_id)?;
        let guard = rs.read().await;
        guard.get(reservation_id).cloned()
    }
}
