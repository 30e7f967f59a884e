use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{info, warn};
use ulid::Ulid;

use crate::catalog::ResourceCatalog;
use crate::directory::UserDirectory;
use crate::engine::conflict::{now, validate_title};
use crate::engine::{BookingError, ReservationStore, Result};
use crate::model::*;
use crate::observability::*;
use crate::time::{TimeInput, TimeNormalizer};

/// Rooms created by `seed_defaults`, matched by name so reseeding is a no-op.
const DEFAULT_ROOMS: &[(&str, i64)] = &[
    ("Boardroom", 10),
    ("Huddle", 4),
    ("Lecture Hall", 30),
    ("Studio", 8),
];

const DEFAULT_USERS: &[(&str, Role)] = &[
    ("admin", Role::Admin),
    ("alice", Role::User),
    ("bob", Role::User),
];

/// A booking request as it arrives from the outer layer.
#[derive(Debug, Clone)]
pub struct CreateReservation {
    pub resource_id: Ulid,
    pub start: TimeInput,
    pub end: TimeInput,
    pub title: String,
    /// Authenticated caller identity.
    pub owner: String,
}

/// Entry point for the outer layer: validates, normalizes, and delegates to the store.
pub struct ReservationService {
    store: Arc<ReservationStore>,
    users: UserDirectory,
    normalizer: TimeNormalizer,
}

impl ReservationService {
    /// A service over a fresh, empty catalog and store.
    pub fn new(normalizer: TimeNormalizer) -> Self {
        let catalog = Arc::new(ResourceCatalog::new());
        Self::with_store(Arc::new(ReservationStore::new(catalog)), normalizer)
    }

    pub fn with_store(store: Arc<ReservationStore>, normalizer: TimeNormalizer) -> Self {
        Self {
            store,
            users: UserDirectory::new(),
            normalizer,
        }
    }

    pub fn store(&self) -> &Arc<ReservationStore> {
        &self.store
    }

    pub fn catalog(&self) -> &Arc<ResourceCatalog> {
        self.store.catalog()
    }

    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    pub fn normalizer(&self) -> &TimeNormalizer {
        &self.normalizer
    }

    // ── Resources ────────────────────────────────────────────

    pub async fn list_resources(&self) -> Vec<Resource> {
        self.catalog().list().await
    }

    pub async fn add_resource(&self, name: &str, capacity: i64) -> Result<Resource> {
        let started = Instant::now();
        let result = self.catalog().add(name, capacity).await;
        if let Ok(ref r) = result {
            info!(id = %r.id, name = %r.name, capacity = r.capacity, "resource added");
            self.update_resource_gauge().await;
        }
        record("add_resource", started, &result);
        result
    }

    /// Delete a resource and every reservation on it. Returns whether it existed.
    pub async fn delete_resource(&self, id: Ulid) -> bool {
        let started = Instant::now();
        let purged = self.store.retire_resource(id).await;
        if let Some(n) = purged {
            metrics::counter!(RESERVATIONS_PURGED_TOTAL).increment(n as u64);
            self.update_resource_gauge().await;
        }
        let result: Result<()> = purged.map(|_| ()).ok_or(BookingError::ResourceNotFound(id));
        record("delete_resource", started, &result);
        purged.is_some()
    }

    /// Add the sample rooms and users that are not already present.
    pub async fn seed_defaults(&self) -> Result<()> {
        for (login, role) in DEFAULT_USERS {
            self.users.add_or_get(login, *role)?;
        }
        for (name, capacity) in DEFAULT_ROOMS {
            if self.catalog().find_by_name(name).await.is_none() {
                self.add_resource(name, *capacity).await?;
            }
        }
        Ok(())
    }

    // ── Reservations ─────────────────────────────────────────

    pub async fn create_reservation(&self, req: CreateReservation) -> Result<Reservation> {
        let started = Instant::now();
        let result = self.create_inner(&req).await;
        match &result {
            Ok(_) => metrics::counter!(RESERVATIONS_CREATED_TOTAL).increment(1),
            Err(e) => warn!(resource_id = %req.resource_id, owner = %req.owner, "create refused: {e}"),
        }
        record("create_reservation", started, &result);
        result
    }

    async fn create_inner(&self, req: &CreateReservation) -> Result<Reservation> {
        validate_title(&req.title)?;
        let start = self.normalizer.normalize(req.start)?;
        let end = self.normalizer.normalize(req.end)?;
        self.store
            .try_create(req.resource_id, start, end, &req.title, &req.owner)
            .await
    }

    pub async fn cancel_reservation(&self, id: Ulid, owner: &str) -> Result<()> {
        let started = Instant::now();
        let result = self.store.try_cancel(id, owner).await.map(|_| ());
        match &result {
            Ok(()) => metrics::counter!(RESERVATIONS_CANCELLED_TOTAL).increment(1),
            Err(e) => warn!(%id, %owner, "cancel refused: {e}"),
        }
        record("cancel_reservation", started, &result);
        result
    }

    pub async fn reservations_overlapping(&self, resource_id: Ulid, window: Span) -> Vec<Reservation> {
        self.store.reservations_overlapping(resource_id, window).await
    }

    /// All rooms plus every reservation touching the given local day.
    pub async fn day_schedule(&self, date: NaiveDate) -> Result<DaySchedule> {
        let window = self.normalizer.day_bounds(date)?;
        let resources = self.list_resources().await;
        let reservations = self
            .store
            .reservations_in(window)
            .await
            .into_iter()
            .map(|r| self.localize(r))
            .collect();
        Ok(DaySchedule {
            date,
            resources,
            reservations,
        })
    }

    /// The caller's reservations that have not started yet.
    pub async fn upcoming_for(&self, owner: &str) -> Vec<Reservation> {
        self.store.upcoming_for(owner, now()).await
    }

    pub fn localize(&self, r: Reservation) -> LocalReservation {
        LocalReservation {
            id: r.id,
            resource_id: r.resource_id,
            start_local: self.normalizer.to_local(r.start),
            end_local: self.normalizer.to_local(r.end),
            title: r.title,
            owner: r.owner,
        }
    }

    async fn update_resource_gauge(&self) {
        let n = self.catalog().list().await.len();
        metrics::gauge!(RESOURCES_ACTIVE).set(n as f64);
    }
}

fn record<T>(command: &'static str, started: Instant, result: &Result<T>) {
    let status = match result {
        Ok(_) => "ok",
        Err(e) => {
            metrics::counter!(REJECTIONS_TOTAL, "reason" => e.code()).increment(1);
            "error"
        }
    };
    metrics::counter!(COMMANDS_TOTAL, "command" => command, "status" => status).increment(1);
    metrics::histogram!(COMMAND_DURATION_SECONDS, "command" => command)
        .record(started.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::DstPolicy;
    use chrono::NaiveDateTime;

    fn wall(s: &str) -> TimeInput {
        TimeInput::Local(NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap())
    }

    fn berlin() -> ReservationService {
        ReservationService::new(TimeNormalizer::new(chrono_tz::Europe::Berlin, DstPolicy::Earliest))
    }

    fn request(resource_id: Ulid, start: &str, end: &str, title: &str, owner: &str) -> CreateReservation {
        CreateReservation {
            resource_id,
            start: wall(start),
            end: wall(end),
            title: title.into(),
            owner: owner.into(),
        }
    }

    #[tokio::test]
    async fn create_normalizes_local_wall_clock() {
        let svc = berlin();
        let room = svc.add_resource("Boardroom", 10).await.unwrap();
        let r = svc
            .create_reservation(request(room.id, "2026-07-01 09:00", "2026-07-01 09:30", " Standup ", "alice"))
            .await
            .unwrap();
        assert_eq!(r.title, "Standup");
        assert_eq!(r.start.to_rfc3339(), "2026-07-01T07:00:00+00:00");

        let local = svc.localize(r);
        assert_eq!(local.start_local.to_string(), "2026-07-01 09:00:00");
    }

    #[tokio::test]
    async fn absolute_and_local_inputs_conflict_with_each_other() {
        let svc = berlin();
        let room = svc.add_resource("Huddle", 4).await.unwrap();
        svc.create_reservation(request(room.id, "2026-07-01 09:00", "2026-07-01 10:00", "A", "alice"))
            .await
            .unwrap();

        // Same slot, expressed in UTC.
        let req = CreateReservation {
            resource_id: room.id,
            start: "2026-07-01T07:30:00Z".parse().unwrap(),
            end: "2026-07-01T08:30:00Z".parse().unwrap(),
            title: "B".into(),
            owner: "bob".into(),
        };
        let result = svc.create_reservation(req).await;
        assert!(matches!(result, Err(BookingError::Conflict(_))));
    }

    #[tokio::test]
    async fn blank_title_reported_before_bad_times() {
        let svc = berlin();
        let req = CreateReservation {
            resource_id: Ulid::new(),
            start: wall("2026-07-01 10:00"),
            end: wall("2026-07-01 09:00"),
            title: "  ".into(),
            owner: "alice".into(),
        };
        assert_eq!(svc.create_reservation(req).await, Err(BookingError::InvalidTitle));
    }

    #[tokio::test]
    async fn day_schedule_lists_rooms_and_local_bookings() {
        let svc = berlin();
        let room = svc.add_resource("Studio", 8).await.unwrap();
        let other = svc.add_resource("Huddle", 4).await.unwrap();
        svc.create_reservation(request(room.id, "2026-07-01 23:30", "2026-07-02 00:30", "Late", "alice"))
            .await
            .unwrap();
        svc.create_reservation(request(other.id, "2026-07-02 09:00", "2026-07-02 10:00", "Next", "bob"))
            .await
            .unwrap();
        svc.create_reservation(request(room.id, "2026-07-03 09:00", "2026-07-03 10:00", "Later", "bob"))
            .await
            .unwrap();

        let day = NaiveDate::from_ymd_opt(2026, 7, 2).unwrap();
        let schedule = svc.day_schedule(day).await.unwrap();
        assert_eq!(schedule.resources.len(), 2);
        let titles: Vec<_> = schedule.reservations.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Late", "Next"]);
        assert_eq!(schedule.reservations[1].start_local.to_string(), "2026-07-02 09:00:00");
    }

    #[tokio::test]
    async fn delete_resource_cascades() {
        let svc = berlin();
        let room = svc.add_resource("Boardroom", 10).await.unwrap();
        let r = svc
            .create_reservation(request(room.id, "2026-07-01 09:00", "2026-07-01 10:00", "A", "alice"))
            .await
            .unwrap();

        assert!(svc.delete_resource(room.id).await);
        assert!(!svc.delete_resource(room.id).await);
        assert!(svc.store().get(r.id).await.is_none());
        assert_eq!(
            svc.cancel_reservation(r.id, "alice").await,
            Err(BookingError::NotFound(r.id))
        );
        let again = svc
            .create_reservation(request(room.id, "2026-07-01 09:00", "2026-07-01 10:00", "A", "alice"))
            .await;
        assert_eq!(again, Err(BookingError::ResourceNotFound(room.id)));
    }

    #[tokio::test]
    async fn seed_defaults_is_idempotent() {
        let svc = berlin();
        svc.seed_defaults().await.unwrap();
        svc.seed_defaults().await.unwrap();
        let names: Vec<_> = svc.list_resources().await.into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Boardroom", "Huddle", "Lecture Hall", "Studio"]);
        assert_eq!(svc.users().list().len(), 3);
        assert_eq!(svc.users().find("admin").map(|u| u.role), Some(Role::Admin));
    }
}
