use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Absolute UTC instant. The only time type the engine stores or compares.
pub type Timestamp = DateTime<Utc>;

/// Half-open interval `[start, end)`. A span with `start >= end` is empty and
/// overlaps nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Span {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }
}

/// A bookable room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: Ulid,
    pub name: String,
    pub capacity: u32,
    pub created_at: Timestamp,
}

/// A committed booking of one resource for `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Ulid,
    pub resource_id: Ulid,
    pub title: String,
    pub start: Timestamp,
    pub end: Timestamp,
    /// Identity of the caller that created it; only this identity may cancel.
    pub owner: String,
    pub created_at: Timestamp,
}

impl Reservation {
    pub fn span(&self) -> Span {
        Span {
            start: self.start,
            end: self.end,
        }
    }
}

/// Everything booked on one resource, guarded as a unit by the resource's lock.
#[derive(Debug, Clone)]
pub struct ResourceState {
    pub id: Ulid,
    /// Live reservations, sorted by `start`.
    pub reservations: Vec<Reservation>,
}

impl ResourceState {
    pub fn new(id: Ulid) -> Self {
        Self {
            id,
            reservations: Vec::new(),
        }
    }

    /// Insert reservation maintaining sort order by start.
    pub fn insert(&mut self, reservation: Reservation) {
        let pos = self
            .reservations
            .partition_point(|r| r.start <= reservation.start);
        self.reservations.insert(pos, reservation);
    }

    /// Remove reservation by id.
    pub fn remove(&mut self, id: Ulid) -> Option<Reservation> {
        let pos = self.reservations.iter().position(|r| r.id == id)?;
        Some(self.reservations.remove(pos))
    }

    pub fn get(&self, id: Ulid) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.id == id)
    }

    /// Return only reservations whose span overlaps the query window.
    /// Uses binary search to skip reservations starting at or after `query.end`.
    pub fn overlapping(&self, query: &Span) -> impl Iterator<Item = &Reservation> {
        let right_bound = if query.is_empty() {
            0
        } else {
            self.reservations.partition_point(|r| r.start < query.end)
        };
        self.reservations[..right_bound]
            .iter()
            .filter(move |r| r.end > query.start)
    }
}

/// Coarse role of a known user. Only recorded here; enforcement belongs to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    pub role: Role,
}

// ── Query result types ───────────────────────────────────────────

/// A reservation re-expressed in the reference time zone's wall clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalReservation {
    pub id: Ulid,
    pub resource_id: Ulid,
    pub title: String,
    pub start_local: NaiveDateTime,
    pub end_local: NaiveDateTime,
    pub owner: String,
}

/// Everything a calendar day view needs: all rooms plus the day's bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub resources: Vec<Resource>,
    pub reservations: Vec<LocalReservation>,
}
