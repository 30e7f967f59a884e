//! # roombook
//!
//! In-memory room reservation engine. Resources live in a [`catalog::ResourceCatalog`],
//! bookings in a [`engine::ReservationStore`] that serializes check-and-commit per room,
//! and [`service::ReservationService`] ties them together with a
//! [`time::TimeNormalizer`] so every comparison is instant-vs-instant.

pub mod catalog;
pub mod config;
pub mod console;
pub mod directory;
pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;
pub mod service;
pub mod time;

pub use engine::{BookingError, ReservationStore};
pub use service::{CreateReservation, ReservationService};
pub use time::{DstPolicy, TimeInput, TimeNormalizer};
