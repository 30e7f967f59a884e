use thiserror::Error;
use ulid::Ulid;

/// Every way a catalog, normalizer or booking operation can be refused.
///
/// All variants are ordinary business outcomes meant to be shown to the caller as a
/// single line; none of them indicate a broken process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("title is required and must be at most {max} characters", max = crate::limits::MAX_TITLE_LEN)]
    InvalidTitle,
    #[error("start must be before end")]
    InvalidRange,
    #[error("booking must last between 15 minutes and 3 hours")]
    InvalidDuration,
    #[error("invalid time: {0}")]
    InvalidTime(String),
    #[error("resource not found: {0}")]
    ResourceNotFound(Ulid),
    #[error("time slot overlaps with existing reservation: {0}")]
    Conflict(Ulid),
    #[error("reservation not found: {0}")]
    NotFound(Ulid),
    #[error("reservation {0} belongs to another user")]
    NotOwner(Ulid),
}

impl BookingError {
    /// Stable machine-readable code, also used as the metrics label.
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::InvalidArgument(_) => "invalid_argument",
            BookingError::InvalidTitle => "invalid_title",
            BookingError::InvalidRange => "invalid_range",
            BookingError::InvalidDuration => "invalid_duration",
            BookingError::InvalidTime(_) => "invalid_time",
            BookingError::ResourceNotFound(_) => "resource_not_found",
            BookingError::Conflict(_) => "conflict",
            BookingError::NotFound(_) => "not_found",
            BookingError::NotOwner(_) => "not_owner",
        }
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;
