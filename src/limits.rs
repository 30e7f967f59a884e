use chrono::TimeDelta;

/// Shortest bookable slot.
pub const MIN_RESERVATION: TimeDelta = TimeDelta::minutes(15);
/// Longest bookable slot.
pub const MAX_RESERVATION: TimeDelta = TimeDelta::hours(3);

/// Max reservation title length, in characters.
pub const MAX_TITLE_LEN: usize = 200;
/// Max resource display name length, in characters.
pub const MAX_NAME_LEN: usize = 100;
/// Max length of a login / owner identity.
pub const MAX_LOGIN_LEN: usize = 64;
