use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use ulid::Ulid;

use roombook::model::Span;
use roombook::{BookingError, CreateReservation, DstPolicy, ReservationService, TimeInput, TimeNormalizer};

// ── Test infrastructure ──────────────────────────────────────

fn service(tz: chrono_tz::Tz) -> Arc<ReservationService> {
    Arc::new(ReservationService::new(TimeNormalizer::new(tz, DstPolicy::Earliest)))
}

fn local(s: &str) -> TimeInput {
    TimeInput::Local(NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap())
}

fn req(resource_id: Ulid, start: &str, end: &str, title: &str, owner: &str) -> CreateReservation {
    CreateReservation {
        resource_id,
        start: local(start),
        end: local(end),
        title: title.into(),
        owner: owner.into(),
    }
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// ── Scenarios ────────────────────────────────────────────────

#[tokio::test]
async fn boardroom_standup_sync_review() {
    let svc = service(chrono_tz::Europe::Paris);
    let boardroom = svc.add_resource("Boardroom", 10).await.unwrap();

    let standup = svc
        .create_reservation(req(boardroom.id, "2026-05-04 09:00", "2026-05-04 09:30", "Standup", "alice"))
        .await;
    assert!(standup.is_ok());

    let sync = svc
        .create_reservation(req(boardroom.id, "2026-05-04 09:15", "2026-05-04 09:45", "Sync", "bob"))
        .await;
    assert!(matches!(sync, Err(BookingError::Conflict(_))));

    let review = svc
        .create_reservation(req(boardroom.id, "2026-05-04 09:30", "2026-05-04 10:00", "Review", "bob"))
        .await;
    assert!(review.is_ok());

    let schedule = svc.day_schedule(day("2026-05-04")).await.unwrap();
    let titles: Vec<_> = schedule.reservations.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Standup", "Review"]);
}

#[tokio::test]
async fn missing_resource_regardless_of_range() {
    let svc = service(chrono_tz::UTC);
    let ghost = Ulid::new();
    let result = svc
        .create_reservation(req(ghost, "2026-05-04 09:00", "2026-05-04 10:00", "Standup", "alice"))
        .await;
    assert_eq!(result, Err(BookingError::ResourceNotFound(ghost)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_identical_requests_single_winner() {
    let svc = service(chrono_tz::America::New_York);
    let room = svc.add_resource("Huddle", 4).await.unwrap();

    let a = {
        let svc = svc.clone();
        tokio::spawn(async move {
            svc.create_reservation(req(room.id, "2026-05-04 14:00", "2026-05-04 15:00", "Plan", "alice"))
                .await
        })
    };
    let b = {
        let svc = svc.clone();
        tokio::spawn(async move {
            svc.create_reservation(req(room.id, "2026-05-04 14:00", "2026-05-04 15:00", "Plan", "bob"))
                .await
        })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(BookingError::Conflict(_))))
        .count();
    assert_eq!(winners, 1);
    assert_eq!(conflicts, 1);
}

#[tokio::test]
async fn cancel_requires_creator() {
    let svc = service(chrono_tz::Europe::Berlin);
    let room = svc.add_resource("Studio", 8).await.unwrap();
    let r = svc
        .create_reservation(req(room.id, "2026-05-04 09:00", "2026-05-04 10:00", "Demo", "alice"))
        .await
        .unwrap();
    let window = Span::new(r.start, r.end);

    assert_eq!(
        svc.cancel_reservation(r.id, "bob").await,
        Err(BookingError::NotOwner(r.id))
    );
    assert_eq!(svc.reservations_overlapping(room.id, window).await.len(), 1);

    svc.cancel_reservation(r.id, "alice").await.unwrap();
    assert!(svc.reservations_overlapping(room.id, window).await.is_empty());
}

#[tokio::test]
async fn deleting_a_room_leaves_no_reservations_behind() {
    let svc = service(chrono_tz::UTC);
    let room = svc.add_resource("Boardroom", 10).await.unwrap();
    let r = svc
        .create_reservation(req(room.id, "2026-05-04 09:00", "2026-05-04 10:00", "Standup", "alice"))
        .await
        .unwrap();

    assert!(svc.delete_resource(room.id).await);

    let schedule = svc.day_schedule(day("2026-05-04")).await.unwrap();
    assert!(schedule.resources.is_empty());
    assert!(schedule.reservations.is_empty());
    assert!(svc.store().get(r.id).await.is_none());
    assert!(svc.upcoming_for("alice").await.is_empty());
    assert_eq!(
        svc.cancel_reservation(r.id, "alice").await,
        Err(BookingError::NotFound(r.id))
    );
}

#[tokio::test]
async fn wall_clock_across_fall_back() {
    // 2026-11-01: New York repeats 01:00 to 02:00. 00:30 → 01:30 resolves 01:30 to EDT
    // (earliest), making it a one-hour booking; 01:30 → 02:30 is then 2h of real time.
    let svc = service(chrono_tz::America::New_York);
    let room = svc.add_resource("Boardroom", 10).await.unwrap();

    let first = svc
        .create_reservation(req(room.id, "2026-11-01 00:30", "2026-11-01 01:30", "Early", "alice"))
        .await
        .unwrap();
    assert_eq!(first.end - first.start, chrono::TimeDelta::hours(1));

    let second = svc
        .create_reservation(req(room.id, "2026-11-01 01:30", "2026-11-01 02:30", "Late", "bob"))
        .await
        .unwrap();
    assert_eq!(second.start, first.end);
    assert_eq!(second.end - second.start, chrono::TimeDelta::hours(2));
}

#[tokio::test]
async fn rejected_dst_time_surfaces_invalid_time() {
    let svc = Arc::new(ReservationService::new(TimeNormalizer::new(
        chrono_tz::America::New_York,
        DstPolicy::Reject,
    )));
    let room = svc.add_resource("Boardroom", 10).await.unwrap();
    let result = svc
        .create_reservation(req(room.id, "2026-03-08 02:30", "2026-03-08 03:30", "Gap", "alice"))
        .await;
    assert!(matches!(result, Err(BookingError::InvalidTime(_))));
}

#[tokio::test]
async fn upcoming_only_lists_own_future_bookings() {
    let svc = service(chrono_tz::UTC);
    let room = svc.add_resource("Huddle", 4).await.unwrap();
    svc.create_reservation(req(room.id, "2099-01-02 09:00", "2099-01-02 10:00", "Future", "alice"))
        .await
        .unwrap();
    svc.create_reservation(req(room.id, "2099-01-01 09:00", "2099-01-01 10:00", "Sooner", "alice"))
        .await
        .unwrap();
    svc.create_reservation(req(room.id, "2000-01-01 09:00", "2000-01-01 10:00", "Past", "alice"))
        .await
        .unwrap();
    svc.create_reservation(req(room.id, "2099-01-03 09:00", "2099-01-03 10:00", "Other", "bob"))
        .await
        .unwrap();

    let titles: Vec<_> = svc
        .upcoming_for("alice")
        .await
        .into_iter()
        .map(|r| r.title)
        .collect();
    assert_eq!(titles, vec!["Sooner", "Future"]);
}
