use chronoslot::calendar::client::CalendarService;
use chronoslot::calendar::google::{GoogleCalendarService, OAuthConfig};
use chronoslot::models::{EventOwnership, TaskEvent};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use httpmock::prelude::*;
use serde_json::json;

fn dt(h: u32) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(0).unwrap();
    offset
        .from_local_datetime(
            &NaiveDate::from_ymd_opt(2026, 1, 5)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap(),
        )
        .single()
        .unwrap()
}

fn service(server: &MockServer) -> GoogleCalendarService {
    GoogleCalendarService::new(
        "primary",
        vec!["chronoslot".to_string()],
        "Europe/Madrid",
        OAuthConfig {
            client_id: "unused".into(),
            client_secret: "unused".into(),
            keyring_service: "unused".into(),
            keyring_user: "unused".into(),
        },
    )
    .with_base_url(server.base_url())
    .with_static_token("test-token")
}

#[tokio::test]
async fn list_events_distinguishes_owned_from_user_events() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/calendars/primary/events");
        then.status(200).json_body(json!({
            "items": [
                {
                    "id": "owned-1",
                    "summary": "Write report",
                    "start": {"dateTime": "2026-01-05T09:00:00+00:00"},
                    "end": {"dateTime": "2026-01-05T10:00:00+00:00"},
                    "extendedProperties": {"private": {"chronoslot_tag": "chronoslot"}}
                },
                {
                    "id": "user-1",
                    "summary": "Dentist",
                    "start": {"dateTime": "2026-01-05T12:00:00+00:00"},
                    "end": {"dateTime": "2026-01-05T13:00:00+00:00"}
                }
            ]
        }));
    });

    let client = service(&server);
    let events = client.list_events(dt(0), dt(23)).await.unwrap();
    mock.assert();

    assert_eq!(events.len(), 2);
    let owned = events.iter().find(|e| e.id == "owned-1").unwrap();
    assert_eq!(owned.ownership, EventOwnership::Owned);
    let user = events.iter().find(|e| e.id == "user-1").unwrap();
    assert_eq!(user.ownership, EventOwnership::User);
}

#[tokio::test]
async fn insert_then_delete_round_trips() {
    let server = MockServer::start();
    let insert_mock = server.mock(|when, then| {
        when.method(POST).path("/calendars/primary/events");
        then.status(200).json_body(json!({
            "id": "new-event-1",
            "summary": "Draft report",
            "start": {"dateTime": "2026-01-05T09:00:00+00:00"},
            "end": {"dateTime": "2026-01-05T10:00:00+00:00"}
        }));
    });
    let delete_mock = server.mock(|when, then| {
        when.method(DELETE).path("/calendars/primary/events/new-event-1");
        then.status(204);
    });

    let client = service(&server);
    let event = TaskEvent {
        task_id: "t1".into(),
        task_name: "Draft report".into(),
        estimated_minutes: 60,
        start: dt(9),
        end: dt(10),
    };

    let event_id = client.insert_event(&event, "chronoslot").await.unwrap();
    assert_eq!(event_id, "new-event-1");
    insert_mock.assert();

    client.delete_event(&event_id).await.unwrap();
    delete_mock.assert();
}

#[tokio::test]
async fn whole_date_events_span_midnight_to_midnight() {
    // spec.md §6: "whole-date events are treated as [00:00, 24:00) of that date".
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/calendars/primary/events");
        then.status(200).json_body(json!({
            "items": [
                {
                    "id": "holiday-1",
                    "summary": "Public holiday",
                    "start": {"date": "2026-01-05"},
                    "end": {"date": "2026-01-06"}
                }
            ]
        }));
    });

    let client = service(&server);
    let events = client.list_events(dt(0), dt(23)).await.unwrap();
    assert_eq!(events.len(), 1);
    let span = (events[0].end - events[0].start).num_hours();
    assert_eq!(span, 24);
}
