use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use chrono::{DateTime, FixedOffset, TimeZone, Utc, Weekday};
use course_calendar::{
    api::router,
    clock::FixedClock,
    config::CalendarConfig,
    db,
    state::AppState,
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap()
}

async fn app_with(calendar: CalendarConfig) -> Router {
    let pool = db::in_memory().await.expect("Failed to create database");
    router(AppState {
        db: pool,
        clock: Arc::new(FixedClock(now())),
        calendar,
    })
}

async fn app() -> Router {
    app_with(CalendarConfig::default()).await
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .expect("request failed");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response is json")
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;
    let (status, _) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn create_then_fetch_course_with_status() {
    let app = app().await;

    let (status, created) = send(
        &app,
        "POST",
        "/courses",
        Some(json!({
            "title": "Leadership Essentials",
            "instructor": "Dr. Amal",
            "course_type": "online",
            "start_date": "2025-06-20T09:00:00Z",
            "registration_deadline": "2025-06-06T00:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "closing_soon");
    assert_eq!(created["deadline_urgency"], "soon");
    assert_eq!(created["course_type"], "online");

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/courses/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Leadership Essentials");
    assert_eq!(fetched["start_date"], "2025-06-20T09:00:00Z");

    let (status, list) = send(&app, "GET", "/courses", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn reversed_dates_are_rejected() {
    let app = app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/courses",
        Some(json!({
            "title": "Backwards",
            "start_date": "2025-06-10T09:00:00Z",
            "end_date": "2025-06-01T09:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("end_date"));
}

#[tokio::test]
async fn update_and_delete_course() {
    let app = app().await;
    let (_, created) = send(
        &app,
        "POST",
        "/courses",
        Some(json!({ "title": "Python 101", "start_date": "2025-06-20T09:00:00Z" })),
    )
    .await;
    assert_eq!(created["status"], "open");
    let uri = format!("/courses/{}", created["id"].as_str().unwrap());

    let (status, updated) = send(&app, "PATCH", &uri, Some(json!({ "is_ended": true }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "ended");

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not Found");
}

#[tokio::test]
async fn month_calendar_buckets_multi_day_courses() {
    let app = app().await;

    for course in [
        json!({ "title": "Spill", "start_date": "2025-05-30T09:00:00Z", "end_date": "2025-06-02T17:00:00Z" }),
        json!({ "title": "Workshop", "start_date": "2025-06-01T09:00:00Z", "end_date": "2025-06-03T17:00:00Z" }),
        json!({ "title": "Closed", "start_date": "2025-06-20T09:00:00Z", "is_registration_closed": true }),
        json!({ "title": "Undated" }),
    ] {
        let (status, _) = send(&app, "POST", "/courses", Some(course)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, grid) = send(&app, "GET", "/calendar/2025/6", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grid["year"], 2025);
    assert_eq!(grid["month"], 6);

    let weeks = grid["weeks"].as_array().unwrap();
    assert_eq!(weeks.len(), 5);
    let days: Vec<&Value> = weeks.iter().flat_map(|w| w.as_array().unwrap()).collect();
    assert_eq!(days[0]["date"], "2025-06-01");

    let titles_on = |date: &str| -> Vec<String> {
        days.iter()
            .find(|d| d["date"] == date)
            .unwrap()["courses"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["title"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(titles_on("2025-06-01"), vec!["Spill", "Workshop"]);
    assert_eq!(titles_on("2025-06-03"), vec!["Workshop"]);
    assert!(titles_on("2025-06-04").is_empty());

    let today = days.iter().find(|d| d["is_today"] == true).unwrap();
    assert_eq!(today["date"], "2025-06-02");
    assert_eq!(today["density"], "few");

    let stats = &grid["statistics"];
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["ongoing"], 2);
    assert_eq!(stats["closed"], 1);
}

#[tokio::test]
async fn month_calendar_uses_display_offset_for_day_keys() {
    let app = app_with(CalendarConfig {
        utc_offset: FixedOffset::east_opt(3 * 3600).unwrap(),
        week_start: Weekday::Sun,
    })
    .await;

    let (status, _) = send(
        &app,
        "POST",
        "/courses",
        Some(json!({ "title": "Late night", "start_date": "2025-06-09T22:30:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, grid) = send(&app, "GET", "/calendar/2025/6", None).await;
    let days: Vec<&Value> = grid["weeks"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|w| w.as_array().unwrap())
        .collect();
    let placed: Vec<&str> = days
        .iter()
        .filter(|d| !d["courses"].as_array().unwrap().is_empty())
        .map(|d| d["date"].as_str().unwrap())
        .collect();
    assert_eq!(placed, vec!["2025-06-10"]);
}

#[tokio::test]
async fn invalid_month_is_a_bad_request() {
    let app = app().await;
    let (status, _) = send(&app, "GET", "/calendar/2025/13", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn five_digit_year_is_rejected_and_table_stays_readable() {
    let app = app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/courses",
        Some(json!({ "title": "far", "start_date": "+10000-01-01T00:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("start_date"));

    let (status, list) = send(&app, "GET", "/courses", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn month_near_the_date_limits_is_a_bad_request() {
    let app = app().await;
    for uri in ["/calendar/-262143/1", "/calendar/262142/12", "/calendar/10000/1"] {
        let (status, _) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn invalid_patch_is_rejected_and_row_is_unchanged() {
    let app = app().await;
    let (_, created) = send(
        &app,
        "POST",
        "/courses",
        Some(json!({
            "title": "Data Analysis",
            "start_date": "2025-06-10T09:00:00Z",
            "end_date": "2025-06-12T17:00:00Z"
        })),
    )
    .await;
    let uri = format!("/courses/{}", created["id"].as_str().unwrap());

    let (status, _) = send(
        &app,
        "PATCH",
        &uri,
        Some(json!({ "end_date": "2025-06-01T09:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "PATCH", &uri, Some(json!({ "start_date": null }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, stored) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["start_date"], "2025-06-10T09:00:00Z");
    assert_eq!(stored["end_date"], "2025-06-12T17:00:00Z");
    assert_eq!(stored["updated_at"], created["updated_at"]);
}

#[tokio::test]
async fn clearing_a_passed_deadline_reopens_registration() {
    let app = app().await;
    let (_, created) = send(
        &app,
        "POST",
        "/courses",
        Some(json!({
            "title": "Negotiation Skills",
            "start_date": "2025-07-01T09:00:00Z",
            "registration_deadline": "2025-06-01T00:00:00Z"
        })),
    )
    .await;
    assert_eq!(created["status"], "closed");
    let uri = format!("/courses/{}", created["id"].as_str().unwrap());

    let (status, updated) = send(
        &app,
        "PATCH",
        &uri,
        Some(json!({ "registration_deadline": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["registration_deadline"], Value::Null);
    assert_eq!(updated["start_date"], "2025-07-01T09:00:00Z");
    assert_eq!(updated["status"], "open");
}
