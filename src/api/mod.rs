use axum::Json;
use axum::extract::Path;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use tracing::{debug, info};

use crate::calendar::{CourseView, MonthGrid, month_window};
use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course).patch(update_course).delete(delete_course),
        )
        .route("/calendar/{year}/{month}", get(month_calendar))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<CourseView>>, AppError> {
    let now = state.clock.now();
    let courses = repository::fetch_courses(&state.db).await?;
    Ok(Json(
        courses
            .into_iter()
            .map(|course| CourseView::new(course, now))
            .collect(),
    ))
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<NewCourseRequest>,
) -> Result<(StatusCode, Json<CourseView>), AppError> {
    let course = repository::insert_course(&state.db, req).await?;
    info!("created {} course {} ({})", course.course_type, course.id, course.title);
    Ok((
        StatusCode::CREATED,
        Json(CourseView::new(course, state.clock.now())),
    ))
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CourseView>, AppError> {
    let course = repository::find_course_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(CourseView::new(course, state.clock.now())))
}

async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<CourseView>, AppError> {
    let course = repository::update_course(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    info!("updated course {}", course.id);
    Ok(Json(CourseView::new(course, state.clock.now())))
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let ok = repository::delete_course(&state.db, &id).await?;
    if ok {
        info!("deleted course {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn month_calendar(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<MonthGrid>, AppError> {
    let (from, to) = month_window(year, month, &state.calendar)?;
    let courses = repository::fetch_courses_overlapping(&state.db, from, to).await?;
    debug!("{} courses overlap {}-{:02}", courses.len(), year, month);

    let grid = MonthGrid::build(year, month, &courses, state.clock.now(), &state.calendar)?;
    Ok(Json(grid))
}
