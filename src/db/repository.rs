use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::course::format_timestamp;
use crate::models::{Course, CourseRow, NewCourseRequest, UpdateCourseRequest};

fn into_courses(rows: Vec<CourseRow>) -> Result<Vec<Course>, AppError> {
    rows.into_iter().map(Course::try_from).collect()
}

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, AppError> {
    let rows = sqlx::query_as::<_, CourseRow>(
        r#"
        SELECT id, title, instructor, description, course_type, duration,
            start_date, end_date, registration_deadline,
            is_registration_closed, is_ended, created_at, updated_at
        FROM courses
        ORDER BY start_date IS NULL, start_date ASC, created_at ASC
        "#,
    )
    .fetch_all(db)
    .await?;

    into_courses(rows)
}

/// Courses whose span `[start_date, end_date]` touches the window `[from, to)`.
/// Courses without a start date never appear on a calendar and are left out.
pub async fn fetch_courses_overlapping(
    db: &SqlitePool,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<Course>, AppError> {
    let rows = sqlx::query_as::<_, CourseRow>(
        r#"
        SELECT id, title, instructor, description, course_type, duration,
            start_date, end_date, registration_deadline,
            is_registration_closed, is_ended, created_at, updated_at
        FROM courses
        WHERE start_date IS NOT NULL
            AND start_date < ?1
            AND max(start_date, coalesce(end_date, start_date)) >= ?2
        ORDER BY start_date ASC, created_at ASC
        "#,
    )
    .bind(format_timestamp(to))
    .bind(format_timestamp(from))
    .fetch_all(db)
    .await?;

    into_courses(rows)
}

pub async fn find_course_by_id(db: &SqlitePool, id: &str) -> Result<Option<Course>, AppError> {
    sqlx::query_as::<_, CourseRow>(
        r#"
        SELECT id, title, instructor, description, course_type, duration,
            start_date, end_date, registration_deadline,
            is_registration_closed, is_ended, created_at, updated_at
        FROM courses
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?
    .map(Course::try_from)
    .transpose()
}

pub async fn insert_course(db: &SqlitePool, req: NewCourseRequest) -> Result<Course, AppError> {
    let now = Utc::now();
    let course = Course {
        id: Uuid::new_v4().to_string(),
        title: req.title.trim().to_string(),
        instructor: req.instructor,
        description: req.description,
        course_type: req.course_type,
        duration: req.duration,
        start_date: req.start_date,
        end_date: req.end_date,
        registration_deadline: req.registration_deadline,
        is_registration_closed: req.is_registration_closed,
        is_ended: req.is_ended,
        created_at: now,
        updated_at: now,
    };
    course.validate()?;

    sqlx::query(
        r#"
        INSERT INTO courses
            (id, title, instructor, description, course_type, duration,
            start_date, end_date, registration_deadline,
            is_registration_closed, is_ended, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&course.id)
    .bind(&course.title)
    .bind(&course.instructor)
    .bind(&course.description)
    .bind(course.course_type.as_str())
    .bind(&course.duration)
    .bind(course.start_date.map(format_timestamp))
    .bind(course.end_date.map(format_timestamp))
    .bind(course.registration_deadline.map(format_timestamp))
    .bind(course.is_registration_closed)
    .bind(course.is_ended)
    .bind(format_timestamp(course.created_at))
    .bind(format_timestamp(course.updated_at))
    .execute(db)
    .await?;

    find_course_by_id(db, &course.id)
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))
}

pub async fn update_course(
    db: &SqlitePool,
    id: &str,
    req: UpdateCourseRequest,
) -> Result<Option<Course>, AppError> {
    let mut current = match find_course_by_id(db, id).await? {
        Some(c) => c,
        None => return Ok(None),
    };

    if let Some(title) = req.title {
        current.title = title.trim().to_string();
    }
    if let Some(instructor) = req.instructor {
        current.instructor = instructor;
    }
    if let Some(description) = req.description {
        current.description = description;
    }
    if let Some(course_type) = req.course_type {
        current.course_type = course_type;
    }
    if let Some(duration) = req.duration {
        current.duration = duration;
    }
    if let Some(start_date) = req.start_date {
        current.start_date = start_date;
    }
    if let Some(end_date) = req.end_date {
        current.end_date = end_date;
    }
    if let Some(deadline) = req.registration_deadline {
        current.registration_deadline = deadline;
    }
    if let Some(closed) = req.is_registration_closed {
        current.is_registration_closed = closed;
    }
    if let Some(ended) = req.is_ended {
        current.is_ended = ended;
    }
    current.validate()?;
    current.updated_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE courses
        SET title = ?1,
            instructor = ?2,
            description = ?3,
            course_type = ?4,
            duration = ?5,
            start_date = ?6,
            end_date = ?7,
            registration_deadline = ?8,
            is_registration_closed = ?9,
            is_ended = ?10,
            updated_at = ?11
        WHERE id = ?12
        "#,
    )
    .bind(&current.title)
    .bind(&current.instructor)
    .bind(&current.description)
    .bind(current.course_type.as_str())
    .bind(&current.duration)
    .bind(current.start_date.map(format_timestamp))
    .bind(current.end_date.map(format_timestamp))
    .bind(current.registration_deadline.map(format_timestamp))
    .bind(current.is_registration_closed)
    .bind(current.is_ended)
    .bind(format_timestamp(current.updated_at))
    .bind(id)
    .execute(db)
    .await?;

    find_course_by_id(db, id).await
}

pub async fn delete_course(db: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
