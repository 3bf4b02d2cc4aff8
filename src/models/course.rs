use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CourseType {
    #[default]
    InPerson,
    Online,
    Recorded,
}

impl CourseType {
    pub fn as_str(self) -> &'static str {
        match self {
            CourseType::InPerson => "in-person",
            CourseType::Online => "online",
            CourseType::Recorded => "recorded",
        }
    }
}

impl fmt::Display for CourseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in-person" => Ok(CourseType::InPerson),
            "online" => Ok(CourseType::Online),
            "recorded" => Ok(CourseType::Recorded),
            other => Err(AppError::InvalidData {
                field: "course_type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub instructor: String,
    pub description: String,
    pub course_type: CourseType,
    pub duration: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub is_registration_closed: bool,
    pub is_ended: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn schedule(&self) -> Schedule {
        Schedule {
            start_date: self.start_date,
            end_date: self.end_date,
            registration_deadline: self.registration_deadline,
            is_registration_closed: self.is_registration_closed,
            is_ended: self.is_ended,
        }
    }

    /// Checks applied before a course is written.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::BadRequest("title must not be empty".to_string()));
        }
        check_storable_year("start_date", self.start_date)?;
        check_storable_year("end_date", self.end_date)?;
        check_storable_year("registration_deadline", self.registration_deadline)?;
        match (self.start_date, self.end_date) {
            (None, Some(_)) => Err(AppError::BadRequest(
                "end_date requires a start_date".to_string(),
            )),
            (Some(start), Some(end)) if end < start => Err(AppError::BadRequest(format!(
                "end_date {} is before start_date {}",
                end, start
            ))),
            _ => Ok(()),
        }
    }
}

/// Years that round-trip through the four-digit RFC 3339 storage format.
pub const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

fn check_storable_year(field: &str, ts: Option<DateTime<Utc>>) -> Result<(), AppError> {
    match ts {
        Some(ts) if !STORABLE_YEARS.contains(&ts.year()) => Err(AppError::BadRequest(format!(
            "{} year {} is outside {}..={}",
            field,
            ts.year(),
            STORABLE_YEARS.start(),
            STORABLE_YEARS.end()
        ))),
        _ => Ok(()),
    }
}

/// The date fields and override flags that decide where a course sits on the
/// calendar and which status badge it gets. Every field is optional so course
/// cards holding partial data can build one directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub registration_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_registration_closed: bool,
    #[serde(default)]
    pub is_ended: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub title: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub course_type: CourseType,
    pub duration: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_registration_closed: bool,
    #[serde(default)]
    pub is_ended: bool,
}

/// Partial update. For nullable columns an absent field leaves the value
/// unchanged and an explicit `null` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub instructor: Option<String>,
    pub description: Option<String>,
    pub course_type: Option<CourseType>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub duration: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub start_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub end_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub registration_deadline: Option<Option<DateTime<Utc>>>,
    pub is_registration_closed: Option<bool>,
    pub is_ended: Option<bool>,
}

/// Row shape of the `courses` table. Timestamps are stored as RFC 3339 text.
#[derive(Debug, Clone, FromRow)]
pub struct CourseRow {
    pub id: String,
    pub title: String,
    pub instructor: String,
    pub description: String,
    pub course_type: String,
    pub duration: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub registration_deadline: Option<String>,
    pub is_registration_closed: bool,
    pub is_ended: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<CourseRow> for Course {
    type Error = AppError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        Ok(Course {
            course_type: row.course_type.parse()?,
            start_date: parse_optional_timestamp("start_date", row.start_date.as_deref())?,
            end_date: parse_optional_timestamp("end_date", row.end_date.as_deref())?,
            registration_deadline: parse_optional_timestamp(
                "registration_deadline",
                row.registration_deadline.as_deref(),
            )?,
            created_at: parse_timestamp("created_at", &row.created_at)?,
            updated_at: parse_timestamp("updated_at", &row.updated_at)?,
            id: row.id,
            title: row.title,
            instructor: row.instructor,
            description: row.description,
            duration: row.duration,
            is_registration_closed: row.is_registration_closed,
            is_ended: row.is_ended,
        })
    }
}

/// Storage format for timestamps: whole seconds, `Z` suffix. A fixed width
/// keeps lexicographic order equal to chronological order in SQL comparisons.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::InvalidData {
            field,
            value: value.to_string(),
        })
}

fn parse_optional_timestamp(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, AppError> {
    value.map(|v| parse_timestamp(field, v)).transpose()
}
