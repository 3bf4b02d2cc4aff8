use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Schedule;

pub const CLOSING_SOON_DAYS: i64 = 7;
pub const URGENT_DEADLINE_DAYS: i64 = 3;

/// Display state of a course relative to a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    Ended,
    Closed,
    Ongoing,
    ClosingSoon,
    Open,
}

impl CourseStatus {
    pub const ALL: [CourseStatus; 5] = [
        CourseStatus::Ended,
        CourseStatus::Closed,
        CourseStatus::Ongoing,
        CourseStatus::ClosingSoon,
        CourseStatus::Open,
    ];

    /// First matching rule wins:
    /// ended, closed, ongoing, closing soon, then open.
    pub fn classify(schedule: &Schedule, now: DateTime<Utc>) -> Self {
        if schedule.is_ended || schedule.end_date.is_some_and(|end| end < now) {
            return CourseStatus::Ended;
        }
        if schedule.is_registration_closed
            || schedule.registration_deadline.is_some_and(|deadline| deadline < now)
        {
            return CourseStatus::Closed;
        }
        if schedule.start_date.is_some_and(|start| start < now) {
            return CourseStatus::Ongoing;
        }
        if schedule
            .registration_deadline
            .is_some_and(|deadline| deadline - now < Duration::days(CLOSING_SOON_DAYS))
        {
            return CourseStatus::ClosingSoon;
        }
        CourseStatus::Open
    }

    pub fn slug(self) -> &'static str {
        match self {
            CourseStatus::Ended => "ended",
            CourseStatus::Closed => "closed",
            CourseStatus::Ongoing => "ongoing",
            CourseStatus::ClosingSoon => "closing_soon",
            CourseStatus::Open => "open",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CourseStatus::Ended => "Ended",
            CourseStatus::Closed => "Registration closed",
            CourseStatus::Ongoing => "Ongoing",
            CourseStatus::ClosingSoon => "Closing soon",
            CourseStatus::Open => "Open",
        }
    }
}

/// How close the registration deadline is, for deadline badges on course cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineUrgency {
    Urgent,
    Soon,
    Normal,
}

impl DeadlineUrgency {
    /// `None` when the course has no registration deadline. Past deadlines
    /// count as urgent.
    pub fn of(schedule: &Schedule, now: DateTime<Utc>) -> Option<Self> {
        let remaining = schedule.registration_deadline? - now;
        Some(if remaining < Duration::days(URGENT_DEADLINE_DAYS) {
            DeadlineUrgency::Urgent
        } else if remaining < Duration::days(CLOSING_SOON_DAYS) {
            DeadlineUrgency::Soon
        } else {
            DeadlineUrgency::Normal
        })
    }
}
