//! Course placement on a month calendar and course status classification.
//!
//! Everything here is pure: callers pass the course snapshot, the display
//! settings and the current instant.

pub mod bucket;
pub mod grid;
pub mod range;
pub mod status;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Course;

pub use bucket::{DayBuckets, day_key};
pub use grid::{DayCell, DayDensity, MonthGrid, MonthStatistics, grid_bounds, month_window};
pub use range::{expand_range, local_day};
pub use status::{CourseStatus, DeadlineUrgency};

/// A course together with its status at a given instant.
#[derive(Debug, Clone, Serialize)]
pub struct CourseView {
    #[serde(flatten)]
    pub course: Course,
    pub status: CourseStatus,
    pub status_label: &'static str,
    pub deadline_urgency: Option<DeadlineUrgency>,
}

impl CourseView {
    pub fn new(course: Course, now: DateTime<Utc>) -> Self {
        let schedule = course.schedule();
        let status = CourseStatus::classify(&schedule, now);
        Self {
            status,
            status_label: status.label(),
            deadline_urgency: DeadlineUrgency::of(&schedule, now),
            course,
        }
    }
}
