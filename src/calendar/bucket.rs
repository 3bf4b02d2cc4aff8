use std::collections::{HashMap, HashSet};

use chrono::{Datelike, FixedOffset, NaiveDate};

use crate::calendar::range::expand_range;
use crate::models::Course;

/// Canonical `YYYY-MM-DD` key of a calendar day.
pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Courses grouped by every calendar day they occupy.
///
/// Within a day, courses keep the order of the input slice. A course with no
/// start date is never placed.
#[derive(Debug, Default)]
pub struct DayBuckets<'a> {
    days: HashMap<NaiveDate, Vec<&'a Course>>,
}

impl<'a> DayBuckets<'a> {
    pub fn build(courses: &'a [Course], tz: FixedOffset) -> Self {
        let mut days: HashMap<NaiveDate, Vec<&'a Course>> = HashMap::new();

        for course in courses {
            let Some(start) = course.start_date else {
                continue;
            };
            for day in expand_range(start, course.end_date, tz) {
                days.entry(day).or_default().push(course);
            }
        }

        Self { days }
    }

    pub fn get(&self, day: NaiveDate) -> &[&'a Course] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_by_key(&self, key: &str) -> &[&'a Course] {
        match NaiveDate::parse_from_str(key, "%Y-%m-%d") {
            Ok(day) => self.get(day),
            Err(_) => &[],
        }
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Distinct courses occupying at least one day of the given month, in
    /// order of first appearance.
    pub fn courses_in_month(&self, year: i32, month: u32) -> Vec<&'a Course> {
        let mut month_days: Vec<NaiveDate> = self
            .days
            .keys()
            .copied()
            .filter(|d| d.year() == year && d.month() == month)
            .collect();
        month_days.sort();

        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for day in month_days {
            for course in self.get(day) {
                if seen.insert(course.id.as_str()) {
                    result.push(*course);
                }
            }
        }
        result
    }
}
