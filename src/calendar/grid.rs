use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc, Weekday};
use serde::Serialize;

use crate::calendar::bucket::DayBuckets;
use crate::calendar::range::local_day;
use crate::calendar::status::CourseStatus;
use crate::calendar::CourseView;
use crate::config::CalendarConfig;
use crate::error::AppError;
use crate::models::Course;
use crate::models::course::STORABLE_YEARS;

/// How crowded a day is, used to shade its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayDensity {
    None,
    Single,
    Few,
    Many,
}

impl DayDensity {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => DayDensity::None,
            1 => DayDensity::Single,
            2..=3 => DayDensity::Few,
            _ => DayDensity::Many,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_current_month: bool,
    pub is_today: bool,
    pub density: DayDensity,
    pub courses: Vec<CourseView>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonthStatistics {
    pub total: usize,
    pub open: usize,
    pub closing_soon: usize,
    pub ongoing: usize,
    pub closed: usize,
    pub ended: usize,
}

impl MonthStatistics {
    fn record(&mut self, status: CourseStatus) {
        self.total += 1;
        match status {
            CourseStatus::Open => self.open += 1,
            CourseStatus::ClosingSoon => self.closing_soon += 1,
            CourseStatus::Ongoing => self.ongoing += 1,
            CourseStatus::Closed => self.closed += 1,
            CourseStatus::Ended => self.ended += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub statistics: MonthStatistics,
    pub weeks: Vec<Vec<DayCell>>,
}

/// First and last day shown for a month: the month padded out to whole weeks.
pub fn grid_bounds(
    year: i32,
    month: u32,
    week_start: Weekday,
) -> Result<(NaiveDate, NaiveDate), AppError> {
    let out_of_range = || AppError::BadRequest(format!("Month out of range: {}-{}", year, month));

    if !STORABLE_YEARS.contains(&year) {
        return Err(out_of_range());
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid month: {}-{}", year, month)))?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(out_of_range)?;

    let lead = days_after(first.weekday(), week_start);
    let trail = 6 - days_after(last.weekday(), week_start);

    let grid_first = first
        .checked_sub_signed(Duration::days(lead))
        .ok_or_else(out_of_range)?;
    let grid_last = last
        .checked_add_signed(Duration::days(trail))
        .ok_or_else(out_of_range)?;
    Ok((grid_first, grid_last))
}

/// Half-open UTC window `[from, to)` covering every day on the month's grid.
pub fn month_window(
    year: i32,
    month: u32,
    config: &CalendarConfig,
) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let (first, last) = grid_bounds(year, month, config.week_start)?;
    let out_of_range = || AppError::BadRequest(format!("Month out of range: {}-{}", year, month));
    let offset = Duration::seconds(i64::from(config.utc_offset.local_minus_utc()));
    let local_midnight_utc = |day: NaiveDate| {
        day.and_time(NaiveTime::MIN)
            .and_utc()
            .checked_sub_signed(offset)
            .ok_or_else(out_of_range)
    };

    let after_last = last.succ_opt().ok_or_else(out_of_range)?;
    Ok((local_midnight_utc(first)?, local_midnight_utc(after_last)?))
}

fn days_after(day: Weekday, week_start: Weekday) -> i64 {
    let day = i64::from(day.num_days_from_sunday());
    let start = i64::from(week_start.num_days_from_sunday());
    (day - start).rem_euclid(7)
}

impl MonthGrid {
    pub fn build(
        year: i32,
        month: u32,
        courses: &[Course],
        now: DateTime<Utc>,
        config: &CalendarConfig,
    ) -> Result<Self, AppError> {
        let (first, last) = grid_bounds(year, month, config.week_start)?;
        let buckets = DayBuckets::build(courses, config.utc_offset);
        let today = local_day(now, config.utc_offset);

        let mut statistics = MonthStatistics::default();
        for course in buckets.courses_in_month(year, month) {
            statistics.record(CourseStatus::classify(&course.schedule(), now));
        }

        let mut weeks = Vec::new();
        let mut week = Vec::with_capacity(7);
        for date in first.iter_days().take_while(|d| *d <= last) {
            let on_day = buckets.get(date);
            week.push(DayCell {
                date,
                in_current_month: date.year() == year && date.month() == month,
                is_today: date == today,
                density: DayDensity::from_count(on_day.len()),
                courses: on_day
                    .iter()
                    .map(|course| CourseView::new((*course).clone(), now))
                    .collect(),
            });
            if week.len() == 7 {
                weeks.push(std::mem::replace(&mut week, Vec::with_capacity(7)));
            }
        }

        Ok(Self {
            year,
            month,
            statistics,
            weeks,
        })
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&DayCell> {
        self.weeks.iter().flatten().find(|cell| cell.date == date)
    }
}
