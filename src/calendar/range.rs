use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use tracing::warn;

/// Calendar day of `ts` as seen in the display zone.
pub fn local_day(ts: DateTime<Utc>, tz: FixedOffset) -> NaiveDate {
    ts.with_timezone(&tz).date_naive()
}

/// Every calendar day from the start day to the end day, both inclusive.
///
/// Without an end date the course occupies only its start day. An end day
/// before the start day is bad data; the range collapses to the start day.
pub fn expand_range(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    tz: FixedOffset,
) -> Vec<NaiveDate> {
    let first = local_day(start, tz);
    let Some(end) = end else {
        return vec![first];
    };

    let last = local_day(end, tz);
    if last < first {
        warn!(
            "end date {} precedes start date {}, placing course on start day only",
            end, start
        );
        return vec![first];
    }

    first.iter_days().take_while(|day| *day <= last).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Offset, TimeZone};

    fn utc() -> FixedOffset {
        Utc.fix()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn start_only_is_a_single_day() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 14, 0, 0).unwrap();
        assert_eq!(expand_range(start, None, utc()), vec![day(2025, 6, 1)]);
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 6, 3, 9, 0, 0).unwrap();
        assert_eq!(
            expand_range(start, Some(end), utc()),
            vec![day(2025, 6, 1), day(2025, 6, 2), day(2025, 6, 3)]
        );
    }

    #[test]
    fn end_earlier_in_the_day_than_start_still_counts_the_end_day() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();
        assert_eq!(
            expand_range(start, Some(end), utc()),
            vec![day(2025, 6, 1), day(2025, 6, 2)]
        );
    }

    #[test]
    fn reversed_range_collapses_to_start_day() {
        let start = Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        assert_eq!(expand_range(start, Some(end), utc()), vec![day(2025, 6, 10)]);
    }

    #[test]
    fn range_crosses_month_and_year_boundaries() {
        let start = Utc.with_ymd_and_hms(2025, 12, 30, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 1, 2, 9, 0, 0).unwrap();
        let days = expand_range(start, Some(end), utc());
        assert_eq!(days.len(), 4);
        assert_eq!(days.first(), Some(&day(2025, 12, 30)));
        assert_eq!(days.last(), Some(&day(2026, 1, 2)));
    }

    #[test]
    fn days_follow_the_display_zone() {
        let riyadh = FixedOffset::east_opt(3 * 3600).unwrap();
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 22, 30, 0).unwrap();
        assert_eq!(expand_range(start, None, riyadh), vec![day(2025, 6, 2)]);
        assert_eq!(expand_range(start, None, utc()), vec![day(2025, 6, 1)]);
    }
}
