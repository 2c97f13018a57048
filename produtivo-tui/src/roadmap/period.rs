//! Period generation: the visible window and its axis buckets for a zoom level.

use chrono::{Datelike, Duration, Local, Months, NaiveDate};

/// Time granularity of the roadmap axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ZoomLevel {
    Year,
    #[default]
    Month,
    Sprint,
    Week,
}

impl ZoomLevel {
    /// Next finer zoom (stops at week)
    pub fn zoom_in(&self) -> Self {
        match self {
            ZoomLevel::Year => ZoomLevel::Month,
            ZoomLevel::Month => ZoomLevel::Sprint,
            ZoomLevel::Sprint | ZoomLevel::Week => ZoomLevel::Week,
        }
    }

    /// Next coarser zoom (stops at year)
    pub fn zoom_out(&self) -> Self {
        match self {
            ZoomLevel::Week => ZoomLevel::Sprint,
            ZoomLevel::Sprint => ZoomLevel::Month,
            ZoomLevel::Month | ZoomLevel::Year => ZoomLevel::Year,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ZoomLevel::Year => "Year",
            ZoomLevel::Month => "Month (3 mo)",
            ZoomLevel::Sprint => "Sprint",
            ZoomLevel::Week => "Week",
        }
    }

    pub fn bucket_unit(&self) -> BucketUnit {
        match self {
            ZoomLevel::Year => BucketUnit::Month,
            ZoomLevel::Month | ZoomLevel::Sprint => BucketUnit::Week,
            ZoomLevel::Week => BucketUnit::Day,
        }
    }

    /// Move a reference date by `steps` windows of this zoom level.
    ///
    /// Steps saturate at chrono's representable range.
    pub fn shift(&self, date: NaiveDate, steps: i32) -> NaiveDate {
        let months = |n: u32| {
            let shifted = if steps >= 0 {
                date.checked_add_months(Months::new(n))
            } else {
                date.checked_sub_months(Months::new(n))
            };
            shifted.unwrap_or(if steps >= 0 {
                NaiveDate::MAX
            } else {
                NaiveDate::MIN
            })
        };
        match self {
            ZoomLevel::Year => months(12 * steps.unsigned_abs()),
            ZoomLevel::Month => months(steps.unsigned_abs()),
            ZoomLevel::Sprint => add_days(date, 14 * steps as i64),
            ZoomLevel::Week => add_days(date, 7 * steps as i64),
        }
    }
}

impl From<&str> for ZoomLevel {
    /// Unknown names fall back to month.
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "year" | "ano" => ZoomLevel::Year,
            "sprint" => ZoomLevel::Sprint,
            "week" | "semana" => ZoomLevel::Week,
            _ => ZoomLevel::Month,
        }
    }
}

impl std::fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Calendar unit covered by one bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketUnit {
    Month,
    Week,
    Day,
}

/// One column of the axis, an inclusive day range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub unit: BucketUnit,
}

impl Bucket {
    pub fn label(&self) -> String {
        match self.unit {
            BucketUnit::Month => self.start.format("%b").to_string(),
            BucketUnit::Week => self.start.format("%d/%m").to_string(),
            BucketUnit::Day => self.start.format("%a %d").to_string(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Visible window `[start, end]` (inclusive days) and its buckets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub buckets: Vec<Bucket>,
}

impl Period {
    pub fn span_days(&self) -> i64 {
        span_days(self.start, self.end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Number of calendar days in `[start, end]`; zero when inverted
pub fn span_days(start: NaiveDate, end: NaiveDate) -> i64 {
    ((end - start).num_days() + 1).max(0)
}

/// `date + days`, saturating at `NaiveDate::MIN` / `NaiveDate::MAX`
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    match date.checked_add_signed(Duration::days(days)) {
        Some(shifted) => shifted,
        None if days < 0 => NaiveDate::MIN,
        None => NaiveDate::MAX,
    }
}

/// Build the visible window for `reference` (today when absent) at `zoom`.
pub fn generate_period(reference: Option<NaiveDate>, zoom: ZoomLevel) -> Period {
    let reference = reference.unwrap_or_else(|| Local::now().date_naive());

    let (start, end) = match zoom {
        ZoomLevel::Year => {
            let start = year_start(reference);
            (start, months_after(start, 12))
        }
        // first of the reference month through the end of the third month
        ZoomLevel::Month => {
            let start = month_start(reference);
            (start, months_after(start, 3))
        }
        ZoomLevel::Sprint => {
            let start = week_start(reference);
            (start, add_days(start, 13))
        }
        ZoomLevel::Week => {
            let start = week_start(reference);
            (start, add_days(start, 6))
        }
    };

    Period {
        start,
        end,
        buckets: split_into_buckets(start, end, zoom.bucket_unit()),
    }
}

/// Tile `[start, end]` with buckets of `unit`, clipping the first and last
fn split_into_buckets(start: NaiveDate, end: NaiveDate, unit: BucketUnit) -> Vec<Bucket> {
    let mut buckets = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        let unit_end = match unit {
            BucketUnit::Month => months_after(month_start(cursor), 1),
            BucketUnit::Week => add_days(week_start(cursor), 6),
            BucketUnit::Day => cursor,
        };
        let bucket_end = unit_end.min(end);
        buckets.push(Bucket {
            start: cursor,
            end: bucket_end,
            unit,
        });
        // the last representable day ends the axis
        let Some(next) = bucket_end.succ_opt() else {
            break;
        };
        cursor = next;
    }
    buckets
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    add_days(date, -(date.weekday().num_days_from_monday() as i64))
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn year_start(date: NaiveDate) -> NaiveDate {
    date.with_ordinal(1).unwrap_or(date)
}

/// Last day of the `months`-month run starting at the 1st `start`;
/// `NaiveDate::MAX` when that runs past the calendar
fn months_after(start: NaiveDate, months: u32) -> NaiveDate {
    start
        .checked_add_months(Months::new(months))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_year_has_twelve_month_buckets() {
        let period = generate_period(Some(date(2024, 7, 19)), ZoomLevel::Year);
        assert_eq!(period.start, date(2024, 1, 1));
        assert_eq!(period.end, date(2024, 12, 31));
        assert_eq!(period.span_days(), 366);
        assert_eq!(period.buckets.len(), 12);
        for (i, bucket) in period.buckets.iter().enumerate() {
            assert_eq!(bucket.start, date(2024, i as u32 + 1, 1));
            assert_eq!(bucket.unit, BucketUnit::Month);
        }
        assert_eq!(period.buckets[1].end, date(2024, 2, 29));
    }

    #[test]
    fn test_month_window_spans_three_calendar_months() {
        let period = generate_period(Some(date(2023, 11, 15)), ZoomLevel::Month);
        assert_eq!(period.start, date(2023, 11, 1));
        assert_eq!(period.end, date(2024, 1, 31));
        assert!(period.buckets.iter().all(|b| b.unit == BucketUnit::Week));
        assert_eq!(period.buckets.first().unwrap().start, period.start);
        assert_eq!(period.buckets.last().unwrap().end, period.end);
        // 2023-11-01 is a Wednesday, so the second bucket opens on a Monday.
        assert_eq!(period.buckets[1].start.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_sprint_is_fourteen_days_from_monday() {
        let period = generate_period(Some(date(2024, 1, 11)), ZoomLevel::Sprint);
        assert_eq!(period.start, date(2024, 1, 8));
        assert_eq!(period.end, date(2024, 1, 21));
        assert_eq!(period.span_days(), 14);
        assert_eq!(period.buckets.len(), 2);
    }

    #[test]
    fn test_week_from_wednesday_has_seven_days_starting_monday() {
        let wednesday = date(2024, 1, 10);
        assert_eq!(wednesday.weekday(), Weekday::Wed);
        let period = generate_period(Some(wednesday), ZoomLevel::Week);
        assert_eq!(period.buckets.len(), 7);
        assert_eq!(period.buckets[0].start, date(2024, 1, 8));
        assert_eq!(period.buckets[0].start.weekday(), Weekday::Mon);
        assert_eq!(period.buckets[6].start, date(2024, 1, 14));
    }

    #[test]
    fn test_missing_reference_uses_today() {
        let today = Local::now().date_naive();
        let period = generate_period(None, ZoomLevel::Week);
        assert!(period.contains(today));
    }

    #[test]
    fn test_unknown_zoom_falls_back_to_month() {
        assert_eq!(ZoomLevel::from("quarter"), ZoomLevel::Month);
        assert_eq!(ZoomLevel::from(" Semana "), ZoomLevel::Week);
        assert_eq!(ZoomLevel::from("ANO"), ZoomLevel::Year);
        assert_eq!(ZoomLevel::from("sprint"), ZoomLevel::Sprint);
    }

    #[test]
    fn test_shift_moves_by_one_window() {
        let d = date(2024, 1, 31);
        assert_eq!(ZoomLevel::Year.shift(d, 1), date(2025, 1, 31));
        assert_eq!(ZoomLevel::Month.shift(d, 1), date(2024, 2, 29));
        assert_eq!(ZoomLevel::Month.shift(d, -2), date(2023, 11, 30));
        assert_eq!(ZoomLevel::Sprint.shift(d, -1), date(2024, 1, 17));
        assert_eq!(ZoomLevel::Week.shift(d, 2), date(2024, 2, 14));
    }

    #[test]
    fn test_zoom_in_and_out_saturate() {
        assert_eq!(ZoomLevel::Week.zoom_in(), ZoomLevel::Week);
        assert_eq!(ZoomLevel::Year.zoom_out(), ZoomLevel::Year);
        assert_eq!(ZoomLevel::Year.zoom_in().zoom_in(), ZoomLevel::Sprint);
    }

    #[test]
    fn test_inverted_span_is_zero() {
        assert_eq!(span_days(date(2024, 1, 2), date(2024, 1, 1)), 0);
        assert_eq!(span_days(date(2024, 1, 1), date(2024, 1, 1)), 1);
    }

    #[test]
    fn test_shift_saturates_at_calendar_edges() {
        let last = NaiveDate::MAX;
        assert_eq!(ZoomLevel::Week.shift(last - Duration::days(2), 1), last);
        assert_eq!(ZoomLevel::Sprint.shift(last, 3), last);
        assert_eq!(ZoomLevel::Month.shift(last, 1), last);
        assert_eq!(ZoomLevel::Week.shift(NaiveDate::MIN, -1), NaiveDate::MIN);
        assert_eq!(ZoomLevel::Year.shift(NaiveDate::MIN, -1), NaiveDate::MIN);
    }

    #[test]
    fn test_periods_near_the_last_date_are_clipped() {
        let last = NaiveDate::MAX;
        for zoom in [ZoomLevel::Year, ZoomLevel::Month, ZoomLevel::Sprint, ZoomLevel::Week] {
            let period = generate_period(Some(last), zoom);
            assert_eq!(period.end, last, "{zoom:?}");
            assert!(period.start <= period.end);
            assert_eq!(period.buckets.first().unwrap().start, period.start);
            assert_eq!(period.buckets.last().unwrap().end, last);
        }

        let month = generate_period(Some(last - Duration::days(16)), ZoomLevel::Month);
        assert_eq!(month.start.day(), 1);
        assert_eq!(month.end, last);
    }

    #[test]
    fn test_week_at_first_date_does_not_underflow() {
        let period = generate_period(Some(NaiveDate::MIN), ZoomLevel::Week);
        assert_eq!(period.start, NaiveDate::MIN);
        assert!(period.span_days() >= 1);
    }

    #[test]
    fn test_add_days_saturates() {
        assert_eq!(add_days(date(2024, 1, 31), 1), date(2024, 2, 1));
        assert_eq!(add_days(NaiveDate::MAX, 1), NaiveDate::MAX);
        assert_eq!(add_days(NaiveDate::MIN, -1), NaiveDate::MIN);
    }
}
