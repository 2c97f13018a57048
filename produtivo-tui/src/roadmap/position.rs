//! Horizontal placement of a feature bar inside the visible period.

use chrono::NaiveDate;

use super::period::span_days;
use crate::models::FeatureDto;

/// Floor for bar width so very short features stay legible
pub const MIN_BAR_WIDTH_PX: f64 = 150.0;

/// Horizontal extent of a bar, in px from the container's left edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarPosition {
    pub left: f64,
    pub width: f64,
}

impl BarPosition {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Half-open `[left, right)` intervals intersect
    pub fn overlaps(&self, other: &BarPosition) -> bool {
        !(self.right() <= other.left || self.left >= other.right())
    }
}

/// Whole days from `from` to `to` (negative when `to` is earlier)
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Position `feature` inside `[period_start, period_end]` on a container
/// `container_width_px` wide.
///
/// Returns `None` when the feature has no usable schedule, lies entirely
/// outside the period, or the period/container is degenerate.
pub fn map_position(
    feature: &FeatureDto,
    period_start: NaiveDate,
    period_end: NaiveDate,
    container_width_px: f64,
) -> Option<BarPosition> {
    let (start, end) = feature.schedule()?;

    if !container_width_px.is_finite() || container_width_px <= 0.0 {
        return None;
    }
    if period_end < period_start {
        return None;
    }
    if end < period_start || start > period_end {
        return None;
    }

    let total_days = span_days(period_start, period_end).max(1) as f64;
    let offset_days = days_between(period_start, start).max(0) as f64;
    let extent_days = (days_between(period_start, end) as f64).min(total_days);

    let left = offset_days * container_width_px / total_days;
    let width =
        ((extent_days - offset_days) * container_width_px / total_days).max(MIN_BAR_WIDTH_PX);

    Some(BarPosition { left, width })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureStatus;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn feature(start: Option<NaiveDate>, end: Option<NaiveDate>) -> FeatureDto {
        FeatureDto {
            id: Uuid::new_v4(),
            product_id: Uuid::nil(),
            title: Some("Feature".to_string()),
            description: None,
            status: FeatureStatus::Doing,
            start_date: start,
            end_date: end,
            progress: None,
        }
    }

    #[test]
    fn test_january_at_one_hundred_px_per_day() {
        let (jan1, jan31) = (date(2024, 1, 1), date(2024, 1, 31));

        let a = feature(Some(jan1), Some(date(2024, 1, 10)));
        let pos = map_position(&a, jan1, jan31, 3100.0).unwrap();
        assert_eq!(pos.left, 0.0);
        assert_eq!(pos.width, 900.0);

        let b = feature(Some(date(2024, 1, 5)), Some(date(2024, 1, 15)));
        let pos = map_position(&b, jan1, jan31, 3100.0).unwrap();
        assert_eq!(pos.left, 400.0);
        assert_eq!(pos.width, 1000.0);
    }

    #[test]
    fn test_missing_start_is_not_drawn() {
        let c = feature(None, Some(date(2024, 1, 20)));
        assert!(map_position(&c, date(2024, 1, 1), date(2024, 1, 31), 3100.0).is_none());
        assert!(map_position(&c, date(2000, 1, 1), date(2100, 1, 1), 3100.0).is_none());
    }

    #[test]
    fn test_outside_period_is_not_drawn() {
        let (jan1, jan31) = (date(2024, 1, 1), date(2024, 1, 31));
        let before = feature(Some(date(2023, 12, 1)), Some(date(2023, 12, 31)));
        let after = feature(Some(date(2024, 2, 1)), Some(date(2024, 2, 3)));
        assert!(map_position(&before, jan1, jan31, 3100.0).is_none());
        assert!(map_position(&after, jan1, jan31, 3100.0).is_none());
    }

    #[test]
    fn test_bar_straddling_period_is_clipped() {
        let (jan1, jan31) = (date(2024, 1, 1), date(2024, 1, 31));
        let f = feature(Some(date(2023, 12, 20)), Some(date(2024, 3, 1)));
        let pos = map_position(&f, jan1, jan31, 3100.0).unwrap();
        assert_eq!(pos.left, 0.0);
        assert_eq!(pos.width, 3100.0);
    }

    #[test]
    fn test_extent_stops_at_end_date_but_divides_by_inclusive_span() {
        // 31-day divisor, so 100 px per day; the end day itself adds no width
        let (jan1, jan31) = (date(2024, 1, 1), date(2024, 1, 31));
        let whole_month = feature(Some(jan1), Some(jan31));
        assert_eq!(map_position(&whole_month, jan1, jan31, 3100.0).unwrap().width, 3000.0);

        let into_february = feature(Some(jan1), Some(date(2024, 2, 1)));
        assert_eq!(map_position(&into_february, jan1, jan31, 3100.0).unwrap().width, 3100.0);
    }

    #[test]
    fn test_short_feature_gets_minimum_width() {
        let (jan1, jan31) = (date(2024, 1, 1), date(2024, 1, 31));
        let f = feature(Some(date(2024, 1, 3)), Some(date(2024, 1, 3)));
        let pos = map_position(&f, jan1, jan31, 3100.0).unwrap();
        assert_eq!(pos.left, 200.0);
        assert_eq!(pos.width, MIN_BAR_WIDTH_PX);
    }

    #[test]
    fn test_degenerate_inputs_show_nothing() {
        let jan1 = date(2024, 1, 1);
        let f = feature(Some(jan1), Some(date(2024, 1, 2)));
        // inverted period
        assert!(map_position(&f, date(2024, 1, 31), jan1, 3100.0).is_none());
        // zero-width container
        assert!(map_position(&f, jan1, date(2024, 1, 31), 0.0).is_none());
        // inverted feature
        let inverted = feature(Some(date(2024, 1, 9)), Some(date(2024, 1, 2)));
        assert!(map_position(&inverted, jan1, date(2024, 1, 31), 3100.0).is_none());
    }

    #[test]
    fn test_single_day_period_does_not_divide_by_zero() {
        let jan1 = date(2024, 1, 1);
        let f = feature(Some(jan1), Some(jan1));
        let pos = map_position(&f, jan1, jan1, 500.0).unwrap();
        assert_eq!(pos.left, 0.0);
        assert!(pos.width.is_finite());
    }

    #[test]
    fn test_overlap_is_half_open() {
        let a = BarPosition { left: 0.0, width: 100.0 };
        let touching = BarPosition { left: 100.0, width: 50.0 };
        let crossing = BarPosition { left: 99.0, width: 50.0 };
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&crossing));
        assert!(crossing.overlaps(&a));
    }
}
