//! Roadmap render surface.
//!
//! Draws the period header and the feature bars laid out by
//! [`crate::roadmap`]. Layout coordinates are in px; the surface maps them
//! onto terminal cells with `px_per_column`, and gives each lane
//! [`ROWS_PER_LANE`] rows (title, then progress).

use std::cell::Cell;

use chrono::{Datelike, NaiveDate};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Widget},
};
use uuid::Uuid;

use crate::models::FeatureDto;
use crate::roadmap::{
    layout_roadmap, position::days_between, Bucket, BucketUnit, Period, PlacedBar,
    RoadmapLayout, ZoomLevel, ROW_HEIGHT_PX,
};
use crate::theme::{colors, dim, status_color, status_icon, styles};

/// Default px → terminal column scale
pub const DEFAULT_PX_PER_COLUMN: f64 = 10.0;

/// Terminal rows per lane (one lane is `ROW_HEIGHT_PX` tall)
pub const ROWS_PER_LANE: u16 = 2;

const HEADER_ROWS: u16 = 2;

/// Roadmap navigation state
#[derive(Debug, Clone)]
pub struct TimelineState {
    pub zoom: ZoomLevel,
    /// Date the period is built around; `None` follows today
    pub reference_date: Option<NaiveDate>,
    pub selected_feature: Option<Uuid>,
    pub px_per_column: f64,
    /// First lane shown at the top of the bar area
    pub lane_scroll: usize,
    /// Bar-area size seen at the last render (columns, lanes)
    measured: Cell<(u16, usize)>,
}

impl Default for TimelineState {
    fn default() -> Self {
        Self::new(ZoomLevel::default(), None, DEFAULT_PX_PER_COLUMN)
    }
}

impl TimelineState {
    pub fn new(zoom: ZoomLevel, reference_date: Option<NaiveDate>, px_per_column: f64) -> Self {
        Self {
            zoom,
            reference_date,
            selected_feature: None,
            px_per_column,
            lane_scroll: 0,
            measured: Cell::new((80, 8)),
        }
    }

    pub fn zoom_in(&mut self) {
        self.zoom = self.zoom.zoom_in();
        self.lane_scroll = 0;
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.zoom_out();
        self.lane_scroll = 0;
    }

    pub fn previous_period(&mut self) {
        self.shift_period(-1);
    }

    pub fn next_period(&mut self) {
        self.shift_period(1);
    }

    fn shift_period(&mut self, steps: i32) {
        let reference = self
            .reference_date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        self.reference_date = Some(self.zoom.shift(reference, steps));
        self.lane_scroll = 0;
    }

    /// Follow today again
    pub fn go_to_today(&mut self) {
        self.reference_date = None;
        self.lane_scroll = 0;
    }

    /// Record the bar area size; called by the widget on every render
    pub fn observe_area(&self, columns: u16, visible_lanes: usize) {
        self.measured.set((columns, visible_lanes));
    }

    pub fn measured_columns(&self) -> u16 {
        self.measured.get().0
    }

    pub fn visible_lanes(&self) -> usize {
        self.measured.get().1.max(1)
    }

    pub fn container_width_px(&self, columns: u16) -> f64 {
        columns as f64 * self.px_per_column
    }

    /// Layout for a bar area `columns` wide
    pub fn layout(&self, features: &[FeatureDto], columns: u16) -> RoadmapLayout {
        layout_roadmap(
            features,
            self.reference_date,
            self.zoom,
            self.container_width_px(columns),
        )
    }

    /// Layout at the last measured width
    pub fn current_layout(&self, features: &[FeatureDto]) -> RoadmapLayout {
        self.layout(features, self.measured_columns())
    }

    pub fn select_next(&mut self, layout: &RoadmapLayout) {
        self.step_selection(layout, 1);
    }

    pub fn select_previous(&mut self, layout: &RoadmapLayout) {
        self.step_selection(layout, -1);
    }

    /// Move through bars in reading order, wrapping at both ends
    fn step_selection(&mut self, layout: &RoadmapLayout, step: isize) {
        let order = layout.reading_order();
        if order.is_empty() {
            self.selected_feature = None;
            return;
        }

        let current = self
            .selected_feature
            .and_then(|id| order.iter().position(|bar| bar.feature_id == id));
        let len = order.len() as isize;
        let next = match current {
            Some(i) => (i as isize + step).rem_euclid(len) as usize,
            None if step >= 0 => 0,
            None => order.len() - 1,
        };

        let bar = order[next];
        self.selected_feature = Some(bar.feature_id);
        self.scroll_to_lane(bar.lane);
    }

    /// Adjust `lane_scroll` so `lane` is inside the visible window
    pub fn scroll_to_lane(&mut self, lane: usize) {
        let visible = self.visible_lanes();
        if lane < self.lane_scroll {
            self.lane_scroll = lane;
        } else if lane >= self.lane_scroll + visible {
            self.lane_scroll = lane + 1 - visible;
        }
    }
}

/// Roadmap widget for a list of features
pub struct TimelineWidget<'a> {
    features: &'a [FeatureDto],
    state: &'a TimelineState,
    today: NaiveDate,
    title: String,
}

impl<'a> TimelineWidget<'a> {
    pub fn new(features: &'a [FeatureDto], state: &'a TimelineState) -> Self {
        Self {
            features,
            state,
            today: chrono::Local::now().date_naive(),
            title: " Roadmap ".to_string(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Column of the first day of `date` in a bar area `columns` wide
    fn date_column(period: &Period, date: NaiveDate, columns: u16) -> Option<u16> {
        if !period.contains(date) {
            return None;
        }
        let span = period.span_days().max(1) as f64;
        let col = days_between(period.start, date) as f64 * columns as f64 / span;
        Some((col as u16).min(columns.saturating_sub(1)))
    }

    fn render_axis(&self, area: Rect, buf: &mut Buffer, period: &Period) {
        // Bucket labels; one that would overlap the previous label is skipped
        let mut label_end = 0u16;
        for bucket in &period.buckets {
            let Some(col) = Self::date_column(period, bucket.start, area.width) else {
                continue;
            };

            if col >= label_end {
                let label = bucket.label();
                let room = area.width.saturating_sub(col) as usize;
                buf.set_stringn(
                    area.x + col,
                    area.y,
                    &label,
                    room,
                    self.bucket_style(bucket),
                );
                label_end = col + label.chars().count() as u16 + 1;
            }

            buf[(area.x + col, area.y + 1)]
                .set_char('┬')
                .set_style(Style::default().fg(colors::BUCKET_SEPARATOR));
        }

        // Tick row
        for col in 0..area.width {
            let cell = &mut buf[(area.x + col, area.y + 1)];
            if cell.symbol() == " " {
                cell.set_char('─').set_style(styles::border_dim());
            }
        }

        if let Some(col) = Self::date_column(period, self.today, area.width) {
            buf[(area.x + col, area.y + 1)].set_char('▼').set_style(
                Style::default()
                    .fg(colors::TODAY_MARKER)
                    .add_modifier(Modifier::BOLD),
            );
        }
    }

    fn bucket_style(&self, bucket: &Bucket) -> Style {
        let weekend =
            bucket.unit == BucketUnit::Day && bucket.start.weekday().number_from_monday() > 5;
        if bucket.contains(self.today) {
            Style::default()
                .fg(colors::YELLOW)
                .add_modifier(Modifier::BOLD)
        } else if weekend {
            styles::text_hint()
        } else {
            Style::default().fg(colors::PURPLE)
        }
    }

    fn render_today_line(&self, area: Rect, buf: &mut Buffer, period: &Period) {
        let Some(col) = Self::date_column(period, self.today, area.width) else {
            return;
        };
        for row in 0..area.height {
            let cell = &mut buf[(area.x + col, area.y + row)];
            if cell.symbol() == " " {
                cell.set_char('┊').set_style(
                    Style::default()
                        .fg(colors::TODAY_MARKER)
                        .add_modifier(Modifier::DIM),
                );
            }
        }
    }

    fn render_bar(
        &self,
        area: Rect,
        buf: &mut Buffer,
        bar: &PlacedBar,
        feature: &FeatureDto,
        row: u16,
    ) {
        // Clip px geometry to whole columns inside the area
        let ppc = self.state.px_per_column;
        let start_col = (bar.position.left / ppc).floor().max(0.0) as u16;
        if start_col >= area.width {
            return;
        }
        let width_cols = ((bar.position.width / ppc).round() as u16).max(1);
        let end_col = start_col.saturating_add(width_cols).min(area.width);
        let width = end_col - start_col;

        let is_selected = self.state.selected_feature == Some(feature.id);
        let color = status_color(feature.status);
        let overdue = feature.is_overdue(self.today);

        let title_style = if is_selected {
            Style::default()
                .fg(colors::BG_DARK)
                .bg(color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors::FG_PRIMARY).bg(dim(color, 0.45))
        };

        // Title row
        let x = area.x + start_col;
        let y = area.y + row;
        for col in 0..width {
            buf[(x + col, y)].set_char(' ').set_style(title_style);
        }
        let marker = if overdue { '⚑' } else { status_icon(feature.status) };
        let text = format!("{} {}", marker, feature.display_title());
        buf.set_stringn(x, y, &text, width as usize, title_style);

        // Progress row
        if row + 1 >= area.height {
            return;
        }
        let filled = feature
            .progress_pct()
            .map(|pct| (width as u32 * pct as u32 / 100) as u16)
            .unwrap_or(0);
        for col in 0..width {
            let (ch, fg) = if col < filled {
                ('━', color)
            } else {
                ('─', dim(color, 0.5))
            };
            buf[(x + col, y + 1)]
                .set_char(ch)
                .set_style(Style::default().fg(fg));
        }
    }
}

/// Terminal row for a bar `top_px` down, with `scroll` lanes hidden above;
/// `None` when the lane falls outside the visible window
fn lane_row(top_px: f64, scroll: usize, visible_lanes: usize) -> Option<u16> {
    let offset = top_px - scroll as f64 * ROW_HEIGHT_PX;
    if offset < 0.0 || offset >= visible_lanes as f64 * ROW_HEIGHT_PX {
        return None;
    }
    Some((offset / ROW_HEIGHT_PX) as u16 * ROWS_PER_LANE)
}

impl Widget for TimelineWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(
                "{}· {} ",
                self.title,
                self.state.zoom.label()
            ))
            .title_style(styles::title_accent())
            .borders(Borders::ALL)
            .border_style(styles::border())
            .style(Style::default().bg(colors::BG_DARK));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width < 20 || inner.height < HEADER_ROWS + 1 {
            return;
        }

        let bars_area = Rect::new(
            inner.x,
            inner.y + HEADER_ROWS,
            inner.width,
            inner.height - HEADER_ROWS,
        );
        let visible_lanes = (bars_area.height / ROWS_PER_LANE).max(1) as usize;
        self.state.observe_area(inner.width, visible_lanes);

        let layout = self.state.layout(self.features, inner.width);

        // Axis
        self.render_axis(
            Rect::new(inner.x, inner.y, inner.width, HEADER_ROWS),
            buf,
            &layout.period,
        );

        // Bars in the scrolled lane window
        for bar in &layout.bars {
            let Some(row) = lane_row(bar.top_px(), self.state.lane_scroll, visible_lanes) else {
                continue;
            };
            let Some(feature) = self.features.iter().find(|f| f.id == bar.feature_id) else {
                continue;
            };
            self.render_bar(bars_area, buf, bar, feature, row);
        }

        // Today marker through the empty cells
        self.render_today_line(bars_area, buf, &layout.period);

        if layout.bars.is_empty() {
            let message = if self.features.is_empty() {
                "No features yet"
            } else {
                "Nothing scheduled in this period"
            };
            let x = bars_area.x + bars_area.width.saturating_sub(message.len() as u16) / 2;
            buf.set_string(x, bars_area.y + bars_area.height / 2, message, styles::text_dim());
        }

        buf.set_string(area.x + 1, area.y + area.height - 1, "◀ h", styles::text_hint());
        buf.set_string(
            area.x + area.width.saturating_sub(4),
            area.y + area.height - 1,
            "l ▶",
            styles::text_hint(),
        );
    }
}

/// One-line summary under the roadmap
pub struct TimelineStatusWidget<'a> {
    features: &'a [FeatureDto],
    state: &'a TimelineState,
}

impl<'a> TimelineStatusWidget<'a> {
    pub fn new(features: &'a [FeatureDto], state: &'a TimelineState) -> Self {
        Self { features, state }
    }
}

impl Widget for TimelineStatusWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let layout = self.state.current_layout(self.features);
        let hidden = layout
            .lane_count
            .saturating_sub(self.state.lane_scroll + self.state.visible_lanes());

        let mut status = format!(
            "{} → {}  ·  {} placed  ·  {} unscheduled  ·  {} lanes",
            layout.period.start.format("%d %b %Y"),
            layout.period.end.format("%d %b %Y"),
            layout.bars.len(),
            layout.unscheduled,
            layout.lane_count,
        );
        if hidden > 0 || self.state.lane_scroll > 0 {
            status.push_str(&format!(
                "  ·  {} above / {} below",
                self.state.lane_scroll, hidden
            ));
        }

        buf.set_stringn(
            area.x,
            area.y,
            &status,
            area.width as usize,
            Style::default().fg(colors::FG_DIM),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureStatus;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn feature(n: u128, title: &str, start: NaiveDate, days: i64) -> FeatureDto {
        FeatureDto {
            id: Uuid::from_u128(n),
            product_id: Uuid::nil(),
            title: Some(title.to_string()),
            description: None,
            status: FeatureStatus::Doing,
            start_date: Some(start),
            end_date: Some(start + Duration::days(days)),
            progress: Some(50),
        }
    }

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_renders_bucket_labels_and_bar_titles() {
        let monday = date(2024, 1, 8);
        let state = TimelineState::new(ZoomLevel::Week, Some(monday), 10.0);
        let features = vec![feature(1, "Checkout", monday, 3)];

        let area = Rect::new(0, 0, 72, 10);
        let mut buf = Buffer::empty(area);
        TimelineWidget::new(&features, &state)
            .today(date(2030, 1, 1))
            .render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("Mon 08"));
        assert!(text.contains("Checkout"));
        assert_eq!(state.measured_columns(), 70);
    }

    #[test]
    fn test_overlapping_bars_render_on_separate_lanes() {
        let monday = date(2024, 1, 8);
        let state = TimelineState::new(ZoomLevel::Sprint, Some(monday), 10.0);
        let features = vec![
            feature(1, "Alpha", monday, 6),
            feature(2, "Beta", monday + Duration::days(2), 6),
        ];

        let area = Rect::new(0, 0, 80, 12);
        let mut buf = Buffer::empty(area);
        TimelineWidget::new(&features, &state)
            .today(date(2030, 1, 1))
            .render(area, &mut buf);

        let rows: Vec<String> = buffer_text(&buf).lines().map(str::to_string).collect();
        let alpha_row = rows.iter().position(|r| r.contains("Alpha")).unwrap();
        let beta_row = rows.iter().position(|r| r.contains("Beta")).unwrap();
        assert_eq!(beta_row, alpha_row + ROWS_PER_LANE as usize);
    }

    #[test]
    fn test_lane_rows_follow_bar_tops_and_scroll() {
        assert_eq!(lane_row(0.0, 0, 4), Some(0));
        assert_eq!(lane_row(2.0 * ROW_HEIGHT_PX, 0, 4), Some(2 * ROWS_PER_LANE));
        // Scrolled two lanes down: lane 2 is the first visible row
        assert_eq!(lane_row(2.0 * ROW_HEIGHT_PX, 2, 4), Some(0));
        assert_eq!(lane_row(ROW_HEIGHT_PX, 2, 4), None);
        assert_eq!(lane_row(6.0 * ROW_HEIGHT_PX, 2, 4), None);
        assert_eq!(lane_row(5.0 * ROW_HEIGHT_PX, 2, 4), Some(3 * ROWS_PER_LANE));
    }

    #[test]
    fn test_scrolled_lanes_are_not_drawn() {
        let monday = date(2024, 1, 8);
        let mut state = TimelineState::new(ZoomLevel::Sprint, Some(monday), 10.0);
        state.lane_scroll = 1;
        let features = vec![
            feature(1, "Alpha", monday, 6),
            feature(2, "Beta", monday + Duration::days(2), 6),
        ];

        let area = Rect::new(0, 0, 80, 12);
        let mut buf = Buffer::empty(area);
        TimelineWidget::new(&features, &state)
            .today(date(2030, 1, 1))
            .render(area, &mut buf);

        let rows: Vec<String> = buffer_text(&buf).lines().map(str::to_string).collect();
        assert!(!rows.iter().any(|r| r.contains("Alpha")));
        let beta_row = rows.iter().position(|r| r.contains("Beta")).unwrap();
        assert_eq!(beta_row, 1 + HEADER_ROWS as usize);
    }

    #[test]
    fn test_selection_walks_reading_order_and_wraps() {
        let monday = date(2024, 1, 8);
        let mut state = TimelineState::new(ZoomLevel::Sprint, Some(monday), 10.0);
        let features = vec![
            feature(1, "Alpha", monday, 6),
            feature(2, "Beta", monday + Duration::days(2), 6),
            feature(3, "Gamma", monday + Duration::days(9), 2),
        ];
        let layout = state.layout(&features, 140);

        state.select_next(&layout);
        assert_eq!(state.selected_feature, Some(Uuid::from_u128(1)));
        state.select_next(&layout);
        assert_eq!(state.selected_feature, Some(Uuid::from_u128(3)));
        state.select_next(&layout);
        assert_eq!(state.selected_feature, Some(Uuid::from_u128(2)));
        state.select_next(&layout);
        assert_eq!(state.selected_feature, Some(Uuid::from_u128(1)));
        state.select_previous(&layout);
        assert_eq!(state.selected_feature, Some(Uuid::from_u128(2)));
    }

    #[test]
    fn test_period_navigation_follows_zoom() {
        let mut state = TimelineState::new(ZoomLevel::Sprint, Some(date(2024, 1, 10)), 10.0);
        state.next_period();
        assert_eq!(state.reference_date, Some(date(2024, 1, 24)));
        state.zoom_out();
        state.previous_period();
        assert_eq!(state.reference_date, Some(date(2023, 12, 24)));
        state.go_to_today();
        assert_eq!(state.reference_date, None);
    }

    #[test]
    fn test_scroll_keeps_selected_lane_visible() {
        let mut state = TimelineState::default();
        state.observe_area(80, 3);
        state.scroll_to_lane(5);
        assert_eq!(state.lane_scroll, 3);
        state.scroll_to_lane(1);
        assert_eq!(state.lane_scroll, 1);
    }
}
