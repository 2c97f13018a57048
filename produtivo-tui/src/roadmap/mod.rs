//! Roadmap layout engine.
//!
//! Pure value-in/value-out pipeline from a feature list to placed bars:
//! reference date + zoom → [`generate_period`] → [`map_position`] per
//! feature → [`pack_rows`] → `(left, top, width)` per feature. Nothing here
//! knows about the terminal; the render surface lives in `timeline`.

pub mod packing;
pub mod period;
pub mod position;


use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::FeatureDto;

pub use packing::{pack_rows, ROW_HEIGHT_PX};
pub use period::{generate_period, Bucket, BucketUnit, Period, ZoomLevel};
pub use position::{map_position, BarPosition};

/// A feature bar with its final coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedBar {
    pub feature_id: Uuid,
    pub position: BarPosition,
    pub lane: usize,
}

impl PlacedBar {
    /// Vertical offset of the bar's lane
    pub fn top_px(&self) -> f64 {
        self.lane as f64 * ROW_HEIGHT_PX
    }
}

/// Result of one layout pass
#[derive(Debug, Clone, PartialEq)]
pub struct RoadmapLayout {
    pub period: Period,
    /// Bars in packing order (left ascending, ties by id)
    pub bars: Vec<PlacedBar>,
    pub lane_count: usize,
    /// Features without a usable start/end date
    pub unscheduled: usize,
}

impl RoadmapLayout {
    /// Bars ordered top-to-bottom, then left-to-right
    pub fn reading_order(&self) -> Vec<&PlacedBar> {
        let mut bars: Vec<&PlacedBar> = self.bars.iter().collect();
        bars.sort_by(|a, b| {
            a.lane
                .cmp(&b.lane)
                .then_with(|| a.position.left.total_cmp(&b.position.left))
                .then_with(|| a.feature_id.cmp(&b.feature_id))
        });
        bars
    }
}

/// Run the full layout for `features` on a container `container_width_px` wide.
pub fn layout_roadmap(
    features: &[FeatureDto],
    reference: Option<NaiveDate>,
    zoom: ZoomLevel,
    container_width_px: f64,
) -> RoadmapLayout {
    let period = generate_period(reference, zoom);

    let unscheduled = features.iter().filter(|f| !f.is_scheduled()).count();
    let positioned: Vec<(Uuid, BarPosition)> = features
        .iter()
        .filter_map(|f| {
            map_position(f, period.start, period.end, container_width_px).map(|pos| (f.id, pos))
        })
        .collect();

    let lanes = pack_rows(&positioned);

    let mut bars: Vec<PlacedBar> = positioned
        .iter()
        .filter_map(|(id, position)| {
            lanes.lane_of(id).map(|lane| PlacedBar {
                feature_id: *id,
                position: *position,
                lane,
            })
        })
        .collect();
    bars.sort_by(|a, b| {
        a.position
            .left
            .total_cmp(&b.position.left)
            .then_with(|| a.feature_id.cmp(&b.feature_id))
    });

    tracing::trace!(
        zoom = %zoom,
        start = %period.start,
        end = %period.end,
        placed = bars.len(),
        lanes = lanes.lane_count(),
        unscheduled,
        "roadmap layout"
    );

    RoadmapLayout {
        period,
        bars,
        lane_count: lanes.lane_count(),
        unscheduled,
    }
}
