//! Lane assignment for overlapping bars (greedy first-fit).

use std::collections::BTreeMap;

use uuid::Uuid;

use super::position::BarPosition;

/// Vertical distance between lanes, in px
pub const ROW_HEIGHT_PX: f64 = 44.0;

/// Feature id → lane index, plus how many lanes were opened
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneAssignment {
    lanes: BTreeMap<Uuid, usize>,
    lane_count: usize,
}

impl LaneAssignment {
    pub fn lane_of(&self, id: &Uuid) -> Option<usize> {
        self.lanes.get(id).copied()
    }

    pub fn lane_count(&self) -> usize {
        self.lane_count
    }
}

/// Sort bars by `left` (ties by id) and put each into the first lane where
/// it overlaps nothing already placed, opening a new lane when none fits.
pub fn pack_rows(bars: &[(Uuid, BarPosition)]) -> LaneAssignment {
    let mut order: Vec<&(Uuid, BarPosition)> = bars.iter().collect();
    order.sort_by(|a, b| a.1.left.total_cmp(&b.1.left).then_with(|| a.0.cmp(&b.0)));

    let mut lanes: Vec<Vec<BarPosition>> = Vec::new();
    let mut assignment = LaneAssignment::default();

    for (id, bar) in order {
        let free_lane = lanes
            .iter()
            .position(|placed| placed.iter().all(|other| !other.overlaps(bar)));

        let lane = match free_lane {
            Some(lane) => lane,
            None => {
                lanes.push(Vec::new());
                lanes.len() - 1
            }
        };
        lanes[lane].push(*bar);
        assignment.lanes.insert(*id, lane);
    }

    assignment.lane_count = lanes.len();
    assignment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(left: f64, width: f64) -> BarPosition {
        BarPosition { left, width }
    }

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_overlapping_feature_goes_to_next_lane() {
        let a = (id(1), bar(0.0, 900.0));
        let b = (id(2), bar(400.0, 1000.0));
        let lanes = pack_rows(&[a, b]);

        assert_eq!(lanes.lane_of(&id(1)), Some(0));
        assert_eq!(lanes.lane_of(&id(2)), Some(1));
        assert_eq!(lanes.lane_count(), 2);
    }

    #[test]
    fn test_later_bar_reuses_first_free_lane() {
        let bars = [
            (id(1), bar(0.0, 100.0)),
            (id(2), bar(50.0, 100.0)),
            (id(3), bar(100.0, 100.0)),
            (id(4), bar(160.0, 10.0)),
        ];
        let lanes = pack_rows(&bars);

        assert_eq!(lanes.lane_of(&id(1)), Some(0));
        assert_eq!(lanes.lane_of(&id(2)), Some(1));
        // touches id(1) at 100 but [100, 200) does not overlap [0, 100)
        assert_eq!(lanes.lane_of(&id(3)), Some(0));
        assert_eq!(lanes.lane_of(&id(4)), Some(1));
        assert_eq!(lanes.lane_count(), 2);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let bars = vec![
            (id(9), bar(10.0, 300.0)),
            (id(3), bar(10.0, 300.0)),
            (id(5), bar(0.0, 50.0)),
        ];
        let mut reversed = bars.clone();
        reversed.reverse();

        let first = pack_rows(&bars);
        assert_eq!(first, pack_rows(&reversed));
        assert_eq!(first, pack_rows(&bars));
        // equal `left`: the smaller id is placed first
        assert_eq!(first.lane_of(&id(3)), Some(1));
        assert_eq!(first.lane_of(&id(9)), Some(2));
    }

    #[test]
    fn test_empty_input() {
        let lanes = pack_rows(&[]);
        assert_eq!(lanes, LaneAssignment::default());
        assert_eq!(lanes.lane_count(), 0);
    }
}
