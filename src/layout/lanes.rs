use std::cmp::Reverse;

use crate::ir::Figure;

/// Lane index per figure, addressed by the figure's position in the input
/// slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneAssignment {
    lanes: Vec<usize>,
    lane_count: usize,
}

impl LaneAssignment {
    pub fn lane_of(&self, index: usize) -> usize {
        self.lanes[index]
    }

    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.lanes
    }

    /// `(figure index, lane)` pairs in input order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.lanes.iter().copied().enumerate()
    }
}

/// Packs figures into the fewest lanes such that no two figures sharing a
/// lane overlap. Figures are visited from the latest end year backwards; each
/// lane remembers the start year of its most recent occupant and the first
/// lane that is free through the figure's end year wins.
pub fn assign_lanes(figures: &[Figure]) -> LaneAssignment {
    let mut order: Vec<usize> = (0..figures.len()).collect();
    // Stable, so equal end years keep input order.
    order.sort_by_key(|&idx| Reverse(figures[idx].end_year));

    let mut frontiers: Vec<i32> = Vec::new();
    let mut lanes = vec![0usize; figures.len()];

    for idx in order {
        let figure = &figures[idx];
        match frontiers
            .iter()
            .position(|&frontier| frontier >= figure.end_year)
        {
            Some(lane) => {
                frontiers[lane] = figure.start_year;
                lanes[idx] = lane;
            }
            None => {
                lanes[idx] = frontiers.len();
                frontiers.push(figure.start_year);
            }
        }
    }

    tracing::debug!(
        figures = figures.len(),
        lanes = frontiers.len(),
        "assigned lanes"
    );

    LaneAssignment {
        lanes,
        lane_count: frontiers.len(),
    }
}
