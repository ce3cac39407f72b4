//! Layout and adjacency engine.
//!
//! Rows define physical adjacency. A row whose first stall repeats at the end
//! is circular. Stalls in different rows are never adjacent, and an obstacle
//! blocks the boundary between two otherwise adjacent stalls.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::shared::{StallId, StallIndex};

/// Layout precondition failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// None of the requested stalls lies in any row.
    #[error("no row contains the requested stalls")]
    NoRow,

    /// The requested stalls are spread over more than one row.
    #[error("stalls span more than one row: {found} of {expected} in the first matching row")]
    SplitAcrossRows {
        /// Number of requested stalls found in the first matching row.
        found: usize,
        /// Number of requested stalls.
        expected: usize,
    },
}

/// A blocked boundary between two stalls, as given in the seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    /// One side of the boundary.
    pub stall_a: StallId,
    /// The other side of the boundary.
    pub stall_b: StallId,
    /// What is in the way (tree, lamp post, walkway).
    #[serde(default)]
    pub kind: Option<String>,
}

impl Obstacle {
    /// Create an obstacle between two stalls.
    #[must_use]
    pub fn between(stall_a: impl Into<StallId>, stall_b: impl Into<StallId>) -> Self {
        Self {
            stall_a: stall_a.into(),
            stall_b: stall_b.into(),
            kind: None,
        }
    }
}

/// Walking direction along a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the start of the row.
    Lower,
    /// Toward the end of the row.
    Higher,
}

/// Filter accepting every stall.
#[must_use]
pub const fn any_stall(_: StallIndex) -> bool {
    true
}

/// One physical row of stalls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    stalls: Vec<StallIndex>,
    positions: HashMap<StallIndex, usize>,
    circular: bool,
}

impl Row {
    /// Build a row. A trailing repeat of the first stall marks it circular
    /// and is dropped.
    #[must_use]
    pub fn new(mut stalls: Vec<StallIndex>) -> Self {
        let circular = stalls.len() >= 2 && stalls.first() == stalls.last();
        if circular {
            stalls.pop();
        }

        let mut positions = HashMap::with_capacity(stalls.len());
        for (position, stall) in stalls.iter().enumerate() {
            positions.entry(*stall).or_insert(position);
        }

        Self {
            stalls,
            positions,
            circular,
        }
    }

    /// Stalls in row order, without the circular repeat.
    #[must_use]
    pub fn stalls(&self) -> &[StallIndex] {
        &self.stalls
    }

    /// Whether the row wraps around.
    #[must_use]
    pub const fn is_circular(&self) -> bool {
        self.circular
    }

    /// Number of distinct positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stalls.len()
    }

    /// Whether the row has no stalls.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stalls.is_empty()
    }

    /// Position of a stall in this row.
    #[must_use]
    pub fn position(&self, stall: StallIndex) -> Option<usize> {
        self.positions.get(&stall).copied()
    }

    /// Whether the stall lies in this row.
    #[must_use]
    pub fn contains(&self, stall: StallIndex) -> bool {
        self.positions.contains_key(&stall)
    }

    /// Shortest contiguous segment of this row holding every given stall.
    ///
    /// ```text
    /// row:    1 2 3 4 5 6
    /// stalls:   2   4 5
    /// result:   2 3 4 5
    /// ```
    #[must_use]
    pub fn trim(&self, stalls: &[StallIndex]) -> Vec<StallIndex> {
        let mut pending = stalls.to_vec();
        let mut trimmed = Vec::new();

        for &stall in &self.stalls {
            if pending.is_empty() {
                break;
            }
            if let Some(found) = pending.iter().position(|s| *s == stall) {
                pending.swap_remove(found);
            } else if trimmed.is_empty() {
                continue;
            }
            trimmed.push(stall);
        }

        trimmed
    }

    fn step(&self, from: usize, direction: Direction) -> Option<usize> {
        let len = self.stalls.len();
        match (self.circular, direction) {
            (true, Direction::Lower) => Some((from + len - 1) % len),
            (true, Direction::Higher) => Some((from + 1) % len),
            (false, Direction::Lower) => from.checked_sub(1),
            (false, Direction::Higher) => (from + 1 < len).then_some(from + 1),
        }
    }
}

/// Rows plus obstacles for one market.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    rows: Vec<Row>,
    obstacles: HashSet<(StallIndex, StallIndex)>,
}

impl Layout {
    /// Build a layout from resolved rows and obstacle pairs.
    #[must_use]
    pub fn new(rows: Vec<Row>, obstacles: impl IntoIterator<Item = (StallIndex, StallIndex)>) -> Self {
        Self {
            rows,
            obstacles: obstacles.into_iter().map(|(a, b)| ordered(a, b)).collect(),
        }
    }

    /// All rows.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Whether an obstacle blocks the boundary between two stalls.
    #[must_use]
    pub fn has_obstacle_between(&self, a: StallIndex, b: StallIndex) -> bool {
        self.obstacles.contains(&ordered(a, b))
    }

    /// The first row holding any of `stalls`; fails unless it holds all of them.
    pub fn row_for(&self, stalls: &[StallIndex]) -> Result<&Row, LayoutError> {
        let row = self
            .rows
            .iter()
            .find(|row| stalls.iter().any(|s| row.contains(*s)))
            .ok_or(LayoutError::NoRow)?;

        let found = stalls.iter().filter(|s| row.contains(**s)).count();
        if found != stalls.len() {
            return Err(LayoutError::SplitAcrossRows {
                found,
                expected: stalls.len(),
            });
        }

        Ok(row)
    }

    /// Walk from `stall` in one direction for up to `depth` hops.
    ///
    /// Stops at the row boundary, at an obstacle, or at the first stall
    /// failing `filter`. Circular rows wrap but never revisit the start.
    pub fn adjacent_to<F>(
        &self,
        stall: StallIndex,
        direction: Direction,
        depth: usize,
        filter: F,
    ) -> Result<Vec<StallIndex>, LayoutError>
    where
        F: Fn(StallIndex) -> bool,
    {
        let row = self.row_for(&[stall])?;
        Ok(self.walk(row, stall, direction, depth, &filter))
    }

    /// The two directional walks from a stall: `[lower, higher]`.
    pub fn adjacent_both_sides<F>(
        &self,
        stall: StallIndex,
        depth: usize,
        filter: F,
    ) -> Result<[Vec<StallIndex>; 2], LayoutError>
    where
        F: Fn(StallIndex) -> bool,
    {
        if depth == 0 {
            return Ok([Vec::new(), Vec::new()]);
        }

        let row = self.row_for(&[stall])?;
        Ok([
            self.walk(row, stall, Direction::Lower, depth, &filter),
            self.walk(row, stall, Direction::Higher, depth, &filter),
        ])
    }

    /// Stalls reachable from any of `stalls` within `depth` hops, excluding
    /// the input stalls. Lower-side stalls come before higher-side ones.
    pub fn adjacent_to_set<F>(
        &self,
        stalls: &[StallIndex],
        depth: usize,
        filter: F,
    ) -> Result<Vec<StallIndex>, LayoutError>
    where
        F: Fn(StallIndex) -> bool,
    {
        self.row_for(stalls)?;

        let mut result = Vec::new();
        for &stall in stalls {
            let [lower, higher] = self.adjacent_both_sides(stall, depth, &filter)?;
            for neighbour in lower.into_iter().chain(higher) {
                if !stalls.contains(&neighbour) && !result.contains(&neighbour) {
                    result.push(neighbour);
                }
            }
        }

        Ok(result)
    }

    /// Partition candidates into runs of row-adjacent stalls.
    ///
    /// The first remaining candidate seeds each run, which then grows toward
    /// lower positions and afterwards toward higher ones. Candidates failing
    /// `filter` are dropped, and growth stops at a neighbour failing it.
    pub fn group_contiguous<T, K, F>(&self, candidates: &[T], key: K, filter: F) -> Vec<Vec<T>>
    where
        T: Clone,
        K: Fn(&T) -> StallIndex,
        F: Fn(StallIndex) -> bool,
    {
        let mut remaining: Vec<T> = candidates
            .iter()
            .filter(|candidate| filter(key(*candidate)))
            .cloned()
            .collect();
        let mut groups = Vec::new();

        while !remaining.is_empty() {
            let seed = remaining.remove(0);
            let seed_stall = key(&seed);
            let mut group = VecDeque::from([seed]);

            for direction in [Direction::Lower, Direction::Higher] {
                let mut current = seed_stall;
                while let Some(next) = self.neighbour(current, direction, &filter) {
                    let Some(found) = remaining.iter().position(|c| key(c) == next) else {
                        break;
                    };
                    let item = remaining.remove(found);
                    match direction {
                        Direction::Lower => group.push_front(item),
                        Direction::Higher => group.push_back(item),
                    }
                    current = next;
                }
            }

            groups.push(group.into_iter().collect());
        }

        groups
    }

    fn neighbour<F>(&self, stall: StallIndex, direction: Direction, filter: &F) -> Option<StallIndex>
    where
        F: Fn(StallIndex) -> bool,
    {
        let row = self.row_for(&[stall]).ok()?;
        self.walk(row, stall, direction, 1, filter).first().copied()
    }

    fn walk<F>(
        &self,
        row: &Row,
        stall: StallIndex,
        direction: Direction,
        depth: usize,
        filter: &F,
    ) -> Vec<StallIndex>
    where
        F: Fn(StallIndex) -> bool,
    {
        let Some(mut current) = row.position(stall) else {
            return Vec::new();
        };
        let reachable = if row.is_circular() {
            row.len().saturating_sub(1)
        } else {
            row.len()
        };

        let mut places = Vec::new();
        for _ in 0..depth.min(reachable) {
            let Some(next) = row.step(current, direction) else {
                break;
            };
            let (here, there) = (row.stalls[current], row.stalls[next]);
            if self.has_obstacle_between(here, there) || !filter(there) {
                break;
            }
            places.push(there);
            current = next;
        }

        places
    }
}

fn ordered(a: StallIndex, b: StallIndex) -> (StallIndex, StallIndex) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Stall "n" maps to index n - 1 in these fixtures.
    fn s(id: usize) -> StallIndex {
        StallIndex::new(id - 1)
    }

    fn layout(rows: &[&[usize]], obstacles: &[(usize, usize)]) -> Layout {
        Layout::new(
            rows.iter()
                .map(|row| Row::new(row.iter().map(|id| s(*id)).collect()))
                .collect(),
            obstacles.iter().map(|(a, b)| (s(*a), s(*b))),
        )
    }

    fn ids(stalls: &[StallIndex]) -> Vec<usize> {
        let mut ids: Vec<usize> = stalls.iter().map(|stall| stall.get() + 1).collect();
        ids.sort_unstable();
        ids
    }

    fn around(layout: &Layout, stalls: &[usize], depth: usize) -> Vec<usize> {
        let stalls: Vec<StallIndex> = stalls.iter().map(|id| s(*id)).collect();
        ids(&layout.adjacent_to_set(&stalls, depth, any_stall).unwrap())
    }

    #[test]
    fn single_stall_row_has_no_neighbours() {
        let layout = layout(&[&[1]], &[]);
        assert!(around(&layout, &[1], 1).is_empty());
        assert!(around(&layout, &[1], 2).is_empty());
    }

    #[test]
    fn walks_one_side_at_row_ends() {
        let layout = layout(&[&[1, 2, 3, 4, 5, 6]], &[]);
        assert_eq!(around(&layout, &[1], 1), vec![2]);
        assert_eq!(around(&layout, &[1], 2), vec![2, 3]);
        assert_eq!(around(&layout, &[6], 1), vec![5]);
        assert_eq!(around(&layout, &[6], 2), vec![4, 5]);
    }

    #[test]
    fn walks_both_sides_in_the_middle() {
        let layout = layout(&[&[1, 2, 3, 4, 5, 6]], &[]);
        assert_eq!(around(&layout, &[2], 1), vec![1, 3]);
        assert_eq!(around(&layout, &[2], 2), vec![1, 3, 4]);
        assert_eq!(around(&layout, &[3], 2), vec![1, 2, 4, 5]);
    }

    #[test]
    fn filter_stops_the_walk() {
        let layout = layout(&[&[1, 2, 3, 4, 5, 6]], &[]);
        let walk = layout
            .adjacent_to_set(&[s(1)], 2, |stall| stall != s(3))
            .unwrap();
        assert_eq!(ids(&walk), vec![2]);

        let walk = layout
            .adjacent_to_set(&[s(1)], 2, |stall| stall != s(2))
            .unwrap();
        assert!(walk.is_empty());

        let walk = layout
            .adjacent_to_set(&[s(3)], 2, |stall| stall != s(2))
            .unwrap();
        assert_eq!(ids(&walk), vec![4, 5]);
    }

    #[test]
    fn never_crosses_into_another_row() {
        let layout = layout(&[&[3, 4, 5, 6], &[23, 22]], &[]);
        assert_eq!(around(&layout, &[6], 1), vec![5]);
        assert_eq!(around(&layout, &[6], 5), vec![3, 4, 5]);
    }

    #[test]
    fn multi_stall_needles_exclude_themselves() {
        let layout = layout(&[&[1, 2, 3, 4, 5, 6, 7, 8]], &[]);
        assert!(around(&layout, &[1, 2, 3, 4, 5, 6, 7, 8], 3).is_empty());
        assert_eq!(around(&layout, &[1, 2], 2), vec![3, 4]);
        assert_eq!(around(&layout, &[5, 6], 3), vec![2, 3, 4, 7, 8]);
        assert_eq!(around(&layout, &[3, 4], 3), vec![1, 2, 5, 6, 7]);
    }

    #[test]
    fn circular_rows_wrap_around() {
        let layout = layout(&[&[1, 2, 3, 4, 5, 6, 1]], &[]);
        assert_eq!(around(&layout, &[1], 1), vec![2, 6]);
        assert_eq!(around(&layout, &[1], 2), vec![2, 3, 5, 6]);
        assert_eq!(around(&layout, &[6], 3), vec![1, 2, 3, 4, 5]);
        assert_eq!(around(&layout, &[1, 2], 2), vec![3, 4, 5, 6]);
        assert_eq!(around(&layout, &[5, 6], 1), vec![1, 4]);
        assert_eq!(around(&layout, &[6], usize::MAX), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn circular_walk_never_revisits_the_start() {
        let layout = layout(&[&[1, 2, 3, 1]], &[]);
        let [lower, higher] = layout.adjacent_both_sides(s(1), usize::MAX, any_stall).unwrap();
        assert_eq!(lower, vec![s(3), s(2)]);
        assert_eq!(higher, vec![s(2), s(3)]);
    }

    #[test]
    fn needle_covering_circular_row_has_no_neighbours() {
        let layout = layout(&[&[1, 2, 1]], &[]);
        assert!(around(&layout, &[1, 2], 1).is_empty());
    }

    #[test]
    fn obstacles_block_linear_rows() {
        let layout = layout(&[&[1, 2, 3, 4, 5, 6]], &[(2, 3), (6, 1)]);
        assert_eq!(around(&layout, &[2], 1), vec![1]);
        assert_eq!(around(&layout, &[2], 2), vec![1]);
        assert_eq!(around(&layout, &[3], 2), vec![4, 5]);
        assert_eq!(around(&layout, &[4], 2), vec![3, 5, 6]);
    }

    #[test]
    fn obstacles_block_circular_rows() {
        let layout = layout(&[&[1, 2, 3, 4, 5, 6, 1]], &[(2, 3), (6, 1)]);
        assert_eq!(around(&layout, &[2], 2), vec![1]);
        assert_eq!(around(&layout, &[1], 2), vec![2]);
        assert_eq!(around(&layout, &[4], 3), vec![3, 5, 6]);
    }

    #[test]
    fn zero_depth_walks_nothing() {
        let layout = layout(&[&[1, 2, 3]], &[]);
        let [lower, higher] = layout.adjacent_both_sides(s(2), 0, any_stall).unwrap();
        assert!(lower.is_empty() && higher.is_empty());
    }

    #[test]
    fn adjacent_to_walks_a_single_direction() {
        let layout = layout(&[&[1, 2, 3, 4]], &[]);
        let walk = layout
            .adjacent_to(s(2), Direction::Higher, 5, any_stall)
            .unwrap();
        assert_eq!(walk, vec![s(3), s(4)]);
    }

    #[test]
    fn set_spanning_rows_is_rejected() {
        let layout = layout(&[&[1, 2], &[3, 4]], &[]);
        assert_eq!(
            layout.adjacent_to_set(&[s(2), s(3)], 1, any_stall),
            Err(LayoutError::SplitAcrossRows {
                found: 1,
                expected: 2
            })
        );
        assert_eq!(layout.row_for(&[s(9)]), Err(LayoutError::NoRow));
    }

    #[test]
    fn groups_candidates_into_runs() {
        let layout = layout(
            &[
                &[1, 2, 3, 4, 5, 6],
                &[7, 8, 9, 10],
                &[11, 12, 13, 14, 15, 16, 17],
                &[18, 19, 20, 18],
            ],
            &[(16, 17)],
        );
        let candidates: Vec<StallIndex> = [1, 2, 7, 12, 13, 14, 16, 17, 20, 18]
            .iter()
            .map(|id| s(*id))
            .collect();

        let groups: Vec<Vec<usize>> = layout
            .group_contiguous(&candidates, |stall| *stall, any_stall)
            .iter()
            .map(|group| group.iter().map(|stall| stall.get() + 1).collect())
            .collect();

        assert_eq!(
            groups,
            vec![
                vec![1, 2],
                vec![7],
                vec![12, 13, 14],
                vec![16],
                vec![17],
                vec![20, 18]
            ]
        );
    }

    #[test]
    fn grouping_respects_the_filter() {
        let layout = layout(&[&[1, 2, 3, 4]], &[]);
        let candidates = vec![s(1), s(2), s(3), s(4)];
        let groups = layout.group_contiguous(&candidates, |stall| *stall, |stall| stall != s(3));
        assert_eq!(groups, vec![vec![s(1), s(2)], vec![s(4)]]);
    }

    #[test]
    fn grouping_grows_toward_lower_positions_first() {
        let layout = layout(&[&[1, 2, 3, 4, 5]], &[]);
        let candidates = vec![s(3), s(5), s(2), s(4)];
        let groups = layout.group_contiguous(&candidates, |stall| *stall, any_stall);
        assert_eq!(groups, vec![vec![s(2), s(3), s(4), s(5)]]);
    }

    #[test]
    fn trims_row_to_shortest_span() {
        let row = Row::new((1..=6).map(s).collect());
        let trim = |stalls: &[usize]| -> Vec<usize> {
            let stalls: Vec<StallIndex> = stalls.iter().map(|id| s(*id)).collect();
            row.trim(&stalls).iter().map(|stall| stall.get() + 1).collect()
        };

        assert_eq!(trim(&[1]), vec![1]);
        assert_eq!(trim(&[3]), vec![3]);
        assert_eq!(trim(&[2, 4, 5]), vec![2, 3, 4, 5]);
        assert_eq!(trim(&[1, 6]), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(trim(&[6, 1]), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn circular_marker_is_dropped() {
        let row = Row::new(vec![s(1), s(2), s(3), s(1)]);
        assert!(row.is_circular());
        assert_eq!(row.len(), 3);

        let single = Row::new(vec![s(1)]);
        assert!(!single.is_circular());
        assert_eq!(single.len(), 1);
    }
}
