//! Candidate scoring and stall group selection.
//!
//! Every candidate stall is scored relative to one vendor and the vendors
//! still contending. Scored stalls are ranked, grouped into contiguous runs,
//! and the best window of the requested size is picked from those runs.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::warn;

use super::context::AllocationContext;
use super::state::AllocationState;
use crate::domain::market::any_stall;
use crate::domain::shared::{CategoryId, StallIndex, VendorIndex};
use crate::domain::vendor::set::{count_needing_equipment, relevant_categories};

/// A candidate stall with its scores for one vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredStall {
    /// Candidate stall.
    pub stall: StallIndex,
    /// 0 if not preferred, 1 for an own stall, 1 + rank for a preference.
    pub priority: u64,
    /// Category overlap, 0 (stall belongs to other categories) to 4 (exact).
    pub category: u8,
    /// 1 when equipment need and stall suitability match while it matters.
    pub equipment: u8,
    /// Vendors explicitly preferring this stall; lower is better.
    pub contention: usize,
    /// Distance to the nearest preferred stall; higher is better.
    pub spread: u64,
}

impl ScoredStall {
    /// Ranking order: best candidate first.
    #[must_use]
    pub fn ranking(a: &Self, b: &Self) -> Ordering {
        b.priority
            .cmp(&a.priority)
            .then(b.category.cmp(&a.category))
            .then(b.equipment.cmp(&a.equipment))
            .then(a.contention.cmp(&b.contention))
            .then(b.spread.cmp(&a.spread))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct WindowScore {
    category: u64,
    equipment: u64,
    priority: u64,
    contention: u64,
    spread: u64,
}

impl WindowScore {
    fn of(window: &[ScoredStall]) -> Self {
        window.iter().fold(Self::default(), |sum, scored| Self {
            category: sum.category + u64::from(scored.category),
            equipment: sum.equipment + u64::from(scored.equipment),
            priority: sum.priority.saturating_add(scored.priority),
            contention: sum.contention.saturating_add(scored.contention as u64),
            spread: sum.spread.saturating_add(scored.spread),
        })
    }

    fn beats(&self, other: &Self) -> bool {
        self.category
            .cmp(&other.category)
            .then(self.equipment.cmp(&other.equipment))
            .then(self.priority.cmp(&other.priority))
            .then(other.contention.cmp(&self.contention))
            .then(self.spread.cmp(&other.spread))
            == Ordering::Greater
    }
}

struct Scorer<'c> {
    context: &'c AllocationContext,
    vendor: VendorIndex,
    declared: &'c [CategoryId],
    relevant: HashSet<CategoryId>,
    equipment_matters: bool,
}

impl<'c> Scorer<'c> {
    fn new(context: &'c AllocationContext, contenders: &[VendorIndex], vendor: VendorIndex) -> Self {
        let competing = || contenders.iter().map(|&contender| context.vendor(contender));
        Self {
            context,
            vendor,
            declared: &context.vendor(vendor).profile.categories,
            relevant: relevant_categories(context.market(), competing()),
            equipment_matters: count_needing_equipment(competing()) > 0,
        }
    }

    fn score(&self, stall: StallIndex) -> ScoredStall {
        let facts = self.context.facts(self.vendor);
        let place = self.context.market().stall(stall);

        let branches: Vec<&CategoryId> = place
            .categories
            .iter()
            .filter(|category| self.relevant.contains(*category))
            .collect();
        let shared = branches
            .iter()
            .filter(|category| self.declared.contains(**category))
            .count();
        let category = if shared == 0 && !branches.is_empty() {
            0
        } else if shared == 0 {
            1
        } else if shared < branches.len() {
            2
        } else if self.declared.len() > branches.len() {
            3
        } else {
            4
        };

        let equipment =
            u8::from(self.equipment_matters && facts.needs_equipment == place.equipment_suitable);

        ScoredStall {
            stall,
            priority: facts
                .priority_of(stall)
                .map_or(0, |priority| priority.saturating_add(1)),
            category,
            equipment,
            contention: self.context.contention(stall),
            spread: self.context.spread(stall),
        }
    }
}

impl AllocationContext {
    /// Score candidates for a vendor, best first.
    #[must_use]
    pub fn score_stalls(
        &self,
        contenders: &[VendorIndex],
        vendor: VendorIndex,
        candidates: &[StallIndex],
    ) -> Vec<ScoredStall> {
        let scorer = Scorer::new(self, contenders, vendor);
        let mut scored: Vec<ScoredStall> = candidates.iter().map(|&s| scorer.score(s)).collect();
        scored.sort_by(ScoredStall::ranking);
        scored
    }

    /// Best contiguous group of up to `size` stalls among `candidates`.
    ///
    /// Runs shorter than `size` are topped up with adjacent eligible
    /// candidates; runs shorter than the vendor's minimum are skipped.
    /// Empty when nothing fits.
    #[must_use]
    pub fn find_best_stalls(
        &self,
        state: &AllocationState,
        contenders: &[VendorIndex],
        vendor: VendorIndex,
        candidates: &[StallIndex],
        size: usize,
        anywhere: bool,
    ) -> Vec<StallIndex> {
        let scorer = Scorer::new(self, contenders, vendor);
        let mut scored: Vec<ScoredStall> = candidates.iter().map(|&s| scorer.score(s)).collect();
        scored.sort_by(ScoredStall::ranking);

        let layout = self.market().layout();
        let eligible = |stall, anywhere| self.can_be_assigned(state, vendor, candidates, stall, anywhere);
        let groups = layout.group_contiguous(&scored, |scored| scored.stall, |stall| eligible(stall, anywhere));

        let minimum = size.min(self.facts(vendor).minimum);
        let mut best: Vec<ScoredStall> = Vec::new();

        for mut group in groups {
            if group.len() < size {
                let stalls: Vec<StallIndex> = group.iter().map(|scored| scored.stall).collect();
                match layout.adjacent_to_set(&stalls, size - group.len(), |stall| eligible(stall, true)) {
                    Ok(extra) => {
                        group.extend(extra.into_iter().map(|stall| scorer.score(stall)));
                        group = layout
                            .group_contiguous(&group, |scored| scored.stall, any_stall)
                            .into_iter()
                            .next()
                            .unwrap_or_default();
                    }
                    Err(err) => {
                        warn!(vendor = %vendor, error = %err, "Cannot extend stall group");
                    }
                }
            }

            let width = size.min(group.len());
            if group.len() >= minimum && width > best.len() {
                best = best_window(&group, width);
            }
        }

        best.into_iter().map(|scored| scored.stall).collect()
    }

    /// Best single stall adjacent to an assignment, placement anywhere allowed.
    #[must_use]
    pub fn best_expansion(
        &self,
        state: &AllocationState,
        contenders: &[VendorIndex],
        vendor: VendorIndex,
        assigned: &[StallIndex],
    ) -> Option<StallIndex> {
        if self.available_count(state, vendor) == 0 {
            return None;
        }

        let adjacent = match self.market().layout().adjacent_to_set(assigned, 1, any_stall) {
            Ok(adjacent) => adjacent,
            Err(err) => {
                warn!(vendor = %vendor, error = %err, "Cannot expand assignment");
                return None;
            }
        };

        self.find_best_stalls(state, contenders, vendor, &adjacent, 1, true)
            .first()
            .copied()
    }
}

fn best_window(group: &[ScoredStall], width: usize) -> Vec<ScoredStall> {
    let mut best: Option<(&[ScoredStall], WindowScore)> = None;

    for window in group.windows(width.max(1)).filter(|window| window.len() == width) {
        let score = WindowScore::of(window);
        if best.is_none_or(|(_, best_score)| score.beats(&best_score)) {
            best = Some((window, score));
        }
    }

    best.map(|(window, _)| window.to_vec()).unwrap_or_default()
}
