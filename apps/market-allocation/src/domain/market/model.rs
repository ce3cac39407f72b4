//! Resolved market: stalls indexed, rows resolved, categories normalised.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};

use super::layout::{Layout, Obstacle, Row};
use super::stall::{Category, Stall};
use crate::domain::shared::{CategoryId, MarketId, StallId, StallIndex};
use crate::error::{AllocationError, AllocationResult};

/// One market event on one date, with stall ids resolved to indices.
#[derive(Debug, Clone)]
pub struct Market {
    id: MarketId,
    date: NaiveDate,
    stalls: Vec<Stall>,
    index: HashMap<StallId, StallIndex>,
    active: Vec<StallIndex>,
    categories: Vec<Category>,
    layout: Layout,
}

impl Market {
    /// Resolve raw market data.
    ///
    /// Duplicate stall ids collapse to the first occurrence. Every row entry
    /// must name a known stall; obstacles touching unknown stalls are dropped.
    /// A mandatory category without a cap is capped at the number of active
    /// stalls carrying it.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::UnknownStall`] when a row names a stall
    /// that is not in `stalls`.
    pub fn resolve(
        id: MarketId,
        date: NaiveDate,
        stalls: Vec<Stall>,
        rows: &[Vec<StallId>],
        categories: Vec<Category>,
        obstacles: &[Obstacle],
    ) -> AllocationResult<Self> {
        let mut unique = Vec::with_capacity(stalls.len());
        let mut index = HashMap::with_capacity(stalls.len());
        for stall in stalls {
            if index.contains_key(&stall.id) {
                continue;
            }
            index.insert(stall.id.clone(), StallIndex::new(unique.len()));
            unique.push(stall);
        }

        let active = unique
            .iter()
            .enumerate()
            .filter(|(_, stall)| stall.active)
            .map(|(position, _)| StallIndex::new(position))
            .collect();

        let mut resolved_rows = Vec::with_capacity(rows.len());
        for (row_number, row) in rows.iter().enumerate() {
            let mut resolved = Vec::with_capacity(row.len());
            for stall in row {
                let Some(&position) = index.get(stall) else {
                    return Err(AllocationError::UnknownStall {
                        row: row_number,
                        stall: stall.to_string(),
                    });
                };
                resolved.push(position);
            }
            resolved_rows.push(Row::new(resolved));
        }

        let blocked: Vec<(StallIndex, StallIndex)> = obstacles
            .iter()
            .filter_map(|obstacle| {
                Some((*index.get(&obstacle.stall_a)?, *index.get(&obstacle.stall_b)?))
            })
            .collect();

        let mut market = Self {
            id,
            date,
            stalls: unique,
            index,
            active,
            categories,
            layout: Layout::new(resolved_rows, blocked),
        };
        market.cap_mandatory_categories();

        Ok(market)
    }

    fn cap_mandatory_categories(&mut self) {
        let counts: Vec<Option<usize>> = self
            .categories
            .iter()
            .map(|category| {
                (category.mandatory && category.effective_cap().is_none()).then(|| {
                    self.active
                        .iter()
                        .filter(|stall| self.stalls[stall.get()].has_category(&category.id))
                        .count()
                })
            })
            .collect();

        for (category, count) in self.categories.iter_mut().zip(counts) {
            if count.is_some() {
                category.cap = count;
            }
        }
    }

    /// Market id.
    #[must_use]
    pub const fn id(&self) -> &MarketId {
        &self.id
    }

    /// Market date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Stall at an index.
    ///
    /// Indices only come from this market, so lookups are in bounds.
    #[must_use]
    pub fn stall(&self, stall: StallIndex) -> &Stall {
        &self.stalls[stall.get()]
    }

    /// Id of the stall at an index.
    #[must_use]
    pub fn stall_id(&self, stall: StallIndex) -> &StallId {
        &self.stall(stall).id
    }

    /// Index of a stall id, if the market knows it.
    #[must_use]
    pub fn resolve_stall(&self, id: &StallId) -> Option<StallIndex> {
        self.index.get(id).copied()
    }

    /// Total number of distinct stalls, active or not.
    #[must_use]
    pub fn stall_count(&self) -> usize {
        self.stalls.len()
    }

    /// Active stalls in input order.
    #[must_use]
    pub fn active_stalls(&self) -> &[StallIndex] {
        &self.active
    }

    /// Categories in input order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Category by id.
    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| &category.id == id)
    }

    /// Rows and obstacles.
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }
}

/// Parse a market date given as `YYYY-MM-DD` or as an RFC 3339 timestamp.
///
/// # Errors
///
/// Returns [`AllocationError::MissingMarketDate`] for an absent or blank
/// value and [`AllocationError::InvalidMarketDate`] when neither format
/// matches.
pub fn parse_market_date(raw: Option<&str>) -> AllocationResult<NaiveDate> {
    let raw = raw.map(str::trim).filter(|raw| !raw.is_empty());
    let Some(raw) = raw else {
        return Err(AllocationError::MissingMarketDate);
    };

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| AllocationError::InvalidMarketDate(raw.to_string()))
}
