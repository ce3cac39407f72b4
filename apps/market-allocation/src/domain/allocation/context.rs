//! Allocation context: the resolved market plus the sorted vendor roster.
//!
//! Built once per run. Everything in here is fixed for the run; whatever
//! changes while vendors are placed lives in [`AllocationState`].

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::state::AllocationState;
use crate::domain::market::{Market, Stall, any_stall, parse_market_date};
use crate::domain::seed::MarketSeed;
use crate::domain::shared::{CategoryId, RegistrationNumber, StallIndex, VendorIndex};
use crate::domain::vendor::set::count_preferences_for;
use crate::domain::vendor::{
    LocationPreference, RankedStall, Vendor, never_leave_set, ranked_preferences,
};
use crate::error::AllocationResult;

/// Cached per-vendor facts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorFacts {
    /// Owned stalls the market knows.
    pub owned: Vec<StallIndex>,
    /// Whether an owned stall id is unknown to the market.
    pub owned_unresolved: bool,
    /// Preferences best first, own stalls included.
    pub ranked: Vec<RankedStall>,
    /// Whether any preference points away from the own stalls.
    pub wants_relocation: bool,
    /// Stalls this vendor keeps whatever happens.
    pub never_leave: Vec<StallIndex>,
    /// Fewest stalls accepted.
    pub minimum: usize,
    /// Stalls wanted.
    pub target: usize,
    /// Size of the first attempt.
    pub start: usize,
    /// Fixed-place holder.
    pub fixed: bool,
    /// Status forbids relocation.
    pub probationary: bool,
    /// Any stall will do.
    pub accepts_any: bool,
    /// Only equipment-suitable stalls fit.
    pub needs_equipment: bool,
    /// Declared market categories that are mandatory.
    pub mandatory: Vec<CategoryId>,
    /// Declared market categories with a cap, in declaration order.
    pub capped: Vec<(CategoryId, usize)>,
    /// Declared category with the smallest cap.
    pub most_constrained: Option<CategoryId>,
}

impl VendorFacts {
    fn derive(
        market: &Market,
        vendor: &Vendor,
        preferences: &[LocationPreference],
    ) -> Self {
        let owned: Vec<StallIndex> = vendor
            .owned_stalls
            .iter()
            .filter_map(|id| market.resolve_stall(id))
            .collect();
        let explicit: Vec<RankedStall> = preferences
            .iter()
            .filter(|preference| preference.vendor == vendor.registration)
            .filter_map(|preference| {
                Some(RankedStall {
                    stall: market.resolve_stall(&preference.stall)?,
                    priority: preference.priority,
                })
            })
            .collect();

        let ranked = ranked_preferences(vendor, &owned, &explicit, true);
        let wants_relocation = !ranked_preferences(vendor, &owned, &explicit, false).is_empty();
        let minimum = vendor.minimum_size();
        let never_leave = never_leave_set(market.layout(), &ranked, minimum);

        let declared = vendor.declared_categories(market);

        Self {
            owned_unresolved: owned.len() < vendor.owned_stalls.len(),
            owned,
            ranked,
            wants_relocation,
            never_leave,
            minimum,
            target: vendor.target_size(),
            start: vendor.start_size(),
            fixed: vendor.status.is_fixed(),
            probationary: vendor.status.is_probationary(),
            accepts_any: vendor.accepts_any_stall(),
            needs_equipment: vendor.needs_equipment(),
            mandatory: declared
                .iter()
                .filter(|category| category.mandatory)
                .map(|category| category.id.clone())
                .collect(),
            capped: declared
                .iter()
                .filter_map(|category| Some((category.id.clone(), category.effective_cap()?)))
                .collect(),
            most_constrained: vendor
                .most_constrained_category(market)
                .map(|category| category.id.clone()),
        }
    }

    /// Whether the vendor owns this stall.
    #[must_use]
    pub fn owns(&self, stall: StallIndex) -> bool {
        self.owned.contains(&stall)
    }

    /// Rank of a preferred stall.
    #[must_use]
    pub fn priority_of(&self, stall: StallIndex) -> Option<u64> {
        self.ranked
            .iter()
            .find(|ranked| ranked.stall == stall)
            .map(|ranked| ranked.priority)
    }

    /// Whether the stall is among the preferences, own stalls included.
    #[must_use]
    pub fn prefers(&self, stall: StallIndex) -> bool {
        self.ranked.iter().any(|ranked| ranked.stall == stall)
    }
}

/// The resolved market and the attending vendors in processing order.
#[derive(Debug, Clone)]
pub struct AllocationContext {
    market: Market,
    vendors: Vec<Vendor>,
    facts: Vec<VendorFacts>,
    owners: HashMap<StallIndex, VendorIndex>,
    contention: Vec<usize>,
    spread: Vec<u64>,
    a_list: Vec<VendorIndex>,
    expansion_limit: usize,
}

impl AllocationContext {
    /// Build the context for a seed.
    ///
    /// Keeps the attending vendors (first occurrence per registration number
    /// or seniority), normalises holders without a registered stall, drops
    /// preferences of absent vendors, and sorts the roster by priority tier
    /// with seniority as tie-break.
    ///
    /// # Errors
    ///
    /// Fails on a missing or unparseable market date and on rows naming
    /// unknown stalls.
    pub fn initialize(seed: &MarketSeed) -> AllocationResult<Self> {
        let date = parse_market_date(seed.market_date.as_deref())?;
        let market = Market::resolve(
            seed.market_id.clone(),
            date,
            seed.stalls.clone(),
            &seed.rows,
            seed.categories.clone(),
            &seed.obstacles,
        )?;

        let mut attending: Vec<Vendor> = Vec::new();
        for vendor in &seed.vendors {
            let record = seed
                .attendance
                .iter()
                .find(|record| record.vendor == vendor.registration && record.applies_to(date));
            if !vendor.attends(date, record) {
                continue;
            }
            let duplicate = attending.iter().any(|kept| {
                kept.registration == vendor.registration || kept.seniority == vendor.seniority
            });
            if duplicate {
                debug!(vendor = %vendor.registration, "Skipping duplicate vendor record");
                continue;
            }
            attending.push(vendor.clone().normalized());
        }

        let present: HashSet<&RegistrationNumber> =
            attending.iter().map(|vendor| &vendor.registration).collect();
        let preferences: Vec<LocationPreference> = seed
            .preferences
            .iter()
            .filter(|preference| present.contains(&preference.vendor))
            .cloned()
            .collect();

        let expansion_limit = seed.expansion_limit.unwrap_or_else(|| market.stall_count());

        let provisional = Self::build(
            market,
            attending,
            &preferences,
            &seed.a_list,
            expansion_limit,
        );
        let initial = provisional.initial_state();

        let mut order: Vec<(u32, u64, Vendor)> = provisional
            .roster()
            .map(|vendor| {
                (
                    provisional.priority_score(&initial, vendor),
                    provisional.vendor(vendor).seniority,
                    provisional.vendor(vendor).clone(),
                )
            })
            .collect();
        order.sort_by_key(|(score, seniority, _)| (*score, *seniority));

        let Self { market, .. } = provisional;
        let sorted = order.into_iter().map(|(_, _, vendor)| vendor).collect();
        let context = Self::build(market, sorted, &preferences, &seed.a_list, expansion_limit);

        debug!(
            market_id = %context.market.id(),
            vendors = context.vendors.len(),
            stalls = context.market.stall_count(),
            active = context.market.active_stalls().len(),
            a_list = context.a_list.len(),
            expansion_limit,
            "Allocation context initialized"
        );

        Ok(context)
    }

    fn build(
        market: Market,
        vendors: Vec<Vendor>,
        preferences: &[LocationPreference],
        a_list: &[RegistrationNumber],
        expansion_limit: usize,
    ) -> Self {
        let facts: Vec<VendorFacts> = vendors
            .iter()
            .map(|vendor| VendorFacts::derive(&market, vendor, preferences))
            .collect();

        let mut owners = HashMap::new();
        for (position, vendor_facts) in facts.iter().enumerate() {
            for &stall in &vendor_facts.owned {
                owners.entry(stall).or_insert(VendorIndex::new(position));
            }
        }

        let contention: Vec<usize> = (0..market.stall_count())
            .map(|position| {
                count_preferences_for(preferences, market.stall_id(StallIndex::new(position)))
            })
            .collect();

        let spread = (0..market.stall_count())
            .map(|position| {
                let stall = StallIndex::new(position);
                market
                    .layout()
                    .adjacent_both_sides(stall, usize::MAX, any_stall)
                    .map_or(u64::MAX, |sides| {
                        sides
                            .iter()
                            .map(|side| {
                                side.iter()
                                    .position(|next| contention[next.get()] > 0)
                                    .map_or(u64::MAX, |distance| distance as u64)
                            })
                            .min()
                            .unwrap_or(u64::MAX)
                    })
            })
            .collect();

        let mut a_list_members = Vec::new();
        for registration in a_list {
            let found = vendors
                .iter()
                .position(|vendor| &vendor.registration == registration)
                .map(VendorIndex::new);
            if let Some(member) = found.filter(|member| !a_list_members.contains(member)) {
                a_list_members.push(member);
            }
        }

        Self {
            market,
            vendors,
            facts,
            owners,
            contention,
            spread,
            a_list: a_list_members,
            expansion_limit,
        }
    }

    /// The resolved market.
    #[must_use]
    pub const fn market(&self) -> &Market {
        &self.market
    }

    /// Vendor in the roster.
    #[must_use]
    pub fn vendor(&self, vendor: VendorIndex) -> &Vendor {
        &self.vendors[vendor.get()]
    }

    /// Cached facts for a vendor.
    #[must_use]
    pub fn facts(&self, vendor: VendorIndex) -> &VendorFacts {
        &self.facts[vendor.get()]
    }

    /// Number of attending vendors.
    #[must_use]
    pub fn vendor_count(&self) -> usize {
        self.vendors.len()
    }

    /// Vendors in processing order.
    pub fn roster(&self) -> impl Iterator<Item = VendorIndex> + use<> {
        (0..self.vendors.len()).map(VendorIndex::new)
    }

    /// Roster index of a registration number.
    #[must_use]
    pub fn find_vendor(&self, registration: &RegistrationNumber) -> Option<VendorIndex> {
        self.vendors
            .iter()
            .position(|vendor| &vendor.registration == registration)
            .map(VendorIndex::new)
    }

    /// Priority-list members, in list order.
    #[must_use]
    pub fn a_list(&self) -> &[VendorIndex] {
        &self.a_list
    }

    /// Whether the vendor is on the priority list.
    #[must_use]
    pub fn on_a_list(&self, vendor: VendorIndex) -> bool {
        self.a_list.contains(&vendor)
    }

    /// Number of expansion rounds.
    #[must_use]
    pub const fn expansion_limit(&self) -> usize {
        self.expansion_limit
    }

    /// First vendor in the roster holding the stall.
    #[must_use]
    pub fn owner_of(&self, stall: StallIndex) -> Option<VendorIndex> {
        self.owners.get(&stall).copied()
    }

    /// Distinct vendors with an explicit preference for the stall.
    #[must_use]
    pub fn contention(&self, stall: StallIndex) -> usize {
        self.contention[stall.get()]
    }

    /// Hops to the nearest stall anybody explicitly prefers; `u64::MAX` if none.
    #[must_use]
    pub fn spread(&self, stall: StallIndex) -> u64 {
        self.spread[stall.get()]
    }

    /// State with every active stall open.
    #[must_use]
    pub fn initial_state(&self) -> AllocationState {
        AllocationState::new(self.market.active_stalls().to_vec())
    }

    /// Whether a stall is free for the requester.
    ///
    /// An open stall stays reserved while it lies in the never-leave core of
    /// another holder.
    #[must_use]
    pub fn is_available(
        &self,
        state: &AllocationState,
        stall: StallIndex,
        requester: VendorIndex,
    ) -> bool {
        if !state.is_open(stall) {
            return false;
        }
        match self.owner_of(stall) {
            None => true,
            Some(owner) if owner == requester => true,
            Some(owner) => !self.facts(owner).never_leave.contains(&stall),
        }
    }

    /// Whether a fixed-place holder wants or has to relocate.
    #[must_use]
    pub fn will_move(&self, state: &AllocationState, vendor: VendorIndex) -> bool {
        let facts = self.facts(vendor);
        if facts.probationary {
            return false;
        }

        facts.owned_unresolved
            || facts
                .owned
                .iter()
                .any(|&stall| !self.is_available(state, stall, vendor))
            || facts.wants_relocation
    }

    /// Processing tier; lower goes first.
    #[must_use]
    pub fn priority_score(&self, state: &AllocationState, vendor: VendorIndex) -> u32 {
        let record = self.vendor(vendor);
        let facts = self.facts(vendor);

        let tier = if record.has_owned_stalls() && !self.will_move(state, vendor) {
            0
        } else if record.in_mandatory_category(&self.market) {
            2
        } else if facts.needs_equipment {
            8
        } else {
            32
        };

        if facts.fixed { tier >> 1 } else { tier }
    }

    /// Whether the vendor may be placed on a stall from `candidates`.
    ///
    /// Own stalls skip the category, equipment and preference checks.
    #[must_use]
    pub fn can_be_assigned(
        &self,
        state: &AllocationState,
        vendor: VendorIndex,
        candidates: &[StallIndex],
        stall: StallIndex,
        anywhere: bool,
    ) -> bool {
        if !self.is_available(state, stall, vendor) || !candidates.contains(&stall) {
            return false;
        }

        let facts = self.facts(vendor);
        if facts.owns(stall) {
            return true;
        }

        let place: &Stall = self.market.stall(stall);
        let category_mismatch = !facts.mandatory.is_empty()
            && !place
                .categories
                .iter()
                .any(|category| facts.mandatory.contains(category));
        let equipment_mismatch = facts.needs_equipment && !place.equipment_suitable;
        let not_preferred = !anywhere && !facts.prefers(stall);

        !(category_mismatch || equipment_mismatch || not_preferred)
    }
}
