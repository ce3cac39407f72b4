//! Scenario builder for allocation tests.
//!
//! Stalls get ids "1", "2", ... in one row unless rows are given. Vendors
//! get seniority 1, 2, ... and registration numbers from 1970010101 in the
//! order they are added. Without explicit attendance everybody attends.

#![allow(dead_code, clippy::unwrap_used)]

use chrono::NaiveDate;
use market_allocation::domain::allocation::{AllocationOutcome, calculate_allocation};
use market_allocation::domain::market::{Category, Obstacle, Stall};
use market_allocation::domain::seed::MarketSeed;
use market_allocation::domain::shared::{RegistrationNumber, StallId};
use market_allocation::domain::vendor::{
    AttendanceRecord, LocationPreference, Vendor, VendorProfile, VendorStatus,
};

/// Market date used by every scenario.
pub const MARKET_DATE: &str = "2019-02-04";

/// Highest preference priority.
pub const FIRST_CHOICE: u64 = (1 << 53) - 2;
/// Runner-up preference priority.
pub const SECOND_CHOICE: u64 = FIRST_CHOICE - 2;

/// Registration number of the vendor added at `position`.
pub fn registration(position: usize) -> RegistrationNumber {
    (1_970_010_101 + position as u64).to_string().into()
}

pub fn market_date() -> NaiveDate {
    NaiveDate::parse_from_str(MARKET_DATE, "%Y-%m-%d").unwrap()
}

// =============================================================================
// Vendors
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct VendorSpec {
    status: VendorStatus,
    owned: Vec<String>,
    profile: VendorProfile,
    seniority: Option<u64>,
}

/// Applicant without stalls.
pub fn applicant() -> VendorSpec {
    VendorSpec::default()
}

/// Permanent holder of `stalls`.
pub fn holder(stalls: &[&str]) -> VendorSpec {
    VendorSpec {
        status: VendorStatus::Permanent,
        owned: stalls.iter().map(|stall| (*stall).to_string()).collect(),
        ..VendorSpec::default()
    }
}

impl VendorSpec {
    pub fn status(mut self, status: VendorStatus) -> Self {
        self.status = status;
        self
    }

    pub fn minimum(mut self, minimum: usize) -> Self {
        self.profile.minimum = Some(minimum);
        self
    }

    pub fn maximum(mut self, maximum: usize) -> Self {
        self.profile.maximum = Some(maximum);
        self
    }

    pub fn anywhere(mut self, anywhere: bool) -> Self {
        self.profile.anywhere = Some(anywhere);
        self
    }

    pub fn categories(mut self, categories: &[&str]) -> Self {
        self.profile.categories = categories.iter().map(|category| (*category).into()).collect();
        self
    }

    pub fn needs_equipment(mut self) -> Self {
        self.profile.needs_equipment = true;
        self
    }

    pub fn absent(mut self, from: &str, until: &str) -> Self {
        self.profile.absent_from = Some(NaiveDate::parse_from_str(from, "%Y-%m-%d").unwrap());
        self.profile.absent_until = Some(NaiveDate::parse_from_str(until, "%Y-%m-%d").unwrap());
        self
    }

    pub fn seniority(mut self, seniority: u64) -> Self {
        self.seniority = Some(seniority);
        self
    }
}

// =============================================================================
// Scenario
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct Scenario {
    stalls: Vec<Stall>,
    rows: Option<Vec<Vec<String>>>,
    categories: Vec<Category>,
    obstacles: Vec<Obstacle>,
    vendors: Vec<VendorSpec>,
    attendance: Option<Vec<(usize, bool)>>,
    preferences: Vec<(usize, String, u64)>,
    a_list: Vec<usize>,
    expansion_limit: Option<usize>,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` plain stalls with the next free numeric ids.
    pub fn stalls(mut self, count: usize) -> Self {
        let first = self.stalls.len() + 1;
        self.stalls
            .extend((first..first + count).map(|id| Stall::new(id.to_string())));
        self
    }

    /// Add a stall as given.
    pub fn stall(mut self, stall: Stall) -> Self {
        self.stalls.push(stall);
        self
    }

    pub fn rows(mut self, rows: &[&[&str]]) -> Self {
        self.rows = Some(
            rows.iter()
                .map(|row| row.iter().map(|id| (*id).to_string()).collect())
                .collect(),
        );
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    pub fn obstacle(mut self, a: &str, b: &str) -> Self {
        self.obstacles.push(Obstacle::between(a, b));
        self
    }

    pub fn vendor(mut self, vendor: VendorSpec) -> Self {
        self.vendors.push(vendor);
        self
    }

    pub fn preference(mut self, vendor: usize, stall: &str, priority: u64) -> Self {
        self.preferences.push((vendor, stall.to_string(), priority));
        self
    }

    /// Explicit attendance; vendors without a record fall back to their
    /// status default.
    pub fn attendance(mut self, vendor: usize, attending: bool) -> Self {
        self.attendance
            .get_or_insert_with(Vec::new)
            .push((vendor, attending));
        self
    }

    pub fn a_list(mut self, vendors: &[usize]) -> Self {
        self.a_list = vendors.to_vec();
        self
    }

    pub fn expansion_limit(mut self, limit: usize) -> Self {
        self.expansion_limit = Some(limit);
        self
    }

    pub fn seed(&self) -> MarketSeed {
        let rows = self.rows.clone().map_or_else(
            || {
                let mut ids: Vec<String> = self.stalls.iter().map(|s| s.id.to_string()).collect();
                ids.sort_by_key(|id| id.parse::<u64>().unwrap_or(u64::MAX));
                vec![ids.into_iter().map(StallId::new).collect()]
            },
            |rows| {
                rows.into_iter()
                    .map(|row| row.into_iter().map(StallId::new).collect())
                    .collect()
            },
        );

        let vendors: Vec<Vendor> = self
            .vendors
            .iter()
            .enumerate()
            .map(|(position, spec)| {
                Vendor::new(
                    registration(position),
                    spec.seniority.unwrap_or(position as u64 + 1),
                )
                .with_status(spec.status)
                .with_owned_stalls(spec.owned.iter().map(String::as_str))
                .with_profile(spec.profile.clone())
            })
            .collect();

        let attendance = self
            .attendance
            .clone()
            .unwrap_or_else(|| (0..vendors.len()).map(|position| (position, true)).collect());

        MarketSeed {
            market_id: "scenario".into(),
            market_date: Some(MARKET_DATE.to_string()),
            stalls: self.stalls.clone(),
            rows,
            categories: self.categories.clone(),
            obstacles: self.obstacles.clone(),
            vendors,
            attendance: attendance
                .into_iter()
                .map(|(position, attending)| AttendanceRecord {
                    vendor: registration(position),
                    attending,
                    date: None,
                })
                .collect(),
            preferences: self
                .preferences
                .iter()
                .map(|(position, stall, priority)| {
                    LocationPreference::new(registration(*position), stall.as_str())
                        .with_priority(*priority)
                })
                .collect(),
            a_list: self.a_list.iter().map(|position| registration(*position)).collect(),
            expansion_limit: self.expansion_limit,
        }
    }

    pub fn run(&self) -> AllocationOutcome {
        calculate_allocation(&self.seed()).unwrap()
    }
}

// =============================================================================
// Outcome helpers
// =============================================================================

/// Stall ids held by a vendor, in market order.
pub fn stalls_of(outcome: &AllocationOutcome, vendor: usize) -> Vec<String> {
    outcome
        .assignment_for(&registration(vendor))
        .map(|assignment| assignment.stalls.iter().map(ToString::to_string).collect())
        .unwrap_or_default()
}

/// Reason code a vendor was rejected with.
pub fn rejection_code(outcome: &AllocationOutcome, vendor: usize) -> Option<u8> {
    outcome
        .rejection_for(&registration(vendor))
        .map(|reason| reason.code())
}

pub fn open_stalls(outcome: &AllocationOutcome) -> Vec<String> {
    outcome.open_stalls.iter().map(ToString::to_string).collect()
}

/// Whether numeric stall ids form one run.
pub fn is_contiguous(stalls: &[String]) -> bool {
    let mut numbers: Vec<u64> = stalls.iter().map(|id| id.parse().unwrap()).collect();
    numbers.sort_unstable();
    numbers.windows(2).all(|pair| pair[1] == pair[0] + 1)
}
