//! Normalised input for one market day.

use serde::{Deserialize, Serialize};

use crate::domain::market::{Category, Obstacle, Stall};
use crate::domain::shared::{MarketId, RegistrationNumber, StallId};
use crate::domain::vendor::{AttendanceRecord, LocationPreference, Vendor};

/// Everything the allocation needs for one market on one date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSeed {
    /// Market id.
    pub market_id: MarketId,
    /// Market date, `YYYY-MM-DD` or RFC 3339. Validated on use.
    #[serde(default)]
    pub market_date: Option<String>,
    /// All stalls, active or not.
    #[serde(default)]
    pub stalls: Vec<Stall>,
    /// Rows of stall ids; a row repeating its first id at the end is circular.
    #[serde(default)]
    pub rows: Vec<Vec<StallId>>,
    /// Product categories.
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Blocked stall boundaries.
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    /// Registered vendors.
    #[serde(default)]
    pub vendors: Vec<Vendor>,
    /// Attendance notices.
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
    /// Explicit location preferences.
    #[serde(default)]
    pub preferences: Vec<LocationPreference>,
    /// Vendors placed before everyone else.
    #[serde(default)]
    pub a_list: Vec<RegistrationNumber>,
    /// Number of expansion rounds; defaults to the stall count.
    #[serde(default)]
    pub expansion_limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collections_default_to_empty() {
        let seed: MarketSeed =
            serde_json::from_str(r#"{"market_id": "AC-2019", "market_date": "2019-02-04"}"#)
                .unwrap();

        assert_eq!(seed.market_id.as_str(), "AC-2019");
        assert!(seed.stalls.is_empty());
        assert!(seed.vendors.is_empty());
        assert!(seed.a_list.is_empty());
        assert_eq!(seed.expansion_limit, None);
    }

    #[test]
    fn parses_a_small_market() {
        let seed: MarketSeed = serde_json::from_str(
            r#"{
                "market_id": "m",
                "market_date": "2019-02-04",
                "stalls": [{"id": "1"}, {"id": "2", "equipment_suitable": true}],
                "rows": [["1", "2"]],
                "obstacles": [{"stall_a": "1", "stall_b": "2", "kind": "boom"}],
                "vendors": [{"registration": "1970010101", "seniority": 1}],
                "attendance": [{"vendor": "1970010101", "attending": true}],
                "preferences": [{"vendor": "1970010101", "stall": "2", "priority": 3}]
            }"#,
        )
        .unwrap();

        assert_eq!(seed.rows, vec![vec![StallId::new("1"), StallId::new("2")]]);
        assert_eq!(seed.obstacles[0].kind.as_deref(), Some("boom"));
        assert_eq!(seed.preferences[0].priority, 3);
    }
}
