//! Rejection reasons.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a vendor received no stalls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    /// The category cap is used up.
    CategoryFull,
    /// No adjacent eligible stall group of the requested size.
    AdjacentUnavailable,
    /// The vendor's minimum cannot be reached.
    MinimumUnavailable,
    /// No open stalls are left on the market.
    MarketFull,
}

impl RejectionReason {
    /// Numeric reason code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::CategoryFull => 1,
            Self::AdjacentUnavailable => 2,
            Self::MinimumUnavailable => 3,
            Self::MarketFull => 4,
        }
    }

    /// Message shown to the vendor.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::CategoryFull => "Alle marktplaatsen voor deze branche zijn reeds ingedeeld.",
            Self::AdjacentUnavailable => "Geen geschikte locatie gevonden met huidige voorkeuren.",
            Self::MinimumUnavailable => "Minimum aantal plaatsen niet beschikbaar.",
            Self::MarketFull => "Alle marktplaatsen zijn reeds ingedeeld.",
        }
    }

    /// Reason for a numeric code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::CategoryFull),
            2 => Some(Self::AdjacentUnavailable),
            3 => Some(Self::MinimumUnavailable),
            4 => Some(Self::MarketFull),
            _ => None,
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}
