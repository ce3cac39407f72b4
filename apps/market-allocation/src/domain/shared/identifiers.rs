//! Strongly-typed identifiers for market entities.
//!
//! String ids are what the seed and the report speak. Dense indices are what
//! the engine works on once the market has been resolved.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(StallId, "Identifier of a physical stall location.");
define_id!(
    RegistrationNumber,
    "Vendor registration number, the stable vendor identity."
);
define_id!(CategoryId, "Identifier of a product category (branch).");
define_id!(MarketId, "Identifier of a market.");

macro_rules! define_index {
    ($name:ident, $label:literal, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl $name {
            /// Wrap a raw position.
            #[inline]
            #[must_use]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// The raw position.
            #[inline]
            #[must_use]
            pub const fn get(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $label, self.0)
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self(index)
            }
        }
    };
}

define_index!(
    StallIndex,
    "StallIndex",
    "Position of a stall in the market's stall list."
);
define_index!(
    VendorIndex,
    "VendorIndex",
    "Position of a vendor in the sorted attending roster."
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stall_id_new_and_display() {
        let id = StallId::new("12");
        assert_eq!(id.as_str(), "12");
        assert_eq!(format!("{id}"), "12");
    }

    #[test]
    fn registration_number_from_str_and_string() {
        let a: RegistrationNumber = "1970010101".into();
        let b: RegistrationNumber = String::from("1970010101").into();
        assert_eq!(a, b);
        assert_eq!(a.into_inner(), "1970010101");
    }

    #[test]
    fn serde_is_transparent() {
        let id = CategoryId::new("bak");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"bak\"");

        let parsed: CategoryId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn indices_order_by_position() {
        assert!(StallIndex::new(1) < StallIndex::new(2));
        assert_eq!(VendorIndex::from(3).get(), 3);
        assert_eq!(StallIndex::new(4).to_string(), "StallIndex(4)");
    }
}
