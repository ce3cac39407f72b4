//! Stall and category reference data.

use serde::{Deserialize, Serialize};

use crate::domain::shared::{CategoryId, StallId};

/// A physical stall location. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stall {
    /// Stall id.
    pub id: StallId,
    /// Category tags on this stall.
    #[serde(default)]
    pub categories: Vec<CategoryId>,
    /// Suitable for vendors bringing their own sales equipment.
    #[serde(default)]
    pub equipment_suitable: bool,
    /// Inactive stalls take no part in the allocation.
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Stall {
    /// Create an active, untagged stall.
    #[must_use]
    pub fn new(id: impl Into<StallId>) -> Self {
        Self {
            id: id.into(),
            categories: Vec::new(),
            equipment_suitable: false,
            active: true,
        }
    }

    /// Tag the stall with categories.
    #[must_use]
    pub fn with_categories<I, C>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CategoryId>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Mark the stall as suitable for own equipment.
    #[must_use]
    pub const fn with_equipment(mut self) -> Self {
        self.equipment_suitable = true;
        self
    }

    /// Mark the stall as inactive.
    #[must_use]
    pub const fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Whether this stall carries the given category tag.
    #[must_use]
    pub fn has_category(&self, category: &CategoryId) -> bool {
        self.categories.contains(category)
    }
}

const fn default_active() -> bool {
    true
}

/// A product category ("branche").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category id.
    pub id: CategoryId,
    /// Vendors declaring a mandatory category may only occupy matching stalls.
    #[serde(default)]
    pub mandatory: bool,
    /// Maximum number of stalls assignable to vendors of this category.
    #[serde(default)]
    pub cap: Option<usize>,
}

impl Category {
    /// Create an optional, uncapped category.
    #[must_use]
    pub fn new(id: impl Into<CategoryId>) -> Self {
        Self {
            id: id.into(),
            mandatory: false,
            cap: None,
        }
    }

    /// Make the category mandatory.
    #[must_use]
    pub const fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Cap the number of stalls for this category.
    #[must_use]
    pub const fn with_cap(mut self, cap: usize) -> Self {
        self.cap = Some(cap);
        self
    }

    /// The cap, treating zero as absent.
    #[must_use]
    pub fn effective_cap(&self) -> Option<usize> {
        self.cap.filter(|&cap| cap > 0)
    }
}
