//! The catalog of point-awarding activities.
//!
//! An [`Activity`] binds a display name to a category and a point value.
//! The catalog is loaded from configuration once and shared read-only by
//! every editing session.

use serde::{Deserialize, Serialize};

/// A named point award bound to one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Display name, unique within the catalog.
    pub name: String,
    /// The category whose totals this activity changes.
    pub category: String,
    /// Points awarded per occurrence. May be negative for penalties.
    pub points: i64,
}

impl Activity {
    /// Points for `count` occurrences, saturating at the `i64` bounds.
    pub fn points_for(&self, count: u32) -> i64 {
        self.points.saturating_mul(i64::from(count))
    }
}

/// Ordered, name-indexed set of activities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityCatalog {
    activities: Vec<Activity>,
}

impl ActivityCatalog {
    /// Build a catalog, keeping the first activity for each name.
    pub fn new(activities: impl IntoIterator<Item = Activity>) -> Self {
        let mut catalog = Self::default();
        for activity in activities {
            if catalog.get(&activity.name).is_none() {
                catalog.activities.push(activity);
            }
        }
        catalog
    }

    /// Look up an activity by name.
    pub fn get(&self, name: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.name == name)
    }

    /// All activities in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Activity> {
        self.activities.iter()
    }
}
