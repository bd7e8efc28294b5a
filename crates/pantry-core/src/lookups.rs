//! Option lists of the inventory screen.
//!
//! Item categories and units are free text on the server. The screen keeps
//! its own pick lists, seeded with defaults and extended as users type new
//! values.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const DEFAULT_ITEM_CATEGORIES: [&str; 4] =
    ["Raw Materials", "Finished Goods", "Packaging", "Tools"];

pub const DEFAULT_UNITS: [&str; 5] = ["pc", "kg", "g", "l", "ml"];

/// Category and unit options offered by the inventory item form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryLookups {
    pub categories: Vec<String>,
    pub units: Vec<String>,
}

impl Default for InventoryLookups {
    fn default() -> Self {
        InventoryLookups {
            categories: DEFAULT_ITEM_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            units: DEFAULT_UNITS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl InventoryLookups {
    /// Appends a category label. Returns `false` if it was already listed
    /// or is blank.
    pub fn add_category(&mut self, label: &str) -> bool {
        push_unique(&mut self.categories, label)
    }

    /// Appends a unit. Returns `false` if it was already listed or is blank.
    pub fn add_unit(&mut self, unit: &str) -> bool {
        push_unique(&mut self.units, unit)
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || list.iter().any(|existing| existing == value) {
        return false;
    }
    list.push(value.to_string());
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let lookups = InventoryLookups::default();
        assert_eq!(lookups.categories[0], "Raw Materials");
        assert_eq!(lookups.units, vec!["pc", "kg", "g", "l", "ml"]);
    }

    #[test]
    fn test_add_only_when_absent() {
        let mut lookups = InventoryLookups::default();

        assert!(lookups.add_unit("dozen"));
        assert!(!lookups.add_unit("dozen"));
        assert!(!lookups.add_unit("kg"));
        assert!(!lookups.add_unit("  "));
        assert_eq!(lookups.units.last().map(String::as_str), Some("dozen"));

        assert!(lookups.add_category(" Dairy "));
        assert_eq!(lookups.categories.len(), 5);
        assert_eq!(lookups.categories[4], "Dairy");
    }
}
