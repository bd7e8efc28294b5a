//! # Resources
//!
//! The `Resource` trait ties an entity type to its remote collection.
//!
//! ## Resource Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Managed Resources                               │
//! │                                                                         │
//! │  ResourceKind      Base path           Entity          Draft / Patch    │
//! │  ─────────────     ─────────────────   ─────────────   ──────────────   │
//! │  Category          /categories         Category        CategoryDraft    │
//! │  InventoryItem     /inventory/items    InventoryItem   ItemDraft/Patch  │
//! │  Company           /companies          Company         CompanyDraft     │
//! │                                                                         │
//! │  GET    {base}          list                                            │
//! │  POST   {base}          create  (body = draft)                          │
//! │  PUT    {base}/{id}     update  (body = patch)                          │
//! │  DELETE {base}/{id}     delete                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::EntityId;

// =============================================================================
// Resource Kind
// =============================================================================

/// The resource types managed by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Category,
    InventoryItem,
    Company,
}

impl ResourceKind {
    /// All managed kinds, in sidebar order.
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Category,
        ResourceKind::InventoryItem,
        ResourceKind::Company,
    ];

    /// Base path of the remote collection.
    pub const fn base_path(&self) -> &'static str {
        match self {
            ResourceKind::Category => "/categories",
            ResourceKind::InventoryItem => "/inventory/items",
            ResourceKind::Company => "/companies",
        }
    }

    /// Path of a single member of the collection.
    pub fn member_path(&self, id: EntityId) -> String {
        format!("{}/{}", self.base_path(), id)
    }

    /// Singular display label ("category").
    pub const fn singular(&self) -> &'static str {
        match self {
            ResourceKind::Category => "category",
            ResourceKind::InventoryItem => "inventory item",
            ResourceKind::Company => "company",
        }
    }

    /// Plural display label ("categories").
    pub const fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Category => "categories",
            ResourceKind::InventoryItem => "inventory items",
            ResourceKind::Company => "companies",
        }
    }

    /// Message shown when the server rejected an operation without saying why.
    ///
    /// ```rust
    /// use pantry_core::{Operation, ResourceKind};
    ///
    /// assert_eq!(
    ///     ResourceKind::Category.failure_message(Operation::Fetch),
    ///     "Failed to fetch categories"
    /// );
    /// assert_eq!(
    ///     ResourceKind::InventoryItem.failure_message(Operation::Create),
    ///     "Failed to create inventory item"
    /// );
    /// ```
    pub fn failure_message(&self, op: Operation) -> String {
        let noun = match op {
            Operation::Fetch => self.plural(),
            _ => self.singular(),
        };
        format!("Failed to {} {}", op.verb(), noun)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Category => write!(f, "categories"),
            ResourceKind::InventoryItem => write!(f, "inventory"),
            ResourceKind::Company => write!(f, "companies"),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "category" | "categories" => Ok(ResourceKind::Category),
            "inventory" | "item" | "items" | "inventory_items" => Ok(ResourceKind::InventoryItem),
            "company" | "companies" => Ok(ResourceKind::Company),
            other => Err(CoreError::UnknownResource(other.to_string())),
        }
    }
}

// =============================================================================
// Operation
// =============================================================================

/// The four collection operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const fn verb(&self) -> &'static str {
        match self {
            Operation::Fetch => "fetch",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    /// Whether this operation mutates the remote collection.
    pub const fn is_mutation(&self) -> bool {
        !matches!(self, Operation::Fetch)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

// =============================================================================
// Resource Trait
// =============================================================================

/// An entity type stored in a remote collection.
///
/// `Draft` is the body of a create request, `Patch` the body of an update.
/// Both are serialized as-is; the server answers with the full entity.
pub trait Resource:
    Clone + fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    type Draft: Serialize + fmt::Debug + Send + Sync + 'static;
    type Patch: Serialize + fmt::Debug + Send + Sync + 'static;

    const KIND: ResourceKind;

    /// Server-assigned identifier.
    fn id(&self) -> EntityId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(ResourceKind::InventoryItem.base_path(), "/inventory/items");
        assert_eq!(ResourceKind::Company.member_path(7), "/companies/7");
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            ResourceKind::Company.failure_message(Operation::Fetch),
            "Failed to fetch companies"
        );
        assert_eq!(
            ResourceKind::Category.failure_message(Operation::Delete),
            "Failed to delete category"
        );
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Categories".parse::<ResourceKind>().unwrap(), ResourceKind::Category);
        assert_eq!("items".parse::<ResourceKind>().unwrap(), ResourceKind::InventoryItem);
        assert!("orders".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn test_only_fetch_is_read_only() {
        assert!(!Operation::Fetch.is_mutation());
        assert!(Operation::Create.is_mutation());
        assert!(Operation::Update.is_mutation());
        assert!(Operation::Delete.is_mutation());
    }
}
