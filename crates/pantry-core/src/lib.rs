//! # pantry-core: Pure Projection Logic for the Pantry Console
//!
//! Entity types of the retail administration console and the two
//! presentation projections built on them. Zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Pantry Console Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Screens (browser / console binary)              │   │
//! │  │   Category tree ── Inventory table ── Companies ── Toasts       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pantry-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   tree    │  │   view    │  │ validation│  │   │
//! │  │   │ Category  │  │  Forest   │  │  search   │  │   forms   │  │   │
//! │  │   │ Item, Co. │  │  flatten  │  │ sort/page │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             pantry-client (stores, gateway, session)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities, drafts and patches (Category, InventoryItem, Company, Store)
//! - [`resource`] - Binds an entity type to its remote collection
//! - [`tree`] - Flat parent-referencing list → forest
//! - [`view`] - Search, sort and paginate a table
//! - [`validation`] - Form checks
//! - [`lookups`] - Inventory pick lists
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use pantry_core::tree::{build_forest, flatten};
//! use pantry_core::view::{project, ViewParams};
//! use pantry_core::Category;
//!
//! let categories: Vec<Category> = serde_json::from_str(r#"[
//!     {"id": 1, "name": "Bread", "description": "", "parentId": null},
//!     {"id": 2, "name": "Rye", "description": "", "parentId": 1}
//! ]"#).unwrap();
//!
//! let forest = build_forest(&categories);
//! let rows = flatten(&forest);
//! assert_eq!(rows[1].0.name, "Rye");
//! assert_eq!(rows[1].1, 1);
//!
//! let mut params = ViewParams::for_table::<Category>();
//! params.set_search("rye");
//! assert_eq!(project(&categories, &params).total_matched, 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lookups;
pub mod resource;
pub mod tree;
pub mod types;
pub mod validation;
pub mod view;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use pantry_core::Category` instead of
// `use pantry_core::types::Category`

pub use error::{CoreError, CoreResult, ValidationError};
pub use lookups::InventoryLookups;
pub use resource::{Operation, Resource, ResourceKind};
pub use tree::{build_forest, Hierarchical, TreeNode};
pub use types::*;
pub use view::{project, FieldValue, Projection, SortDirection, Tabular, ViewParams, ViewState};
