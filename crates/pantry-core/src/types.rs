//! # Domain Types
//!
//! Entities managed by the console, with the drafts and patches sent to
//! create and update them.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │   │  InventoryItem  │   │    Company      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (server)    │   │  id (server)    │   │  id (server)    │       │
//! │  │  name           │   │  code           │   │  name           │       │
//! │  │  description    │   │  name           │   │  contact info   │       │
//! │  │  parentId ──┐   │   │  unitPrice      │   │  address {..}   │       │
//! │  └─────────────┼───┘   │  quantity       │   └────────┬────────┘       │
//! │                │       └─────────────────┘            │ 1..n           │
//! │                └─► Category.id                ┌───────▼─────────┐      │
//! │                                               │     Store       │      │
//! │                                               │  parent_store_id│      │
//! │                                               └─────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every `id` is assigned by the server and never generated here. Drafts
//! therefore carry no id at all.
//!
//! ## Wire Casing
//! Categories and inventory items travel in camelCase, companies and stores
//! in snake_case, matching what the API serves.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::resource::{Resource, ResourceKind};
use crate::tree::Hierarchical;
use crate::view::{FieldValue, Tabular};

/// Server-assigned entity identifier.
pub type EntityId = i64;

/// A server timestamp, kept as the text the server sent.
///
/// The API serves RFC 3339 values as well as bare `DATETIME` column values
/// such as `2024-05-01T10:00:00` with no offset. Both are accepted; searching
/// and display use the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Timestamp(String);

/// Offset-less layouts, read as UTC.
const NAIVE_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

impl Timestamp {
    pub fn new(raw: impl Into<String>) -> Self {
        Timestamp(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Instant in UTC, or `None` when the text is not a date-time at all.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.0) {
            return Some(ts.with_timezone(&Utc));
        }
        NAIVE_LAYOUTS
            .iter()
            .find_map(|layout| NaiveDateTime::parse_from_str(&self.0, layout).ok())
            .map(|naive| naive.and_utc())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn timestamp(value: &Option<Timestamp>) -> FieldValue<'_> {
    value.as_ref().map(Timestamp::as_str).into()
}

// =============================================================================
// Category
// =============================================================================

/// A catalog category. Categories nest through `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    #[ts(type = "number")]
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Parent category, `None` for top-level categories.
    #[serde(default)]
    #[ts(type = "number | null")]
    pub parent_id: Option<EntityId>,
    /// Number of items filed under this category, when the server counts them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub item_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub updated_at: Option<Timestamp>,
}

/// Body of a category create or update.
///
/// `parent_id` is always sent, `null` moves the category to the top level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
    #[ts(type = "number | null")]
    pub parent_id: Option<EntityId>,
}

impl CategoryDraft {
    pub fn new(name: impl Into<String>) -> Self {
        CategoryDraft {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent_id: EntityId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl From<&Category> for CategoryDraft {
    /// Prefills the edit form.
    fn from(category: &Category) -> Self {
        CategoryDraft {
            name: category.name.clone(),
            description: category.description.clone(),
            parent_id: category.parent_id,
        }
    }
}

impl Resource for Category {
    type Draft = CategoryDraft;
    type Patch = CategoryDraft;

    const KIND: ResourceKind = ResourceKind::Category;

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Hierarchical for Category {
    fn node_id(&self) -> EntityId {
        self.id
    }

    fn parent_ref(&self) -> Option<EntityId> {
        self.parent_id
    }
}

impl Tabular for Category {
    fn columns() -> &'static [&'static str] {
        &[
            "name",
            "description",
            "id",
            "parentId",
            "itemCount",
            "createdAt",
            "updatedAt",
        ]
    }

    fn field(&self, key: &str) -> FieldValue<'_> {
        match key {
            "id" => self.id.into(),
            "name" => (&self.name).into(),
            "description" => (&self.description).into(),
            "parentId" => self.parent_id.into(),
            "itemCount" => self.item_count.map(i64::from).into(),
            "createdAt" => timestamp(&self.created_at),
            "updatedAt" => timestamp(&self.updated_at),
            _ => FieldValue::Null,
        }
    }
}

// =============================================================================
// Inventory Item
// =============================================================================

/// A stocked inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventoryItem {
    #[ts(type = "number")]
    pub id: EntityId,
    /// Business identifier shown on labels.
    pub code: String,
    pub name: String,
    /// Category label (free text, see `InventoryLookups`).
    pub category: String,
    pub unit_price: f64,
    pub quantity: f64,
    /// Unit of measure: pc, kg, g, l, ml, ...
    pub unit: String,
    /// Quantity at or below which the item needs reordering.
    pub reorder_point: f64,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub updated_at: Option<Timestamp>,
}

impl InventoryItem {
    /// Whether stock has dropped to the reorder point.
    pub fn needs_reorder(&self) -> bool {
        self.quantity <= self.reorder_point
    }
}

/// Body of an inventory item create.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventoryItemDraft {
    pub code: String,
    pub name: String,
    pub category: String,
    pub unit_price: f64,
    pub quantity: f64,
    pub unit: String,
    pub reorder_point: f64,
    pub status: String,
}

/// Partial update of an inventory item. Absent fields are left out of the
/// request body and keep their server value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventoryItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub unit_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub reorder_point: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub status: Option<String>,
}

impl Resource for InventoryItem {
    type Draft = InventoryItemDraft;
    type Patch = InventoryItemPatch;

    const KIND: ResourceKind = ResourceKind::InventoryItem;

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Tabular for InventoryItem {
    fn columns() -> &'static [&'static str] {
        &[
            "code",
            "name",
            "category",
            "unitPrice",
            "quantity",
            "unit",
            "reorderPoint",
            "status",
            "id",
            "createdAt",
            "updatedAt",
        ]
    }

    fn field(&self, key: &str) -> FieldValue<'_> {
        match key {
            "id" => self.id.into(),
            "code" => (&self.code).into(),
            "name" => (&self.name).into(),
            "category" => (&self.category).into(),
            "unitPrice" => self.unit_price.into(),
            "quantity" => self.quantity.into(),
            "unit" => (&self.unit).into(),
            "reorderPoint" => self.reorder_point.into(),
            "status" => (&self.status).into(),
            "createdAt" => timestamp(&self.created_at),
            "updatedAt" => timestamp(&self.updated_at),
            _ => FieldValue::Null,
        }
    }
}

// =============================================================================
// Company
// =============================================================================

/// A company operating one or more stores.
///
/// `address` and `settings` are free-form JSON objects owned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Company {
    #[ts(type = "number")]
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    #[ts(type = "Record<string, unknown> | null")]
    pub address: Option<serde_json::Value>,
    #[serde(default)]
    pub tax_number: Option<String>,
    #[serde(default)]
    pub registration_number: Option<String>,
    #[serde(default)]
    #[ts(type = "Record<string, unknown> | null")]
    pub settings: Option<serde_json::Value>,
    /// Enabled console modules by name (bakery, tools, academy, ...).
    #[serde(default)]
    pub modules: Option<HashMap<String, bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub updated_at: Option<Timestamp>,
}

impl Company {
    pub fn has_module(&self, module: &str) -> bool {
        self.modules
            .as_ref()
            .and_then(|modules| modules.get(module).copied())
            .unwrap_or(false)
    }
}

/// Body of a company create or update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CompanyDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "Record<string, unknown> | null")]
    pub address: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub tax_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub registration_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "Record<string, unknown> | null")]
    pub settings: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub modules: Option<HashMap<String, bool>>,
}

impl Resource for Company {
    type Draft = CompanyDraft;
    type Patch = CompanyDraft;

    const KIND: ResourceKind = ResourceKind::Company;

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Tabular for Company {
    fn columns() -> &'static [&'static str] {
        &[
            "name",
            "email",
            "phone",
            "tax_number",
            "registration_number",
            "id",
            "logo_url",
            "address",
            "settings",
            "modules",
            "created_at",
            "updated_at",
        ]
    }

    fn field(&self, key: &str) -> FieldValue<'_> {
        match key {
            "id" => self.id.into(),
            "name" => (&self.name).into(),
            "logo_url" => self.logo_url.as_ref().into(),
            "email" => self.email.as_ref().into(),
            "phone" => self.phone.as_ref().into(),
            "tax_number" => self.tax_number.as_ref().into(),
            "registration_number" => self.registration_number.as_ref().into(),
            "address" => object(self.address.is_some()),
            "settings" => object(self.settings.is_some()),
            "modules" => object(self.modules.is_some()),
            "created_at" => timestamp(&self.created_at),
            "updated_at" => timestamp(&self.updated_at),
            _ => FieldValue::Null,
        }
    }
}

fn object(present: bool) -> FieldValue<'static> {
    if present {
        FieldValue::Object
    } else {
        FieldValue::Null
    }
}

// =============================================================================
// Store (company branch)
// =============================================================================

/// Kind of a company branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum StoreType {
    #[default]
    Main,
    Sub,
}

impl StoreType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            StoreType::Main => "main",
            StoreType::Sub => "sub",
        }
    }
}

/// A physical branch of a company. Sub stores hang off a main store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Store {
    #[ts(type = "number")]
    pub id: EntityId,
    #[ts(type = "number")]
    pub company_id: EntityId,
    #[serde(default)]
    #[ts(type = "number | null")]
    pub parent_store_id: Option<EntityId>,
    pub name: String,
    pub code: String,
    pub store_type: StoreType,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Hierarchical for Store {
    fn node_id(&self) -> EntityId {
        self.id
    }

    fn parent_ref(&self) -> Option<EntityId> {
        self.parent_store_id
    }
}

impl Tabular for Store {
    fn columns() -> &'static [&'static str] {
        &[
            "name",
            "code",
            "store_type",
            "is_active",
            "email",
            "phone",
            "id",
            "company_id",
            "parent_store_id",
        ]
    }

    fn field(&self, key: &str) -> FieldValue<'_> {
        match key {
            "id" => self.id.into(),
            "company_id" => self.company_id.into(),
            "parent_store_id" => self.parent_store_id.into(),
            "name" => (&self.name).into(),
            "code" => (&self.code).into(),
            "store_type" => self.store_type.as_str().into(),
            "is_active" => self.is_active.into(),
            "email" => self.email.as_ref().into(),
            "phone" => self.phone.as_ref().into(),
            _ => FieldValue::Null,
        }
    }
}

// =============================================================================
// User & Sign-in
// =============================================================================

/// Permission level of a console user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum UserRole {
    Admin,
    Manager,
    #[default]
    Staff,
}

impl UserRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Staff => "staff",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signed-in account, as served by `GET /users/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    #[ts(type = "number")]
    pub id: EntityId,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    #[ts(type = "number | null")]
    pub company_id: Option<EntityId>,
    #[serde(default)]
    #[ts(type = "number | null")]
    pub store_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub updated_at: Option<Timestamp>,
}

impl User {
    /// "First Last", or the email when the account has no name.
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }
}

/// Email and password typed into the sign-in form.
///
/// The API takes these as an OAuth2 password form, with the email in the
/// `username` field.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Fields of the `POST /auth/login` form.
    pub fn form_fields(&self) -> serde_json::Value {
        serde_json::json!({
            "username": self.email.trim(),
            "password": self.password,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /auth/register`.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub phone: Option<String>,
    #[serde(default)]
    #[ts(type = "number | null")]
    pub company_id: Option<EntityId>,
    #[serde(default)]
    #[ts(type = "number | null")]
    pub store_id: Option<EntityId>,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("role", &self.role)
            .field("company_id", &self.company_id)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_wire_format() {
        let category: Category = serde_json::from_value(json!({
            "id": 10,
            "name": "Pastries",
            "description": "",
            "parentId": null
        }))
        .unwrap();
        assert_eq!(category.id, 10);
        assert_eq!(category.parent_id, None);
        assert_eq!(category.item_count, None);

        let draft = serde_json::to_value(CategoryDraft::new("Rolls").with_parent(10)).unwrap();
        assert_eq!(
            draft,
            json!({ "name": "Rolls", "description": "", "parentId": 10 })
        );
    }

    #[test]
    fn test_category_draft_always_sends_parent() {
        let draft = serde_json::to_value(CategoryDraft::new("Top")).unwrap();
        assert_eq!(draft["parentId"], serde_json::Value::Null);
    }

    #[test]
    fn test_inventory_patch_omits_absent_fields() {
        let patch = InventoryItemPatch {
            quantity: Some(12.0),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "quantity": 12.0 }));
    }

    #[test]
    fn test_inventory_item_reorder() {
        let item: InventoryItem = serde_json::from_value(json!({
            "id": 1,
            "code": "FLR-01",
            "name": "Flour",
            "category": "Raw Materials",
            "unitPrice": 0.8,
            "quantity": 4.0,
            "unit": "kg",
            "reorderPoint": 5.0,
            "status": "active",
            "createdAt": "2026-01-05T08:00:00Z"
        }))
        .unwrap();
        assert!(item.needs_reorder());
        assert_eq!(
            item.created_at.as_ref().and_then(Timestamp::to_utc).map(|ts| ts.to_rfc3339()),
            Some("2026-01-05T08:00:00+00:00".to_string())
        );
        assert_eq!(item.field("unitPrice"), FieldValue::Float(0.8));
    }

    #[test]
    fn test_company_objects_are_not_scalar() {
        let company: Company = serde_json::from_value(json!({
            "id": 3,
            "name": "Crumb & Co",
            "address": { "city": "Lyon" },
            "modules": { "bakery": true, "academy": false }
        }))
        .unwrap();
        assert_eq!(company.field("address"), FieldValue::Object);
        assert!(!company.field("address").is_scalar());
        assert_eq!(company.field("email"), FieldValue::Null);
        assert!(company.has_module("bakery"));
        assert!(!company.has_module("academy"));
        assert!(!company.has_module("tools"));
    }

    #[test]
    fn test_store_hierarchy() {
        let store: Store = serde_json::from_value(json!({
            "id": 2,
            "company_id": 3,
            "parent_store_id": 1,
            "name": "Market Stall",
            "code": "MS-1",
            "store_type": "sub"
        }))
        .unwrap();
        assert_eq!(store.parent_ref(), Some(1));
        assert_eq!(store.store_type, StoreType::Sub);
        assert!(store.is_active);
        assert_eq!(store.field("store_type"), FieldValue::Text("sub".into()));
    }

    #[test]
    fn test_every_column_is_known() {
        let category = Category {
            id: 1,
            name: "Bread".into(),
            description: "Daily loaves".into(),
            parent_id: None,
            item_count: Some(4),
            created_at: None,
            updated_at: None,
        };
        for column in Category::columns() {
            // Unknown keys would silently render as empty cells
            let _ = category.field(column);
        }
        assert_eq!(category.field("itemCount"), FieldValue::Int(4));
        assert_eq!(category.field("nope"), FieldValue::Null);
    }

    #[test]
    fn test_offsetless_timestamps_are_accepted() {
        let category: Category = serde_json::from_value(json!({
            "id": 4,
            "name": "Croissants",
            "parentId": 3,
            "createdAt": "2024-05-01T10:00:00",
            "updatedAt": "2024-05-02 16:30:12.250"
        }))
        .unwrap();

        let created = category.created_at.as_ref().unwrap();
        assert_eq!(created.as_str(), "2024-05-01T10:00:00");
        assert_eq!(
            created.to_utc().map(|ts| ts.to_rfc3339()),
            Some("2024-05-01T10:00:00+00:00".to_string())
        );
        assert!(category.updated_at.as_ref().and_then(Timestamp::to_utc).is_some());

        // Searching and display see the text as served
        assert_eq!(
            category.field("createdAt"),
            FieldValue::Text("2024-05-01T10:00:00".into())
        );
        assert_eq!(
            serde_json::to_value(&category).unwrap()["createdAt"],
            json!("2024-05-01T10:00:00")
        );
    }

    #[test]
    fn test_unparseable_timestamp_is_kept_verbatim() {
        let stamp = Timestamp::new("yesterday");
        assert_eq!(stamp.to_utc(), None);
        assert_eq!(stamp.to_string(), "yesterday");
    }

    #[test]
    fn test_user_from_me_endpoint() {
        let user: User = serde_json::from_value(json!({
            "id": 7,
            "email": "owner@crumb.example",
            "first_name": "Ada",
            "last_name": null,
            "role": "admin",
            "is_active": true,
            "company_id": 100,
            "store_id": null,
            "created_at": "2024-05-01T10:00:00"
        }))
        .unwrap();
        assert_eq!(user.role, Some(UserRole::Admin));
        assert_eq!(user.company_id, Some(100));
        assert_eq!(user.display_name(), "Ada");

        let unnamed: User = serde_json::from_value(json!({ "id": 8, "email": "till@crumb.example" })).unwrap();
        assert!(unnamed.is_active);
        assert_eq!(unnamed.display_name(), "till@crumb.example");
    }

    #[test]
    fn test_credentials_never_print_password() {
        let credentials = Credentials::new(" owner@crumb.example ", "hunter22");
        assert!(!format!("{:?}", credentials).contains("hunter22"));
        assert_eq!(
            credentials.form_fields(),
            json!({ "username": "owner@crumb.example", "password": "hunter22" })
        );

        let registration = Registration {
            email: "baker@crumb.example".into(),
            password: "hunter22".into(),
            ..Default::default()
        };
        assert!(!format!("{:?}", registration).contains("hunter22"));
        let body = serde_json::to_value(&registration).unwrap();
        assert_eq!(body["password"], "hunter22");
        assert!(body.get("role").is_none());
    }

    #[test]
    fn test_bindings_use_number_ids() {
        let category = Category::decl();
        assert!(category.contains("id: number"), "{}", category);
        assert!(category.contains("parentId: number | null"), "{}", category);
        assert!(category.contains("itemCount?: number"), "{}", category);
        assert!(category.contains("createdAt?: Timestamp"), "{}", category);
        assert!(!category.contains("bigint"), "{}", category);

        let store = Store::decl();
        assert!(store.contains("company_id: number"), "{}", store);
        assert!(!store.contains("bigint"), "{}", store);
    }
}
