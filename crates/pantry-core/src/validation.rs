//! # Validation Module
//!
//! Form checks run before a draft or patch is handed to an entity store.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form (THIS MODULE)                                           │
//! │  ├── Empty / length / format checks                                    │
//! │  └── Parent selection never offers the entity itself                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Server                                                       │
//! │  ├── Uniqueness, foreign keys                                          │
//! │  └── Rejections come back as `detail` and are shown verbatim           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pantry_core::validation::{validate_category_draft, validate_item_code};
//! use pantry_core::CategoryDraft;
//!
//! assert!(validate_item_code("FLR-01").is_ok());
//! assert!(validate_category_draft(&CategoryDraft::new("Pastries"), None).is_ok());
//! ```

use crate::error::ValidationError;
use crate::types::{CategoryDraft, Credentials, EntityId, InventoryItemDraft, Registration};
use crate::view::PAGE_SIZE_OPTIONS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_CODE_LEN: usize = 50;
const MAX_QUERY_LEN: usize = 100;
const MIN_PASSWORD_LEN: usize = 8;

// =============================================================================
// String Validators
// =============================================================================

/// Validates the display name of a category, item or company.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_entity_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an inventory item code.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use pantry_core::validation::validate_item_code;
///
/// assert!(validate_item_code("FLR-01").is_ok());
/// assert!(validate_item_code("").is_err());
/// assert!(validate_item_code("has space").is_err());
/// ```
pub fn validate_item_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a table search query.
///
/// ## Rules
/// - Can be empty (keeps every row)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a non-negative amount (price, quantity, reorder point).
///
/// Zero is allowed. NaN and infinities are not.
pub fn validate_amount(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a table page size against the selectable sizes.
pub fn validate_page_size(page_size: usize) -> ValidationResult<()> {
    if !PAGE_SIZE_OPTIONS.contains(&page_size) {
        return Err(ValidationError::NotAllowed {
            field: "page size".to_string(),
            allowed: PAGE_SIZE_OPTIONS.iter().map(ToString::to_string).collect(),
        });
    }

    Ok(())
}

// =============================================================================
// Reference Validators
// =============================================================================

/// Rejects a category chosen as its own parent.
///
/// `editing` is the id of the category being edited, `None` while creating.
pub fn validate_parent(editing: Option<EntityId>, parent: Option<EntityId>) -> ValidationResult<()> {
    match (editing, parent) {
        (Some(own), Some(parent)) if own == parent => Err(ValidationError::SelfReference {
            field: "parentId".to_string(),
        }),
        _ => Ok(()),
    }
}

/// Validates a sign-in email address.
///
/// Only the shape `local@domain` is checked; the server has the final word.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        }),
    }
}

/// New passwords need at least 8 characters.
pub fn validate_new_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

// =============================================================================
// Draft Validators
// =============================================================================

pub fn validate_credentials(credentials: &Credentials) -> ValidationResult<()> {
    validate_email(&credentials.email)?;
    if credentials.password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }
    Ok(())
}

pub fn validate_registration(registration: &Registration) -> ValidationResult<()> {
    validate_email(&registration.email)?;
    validate_new_password(&registration.password)?;
    for (field, value) in [
        ("first_name", &registration.first_name),
        ("last_name", &registration.last_name),
    ] {
        if value.trim().is_empty() {
            return Err(ValidationError::Required {
                field: field.to_string(),
            });
        }
    }
    Ok(())
}

pub fn validate_category_draft(
    draft: &CategoryDraft,
    editing: Option<EntityId>,
) -> ValidationResult<()> {
    validate_entity_name(&draft.name)?;
    validate_parent(editing, draft.parent_id)
}

pub fn validate_item_draft(draft: &InventoryItemDraft) -> ValidationResult<()> {
    validate_item_code(&draft.code)?;
    validate_entity_name(&draft.name)?;
    validate_amount("unitPrice", draft.unit_price)?;
    validate_amount("quantity", draft.quantity)?;
    validate_amount("reorderPoint", draft.reorder_point)?;

    if draft.unit.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "unit".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_code() {
        assert!(validate_item_code("FLR-01").is_ok());
        assert!(validate_item_code("ABC123").is_ok());
        assert!(validate_item_code("sugar_fine").is_ok());

        assert!(validate_item_code("").is_err());
        assert!(validate_item_code("   ").is_err());
        assert!(validate_item_code("has space").is_err());
        assert!(validate_item_code(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_entity_name() {
        assert!(validate_entity_name("Pastries").is_ok());
        assert!(validate_entity_name("").is_err());
        assert!(validate_entity_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_search_query_trims() {
        assert_eq!(validate_search_query("  rye ").unwrap(), "rye");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("quantity", 0.0).is_ok());
        assert!(validate_amount("quantity", 2.5).is_ok());
        assert!(validate_amount("quantity", -1.0).is_err());
        assert!(validate_amount("unitPrice", f64::NAN).is_err());
        assert!(validate_amount("unitPrice", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("owner@crumb.example").is_ok());
        assert!(validate_email(" owner@crumb.example ").is_ok());
        assert_eq!(
            validate_email(""),
            Err(ValidationError::Required {
                field: "email".to_string()
            })
        );
        assert!(validate_email("owner").is_err());
        assert!(validate_email("@crumb.example").is_err());
        assert!(validate_email("owner@").is_err());
        assert!(validate_email("a@b@c").is_err());
    }

    #[test]
    fn test_sign_in_and_registration_forms() {
        assert!(validate_credentials(&Credentials::new("owner@crumb.example", "x")).is_ok());
        assert!(validate_credentials(&Credentials::new("owner@crumb.example", "")).is_err());

        let mut registration = Registration {
            email: "baker@crumb.example".to_string(),
            password: "short".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Baker".to_string(),
            ..Default::default()
        };
        assert_eq!(
            validate_registration(&registration),
            Err(ValidationError::TooShort {
                field: "password".to_string(),
                min: 8
            })
        );

        registration.password = "long enough".to_string();
        assert!(validate_registration(&registration).is_ok());

        registration.last_name = "  ".to_string();
        assert!(validate_registration(&registration).is_err());
    }

    #[test]
    fn test_validate_page_size() {
        assert!(validate_page_size(10).is_ok());
        assert!(validate_page_size(25).is_ok());
        assert!(validate_page_size(100).is_ok());
        assert!(validate_page_size(0).is_err());
        assert!(validate_page_size(50).is_err());
    }

    #[test]
    fn test_validate_parent() {
        assert!(validate_parent(None, Some(3)).is_ok());
        assert!(validate_parent(Some(3), None).is_ok());
        assert!(validate_parent(Some(3), Some(4)).is_ok());
        assert_eq!(
            validate_parent(Some(3), Some(3)),
            Err(ValidationError::SelfReference {
                field: "parentId".to_string()
            })
        );
    }

    #[test]
    fn test_validate_item_draft() {
        let mut draft = InventoryItemDraft {
            code: "FLR-01".into(),
            name: "Flour".into(),
            category: "Raw Materials".into(),
            unit_price: 0.8,
            quantity: 25.0,
            unit: "kg".into(),
            reorder_point: 5.0,
            status: "active".into(),
        };
        assert!(validate_item_draft(&draft).is_ok());

        draft.unit = String::new();
        assert_eq!(
            validate_item_draft(&draft),
            Err(ValidationError::Required {
                field: "unit".to_string()
            })
        );
    }
}
