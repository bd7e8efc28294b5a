//! # Client Error Types
//!
//! Error types for gateway calls and store operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Gateway      │  │     Store               │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Transport      │  │  Failed (normalized)    │ │
//! │  │  InvalidUrl     │  │  Rejected       │  │  Busy                   │ │
//! │  │  ConfigLoad/Save│  │  Decode         │  │  StoreDropped           │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │ Session / Forms │                                                   │
//! │  │  SessionStorage │                                                   │
//! │  │  Validation     │                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Message Normalization
//! ```text
//! GatewayError                           message shown to the user
//! ───────────────────────────────────    ──────────────────────────────────
//! Transport / Decode                 →   "An unexpected error occurred"
//! Rejected, detail = "Name taken"    →   "Name taken"
//! Rejected, detail = [{msg: a}, b]   →   "a, b"
//! Rejected, no usable detail         →   "Failed to create category"
//! ```

use pantry_core::{Operation, ResourceKind, ValidationError};
use serde_json::Value;
use thiserror::Error;

/// Shown when the failure carries no message of its own.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

// =============================================================================
// Error Detail
// =============================================================================

/// The `detail` field of a rejected response.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ErrorDetail {
    /// A single human-readable message.
    Message(String),
    /// Field-level issues, in the order the server listed them.
    Issues(Vec<FieldIssue>),
    /// No detail, or one that says nothing.
    #[default]
    Empty,
}

/// One entry of a validation issue list.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldIssue {
    pub message: String,
}

impl FieldIssue {
    /// Takes `msg` from an issue object. Anything else is stringified whole.
    fn from_value(value: &Value) -> Self {
        let message = match value {
            Value::Object(map) => match map.get("msg") {
                Some(Value::String(msg)) => msg.clone(),
                Some(other) if !other.is_null() => stringify(other),
                _ => value.to_string(),
            },
            other => stringify(other),
        };
        FieldIssue { message }
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl ErrorDetail {
    /// Extracts the detail from a response body.
    ///
    /// ```rust
    /// use pantry_client::error::ErrorDetail;
    /// use serde_json::json;
    ///
    /// let detail = ErrorDetail::from_body(&json!({
    ///     "detail": [{ "msg": "name required" }, { "msg": "code too long" }]
    /// }));
    /// assert_eq!(detail.message().as_deref(), Some("name required, code too long"));
    /// ```
    pub fn from_body(body: &Value) -> Self {
        match body.get("detail") {
            None | Some(Value::Null) => ErrorDetail::Empty,
            Some(Value::String(s)) if s.is_empty() => ErrorDetail::Empty,
            Some(Value::String(s)) => ErrorDetail::Message(s.clone()),
            Some(Value::Array(items)) if items.is_empty() => ErrorDetail::Empty,
            Some(Value::Array(items)) => {
                ErrorDetail::Issues(items.iter().map(FieldIssue::from_value).collect())
            }
            Some(other) => ErrorDetail::Message(other.to_string()),
        }
    }

    /// The human-readable form, if there is one.
    pub fn message(&self) -> Option<String> {
        match self {
            ErrorDetail::Message(message) => Some(message.clone()),
            ErrorDetail::Issues(issues) => Some(
                issues
                    .iter()
                    .map(|issue| issue.message.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            ErrorDetail::Empty => None,
        }
    }
}

// =============================================================================
// Gateway Error
// =============================================================================

/// What went wrong on the way to (or back from) the API.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The request never got a response: connection refused, timeout, DNS.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("Request rejected with status {status}")]
    Rejected { status: u16, detail: ErrorDetail },

    /// The response body did not have the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn rejected(status: u16, detail: impl Into<String>) -> Self {
        GatewayError::Rejected {
            status,
            detail: ErrorDetail::Message(detail.into()),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message to show for a failed `op` on `resource`.
    pub fn user_message(&self, resource: ResourceKind, op: Operation) -> String {
        match self {
            GatewayError::Transport(_) | GatewayError::Decode(_) => UNEXPECTED_ERROR.to_string(),
            GatewayError::Rejected { detail, .. } => detail
                .message()
                .unwrap_or_else(|| resource.failure_message(op)),
        }
    }

    /// Transport failures and server-side errors may succeed on a second try.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Transport(_) => true,
            GatewayError::Rejected { status, .. } => *status >= 500,
            GatewayError::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

// =============================================================================
// Client Error
// =============================================================================

/// Client error type covering configuration, session and store failures.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid console configuration.
    #[error("Invalid console configuration: {0}")]
    InvalidConfig(String),

    /// Invalid API base URL.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// Reading or writing the persisted token failed.
    #[error("Session storage error: {0}")]
    SessionStorage(String),

    /// A form was refused before anything was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Gateway / Store Errors
    // =========================================================================
    /// A raw gateway failure outside of any store operation.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A store operation failed. `message` is already normalized for display.
    #[error("{message}")]
    Failed {
        resource: ResourceKind,
        op: Operation,
        message: String,
        cause: GatewayError,
    },

    /// Mutation refused because the collection is still loading.
    #[error("The {resource} list is still loading, try again shortly")]
    Busy { resource: ResourceKind },

    /// Branch operations need a current company.
    #[error("No company selected")]
    NoCompanySelected,

    /// The store went away before the operation settled.
    #[error("The {resource} store was closed before the {op} settled")]
    StoreDropped {
        resource: ResourceKind,
        op: Operation,
    },
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Gateway(err.into())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Gateway(err.into())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Returns true if a manual retry has a chance of succeeding.
    ///
    /// Stores never retry on their own; this only drives a retry button.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Gateway(cause) | ClientError::Failed { cause, .. } => cause.is_retryable(),
            ClientError::Busy { .. } => true,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }

    /// Message suitable for a notification.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Failed { message, .. } => message.clone(),
            ClientError::Gateway(GatewayError::Rejected { detail, .. }) => detail
                .message()
                .unwrap_or_else(|| UNEXPECTED_ERROR.to_string()),
            ClientError::Gateway(_) | ClientError::StoreDropped { .. } => {
                UNEXPECTED_ERROR.to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detail_string_is_verbatim() {
        let detail = ErrorDetail::from_body(&json!({ "detail": "Category name already exists" }));
        assert_eq!(detail.message().as_deref(), Some("Category name already exists"));
    }

    #[test]
    fn test_detail_list_joins_messages() {
        let detail = ErrorDetail::from_body(&json!({
            "detail": [
                { "loc": ["body", "name"], "msg": "field required" },
                "plain issue",
                { "loc": ["body", "code"] }
            ]
        }));
        assert_eq!(
            detail.message().as_deref(),
            Some(r#"field required, plain issue, {"loc":["body","code"]}"#)
        );
    }

    #[test]
    fn test_missing_detail_is_empty() {
        assert_eq!(ErrorDetail::from_body(&json!({})), ErrorDetail::Empty);
        assert_eq!(ErrorDetail::from_body(&json!({ "detail": "" })), ErrorDetail::Empty);
        assert_eq!(ErrorDetail::from_body(&json!({ "detail": [] })), ErrorDetail::Empty);
        assert_eq!(ErrorDetail::from_body(&Value::Null), ErrorDetail::Empty);
    }

    #[test]
    fn test_user_message_normalization() {
        let transport = GatewayError::Transport("connection refused".into());
        assert_eq!(
            transport.user_message(ResourceKind::Category, Operation::Fetch),
            UNEXPECTED_ERROR
        );

        let silent = GatewayError::Rejected {
            status: 500,
            detail: ErrorDetail::Empty,
        };
        assert_eq!(
            silent.user_message(ResourceKind::Category, Operation::Fetch),
            "Failed to fetch categories"
        );
        assert_eq!(
            silent.user_message(ResourceKind::InventoryItem, Operation::Update),
            "Failed to update inventory item"
        );

        let verbose = GatewayError::rejected(400, "Name taken");
        assert_eq!(
            verbose.user_message(ResourceKind::Company, Operation::Create),
            "Name taken"
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(GatewayError::Transport("timeout".into()).is_retryable());
        assert!(GatewayError::rejected(503, "down").is_retryable());
        assert!(!GatewayError::rejected(422, "bad").is_retryable());
        assert!(!GatewayError::Decode("eof".into()).is_retryable());

        assert!(ClientError::Busy {
            resource: ResourceKind::Category
        }
        .is_retryable());
        assert!(!ClientError::InvalidConfig("bad".into()).is_retryable());
        assert!(ClientError::InvalidUrl("x".into()).is_config_error());
    }

    #[test]
    fn test_failed_displays_normalized_message() {
        let err = ClientError::Failed {
            resource: ResourceKind::Category,
            op: Operation::Create,
            message: "Name taken".into(),
            cause: GatewayError::rejected(400, "Name taken"),
        };
        assert_eq!(err.to_string(), "Name taken");
        assert_eq!(err.user_message(), "Name taken");
    }
}
