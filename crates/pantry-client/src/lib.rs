//! # pantry-client: Entity Stores for the Pantry Console
//!
//! Client-side caches of the console's remote collections, the gateway they
//! talk through, and the notification queue they report failures to.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Console Client Architecture                      │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                           Console                                │  │
//! │  │                                                                  │  │
//! │  │  EntityStore<Category>  EntityStore<InventoryItem>               │  │
//! │  │  EntityStore<Company>   CompanyContext (current company+stores)  │  │
//! │  └───────────┬─────────────────────────────────────┬────────────────┘  │
//! │              │ spawned task per operation          │ failures          │
//! │              ▼                                     ▼                   │
//! │  ┌────────────────────────┐            ┌────────────────────────┐     │
//! │  │  Arc<dyn Gateway>      │            │  NotificationCenter    │     │
//! │  │                        │            │                        │     │
//! │  │  HttpGateway (reqwest) │            │  append / dismiss      │     │
//! │  │  InMemoryGateway       │            │  monotonic ids         │     │
//! │  └───────────┬────────────┘            └────────────────────────┘     │
//! │              │ bearer token                                           │
//! │              ▼                                                        │
//! │  ┌────────────────────────┐                                           │
//! │  │  Session               │  ended on any 401                         │
//! │  └────────────────────────┘                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`store`] - `EntityStore<R>`, load phases and `Pending` settlements
//! - [`company`] - Current company and its branch stores
//! - [`console`] - All stores of a console session
//! - [`gateway`] - Request boundary: HTTP and in-memory implementations
//! - [`session`] - Bearer token lifecycle
//! - [`auth`] - Login, registration and the current user
//! - [`notify`] - User-facing notification queue
//! - [`config`] - TOML configuration with environment overrides
//! - [`error`] - Gateway and client error types, message normalization
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pantry_client::{Console, ConsoleConfig, Session};
//!
//! # async fn run() -> pantry_client::ClientResult<()> {
//! let config = ConsoleConfig::load_or_default(None);
//! let session = Arc::new(Session::open(&config.session)?);
//! let console = Console::connect(&config, session)?;
//!
//! for (kind, result) in console.refresh_all().await {
//!     println!("{}: {:?}", kind, result.map_err(|e| e.user_message()));
//! }
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod company;
pub mod config;
pub mod console;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod session;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use auth::Auth;
pub use company::CompanyContext;
pub use config::{ApiSettings, ConsoleConfig, MutationPolicy, SessionSettings, StoreSettings, ViewSettings};
pub use console::Console;
pub use error::{ClientError, ClientResult, ErrorDetail, GatewayError, UNEXPECTED_ERROR};
pub use gateway::{Encoding, Gateway, GatewayRequest, HttpGateway, InMemoryGateway, Method, DEMO_EMAIL, DEMO_PASSWORD};
pub use notify::{Notification, NotificationCenter, NotificationKind};
pub use session::Session;
pub use store::{EntityStore, Pending, Phase, Snapshot};
