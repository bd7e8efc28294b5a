//! # Console
//!
//! The set of stores one admin console session works with.

use std::sync::Arc;

use pantry_core::{Category, Company, InventoryItem, ResourceKind};
use tracing::info;

use crate::auth::Auth;
use crate::company::CompanyContext;
use crate::config::{ConsoleConfig, StoreSettings};
use crate::error::ClientResult;
use crate::gateway::{Gateway, HttpGateway};
use crate::notify::NotificationCenter;
use crate::session::Session;
use crate::store::EntityStore;

/// One store per resource, a company context, sign-in and the shared
/// notification queue, all talking to the same gateway.
pub struct Console {
    pub categories: EntityStore<Category>,
    pub inventory: EntityStore<InventoryItem>,
    pub companies: EntityStore<Company>,
    pub company: CompanyContext,
    pub auth: Auth,
    pub notifications: Arc<NotificationCenter>,
}

impl Console {
    /// Console with a session that lives only as long as the process.
    pub fn new(gateway: Arc<dyn Gateway>, settings: &StoreSettings) -> Self {
        Self::with_session(gateway, settings, Arc::new(Session::in_memory()))
    }

    /// Console whose sign-in starts and ends `session`. Pass the session the
    /// gateway reads its bearer token from.
    pub fn with_session(gateway: Arc<dyn Gateway>, settings: &StoreSettings, session: Arc<Session>) -> Self {
        let notifications = Arc::new(NotificationCenter::new());
        let center = Some(Arc::clone(&notifications));

        let mut company = CompanyContext::new(Arc::clone(&gateway));
        if settings.notify_failures {
            company = company.with_notifications(Arc::clone(&notifications));
        }

        Console {
            categories: EntityStore::from_settings(Arc::clone(&gateway), settings, center.clone()),
            inventory: EntityStore::from_settings(Arc::clone(&gateway), settings, center.clone()),
            companies: EntityStore::from_settings(Arc::clone(&gateway), settings, center),
            company,
            auth: Auth::new(gateway, session),
            notifications,
        }
    }

    /// Console backed by the HTTP API described in `config`.
    pub fn connect(config: &ConsoleConfig, session: Arc<Session>) -> ClientResult<Self> {
        let gateway = HttpGateway::new(&config.api, Arc::clone(&session))?;
        info!(base_url = %config.api.base_url, policy = %config.store.mutation_policy, "Console connected");
        Ok(Self::with_session(Arc::new(gateway), &config.store, session))
    }

    /// Loads every collection concurrently. Each result is independent: one
    /// failing collection does not hold back the others.
    pub async fn refresh_all(&self) -> Vec<(ResourceKind, ClientResult<usize>)> {
        let (categories, inventory, companies) = tokio::join!(
            self.categories.fetch_all().settled(),
            self.inventory.fetch_all().settled(),
            self.companies.fetch_all().settled(),
        );
        vec![
            (ResourceKind::Category, categories),
            (ResourceKind::InventoryItem, inventory),
            (ResourceKind::Company, companies),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::gateway::InMemoryGateway;
    use crate::store::Phase;

    #[tokio::test]
    async fn test_refresh_all_loads_every_collection() {
        let console = Console::new(Arc::new(InMemoryGateway::demo()), &StoreSettings::default());

        let results = console.refresh_all().await;
        let counts: Vec<usize> = results.into_iter().map(|(_, r)| r.unwrap()).collect();
        assert_eq!(counts, vec![6, 12, 1]);
        assert!(console.notifications.is_empty());
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_the_rest() {
        let gw = Arc::new(InMemoryGateway::demo());
        let console = Console::new(Arc::clone(&gw) as Arc<dyn Gateway>, &StoreSettings::default());

        // Tasks run in issue order on the test runtime, so categories fail
        gw.fail_next(GatewayError::Transport("reset".into()));
        let results = console.refresh_all().await;

        assert!(results[0].1.is_err());
        assert!(results[1].1.is_ok());
        assert_eq!(console.categories.phase(), Phase::Failed);
        assert_eq!(console.inventory.phase(), Phase::Ready);
        assert_eq!(console.notifications.list().len(), 1);
    }

    #[tokio::test]
    async fn test_sign_in_shares_the_given_session() {
        let session = Arc::new(Session::in_memory());
        let console = Console::with_session(
            Arc::new(InMemoryGateway::demo()),
            &StoreSettings::default(),
            Arc::clone(&session),
        );

        let credentials = pantry_core::Credentials::new(crate::DEMO_EMAIL, crate::DEMO_PASSWORD);
        console.auth.login(&credentials).await.unwrap();
        assert!(session.is_authenticated());

        console.auth.logout();
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_notifications_can_be_disabled() {
        let gw = Arc::new(InMemoryGateway::new());
        let settings = StoreSettings {
            notify_failures: false,
            ..StoreSettings::default()
        };
        let console = Console::new(Arc::clone(&gw) as Arc<dyn Gateway>, &settings);

        gw.fail_next(GatewayError::Transport("reset".into()));
        console.categories.fetch_all().settled().await.unwrap_err();
        assert!(console.notifications.is_empty());
    }
}
