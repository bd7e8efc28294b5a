//! # Company Context
//!
//! The company the console is currently working in, plus its branches.
//!
//! Selecting a company loads `GET /companies/{id}` and then
//! `GET /companies/{id}/stores`. Both share one phase and one error, with the
//! same rules as an [`EntityStore`](crate::EntityStore): issuing flips to
//! `Loading` and clears the error; a failure keeps whatever was loaded before.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, Weak};

use pantry_core::{build_forest, Company, EntityId, Operation, Resource, ResourceKind, Store, TreeNode};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult, GatewayError, UNEXPECTED_ERROR};
use crate::gateway::{Gateway, GatewayRequest};
use crate::notify::{NotificationCenter, NotificationKind};
use crate::store::{Pending, Phase};

#[derive(Debug, Default)]
struct CompanyState {
    current: Option<Company>,
    stores: Vec<Store>,
    phase: Phase,
    last_error: Option<String>,
}

#[derive(Debug)]
struct Shared {
    state: RwLock<CompanyState>,
    revision: watch::Sender<u64>,
}

impl Shared {
    fn read(&self) -> RwLockReadGuard<'_, CompanyState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(&mut CompanyState)) {
        f(&mut self.state.write().unwrap_or_else(PoisonError::into_inner));
        self.revision.send_modify(|revision| *revision += 1);
    }
}

/// Current company and its branches.
pub struct CompanyContext {
    shared: Arc<Shared>,
    gateway: Arc<dyn Gateway>,
    notifications: Option<Arc<NotificationCenter>>,
}

impl CompanyContext {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        let (revision, _) = watch::channel(0);
        CompanyContext {
            shared: Arc::new(Shared {
                state: RwLock::new(CompanyState::default()),
                revision,
            }),
            gateway,
            notifications: None,
        }
    }

    pub fn with_notifications(mut self, center: Arc<NotificationCenter>) -> Self {
        self.notifications = Some(center);
        self
    }

    pub fn current(&self) -> Option<Company> {
        self.shared.read().current.clone()
    }

    pub fn stores(&self) -> Vec<Store> {
        self.shared.read().stores.clone()
    }

    /// Branch hierarchy of the current company.
    pub fn store_forest(&self) -> Vec<TreeNode<Store>> {
        build_forest(&self.shared.read().stores)
    }

    pub fn phase(&self) -> Phase {
        self.shared.read().phase
    }

    pub fn last_error(&self) -> Option<String> {
        self.shared.read().last_error.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    /// Forgets the current company.
    pub fn clear(&self) {
        self.shared.update(|state| *state = CompanyState::default());
    }

    /// Makes company `id` current and loads its branches.
    pub fn select(&self, id: EntityId) -> Pending<Company> {
        self.begin();
        let weak = Arc::downgrade(&self.shared);
        let gateway = Arc::clone(&self.gateway);
        let notifications = self.notifications.clone();

        let handle = tokio::spawn(async move {
            let company = gateway
                .send(GatewayRequest::get(Company::KIND.member_path(id)))
                .await
                .and_then(decode::<Company>);
            let company = match company {
                Ok(company) => company,
                Err(cause) => {
                    return settle_failure(&weak, notifications.as_deref(), cause, "Failed to fetch company")
                }
            };

            let stores = gateway
                .send(GatewayRequest::get(stores_path(id)))
                .await
                .and_then(decode::<Vec<Store>>);

            let Some(shared) = weak.upgrade() else {
                return Err(dropped());
            };
            match stores {
                Ok(stores) => {
                    info!(company = id, stores = stores.len(), "Company selected");
                    shared.update(|state| {
                        state.current = Some(company.clone());
                        state.stores = stores;
                        state.phase = Phase::Ready;
                        state.last_error = None;
                    });
                    Ok(company)
                }
                Err(cause) => {
                    drop(shared);
                    settle_failure(&weak, notifications.as_deref(), cause, "Failed to fetch stores")
                }
            }
        });

        Pending::spawned(ResourceKind::Company, Operation::Fetch, handle)
    }

    /// Reloads the branches of the current company.
    pub fn refresh_stores(&self) -> Pending<usize> {
        let Some(company_id) = self.current().map(|company| company.id) else {
            return Pending::ready(
                ResourceKind::Company,
                Operation::Fetch,
                Err(ClientError::NoCompanySelected),
            );
        };

        self.begin();
        let weak = Arc::downgrade(&self.shared);
        let gateway = Arc::clone(&self.gateway);
        let notifications = self.notifications.clone();

        let handle = tokio::spawn(async move {
            let stores = gateway
                .send(GatewayRequest::get(stores_path(company_id)))
                .await
                .and_then(decode::<Vec<Store>>);
            match stores {
                Ok(stores) => {
                    let shared = weak.upgrade().ok_or_else(dropped)?;
                    let count = stores.len();
                    shared.update(|state| {
                        state.stores = stores;
                        state.phase = Phase::Ready;
                        state.last_error = None;
                    });
                    debug!(company = company_id, count, "Stores refreshed");
                    Ok(count)
                }
                Err(cause) => settle_failure(&weak, notifications.as_deref(), cause, "Failed to fetch stores"),
            }
        });

        Pending::spawned(ResourceKind::Company, Operation::Fetch, handle)
    }

    fn begin(&self) {
        self.shared.update(|state| {
            state.phase = Phase::Loading;
            state.last_error = None;
        });
    }
}

fn stores_path(company_id: EntityId) -> String {
    format!("{}/stores", Company::KIND.member_path(company_id))
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value).map_err(GatewayError::from)
}

fn dropped() -> ClientError {
    debug!("Company context dropped before settlement, response discarded");
    ClientError::StoreDropped {
        resource: ResourceKind::Company,
        op: Operation::Fetch,
    }
}

fn settle_failure<T>(
    weak: &Weak<Shared>,
    notifications: Option<&NotificationCenter>,
    cause: GatewayError,
    fallback: &str,
) -> ClientResult<T> {
    let shared = weak.upgrade().ok_or_else(dropped)?;
    let message = match &cause {
        GatewayError::Rejected { detail, .. } => detail.message().unwrap_or_else(|| fallback.to_string()),
        GatewayError::Transport(_) | GatewayError::Decode(_) => UNEXPECTED_ERROR.to_string(),
    };
    warn!(error = %cause, %message, "Company request failed");
    shared.update(|state| {
        state.phase = Phase::Failed;
        state.last_error = Some(message.clone());
    });
    if let Some(center) = notifications {
        center.notify(NotificationKind::Error, message.clone());
    }
    Err(ClientError::Failed {
        resource: ResourceKind::Company,
        op: Operation::Fetch,
        message,
        cause,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorDetail;
    use crate::gateway::InMemoryGateway;

    fn context(gw: &Arc<InMemoryGateway>) -> CompanyContext {
        CompanyContext::new(Arc::clone(gw) as Arc<dyn Gateway>)
    }

    #[tokio::test]
    async fn test_select_loads_company_and_branches() {
        let gw = Arc::new(InMemoryGateway::demo());
        let ctx = context(&gw);

        let company = ctx.select(100).settled().await.unwrap();
        assert_eq!(company.name, "Crumb & Co");
        assert!(company.has_module("bakery"));
        assert_eq!(ctx.phase(), Phase::Ready);
        assert_eq!(ctx.stores().len(), 3);

        let forest = ctx.store_forest();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].entity.code, "MAIN");
        assert_eq!(forest[0].children.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_company_fails_and_keeps_previous() {
        let gw = Arc::new(InMemoryGateway::demo());
        let ctx = context(&gw);
        ctx.select(100).settled().await.unwrap();

        let err = ctx.select(7).settled().await.unwrap_err();
        assert_eq!(err.user_message(), "Record 7 not found");
        assert_eq!(ctx.phase(), Phase::Failed);
        assert_eq!(ctx.current().map(|c| c.id), Some(100));
        assert_eq!(ctx.stores().len(), 3);
    }

    #[tokio::test]
    async fn test_store_failure_without_detail_uses_fallback() {
        let gw = Arc::new(InMemoryGateway::demo());
        let center = Arc::new(NotificationCenter::new());
        let ctx = context(&gw).with_notifications(Arc::clone(&center));
        ctx.select(100).settled().await.unwrap();

        gw.fail_next(GatewayError::Rejected {
            status: 500,
            detail: ErrorDetail::Empty,
        });
        ctx.refresh_stores().settled().await.unwrap_err();

        assert_eq!(ctx.last_error().as_deref(), Some("Failed to fetch stores"));
        assert_eq!(center.list()[0].message, "Failed to fetch stores");
    }

    #[tokio::test]
    async fn test_refresh_without_selection_is_refused() {
        let gw = Arc::new(InMemoryGateway::demo());
        let ctx = context(&gw);
        assert!(matches!(
            ctx.refresh_stores().settled().await,
            Err(ClientError::NoCompanySelected)
        ));
        assert!(gw.requests().is_empty());
        assert_eq!(ctx.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_clear_forgets_company() {
        let gw = Arc::new(InMemoryGateway::demo());
        let ctx = context(&gw);
        ctx.select(100).settled().await.unwrap();
        ctx.clear();
        assert!(ctx.current().is_none());
        assert!(ctx.stores().is_empty());
        assert_eq!(ctx.phase(), Phase::Idle);
    }
}
