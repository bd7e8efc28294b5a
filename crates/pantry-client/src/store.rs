//! # Entity Store
//!
//! Local cache of one remote collection, with a load phase and CRUD
//! operations that settle asynchronously.
//!
//! ## Phase Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Collection Phases                                │
//! │                                                                         │
//! │            fetch / create / update / delete issued                      │
//! │   ┌──────┐        (error cleared)        ┌─────────┐                    │
//! │   │ Idle │ ─────────────────────────────►│ Loading │                    │
//! │   └──────┘          ┌───────────────────►└────┬────┘                    │
//! │                     │                         │                         │
//! │                     │ next operation          ├── success ──► Ready     │
//! │                     │                         │   (items updated)       │
//! │              ┌──────┴──────┐                  │                         │
//! │              │ Ready/Failed│◄─────────────────┴── failure ──► Failed    │
//! │              └─────────────┘                      (items untouched,     │
//! │                                                    lastError set)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Settlement
//! Operations return a [`Pending`] immediately. The gateway call runs on a
//! spawned task that holds only a weak reference to the collection; if the
//! store has been dropped by the time the response arrives, the response is
//! discarded.
//!
//! | Operation      | Request              | On success                          |
//! |----------------|----------------------|-------------------------------------|
//! | `fetch_all()`  | `GET {base}`         | items replaced, server order        |
//! | `create(d)`    | `POST {base}`        | server entity appended              |
//! | `update(id,p)` | `PUT {base}/{id}`    | entity with `id` replaced in place  |
//! | `delete(id)`   | `DELETE {base}/{id}` | first entity with `id` removed      |
//!
//! Failures never escape as panics: every one becomes `Failed` plus a
//! normalized `last_error`, an optional error notification, and an `Err`
//! for whoever awaits the [`Pending`].

use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use pantry_core::{EntityId, Operation, Resource, ResourceKind};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::{MutationPolicy, StoreSettings};
use crate::error::{ClientError, ClientResult, GatewayError};
use crate::gateway::{Gateway, GatewayRequest};
use crate::notify::{NotificationCenter, NotificationKind};

// =============================================================================
// Phase
// =============================================================================

/// Load phase of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// An operation is in flight.
    Loading,
    /// The last operation to settle succeeded.
    Ready,
    /// The last operation to settle failed; `last_error` says why.
    Failed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Loading => write!(f, "loading"),
            Phase::Ready => write!(f, "ready"),
            Phase::Failed => write!(f, "failed"),
        }
    }
}

/// Consistent copy of a collection's state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<R> {
    pub items: Vec<R>,
    pub phase: Phase,
    pub last_error: Option<String>,
}

// =============================================================================
// Pending
// =============================================================================

enum Settlement<T> {
    Ready(ClientResult<T>),
    Running(JoinHandle<ClientResult<T>>),
}

/// Handle to an issued store operation.
///
/// Dropping it does not cancel anything; the operation still settles into the
/// store. Await [`Pending::settled`] to get the outcome explicitly.
pub struct Pending<T> {
    resource: ResourceKind,
    op: Operation,
    settlement: Settlement<T>,
}

impl<T> Pending<T> {
    pub(crate) fn spawned(resource: ResourceKind, op: Operation, handle: JoinHandle<ClientResult<T>>) -> Self {
        Pending {
            resource,
            op,
            settlement: Settlement::Running(handle),
        }
    }

    pub(crate) fn ready(resource: ResourceKind, op: Operation, result: ClientResult<T>) -> Self {
        Pending {
            resource,
            op,
            settlement: Settlement::Ready(result),
        }
    }

    pub fn resource(&self) -> ResourceKind {
        self.resource
    }

    pub fn operation(&self) -> Operation {
        self.op
    }

    pub fn is_settled(&self) -> bool {
        match &self.settlement {
            Settlement::Ready(_) => true,
            Settlement::Running(handle) => handle.is_finished(),
        }
    }

    /// Waits for the outcome.
    pub async fn settled(self) -> ClientResult<T> {
        match self.settlement {
            Settlement::Ready(result) => result,
            Settlement::Running(handle) => match handle.await {
                Ok(result) => result,
                Err(e) => {
                    error!(resource = %self.resource, op = %self.op, error = %e, "Store task did not complete");
                    Err(ClientError::StoreDropped {
                        resource: self.resource,
                        op: self.op,
                    })
                }
            },
        }
    }
}

impl<T> std::fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pending")
            .field("resource", &self.resource)
            .field("op", &self.op)
            .field("settled", &self.is_settled())
            .finish()
    }
}

// =============================================================================
// Shared Collection State
// =============================================================================

#[derive(Debug)]
struct CollectionState<R> {
    items: Vec<R>,
    phase: Phase,
    last_error: Option<String>,
    /// At least one operation has succeeded.
    synced: bool,
}

impl<R> Default for CollectionState<R> {
    fn default() -> Self {
        CollectionState {
            items: Vec::new(),
            phase: Phase::Idle,
            last_error: None,
            synced: false,
        }
    }
}

#[derive(Debug)]
struct Shared<R> {
    state: RwLock<CollectionState<R>>,
    revision: watch::Sender<u64>,
}

impl<R> Shared<R> {
    fn read(&self) -> RwLockReadGuard<'_, CollectionState<R>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` on the state and bumps the revision.
    fn update<T>(&self, f: impl FnOnce(&mut CollectionState<R>) -> T) -> T {
        let result = {
            let mut state: RwLockWriteGuard<'_, CollectionState<R>> =
                self.state.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut state)
        };
        self.revision.send_modify(|revision| *revision += 1);
        result
    }

    fn begin(&self) {
        self.update(|state| {
            state.phase = Phase::Loading;
            state.last_error = None;
        });
    }

    fn succeed<T>(&self, apply: impl FnOnce(&mut Vec<R>) -> T) -> T {
        self.update(|state| {
            let result = apply(&mut state.items);
            state.phase = Phase::Ready;
            state.last_error = None;
            state.synced = true;
            result
        })
    }

    fn fail(&self, message: String) {
        self.update(|state| {
            state.phase = Phase::Failed;
            state.last_error = Some(message);
        });
    }
}

// =============================================================================
// Entity Store
// =============================================================================

/// Cache of the remote collection of `R`.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use pantry_client::{EntityStore, InMemoryGateway, Phase};
/// use pantry_core::{Category, CategoryDraft};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = EntityStore::<Category>::new(Arc::new(InMemoryGateway::new()));
///
/// let created = store.create(CategoryDraft::new("Pastries")).settled().await.unwrap();
/// assert_eq!(store.items(), vec![created]);
/// assert_eq!(store.phase(), Phase::Ready);
/// # }
/// ```
pub struct EntityStore<R: Resource> {
    shared: Arc<Shared<R>>,
    gateway: Arc<dyn Gateway>,
    policy: MutationPolicy,
    notifications: Option<Arc<NotificationCenter>>,
    /// Completion signal of the last queued mutation (single-flight only).
    flight_tail: Mutex<Option<oneshot::Receiver<()>>>,
}

/// Turn in the single-flight queue: wait for `previous`, release `done` when
/// finished (dropping the sender is the signal).
struct FlightTicket {
    previous: Option<oneshot::Receiver<()>>,
    done: oneshot::Sender<()>,
}

impl<R: Resource> EntityStore<R> {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        let (revision, _) = watch::channel(0);
        EntityStore {
            shared: Arc::new(Shared {
                state: RwLock::new(CollectionState::default()),
                revision,
            }),
            gateway,
            policy: MutationPolicy::default(),
            notifications: None,
            flight_tail: Mutex::new(None),
        }
    }

    /// Store configured from the `[store]` section.
    pub fn from_settings(
        gateway: Arc<dyn Gateway>,
        settings: &StoreSettings,
        notifications: Option<Arc<NotificationCenter>>,
    ) -> Self {
        let store = Self::new(gateway).with_policy(settings.mutation_policy);
        match notifications {
            Some(center) if settings.notify_failures => store.with_notifications(center),
            _ => store,
        }
    }

    pub fn with_policy(mut self, policy: MutationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Failures are also pushed to `center` as error notifications.
    pub fn with_notifications(mut self, center: Arc<NotificationCenter>) -> Self {
        self.notifications = Some(center);
        self
    }

    pub fn kind(&self) -> ResourceKind {
        R::KIND
    }

    pub fn policy(&self) -> MutationPolicy {
        self.policy
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Items in server order.
    pub fn items(&self) -> Vec<R> {
        self.shared.read().items.clone()
    }

    /// Runs `f` over the items without copying them.
    pub fn read<T>(&self, f: impl FnOnce(&[R]) -> T) -> T {
        f(&self.shared.read().items)
    }

    pub fn phase(&self) -> Phase {
        self.shared.read().phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase() == Phase::Loading
    }

    /// Normalized message of the last failure. Only present while `Failed`.
    pub fn last_error(&self) -> Option<String> {
        self.shared.read().last_error.clone()
    }

    pub fn snapshot(&self) -> Snapshot<R> {
        let state = self.shared.read();
        Snapshot {
            items: state.items.clone(),
            phase: state.phase,
            last_error: state.last_error.clone(),
        }
    }

    /// First entity with `id`.
    pub fn get(&self, id: EntityId) -> Option<R> {
        self.shared
            .read()
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    /// Dismisses the last error. A `Failed` collection goes back to `Ready`
    /// if anything ever succeeded, to `Idle` otherwise.
    pub fn clear_error(&self) {
        self.shared.update(|state| {
            if state.phase == Phase::Failed {
                state.phase = if state.synced { Phase::Ready } else { Phase::Idle };
            }
            state.last_error = None;
        });
    }

    /// Revision counter bumped on every state change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Reloads the whole collection. Settles with the number of items loaded.
    pub fn fetch_all(&self) -> Pending<usize> {
        self.run(
            Operation::Fetch,
            None,
            GatewayRequest::get(R::KIND.base_path()),
            decode::<Vec<R>>,
            |items, fresh| {
                *items = fresh;
                items.len()
            },
        )
    }

    /// Creates an entity. It is appended once the server returns it with an id.
    pub fn create(&self, draft: R::Draft) -> Pending<R> {
        let body = match serde_json::to_value(&draft) {
            Ok(body) => body,
            Err(e) => return self.unsendable(Operation::Create, e),
        };
        self.run(
            Operation::Create,
            None,
            GatewayRequest::post(R::KIND.base_path(), body),
            decode::<R>,
            |items, created| {
                items.push(created.clone());
                created
            },
        )
    }

    /// Updates entity `id` with `patch`. The server's full representation
    /// replaces the local entity in place.
    pub fn update(&self, id: EntityId, patch: R::Patch) -> Pending<R> {
        let body = match serde_json::to_value(&patch) {
            Ok(body) => body,
            Err(e) => return self.unsendable(Operation::Update, e),
        };
        self.run(
            Operation::Update,
            Some(id),
            GatewayRequest::put(R::KIND.member_path(id), body),
            decode::<R>,
            move |items, updated| {
                match items.iter().position(|item| item.id() == id) {
                    Some(pos) => items[pos] = updated.clone(),
                    None => warn!(
                        resource = %R::KIND,
                        id,
                        "Updated entity is not in the local list, response dropped"
                    ),
                }
                updated
            },
        )
    }

    /// Deletes entity `id`.
    pub fn delete(&self, id: EntityId) -> Pending<()> {
        self.run(
            Operation::Delete,
            Some(id),
            GatewayRequest::delete(R::KIND.member_path(id)),
            |_| Ok(()),
            move |items, ()| {
                if let Some(pos) = items.iter().position(|item| item.id() == id) {
                    items.remove(pos);
                }
            },
        )
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// A draft or patch that cannot be serialized never reaches the gateway.
    fn unsendable<T>(&self, op: Operation, err: serde_json::Error) -> Pending<T> {
        error!(resource = %R::KIND, %op, error = %err, "Request body could not be serialized");
        let cause = GatewayError::from(err);
        let message = self.record_failure(op, &cause);
        Pending::ready(
            R::KIND,
            op,
            Err(ClientError::Failed {
                resource: R::KIND,
                op,
                message,
                cause,
            }),
        )
    }

    fn record_failure(&self, op: Operation, cause: &GatewayError) -> String {
        let message = cause.user_message(R::KIND, op);
        self.shared.fail(message.clone());
        if let Some(center) = &self.notifications {
            center.notify(NotificationKind::Error, message.clone());
        }
        message
    }

    /// Takes the next turn in the single-flight queue.
    fn take_ticket(&self) -> FlightTicket {
        let (done, next_tail) = oneshot::channel();
        let mut tail = self.flight_tail.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = tail.replace(next_tail);
        FlightTicket { previous, done }
    }

    fn run<D, T>(
        &self,
        op: Operation,
        id: Option<EntityId>,
        request: GatewayRequest,
        decode: impl FnOnce(Value) -> Result<D, GatewayError> + Send + 'static,
        apply: impl FnOnce(&mut Vec<R>, D) -> T + Send + 'static,
    ) -> Pending<T>
    where
        D: Send + 'static,
        T: Send + 'static,
    {
        let ticket = if op.is_mutation() {
            match self.policy {
                MutationPolicy::RejectWhileLoading if self.is_loading() => {
                    debug!(resource = %R::KIND, %op, "Mutation refused while loading");
                    return Pending::ready(R::KIND, op, Err(ClientError::Busy { resource: R::KIND }));
                }
                MutationPolicy::SingleFlight => Some(self.take_ticket()),
                _ => None,
            }
        } else {
            None
        };

        self.shared.begin();
        debug!(resource = %R::KIND, %op, ?id, method = %request.method, path = %request.path, "Operation issued");

        let weak: Weak<Shared<R>> = Arc::downgrade(&self.shared);
        let gateway = Arc::clone(&self.gateway);
        let notifications = self.notifications.clone();

        let handle = tokio::spawn(async move {
            let _done = match ticket {
                Some(FlightTicket { previous, done }) => {
                    if let Some(previous) = previous {
                        // Err only means the previous holder is gone, which is our turn too
                        let _ = previous.await;
                    }
                    Some(done)
                }
                None => None,
            };

            let response = gateway.send(request).await;

            let Some(shared) = weak.upgrade() else {
                debug!(resource = %R::KIND, %op, "Store dropped before settlement, response discarded");
                return Err(ClientError::StoreDropped {
                    resource: R::KIND,
                    op,
                });
            };

            match response.and_then(decode) {
                Ok(decoded) => {
                    let result = shared.succeed(|items| apply(items, decoded));
                    info!(resource = %R::KIND, %op, ?id, "Operation settled");
                    Ok(result)
                }
                Err(cause) => {
                    let message = cause.user_message(R::KIND, op);
                    match &cause {
                        GatewayError::Decode(detail) => {
                            error!(resource = %R::KIND, %op, ?id, %detail, "Response did not decode")
                        }
                        other => {
                            warn!(resource = %R::KIND, %op, ?id, error = %other, %message, "Operation failed")
                        }
                    }
                    shared.fail(message.clone());
                    if let Some(center) = notifications {
                        center.notify(NotificationKind::Error, message.clone());
                    }
                    Err(ClientError::Failed {
                        resource: R::KIND,
                        op,
                        message,
                        cause,
                    })
                }
            }
        });

        Pending::spawned(R::KIND, op, handle)
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value).map_err(GatewayError::from)
}

impl<R: Resource> std::fmt::Debug for EntityStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.read();
        f.debug_struct("EntityStore")
            .field("resource", &R::KIND)
            .field("items", &state.items.len())
            .field("phase", &state.phase)
            .field("policy", &self.policy)
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
