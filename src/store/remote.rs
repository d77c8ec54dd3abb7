//! Remote collection store for city visits.
//!
//! Owns the cached collection, the focused city, and the request status.
//! Consumers read snapshots or subscribe; only the operations here write.
//!
//! Operations are serialized per store: each waits for the previous one to
//! settle before it enters `Pending`, so completions apply in call order.
//! After [`CityStore::close`], in-flight completions are discarded and new
//! operations do nothing. Dropping an operation's future mid-request puts
//! the store back to `Idle` and lets the next queued operation run.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex, MutexGuard};
use tracing::Instrument;
use uuid::Uuid;

use crate::city::{CityDraft, IntoRecordId};
use crate::mvi::Reducer;
use crate::transport::{CityTransport, TransportError};

use super::intent::CitiesIntent;
use super::operation::Operation;
use super::reducer::{dedup_by_id, CitiesReducer};
use super::state::CitiesState;

/// Cheaply cloneable handle; all clones share one store.
pub struct CityStore<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for CityStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<T> {
    transport: T,
    state: watch::Sender<CitiesState>,
    /// Held by the running operation for its whole lifetime.
    gate: Mutex<()>,
    /// Bumped on close; completions from an older generation are dropped.
    generation: AtomicU64,
    closed: AtomicBool,
    initialized: AtomicBool,
}

/// Permission to run one operation. Holds the gate until dropped.
///
/// A ticket dropped between `start` and `settle` (the caller gave up on
/// the operation's future) puts the store back to `Idle`.
struct Ticket<'a, T> {
    inner: &'a Inner<T>,
    _gate: MutexGuard<'a, ()>,
    generation: u64,
    operation: Operation,
    pending: bool,
}

impl<T: CityTransport> CityStore<T> {
    /// Creates an empty, idle store. Nothing is fetched until
    /// [`initialize`](Self::initialize).
    pub fn new(transport: T) -> Self {
        let (state, _) = watch::channel(CitiesState::default());
        Self {
            inner: Arc::new(Inner {
                transport,
                state,
                gate: Mutex::new(()),
                generation: AtomicU64::new(0),
                closed: AtomicBool::new(false),
                initialized: AtomicBool::new(false),
            }),
        }
    }

    /// Creates a store and performs the initial collection load.
    pub async fn open(transport: T) -> Self {
        let store = Self::new(transport);
        store.initialize().await;
        store
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> CitiesState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes one update per settled operation.
    pub fn subscribe(&self) -> watch::Receiver<CitiesState> {
        self.inner.state.subscribe()
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Initial collection load. Runs at most once per store; later calls
    /// return immediately. Use [`reload`](Self::reload) to refetch.
    pub async fn initialize(&self) {
        if self.inner.initialized.swap(true, Ordering::SeqCst) {
            tracing::trace!("store already initialized");
            return;
        }
        self.reload().await;
    }

    /// Replaces the collection with a fresh `GET /cities`.
    pub async fn reload(&self) {
        let operation = Operation::FetchAll;
        async {
            let Some(ticket) = self.begin(operation).await else {
                return;
            };
            let result = self.inner.transport.fetch_all().await;
            ticket.settle(result, |cities| {
                let fetched = cities.len();
                let cities = dedup_by_id(cities);
                if cities.len() != fetched {
                    tracing::warn!(
                        fetched,
                        kept = cities.len(),
                        "Server returned duplicate city ids; keeping first occurrences"
                    );
                }
                tracing::info!(count = cities.len(), "Cities loaded");
                CitiesIntent::CitiesLoaded { cities }
            });
        }
        .instrument(op_span(operation))
        .await
    }

    /// Makes the city with `id` the focus.
    ///
    /// A no-op, with no request and no state change, when that city is
    /// already focused. Ids are compared after numeric coercion, so `"1"`
    /// matches a focused city with id `1`.
    pub async fn focus_on(&self, id: impl IntoRecordId) {
        let operation = Operation::FetchOne;
        let requested = id.into_record_id();
        async {
            let Some(id) = requested else {
                // Not a number: nothing could match it, fail without a request.
                tracing::warn!("Focus requested for a non-numeric city id");
                if let Some(ticket) = self.acquire(operation).await {
                    ticket.reject();
                }
                return;
            };

            let Some(mut ticket) = self.acquire(operation).await else {
                return;
            };
            if self.inner.state.borrow().focus_id() == Some(id) {
                tracing::trace!(%id, "City already focused");
                return;
            }
            ticket.start();
            tracing::debug!(%id, "Loading city");

            let result = self.inner.transport.fetch_one(id).await;
            ticket.settle(result, |city| {
                tracing::info!(id = %city.id, name = %city.name(), "City loaded");
                CitiesIntent::CityLoaded { city }
            });
        }
        .instrument(op_span(operation))
        .await
    }

    /// Persists a new city, appends it to the collection, and focuses it.
    pub async fn create(&self, draft: CityDraft) {
        let operation = Operation::Create;
        async {
            let Some(ticket) = self.begin(operation).await else {
                return;
            };
            let result = self.inner.transport.create(&draft).await;
            ticket.settle(result, |city| {
                tracing::info!(id = %city.id, name = %city.name(), "City created");
                CitiesIntent::CityCreated { city }
            });
        }
        .instrument(op_span(operation))
        .await
    }

    /// Deletes the city with `id` and drops it from the collection.
    ///
    /// The focus is not touched, even when it is the deleted city; see
    /// [`CitiesState::is_focus_stale`].
    pub async fn remove(&self, id: impl IntoRecordId) {
        let operation = Operation::Delete;
        let requested = id.into_record_id();
        async {
            let Some(ticket) = self.begin(operation).await else {
                return;
            };
            let Some(id) = requested else {
                tracing::warn!("Delete requested for a non-numeric city id");
                ticket.reject();
                return;
            };
            let result = self.inner.transport.delete(id).await;
            ticket.settle(result, |()| {
                tracing::info!(%id, "City deleted");
                CitiesIntent::CityDeleted { id }
            });
        }
        .instrument(op_span(operation))
        .await
    }

    /// Tears the store down. Operations still waiting on the network will
    /// not apply their results, and later operations return immediately.
    pub fn close(&self) {
        let inner = &self.inner;
        // Under the state lock so no dispatch interleaves with the bump.
        inner.state.send_if_modified(|_| {
            inner.closed.store(true, Ordering::SeqCst);
            inner.generation.fetch_add(1, Ordering::SeqCst);
            false
        });
        tracing::debug!("City store closed");
    }

    /// Waits for the gate. `None` once the store is closed.
    async fn acquire(&self, operation: Operation) -> Option<Ticket<'_, T>> {
        if self.is_closed() {
            tracing::debug!("Store closed; operation skipped");
            return None;
        }
        let gate = self.inner.gate.lock().await;
        if self.is_closed() {
            tracing::debug!("Store closed while queued; operation skipped");
            return None;
        }
        Some(Ticket {
            inner: &self.inner,
            _gate: gate,
            generation: self.inner.generation.load(Ordering::SeqCst),
            operation,
            pending: false,
        })
    }

    /// Acquires the gate and enters `Pending`.
    async fn begin(&self, operation: Operation) -> Option<Ticket<'_, T>> {
        let mut ticket = self.acquire(operation).await?;
        ticket.start();
        tracing::debug!("Request started");
        Some(ticket)
    }
}

impl<T> Inner<T> {
    /// Runs the reducer and notifies subscribers in one step. Returns false
    /// when the intent belongs to an older generation and was dropped.
    fn dispatch(&self, generation: u64, intent: CitiesIntent) -> bool {
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            let current = std::mem::take(state);
            *state = CitiesReducer::reduce(current, intent);
            true
        })
    }
}

impl<T> Ticket<'_, T> {
    fn dispatch(&self, intent: CitiesIntent) -> bool {
        self.inner.dispatch(self.generation, intent)
    }

    fn start(&mut self) {
        self.dispatch(CitiesIntent::Loading);
        self.pending = true;
    }

    /// Settles as a failure of this ticket's operation.
    fn reject(mut self) {
        self.pending = false;
        self.dispatch(CitiesIntent::Rejected {
            operation: self.operation,
        });
    }

    /// Applies the outcome of the transport call and releases the gate.
    fn settle<V>(
        mut self,
        result: Result<V, TransportError>,
        on_success: impl FnOnce(V) -> CitiesIntent,
    ) {
        self.pending = false;
        let intent = match result {
            Ok(value) => on_success(value),
            Err(err) => {
                tracing::warn!(error = %err, kind = err.kind(), "Request failed");
                CitiesIntent::Rejected {
                    operation: self.operation,
                }
            }
        };
        if !self.dispatch(intent) {
            tracing::debug!("Store closed during request; result discarded");
        }
    }
}

impl<T> Drop for Ticket<'_, T> {
    fn drop(&mut self) {
        // Runs before the gate guard is released.
        if self.pending && self.dispatch(CitiesIntent::Cancelled) {
            tracing::debug!(op = %self.operation, "Operation dropped while pending");
        }
    }
}

fn op_span(operation: Operation) -> tracing::Span {
    tracing::info_span!("city_op", op = %operation, op_id = %Uuid::new_v4())
}
