//! In-memory [`Database`] implementations.
//!
//! The whole store lives behind one [`tokio::sync::Mutex`]: a
//! [`Transact`]ion takes the owned guard, stages its writes against a
//! copy of the [`State`], and publishes them in a single assignment on
//! [`Commit`]. A dropped, uncommitted transaction leaves the shared
//! [`State`] untouched, so a multi-entity command can never be observed
//! half-applied.

mod impls;

use std::{
    collections::HashMap,
    future::Future,
    mem,
    sync::{Arc, Mutex as SyncMutex, PoisonError},
};

use common::operations::{Commit, Transact};
use derive_more::{Display, Error as StdError};
use tracerr::Traced;

use crate::{
    domain::{audit, booking, payment, project, unit},
    infra::{database, Database},
};

/// In-memory [`Database`].
///
/// Generic over its [`Connection`]: [`NonTx`] auto-commits every
/// operation, [`Tx`] stages them until [`Commit`].
#[derive(Clone, Debug, Default)]
pub struct Memory<C = NonTx> {
    /// [`Connection`] of this [`Memory`] database.
    client: C,
}

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Connection> Memory<C> {
    /// Runs the provided function over the [`State`] behind this
    /// [`Memory`] database's [`Connection`].
    pub(crate) async fn with<F, R>(&self, f: F) -> Result<R, Traced<Error>>
    where
        F: FnOnce(&mut State) -> R,
    {
        self.client.with(f).await
    }
}

/// Whole-store state of a [`Memory`] database.
///
/// Collections are coarse-grained on purpose: the simulated record
/// store this models exposes no partial or indexed update primitive.
#[derive(Clone, Debug, Default)]
pub struct State {
    /// [`project::Project`]s collection.
    pub(crate) projects: HashMap<project::Id, project::Project>,

    /// [`unit::Unit`]s collection.
    pub(crate) units: HashMap<unit::Id, unit::Unit>,

    /// [`booking::Booking`]s collection.
    pub(crate) bookings: HashMap<booking::Id, booking::Booking>,

    /// [`payment::Payment`]s collection.
    pub(crate) payments: HashMap<payment::Id, payment::Payment>,

    /// Append-only audit log.
    pub(crate) audit_log: Vec<audit::Entry>,
}

/// Client connection of a [`Memory`] database.
pub trait Connection {
    /// Runs the provided function over the connected [`State`].
    fn with<F, R>(
        &self,
        f: F,
    ) -> impl Future<Output = Result<R, Traced<Error>>>
    where
        F: FnOnce(&mut State) -> R;
}

/// Auto-committing [`Connection`]: every operation is applied to the
/// shared [`State`] directly.
#[derive(Clone, Debug, Default)]
pub struct NonTx {
    /// Shared [`State`] of the store.
    state: Arc<tokio::sync::Mutex<State>>,
}

impl Connection for NonTx {
    async fn with<F, R>(&self, f: F) -> Result<R, Traced<Error>>
    where
        F: FnOnce(&mut State) -> R,
    {
        Ok(f(&mut *self.state.lock().await))
    }
}

/// Transactional [`Connection`]: holds the store exclusively and stages
/// writes until [`Commit`].
#[derive(Debug)]
pub struct Tx {
    /// Inner representation of this [`Tx`].
    inner: SyncMutex<TxInner>,
}

/// Inner representation of a [`Tx`].
#[derive(Debug)]
struct TxInner {
    /// Exclusively held shared [`State`].
    ///
    /// [`None`] once this [`Tx`] has been committed: [`Commit`] releases
    /// the guard right after publishing, so the store is reachable again
    /// even while the committed [`Tx`] value is still alive.
    shared: Option<tokio::sync::OwnedMutexGuard<State>>,

    /// Staging copy all operations apply to.
    staged: State,
}

impl Connection for Tx {
    async fn with<F, R>(&self, f: F) -> Result<R, Traced<Error>>
    where
        F: FnOnce(&mut State) -> R,
    {
        let mut inner =
            self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.shared.is_none() {
            return Err(tracerr::new!(Error::Committed));
        }
        Ok(f(&mut inner.staged))
    }
}

impl Database<Transact> for Memory {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let shared = Arc::clone(&self.client.state).lock_owned().await;
        let staged = (*shared).clone();
        Ok(Memory {
            client: Tx {
                inner: SyncMutex::new(TxInner {
                    shared: Some(shared),
                    staged,
                }),
            },
        })
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        let mut inner = self
            .client
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(mut shared) = inner.shared.take() else {
            return Err(tracerr::new!(database::Error::Memory(
                Error::Committed
            )));
        };
        *shared = mem::take(&mut inner.staged);
        // Dropping the guard here reopens the store to other connections
        // while this committed `Tx` value is still alive.
        drop(shared);
        Ok(())
    }
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Operation attempted on an already-committed transaction.
    #[display("transaction is already committed")]
    Committed,
}
