//! Lazily connected Postgres database clients.

use std::{future::Future, sync::Arc};

use tokio::sync::{RwLock, RwLockReadGuard};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{
        self,
        connection::{self, impl_connection},
        Connection as _,
    },
};

/// Non-transactional Postgres database client.
///
/// Checks out a [`connection::NonTx`] from the [`connection::Pool`] on first
/// use and keeps it until a [`Tx`] client takes it over.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to check out [`connection::NonTx`]s from.
    pub(crate) pool: connection::Pool,

    /// Checked out [`connection::NonTx`], if any.
    connection: Arc<RwLock<Option<connection::NonTx>>>,
}

impl NonTx {
    /// Creates a new [`NonTx`] client from the provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self {
            pool,
            connection: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the underlying [`connection::NonTx`] of this [`NonTx`] client,
    /// checking it out if there is none yet.
    pub(crate) async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::NonTx>, Traced<database::Error>>
    {
        get_or_init(&self.connection, || checkout(&self.pool)).await
    }

    /// Takes the underlying [`connection::NonTx`] from this [`NonTx`] client.
    ///
    /// Next time this [`NonTx`] client is used, it checks out a new one.
    #[must_use]
    pub(crate) async fn take_connection(&self) -> Option<connection::NonTx> {
        self.connection.write().await.take()
    }
}

impl_connection!(NonTx, |c| lazy c.connection());

/// Transactional Postgres database client.
///
/// Starts a [`connection::Tx`] on first use, reusing the connection of the
/// [`NonTx`] client it was created from when possible.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`connection::Pool`] to check out a connection from.
    pool: connection::Pool,

    /// Shared state of this client.
    inner: Arc<Inner>,
}

/// Shared state of a [`Tx`] client.
#[derive(Debug)]
struct Inner {
    /// [`NonTx`] client to take the connection from, if not taken yet.
    non_tx: RwLock<Option<NonTx>>,

    /// Lazily started [`connection::Tx`].
    tx: RwLock<Option<connection::Tx>>,
}

impl Tx {
    /// Creates a new [`Tx`] client from the provided [`NonTx`] client.
    #[must_use]
    pub fn from_non_tx(client: NonTx) -> Self {
        Self {
            pool: client.pool.clone(),
            inner: Arc::new(Inner {
                non_tx: RwLock::new(Some(client)),
                tx: RwLock::new(None),
            }),
        }
    }

    /// Returns underlying [`connection::Tx`] of this [`Tx`] client, starting
    /// it if there is none yet.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        get_or_init(&self.inner.tx, || async {
            let taken = self.inner.non_tx.write().await.take();
            let reused = match taken {
                Some(client) => client.take_connection().await,
                None => None,
            };
            let conn = match reused {
                Some(conn) => conn,
                None => checkout(&self.pool).await?,
            };
            connection::Tx::from_non_tx(conn).await
        })
        .await
    }

    /// Commits this [`Tx`] client.
    ///
    /// Does nothing if no statement has been executed yet.
    ///
    /// # Errors
    ///
    /// If failed to commit transaction of this [`Tx`] client.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let tx = self.inner.tx.write().await.take();
        match tx {
            Some(tx) => tx.commit().await.map_err(tracerr::wrap!()),
            None => Ok(()),
        }
    }
}

impl_connection!(Tx, |c| lazy c.connection());

/// Checks out a new [`connection::NonTx`] from the provided
/// [`connection::Pool`].
pub(crate) async fn checkout(
    pool: &connection::Pool,
) -> Result<connection::NonTx, Traced<database::Error>> {
    pool.get()
        .await
        .map_err(tracerr::from_and_wrap!(=> postgres::Error))
        .map_err(tracerr::map_from)
}

/// Returns the value stored in the provided `slot`, storing the one resolved
/// by `init` first if the `slot` is empty.
async fn get_or_init<T, F>(
    slot: &RwLock<Option<T>>,
    init: impl FnOnce() -> F,
) -> Result<RwLockReadGuard<'_, T>, Traced<database::Error>>
where
    F: Future<Output = Result<T, Traced<database::Error>>>,
{
    let read = slot.read().await;
    let guard = if read.is_some() {
        read
    } else {
        drop(read);

        let mut write = slot.write().await;
        if write.is_none() {
            *write = Some(init().await.map_err(tracerr::wrap!())?);
        }
        write.downgrade()
    };

    Ok(RwLockReadGuard::map(guard, |v| {
        v.as_ref()
            .expect("value cannot be taken while guard is alive")
    }))
}
