//! Transaction acquisition and commit/rollback helpers.
//!
//! The streaming engine only ever *borrows or begins* a transaction; it never
//! ends one. [`commit`] and [`rollback`] are for the caller, who owns the
//! transaction before and after a stream runs.

use sqlx::{PgConnection, PgPool, Postgres};

use crate::error::{StreamError, StreamResult};

/// A PostgreSQL transaction as held by callers of this crate.
pub type PgTransaction = sqlx::Transaction<'static, Postgres>;

/// The handle accepted at the streaming entry point: either a connection
/// pool to begin a fresh transaction from, or an already-active transaction
/// to pass through unchanged.
pub enum Handle<'a> {
    Pool(&'a PgPool),
    Tx(&'a mut PgTransaction),
}

impl<'a> From<&'a PgPool> for Handle<'a> {
    fn from(pool: &'a PgPool) -> Self {
        Handle::Pool(pool)
    }
}

impl<'a> From<&'a mut PgTransaction> for Handle<'a> {
    fn from(tx: &'a mut PgTransaction) -> Self {
        Handle::Tx(tx)
    }
}

/// The transaction a streaming execution runs inside.
///
/// `Owned` transactions were begun from a pool handle and are dropped (and
/// thereby rolled back by the driver) when the execution ends. `Borrowed`
/// transactions stay with the caller, who decides their fate.
#[derive(Debug)]
pub(crate) enum ActiveTx<'a> {
    Owned(PgTransaction),
    Borrowed(&'a mut PgTransaction),
}

impl ActiveTx<'_> {
    pub(crate) fn conn(&mut self) -> &mut PgConnection {
        match self {
            ActiveTx::Owned(tx) => &mut **tx,
            ActiveTx::Borrowed(tx) => &mut ***tx,
        }
    }
}

/// Normalize a handle into a single active transaction.
///
/// A pool handle begins a new transaction with the default isolation level;
/// an existing transaction passes through unchanged. A closed pool is
/// rejected without touching any connection.
pub(crate) async fn acquire(handle: Handle<'_>) -> StreamResult<ActiveTx<'_>> {
    match handle {
        Handle::Pool(pool) => {
            if pool.is_closed() {
                return Err(StreamError::InvalidHandle(
                    "connection pool is closed".into(),
                ));
            }
            let tx = pool.begin().await.map_err(StreamError::Begin)?;
            Ok(ActiveTx::Owned(tx))
        }
        Handle::Tx(tx) => Ok(ActiveTx::Borrowed(tx)),
    }
}

/// Commit the transaction.
///
/// On commit failure the transaction is rolled back before returning. If the
/// rollback succeeds the original commit error is returned; if it fails too,
/// the returned error chains both failures.
pub async fn commit(mut tx: PgTransaction, resource: &str) -> StreamResult<()> {
    if let Err(source) = sqlx::query("COMMIT").execute(&mut *tx).await {
        let commit_err = StreamError::Commit {
            resource: resource.to_owned(),
            source,
        };
        return Err(rollback(tx, resource, commit_err).await);
    }
    // Already committed above; this settles the guard so its drop handler
    // does not queue a rollback on the now-idle connection.
    tx.commit().await.map_err(|source| StreamError::Commit {
        resource: resource.to_owned(),
        source,
    })
}

/// Roll back the transaction while unwinding `prior`.
///
/// Returns `prior` unchanged when the rollback succeeds; otherwise returns an
/// error composing `prior` with the rollback failure.
pub async fn rollback(tx: PgTransaction, resource: &str, prior: StreamError) -> StreamError {
    match tx.rollback().await {
        Ok(()) => prior,
        Err(source) => StreamError::Rollback {
            resource: resource.to_owned(),
            source,
            prior: Box::new(prior),
        },
    }
}
