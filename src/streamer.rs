//! The batch-cursor streaming engine.
//!
//! A [`Streamer`] declares a named server-side cursor for a query inside a
//! transaction and walks it with repeated `FETCH <n>` statements, handing
//! each batch to the caller as it arrives. Result sets of any size stream
//! through a single reusable buffer instead of being materialized at once.

use sqlx::FromRow;
use sqlx::postgres::PgRow;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::cursor::CursorName;
use crate::error::{StreamError, StreamResult};
use crate::sink::{BatchHandler, Destination, EachBatch};
use crate::tx::{self, Handle};
use crate::value::{SqlValue, rebind};

/// Batch size used when the caller does not set one.
pub const DEFAULT_BATCH_SIZE: usize = 2000;

/// A configured streaming request.
///
/// Built fluently; every step consumes and returns the value, so a request
/// cannot be mutated behind the back of an execution. Consumed by
/// [`run`](Streamer::run).
///
/// ```rust,ignore
/// use sqlx_streamer::prelude::*;
///
/// let mut tx = pool.begin().await?;
/// Streamer::new("SELECT id, email FROM users WHERE active = $1")
///     .bind(true)
///     .batch_size(500)
///     .run_each(&mut tx, |batch: &mut Vec<(i64, String)>| {
///         for (id, email) in batch.drain(..) {
///             println!("{id}: {email}");
///         }
///     })
///     .await?;
/// tx.commit().await?;
/// ```
pub struct Streamer {
    query: String,
    args: Vec<SqlValue>,
    batch_size: usize,
    cursor: CursorName,
    cancel: CancelToken,
}

impl Streamer {
    /// Create a request for the given query.
    ///
    /// The query may use `$n` placeholders or `?` placeholders; the latter
    /// are rewritten via [`rebind`] when the cursor is declared.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            args: Vec::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            cursor: CursorName::Generated,
            cancel: CancelToken::new(),
        }
    }

    /// Append one positional argument.
    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Replace the positional argument list.
    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SqlValue>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the number of rows fetched per batch. Must be greater than zero.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Use a fixed cursor name instead of a generated one.
    ///
    /// Uniqueness among cursors open in the same transaction becomes the
    /// caller's responsibility.
    pub fn cursor_name(mut self, name: impl Into<String>) -> Self {
        self.cursor = CursorName::Fixed(name.into());
        self
    }

    /// Attach a cancellation token, polled once per loop iteration.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Execute the stream, invoking `handler` once per delivered batch.
    ///
    /// The handle is either a pool (a fresh transaction is begun and dropped
    /// when the stream ends, which rolls it back and releases the cursor) or
    /// an existing transaction (passed through unchanged; the caller commits
    /// or rolls back afterwards — this engine never does either).
    pub async fn run<'a, T, H>(
        self,
        handle: impl Into<Handle<'a>>,
        handler: &mut H,
    ) -> StreamResult<()>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
        H: BatchHandler<T>,
    {
        if self.batch_size == 0 {
            return Err(StreamError::config("batch size must be greater than zero"));
        }
        if self.query.trim().is_empty() {
            return Err(StreamError::config("query must not be empty"));
        }

        let mut tx = tx::acquire(handle.into()).await?;

        let cursor = self.cursor.resolve();
        let declare = format!("DECLARE {cursor} CURSOR FOR {}", rebind(&self.query));
        let mut statement = sqlx::query(&declare);
        for arg in &self.args {
            statement = arg.bind_to(statement);
        }
        statement
            .execute(tx.conn())
            .await
            .map_err(|source| StreamError::DeclareCursor {
                cursor: cursor.clone(),
                source,
            })?;
        debug!(cursor = %cursor, batch_size = self.batch_size, "declared cursor");

        let fetch_sql = format!("FETCH {} FROM {cursor}", self.batch_size);
        let mut first = true;
        loop {
            if self.cancel.is_cancelled() {
                // No cursor cleanup: ending or abandoning the transaction
                // releases the cursor.
                return Err(StreamError::Cancelled {
                    reason: self.cancel.reason(),
                });
            }

            let dest = handler.dest();
            let rows: Vec<T> = sqlx::query_as::<_, T>(&fetch_sql)
                .fetch_all(tx.conn())
                .await
                .map_err(|source| StreamError::Fetch {
                    cursor: cursor.clone(),
                    source,
                })?;
            dest.fill(rows);
            let count = dest.len();
            debug!(cursor = %cursor, rows = count, "fetched batch");

            match fetch_outcome(first, count, self.batch_size) {
                FetchOutcome::Exhausted => return Ok(()),
                FetchOutcome::DeliverFinal => {
                    handler.batch_ready();
                    return Ok(());
                }
                FetchOutcome::DeliverContinue => handler.batch_ready(),
            }
            first = false;
        }
    }

    /// Execute the stream with a closure called once per delivered batch.
    ///
    /// Convenience wrapper over [`run`](Streamer::run) and
    /// [`EachBatch`]; the batch buffer is reused between iterations.
    pub async fn run_each<'a, T, F>(
        self,
        handle: impl Into<Handle<'a>>,
        each: F,
    ) -> StreamResult<()>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
        F: FnMut(&mut Vec<T>),
    {
        let mut handler = EachBatch::new(each);
        self.run(handle, &mut handler).await
    }
}

/// What to do after one fetch populated `count` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchOutcome {
    /// Empty continuation fetch: the stream is exhausted and the batch is
    /// not delivered.
    Exhausted,
    /// Final (partial, or first-and-empty) batch: deliver it, then stop.
    DeliverFinal,
    /// Full batch: deliver it and keep fetching.
    DeliverContinue,
}

fn fetch_outcome(first: bool, count: usize, batch_size: usize) -> FetchOutcome {
    if count == 0 && !first {
        FetchOutcome::Exhausted
    } else if count < batch_size {
        FetchOutcome::DeliverFinal
    } else {
        FetchOutcome::DeliverContinue
    }
}
