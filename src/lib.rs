//! # sqlx-streamer
//!
//! Stream large PostgreSQL result sets in fixed-size batches over a named
//! server-side cursor, without materializing the whole result in memory.
//!
//! A stream runs inside a transaction: either one begun from a pool handle,
//! or one the caller already holds and keeps control of. The engine issues a
//! single `DECLARE <name> CURSOR FOR <query>` followed by repeated
//! `FETCH <batch_size> FROM <name>` statements, delivering each batch to the
//! caller as it arrives.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use sqlx_streamer::prelude::*;
//!
//! let pool = sqlx::PgPool::connect(&url).await?;
//! let mut tx = pool.begin().await?;
//!
//! Streamer::new("SELECT id, email FROM users WHERE active = $1")
//!     .bind(true)
//!     .batch_size(2000)
//!     .run_each(&mut tx, |batch: &mut Vec<(i64, String)>| {
//!         // at most 2000 rows at a time
//!         process(batch);
//!     })
//!     .await?;
//!
//! // The engine never commits; the transaction is still the caller's.
//! sqlx_streamer::tx::commit(tx, "users").await?;
//! ```
//!
//! ## Contract
//!
//! | Piece            | Role                                           |
//! |------------------|------------------------------------------------|
//! | [`Streamer`]     | Immutable request: query, args, batch size     |
//! | [`Handle`]       | Pool to begin from, or transaction to borrow   |
//! | [`BatchHandler`] | Supplies destinations, receives completions    |
//! | [`CancelToken`]  | Polled between fetches to abort a stream       |
//!
//! [`Handle`]: tx::Handle
//! [`BatchHandler`]: sink::BatchHandler
//! [`CancelToken`]: cancel::CancelToken

pub mod cancel;
pub mod cursor;
pub mod error;
pub mod sink;
pub mod streamer;
pub mod tx;
pub mod value;

pub use crate::error::{StreamError, StreamResult};
pub use crate::streamer::{DEFAULT_BATCH_SIZE, Streamer};

pub mod prelude {
    pub use crate::cancel::CancelToken;
    pub use crate::cursor::CursorName;
    pub use crate::error::{StreamError, StreamResult};
    pub use crate::sink::{BatchHandler, Destination, Discard, EachBatch};
    pub use crate::streamer::{DEFAULT_BATCH_SIZE, Streamer};
    pub use crate::tx::{Handle, PgTransaction, commit, rollback};
    pub use crate::value::{SqlValue, rebind};
}
