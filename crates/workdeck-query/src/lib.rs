//! The remote data cache: keyed asynchronous query results with request
//! de-duplication, staleness windows, bounded retry and prefix invalidation.
//! Every backend read in the client layer goes through [`QueryClient`].

pub mod client;
pub mod debounce;
pub mod fetch;
pub mod key;

pub use client::{
    QueryClient, QueryOptions, QuerySnapshot, TypedSnapshot, DEFAULT_GC_TIME, DEFAULT_RETRY,
    DEFAULT_STALE_TIME, NEVER,
};
pub use debounce::{Debouncer, DEFAULT_DEBOUNCE_DELAY};
pub use fetch::{command_fetcher, CommandFuture};
pub use key::{KeyParam, KeyPrefix, QueryKey};
