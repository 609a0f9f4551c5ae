#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(missing_docs)]
#![forbid(unsafe_code)]

//! This crate provides an LFU cache with constant time insertion, access and
//! removal, following "An O(1) algorithm for implementing the LFU cache
//! eviction scheme" by K. Shah, A. Mitra and D. Matani.
//!
//! Items are kept in two levels of doubly linked lists: a list of frequency
//! nodes, one per access count currently in use, each holding the items with
//! that count in the order they reached it. Accessing an item moves it to the
//! tail of the next node. Evicting takes the head of the lowest non-empty node,
//! so ties are broken by whichever item reached that count first.
//!
//! Evicted values can be streamed to any number of observers, for example to
//! write them back to a database:
//!
//! ```
//! use lfucache::LfuCache;
//!
//! let mut cache = LfuCache::new(2)?;
//! let evictions = cache.evictions();
//!
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! cache.get(&"a");
//! cache.insert("c", 3);
//!
//! assert_eq!(evictions.try_recv(), Ok(2));
//! # Ok::<(), lfucache::Error>(())
//! ```
//!
//! Nodes and items live in index based arenas rather than behind pointers, so
//! the crate has no unsafe code. [`SyncLfuCache`] wraps the cache in a single
//! lock for use across threads.

pub use config::Config;
pub use error::{Error, Result};
pub use evictions::{Evictions, ObserverId};
pub use frequency_list::Frequencies;
pub use iter::LfuCacheIter;
pub use lfu::LfuCache;
pub use stats::Statistics;
pub use sync::SyncLfuCache;

mod config;
mod error;
mod evictions;
mod frequency_list;
mod iter;
mod lfu;
mod stats;
mod sync;
