//! Word catalogue supply for Wordrush.
//!
//! The room engine never talks to the backing store directly. It asks a
//! [`WordCache`] for the catalogue; the cache serves a copy that is at most
//! [`WordCacheConfig::ttl`] old and refetches from its [`WordSource`]
//! otherwise.
//!
//! # Key types
//!
//! - [`WordRecord`]: one playable word with its hint
//! - [`WordSource`]: where the catalogue comes from (trait)
//! - [`StaticWordSource`] / [`JsonFileWordSource`]: the sources we ship
//! - [`WordCache`]: TTL cache in front of a source
//! - [`SupplyError`]: the catalogue couldn't be produced

mod cache;
mod error;
mod record;
mod source;

pub use cache::{WordCache, WordCacheConfig};
pub use error::SupplyError;
pub use record::{WordRecord, collapse_whitespace};
pub use source::{JsonFileWordSource, StaticWordSource, WordSource};
