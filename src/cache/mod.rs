//! Response caching for upstream weather data
//!
//! The gateway never owns cache storage outright: handlers talk to an
//! injected [`CacheStore`] with get / set-with-optional-TTL semantics and
//! only compute keys and expirations themselves. Two stores are provided,
//! an in-memory map and a JSON-file-per-key disk store, plus the pure
//! expiration policy derived from timestamps embedded in upstream payloads.

mod expiry;
mod store;

pub use expiry::{compute_ttl, parse_timestamp, ttl_for, DEFAULT_TTL, MIN_TTL};
pub use store::{Cache, CacheStore, DiskStore, MemoryStore};
