// Cache module for in-memory response caching.
// Maps request fingerprints to timestamped payloads with lazy TTL expiry.

pub mod fingerprint;
pub mod store;

pub use fingerprint::fingerprint;
pub use store::{CacheEntry, CacheStore};
