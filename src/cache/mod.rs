//! Cache module for storing calculation results in memory
//!
//! This module provides a process-wide cache manager that keeps serialized
//! results alongside an expiry timestamp. Entries are checked for expiry on
//! every read and evicted lazily the first time a read finds them expired.

mod manager;

pub use manager::{CacheManager, CachedData};
