//! Bounded least-recently-used cache of upstream responses.
//!
//! Entries are keyed by [`CacheKey`], a structured fingerprint of the
//! normalized request parameters. Keeping the fields apart (rather than
//! concatenating them into one string) means two logically distinct requests
//! can never share a key.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::error::{TaxError, TaxResult};
use crate::models::{ComputationResponse, PayFrequency};

/// Fingerprint of a computation request.
///
/// # Example
///
/// ```
/// use taxcalc::cache::CacheKey;
/// use taxcalc::models::PayFrequency;
///
/// let key = CacheKey::new(60000.0, "CA", PayFrequency::Weekly);
/// assert_eq!(key.to_string(), "60000.00CAweekly");
/// assert_eq!(key, CacheKey::new(60000.001, "CA", PayFrequency::Weekly));
/// assert_ne!(key, CacheKey::new(60000.0, "CA", PayFrequency::Monthly));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    salary: String,
    state: String,
    pay_frequency: PayFrequency,
}

impl CacheKey {
    /// Derives the key from salary (rounded to two decimals), state code
    /// (possibly empty) and pay frequency.
    pub fn new(salary: f64, state: &str, pay_frequency: PayFrequency) -> Self {
        Self {
            salary: format!("{salary:.2}"),
            state: state.to_string(),
            pay_frequency,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.salary, self.state, self.pay_frequency.label())
    }
}

/// Thread-safe LRU store of responses with a capacity fixed at construction.
pub struct ResponseCache {
    entries: Mutex<LruCache<CacheKey, Arc<ComputationResponse>>>,
}

impl ResponseCache {
    /// Creates a cache holding at most `capacity` responses.
    ///
    /// Each entry costs roughly a kilobyte. A zero capacity is rejected.
    pub fn new(capacity: usize) -> TaxResult<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| TaxError::InvalidConfig {
            field: "cache_size".to_string(),
            message: "must be at least 1".to_string(),
        })?;

        Ok(Self {
            entries: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// Looks up a response and marks it most recently used.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<ComputationResponse>> {
        self.entries.lock().get(key).cloned()
    }

    /// Stores a response, evicting the least recently used entry when full.
    pub fn put(&self, key: CacheKey, value: Arc<ComputationResponse>) {
        self.entries.lock().put(key, value);
    }

    /// Number of stored responses.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The fixed capacity.
    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }
}

impl fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
