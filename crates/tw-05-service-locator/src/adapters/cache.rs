//! # Resolution Cache
//!
//! Remembers the directory answer per MRN for a fixed time-to-live. A zero
//! TTL disables caching, so every send resolves afresh.

use crate::domain::ServiceInstance;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct ResolutionCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, (ServiceInstance, Instant)>>,
}

impl ResolutionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Cached instance for `mrn` if it is younger than the TTL.
    pub fn get(&self, mrn: &str) -> Option<ServiceInstance> {
        if !self.is_enabled() {
            return None;
        }
        let entries = self.entries.read();
        entries
            .get(mrn)
            .filter(|(_, stored_at)| stored_at.elapsed() < self.ttl)
            .map(|(instance, _)| instance.clone())
    }

    pub fn put(&self, mrn: &str, instance: ServiceInstance) {
        if !self.is_enabled() {
            return;
        }
        let mut entries = self.entries.write();
        let ttl = self.ttl;
        entries.retain(|_, (_, stored_at)| stored_at.elapsed() < ttl);
        entries.insert(mrn.to_string(), (instance, Instant::now()));
    }

    pub fn invalidate(&self, mrn: &str) {
        self.entries.write().remove(mrn);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::disabled()
    }
}
