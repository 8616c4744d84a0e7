//! Per-request capture sink and its reuse pool.

use smallvec::SmallVec;
use std::sync::{Arc, Mutex};

/// Maximum number of captures before heap allocation.
/// Most REST routes declare well under 8 placeholders.
pub const MAX_INLINE_CAPTURES: usize = 8;

/// Maximum number of idle sinks retained by [`ParamPool`].
const POOL_DEPTH: usize = 64;

/// Multi-valued capture sink populated during trie search.
///
/// Entries are append-only from the search's point of view: a capture is
/// added per parameter level, and backtracking pops the capture of a level
/// being retried before re-descending, so a retried level overwrites rather
/// than accumulates.
///
/// Parameter names are `Arc<str>` cloned from the route tree (known at
/// registration time); values are per-request strings taken from the URL.
#[derive(Debug, Clone, Default)]
pub struct PathParams {
    entries: SmallVec<[(Arc<str>, String); MAX_INLINE_CAPTURES]>,
}

impl PathParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value for a name. Never removes or replaces existing entries.
    pub fn append(&mut self, name: Arc<str>, value: String) {
        self.entries.push((name, value));
    }

    /// Get a captured value by name.
    ///
    /// Uses last-write-wins semantics: when the same placeholder name occurs
    /// at several path depths the deepest capture is returned.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate every value captured under `name`, in capture order.
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.entries
            .iter()
            .filter(move |(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate all `(name, value)` pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries, names and values alike, retaining the allocation.
    /// This is the reset applied before a sink re-enters the pool.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop the most recent capture. Used when backtracking abandons a
    /// parameter level.
    pub(crate) fn pop(&mut self) {
        self.entries.pop();
    }
}

/// Free list of capture sinks, one checked out per in-flight request.
///
/// Sinks are cleared on check-in so stale captures can never leak into a
/// later request. The list is bounded; excess sinks are simply dropped.
#[derive(Debug, Default)]
pub struct ParamPool {
    free: Mutex<Vec<PathParams>>,
}

impl ParamPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a sink from the pool, or allocate a fresh one when empty.
    #[must_use]
    pub fn checkout(&self) -> PathParams {
        self.free.lock().unwrap().pop().unwrap_or_default()
    }

    /// Return a sink to the pool after the response has been built.
    pub fn checkin(&self, mut params: PathParams) {
        params.clear();
        let mut free = self.free.lock().unwrap();
        if free.len() < POOL_DEPTH {
            free.push(params);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut params = PathParams::new();
        params.append(Arc::from("id"), "org".to_string());
        params.append(Arc::from("team"), "core".to_string());
        params.append(Arc::from("id"), "user".to_string());
        assert_eq!(params.get("id"), Some("user"));
        assert_eq!(params.get("team"), Some("core"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_values_returns_all_captures() {
        let mut params = PathParams::new();
        params.append(Arc::from("id"), "1".to_string());
        params.append(Arc::from("id"), "2".to_string());
        let all: Vec<&str> = params.values("id").collect();
        assert_eq!(all, vec!["1", "2"]);
    }

    #[test]
    fn test_pop_drops_most_recent() {
        let mut params = PathParams::new();
        params.append(Arc::from("a"), "1".to_string());
        params.append(Arc::from("b"), "2".to_string());
        params.pop();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("a"), Some("1"));
        assert_eq!(params.get("b"), None);
    }

    #[test]
    fn test_pool_reuse_has_no_stale_captures() {
        let pool = ParamPool::new();
        let mut params = pool.checkout();
        params.append(Arc::from("id"), "42".to_string());
        pool.checkin(params);

        let reused = pool.checkout();
        assert!(reused.is_empty());
        assert_eq!(reused.get("id"), None);
    }
}
