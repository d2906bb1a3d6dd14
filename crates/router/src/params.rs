//! Path parameters captured while matching a request, and the pool they are recycled through.
//!
//! A [`PathParams`] is acquired lazily, the first time a lookup descends through a parameter
//! or catch-all node. It copies the matched path once into a buffer it reuses from the pool,
//! records byte ranges into that copy, and goes back to its pool when dropped. The dispatcher
//! stores it in the request's extensions, so it lives exactly as long as the request that
//! matched, and values stay the same when a middleware rewrites the request URI.

use http::Request;
use parking_lot::Mutex;
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// One captured parameter: the name from the route and where its value sits in the path
#[derive(Debug, Clone)]
pub(crate) struct Param {
    name: Arc<str>,
    value: Range<usize>,
}

/// Buffers recycled between contexts
#[derive(Debug, Default)]
struct Slot {
    entries: Vec<Param>,
    path: String,
}

/// Parameters captured for a single request.
pub struct PathParams {
    entries: Vec<Param>,
    path: String,
    pool: Arc<ParamsPool>,
}

impl PathParams {
    /// Returns the value of the first parameter called `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|param| param.name.as_ref() == name).map(|param| self.value(param))
    }

    /// Iterates `(name, value)` pairs in path order
    pub fn iter(&self) -> Iter<'_> {
        Iter { entries: self.entries.iter(), path: &self.path }
    }

    /// The request path these parameters were captured from
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn value(&self, param: &Param) -> &str {
        value_in(&self.path, param)
    }

    /// Copies the path being matched; ranges pushed afterwards point into this copy
    pub(crate) fn capture_path(&mut self, path: &str) {
        self.path.clear();
        self.path.push_str(path);
    }

    pub(crate) fn push(&mut self, name: &Arc<str>, value: Range<usize>) {
        self.entries.push(Param { name: Arc::clone(name), value });
    }

    pub(crate) fn pop(&mut self) {
        self.entries.pop();
    }

    /// Replaces the recorded names with the names of the route that matched
    pub(crate) fn rename(&mut self, names: &[Arc<str>]) {
        for (param, name) in self.entries.iter_mut().zip(names) {
            if !Arc::ptr_eq(&param.name, name) {
                param.name = Arc::clone(name);
            }
        }
    }
}

fn value_in<'p>(path: &'p str, param: &Param) -> &'p str {
    path.get(param.value.clone()).unwrap_or_default()
}

/// Iterator over the `(name, value)` pairs of a [`PathParams`]
#[derive(Debug)]
pub struct Iter<'a> {
    entries: std::slice::Iter<'a, Param>,
    path: &'a str,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let param = self.entries.next()?;
        Some((param.name.as_ref(), value_in(self.path, param)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<'a> IntoIterator for &'a PathParams {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Clone for PathParams {
    fn clone(&self) -> Self {
        let mut params = self.pool.acquire();
        params.capture_path(&self.path);
        params.entries.extend_from_slice(&self.entries);
        params
    }
}

impl Drop for PathParams {
    fn drop(&mut self) {
        let slot = Slot { entries: std::mem::take(&mut self.entries), path: std::mem::take(&mut self.path) };
        self.pool.release(slot);
    }
}

impl std::fmt::Debug for PathParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// A snapshot of the pool counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// contexts handed out since the router was created
    pub acquired: u64,
    /// contexts given back since the router was created
    pub released: u64,
    /// contexts currently waiting in the free list
    pub idle: usize,
}

impl PoolStats {
    /// Number of contexts currently owned by requests
    pub fn in_use(&self) -> u64 {
        self.acquired - self.released
    }
}

/// Free list of parameter buffers, each sized for the router's largest route.
#[derive(Debug, Default)]
pub(crate) struct ParamsPool {
    free: Mutex<Vec<Slot>>,
    capacity: AtomicUsize,
    acquired: AtomicU64,
    released: AtomicU64,
}

impl ParamsPool {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn acquire(self: &Arc<Self>) -> PathParams {
        let capacity = self.capacity.load(Ordering::Acquire);
        let Slot { mut entries, path } = self.free.lock().pop().unwrap_or_default();
        if entries.capacity() < capacity {
            entries.reserve_exact(capacity - entries.len());
        }
        self.acquired.fetch_add(1, Ordering::Relaxed);
        PathParams { entries, path, pool: Arc::clone(self) }
    }

    fn release(&self, mut slot: Slot) {
        slot.entries.clear();
        slot.path.clear();
        self.free.lock().push(slot);
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    /// Raises the capacity of contexts handed out from now on, never lowers it
    pub(crate) fn grow(&self, max_params: usize) {
        self.capacity.fetch_max(max_params, Ordering::AcqRel);
    }

    pub(crate) fn stats(&self) -> PoolStats {
        PoolStats {
            acquired: self.acquired.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            idle: self.free.lock().len(),
        }
    }
}

/// Returns the value of the path parameter `name`, or `""` when the request has none.
///
/// Safe to call on requests which matched a static route or no route at all.
pub fn url_param<'r, B>(req: &'r Request<B>, name: &str) -> &'r str {
    req.extensions().get::<PathParams>().and_then(|params| params.get(name)).unwrap_or_default()
}

/// Accessors for the parameters the router attached to a request
pub trait RequestExt {
    /// see [`url_param`]
    fn param(&self, name: &str) -> &str;

    fn path_params(&self) -> Option<&PathParams>;
}

impl<B> RequestExt for Request<B> {
    fn param(&self, name: &str) -> &str {
        url_param(self, name)
    }

    fn path_params(&self) -> Option<&PathParams> {
        self.extensions().get::<PathParams>()
    }
}

#[cfg(test)]
mod tests {
    use super::{ParamsPool, RequestExt, url_param};
    use http::Request;
    use std::sync::Arc;

    #[test]
    fn get_returns_first_occurrence() {
        let pool = Arc::new(ParamsPool::new());
        let path = "/a/first/b/second";
        let id: Arc<str> = Arc::from("id");

        let mut params = pool.acquire();
        params.capture_path(path);
        params.push(&id, 3..8);
        params.push(&id, 11..17);

        assert_eq!(params.get("id"), Some("first"));
        assert_eq!(params.get("other"), None);
        assert_eq!(params.iter().collect::<Vec<_>>(), vec![("id", "first"), ("id", "second")]);
    }

    #[test]
    fn drop_returns_to_pool() {
        let pool = Arc::new(ParamsPool::new());
        pool.grow(4);

        let params = pool.acquire();
        assert_eq!(pool.stats().in_use(), 1);
        drop(params);

        let stats = pool.stats();
        assert_eq!(stats.acquired, 1);
        assert_eq!(stats.released, 1);
        assert_eq!(stats.idle, 1);

        let params = pool.acquire();
        assert!(params.is_empty());
        assert!(params.path().is_empty());
        assert!(params.entries.capacity() >= 4);
        assert_eq!(pool.stats().idle, 0);
    }

    #[test]
    fn clone_is_pooled_separately() {
        let pool = Arc::new(ParamsPool::new());
        let name: Arc<str> = Arc::from("name");
        let mut params = pool.acquire();
        params.capture_path("/abc");
        params.push(&name, 1..4);

        let cloned = params.clone();
        assert_eq!(cloned.get("name"), Some("abc"));
        assert_eq!(cloned.path(), "/abc");
        assert_eq!(pool.stats().in_use(), 2);

        drop(params);
        drop(cloned);
        assert_eq!(pool.stats().in_use(), 0);
        assert_eq!(pool.stats().idle, 2);
    }

    #[test]
    fn released_buffers_are_reused() {
        let pool = Arc::new(ParamsPool::new());
        let mut params = pool.acquire();
        params.capture_path("/a/long/path/to/remember");
        let capacity = params.path.capacity();
        drop(params);

        let params = pool.acquire();
        assert!(params.path().is_empty());
        assert_eq!(params.path.capacity(), capacity);
    }

    #[test]
    fn capacity_only_grows() {
        let pool = ParamsPool::new();
        pool.grow(3);
        pool.grow(1);
        assert_eq!(pool.capacity.load(std::sync::atomic::Ordering::Relaxed), 3);
    }

    #[test]
    fn missing_params_read_as_empty() {
        let req = Request::get("/users/aaa").body(()).unwrap();
        assert_eq!(url_param(&req, "name"), "");
        assert!(req.path_params().is_none());
    }

    #[test]
    fn request_param_reads_extension() {
        let pool = Arc::new(ParamsPool::new());
        let name: Arc<str> = Arc::from("name");
        let mut params = pool.acquire();
        params.capture_path("/users/aaa");
        params.push(&name, 7..10);

        let mut req = Request::get("/users/aaa").body(()).unwrap();
        req.extensions_mut().insert(params);

        assert_eq!(req.param("name"), "aaa");
        assert_eq!(url_param(&req, "missing"), "");

        *req.uri_mut() = "/elsewhere".parse().unwrap();
        assert_eq!(req.param("name"), "aaa");

        drop(req);
        assert_eq!(pool.stats().in_use(), 0);
    }
}
