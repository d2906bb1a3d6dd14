use http::Method;
use micro_router::{RouteError, Router, handler_fn};

/// A slice of a REST API, mixing the three kinds of segments
pub static ROUTES: &[(&str, &str)] = &[
    ("GET", "/"),
    ("GET", "/authorizations"),
    ("GET", "/authorizations/:id"),
    ("POST", "/authorizations"),
    ("DELETE", "/authorizations/:id"),
    ("GET", "/events"),
    ("GET", "/repos/:owner/:repo/events"),
    ("GET", "/repos/:owner/:repo/issues"),
    ("GET", "/repos/:owner/:repo/issues/:number"),
    ("GET", "/repos/:owner/:repo/issues/:number/comments"),
    ("POST", "/repos/:owner/:repo/issues"),
    ("GET", "/users/:user"),
    ("GET", "/users/:user/repos"),
    ("GET", "/user"),
    ("GET", "/user/repos"),
    ("GET", "/static/*"),
    ("GET", "/gists/:id/star"),
    ("PUT", "/gists/:id/star"),
];

#[derive(Debug, Copy, Clone)]
pub struct LookupCase {
    name: &'static str,
    group: LookupGroup,
    method: &'static str,
    path: &'static str,
}

impl LookupCase {
    pub const fn new(name: &'static str, group: LookupGroup, method: &'static str, path: &'static str) -> Self {
        Self { name, group, method, path }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> LookupGroup {
        self.group
    }

    /// # Panics
    ///
    /// Panics when the case was declared with an invalid method
    pub fn method(&self) -> Method {
        parse_method(self.method)
    }

    pub fn path(&self) -> &'static str {
        self.path
    }
}

#[derive(Clone, Copy, Debug)]
pub enum LookupGroup {
    Static,
    Param,
    CatchAll,
    Miss,
}

pub static CASES: &[LookupCase] = &[
    LookupCase::new("static_root", LookupGroup::Static, "GET", "/"),
    LookupCase::new("static_nested", LookupGroup::Static, "GET", "/user/repos"),
    LookupCase::new("one_param", LookupGroup::Param, "GET", "/users/foldright"),
    LookupCase::new("three_params", LookupGroup::Param, "GET", "/repos/foldright/micro-router/issues/42/comments"),
    LookupCase::new("catch_all", LookupGroup::CatchAll, "GET", "/static/js/vendor/app.min.js"),
    LookupCase::new("miss", LookupGroup::Miss, "GET", "/repos/foldright/micro-router/pulls"),
];

fn parse_method(method: &str) -> Method {
    Method::from_bytes(method.as_bytes()).unwrap_or_else(|_| panic!("fixture method {method:?} is not an HTTP method"))
}

/// Builds a router serving every entry of [`ROUTES`] with a handler that does nothing
///
/// # Panics
///
/// Panics when a route was declared with an invalid method
pub fn router() -> Result<Router, RouteError> {
    let router = Router::new();
    for (method, pattern) in ROUTES {
        router.handle(parse_method(method), pattern, handler_fn(|_req| async {}))?;
    }
    Ok(router)
}
