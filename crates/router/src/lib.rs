//! An HTTP request multiplexer.
//!
//! Routes are patterns made of `/` separated segments: literal text, `:name` parameters that
//! capture one segment, and a trailing `*` that captures the rest of the path. Each request is
//! matched by method and path and handed to the handler of its route, wrapped in the route's
//! middleware chain.
//!
//! - [`Router`] registers routes and dispatches requests
//! - [`Group`] registers routes under a shared prefix and middleware list
//! - [`url_param`] and [`RequestExt`] read captured parameters inside handlers
//! - [`Server`] serves a router over TCP with hyper

mod body;
mod handler;
mod params;
mod responder;
mod server;

pub mod middleware;
pub mod router;

pub use body::{BoxError, ReqBody, ResponseBody, empty_req_body, req_body};
pub use handler::{FnHandler, RequestHandler, SharedHandler, handler_fn};
pub use middleware::{Middleware, SharedMiddleware};
pub use params::{Iter as ParamsIter, PathParams, PoolStats, RequestExt, url_param};
pub use responder::Responder;
pub use router::{Group, RouteError, RouteMatch, Router, RouterBuilder};
pub use server::{Server, ServerBuildError, ServerBuilder};
