// curl http://127.0.0.1:8080/users/foldright
// curl http://127.0.0.1:8080/repos/foldright/micro-router/issues/7
// curl http://127.0.0.1:8080/static/css/site.css
use http::{Method, StatusCode};
use micro_router::{ReqBody, RequestExt, Router, Server, handler_fn, url_param};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

type Request = http::Request<ReqBody>;

async fn user(req: Request) -> String {
    format!("hello {}\r\n", url_param(&req, "name"))
}

async fn issue(req: Request) -> String {
    format!("issue #{} of {}/{}\r\n", req.param("number"), req.param("owner"), req.param("repo"))
}

async fn asset(req: Request) -> (StatusCode, String) {
    match req.param("*") {
        "" => (StatusCode::BAD_REQUEST, "asset path is missing\r\n".to_owned()),
        path => (StatusCode::OK, format!("would serve {path}\r\n")),
    }
}

async fn not_found(req: Request) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("nothing at {}\r\n", req.uri().path()))
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let router = Router::builder()
        .route(Method::GET, "/users/:name", handler_fn(user))
        .route(Method::GET, "/repos/:owner/:repo/issues/:number", handler_fn(issue))
        .route(Method::GET, "/static/*", handler_fn(asset))
        .not_found(handler_fn(not_found))
        .build()
        .unwrap();

    Server::builder().router(router).address("127.0.0.1:8080").build().unwrap().start().await.unwrap();
}
