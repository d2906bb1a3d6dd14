// curl -v http://127.0.0.1:8080/api/v1/items/42
// curl -v -H "Authorization: secret" http://127.0.0.1:8080/admin/stats
use http::header::AUTHORIZATION;
use http::{HeaderValue, StatusCode};
use micro_router::middleware::{Next, from_fn, shared};
use micro_router::{ReqBody, RequestExt, Responder, Router, Server, handler_fn};
use std::time::Instant;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

type Request = http::Request<ReqBody>;

async fn item(req: Request) -> String {
    format!("item {}\r\n", req.param("id"))
}

async fn stats(_req: Request) -> &'static str {
    "all good\r\n"
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let router = Router::new();

    router.wrap(from_fn(|req: Request, next: Next| async move {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        let start = Instant::now();
        let response = next.run(req).await;
        info!(%method, %path, elapsed = ?start.elapsed(), "request served");
        response
    }));

    let api = router.group("/api").wrap(from_fn(|req: Request, next: Next| async move {
        let mut response = next.run(req).await?;
        response.headers_mut().insert("x-api-version", HeaderValue::from_static("1"));
        Ok(response)
    }));
    api.group("/v1").get("/items/:id", handler_fn(item)).unwrap();

    let require_token = shared(from_fn(|req: Request, next: Next| async move {
        match req.headers().get(AUTHORIZATION) {
            Some(token) if token == "secret" => next.run(req).await,
            _ => Ok((StatusCode::UNAUTHORIZED, "missing or wrong token\r\n").into_response()),
        }
    }));
    router.group("/admin").handle_with(http::Method::GET, "/stats", handler_fn(stats), [require_token]).unwrap();

    Server::builder().router(router).address("127.0.0.1:8080").build().unwrap().start().await.unwrap();
}
