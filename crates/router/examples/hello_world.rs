use micro_router::{ReqBody, Router, Server, handler_fn};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

async fn hello_world(_req: http::Request<ReqBody>) -> &'static str {
    "hello world"
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let router = Router::new();
    router.get("/", handler_fn(hello_world)).unwrap();

    Server::builder().router(router).address("127.0.0.1:3000").build().unwrap().start().await.unwrap();
}
