use crate::body::{BoxError, req_body};
use crate::router::Router;
use http::Request;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

#[derive(Debug)]
pub struct ServerBuilder {
    router: Option<Arc<Router>>,
    address: Option<io::Result<Vec<SocketAddr>>>,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { router: None, address: None }
    }

    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    pub fn router(mut self, router: impl Into<Arc<Router>>) -> Self {
        self.router = Some(router.into());
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let router = self.router.ok_or(ServerBuildError::MissingRouter)?;
        let address = self.address.ok_or(ServerBuildError::MissingAddress)??;
        if address.is_empty() {
            return Err(ServerBuildError::MissingAddress);
        }
        Ok(Server { router, address })
    }
}

/// Serves a [`Router`] over TCP, speaking HTTP/1 and HTTP/2 through hyper
#[derive(Debug)]
pub struct Server {
    router: Arc<Router>,
    address: Vec<SocketAddr>,
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("router must be set")]
    MissingRouter,
    #[error("address must be set")]
    MissingAddress,
    #[error("address can not be resolved: {0}")]
    InvalidAddress(#[from] io::Error),
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Binds the configured address and serves connections until the task is dropped
    pub async fn start(self) -> io::Result<()> {
        let listener = TcpListener::bind(self.address.as_slice()).await.inspect_err(|e| {
            error!(cause = %e, address = ?self.address, "bind server error");
        })?;
        info!("start listening at {:?}", self.address);
        self.serve(listener).await;
        Ok(())
    }

    /// Serves connections accepted from an already bound listener
    pub async fn serve(self, listener: TcpListener) {
        loop {
            let (tcp_stream, remote_addr) = match listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            tokio::spawn(serve_connection(Arc::clone(&self.router), tcp_stream, remote_addr));
        }
    }
}

async fn serve_connection(router: Arc<Router>, tcp_stream: TcpStream, remote_addr: SocketAddr) {
    let service = service_fn(move |req: Request<Incoming>| {
        let router = Arc::clone(&router);
        async move { router.dispatch(req.map(req_body)).await }
    });

    let builder = Builder::new(TokioExecutor::new());
    let connection: Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + '_>> =
        Box::pin(builder.serve_connection(TokioIo::new(tcp_stream), service));
    match connection.await {
        Ok(()) => info!(%remote_addr, "finished process, connection shutdown"),
        Err(e) => error!(%remote_addr, "service has error, cause {}, connection shutdown", e),
    }
}

#[cfg(test)]
mod tests {
    use super::{Server, ServerBuildError};
    use crate::params::RequestExt;
    use crate::router::Router;
    use crate::handler_fn;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    #[test]
    fn build_requires_router_and_address() {
        assert!(matches!(Server::builder().address("127.0.0.1:0").build(), Err(ServerBuildError::MissingRouter)));
        assert!(matches!(Server::builder().router(Router::new()).build(), Err(ServerBuildError::MissingAddress)));
        assert!(matches!(
            Server::builder().router(Router::new()).address("not an address").build(),
            Err(ServerBuildError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn serves_over_loopback() {
        let router = Router::new();
        router.get("/users/:name", handler_fn(|req| async move { format!("hello {}", req.param("name")) })).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let server = Server::builder().router(router).address(address).build().unwrap();
        let serving = tokio::spawn(server.serve(listener));

        let mut stream = TcpStream::connect(address).await.unwrap();
        stream.write_all(b"GET /users/aaa HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
        assert!(response.ends_with("hello aaa"), "{response}");

        let mut stream = TcpStream::connect(address).await.unwrap();
        stream.write_all(b"GET /missing HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"), "{response}");

        serving.abort();
    }
}
