#![allow(dead_code)]

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot::{self, Sender};
use treemux::{RouteError, Router, RouterService};

pub struct Serve {
    addr: SocketAddr,
    tx: Sender<()>,
}

impl Serve {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn new_request(&self, method: &str, route: &str) -> http::request::Builder {
        Request::builder()
            .method(method.to_ascii_uppercase().as_str())
            .uri(format!("http://{}{}", self.addr(), route))
    }

    pub fn shutdown(self) {
        let _ = self.tx.send(());
    }
}

pub async fn serve<E>(router: Router<Incoming, E>) -> Serve
where
    E: Into<RouteError> + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router_service = Arc::new(RouterService::new(router));
    let (tx, mut rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        loop {
            let stream = tokio::select! {
                accepted = listener.accept() => accepted.unwrap().0,
                _ = &mut rx => break,
            };
            let router_service = router_service.clone();
            tokio::spawn(async move {
                let request_service = router_service.call(&stream).await.unwrap();
                let io = TokioIo::new(stream);
                let _ = Builder::new(TokioExecutor::new())
                    .serve_connection(io, request_service)
                    .await;
            });
        }
    });

    Serve { addr, tx }
}

/// Builds a request with an empty body for `Router::handle_request`.
pub fn request(method: &str, uri: &str) -> Request<Full<Bytes>> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

pub async fn into_text<B>(body: B) -> String
where
    B: hyper::body::Body<Data = Bytes> + Send,
    B::Error: std::fmt::Debug,
{
    String::from_utf8_lossy(&body.collect().await.unwrap().to_bytes()).to_string()
}

pub fn text(s: &'static str) -> Response<Full<Bytes>> {
    Response::new(Full::new(Bytes::from_static(s.as_bytes())))
}
