use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
// Import the treemux prelude traits.
use treemux::prelude::*;
use treemux::{RequestInfo, RouteError, Router, RouterService};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

// Define an app state to share it across the route handlers.
#[derive(Clone)]
struct State(u64);

// A handler for "/" page.
async fn home_handler(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    let state = req.data::<State>().map(|state| state.0).unwrap_or_default();
    tracing::info!(state, remote_addr = ?req.remote_addr(), "home");

    Ok(Response::new(Full::new(Bytes::from("Home page"))))
}

// A handler for "/api/v1/users/:userId" page.
async fn user_handler(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    let user_id = req.param("userId").cloned().unwrap_or_default();
    Ok(Response::new(Full::new(Bytes::from(format!("Hello {}", user_id)))))
}

// A handler for "/static/*path", the catch-all keeps the slashes.
async fn static_handler(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    let path = req.param("path").cloned().unwrap_or_default();
    Ok(Response::new(Full::new(Bytes::from(format!("Serving {}", path)))))
}

async fn error_handler(err: RouteError, req_info: RequestInfo) -> Response<Full<Bytes>> {
    tracing::error!(error = %err, route = req_info.route_data().route(), "request failed");
    let mut res = Response::new(Full::new(Bytes::from(format!("Something went wrong: {}", err))));
    *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    res
}

fn router() -> treemux::Result<Router<Incoming, Infallible>> {
    Router::builder()
        .data(State(100))
        .get("/", home_handler)
        .get("/static/*path", static_handler)
        .group("/api/v1", |api| {
            api.get("/users/:userId", user_handler);
        })
        .err_handler_with_info(error_handler)
        .build()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let service = Arc::new(RouterService::new(router()?));

    // The address on which the server will be listening.
    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "app is running");

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let service = Arc::clone(&service);

                tokio::task::spawn(async move {
                    let request_service = service.call(&stream).await.unwrap_or_else(|never| match never {});
                    let io = TokioIo::new(stream);
                    if let Err(err) = Builder::new(TokioExecutor::new())
                        .serve_connection(io, request_service)
                        .await
                    {
                        tracing::warn!(error = %err, "error serving connection");
                    }
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "error accepting connection");
            }
        }
    }
}
