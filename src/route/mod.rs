use crate::RouteError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response};
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::pin::Pin;

pub(crate) type Handler<B, E> = Box<dyn Fn(Request<B>) -> HandlerReturn<E> + Send + Sync + 'static>;
pub(crate) type HandlerReturn<E> = Box<dyn Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static>;

/// Represents a single route handler.
///
/// It shouldn't be created directly, use [RouterBuilder](./struct.RouterBuilder.html) methods
/// to register a route. The path tree stores one `Route` per `(method, pattern)` pair.
///
/// This `Route<B, E>` type accepts two type parameters: `B` and `E`.
///
/// * The `B` represents the request body type the handler receives.
/// * The `E` represents any error type which will be used by route handlers. This error type must be convertible
///   into a [`RouteError`](./type.RouteError.html).
pub struct Route<B, E> {
    handler: Handler<B, E>,
}

impl<B: 'static, E: Into<RouteError> + 'static> Route<B, E> {
    pub(crate) fn new<H, R>(handler: H) -> Route<B, E>
    where
        H: Fn(Request<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        let handler: Handler<B, E> = Box::new(move |req: Request<B>| Box::new(handler(req)));
        Route { handler }
    }

    pub(crate) async fn process(&self, req: Request<B>) -> crate::HandlerResult {
        Pin::from((self.handler)(req)).await.map_err(Into::into)
    }
}

impl<B, E> Debug for Route<B, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Route {{ handler: Fn(Request) -> Future }}")
    }
}
