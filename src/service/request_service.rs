use crate::ext;
use crate::router::Router;
use crate::RouteError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{service::Service, Request, Response};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

/// A per connection [`Service`](https://docs.rs/hyper/latest/hyper/service/trait.Service.html) which
/// dispatches every request through a shared [`Router`](./struct.Router.html).
///
/// The remote address of the connection is attached to each request, handlers read it with
/// [`RequestExt::remote_addr`](./ext/trait.RequestExt.html#tymethod.remote_addr).
pub struct RequestService<B, E> {
    pub(crate) router: Arc<Router<B, E>>,
    pub(crate) remote_addr: SocketAddr,
}

impl<B, E> Service<Request<B>> for RequestService<B, E>
where
    B: Send + 'static,
    E: Into<RouteError> + 'static,
{
    type Response = Response<Full<Bytes>>;
    type Error = Infallible;
    #[allow(clippy::type_complexity)]
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, mut req: Request<B>) -> Self::Future {
        let router = self.router.clone();
        ext::set_remote_addr(req.extensions_mut(), self.remote_addr);

        Box::pin(async move { Ok(router.handle_request(req).await) })
    }
}

impl<B, E> Clone for RequestService<B, E> {
    fn clone(&self) -> Self {
        RequestService {
            router: self.router.clone(),
            remote_addr: self.remote_addr,
        }
    }
}

/// Creates a [`RequestService`](./struct.RequestService.html) per connection, all sharing one router.
#[derive(Debug)]
pub struct RequestServiceBuilder<B, E> {
    router: Arc<Router<B, E>>,
}

impl<B: Send + 'static, E: Into<RouteError> + 'static> RequestServiceBuilder<B, E> {
    pub fn new(router: Router<B, E>) -> Self {
        tracing::debug!(routes = router.routes().len(), "serving router");
        Self {
            router: Arc::new(router),
        }
    }

    pub fn build(&self, remote_addr: SocketAddr) -> RequestService<B, E> {
        RequestService {
            router: self.router.clone(),
            remote_addr,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::{Error, RequestServiceBuilder, Router};
    use http::Method;
    use http_body_util::{BodyExt, Empty, Full};
    use hyper::service::Service;
    use hyper::{body::Bytes, Request, Response};
    use std::net::SocketAddr;
    use std::str::FromStr;

    #[tokio::test]
    async fn should_route_request() {
        const RESPONSE_TEXT: &str = "Hello world!";
        let remote_addr = SocketAddr::from_str("10.0.0.7:8080").unwrap();
        let router: Router<Empty<Bytes>, Error> = Router::builder()
            .get("/users/:id", |req: Request<Empty<Bytes>>| async move {
                assert_eq!(req.remote_addr(), Some(SocketAddr::from_str("10.0.0.7:8080").unwrap()));
                assert_eq!(req.param("id").map(String::as_str), Some("42"));
                Ok(Response::new(Full::new(Bytes::from(RESPONSE_TEXT))))
            })
            .build()
            .unwrap();
        let req = Request::builder()
            .method(Method::GET)
            .uri("/users/42")
            .body(Empty::<Bytes>::new())
            .unwrap();

        let builder = RequestServiceBuilder::new(router);
        let service = builder.build(remote_addr);

        let resp = service.call(req).await.unwrap();
        let body_bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(RESPONSE_TEXT, String::from_utf8(body_bytes.to_vec()).unwrap());
    }
}
