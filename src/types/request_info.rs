use crate::ext;
use crate::types::RouteData;
use hyper::{HeaderMap, Method, Request, Uri, Version};
use std::net::SocketAddr;

/// Represents some information for the incoming request.
///
/// It's used by the error and panic handlers, which can't access the request itself because it
/// was already consumed by the route handler.
#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    headers: HeaderMap,
    method: Method,
    uri: Uri,
    version: Version,
    extensions: http::Extensions,
}

impl RequestInfo {
    pub(crate) fn new_from_req<B>(req: &Request<B>) -> Self {
        RequestInfo {
            headers: req.headers().clone(),
            method: req.method().clone(),
            uri: req.uri().clone(),
            version: req.version(),
            extensions: req.extensions().clone(),
        }
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the request method type.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request uri.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the request's HTTP version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the route data of the matched route, or an empty one if no route matched.
    pub fn route_data(&self) -> &RouteData {
        ext::route_data_in_extensions(&self.extensions)
    }

    /// Returns the remote address of the connection the request came from, if known.
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        ext::remote_addr_in_extensions(&self.extensions)
    }

    /// Access data which was shared by the [`RouterBuilder`](./struct.RouterBuilder.html) method
    /// [`data`](./struct.RouterBuilder.html#method.data).
    pub fn data<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }
}
