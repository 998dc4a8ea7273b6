//! Extension traits and helpers to read and write the per-request route data.

use crate::types::{RouteData, RouteParams};
use hyper::Request;
use lazy_static::lazy_static;
use std::net::SocketAddr;
use std::sync::Arc;

lazy_static! {
    static ref EMPTY_ROUTE_DATA: RouteData = RouteData::default();
}

// Keyed by type in `http::Extensions`; private so nothing outside the crate can overwrite it.
#[derive(Debug, Clone)]
struct RouteDataCarrier(Arc<RouteData>);

#[derive(Debug, Clone, Copy)]
struct RemoteAddr(SocketAddr);

/// A extension trait which extends the [`hyper::Request`](https://docs.rs/hyper/latest/hyper/struct.Request.html) type with some helpful methods.
pub trait RequestExt {
    /// It returns the route parameters as [RouteParams](../struct.RouteParams.html) type with the name of the parameter specified in the path as their respective keys.
    ///
    /// The map is empty, never absent, when the route has no parameters or the request didn't
    /// go through the router.
    ///
    /// # Examples
    ///
    /// ```
    /// use http_body_util::Full;
    /// use hyper::{body::Bytes, Request, Response};
    /// use treemux::prelude::*;
    /// use treemux::Router;
    /// use std::convert::Infallible;
    ///
    /// fn run() -> Router<Full<Bytes>, Infallible> {
    ///     let router = Router::builder()
    ///         .get("/users/:userName/books/:bookName", |req: Request<Full<Bytes>>| async move {
    ///             let params = req.params();
    ///             let user_name = params.get("userName").unwrap();
    ///             let book_name = params.get("bookName").unwrap();
    ///
    ///             Ok(Response::new(Full::new(Bytes::from(format!(
    ///                 "Username: {}, Book Name: {}",
    ///                 user_name, book_name
    ///             )))))
    ///         })
    ///         .build()
    ///         .unwrap();
    ///     router
    /// }
    /// # run();
    /// ```
    fn params(&self) -> &RouteParams;

    /// It returns the route parameter value by the name of the parameter specified in the path.
    fn param<P: AsRef<str>>(&self, param_name: P) -> Option<&String>;

    /// It returns the route template which matched this request, e.g. `/users/:id`.
    fn route(&self) -> &str;

    /// It returns the route template and the parameters together.
    fn route_data(&self) -> &RouteData;

    /// It returns the remote address of the incoming request, when served through a
    /// [`RequestService`](../struct.RequestService.html).
    fn remote_addr(&self) -> Option<SocketAddr>;

    /// Access data which was shared by the [`RouterBuilder`](../struct.RouterBuilder.html) method
    /// [`data`](../struct.RouterBuilder.html#method.data).
    fn data<T: Send + Sync + 'static>(&self) -> Option<&T>;
}

impl<B> RequestExt for Request<B> {
    fn params(&self) -> &RouteParams {
        self.route_data().params()
    }

    fn param<P: AsRef<str>>(&self, param_name: P) -> Option<&String> {
        self.params().get(param_name)
    }

    fn route(&self) -> &str {
        self.route_data().route()
    }

    fn route_data(&self) -> &RouteData {
        route_data_in_extensions(self.extensions())
    }

    fn remote_addr(&self) -> Option<SocketAddr> {
        remote_addr_in_extensions(self.extensions())
    }

    fn data<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions().get::<T>()
    }
}

/// Attaches the route data to the extensions, replacing any previous one.
pub fn set_route_data(extensions: &mut http::Extensions, data: RouteData) {
    extensions.insert(RouteDataCarrier(Arc::new(data)));
}

/// Sets the parameters of the attached route data, keeping its route template.
pub fn set_params(extensions: &mut http::Extensions, params: RouteParams) {
    let mut data = route_data_in_extensions(extensions).clone();
    data.set_params(params);
    set_route_data(extensions, data);
}

/// Sets the route template of the attached route data, keeping its parameters.
pub fn set_route<R: Into<String>>(extensions: &mut http::Extensions, route: R) {
    let mut data = route_data_in_extensions(extensions).clone();
    data.set_route(route);
    set_route_data(extensions, data);
}

pub(crate) fn route_data_in_extensions(extensions: &http::Extensions) -> &RouteData {
    extensions
        .get::<RouteDataCarrier>()
        .map(|carrier| carrier.0.as_ref())
        .unwrap_or(&EMPTY_ROUTE_DATA)
}

pub(crate) fn set_remote_addr(extensions: &mut http::Extensions, remote_addr: SocketAddr) {
    extensions.insert(RemoteAddr(remote_addr));
}

pub(crate) fn remote_addr_in_extensions(extensions: &http::Extensions) -> Option<SocketAddr> {
    extensions.get::<RemoteAddr>().map(|addr| addr.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn should_return_empty_values_without_carrier() {
        let req = Request::new(());
        assert!(req.params().is_empty());
        assert_eq!(req.route(), "");
        assert_eq!(req.param("id"), None);
        assert_eq!(req.remote_addr(), None);
    }

    #[test]
    fn should_read_back_route_data() {
        let mut req = Request::new(());
        let params: RouteParams = vec![("id", "123")].into_iter().collect();
        set_route_data(req.extensions_mut(), RouteData::new("/base/path/:id", params));

        assert_eq!(req.route(), "/base/path/:id");
        assert_eq!(req.param("id").map(String::as_str), Some("123"));
        assert_eq!(req.route_data().params().len(), 1);
    }

    #[test]
    fn should_set_params_and_route_independently() {
        let mut extensions = http::Extensions::new();

        let mut expected = HashMap::new();
        expected.insert("test".to_owned(), "expected".to_owned());
        set_params(&mut extensions, RouteParams::from(expected.clone()));
        assert_eq!(route_data_in_extensions(&extensions).route(), "");
        assert_eq!(route_data_in_extensions(&extensions).params().clone().into_inner(), expected);

        set_route(&mut extensions, "/expected/route");
        let data = route_data_in_extensions(&extensions);
        assert_eq!(data.route(), "/expected/route");
        assert_eq!(data.params().clone().into_inner(), expected);
    }

    #[test]
    fn should_keep_empty_params_for_routes_without_placeholders() {
        let mut extensions = http::Extensions::new();
        set_route_data(&mut extensions, RouteData::new("route/path", RouteParams::new()));
        let data = route_data_in_extensions(&extensions);
        assert_eq!(data.route(), "route/path");
        assert!(data.params().is_empty());
    }
}
