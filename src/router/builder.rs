use crate::error_handler::{default_err_handler, ErrHandler, PanicHandler};
use crate::route::Route;
use crate::router::{Group, RedirectBehavior, Router, RouterConfig};
use crate::tree::PathTree;
use crate::types::RequestInfo;
use crate::{Error, RouteError};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::fmt::{self, Debug, Formatter};
use std::future::Future;

/// Builder for the [Router](./struct.Router.html) type.
///
/// This `RouterBuilder<B, E>` type accepts two type parameters: `B` and `E`.
///
/// * The `B` represents the request body type the handlers receive.
/// * The `E` represents any error type which will be used by route handlers. This error type must be convertible
///   into a [`RouteError`](./type.RouteError.html).
///
/// Routes are only inserted into the path tree by [`build`](#method.build), so the configuration
/// methods can be called in any order. The first registration error is reported by `build`.
///
/// # Examples
///
/// ```
/// use http_body_util::Full;
/// use hyper::{body::Bytes, Request, Response};
/// use treemux::{Router, RouterBuilder};
/// use std::convert::Infallible;
///
/// async fn users(_: Request<Full<Bytes>>) -> Result<Response<Full<Bytes>>, Infallible> {
///     Ok(Response::new(Full::new(Bytes::from("user list"))))
/// }
///
/// async fn user(_: Request<Full<Bytes>>) -> Result<Response<Full<Bytes>>, Infallible> {
///     Ok(Response::new(Full::new(Bytes::from("one user"))))
/// }
///
/// fn run() -> Router<Full<Bytes>, Infallible> {
///     let builder: RouterBuilder<Full<Bytes>, Infallible> = Router::builder();
///     builder
///         .get("/users", users)
///         .group("/api/v1", |api| {
///             api.get("/users/:id", user);
///         })
///         .build()
///         .unwrap()
/// }
/// # run();
/// ```
pub struct RouterBuilder<B, E> {
    inner: crate::Result<BuilderInner<B, E>>,
}

struct BuilderInner<B, E> {
    config: RouterConfig,
    routes: Vec<PendingRoute<B, E>>,
    not_found: Option<Route<B, E>>,
    method_not_allowed: Option<Route<B, E>>,
    options_handler: Option<Route<B, E>>,
    err_handler: Option<ErrHandler>,
    panic_handler: Option<PanicHandler>,
    default_context: http::Extensions,
}

struct PendingRoute<B, E> {
    method: Method,
    path: String,
    route: Route<B, E>,
}

impl<B: Send + 'static, E: Into<RouteError> + 'static> RouterBuilder<B, E> {
    /// Creates a new `RouterBuilder` instance with default options.
    pub fn new() -> RouterBuilder<B, E> {
        RouterBuilder {
            inner: Ok(BuilderInner {
                config: RouterConfig::default(),
                routes: Vec::new(),
                not_found: None,
                method_not_allowed: None,
                options_handler: None,
                err_handler: None,
                panic_handler: None,
                default_context: http::Extensions::new(),
            }),
        }
    }

    /// Creates a new [Router](./struct.Router.html) instance from the added configuration.
    ///
    /// Fails with the first invalid pattern, duplicate route or conflicting placeholder.
    pub fn build(self) -> crate::Result<Router<B, E>> {
        let inner = self.inner?;

        let mut tree = PathTree::new()
            .case_insensitive(inner.config.case_insensitive)
            .head_can_use_get(inner.config.head_can_use_get);

        let route_count = inner.routes.len();
        for PendingRoute { method, path, route } in inner.routes {
            tracing::debug!(%method, path = %path, "registering route");
            tree.insert(method, path, route)?;
        }

        let err_handler = inner
            .err_handler
            .unwrap_or_else(|| ErrHandler::new(default_err_handler));
        let should_gen_req_info = err_handler.should_require_req_info() || inner.panic_handler.is_some();

        tracing::debug!(routes = route_count, "router built");

        Ok(Router {
            tree,
            config: inner.config,
            not_found: inner.not_found,
            method_not_allowed: inner.method_not_allowed,
            options_handler: inner.options_handler,
            err_handler,
            panic_handler: inner.panic_handler,
            default_context: inner.default_context,
            should_gen_req_info,
        })
    }

    fn and_then<F: FnOnce(BuilderInner<B, E>) -> crate::Result<BuilderInner<B, E>>>(self, func: F) -> Self {
        RouterBuilder {
            inner: self.inner.and_then(func),
        }
    }

    pub(crate) fn add(&mut self, method: Method, path: String, route: Route<B, E>) {
        if let Ok(ref mut inner) = self.inner {
            inner.routes.push(PendingRoute { method, path, route });
        }
    }

    pub(crate) fn fail(&mut self, err: Error) {
        if self.inner.is_ok() {
            self.inner = Err(err);
        }
    }
}

impl<B: Send + 'static, E: Into<RouteError> + 'static> RouterBuilder<B, E> {
    /// Adds a new route with `GET` method and the handler at the specified path.
    pub fn get<P, H, R>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.handle(Method::GET, path, handler)
    }

    /// Adds a new route with `POST` method and the handler at the specified path.
    pub fn post<P, H, R>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.handle(Method::POST, path, handler)
    }

    /// Adds a new route with `PUT` method and the handler at the specified path.
    pub fn put<P, H, R>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.handle(Method::PUT, path, handler)
    }

    /// Adds a new route with `PATCH` method and the handler at the specified path.
    pub fn patch<P, H, R>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.handle(Method::PATCH, path, handler)
    }

    /// Adds a new route with `DELETE` method and the handler at the specified path.
    pub fn delete<P, H, R>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.handle(Method::DELETE, path, handler)
    }

    /// Adds a new route with `HEAD` method and the handler at the specified path.
    ///
    /// With [`head_can_use_get`](#method.head_can_use_get) enabled, routes without a HEAD handler
    /// answer HEAD requests with their GET handler.
    pub fn head<P, H, R>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.handle(Method::HEAD, path, handler)
    }

    /// Adds a new route with `OPTIONS` method and the handler at the specified path.
    pub fn options<P, H, R>(self, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.handle(Method::OPTIONS, path, handler)
    }

    /// Adds a new route with the specified method and the handler at the specified path. The method can be
    /// any token, including extension methods like `PURGE`.
    ///
    /// # Examples
    ///
    /// ```
    /// use http_body_util::Full;
    /// use hyper::{body::Bytes, Method, Response};
    /// use treemux::Router;
    /// use std::convert::Infallible;
    ///
    /// fn run() -> Router<Full<Bytes>, Infallible> {
    ///     let router = Router::builder()
    ///         .handle(Method::from_bytes(b"PURGE").unwrap(), "/cache/*key", |_| async move {
    ///             Ok(Response::new(Full::new(Bytes::from("purged"))))
    ///         })
    ///         .build()
    ///         .unwrap();
    ///     router
    /// }
    /// # run();
    /// ```
    pub fn handle<P, H, R>(mut self, method: Method, path: P, handler: H) -> Self
    where
        P: Into<String>,
        H: Fn(Request<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.add(method, path.into(), Route::new(handler));
        self
    }

    /// Starts a [Group](./struct.Group.html) of routes sharing the `base` path prefix.
    pub fn new_group<P: Into<String>>(&mut self, base: P) -> Group<'_, B, E> {
        Group::new(self, base.into())
    }

    /// Registers the routes added by `f` under the `base` path prefix.
    pub fn group<P, F>(mut self, base: P, f: F) -> Self
    where
        P: Into<String>,
        F: FnOnce(&mut Group<'_, B, E>),
    {
        let mut group = self.new_group(base);
        f(&mut group);
        self
    }

    /// Sets the handler called when no route matches the request path. Defaults to a plain
    /// `404 Not Found` response.
    pub fn not_found<H, R>(self, handler: H) -> Self
    where
        H: Fn(Request<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.and_then(move |mut inner| {
            inner.not_found = Some(Route::new(handler));
            Ok(inner)
        })
    }

    /// Sets the handler called when a route matches the path but not the method. Defaults to a
    /// plain `405 Method Not Allowed` response. The `Allow` header is added to the response of
    /// the handler unless it sets one itself.
    pub fn method_not_allowed<H, R>(self, handler: H) -> Self
    where
        H: Fn(Request<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.and_then(move |mut inner| {
            inner.method_not_allowed = Some(Route::new(handler));
            Ok(inner)
        })
    }

    /// Sets the handler called for `OPTIONS` requests to a path whose route has no OPTIONS handler,
    /// e.g. to answer CORS preflight requests. Without it such requests get a `405`.
    pub fn options_handler<H, R>(self, handler: H) -> Self
    where
        H: Fn(Request<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.and_then(move |mut inner| {
            inner.options_handler = Some(Route::new(handler));
            Ok(inner)
        })
    }

    /// Adds a handler to handle any error raised by the route handlers.
    ///
    /// The default error handler logs the error and answers a plain `500 Internal Server Error`.
    pub fn err_handler<H, R>(self, handler: H) -> Self
    where
        H: Fn(RouteError) -> R + Send + Sync + 'static,
        R: Future<Output = Response<Full<Bytes>>> + Send + 'static,
    {
        self.and_then(move |mut inner| {
            inner.err_handler = Some(ErrHandler::new(handler));
            Ok(inner)
        })
    }

    /// Adds a handler to handle any error raised by the route handlers.
    /// Here, an extra [RequestInfo](./struct.RequestInfo.html) is provided to the error handler.
    pub fn err_handler_with_info<H, R>(self, handler: H) -> Self
    where
        H: Fn(RouteError, RequestInfo) -> R + Send + Sync + 'static,
        R: Future<Output = Response<Full<Bytes>>> + Send + 'static,
    {
        self.and_then(move |mut inner| {
            inner.err_handler = Some(ErrHandler::new_with_info(handler));
            Ok(inner)
        })
    }

    /// Adds a handler called with the panic message when a route handler panics.
    ///
    /// The panic is contained to the request. Without this handler it is logged and answered with
    /// a plain `500 Internal Server Error`.
    pub fn panic_handler<H, R>(self, handler: H) -> Self
    where
        H: Fn(String, RequestInfo) -> R + Send + Sync + 'static,
        R: Future<Output = Response<Full<Bytes>>> + Send + 'static,
    {
        self.and_then(move |mut inner| {
            inner.panic_handler = Some(PanicHandler::new(handler));
            Ok(inner)
        })
    }

    /// Shares data with every handler through the request extensions. The values set here are
    /// the default context of each request: a value of the same type the request already carries
    /// takes precedence.
    ///
    /// Handlers read it with [`RequestExt::data`](./ext/trait.RequestExt.html#tymethod.data).
    pub fn data<T: Clone + Send + Sync + 'static>(self, data: T) -> Self {
        self.and_then(move |mut inner| {
            inner.default_context.insert(data);
            Ok(inner)
        })
    }

    /// Replaces the whole router configuration.
    pub fn config(self, config: RouterConfig) -> Self {
        self.and_then(move |mut inner| {
            inner.config = config;
            Ok(inner)
        })
    }

    /// See [`RouterConfig::head_can_use_get`](./struct.RouterConfig.html#structfield.head_can_use_get).
    pub fn head_can_use_get(self, enabled: bool) -> Self {
        self.and_then(move |mut inner| {
            inner.config.head_can_use_get = enabled;
            Ok(inner)
        })
    }

    /// See [`RouterConfig::case_insensitive`](./struct.RouterConfig.html#structfield.case_insensitive).
    pub fn case_insensitive(self, enabled: bool) -> Self {
        self.and_then(move |mut inner| {
            inner.config.case_insensitive = enabled;
            Ok(inner)
        })
    }

    /// See [`RouterConfig::redirect_trailing_slash`](./struct.RouterConfig.html#structfield.redirect_trailing_slash).
    pub fn redirect_trailing_slash(self, enabled: bool) -> Self {
        self.and_then(move |mut inner| {
            inner.config.redirect_trailing_slash = enabled;
            Ok(inner)
        })
    }

    /// See [`RouterConfig::redirect_clean_path`](./struct.RouterConfig.html#structfield.redirect_clean_path).
    pub fn redirect_clean_path(self, enabled: bool) -> Self {
        self.and_then(move |mut inner| {
            inner.config.redirect_clean_path = enabled;
            Ok(inner)
        })
    }

    /// See [`RouterConfig::redirect_behavior`](./struct.RouterConfig.html#structfield.redirect_behavior).
    pub fn redirect_behavior(self, behavior: RedirectBehavior) -> Self {
        self.and_then(move |mut inner| {
            inner.config.redirect_behavior = behavior;
            Ok(inner)
        })
    }

    /// Overrides the redirect behavior for a single method.
    pub fn redirect_method_behavior(self, method: Method, behavior: RedirectBehavior) -> Self {
        self.and_then(move |mut inner| {
            inner.config.redirect_method_behavior.insert(method, behavior);
            Ok(inner)
        })
    }
}

impl<B: Send + 'static, E: Into<RouteError> + 'static> Default for RouterBuilder<B, E> {
    fn default() -> RouterBuilder<B, E> {
        RouterBuilder::new()
    }
}

impl<B, E> Debug for RouterBuilder<B, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.inner {
            Ok(ref inner) => write!(f, "{{ routes: {}, config: {:?} }}", inner.routes.len(), inner.config),
            Err(ref err) => write!(f, "{{ error: {} }}", err),
        }
    }
}
