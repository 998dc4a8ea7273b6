use crate::error_handler::{self, panic_message, ErrHandler, PanicHandler};
use crate::ext;
use crate::helpers;
use crate::route::Route;
use crate::tree::{Lookup, PathTree};
use crate::types::{RequestInfo, RouteData};
use crate::RouteError;
use futures::FutureExt;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{self, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use std::fmt::{self, Debug, Formatter};
use std::panic::AssertUnwindSafe;

pub use self::builder::RouterBuilder;
pub use self::config::{RedirectBehavior, RouterConfig};
pub use self::group::Group;

mod builder;
mod config;
mod group;

/// Represents a modular, lightweight router which matches requests against a radix tree of routes.
///
/// A `Router<B, E>` is created with [`Router::builder`](#method.builder); once built it can't be modified anymore,
/// which lets any number of connections share it behind an `Arc`.
///
/// This `Router<B, E>` type accepts two type parameters: `B` and `E`.
///
/// * The `B` represents the request body type the handlers receive, e.g. [`hyper::body::Incoming`](https://docs.rs/hyper/latest/hyper/body/struct.Incoming.html).
/// * The `E` represents any error type which will be used by route handlers. This error type must be convertible
///   into a [`RouteError`](./type.RouteError.html).
///
/// # Examples
///
/// ```
/// use http_body_util::Full;
/// use hyper::{body::Bytes, Request, Response};
/// use treemux::Router;
/// use std::convert::Infallible;
///
/// async fn home_handler(_: Request<Full<Bytes>>) -> Result<Response<Full<Bytes>>, Infallible> {
///     Ok(Response::new(Full::new(Bytes::from("home"))))
/// }
///
/// fn run() -> Router<Full<Bytes>, Infallible> {
///     let router = Router::builder().get("/", home_handler).build().unwrap();
///     router
/// }
/// # run();
/// ```
pub struct Router<B, E> {
    pub(crate) tree: PathTree<Route<B, E>>,
    pub(crate) config: RouterConfig,
    pub(crate) not_found: Option<Route<B, E>>,
    pub(crate) method_not_allowed: Option<Route<B, E>>,
    pub(crate) options_handler: Option<Route<B, E>>,
    pub(crate) err_handler: ErrHandler,
    pub(crate) panic_handler: Option<PanicHandler>,
    pub(crate) default_context: http::Extensions,
    pub(crate) should_gen_req_info: bool,
}

impl<B: Send + 'static, E: Into<RouteError> + 'static> Router<B, E> {
    /// Return a [RouterBuilder](./struct.RouterBuilder.html) instance to build a `Router`.
    pub fn builder() -> RouterBuilder<B, E> {
        RouterBuilder::new()
    }

    /// The configuration the router was built with.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Lists the registered `(method, pattern)` pairs, sorted by pattern then method.
    pub fn routes(&self) -> Vec<(Method, String)> {
        let mut routes = Vec::new();
        self.tree
            .for_each(|method, pattern, _| routes.push((method.clone(), pattern.to_owned())));
        routes.sort_by(|a, b| (a.1.as_str(), a.0.as_str()).cmp(&(b.1.as_str(), b.0.as_str())));
        routes
    }

    /// Looks the route up in the tree without dispatching anything.
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_, Route<B, E>> {
        self.tree.lookup(method, path)
    }

    /// Dispatches a request: finds the route for its method and path, attaches the
    /// [`RouteData`](./struct.RouteData.html) to the request and calls the handler.
    ///
    /// When no route matches it answers with the not found handler, a `405 Method Not Allowed`
    /// carrying an `Allow` header, or a redirect to the corrected path, depending on the lookup
    /// outcome and the [`RouterConfig`](./struct.RouterConfig.html). Handler errors and panics are
    /// turned into responses by the error and panic handlers, so this never fails.
    pub async fn handle_request(&self, mut req: Request<B>) -> Response<Full<Bytes>> {
        self.merge_default_context(req.extensions_mut());

        let method = req.method().clone();
        let uri = req.uri().clone();
        let path = uri.path();

        match self.tree.lookup(&method, path) {
            Lookup::Matched(m) => {
                tracing::trace!(%method, path, route = m.route, "route matched");
                ext::set_route_data(req.extensions_mut(), RouteData::new(m.route, m.params));
                self.invoke(m.value, req).await
            }
            Lookup::MethodNotAllowed(allowed) => {
                let allow = allow_header_value(&allowed);

                if method == Method::OPTIONS {
                    if let Some(ref options_handler) = self.options_handler {
                        let res = self.invoke(options_handler, req).await;
                        return with_allow_header(res, allow);
                    }
                }

                tracing::trace!(%method, path, "method not allowed");
                let res = match self.method_not_allowed {
                    Some(ref handler) => self.invoke(handler, req).await,
                    None => error_handler::plain_response(StatusCode::METHOD_NOT_ALLOWED),
                };
                with_allow_header(res, allow)
            }
            Lookup::NotFound => {
                if let Some(target) = self.corrected_path(&method, path) {
                    match self.config.redirect_behavior_for(&method).status_code() {
                        Some(status) => {
                            if let Some(res) = redirect_response(status, &target, uri.query()) {
                                tracing::trace!(%method, path, location = %target, "redirecting");
                                return res;
                            }
                        }
                        None => {
                            if let Lookup::Matched(m) = self.tree.lookup(&method, &target) {
                                ext::set_route_data(req.extensions_mut(), RouteData::new(m.route, m.params));
                                return self.invoke(m.value, req).await;
                            }
                        }
                    }
                }

                tracing::trace!(%method, path, "no route matched");
                match self.not_found {
                    Some(ref handler) => self.invoke(handler, req).await,
                    None => error_handler::plain_response(StatusCode::NOT_FOUND),
                }
            }
        }
    }

    async fn invoke(&self, route: &Route<B, E>, req: Request<B>) -> Response<Full<Bytes>> {
        let req_info = if self.should_gen_req_info {
            Some(RequestInfo::new_from_req(&req))
        } else {
            None
        };

        match AssertUnwindSafe(route.process(req)).catch_unwind().await {
            Ok(Ok(res)) => res,
            Ok(Err(err)) => self.err_handler.execute(err, req_info).await,
            Err(payload) => {
                let msg = panic_message(payload);
                match self.panic_handler {
                    Some(ref handler) => handler.execute(msg, req_info).await,
                    None => {
                        tracing::error!(panic = %msg, "route handler panicked");
                        error_handler::plain_response(StatusCode::INTERNAL_SERVER_ERROR)
                    }
                }
            }
        }
    }

    /// The default context is the ancestor of the request's own extensions: values the request
    /// already carries win.
    fn merge_default_context(&self, extensions: &mut http::Extensions) {
        if self.default_context.is_empty() {
            return;
        }
        let own = std::mem::replace(extensions, self.default_context.clone());
        extensions.extend(own);
    }

    /// Finds a corrected form of a path which didn't match: first the cleaned path, then the
    /// path with its trailing slash toggled.
    fn corrected_path(&self, method: &Method, path: &str) -> Option<String> {
        if !self.config.redirect_clean_path && !self.config.redirect_trailing_slash {
            return None;
        }

        let cleaned = if self.config.redirect_clean_path {
            helpers::clean_path(path)
        } else {
            path.to_owned()
        };

        if cleaned != path && self.tree.lookup(method, &cleaned).is_match() {
            return Some(cleaned);
        }

        if self.config.redirect_trailing_slash && cleaned.len() > 1 {
            let toggled = helpers::toggle_trailing_slash(&cleaned);
            if self.tree.lookup(method, &toggled).is_match() {
                return Some(toggled);
            }
        }

        None
    }
}

fn allow_header_value(allowed: &[Method]) -> Option<HeaderValue> {
    let joined = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
    HeaderValue::from_str(&joined).ok()
}

fn with_allow_header(mut res: Response<Full<Bytes>>, allow: Option<HeaderValue>) -> Response<Full<Bytes>> {
    if let Some(allow) = allow {
        res.headers_mut().entry(header::ALLOW).or_insert(allow);
    }
    res
}

fn redirect_response(status: StatusCode, target: &str, query: Option<&str>) -> Option<Response<Full<Bytes>>> {
    let location = match query {
        Some(query) => HeaderValue::from_str(&format!("{}?{}", target, query)),
        None => HeaderValue::from_str(target),
    }
    .ok()?;

    let mut res = Response::new(Full::new(Bytes::new()));
    *res.status_mut() = status;
    res.headers_mut().insert(header::LOCATION, location);
    Some(res)
}

impl<B, E> Debug for Router<B, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ tree: {:?}, config: {:?}, default_context: {:?} }}",
            self.tree, self.config, self.default_context
        )
    }
}
