use crate::Error;
use crate::route::Route;
use crate::router::RouterBuilder;
use crate::RouteError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::fmt::{self, Debug, Formatter};
use std::future::Future;

/// A set of routes sharing a path prefix.
///
/// Groups register their routes on the [`RouterBuilder`](./struct.RouterBuilder.html) they come
/// from, with the group path prepended. Nesting groups concatenates their paths, so
/// `new_group("/a")` then `new_group("/b")` registers under `/a/b`.
///
/// # Examples
///
/// ```
/// use http_body_util::Full;
/// use hyper::{body::Bytes, Request, Response};
/// use treemux::{Router, RouterBuilder};
/// use std::convert::Infallible;
///
/// async fn show(_: Request<Full<Bytes>>) -> Result<Response<Full<Bytes>>, Infallible> {
///     Ok(Response::new(Full::new(Bytes::from("post"))))
/// }
///
/// let mut builder: RouterBuilder<Full<Bytes>, Infallible> = Router::builder();
/// {
///     let mut api = builder.new_group("/api");
///     let mut v1 = api.new_group("/v1");
///     v1.get("/posts/:id", show);
/// }
/// let router = builder.build().unwrap();
/// assert_eq!(router.routes()[0].1, "/api/v1/posts/:id");
/// ```
pub struct Group<'r, B, E> {
    path: String,
    builder: &'r mut RouterBuilder<B, E>,
}

impl<'r, B: Send + 'static, E: Into<RouteError> + 'static> Group<'r, B, E> {
    pub(crate) fn new(builder: &'r mut RouterBuilder<B, E>, path: String) -> Group<'r, B, E> {
        let path = match normalize_base(&path) {
            Some(path) => path,
            None => {
                builder.fail(Error::invalid_pattern(path.as_str(), "group path must start with '/'"));
                String::new()
            }
        };
        Group { path, builder }
    }

    /// The full path prefix of this group, without a trailing slash.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Starts a group nested in this one.
    pub fn new_group<P: Into<String>>(&mut self, path: P) -> Group<'_, B, E> {
        let path = path.into();
        let full = match normalize_base(&path) {
            Some(sub) => format!("{}{}", self.path, sub),
            None => {
                self.builder
                    .fail(Error::invalid_pattern(path.as_str(), "group path must start with '/'"));
                self.path.clone()
            }
        };
        Group {
            path: full,
            builder: &mut *self.builder,
        }
    }

    /// Adds a route with the specified method. The path is relative to the group and must be
    /// empty or start with `/`.
    pub fn handle<P, H, R>(&mut self, method: Method, path: P, handler: H) -> &mut Self
    where
        P: Into<String>,
        H: Fn(Request<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        let path = path.into();
        if !path.is_empty() && !path.starts_with('/') {
            self.builder
                .fail(Error::invalid_pattern(path.as_str(), "route path must start with '/'"));
            return self;
        }

        let mut full = format!("{}{}", self.path, path);
        if full.is_empty() {
            full.push('/');
        }

        self.builder.add(method, full, Route::new(handler));
        self
    }

    /// Adds a `GET` route to the group.
    pub fn get<P, H, R>(&mut self, path: P, handler: H) -> &mut Self
    where
        P: Into<String>,
        H: Fn(Request<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.handle(Method::GET, path, handler)
    }

    /// Adds a `POST` route to the group.
    pub fn post<P, H, R>(&mut self, path: P, handler: H) -> &mut Self
    where
        P: Into<String>,
        H: Fn(Request<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.handle(Method::POST, path, handler)
    }

    /// Adds a `PUT` route to the group.
    pub fn put<P, H, R>(&mut self, path: P, handler: H) -> &mut Self
    where
        P: Into<String>,
        H: Fn(Request<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.handle(Method::PUT, path, handler)
    }

    /// Adds a `PATCH` route to the group.
    pub fn patch<P, H, R>(&mut self, path: P, handler: H) -> &mut Self
    where
        P: Into<String>,
        H: Fn(Request<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.handle(Method::PATCH, path, handler)
    }

    /// Adds a `DELETE` route to the group.
    pub fn delete<P, H, R>(&mut self, path: P, handler: H) -> &mut Self
    where
        P: Into<String>,
        H: Fn(Request<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.handle(Method::DELETE, path, handler)
    }

    /// Adds a `HEAD` route to the group.
    pub fn head<P, H, R>(&mut self, path: P, handler: H) -> &mut Self
    where
        P: Into<String>,
        H: Fn(Request<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.handle(Method::HEAD, path, handler)
    }

    /// Adds an `OPTIONS` route to the group.
    pub fn options<P, H, R>(&mut self, path: P, handler: H) -> &mut Self
    where
        P: Into<String>,
        H: Fn(Request<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    {
        self.handle(Method::OPTIONS, path, handler)
    }
}

/// `/api/` becomes `/api`, `/` becomes the empty prefix. `None` if the path is not absolute.
fn normalize_base(path: &str) -> Option<String> {
    if !path.starts_with('/') {
        return None;
    }
    Some(path.trim_end_matches('/').to_owned())
}

impl<B, E> Debug for Group<'_, B, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Group {{ path: {:?} }}", self.path)
    }
}
