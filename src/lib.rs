//! `treemux` is a fast HTTP request router for [hyper](https://hyper.rs/), built on a radix tree of path
//! segments.
//!
//! Its core features:
//!
//! - Routes with named parameters (`/users/:id`) and catch-alls (`/static/*path`) which don't need to be
//!   disjoint: the most specific route wins, and the lookup backtracks when a branch turns into a dead end.
//!
//! - `404 Not Found` and `405 Method Not Allowed` with a proper `Allow` header out of the box.
//!
//! - Automatic redirects for trailing slash mismatches and unclean paths like `/a//b/../c`.
//!
//! - Route groups sharing a path prefix, nestable to any depth.
//!
//! - Percent decoded path parameters, shared data, error and panic recovery.
//!
//! ## Basic Example
//!
//! A simple example using `treemux` with [hyper](https://hyper.rs/) would look like the following:
//!
//! ```no_run
//! use http_body_util::Full;
//! use hyper::body::{Bytes, Incoming};
//! use hyper::service::Service;
//! use hyper::{Request, Response, StatusCode};
//! use hyper_util::rt::{TokioExecutor, TokioIo};
//! use hyper_util::server::conn::auto::Builder;
//! // Import the treemux prelude traits.
//! use treemux::prelude::*;
//! use treemux::{RequestInfo, RouteError, Router, RouterService};
//! use std::convert::Infallible;
//! use std::net::SocketAddr;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! // Define an app state to share it across the route handlers.
//! #[derive(Clone)]
//! struct State(u64);
//!
//! // A handler for "/" page.
//! async fn home_handler(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
//!     // Access the app state.
//!     let state = req.data::<State>().unwrap();
//!     println!("State value: {}", state.0);
//!
//!     Ok(Response::new(Full::new(Bytes::from("Home page"))))
//! }
//!
//! // A handler for "/users/:userId" page.
//! async fn user_handler(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
//!     let user_id = req.param("userId").unwrap();
//!     Ok(Response::new(Full::new(Bytes::from(format!("Hello {}", user_id)))))
//! }
//!
//! // Define an error handler function which will accept the error
//! // and the request information and generates an appropriate response.
//! async fn error_handler(err: RouteError, _: RequestInfo) -> Response<Full<Bytes>> {
//!     eprintln!("{}", err);
//!     let mut res = Response::new(Full::new(Bytes::from(format!("Something went wrong: {}", err))));
//!     *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
//!     res
//! }
//!
//! // Create a `Router<Incoming, Infallible>` for request body type `hyper::body::Incoming`
//! // and for handler error type `Infallible`.
//! fn router() -> Router<Incoming, Infallible> {
//!     Router::builder()
//!         // Specify the state data which will be available to every route handler.
//!         .data(State(100))
//!         .get("/", home_handler)
//!         .get("/users/:userId", user_handler)
//!         .err_handler_with_info(error_handler)
//!         .build()
//!         .unwrap()
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     // Create a Service from the router above to handle incoming requests.
//!     let service = Arc::new(RouterService::new(router()));
//!
//!     // The address on which the server will be listening.
//!     let addr = SocketAddr::from(([127, 0, 0, 1], 3001));
//!     let listener = TcpListener::bind(addr).await?;
//!     println!("App is running on: {}", addr);
//!
//!     loop {
//!         let (stream, _) = listener.accept().await?;
//!         let service = service.clone();
//!
//!         tokio::spawn(async move {
//!             let request_service = service.call(&stream).await.unwrap();
//!             let io = TokioIo::new(stream);
//!             if let Err(err) = Builder::new(TokioExecutor::new())
//!                 .serve_connection(io, request_service)
//!                 .await
//!             {
//!                 eprintln!("Error serving connection: {:?}", err);
//!             }
//!         });
//!     }
//! }
//! ```
//!
//! ## Routing
//!
//! ### Route Handlers
//!
//! A handler could be a function or a closure. Functions should have the following signature:
//!
//! ```
//! use http_body_util::Full;
//! use hyper::{body::Bytes, Request, Response};
//! use std::convert::Infallible;
//!
//! async fn home_handler(_: Request<Full<Bytes>>) -> Result<Response<Full<Bytes>>, Infallible> {
//!     Ok(Response::new(Full::new(Bytes::from("home"))))
//! }
//! ```
//!
//! A handler may fail with any error type convertible into a [`RouteError`](./type.RouteError.html). Errors
//! are turned into responses by the error handler, see [Error Handling](#error-handling).
//!
//! ### Route Patterns
//!
//! A pattern is a sequence of `/` separated segments. A segment is either literal, a named parameter
//! starting with `:` which matches one non-empty segment, or, in last position only, a catch-all starting
//! with `*` which matches the rest of the path, slashes included:
//!
//! ```
//! # use http_body_util::Full;
//! # use hyper::{body::Bytes, Response};
//! # use treemux::Router;
//! # use std::convert::Infallible;
//! # fn run() -> Router<Full<Bytes>, Infallible> {
//! let router = Router::builder()
//!     .get("/about", |_| async { Ok(Response::new(Full::new(Bytes::from("about")))) })
//!     .get("/users/:id", |_| async { Ok(Response::new(Full::new(Bytes::from("a user")))) })
//!     .get("/users/:id/posts", |_| async { Ok(Response::new(Full::new(Bytes::from("posts")))) })
//!     .get("/static/*path", |_| async { Ok(Response::new(Full::new(Bytes::from("a file")))) })
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```
//!
//! A literal segment starting with `:` or `*` is written `\:` or `\*`. Literals are matched against
//! the percent decoded request path, so `/café` is reached by `/caf%C3%A9`.
//!
//! Routes may overlap. At every position static segments are tried first, then parameters, then
//! catch-alls, so `/users/new` is matched before `/users/:id` whatever the order of registration.
//!
//! ### Route Parameters
//!
//! The matched route and its percent decoded parameters are accessible through the
//! [`RequestExt`](./ext/trait.RequestExt.html) methods:
//!
//! ```
//! use http_body_util::Full;
//! use hyper::{body::Bytes, Request, Response};
//! use treemux::prelude::*;
//! use treemux::Router;
//! use std::convert::Infallible;
//!
//! async fn book_handler(req: Request<Full<Bytes>>) -> Result<Response<Full<Bytes>>, Infallible> {
//!     let book = req.param("bookName").unwrap();
//!     let page = req.param("pageNumber").unwrap();
//!     assert_eq!(req.route(), "/books/:bookName/pages/:pageNumber");
//!
//!     Ok(Response::new(Full::new(Bytes::from(format!("{} at page {}", book, page)))))
//! }
//!
//! # fn run() -> Router<Full<Bytes>, Infallible> {
//! let router = Router::builder()
//!     .get("/books/:bookName/pages/:pageNumber", book_handler)
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```
//!
//! ### Groups
//!
//! Routes sharing a prefix can be registered through a [`Group`](./struct.Group.html):
//!
//! ```
//! # use http_body_util::Full;
//! # use hyper::{body::Bytes, Response};
//! # use treemux::Router;
//! # use std::convert::Infallible;
//! # fn run() -> Router<Full<Bytes>, Infallible> {
//! let router = Router::builder()
//!     .group("/api", |api| {
//!         let mut v1 = api.new_group("/v1");
//!         v1.get("/users", |_| async { Ok(Response::new(Full::new(Bytes::from("users")))) })
//!             .post("/users", |_| async { Ok(Response::new(Full::new(Bytes::from("created")))) });
//!     })
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```
//!
//! ### Not Found, Method Not Allowed and Redirects
//!
//! When no route matches the path the not found handler is called, a plain `404` by default. When the path
//! matches but the method doesn't, the response is a `405` listing the registered methods in its `Allow`
//! header. Both can be customized with [`RouterBuilder::not_found`](./struct.RouterBuilder.html#method.not_found)
//! and [`RouterBuilder::method_not_allowed`](./struct.RouterBuilder.html#method.method_not_allowed).
//!
//! Before answering `404`, the router checks whether the cleaned path or the path with its trailing slash
//! toggled has a route, and redirects there. See [`RouterConfig`](./struct.RouterConfig.html).
//!
//! ## Data and State Sharing
//!
//! Data added with [`RouterBuilder::data`](./struct.RouterBuilder.html#method.data) is available to every
//! handler through [`RequestExt::data`](./ext/trait.RequestExt.html#tymethod.data). Values of the same type
//! already set on the request take precedence.
//!
//! ## Error Handling
//!
//! Any error returned by a handler, and any panic raised by it, is turned into a response. The default error
//! handler logs the error and answers `500 Internal Server Error`.
//!
//! ```
//! use http_body_util::Full;
//! use hyper::{body::Bytes, Response, StatusCode};
//! use treemux::{RouteError, Router};
//!
//! async fn error_handler(err: RouteError) -> Response<Full<Bytes>> {
//!     let mut res = Response::new(Full::new(Bytes::from(format!("Something went wrong: {}", err))));
//!     *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
//!     res
//! }
//!
//! # fn run() -> Router<Full<Bytes>, std::io::Error> {
//! let router = Router::builder()
//!     .get("/", |_| async { Err(std::io::Error::new(std::io::ErrorKind::Other, "disk on fire")) })
//!     .err_handler(error_handler)
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```

pub use self::error::{Error, RouteError};
pub use self::route::Route;
pub use self::router::{Group, RedirectBehavior, Router, RouterBuilder, RouterConfig};
#[doc(hidden)]
pub use self::service::RequestService;
pub use self::service::RequestServiceBuilder;
pub use self::service::RouterService;
pub use self::types::{RequestInfo, RouteData, RouteParams};

mod error;
mod error_handler;
pub mod ext;
mod helpers;
pub mod prelude;
mod route;
mod router;
mod service;
pub mod tree;
mod types;

/// A Result type often returned from methods that can have treemux errors.
pub type Result<T> = std::result::Result<T, Error>;

/// What a route handler resolves to once its error is boxed.
pub type HandlerResult = std::result::Result<hyper::Response<http_body_util::Full<hyper::body::Bytes>>, RouteError>;
