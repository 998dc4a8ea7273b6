//! The radix tree which stores the routes and matches request paths against them.

use crate::helpers;
use crate::types::RouteParams;
use hyper::Method;
use std::borrow::Cow;

use self::method_table::MethodTable;
use self::node::{Capture, HandlerEntry, Node};

mod method_table;
mod node;
mod pattern;

/// The outcome of a [`PathTree::lookup`].
#[derive(Debug)]
pub enum Lookup<'t, T> {
    /// A route matched the path and has a value for the method.
    Matched(RouteMatch<'t, T>),

    /// A route matched the path but has no value for the method. Holds the methods which do,
    /// sorted by name.
    MethodNotAllowed(Vec<Method>),

    /// No route matched the path.
    NotFound,
}

impl<'t, T> Lookup<'t, T> {
    /// Returns `true` for [`Lookup::Matched`].
    pub fn is_match(&self) -> bool {
        matches!(self, Lookup::Matched(_))
    }
}

/// A successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'t, T> {
    /// The value registered for the method.
    pub value: &'t T,
    /// The pattern the value was registered with.
    pub route: &'t str,
    /// The percent decoded placeholder values, keyed by placeholder name.
    pub params: RouteParams,
}

/// A radix tree mapping `(method, pattern)` pairs to values.
///
/// Patterns are made of literal bytes, `:name` parameters which match a single non-empty path
/// segment and a trailing `*name` catch-all which matches the rest of the path. When several
/// patterns match a path, static segments win over parameters, which win over catch-alls.
///
/// The tree is filled once and then only read: `lookup` takes `&self`, so a tree behind an `Arc`
/// can serve any number of threads without locking.
///
/// # Examples
///
/// ```
/// use hyper::Method;
/// use treemux::tree::{Lookup, PathTree};
///
/// let mut tree = PathTree::new();
/// tree.insert(Method::GET, "/users/:id", "user").unwrap();
/// tree.insert(Method::GET, "/users/new", "new user").unwrap();
///
/// match tree.lookup(&Method::GET, "/users/42") {
///     Lookup::Matched(m) => {
///         assert_eq!(*m.value, "user");
///         assert_eq!(m.route, "/users/:id");
///         assert_eq!(m.params.get("id").unwrap(), "42");
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug)]
pub struct PathTree<T> {
    root: Node<T>,
    case_insensitive: bool,
    head_can_use_get: bool,
}

impl<T> Default for PathTree<T> {
    fn default() -> Self {
        PathTree::new()
    }
}

impl<T> PathTree<T> {
    /// Creates an empty, case sensitive tree in which HEAD lookups fall back to GET values.
    pub fn new() -> PathTree<T> {
        PathTree {
            root: Node::root(),
            case_insensitive: false,
            head_can_use_get: true,
        }
    }

    /// Makes the literal parts of the patterns match regardless of ASCII case. Placeholder values
    /// keep the case of the request path.
    ///
    /// It must be set before inserting anything.
    pub fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    /// Lets a HEAD lookup use the GET value of a route which has no HEAD value.
    pub fn head_can_use_get(mut self, head_can_use_get: bool) -> Self {
        self.head_can_use_get = head_can_use_get;
        self
    }

    /// Registers `value` for `method` and `pattern`.
    ///
    /// Fails if the pattern is malformed, if a value is already registered for the same method and
    /// pattern, or if a placeholder with another name already exists at the same position.
    pub fn insert<P: Into<String>>(&mut self, method: Method, pattern: P, value: T) -> crate::Result<()> {
        let pattern = pattern.into();
        let mut pieces = pattern::parse(&pattern)?;

        for piece in pieces.iter_mut() {
            if let pattern::Piece::Static(literal) = piece {
                // Request paths keep `%` escaped while they are matched.
                if literal.contains('%') {
                    *literal = literal.replace('%', "%25");
                }
                if self.case_insensitive {
                    literal.make_ascii_lowercase();
                }
            }
        }

        self.root.insert(&pieces, method, HandlerEntry { value, pattern })
    }

    /// Finds the value registered for `method` whose pattern matches `path`.
    ///
    /// `path` is the percent encoded request path. It is decoded before the tree is descended, so
    /// a route registered as `/café` matches `/caf%C3%A9`. An encoded `/` never acts as a
    /// separator. A path which is not valid percent encoding makes the lookup fail with
    /// [`Lookup::NotFound`].
    ///
    /// When the most specific matching route has no value for the method, a less specific one
    /// which has is used instead, e.g. a catch-all behind a parameter.
    pub fn lookup<'t>(&'t self, method: &Method, path: &str) -> Lookup<'t, T> {
        let decoded = match helpers::decode_for_matching(path) {
            Ok(decoded) => decoded,
            Err(err) => {
                tracing::trace!(path, error = %err, "request path is not valid percent encoding");
                return Lookup::NotFound;
            }
        };
        let match_path: Cow<'_, str> = if self.case_insensitive {
            Cow::Owned(decoded.to_ascii_lowercase())
        } else {
            Cow::Borrowed(decoded.as_ref())
        };

        let mut captures = Vec::new();
        let any_handler = |handlers: &MethodTable<HandlerEntry<T>>| !handlers.is_empty();
        let node = match self.root.find(match_path.as_bytes(), 0, &mut captures, &any_handler) {
            Some(node) => node,
            None => return Lookup::NotFound,
        };

        let (node, entry) = match self.entry_for(node, method) {
            Some(entry) => (node, Some(entry)),
            None => {
                let mut fallback_captures = Vec::new();
                let has_method = |handlers: &MethodTable<HandlerEntry<T>>| self.method_entry(handlers, method).is_some();
                let fallback = self.root.find(match_path.as_bytes(), 0, &mut fallback_captures, &has_method);
                match fallback {
                    Some(fallback) => {
                        captures = fallback_captures;
                        (fallback, self.entry_for(fallback, method))
                    }
                    None => (node, None),
                }
            }
        };

        let entry = match entry {
            Some(entry) => entry,
            None => return Lookup::MethodNotAllowed(node.handlers.allowed()),
        };

        match decode_captures(&decoded, &captures) {
            Ok(params) => Lookup::Matched(RouteMatch {
                value: &entry.value,
                route: &entry.pattern,
                params,
            }),
            Err(err) => {
                tracing::trace!(path, error = %err, "placeholder value is not valid percent encoding");
                Lookup::NotFound
            }
        }
    }

    fn entry_for<'t>(&self, node: &'t Node<T>, method: &Method) -> Option<&'t HandlerEntry<T>> {
        self.method_entry(&node.handlers, method)
    }

    fn method_entry<'t>(
        &self,
        handlers: &'t MethodTable<HandlerEntry<T>>,
        method: &Method,
    ) -> Option<&'t HandlerEntry<T>> {
        handlers.get(method).or_else(|| {
            if self.head_can_use_get && method == Method::HEAD {
                handlers.get(&Method::GET)
            } else {
                None
            }
        })
    }

    /// Visits every registered `(method, pattern, value)`.
    pub fn for_each<'t, F>(&'t self, mut f: F)
    where
        F: FnMut(&'t Method, &'t str, &'t T),
    {
        self.root
            .for_each_entry(&mut |method, entry: &'t HandlerEntry<T>| f(method, entry.pattern.as_str(), &entry.value));
    }
}

fn decode_captures(path: &str, captures: &[Capture<'_>]) -> crate::Result<RouteParams> {
    let mut params = RouteParams::with_capacity(captures.len());
    for capture in captures {
        let raw = &path[capture.start..capture.end];
        let value = if capture.catch_all {
            helpers::percent_decode_path(raw)?
        } else {
            helpers::percent_decode_segment(raw)?
        };
        params.set(capture.name, value);
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched<'t>(lookup: Lookup<'t, &'static str>) -> RouteMatch<'t, &'static str> {
        match lookup {
            Lookup::Matched(m) => m,
            other => panic!("expected a match, got {:?}", other),
        }
    }

    fn tree(routes: &[&'static str]) -> PathTree<&'static str> {
        let mut tree = PathTree::new();
        for route in routes {
            tree.insert(Method::GET, *route, *route).unwrap();
        }
        tree
    }

    #[test]
    fn should_match_static_routes_with_empty_params() {
        let routes = ["/", "/about", "/about/team", "/abc", "/users/", "/users/list"];
        let tree = tree(&routes);

        for route in routes.iter() {
            let m = matched(tree.lookup(&Method::GET, route));
            assert_eq!(*m.value, *route);
            assert_eq!(m.route, *route);
            assert!(m.params.is_empty());
        }

        assert!(matches!(tree.lookup(&Method::GET, "/ab"), Lookup::NotFound));
        assert!(matches!(tree.lookup(&Method::GET, "/about/"), Lookup::NotFound));
        assert!(matches!(tree.lookup(&Method::GET, ""), Lookup::NotFound));
    }

    #[test]
    fn should_extract_params() {
        let tree = tree(&["/base/:id", "/users/:user/books/:book"]);

        let m = matched(tree.lookup(&Method::GET, "/base/123"));
        assert_eq!(m.route, "/base/:id");
        assert_eq!(m.params.get("id").unwrap(), "123");

        let m = matched(tree.lookup(&Method::GET, "/users/alice/books/dune"));
        assert_eq!(m.params.get("user").unwrap(), "alice");
        assert_eq!(m.params.get("book").unwrap(), "dune");

        assert!(matches!(tree.lookup(&Method::GET, "/base/"), Lookup::NotFound));
        assert!(matches!(tree.lookup(&Method::GET, "/base/1/2"), Lookup::NotFound));
    }

    #[test]
    fn should_prefer_static_then_param_then_catch_all() {
        let tree = tree(&["/user/new", "/user/:id", "/user/*rest"]);

        assert_eq!(*matched(tree.lookup(&Method::GET, "/user/new")).value, "/user/new");
        assert_eq!(*matched(tree.lookup(&Method::GET, "/user/newer")).value, "/user/:id");
        assert_eq!(*matched(tree.lookup(&Method::GET, "/user/42")).value, "/user/:id");

        let m = matched(tree.lookup(&Method::GET, "/user/42/posts/7"));
        assert_eq!(*m.value, "/user/*rest");
        assert_eq!(m.params.get("rest").unwrap(), "42/posts/7");

        let m = matched(tree.lookup(&Method::GET, "/user/"));
        assert_eq!(*m.value, "/user/*rest");
        assert_eq!(m.params.get("rest").unwrap(), "");
    }

    #[test]
    fn should_match_literals_against_the_decoded_path() {
        let tree = tree(&["/café", "/a b", "/100%", "/docs/:name"]);

        assert_eq!(*matched(tree.lookup(&Method::GET, "/caf%C3%A9")).value, "/café");
        assert_eq!(*matched(tree.lookup(&Method::GET, "/caf%c3%a9")).value, "/café");
        assert_eq!(*matched(tree.lookup(&Method::GET, "/a%20b")).value, "/a b");
        assert_eq!(*matched(tree.lookup(&Method::GET, "/100%25")).value, "/100%");

        let m = matched(tree.lookup(&Method::GET, "/docs/a%2Fb"));
        assert_eq!(m.route, "/docs/:name");
        assert_eq!(m.params.get("name").unwrap(), "a/b");

        let m = matched(tree.lookup(&Method::GET, "/docs/100%2525"));
        assert_eq!(m.params.get("name").unwrap(), "100%25");

        assert!(matches!(tree.lookup(&Method::GET, "/docs%2Fx"), Lookup::NotFound));
    }

    #[test]
    fn should_fall_through_to_routes_with_the_method() {
        let mut tree = PathTree::new();
        tree.insert(Method::GET, "/users/:id", "get user").unwrap();
        tree.insert(Method::POST, "/users/*rest", "post anything").unwrap();
        tree.insert(Method::GET, "/items/new", "new item form").unwrap();
        tree.insert(Method::PUT, "/items/:id", "put item").unwrap();

        let m = matched(tree.lookup(&Method::POST, "/users/5"));
        assert_eq!(*m.value, "post anything");
        assert_eq!(m.params.get("rest").unwrap(), "5");

        let m = matched(tree.lookup(&Method::PUT, "/items/new"));
        assert_eq!(*m.value, "put item");
        assert_eq!(m.params.get("id").unwrap(), "new");

        match tree.lookup(&Method::DELETE, "/users/5") {
            Lookup::MethodNotAllowed(allowed) => assert_eq!(allowed, vec![Method::GET]),
            other => panic!("expected 405, got {:?}", other),
        }
    }

    #[test]
    fn should_backtrack_to_lower_priority_branches() {
        let tree = tree(&["/src/static/file", "/src/:dir/other", "/src/*path"]);

        assert_eq!(*matched(tree.lookup(&Method::GET, "/src/static/file")).value, "/src/static/file");

        let m = matched(tree.lookup(&Method::GET, "/src/static/other"));
        assert_eq!(*m.value, "/src/:dir/other");
        assert_eq!(m.params.get("dir").unwrap(), "static");

        let m = matched(tree.lookup(&Method::GET, "/src/static/missing"));
        assert_eq!(*m.value, "/src/*path");
        assert_eq!(m.params.get("path").unwrap(), "static/missing");
        assert_eq!(m.params.len(), 1);
    }

    #[test]
    fn should_skip_nodes_without_handlers() {
        let tree = tree(&["/a/b/c", "/a/:x"]);
        let m = matched(tree.lookup(&Method::GET, "/a/b"));
        assert_eq!(*m.value, "/a/:x");
    }

    #[test]
    fn should_report_allowed_methods() {
        let mut tree = PathTree::new().head_can_use_get(false);
        tree.insert(Method::POST, "/x", "post").unwrap();
        tree.insert(Method::GET, "/x", "get").unwrap();

        match tree.lookup(&Method::DELETE, "/x") {
            Lookup::MethodNotAllowed(methods) => assert_eq!(methods, vec![Method::GET, Method::POST]),
            other => panic!("expected method not allowed, got {:?}", other),
        }
        assert!(matches!(tree.lookup(&Method::HEAD, "/x"), Lookup::MethodNotAllowed(_)));
    }

    #[test]
    fn should_let_head_use_get() {
        let mut tree = PathTree::new();
        tree.insert(Method::GET, "/y", "get").unwrap();
        assert_eq!(*matched(tree.lookup(&Method::HEAD, "/y")).value, "get");

        tree.insert(Method::HEAD, "/y", "head").unwrap();
        assert_eq!(*matched(tree.lookup(&Method::HEAD, "/y")).value, "head");
    }

    #[test]
    fn should_decode_placeholder_values() {
        let tree = tree(&["/users/:name", "/files/*path"]);

        let m = matched(tree.lookup(&Method::GET, "/users/j%C3%BCrgen%20k"));
        assert_eq!(m.params.get("name").unwrap(), "jürgen k");

        let m = matched(tree.lookup(&Method::GET, "/users/a%2Fb"));
        assert_eq!(m.params.get("name").unwrap(), "a/b");

        let m = matched(tree.lookup(&Method::GET, "/files/a%20b/c%20d"));
        assert_eq!(m.params.get("path").unwrap(), "a b/c d");

        assert!(matches!(tree.lookup(&Method::GET, "/users/100%"), Lookup::NotFound));
    }

    #[test]
    fn should_match_case_insensitively_and_keep_param_case() {
        let mut insensitive = PathTree::new().case_insensitive(true);
        insensitive.insert(Method::GET, "/Users/:Name", "user").unwrap();

        let m = matched(insensitive.lookup(&Method::GET, "/USERS/AliCe"));
        assert_eq!(m.route, "/Users/:Name");
        assert_eq!(m.params.get("Name").unwrap(), "AliCe");

        let sensitive = tree(&["/users/:name"]);
        assert!(matches!(sensitive.lookup(&Method::GET, "/USERS/alice"), Lookup::NotFound));
    }

    #[test]
    fn should_round_trip_substituted_values() {
        let tree = tree(&["/api/:id/files/*rest"]);
        let cases = [("1", "a"), ("abc", "x/y/z"), ("a.b-c", "deep/er/path.txt")];

        for (id, rest) in cases.iter() {
            let path = format!("/api/{}/files/{}", id, rest);
            let m = matched(tree.lookup(&Method::GET, &path));
            assert_eq!(m.params.get("id").unwrap(), id);
            assert_eq!(m.params.get("rest").unwrap(), rest);
        }
    }

    #[test]
    fn should_visit_every_route() {
        let mut tree = PathTree::new();
        tree.insert(Method::GET, "/a", 1).unwrap();
        tree.insert(Method::POST, "/a", 2).unwrap();
        tree.insert(Method::GET, "/b/:id", 3).unwrap();
        tree.insert(Method::GET, "/c/*rest", 4).unwrap();

        let mut seen = Vec::new();
        tree.for_each(|method, pattern, value| seen.push((method.to_string(), pattern.to_owned(), *value)));
        seen.sort();

        assert_eq!(
            seen,
            vec![
                ("GET".to_owned(), "/a".to_owned(), 1),
                ("GET".to_owned(), "/b/:id".to_owned(), 3),
                ("GET".to_owned(), "/c/*rest".to_owned(), 4),
                ("POST".to_owned(), "/a".to_owned(), 2),
            ]
        );
    }
}
