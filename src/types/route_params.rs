use std::collections::hash_map::{HashMap, Iter};
use std::iter::FromIterator;

/// Represents a map of the route parameters using the name of the parameter specified in the path as their respective keys.
///
/// Please refer to the [Route Parameters](./index.html#route-parameters) section for more info.
///
/// **Note:** This type shouldn't be created directly. It will be populated into the `req` object of the route handler and
/// can be accessed as `req.params()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(HashMap<String, String>);

impl RouteParams {
    /// Creates an empty route parameters map.
    pub fn new() -> RouteParams {
        RouteParams(HashMap::new())
    }

    /// Creates an empty route parameters map with the specified capacity.
    pub fn with_capacity(capacity: usize) -> RouteParams {
        RouteParams(HashMap::with_capacity(capacity))
    }

    /// Sets a new parameter entry with the specified key and the value.
    pub fn set<N: Into<String>, V: Into<String>>(&mut self, param_name: N, param_val: V) {
        self.0.insert(param_name.into(), param_val.into());
    }

    /// Returns the route parameter value mapped with the specified key.
    ///
    /// # Examples
    ///
    /// ```
    /// use treemux::RouteParams;
    ///
    /// let mut params = RouteParams::new();
    /// params.set("userName", "alice");
    ///
    /// assert_eq!(params.get("userName").map(String::as_str), Some("alice"));
    /// assert_eq!(params.get("bookName"), None);
    /// ```
    pub fn get<N: AsRef<str>>(&self, param_name: N) -> Option<&String> {
        self.0.get(param_name.as_ref())
    }

    /// Checks if a route parameter exists.
    pub fn has<N: AsRef<str>>(&self, param_name: N) -> bool {
        self.0.contains_key(param_name.as_ref())
    }

    /// Returns the length of the route parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the route has no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an [`Iterator`](https://doc.rust-lang.org/std/iter/trait.Iterator.html) over the parameter names.
    pub fn params_names(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Returns an [`Iterator`](https://doc.rust-lang.org/std/iter/trait.Iterator.html) over the parameter entries
    /// as `(parameter_name: &String, parameter_value: &String)`.
    pub fn iter(&self) -> Iter<'_, String, String> {
        self.0.iter()
    }

    /// Extends the current parameters map with other one.
    pub fn extend(&mut self, other_route_params: RouteParams) {
        self.0.extend(other_route_params.0);
    }

    /// Returns the parameters as a plain `HashMap`.
    pub fn into_inner(self) -> HashMap<String, String> {
        self.0
    }
}

impl From<HashMap<String, String>> for RouteParams {
    fn from(map: HashMap<String, String>) -> RouteParams {
        RouteParams(map)
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for RouteParams {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> RouteParams {
        RouteParams(iter.into_iter().map(|(n, v)| (n.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a RouteParams {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
