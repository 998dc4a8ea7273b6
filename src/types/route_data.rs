use crate::types::RouteParams;

/// The data the router attaches to a request once a route matched it: the route template that
/// matched and the parameters extracted from the path.
///
/// It is read back in a handler with [`RequestExt::route_data`](./ext/trait.RequestExt.html#tymethod.route_data).
/// The parameters map is always present, it is just empty for routes without placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteData {
    route: String,
    params: RouteParams,
}

impl RouteData {
    /// Creates a new route data from a route template and its parameters.
    pub fn new<R: Into<String>>(route: R, params: RouteParams) -> RouteData {
        RouteData {
            route: route.into(),
            params,
        }
    }

    /// The route template which matched, e.g. `/users/:id`, not the literal request path.
    ///
    /// Empty if the request never went through the router.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// The parameters extracted from the request path.
    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    pub(crate) fn set_route<R: Into<String>>(&mut self, route: R) {
        self.route = route.into();
    }

    pub(crate) fn set_params(&mut self, params: RouteParams) {
        self.params = params;
    }
}
