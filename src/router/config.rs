use hyper::{Method, StatusCode};
use std::collections::HashMap;

/// How the router answers a request whose path only matches a route after it was corrected,
/// i.e. after a trailing slash was added or removed or the path was cleaned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectBehavior {
    /// Redirect with `301 Moved Permanently`.
    Redirect301,
    /// Redirect with `307 Temporary Redirect`, clients keep the method and the body.
    Redirect307,
    /// Redirect with `308 Permanent Redirect`, clients keep the method and the body.
    Redirect308,
    /// Don't redirect, call the handler of the corrected path directly.
    UseHandler,
}

impl RedirectBehavior {
    pub(crate) fn status_code(self) -> Option<StatusCode> {
        match self {
            RedirectBehavior::Redirect301 => Some(StatusCode::MOVED_PERMANENTLY),
            RedirectBehavior::Redirect307 => Some(StatusCode::TEMPORARY_REDIRECT),
            RedirectBehavior::Redirect308 => Some(StatusCode::PERMANENT_REDIRECT),
            RedirectBehavior::UseHandler => None,
        }
    }
}

impl Default for RedirectBehavior {
    fn default() -> Self {
        RedirectBehavior::Redirect301
    }
}

/// The tunables of a [`Router`](./struct.Router.html).
///
/// Usually set through the [`RouterBuilder`](./struct.RouterBuilder.html) methods of the same name.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Serve HEAD requests with the GET handler when a route has no HEAD handler. Defaults to `true`.
    pub head_can_use_get: bool,

    /// Match the literal parts of the routes regardless of ASCII case. Defaults to `false`.
    pub case_insensitive: bool,

    /// Redirect `/path/` to `/path` (and the other way around) when only the other form has a
    /// route. Defaults to `true`.
    pub redirect_trailing_slash: bool,

    /// Redirect paths with `//`, `.` or `..` segments to their clean form when only the clean form
    /// has a route. Defaults to `true`.
    pub redirect_clean_path: bool,

    /// How the redirects above are performed. Defaults to [`RedirectBehavior::Redirect301`].
    pub redirect_behavior: RedirectBehavior,

    /// Per method overrides of `redirect_behavior`.
    pub redirect_method_behavior: HashMap<Method, RedirectBehavior>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig {
            head_can_use_get: true,
            case_insensitive: false,
            redirect_trailing_slash: true,
            redirect_clean_path: true,
            redirect_behavior: RedirectBehavior::default(),
            redirect_method_behavior: HashMap::new(),
        }
    }
}

impl RouterConfig {
    pub(crate) fn redirect_behavior_for(&self, method: &Method) -> RedirectBehavior {
        self.redirect_method_behavior
            .get(method)
            .copied()
            .unwrap_or(self.redirect_behavior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_prefer_method_overrides() {
        let mut config = RouterConfig::default();
        config
            .redirect_method_behavior
            .insert(Method::POST, RedirectBehavior::Redirect308);

        assert_eq!(config.redirect_behavior_for(&Method::GET), RedirectBehavior::Redirect301);
        assert_eq!(config.redirect_behavior_for(&Method::POST), RedirectBehavior::Redirect308);
        assert_eq!(RedirectBehavior::UseHandler.status_code(), None);
    }
}
