pub use self::request_info::RequestInfo;
pub use self::route_data::RouteData;
pub use self::route_params::RouteParams;

mod request_info;
mod route_data;
mod route_params;
