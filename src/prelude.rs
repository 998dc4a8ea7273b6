//! The prelude of the crate, import it to get the request extension methods in scope.

pub use crate::ext::RequestExt;
