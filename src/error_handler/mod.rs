use crate::types::RequestInfo;
use crate::RouteError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use std::any::Any;
use std::future::Future;
use std::pin::Pin;

type ErrHandlerReturn = Box<dyn Future<Output = Response<Full<Bytes>>> + Send + 'static>;
type ErrHandlerWithoutInfo = Box<dyn Fn(RouteError) -> ErrHandlerReturn + Send + Sync + 'static>;
type ErrHandlerWithInfo = Box<dyn Fn(RouteError, RequestInfo) -> ErrHandlerReturn + Send + Sync + 'static>;
type PanicHandlerFn = Box<dyn Fn(String, RequestInfo) -> ErrHandlerReturn + Send + Sync + 'static>;

/// Turns the error returned by a handler into a response.
pub(crate) enum ErrHandler {
    WithoutInfo(ErrHandlerWithoutInfo),
    WithInfo(ErrHandlerWithInfo),
}

impl ErrHandler {
    pub(crate) fn new<H, R>(handler: H) -> ErrHandler
    where
        H: Fn(RouteError) -> R + Send + Sync + 'static,
        R: Future<Output = Response<Full<Bytes>>> + Send + 'static,
    {
        let handler: ErrHandlerWithoutInfo = Box::new(move |err: RouteError| Box::new(handler(err)));
        ErrHandler::WithoutInfo(handler)
    }

    pub(crate) fn new_with_info<H, R>(handler: H) -> ErrHandler
    where
        H: Fn(RouteError, RequestInfo) -> R + Send + Sync + 'static,
        R: Future<Output = Response<Full<Bytes>>> + Send + 'static,
    {
        let handler: ErrHandlerWithInfo =
            Box::new(move |err: RouteError, req_info: RequestInfo| Box::new(handler(err, req_info)));
        ErrHandler::WithInfo(handler)
    }

    pub(crate) fn should_require_req_info(&self) -> bool {
        matches!(self, ErrHandler::WithInfo(_))
    }

    pub(crate) async fn execute(&self, err: RouteError, req_info: Option<RequestInfo>) -> Response<Full<Bytes>> {
        match self {
            ErrHandler::WithoutInfo(handler) => Pin::from(handler(err)).await,
            ErrHandler::WithInfo(handler) => Pin::from(handler(err, req_info.unwrap_or_default())).await,
        }
    }
}

/// Turns a panic raised by a handler into a response.
pub(crate) struct PanicHandler(PanicHandlerFn);

impl PanicHandler {
    pub(crate) fn new<H, R>(handler: H) -> PanicHandler
    where
        H: Fn(String, RequestInfo) -> R + Send + Sync + 'static,
        R: Future<Output = Response<Full<Bytes>>> + Send + 'static,
    {
        PanicHandler(Box::new(move |msg: String, req_info: RequestInfo| Box::new(handler(msg, req_info))))
    }

    pub(crate) async fn execute(&self, msg: String, req_info: Option<RequestInfo>) -> Response<Full<Bytes>> {
        Pin::from((self.0)(msg, req_info.unwrap_or_default())).await
    }
}

/// Extracts the message of a panic payload.
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(msg) => *msg,
        Err(payload) => match payload.downcast_ref::<&'static str>() {
            Some(msg) => (*msg).to_owned(),
            None => "handler panicked".to_owned(),
        },
    }
}

pub(crate) fn plain_response(status: StatusCode) -> Response<Full<Bytes>> {
    let body = status.canonical_reason().unwrap_or_default();
    let mut res = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *res.status_mut() = status;
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    res
}

pub(crate) async fn default_err_handler(err: RouteError) -> Response<Full<Bytes>> {
    tracing::error!(error = %err, "route handler failed");
    plain_response(StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic;

    #[test]
    fn should_extract_panic_messages() {
        let payload = panic::catch_unwind(|| panic!("static message")).unwrap_err();
        assert_eq!(panic_message(payload), "static message");

        let payload = panic::catch_unwind(|| panic!("formatted {}", 42)).unwrap_err();
        assert_eq!(panic_message(payload), "formatted 42");

        let payload = panic::catch_unwind(|| panic::panic_any(7_u32)).unwrap_err();
        assert_eq!(panic_message(payload), "handler panicked");
    }

    #[tokio::test]
    async fn should_respond_with_plain_500() {
        let res = default_err_handler("boom".into()).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }
}
