use self::support::{into_text, request};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response};
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use treemux::prelude::*;
use treemux::{ext, RouteData, RouteParams, Router};

mod support;

type Req = Request<Full<Bytes>>;

#[derive(Clone)]
struct AppName(&'static str);

#[derive(Clone)]
struct Hits(Arc<AtomicUsize>);

#[derive(Clone)]
struct Tenant(&'static str);

#[tokio::test]
async fn can_share_data_across_handlers() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router: Router<Full<Bytes>, Infallible> = Router::builder()
        .data(AppName("treemux"))
        .data(Hits(hits.clone()))
        .get("/", |req: Req| async move {
            req.data::<Hits>().unwrap().0.fetch_add(1, Ordering::SeqCst);
            let name = req.data::<AppName>().unwrap().0;
            Ok(Response::new(Full::new(Bytes::from(name))))
        })
        .build()
        .unwrap();

    for _ in 0..3 {
        let resp = router.handle_request(request("GET", "/")).await;
        assert_eq!(into_text(resp.into_body()).await, "treemux");
    }
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn can_prefer_request_values_over_default_context() {
    let router: Router<Full<Bytes>, Infallible> = Router::builder()
        .data(Tenant("default"))
        .data(AppName("treemux"))
        .get("/tenant", |req: Req| async move {
            let body = format!("{}/{}", req.data::<Tenant>().unwrap().0, req.data::<AppName>().unwrap().0);
            Ok(Response::new(Full::new(Bytes::from(body))))
        })
        .build()
        .unwrap();

    let resp = router.handle_request(request("GET", "/tenant")).await;
    assert_eq!(into_text(resp.into_body()).await, "default/treemux");

    let mut req = request("GET", "/tenant");
    req.extensions_mut().insert(Tenant("acme"));
    let resp = router.handle_request(req).await;
    assert_eq!(into_text(resp.into_body()).await, "acme/treemux");
}

#[tokio::test]
async fn can_read_route_data_in_not_found_handler() {
    let router: Router<Full<Bytes>, Infallible> = Router::builder()
        .get("/users/:id", |req: Req| async move {
            assert_eq!(req.route_data().params().len(), 1);
            Ok(Response::new(Full::new(Bytes::from(req.route().to_owned()))))
        })
        .not_found(|req: Req| async move {
            assert_eq!(req.route(), "");
            assert!(req.params().is_empty());
            Ok(Response::new(Full::new(Bytes::from("missing"))))
        })
        .build()
        .unwrap();

    let resp = router.handle_request(request("GET", "/users/1")).await;
    assert_eq!(into_text(resp.into_body()).await, "/users/:id");

    let resp = router.handle_request(request("GET", "/posts/1")).await;
    assert_eq!(into_text(resp.into_body()).await, "missing");
}

#[test]
fn can_attach_route_data_outside_the_router() {
    let mut req = request("GET", "/users/5");
    assert!(req.params().is_empty());
    assert_eq!(req.remote_addr(), None);

    let params: RouteParams = vec![("id", "5")].into_iter().collect();
    ext::set_route_data(req.extensions_mut(), RouteData::new("/users/:id", params));
    assert_eq!(req.param("id").map(String::as_str), Some("5"));
    assert_eq!(req.route(), "/users/:id");

    ext::set_params(req.extensions_mut(), RouteParams::new());
    assert!(req.param("id").is_none());
    assert_eq!(req.route(), "/users/:id");

    ext::set_route(req.extensions_mut(), "/other");
    assert_eq!(req.route(), "/other");
}
