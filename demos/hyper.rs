use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use http::header::{HeaderValue, ALLOW, HOST};
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1::Builder as ConnectionBuilder;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tower::service_fn;
use tower::util::BoxCloneService;
use tower::Service as _;

use hostmux::{MatchError, Router};

type Body = Full<Bytes>;

// GET / on any host
async fn index(_req: Request<Incoming>) -> Result<Response<Body>, Infallible> {
    Ok(Response::new(Body::from("Hello, world!")))
}

// GET /users/{id:uint} on api.localhost
async fn user(req: Request<Incoming>) -> Result<Response<Body>, Infallible> {
    let id = req.extensions().get::<UserId>().map(|id| id.0).unwrap_or_default();
    Ok(Response::new(Body::from(format!("user #{}", id))))
}

// GET /{*} on *.static.localhost
async fn asset(req: Request<Incoming>) -> Result<Response<Body>, Infallible> {
    let asset = req.extensions().get::<Asset>().cloned().unwrap_or_default();
    Ok(Response::new(Body::from(format!("bucket '{}', file '{}'", asset.bucket, asset.file))))
}

#[derive(Clone, Copy)]
struct UserId(u64);

#[derive(Clone, Default)]
struct Asset {
    bucket: String,
    file: String,
}

fn status(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::default());
    *response.status_mut() = status;
    response
}

// We use `BoxCloneService` to erase the type of each handler service.
//
// We still need a `Mutex` around each service because `BoxCloneService` doesn't
// require the service to implement `Sync`.
type Service = Mutex<BoxCloneService<Request<Incoming>, Response<Body>, Infallible>>;

fn service<F, Fut>(f: F) -> Service
where
    F: Fn(Request<Incoming>) -> Fut + Clone + Send + 'static,
    Fut: std::future::Future<Output = Result<Response<Body>, Infallible>> + Send + 'static,
{
    Mutex::new(BoxCloneService::new(service_fn(f)))
}

async fn route(
    router: Arc<Router<Service>>,
    mut req: Request<Incoming>,
) -> Result<Response<Body>, Infallible> {
    let host = req
        .headers()
        .get(HOST)
        .and_then(|host| host.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    let path = req.uri().path().to_owned();

    let mut service = match router.route(req.method(), &host, &path) {
        Ok(found) => {
            if let Some(id) = found.params.get("id").and_then(|id| id.parse().ok()) {
                req.extensions_mut().insert(UserId(id));
            }
            if let Some(file) = found.params.get("*") {
                req.extensions_mut().insert(Asset {
                    bucket: found.host_params.get(0).unwrap_or_default().to_owned(),
                    file: file.to_owned(),
                });
            }

            // lock the service for a very short time, just to clone the service
            found.handler().lock().unwrap().clone()
        }
        Err(MatchError::MethodNotAllowed { allowed }) => {
            let allowed = allowed.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ");
            let mut response = status(StatusCode::METHOD_NOT_ALLOWED);
            if let Ok(allowed) = HeaderValue::from_str(&allowed) {
                response.headers_mut().insert(ALLOW, allowed);
            }
            return Ok(response);
        }
        Err(MatchError::NotFound) => return Ok(status(StatusCode::NOT_FOUND)),
    };

    service.call(req).await
}

#[tokio::main]
async fn main() {
    simple_logger::init_with_level(log::Level::Debug).expect("couldn't initialize logging");

    // Create a router and register our hosts and routes.
    let mut router = Router::new();
    router.add_hostname("api.localhost").unwrap();
    router.add_hostname("*.static.localhost").unwrap();

    router.insert("", "/", ["GET"], service(index)).unwrap();
    router
        .insert("api.localhost", "/users/{id:uint}", ["GET", "HEAD"], service(user))
        .unwrap();
    router
        .insert("*.static.localhost", "/{*}", ["GET"], service(asset))
        .unwrap();

    router.compile().unwrap();

    let listener = TcpListener::bind(("127.0.0.1", 3000)).await.unwrap();

    // boilerplate for the hyper service
    let router = Arc::new(router);

    loop {
        let router = router.clone();
        let (tcp, _) = listener.accept().await.unwrap();
        tokio::task::spawn(async move {
            if let Err(err) = ConnectionBuilder::new()
                .serve_connection(
                    TokioIo::new(tcp),
                    hyper::service::service_fn(|request| route(router.clone(), request)),
                )
                .await
            {
                log::error!("error serving connection: {:?}", err);
            }
        });
    }
}
