use hostmux::{InsertError, MatchError, Route, Router};
use http::Method;

fn router() -> Router<&'static str> {
    let mut router = Router::new();
    router
        .set_hostnames(["api.example.com", "*.cdn.example.com", ""])
        .unwrap();

    router
        .insert("api.example.com", "/users", ["GET"], "list users")
        .unwrap();
    router
        .insert("api.example.com", "/users", ["POST"], "create user")
        .unwrap();
    router
        .insert("api.example.com", "/users/{id:uint}", ["GET", "HEAD"], "show user")
        .unwrap();
    router
        .insert("api.example.com", "/users/{id:uint}", ["DELETE"], "delete user")
        .unwrap();
    router
        .insert("*.cdn.example.com", "/assets/{*}", ["GET"], "asset")
        .unwrap();
    router.insert("", "/health", ["GET"], "health").unwrap();
    router.insert("", "/users/{name}", ["GET"], "user page").unwrap();

    router.compile().unwrap();
    router
}

#[test]
fn resolves_host_and_path() {
    let router = router();

    let found = router.route(&Method::GET, "api.example.com", "/users").unwrap();
    assert_eq!(*found.handler(), "list users");
    assert!(found.params.is_empty());

    let found = router.route(&Method::POST, "api.example.com", "/users").unwrap();
    assert_eq!(*found.handler(), "create user");

    let found = router.route(&Method::HEAD, "api.example.com:443", "/users/42").unwrap();
    assert_eq!(*found.handler(), "show user");
    assert_eq!(found.params.get("id"), Some("42"));
    assert_eq!(found.matched_path, "/users/42");

    let found = router.route(&Method::GET, "eu.cdn.example.com", "/assets/img/logo.png").unwrap();
    assert_eq!(*found.handler(), "asset");
    assert_eq!(found.host_params.iter().collect::<Vec<_>>(), ["eu"]);
    assert_eq!(found.params.get("*"), Some("img/logo.png"));
    assert_eq!(found.matched_path, "/assets");
}

#[test]
fn lookups_are_idempotent() {
    let router = router();

    for _ in 0..3 {
        let matched = router.at("api.example.com", "/users/7").unwrap();
        assert_eq!(matched.params.iter().collect::<Vec<_>>(), [("id", "7")]);
        assert_eq!(matched.allowed(), [Method::DELETE, Method::GET, Method::HEAD]);
    }
}

#[test]
fn fallback() {
    let router = router();

    // `bob` fails the `uint` type, so the any host routes are tried next
    let found = router.route(&Method::GET, "api.example.com", "/users/bob").unwrap();
    assert_eq!(*found.handler(), "user page");
    assert_eq!(found.params.get("name"), Some("bob"));
    assert!(found.host_params.is_empty());

    let found = router.route(&Method::GET, "example.org", "/users/7").unwrap();
    assert_eq!(*found.handler(), "user page");

    let found = router.route(&Method::GET, "example.org", "/health").unwrap();
    assert_eq!(*found.handler(), "health");

    assert_eq!(
        router.route(&Method::GET, "example.org", "/").unwrap_err(),
        MatchError::NotFound
    );
    assert_eq!(
        router.route(&Method::GET, "cdn.example.com", "/assets/x").unwrap_err(),
        MatchError::NotFound
    );
}

#[test]
fn method_not_allowed() {
    let router = router();

    assert_eq!(
        router.route(&Method::PUT, "api.example.com", "/users/7").unwrap_err(),
        MatchError::MethodNotAllowed {
            allowed: vec![Method::DELETE, Method::GET, Method::HEAD]
        }
    );
    assert_eq!(
        router.route(&Method::DELETE, "api.example.com", "/users").unwrap_err(),
        MatchError::MethodNotAllowed {
            allowed: vec![Method::GET, Method::POST]
        }
    );

    let err = router.route(&Method::PATCH, "example.org", "/health").unwrap_err();
    assert_eq!(err.to_string(), "method not allowed, expected one of: GET");
}

#[test]
fn not_found() {
    let mut router = Router::new();
    router.add_hostname("api.example.com").unwrap();
    router.insert("api.example.com", "/users", ["GET"], ()).unwrap();
    router.compile().unwrap();

    for (host, path) in [
        ("www.example.com", "/users"),
        ("api.example.com", "/users/"),
        ("api.example.com", "/"),
        ("api.example.com", ""),
        ("", "/users"),
    ] {
        assert_eq!(
            router.at(host, path).unwrap_err(),
            MatchError::NotFound,
            "{host} {path}"
        );
    }
}

#[test]
fn compile_errors() {
    let mut router = Router::new();
    router.add_hostname("*.example.com").unwrap();
    router.add_hostname("api.example.com").unwrap();
    assert_eq!(
        router.compile(),
        Err(InsertError::ConflictingHostRegistration {
            host: "api.example.com".into(),
            with: "*.example.com".into(),
        })
    );

    router.set_hostnames(["*.example.com"]).unwrap();
    router.insert("*.example.com", "/{*}", ["GET"], 1).unwrap();
    router.insert("*.example.com", "/about", ["GET"], 2).unwrap();
    assert!(matches!(
        router.compile(),
        Err(InsertError::ConflictingRouteRegistration { .. })
    ));
    assert!(router.compiled().is_none());
}

#[test]
fn recompile() {
    let mut router = Router::new();
    router.insert("", "/a", ["GET"], "a").unwrap();
    router.compile().unwrap();
    assert!(router.at("", "/b").is_err());

    router.insert("", "/b", ["GET"], "b").unwrap();
    // added routes are only served after the next compilation
    assert!(router.at("", "/b").is_err());

    router.compile().unwrap();
    assert_eq!(*router.route(&Method::GET, "", "/b").unwrap().handler(), "b");
    assert_eq!(router.routes().len(), 2);
}

#[test]
fn named_routes() {
    let mut router = Router::new();
    router.add_route(
        Route::builder()
            .name("users.show")
            .path("/users/{id}")
            .methods(["GET"])
            .handler(())
            .build()
            .unwrap(),
    );
    router.add_route(
        Route::builder()
            .path("/users")
            .methods(["GET", "HEAD"])
            .handler(())
            .build()
            .unwrap(),
    );
    router.compile().unwrap();

    let found = router.route(&Method::GET, "localhost", "/users/1").unwrap();
    assert_eq!(found.route.name(), "users.show");

    let found = router.route(&Method::HEAD, "localhost", "/users").unwrap();
    assert_eq!(found.route.name(), "[GET HEAD] /users");
}

#[test]
fn invalid_registrations() {
    let mut router = Router::<()>::new();
    assert!(matches!(
        router.insert("", "users", ["GET"], ()),
        Err(InsertError::InvalidPathPattern { .. })
    ));
    assert!(matches!(
        router.insert("www.*.com", "/", ["GET"], ()),
        Err(InsertError::InvalidHostPattern { .. })
    ));
    assert_eq!(
        router.insert("", "/", Vec::<String>::new(), ()),
        Err(InsertError::MissingMethods)
    );
    assert_eq!(
        router.insert("", "/", ["GE T"], ()),
        Err(InsertError::InvalidMethod {
            method: "GE T".into()
        })
    );
    assert!(router.routes().is_empty());
}

#[test]
fn shared_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Router<Box<dyn Fn() + Send + Sync>>>();
    assert_send_sync::<hostmux::HostRouter<String>>();
}
