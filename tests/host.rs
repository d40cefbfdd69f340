use hostmux::{HostParams, HostPattern, HostRouter, InsertError, MatchError, Route};
use http::Method;
use std::sync::Arc;

fn route(host: &str, path: &str) -> Arc<Route<String>> {
    Arc::new(
        Route::builder()
            .host(host)
            .path(path)
            .methods([Method::GET])
            .handler(format!("{}{}", host, path))
            .build()
            .unwrap(),
    )
}

struct HostTest(Vec<(&'static str, Result<(), &'static str>)>);

impl HostTest {
    fn run(self) -> HostRouter<String> {
        let mut router = HostRouter::new();
        for (host, expected) in self.0 {
            let got = router.add_hostname(host);
            let expected = expected.map_err(|with| InsertError::ConflictingHostRegistration {
                host: host.into(),
                with: with.into(),
            });
            assert_eq!(got, expected, "{host}");
        }
        router
    }
}

#[test]
fn host_conflicts() {
    let router = HostTest(vec![
        ("*.example.com", Ok(())),
        // different label counts can never claim the same host
        ("*.com", Ok(())),
        ("*.*.com", Err("*.example.com")),
        ("api.example.com", Err("*.example.com")),
        ("*.local", Ok(())),
        ("api.example.org", Ok(())),
        ("*.api.example.org", Ok(())),
        ("eu.api.example.org", Err("*.api.example.org")),
        ("", Ok(())),
        ("", Ok(())),
    ])
    .run();

    assert_eq!(
        router.hostnames().map(HostPattern::as_str).collect::<Vec<_>>(),
        ["*.example.com", "*.com", "*.local", "api.example.org", "*.api.example.org"]
    );
}

#[test]
fn disjoint_hosts() {
    HostTest(vec![
        ("*.example", Ok(())),
        ("*.local", Ok(())),
        ("www.example.com", Ok(())),
        ("api.example.com", Ok(())),
        ("*.*.example.com", Ok(())),
    ])
    .run();
}

#[test]
fn invalid_hosts() {
    let mut router = HostRouter::<()>::new();
    for host in ["www.example.*", "*example.com", "ex ample.com", "-x.com", "x..com", "."] {
        assert_eq!(
            router.add_hostname(host),
            Err(InsertError::InvalidHostPattern { host: host.into() }),
            "{host}"
        );
    }
    assert_eq!(router.hostnames().count(), 0);
}

#[test]
fn wildcard_labels() {
    let mut router = HostRouter::new();
    router.add_hostname("*.*.example.com").unwrap();
    router.add_route(route("*.*.example.com", "/{page}")).unwrap();

    let matched = router.at("eu.api.example.com", "/status").unwrap();
    assert_eq!(matched.host_params.iter().collect::<Vec<_>>(), ["eu", "api"]);
    assert_eq!(matched.params.get("page"), Some("status"));

    assert_eq!(router.at("api.example.com", "/status").unwrap_err(), MatchError::NotFound);
    assert_eq!(router.at("a.b.c.example.com", "/status").unwrap_err(), MatchError::NotFound);
}

#[test]
fn fallback_serves_any_host() {
    let mut router = HostRouter::new();
    router.add_hostname("api.example.com").unwrap();
    router.add_route(route("api.example.com", "/users")).unwrap();
    router.add_route(route("", "/users")).unwrap();
    router.add_route(route("", "/health")).unwrap();

    let matched = router.at("api.example.com", "/users").unwrap();
    assert_eq!(matched.methods[&Method::GET].handler(), "api.example.com/users");

    let matched = router.at("www.example.com", "/users").unwrap();
    assert_eq!(matched.methods[&Method::GET].handler(), "/users");

    let matched = router.at("api.example.com", "/health").unwrap();
    assert_eq!(matched.methods[&Method::GET].handler(), "/health");

    let matched = router.at("", "/health").unwrap();
    assert_eq!(matched.methods[&Method::GET].handler(), "/health");
}

#[test]
fn reused_buffers() {
    let mut router = HostRouter::new();
    router.add_hostname("*.example.com").unwrap();
    router.add_route(route("*.example.com", "/users/{id:uint}")).unwrap();
    router.add_route(route("", "/users/{name}")).unwrap();

    let mut params = hostmux::Params::new();
    let mut host_params = HostParams::default();

    let (methods, _) = router
        .lookup("api.example.com", "/users/bob", &mut params, &mut host_params)
        .unwrap();
    assert_eq!(methods[&Method::GET].handler(), "/users/{name}");
    assert_eq!(params.iter().collect::<Vec<_>>(), [("name", "bob")]);
    assert!(host_params.is_empty());
}

#[test]
fn cleared_buffers_compare_equal() {
    let mut router = HostRouter::new();
    router.add_route(route("", "/a/{x}/{y}")).unwrap();
    router.add_route(route("", "/b/{x}")).unwrap();

    let mut params = hostmux::Params::new();
    let mut host_params = HostParams::default();
    router
        .lookup("example.com", "/a/1/2", &mut params, &mut host_params)
        .unwrap();

    params.clear();
    host_params.clear();
    router
        .lookup("example.com", "/b/1", &mut params, &mut host_params)
        .unwrap();

    let fresh = router.at("example.com", "/b/1").unwrap();
    assert_eq!(params, fresh.params);
    assert_eq!(host_params, fresh.host_params);
}

#[test]
fn per_host_tries() {
    let mut router = HostRouter::new();
    router.add_hostname("a.example.com").unwrap();
    router.add_hostname("b.example.com").unwrap();
    router.add_route(route("a.example.com", "/x")).unwrap();
    router.add_route(route("b.example.com", "/x")).unwrap();

    // the same template on different hosts is not a conflict
    assert!(router.trie("a.example.com").unwrap().at("/x").is_some());
    assert!(router.trie("b.example.com").unwrap().at("/x").is_some());
    assert!(router.trie("").unwrap().at("/x").is_none());
    assert!(router.trie("c.example.com").is_none());

    assert_eq!(
        router.add_route(route("a.example.com", "/x")),
        Err(InsertError::ConflictingRouteRegistration {
            path: "/x".into(),
            reason: "a method is already handled by the same template",
        })
    );
}
