use crate::error::{InsertError, MatchError};
use crate::host::{HostPattern, HostRouter};
use crate::params::{HostParams, Params};
use crate::route::Route;
use crate::tree::Methods;

use http::Method;

use std::sync::Arc;

/// A successful host and path lookup.
#[derive(Debug)]
pub struct Match<'r, 'p, T> {
    /// The routes registered for the matched template, by method.
    pub methods: &'r Methods<T>,
    /// The part of the request path matched by the template. This is the
    /// whole path, unless a catch-all consumed a suffix of it.
    pub matched_path: &'p str,
    /// The path parameters, in the order they appear in the path.
    pub params: Params<'r, 'p>,
    /// The host labels matched by wildcards of the host pattern.
    pub host_params: HostParams<'p>,
}

impl<'r, 'p, T> Match<'r, 'p, T> {
    /// Returns the route handling `method`, or the methods that are allowed
    /// instead.
    pub fn route(&self, method: &Method) -> Result<&'r Arc<Route<T>>, MatchError> {
        let methods: &'r Methods<T> = self.methods;
        methods.get(method).ok_or_else(|| MatchError::MethodNotAllowed {
            allowed: self.allowed(),
        })
    }

    /// The methods handled by the matched template, sorted by name.
    pub fn allowed(&self) -> Vec<Method> {
        let mut allowed = self.methods.keys().cloned().collect::<Vec<_>>();
        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        allowed
    }
}

/// A resolved `(method, host, path)` triple.
#[derive(Debug)]
pub struct Found<'r, 'p, T> {
    /// The route handling the request.
    pub route: &'r Arc<Route<T>>,
    /// See [`Match::matched_path`].
    pub matched_path: &'p str,
    /// The path parameters, in the order they appear in the path.
    pub params: Params<'r, 'p>,
    /// The host labels matched by wildcards of the host pattern.
    pub host_params: HostParams<'p>,
}

impl<'r, 'p, T> Found<'r, 'p, T> {
    /// The handler of the matched route.
    pub fn handler(&self) -> &'r T {
        let route: &'r Arc<Route<T>> = self.route;
        route.handler()
    }
}

/// Collects host and route registrations, and compiles them into a
/// [`HostRouter`] that serves lookups.
///
/// Registrations are only checked against each other by
/// [`compile`](Router::compile). Until it succeeds, every lookup fails with
/// [`MatchError::NotFound`].
///
/// ```rust
/// use hostmux::Router;
/// use http::Method;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut router = Router::new();
/// router.add_hostname("api.example.com")?;
/// router.insert("api.example.com", "/users/{id:uint}", [Method::GET, Method::HEAD], "show user")?;
/// router.insert("", "/static/{*}", [Method::GET], "static files")?;
/// router.compile()?;
///
/// let found = router.route(&Method::GET, "api.example.com:8080", "/users/42")?;
/// assert_eq!(*found.handler(), "show user");
/// assert_eq!(found.params.get("id"), Some("42"));
///
/// let found = router.route(&Method::GET, "cdn.example.com", "/static/css/site.css")?;
/// assert_eq!(found.params.get("*"), Some("css/site.css"));
/// assert_eq!(found.matched_path, "/static");
/// # Ok(())
/// # }
/// ```
pub struct Router<T> {
    hostnames: Vec<String>,
    routes: Vec<Arc<Route<T>>>,
    compiled: Option<HostRouter<T>>,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates an empty router.
    pub fn new() -> Self {
        Router {
            hostnames: Vec::new(),
            routes: Vec::new(),
            compiled: None,
        }
    }

    /// Declares a host pattern. Patterns must be declared before the routes
    /// that reference them are compiled.
    pub fn add_hostname(&mut self, pattern: impl Into<String>) -> Result<(), InsertError> {
        let pattern = pattern.into();
        if !pattern.is_empty() {
            HostPattern::new(pattern.as_str())?;
        }

        self.hostnames.push(pattern);
        Ok(())
    }

    /// Replaces the declared host patterns.
    pub fn set_hostnames<I, S>(&mut self, patterns: I) -> Result<(), InsertError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut hostnames = Vec::new();
        for pattern in patterns {
            let pattern = pattern.into();
            if !pattern.is_empty() {
                HostPattern::new(pattern.as_str())?;
            }
            hostnames.push(pattern);
        }

        self.hostnames = hostnames;
        Ok(())
    }

    /// Adds a route built with [`Route::builder`].
    pub fn add_route(&mut self, route: Route<T>) {
        self.routes.push(Arc::new(route));
    }

    /// Builds and adds a route.
    ///
    /// An empty `host` serves any host. Method names are case-insensitive.
    pub fn insert<I, M>(
        &mut self,
        host: impl Into<String>,
        path: impl Into<String>,
        methods: I,
        handler: T,
    ) -> Result<(), InsertError>
    where
        I: IntoIterator<Item = M>,
        M: AsRef<str>,
    {
        let route = Route::builder()
            .host(host)
            .path(path)
            .methods(methods)
            .handler(handler)
            .build()?;

        self.add_route(route);
        Ok(())
    }

    /// The declared host patterns, in declaration order.
    pub fn hostnames(&self) -> &[String] {
        &self.hostnames
    }

    /// The added routes, in insertion order.
    pub fn routes(&self) -> &[Arc<Route<T>>] {
        &self.routes
    }

    /// Compiles the declared hosts and routes.
    ///
    /// On failure the router is left without compiled routes and serves
    /// nothing, even if a previous compilation succeeded.
    pub fn compile(&mut self) -> Result<(), InsertError> {
        self.compiled = None;

        let compiled = self.build().map_err(|err| {
            warn!("failed to compile routes: {}", err);
            err
        })?;

        debug!(
            "compiled {} host patterns and {} routes",
            self.hostnames.len(),
            self.routes.len()
        );
        self.compiled = Some(compiled);
        Ok(())
    }

    fn build(&self) -> Result<HostRouter<T>, InsertError> {
        let mut router = HostRouter::new();

        for hostname in &self.hostnames {
            router.add_hostname(hostname)?;
        }

        for route in &self.routes {
            router.add_route(route.clone())?;
        }

        Ok(router)
    }

    /// Returns `true` if the last compilation succeeded.
    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    /// The compiled router, if the last compilation succeeded.
    pub fn compiled(&self) -> Option<&HostRouter<T>> {
        self.compiled.as_ref()
    }

    /// Resolves a host and path. A `:port` suffix of the host is ignored.
    pub fn at<'r, 'p>(
        &'r self,
        host: &'p str,
        path: &'p str,
    ) -> Result<Match<'r, 'p, T>, MatchError> {
        match &self.compiled {
            Some(compiled) => compiled.at(strip_port(host), path),
            None => Err(MatchError::NotFound),
        }
    }

    /// Resolves a request method, host and path to the route handling it.
    pub fn route<'r, 'p>(
        &'r self,
        method: &Method,
        host: &'p str,
        path: &'p str,
    ) -> Result<Found<'r, 'p, T>, MatchError> {
        let matched = self.at(host, path)?;
        let route = matched.route(method)?;

        Ok(Found {
            route,
            matched_path: matched.matched_path,
            params: matched.params,
            host_params: matched.host_params,
        })
    }
}

// Strips the port from a Host header value, including bracketed IPv6
// addresses such as `[::1]:8080`.
fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split_once(']').map_or(host, |(address, _)| address);
    }

    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && port.bytes().all(|b| b.is_ascii_digit()) => {
            name
        }
        _ => host,
    }
}
