use crate::error::InsertError;
use crate::host::HostPattern;
use crate::segment;

use http::Method;

/// A route definition: the host pattern and path template it serves, the
/// methods it handles, and an opaque handler.
///
/// Routes are immutable once built. The router never inspects the handler,
/// it is stored and handed back unchanged.
#[derive(Debug)]
pub struct Route<T> {
    name: String,
    host: String,
    path: String,
    methods: Vec<Method>,
    handler: T,
}

impl<T> Route<T> {
    /// Starts building a route.
    ///
    /// ```rust
    /// use hostmux::Route;
    ///
    /// let route = Route::builder()
    ///     .host("api.example.com")
    ///     .path("/users/{id:uint}")
    ///     .methods(["get", "head"])
    ///     .handler("show user")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(route.name(), "[GET HEAD] api.example.com/users/{id:uint}");
    /// ```
    pub fn builder() -> RouteBuilder<T> {
        RouteBuilder::default()
    }

    /// The name of the route, generated from its methods, host and path
    /// unless one was given.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The host pattern, empty if the route serves any host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The path template.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The methods handled by the route, sorted and without duplicates.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// The handler.
    pub fn handler(&self) -> &T {
        &self.handler
    }
}

/// A builder for [`Route`].
///
/// The host and path are validated as they are set. The first error is kept
/// and reported by [`build`](RouteBuilder::build), every call after it is a
/// no-op.
#[derive(Debug)]
pub struct RouteBuilder<T> {
    name: Option<String>,
    host: String,
    path: Option<String>,
    methods: Vec<Method>,
    handler: Option<T>,
    error: Option<InsertError>,
}

impl<T> Default for RouteBuilder<T> {
    fn default() -> Self {
        RouteBuilder {
            name: None,
            host: String::new(),
            path: None,
            methods: Vec::new(),
            handler: None,
            error: None,
        }
    }
}

impl<T> RouteBuilder<T> {
    /// Names the route.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        if self.error.is_none() {
            self.name = Some(name.into());
        }
        self
    }

    /// Sets the host pattern. The empty pattern serves any host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        if self.error.is_some() {
            return self;
        }

        let host = host.into();
        if !host.is_empty() {
            if let Err(err) = HostPattern::new(host.as_str()) {
                self.error = Some(err);
                return self;
            }
        }

        self.host = host;
        self
    }

    /// Sets the path template.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        if self.error.is_some() {
            return self;
        }

        let path = path.into();
        match segment::parse(&path) {
            Ok(_) => self.path = Some(path),
            Err(err) => self.error = Some(err),
        }
        self
    }

    /// Sets the handled methods, replacing any set before.
    ///
    /// Method names are case-insensitive.
    pub fn methods<I, M>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: AsRef<str>,
    {
        if self.error.is_some() {
            return self;
        }

        self.methods.clear();
        for method in methods {
            let method = method.as_ref();
            match Method::from_bytes(method.to_ascii_uppercase().as_bytes()) {
                Ok(method) => self.methods.push(method),
                Err(_) => {
                    self.error = Some(InsertError::InvalidMethod {
                        method: method.to_owned(),
                    });
                    return self;
                }
            }
        }

        self.methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        self.methods.dedup();
        self
    }

    /// Sets the handler.
    pub fn handler(mut self, handler: T) -> Self {
        if self.error.is_none() {
            self.handler = Some(handler);
        }
        self
    }

    /// Returns the first error encountered while building, if any.
    pub fn error(&self) -> Option<&InsertError> {
        self.error.as_ref()
    }

    /// Builds the route.
    pub fn build(self) -> Result<Route<T>, InsertError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let handler = self.handler.ok_or(InsertError::MissingHandler)?;

        if self.methods.is_empty() {
            return Err(InsertError::MissingMethods);
        }

        let path = self
            .path
            .ok_or_else(|| InsertError::invalid_path("", "routes must have a path"))?;

        let name = match self.name {
            Some(name) => name,
            None => {
                let methods = self
                    .methods
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("[{}] {}{}", methods, self.host, path)
            }
        };

        Ok(Route {
            name,
            host: self.host,
            path,
            methods: self.methods,
            handler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds() {
        let route = Route::builder()
            .path("/users/{id}")
            .methods(["POST", "get", "GET"])
            .handler(1)
            .build()
            .unwrap();

        assert_eq!(route.host(), "");
        assert_eq!(route.path(), "/users/{id}");
        assert_eq!(route.methods(), [Method::GET, Method::POST]);
        assert_eq!(route.name(), "[GET POST] /users/{id}");
        assert_eq!(*route.handler(), 1);
    }

    #[test]
    fn named() {
        let route = Route::builder()
            .name("users")
            .path("/users")
            .methods([Method::GET])
            .handler(())
            .build()
            .unwrap();

        assert_eq!(route.name(), "users");
    }

    #[test]
    fn missing_handler() {
        let err = Route::<()>::builder()
            .path("/users")
            .methods(["GET"])
            .build()
            .unwrap_err();
        assert_eq!(err, InsertError::MissingHandler);
    }

    #[test]
    fn missing_methods() {
        let err = Route::builder().path("/users").handler(()).build().unwrap_err();
        assert_eq!(err, InsertError::MissingMethods);

        let err = Route::builder()
            .path("/users")
            .methods(Vec::<&str>::new())
            .handler(())
            .build()
            .unwrap_err();
        assert_eq!(err, InsertError::MissingMethods);
    }

    #[test]
    fn first_error_wins() {
        let builder = Route::builder()
            .host("www.exa mple.com")
            .path("not a path")
            .methods(["GET"])
            .handler(());

        assert_eq!(
            builder.error(),
            Some(&InsertError::InvalidHostPattern {
                host: "www.exa mple.com".into()
            })
        );
        assert!(matches!(
            builder.build(),
            Err(InsertError::InvalidHostPattern { .. })
        ));
    }

    #[test]
    fn invalid_path() {
        let err = Route::builder()
            .path("/a/{*}/b")
            .methods(["GET"])
            .handler(())
            .build()
            .unwrap_err();
        assert!(matches!(err, InsertError::InvalidPathPattern { .. }));
    }

    #[test]
    fn invalid_method() {
        let err = Route::builder()
            .path("/")
            .methods(["GET", "NOT A METHOD"])
            .handler(())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            InsertError::InvalidMethod {
                method: "NOT A METHOD".into()
            }
        );
    }
}
