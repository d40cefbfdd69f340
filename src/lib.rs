//! A host and path aware request router.
//!
//! ```rust
//! use hostmux::Router;
//! use http::Method;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut router = Router::new();
//! router.add_hostname("*.example.com")?;
//! router.insert("*.example.com", "/users/{id:uint}", [Method::GET], "A User")?;
//! router.insert("", "/home", [Method::GET], "Welcome!")?;
//! router.compile()?;
//!
//! let matched = router.at("api.example.com", "/users/978")?;
//! assert_eq!(matched.params.get("id"), Some("978"));
//! assert_eq!(matched.host_params.get(0), Some("api"));
//! assert_eq!(*matched.route(&Method::GET)?.handler(), "A User");
//! # Ok(())
//! # }
//! ```
//!
//! # Path Templates
//!
//! Templates begin with `/` and are matched one `/`-delimited component at a
//! time. A component is one of:
//!
//! ```text
//!  Syntax             Matches
//!  users              exactly `users`
//!  {name}             any non-empty component
//!  {name:type}        a component of the given type
//!  v{major:uint}.txt  literal text around one or more placeholders
//!  {*}                the rest of the path, last component only
//! ```
//!
//! The parameter types are:
//!
//! ```text
//!  int      optional `-` followed by digits            -17
//!  uint     digits                                     42
//!  id       hexadecimal digits                         deadbeef
//!  uuid     8-4-4-4-12 hexadecimal digits              550e8400-e29b-11d4-a716-446655440000
//!  uuidv4   uuid with version 4 and variant 8, 9, a, b 550e8400-e29b-41d4-a716-446655440000
//! ```
//!
//! The catch-all is reported under the key `*`, without its leading slash:
//!
//! ```rust
//! # use hostmux::Router;
//! # use http::Method;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut router = Router::new();
//! router.insert("", "/static/{*}", [Method::GET], "files")?;
//! router.compile()?;
//!
//! let matched = router.at("", "/static/assets/app.js")?;
//! assert_eq!(matched.params.get("*"), Some("assets/app.js"));
//! assert_eq!(matched.matched_path, "/static");
//!
//! let matched = router.at("", "/static/")?;
//! assert_eq!(matched.params.get("*"), Some(""));
//! # Ok(())
//! # }
//! ```
//!
//! # Precedence
//!
//! At every level, a lookup takes the first template component, in
//! registration order, that matches. Literals do not take priority over
//! parameters, and a lookup never backtracks:
//!
//! ```rust
//! # use hostmux::Router;
//! # use http::Method;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut router = Router::new();
//! router.insert("", "/users/me", [Method::GET], "me")?;
//! router.insert("", "/users/{id}", [Method::GET], "user")?;
//! router.compile()?;
//!
//! assert_eq!(*router.route(&Method::GET, "", "/users/me")?.handler(), "me");
//! assert_eq!(*router.route(&Method::GET, "", "/users/1")?.handler(), "user");
//! # Ok(())
//! # }
//! ```
//!
//! Register more specific templates first if they overlap. A catch-all may
//! not share its level with any other template.
//!
//! # Host Patterns
//!
//! Host patterns are `.`-delimited DNS labels, where leading labels may be
//! the wildcard `*`, matching exactly one label. Patterns that could match
//! the same host are rejected, so every host is claimed by at most one
//! pattern. Routes registered for the empty host serve any host, after the
//! host patterns have been tried.
//!
//! # Concurrency
//!
//! Registration requires `&mut` access. A compiled [`Router`] or
//! [`HostRouter`] only needs `&self` to serve lookups, and can be shared
//! between threads behind an `Arc`.
#![deny(clippy::all)]
#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

mod error;
mod host;
mod params;
mod route;
mod router;
mod segment;
mod tree;

pub use error::{InsertError, MatchError};
pub use host::{HostPattern, HostRouter};
pub use params::{HostParams, Params, ParamsIter};
pub use route::{Route, RouteBuilder};
pub use router::{Found, Match, Router};
pub use segment::ParamType;
pub use tree::{Methods, Trie};
