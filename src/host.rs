//! Host pattern matching.
//!
//! Host patterns are `.`-separated sequences of DNS labels, where leading
//! labels may be the wildcard `*`: `api.example.com`, `*.example.com` or
//! `*.*.example.com`. A wildcard matches exactly one label, so
//! `*.example.com` matches `api.example.com` but not `example.com` or
//! `eu.api.example.com`.

use crate::error::{InsertError, MatchError};
use crate::params::{HostParams, Params};
use crate::route::Route;
use crate::router::Match;
use crate::tree::{Methods, Trie};

use once_cell::sync::Lazy;
use regex::Regex;

use std::fmt;
use std::sync::Arc;

static DNS_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])$")
        .expect("DNS label pattern is valid")
});

#[derive(Clone, Debug, PartialEq, Eq)]
enum Label {
    Literal(String),
    Wildcard,
}

/// A compiled host pattern.
///
/// ```rust
/// use hostmux::{HostParams, HostPattern};
///
/// let pattern = HostPattern::new("*.example.com").unwrap();
///
/// let mut params = HostParams::default();
/// assert!(pattern.matches("api.example.com", &mut params));
/// assert_eq!(params.get(0), Some("api"));
///
/// assert!(!pattern.matches("example.com", &mut params));
/// assert!(pattern.intersects(&HostPattern::new("*.*.com").unwrap()));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostPattern {
    pattern: String,
    labels: Vec<Label>,
    wildcards: usize,
}

impl HostPattern {
    /// Compiles a host pattern.
    ///
    /// Every label must be a DNS label of 1 to 63 letters, digits and
    /// hyphens, not starting or ending with a hyphen, or the wildcard `*`.
    /// Wildcards may only appear before the first literal label.
    pub fn new(pattern: impl Into<String>) -> Result<HostPattern, InsertError> {
        let pattern = pattern.into();
        let mut labels = Vec::new();
        let mut wildcards = 0;
        let mut literal_seen = false;

        for label in pattern.split('.') {
            if label == "*" {
                if literal_seen {
                    return Err(InsertError::InvalidHostPattern { host: pattern });
                }

                wildcards += 1;
                labels.push(Label::Wildcard);
                continue;
            }

            if !DNS_LABEL.is_match(label) {
                return Err(InsertError::InvalidHostPattern { host: pattern });
            }

            literal_seen = true;
            labels.push(Label::Literal(label.to_owned()));
        }

        Ok(HostPattern {
            pattern,
            labels,
            wildcards,
        })
    }

    /// The pattern as it was registered.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// The number of wildcard labels.
    pub fn wildcards(&self) -> usize {
        self.wildcards
    }

    /// Returns `true` if some hostname could be matched by both patterns.
    ///
    /// Two patterns intersect if they have the same number of labels and,
    /// at every position, the labels are equal or either is a wildcard.
    pub fn intersects(&self, other: &HostPattern) -> bool {
        self.labels.len() == other.labels.len()
            && self
                .labels
                .iter()
                .zip(&other.labels)
                .all(|pair| match pair {
                    (Label::Wildcard, _) | (_, Label::Wildcard) => true,
                    (Label::Literal(a), Label::Literal(b)) => a == b,
                })
    }

    /// Matches a request host against the pattern, pushing the labels
    /// matched by wildcards into `params` from left to right.
    ///
    /// The host must have exactly as many labels as the pattern. Literal
    /// labels are compared case-sensitively, against the casing used at
    /// registration. Nothing is pushed unless the whole host matches.
    pub fn matches<'v>(&self, host: &'v str, params: &mut HostParams<'v>) -> bool {
        let start = params.len();
        let mut parts = host.split('.');

        for label in &self.labels {
            let part = match parts.next() {
                Some(part) => part,
                None => {
                    params.truncate(start);
                    return false;
                }
            };

            match label {
                Label::Wildcard => params.push(part),
                Label::Literal(literal) if literal == part => {}
                Label::Literal(_) => {
                    params.truncate(start);
                    return false;
                }
            }
        }

        if parts.next().is_some() {
            params.truncate(start);
            return false;
        }

        true
    }
}

impl fmt::Display for HostPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// Routes requests by host, then by path.
///
/// Every registered host pattern owns a [`Trie`]. Routes with an empty host
/// go to a fallback trie that serves any host, and which is searched last.
///
/// Host patterns may not intersect, so at most one pattern claims any
/// concrete hostname.
pub struct HostRouter<T> {
    hosts: Vec<(HostPattern, Trie<T>)>,
    fallback: Trie<T>,
    max_params: usize,
    max_wildcards: usize,
}

impl<T> Default for HostRouter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HostRouter<T> {
    /// Creates an empty router.
    pub fn new() -> Self {
        HostRouter {
            hosts: Vec::new(),
            fallback: Trie::new(),
            max_params: 0,
            max_wildcards: 0,
        }
    }

    /// Registers a host pattern.
    ///
    /// The empty pattern always exists as the fallback, registering it is a
    /// no-op.
    pub fn add_hostname(&mut self, pattern: &str) -> Result<(), InsertError> {
        if pattern.is_empty() {
            return Ok(());
        }

        let pattern = HostPattern::new(pattern)?;

        if let Some((existing, _)) = self.hosts.iter().find(|(h, _)| h.intersects(&pattern)) {
            return Err(InsertError::ConflictingHostRegistration {
                host: pattern.pattern,
                with: existing.pattern.clone(),
            });
        }

        debug!("registered host pattern '{}'", pattern);
        self.max_wildcards = self.max_wildcards.max(pattern.wildcards);
        self.hosts.push((pattern, Trie::new()));
        Ok(())
    }

    /// Registers a route under the trie of its host pattern.
    ///
    /// The host pattern must have been registered with
    /// [`add_hostname`](HostRouter::add_hostname) beforehand, using exactly
    /// the same string.
    pub fn add_route(&mut self, route: Arc<Route<T>>) -> Result<(), InsertError> {
        let trie = if route.host().is_empty() {
            &mut self.fallback
        } else {
            match self.hosts.iter_mut().find(|(h, _)| h.pattern == route.host()) {
                Some((_, trie)) => trie,
                None => {
                    return Err(InsertError::HostNotRegistered {
                        host: route.host().to_owned(),
                    })
                }
            }
        };

        let name = route.name().to_owned();
        trie.insert(route)?;
        self.max_params = self.max_params.max(trie.max_params());

        debug!("registered route {}", name);
        Ok(())
    }

    /// The registered host patterns, in registration order.
    pub fn hostnames(&self) -> impl Iterator<Item = &HostPattern> {
        self.hosts.iter().map(|(h, _)| h)
    }

    /// The trie holding the routes of a registered host pattern, or of the
    /// fallback for the empty pattern.
    pub fn trie(&self, pattern: &str) -> Option<&Trie<T>> {
        if pattern.is_empty() {
            return Some(&self.fallback);
        }

        self.hosts
            .iter()
            .find(|(h, _)| h.pattern == pattern)
            .map(|(_, trie)| trie)
    }

    /// Resolves a host and path.
    ///
    /// Host patterns are tried in registration order. A pattern that matches
    /// the host but has no route for the path does not end the search, the
    /// next matching pattern is tried, and finally the fallback trie.
    pub fn at<'r, 'p>(
        &'r self,
        host: &'p str,
        path: &'p str,
    ) -> Result<Match<'r, 'p, T>, MatchError> {
        let mut params = Params::with_capacity(self.max_params);
        let mut host_params = HostParams::with_capacity(self.max_wildcards);

        match self.lookup(host, path, &mut params, &mut host_params) {
            Some((methods, matched_path)) => Ok(Match {
                methods,
                matched_path,
                params,
                host_params,
            }),
            None => {
                trace!("no route for host '{}' and path '{}'", host, path);
                Err(MatchError::NotFound)
            }
        }
    }

    /// Resolves a host and path into caller-provided buffers.
    ///
    /// Parameters captured by attempts that did not lead to a match are
    /// truncated away, so on failure both buffers are left as they were.
    pub fn lookup<'r, 'p>(
        &'r self,
        host: &'p str,
        path: &'p str,
        params: &mut Params<'r, 'p>,
        host_params: &mut HostParams<'p>,
    ) -> Option<(&'r Methods<T>, &'p str)> {
        let (params_len, host_params_len) = (params.len(), host_params.len());

        for (pattern, trie) in &self.hosts {
            if !pattern.matches(host, host_params) {
                continue;
            }

            if let Some(found) = trie.lookup(path, params) {
                return Some(found);
            }

            params.truncate(params_len);
            host_params.truncate(host_params_len);
        }

        let found = self.fallback.lookup(path, params);
        if found.is_none() {
            params.truncate(params_len);
        }
        found
    }
}

impl<T> fmt::Debug for HostRouter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pattern, trie) in &self.hosts {
            writeln!(f, "host {}", pattern)?;
            write!(f, "{}", trie)?;
        }
        writeln!(f, "any host")?;
        write!(f, "{}", self.fallback)
    }
}
