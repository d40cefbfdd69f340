use crate::error::InsertError;
use crate::params::Params;
use crate::route::Route;
use crate::segment::{self, Segment};

use http::Method;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The routes registered at a trie node, by method.
pub type Methods<T> = HashMap<Method, Arc<Route<T>>>;

/// A trie of compiled path templates.
///
/// Every level of the trie corresponds to one `/`-delimited path component.
/// Children are kept in insertion order, and a lookup takes the *first*
/// child that matches a component. There is no implicit precedence of
/// literals over parameters and no backtracking: if a more specific template
/// overlaps with a more general one, register the specific one first.
///
/// ```rust
/// use hostmux::{Route, Trie};
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut trie = Trie::new();
/// let route = Route::builder().path("/users/{id:uint}").methods(["GET"]).handler(()).build()?;
/// trie.insert(Arc::new(route))?;
///
/// let (methods, matched_path, params) = trie.at("/users/42").unwrap();
/// assert!(methods.contains_key(&http::Method::GET));
/// assert_eq!(matched_path, "/users/42");
/// assert_eq!(params.get("id"), Some("42"));
///
/// assert!(trie.at("/users/me").is_none());
/// # Ok(())
/// # }
/// ```
pub struct Trie<T> {
    children: Vec<Node<T>>,
    depth: usize,
    max_params: usize,
}

// A single node in the trie, created for one segment of a template.
struct Node<T> {
    segment: Segment,
    methods: Methods<T>,
    children: Vec<Node<T>>,
}

impl<T> Node<T> {
    fn new(segment: Segment) -> Self {
        Node {
            segment,
            methods: HashMap::new(),
            children: Vec::new(),
        }
    }
}

impl<T> Default for Trie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Trie<T> {
    /// Creates an empty trie.
    pub fn new() -> Self {
        Trie {
            children: Vec::new(),
            depth: 0,
            max_params: 0,
        }
    }

    /// The number of segments of the longest template inserted.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The largest number of parameters a single match can capture.
    pub fn max_params(&self) -> usize {
        self.max_params
    }

    /// Inserts a route under its path template.
    ///
    /// The insertion is rejected if it would place a sibling next to a
    /// catch-all, or if one of the route's methods is already handled by
    /// the same template. A rejected insertion leaves the trie untouched.
    pub fn insert(&mut self, route: Arc<Route<T>>) -> Result<(), InsertError> {
        let template = segment::parse(route.path())?;

        if route.methods().is_empty() {
            return Err(InsertError::MissingMethods);
        }

        self.check(&template.segments, &route)?;

        let depth = template.segments.len();
        let mut children = &mut self.children;

        for (i, segment) in template.segments.into_iter().enumerate() {
            let index = match children
                .iter()
                .position(|child| child.segment.signature() == segment.signature())
            {
                Some(index) => index,
                None => {
                    children.push(Node::new(segment));
                    children.len() - 1
                }
            };

            let node = &mut children[index];

            if i + 1 == depth {
                for method in route.methods() {
                    node.methods.insert(method.clone(), route.clone());
                }
                break;
            }

            children = &mut node.children;
        }

        self.depth = self.depth.max(depth);
        self.max_params = self.max_params.max(template.params);

        Ok(())
    }

    // Validates an insertion against the existing nodes without modifying
    // the trie.
    fn check(&self, segments: &[Segment], route: &Route<T>) -> Result<(), InsertError> {
        let mut siblings = &self.children;
        let mut terminal = None;

        for segment in segments {
            let existing = siblings
                .iter()
                .find(|child| child.segment.signature() == segment.signature());

            match existing {
                Some(node) => {
                    siblings = &node.children;
                    terminal = Some(node);
                }
                None => {
                    if siblings.iter().any(|child| child.segment.is_catch_all()) {
                        return Err(InsertError::conflict(
                            route.path(),
                            "a catch-all at the same level hides the route",
                        ));
                    }

                    if segment.is_catch_all() && !siblings.is_empty() {
                        return Err(InsertError::conflict(
                            route.path(),
                            "the catch-all overlaps existing routes",
                        ));
                    }

                    // everything below this point is new
                    return Ok(());
                }
            }
        }

        if let Some(node) = terminal {
            if route.methods().iter().any(|m| node.methods.contains_key(m)) {
                return Err(InsertError::conflict(
                    route.path(),
                    "a method is already handled by the same template",
                ));
            }
        }

        Ok(())
    }

    /// Resolves a path, returning the routes registered for it by method,
    /// the matched path and the captured parameters.
    pub fn at<'t, 'p>(
        &'t self,
        path: &'p str,
    ) -> Option<(&'t Methods<T>, &'p str, Params<'t, 'p>)> {
        let mut params = Params::with_capacity(self.max_params);
        let (methods, matched_path) = self.lookup(path, &mut params)?;
        Some((methods, matched_path, params))
    }

    /// Resolves a path, pushing captured parameters into `params`.
    ///
    /// On success, returns the routes registered for the path by method and
    /// the matched path. The matched path is the whole `path`, unless a
    /// catch-all consumed a suffix, in which case it is the prefix before the
    /// catch-all. The catch-all itself is captured under the key `*`.
    ///
    /// If the lookup fails, `params` may hold parameters captured along the
    /// way; callers reusing the buffer should truncate it.
    pub fn lookup<'t, 'p>(
        &'t self,
        path: &'p str,
        params: &mut Params<'t, 'p>,
    ) -> Option<(&'t Methods<T>, &'p str)> {
        let (mut rest, mut offset): (&str, usize) = match path.strip_prefix('/') {
            Some(rest) => (rest, 1),
            None => (path, 0),
        };

        let mut children = &self.children;

        loop {
            let (component, next) = match rest.find('/') {
                Some(i) => (&rest[..i], Some(i)),
                None => (rest, None),
            };

            let mut matched = None;

            for child in children {
                if child.segment.is_catch_all() {
                    params.push("*", rest);
                    let matched_path = &path[..offset.saturating_sub(1)];
                    return (!child.methods.is_empty()).then_some((&child.methods, matched_path));
                }

                if child.segment.matches(component, params) {
                    matched = Some(child);
                    break;
                }
            }

            let node = matched?;

            match next {
                None => return (!node.methods.is_empty()).then_some((&node.methods, path)),
                Some(i) => {
                    rest = &rest[i + 1..];
                    offset += i + 1;
                    children = &node.children;
                }
            }
        }
    }

    /// Returns the routes of every template that could serve `path`,
    /// ignoring the first-match precedence of [`lookup`](Trie::lookup).
    ///
    /// This is useful to find templates shadowed by earlier registrations.
    pub fn at_all(&self, path: &str) -> Vec<&Methods<T>> {
        let path = path.strip_prefix('/').unwrap_or(path);
        let mut found = Vec::new();
        collect(&self.children, path, &mut found);
        found
    }

    /// Tests helper that ensures the trie invariants hold.
    #[cfg(feature = "__test_helpers")]
    pub fn check_invariants(&self) -> Result<(), String> {
        fn check<T>(children: &[Node<T>], prefix: &str) -> Result<(), String> {
            let catch_alls = children.iter().filter(|c| c.segment.is_catch_all()).count();
            if catch_alls > 0 && children.len() > 1 {
                return Err(format!("catch-all with siblings under '{}'", prefix));
            }

            for child in children {
                let path = format!("{}/{}", prefix, child.segment);
                if child.segment.is_catch_all() && !child.children.is_empty() {
                    return Err(format!("catch-all with children at '{}'", path));
                }
                if child.children.is_empty() && child.methods.is_empty() {
                    return Err(format!("dangling node at '{}'", path));
                }
                check(&child.children, &path)?;
            }

            Ok(())
        }

        check(&self.children, "")
    }
}

fn collect<'t, T>(children: &'t [Node<T>], path: &str, found: &mut Vec<&'t Methods<T>>) {
    let (component, rest) = match path.split_once('/') {
        Some((component, rest)) => (component, Some(rest)),
        None => (path, None),
    };

    for child in children {
        if child.segment.is_catch_all() {
            if !child.methods.is_empty() {
                found.push(&child.methods);
            }
            continue;
        }

        let mut scratch = Params::new();
        if !child.segment.matches(component, &mut scratch) {
            continue;
        }

        match rest {
            None if !child.methods.is_empty() => found.push(&child.methods),
            None => {}
            Some(rest) => collect(&child.children, rest, found),
        }
    }
}

impl<T> fmt::Display for Trie<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn print<T>(
            node: &Node<T>,
            prefix: &str,
            last: bool,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            let (branch, indent) = if last { ("└ /", "   ") } else { ("├ /", "|  ") };
            write!(f, "{}{}{}", prefix, branch, node.segment)?;
            if !node.methods.is_empty() {
                write!(f, " (handler)")?;
            }
            writeln!(f)?;

            let prefix = format!("{}{}", prefix, indent);
            for (i, child) in node.children.iter().enumerate() {
                print(child, &prefix, i + 1 == node.children.len(), f)?;
            }
            Ok(())
        }

        writeln!(f, "trie")?;
        for (i, child) in self.children.iter().enumerate() {
            print(child, "", i + 1 == self.children.len(), f)?;
        }
        Ok(())
    }
}

impl<T> fmt::Debug for Trie<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
