use std::{fmt, iter, mem, slice};

/// A single URL parameter, consisting of a key and a value.
#[derive(PartialEq, Eq, Ord, PartialOrd, Default, Copy, Clone)]
struct Param<'k, 'v> {
    // Keys are borrowed from the compiled route, values from the request path.
    key: &'k str,
    value: &'v str,
}

impl<'k, 'v> Param<'k, 'v> {
    const EMPTY: Param<'static, 'static> = Param { key: "", value: "" };
}

/// A list of path parameters returned by a route match, in the order they
/// were discovered in the path.
///
/// The catch-all segment `{*}` is reported under the key `*`.
///
/// ```rust
/// # use http::Method;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let mut router = hostmux::Router::new();
/// # router.insert("", "/users/{id}", [Method::GET], true)?;
/// # router.compile()?;
/// let matched = router.at("example.com", "/users/1")?;
///
/// // Iterate through the keys and values.
/// for (key, value) in matched.params.iter() {
///     println!("key: {}, value: {}", key, value);
/// }
///
/// // Get a specific value by name.
/// let id = matched.params.get("id");
/// assert_eq!(id, Some("1"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Params<'k, 'v> {
    kind: ParamsKind<'k, 'v>,
}

// Most routes have a small number of dynamic parameters, so we can avoid
// heap allocations in the common case.
const SMALL: usize = 3;

// A list of parameters, optimized to avoid allocations when possible.
#[derive(Clone)]
enum ParamsKind<'k, 'v> {
    Small([Param<'k, 'v>; SMALL], usize),
    Large(Vec<Param<'k, 'v>>),
}

impl<'k, 'v> Params<'k, 'v> {
    /// Creates an empty parameter list.
    pub fn new() -> Self {
        Self {
            kind: ParamsKind::Small([Param::EMPTY; SMALL], 0),
        }
    }

    /// Creates an empty parameter list that can hold `capacity` parameters
    /// without reallocating.
    ///
    /// Lookups size their buffer with the maximum parameter count of the trie
    /// being searched, see [`Trie::max_params`](crate::Trie::max_params).
    pub fn with_capacity(capacity: usize) -> Self {
        if capacity <= SMALL {
            return Self::new();
        }

        Self {
            kind: ParamsKind::Large(Vec::with_capacity(capacity)),
        }
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        match self.kind {
            ParamsKind::Small(_, len) => len,
            ParamsKind::Large(ref vec) => vec.len(),
        }
    }

    // Truncates the parameter list to the given length.
    pub(crate) fn truncate(&mut self, n: usize) {
        match &mut self.kind {
            ParamsKind::Small(_, len) => *len = (*len).min(n),
            ParamsKind::Large(vec) => vec.truncate(n),
        }
    }

    /// Removes all parameters, keeping any allocated capacity so the list
    /// can be reused for another lookup.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Returns the value of the first parameter registered under the given key.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&'v str> {
        let key = key.as_ref();

        match &self.kind {
            ParamsKind::Small(arr, len) => arr
                .iter()
                .take(*len)
                .find(|param| param.key == key)
                .map(|param| param.value),
            ParamsKind::Large(vec) => vec
                .iter()
                .find(|param| param.key == key)
                .map(|param| param.value),
        }
    }

    /// Returns an iterator over the parameters in the list.
    pub fn iter(&self) -> ParamsIter<'_, 'k, 'v> {
        ParamsIter::new(self)
    }

    /// Returns `true` if there are no parameters in the list.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts a key value parameter pair into the list.
    pub(crate) fn push(&mut self, key: &'k str, value: &'v str) {
        #[cold]
        fn drain_to_vec<T: Default>(len: usize, elem: T, arr: &mut [T; SMALL]) -> Vec<T> {
            let mut vec = Vec::with_capacity(len + 1);
            vec.extend(arr.iter_mut().map(mem::take));
            vec.push(elem);
            vec
        }

        let param = Param { key, value };
        match &mut self.kind {
            ParamsKind::Small(arr, len) => {
                if *len == SMALL {
                    self.kind = ParamsKind::Large(drain_to_vec(*len, param, arr));
                    return;
                }

                arr[*len] = param;
                *len += 1;
            }
            ParamsKind::Large(vec) => vec.push(param),
        }
    }
}

impl Default for Params<'_, '_> {
    fn default() -> Self {
        Self::new()
    }
}

// Only the parameters in use are compared, never the storage.
impl PartialEq for Params<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for Params<'_, '_> {}

impl fmt::Debug for Params<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// An iterator over the keys and values of a route's [parameters](crate::Params).
pub struct ParamsIter<'ps, 'k, 'v> {
    kind: ParamsIterKind<'ps, 'k, 'v>,
}

impl<'ps, 'k, 'v> ParamsIter<'ps, 'k, 'v> {
    fn new(params: &'ps Params<'k, 'v>) -> Self {
        let kind = match &params.kind {
            ParamsKind::Small(arr, len) => ParamsIterKind::Small(arr.iter().take(*len)),
            ParamsKind::Large(vec) => ParamsIterKind::Large(vec.iter()),
        };
        Self { kind }
    }
}

enum ParamsIterKind<'ps, 'k, 'v> {
    Small(iter::Take<slice::Iter<'ps, Param<'k, 'v>>>),
    Large(slice::Iter<'ps, Param<'k, 'v>>),
}

impl<'ps, 'k, 'v> Iterator for ParamsIter<'ps, 'k, 'v> {
    type Item = (&'k str, &'v str);

    fn next(&mut self) -> Option<Self::Item> {
        match self.kind {
            ParamsIterKind::Small(ref mut iter) => iter.next().map(|p| (p.key, p.value)),
            ParamsIterKind::Large(ref mut iter) => iter.next().map(|p| (p.key, p.value)),
        }
    }
}

impl ExactSizeIterator for ParamsIter<'_, '_, '_> {
    fn len(&self) -> usize {
        match self.kind {
            ParamsIterKind::Small(ref iter) => iter.len(),
            ParamsIterKind::Large(ref iter) => iter.len(),
        }
    }
}

/// The labels of a request host captured by the `*` wildcards of the host
/// pattern that matched it, from left to right.
///
/// ```rust
/// # use http::Method;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut router = hostmux::Router::new();
/// router.add_hostname("*.*.example.com")?;
/// router.insert("*.*.example.com", "/", [Method::GET], ())?;
/// router.compile()?;
///
/// let matched = router.at("eu.api.example.com", "/")?;
/// assert_eq!(matched.host_params.get(0), Some("eu"));
/// assert_eq!(matched.host_params.get(1), Some("api"));
/// # Ok(())
/// # }
/// ```
#[derive(PartialEq, Eq, Clone, Default, Debug)]
pub struct HostParams<'v> {
    labels: Vec<&'v str>,
}

impl<'v> HostParams<'v> {
    /// Creates an empty list that can hold `capacity` labels without
    /// reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            labels: Vec::with_capacity(capacity),
        }
    }

    /// Returns the label captured by the `index`th wildcard.
    pub fn get(&self, index: usize) -> Option<&'v str> {
        self.labels.get(index).copied()
    }

    /// Returns the number of captured labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if no labels were captured.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns an iterator over the captured labels.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &'v str> + '_ {
        self.labels.iter().copied()
    }

    /// Removes all labels, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.labels.clear();
    }

    pub(crate) fn push(&mut self, label: &'v str) {
        self.labels.push(label);
    }

    pub(crate) fn truncate(&mut self, n: usize) {
        self.labels.truncate(n);
    }
}
