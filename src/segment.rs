//! Compilation of path templates into segment matchers.
//!
//! A template such as `/users/{id:uint}/files/{*}` is split on `/` and every
//! component becomes one [`Segment`]. Matching a segment never mutates it,
//! all progress lives in the caller's [`Params`].

use crate::error::InsertError;
use crate::params::Params;

use once_cell::sync::Lazy;
use regex::Regex;

use std::fmt;

// `{name}` or `{name:type}`.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{[a-zA-Z][a-zA-Z0-9_]*(?::[a-zA-Z][a-zA-Z0-9_]*)?\}")
        .expect("placeholder pattern is valid")
});

/// The type of a typed parameter, `{name:type}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// An optional leading `-` followed by ASCII digits.
    Int,
    /// ASCII digits.
    Uint,
    /// Hexadecimal digits.
    Id,
    /// A hyphenated 8-4-4-4-12 hexadecimal UUID.
    Uuid,
    /// A UUID with version nibble `4` and variant nibble `8`, `9`, `a` or `b`.
    UuidV4,
}

impl ParamType {
    /// Parses the name used in a template, e.g. `uint` in `{id:uint}`.
    pub fn from_name(name: &str) -> Option<ParamType> {
        match name {
            "int" => Some(ParamType::Int),
            "uint" => Some(ParamType::Uint),
            "id" => Some(ParamType::Id),
            "uuid" => Some(ParamType::Uuid),
            "uuidv4" => Some(ParamType::UuidV4),
            _ => None,
        }
    }

    /// The name used in templates.
    pub fn name(&self) -> &'static str {
        match self {
            ParamType::Int => "int",
            ParamType::Uint => "uint",
            ParamType::Id => "id",
            ParamType::Uuid => "uuid",
            ParamType::UuidV4 => "uuidv4",
        }
    }

    // The grammar of the type, as an unanchored regex fragment.
    fn grammar(&self) -> &'static str {
        match self {
            ParamType::Int => "-?[0-9]+",
            ParamType::Uint => "[0-9]+",
            ParamType::Id => "[0-9a-fA-F]+",
            ParamType::Uuid => {
                "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}"
            }
            ParamType::UuidV4 => {
                "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-4[0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}"
            }
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A component mixing literal text and placeholders, or a single typed
/// placeholder.
///
/// All placeholders of the component must match at once, which is why the
/// whole component compiles to one anchored regex.
#[derive(Clone, Debug)]
pub(crate) struct Pattern {
    regex: Regex,
    original: String,
    fields: Vec<String>,
}

impl Pattern {
    fn compile(component: &str) -> Result<Pattern, &'static str> {
        let mut source = String::from("^");
        let mut fields = Vec::new();
        let mut last = 0;

        for found in PLACEHOLDER.find_iter(component) {
            source.push_str(&regex::escape(&component[last..found.start()]));

            // strip the brackets
            let inner = &component[found.start() + 1..found.end() - 1];
            let (name, grammar) = match inner.split_once(':') {
                Some((name, ty)) => {
                    let ty = ParamType::from_name(ty).ok_or("unknown parameter type")?;
                    (name, ty.grammar())
                }
                None => (inner, ".+?"),
            };

            source.push('(');
            source.push_str(grammar);
            source.push(')');
            fields.push(name.to_owned());
            last = found.end();
        }

        source.push_str(&regex::escape(&component[last..]));
        source.push('$');

        let regex = Regex::new(&source).map_err(|_| "parameter pattern does not compile")?;

        Ok(Pattern {
            regex,
            original: component.to_owned(),
            fields,
        })
    }

    fn matches<'k, 'v>(&'k self, component: &'v str, params: &mut Params<'k, 'v>) -> bool {
        let captures = match self.regex.captures(component) {
            Some(captures) => captures,
            None => return false,
        };

        // every group is mandatory, so each one participates in a match
        for (field, value) in self.fields.iter().zip(captures.iter().skip(1)) {
            if let Some(value) = value {
                params.push(field, value.as_str());
            }
        }

        true
    }
}

/// One `/`-delimited component of a compiled path template.
#[derive(Clone, Debug)]
pub(crate) enum Segment {
    /// Matches the component exactly.
    Literal(String),
    /// `{name}`, matches any non-empty component.
    Capture(String),
    /// `{name:type}`, possibly surrounded by literal text or combined with
    /// other placeholders.
    Pattern(Pattern),
    /// `{*}`, matches the remainder of the path.
    CatchAll,
}

impl Segment {
    fn parse(component: &str) -> Result<Segment, &'static str> {
        if component == "{*}" {
            return Ok(Segment::CatchAll);
        }

        let stripped = PLACEHOLDER.replace_all(component, "");
        if !is_path_component(&stripped) {
            return Err("invalid URL path component");
        }

        if !component.contains('{') {
            return Ok(Segment::Literal(component.to_owned()));
        }

        let name = component
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .filter(|name| !name.contains(['{', '}', ':']));

        match name {
            Some(name) => Ok(Segment::Capture(name.to_owned())),
            None => Pattern::compile(component).map(Segment::Pattern),
        }
    }

    /// The canonical form deciding whether two segments share a trie node.
    ///
    /// Literals can never contain brackets, so they never collide with the
    /// signature of a parameter.
    pub(crate) fn signature(&self) -> &str {
        match self {
            Segment::Literal(literal) => literal,
            Segment::Capture(_) => "{}",
            Segment::Pattern(pattern) => pattern.regex.as_str(),
            Segment::CatchAll => "{*}",
        }
    }

    pub(crate) fn is_catch_all(&self) -> bool {
        matches!(self, Segment::CatchAll)
    }

    /// The number of parameters a match of this segment captures.
    pub(crate) fn param_count(&self) -> usize {
        match self {
            Segment::Literal(_) => 0,
            Segment::Capture(_) | Segment::CatchAll => 1,
            Segment::Pattern(pattern) => pattern.fields.len(),
        }
    }

    /// Matches a single path component, pushing any captured parameters.
    ///
    /// Parameters are only pushed if the whole component matches. A
    /// catch-all matches any component; capturing the rest of the path is up
    /// to the caller.
    pub(crate) fn matches<'k, 'v>(
        &'k self,
        component: &'v str,
        params: &mut Params<'k, 'v>,
    ) -> bool {
        match self {
            Segment::Literal(literal) => literal == component,
            Segment::Capture(name) => {
                if component.is_empty() {
                    return false;
                }

                params.push(name, component);
                true
            }
            Segment::Pattern(pattern) => pattern.matches(component, params),
            Segment::CatchAll => true,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(literal) => f.write_str(literal),
            Segment::Capture(name) => write!(f, "{{{}}}", name),
            Segment::Pattern(pattern) => f.write_str(&pattern.original),
            Segment::CatchAll => f.write_str("{*}"),
        }
    }
}

/// A compiled path template.
#[derive(Clone, Debug)]
pub(crate) struct Template {
    pub(crate) segments: Vec<Segment>,
    /// The number of parameters a match of the whole template captures.
    pub(crate) params: usize,
}

/// Compiles a path template.
pub(crate) fn parse(path: &str) -> Result<Template, InsertError> {
    let rest = path
        .strip_prefix('/')
        .ok_or_else(|| InsertError::invalid_path(path, "path must begin with '/'"))?;

    let last = rest.matches('/').count();
    let mut segments = Vec::with_capacity(last + 1);
    let mut params = 0;

    for (i, component) in rest.split('/').enumerate() {
        let segment =
            Segment::parse(component).map_err(|reason| InsertError::invalid_path(path, reason))?;

        if segment.is_catch_all() && i != last {
            return Err(InsertError::invalid_path(path, "catch-all must be last"));
        }

        params += segment.param_count();
        segments.push(segment);
    }

    Ok(Template { segments, params })
}

// Whether `component` could appear verbatim in an escaped URL path: unreserved
// characters, sub-delimiters, ':' and '@', or well-formed percent-escapes.
fn is_path_component(component: &str) -> bool {
    let bytes = component.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let escaped = bytes.get(i + 1..i + 3);
                if !matches!(escaped, Some(hex) if hex.iter().all(u8::is_ascii_hexdigit)) {
                    return false;
                }
                i += 3;
                continue;
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' => {}
            b'-' | b'.' | b'_' | b'~' => {}
            b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'=' => {}
            b':' | b'@' => {}
            _ => return false,
        }
        i += 1;
    }

    true
}
