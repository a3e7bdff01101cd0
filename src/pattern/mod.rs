//! Decomposes a route pattern string into a typed sequence of [`Segment`]s.
//!
//! Grammar (spec §6):
//! ```text
//! pattern    := '/' ( segment ( '/' segment )* )? '/'?
//! segment    := static | param | regexparam | wildcard
//! static     := BYTE+ (no '/', no '{', no '}', no '*')
//! param      := '{' NAME '}'
//! regexparam := '{' NAME ':' REGEX '}'
//! wildcard   := '*' | '{' NAME '*' '}'
//! ```
//!
//! A pattern is tokenized once, at registration time; the tree never
//! re-parses the pattern string on the request path.

use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{ErrorKind, RouterError};

/// One decomposed piece of a pattern.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Literal bytes, may span an arbitrary number of path characters
    /// including embedded `/` when two dynamic segments are adjacent only
    /// through intervening static text.
    Static(String),
    /// `{name}` — captures one path segment.
    Param(Arc<str>),
    /// `{name:regex}` — captures one path segment additionally constrained
    /// by `regex`.
    Regex(Arc<str>, Regex),
    /// `*` or `{name*}` — captures the remainder of the path.
    Wildcard(Arc<str>),
}

impl Segment {
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Segment::Static(_) => None,
            Segment::Param(n) | Segment::Wildcard(n) => Some(n),
            Segment::Regex(n, _) => Some(n),
        }
    }
}

/// Parse `pattern` into an ordered list of [`Segment`]s.
///
/// Errors (all registration-time, all mapped to panics by the caller):
/// `InvalidPattern` (empty, or missing leading `/`), `ParamDelimiter`
/// (unterminated `{`), `DuplicateParam`, `WildcardPosition`, `InvalidRegexp`.
pub fn parse(pattern: &str) -> Result<Vec<Segment>, RouterError> {
    if pattern.is_empty() || !pattern.starts_with('/') {
        return Err(RouterError::new(
            ErrorKind::InvalidPattern,
            format!("pattern must start with '/': {pattern:?}"),
        ));
    }

    let mut segments = Vec::new();
    let mut seen_names: HashSet<String> = HashSet::new();
    let bytes = pattern.as_bytes();
    let mut i = 0usize;
    let mut literal = String::new();

    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                if !literal.is_empty() {
                    segments.push(Segment::Static(std::mem::take(&mut literal)));
                }
                let close = find_matching_brace(bytes, i).ok_or_else(|| {
                    RouterError::new(
                        ErrorKind::ParamDelimiter,
                        format!("unmatched '{{' in pattern {pattern:?}"),
                    )
                })?;
                let inner = &pattern[i + 1..close];
                if let Some(rest) = inner.strip_suffix('*') {
                    let name: Arc<str> = Arc::from(rest);
                    register_name(&mut seen_names, &name, pattern)?;
                    segments.push(Segment::Wildcard(name));
                    i = close + 1;
                    if i != bytes.len() {
                        return Err(RouterError::new(
                            ErrorKind::WildcardPosition,
                            format!("wildcard must be the final segment in {pattern:?}"),
                        ));
                    }
                    continue;
                } else if let Some((name, regex_src)) = inner.split_once(':') {
                    let name: Arc<str> = Arc::from(name);
                    register_name(&mut seen_names, &name, pattern)?;
                    let anchored = format!("^(?:{regex_src})$");
                    let compiled = Regex::new(&anchored).map_err(|e| {
                        RouterError::new(
                            ErrorKind::InvalidRegexp,
                            format!("invalid regex {regex_src:?} in {pattern:?}: {e}"),
                        )
                    })?;
                    segments.push(Segment::Regex(name, compiled));
                } else {
                    let name: Arc<str> = Arc::from(inner);
                    register_name(&mut seen_names, &name, pattern)?;
                    segments.push(Segment::Param(name));
                }
                i = close + 1;
            }
            b'*' => {
                if !literal.is_empty() {
                    segments.push(Segment::Static(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Wildcard(Arc::from("*")));
                i += 1;
                if i != bytes.len() {
                    return Err(RouterError::new(
                        ErrorKind::WildcardPosition,
                        format!("wildcard must be the final segment in {pattern:?}"),
                    ));
                }
            }
            b'}' => {
                return Err(RouterError::new(
                    ErrorKind::ParamDelimiter,
                    format!("unmatched '}}' in pattern {pattern:?}"),
                ));
            }
            b => {
                literal.push(b as char);
                i += 1;
            }
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Static(literal));
    }
    Ok(segments)
}

/// Finds the `}` matching the `{` at `bytes[open]`, counting nested braces so
/// a regex quantifier like `{2,4}` inside `{id:[0-9]{2,4}}` doesn't get
/// mistaken for the constraint's own closing brace.
fn find_matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn register_name(
    seen: &mut HashSet<String>,
    name: &Arc<str>,
    pattern: &str,
) -> Result<(), RouterError> {
    if !seen.insert(name.to_string()) {
        return Err(RouterError::new(
            ErrorKind::DuplicateParam,
            format!("duplicate parameter {name:?} in pattern {pattern:?}"),
        ));
    }
    Ok(())
}
