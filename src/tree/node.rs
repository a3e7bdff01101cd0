use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::method::Method;
use crate::pattern::Segment;

/// Which of the four ordered child collections a dynamic segment belongs to.
#[derive(Clone, Copy)]
pub(crate) enum DynKind {
    Param,
    Regex,
    Wildcard,
}

/// One node of the radix tree. `prefix` is the edge label shared by every
/// route beneath it (empty for param/regex/wildcard nodes, which consume a
/// path segment rather than a fixed byte label).
pub(crate) struct Node<V> {
    pub(crate) prefix: String,
    pub(crate) param_name: Option<Arc<str>>,
    pub(crate) regex: Option<Regex>,
    pub(crate) endpoints: HashMap<Method, V>,
    pub(crate) static_children: Vec<Node<V>>,
    pub(crate) regex_children: Vec<Node<V>>,
    pub(crate) param_children: Vec<Node<V>>,
    pub(crate) wildcard_children: Vec<Node<V>>,
}

impl<V> Node<V> {
    pub(crate) fn new_root() -> Self {
        Self::new_static(String::new())
    }

    fn new_static(prefix: String) -> Self {
        Node {
            prefix,
            param_name: None,
            regex: None,
            endpoints: HashMap::new(),
            static_children: Vec::new(),
            regex_children: Vec::new(),
            param_children: Vec::new(),
            wildcard_children: Vec::new(),
        }
    }

    fn new_dynamic(name: Arc<str>, regex: Option<Regex>) -> Self {
        Node {
            prefix: String::new(),
            param_name: Some(name),
            regex,
            endpoints: HashMap::new(),
            static_children: Vec::new(),
            regex_children: Vec::new(),
            param_children: Vec::new(),
            wildcard_children: Vec::new(),
        }
    }

    /// Insert the remaining `segments[idx..]`, terminating in an endpoint for
    /// `method`. Splits static edges as needed so every edge label remains a
    /// longest common prefix across its siblings.
    pub(crate) fn insert(&mut self, segments: &[Segment], idx: usize, method: Method, value: V) {
        if idx == segments.len() {
            self.endpoints.insert(method, value);
            return;
        }
        match &segments[idx] {
            Segment::Static(lit) => self.insert_static(lit, segments, idx, method, value),
            Segment::Param(name) => {
                self.insert_dynamic(DynKind::Param, name.clone(), None, segments, idx, method, value)
            }
            Segment::Regex(name, re) => self.insert_dynamic(
                DynKind::Regex,
                name.clone(),
                Some(re.clone()),
                segments,
                idx,
                method,
                value,
            ),
            Segment::Wildcard(name) => self.insert_dynamic(
                DynKind::Wildcard,
                name.clone(),
                None,
                segments,
                idx,
                method,
                value,
            ),
        }
    }

    fn insert_static(&mut self, lit: &str, segments: &[Segment], idx: usize, method: Method, value: V) {
        if lit.is_empty() {
            return self.insert(segments, idx + 1, method, value);
        }
        let first = lit.as_bytes()[0];
        if let Some(pos) = self
            .static_children
            .iter()
            .position(|c| c.prefix.as_bytes().first() == Some(&first))
        {
            let lcp = common_prefix_len(&self.static_children[pos].prefix, lit);
            if lcp < self.static_children[pos].prefix.len() {
                self.split_static_child(pos, lcp);
            }
            let child = &mut self.static_children[pos];
            if lcp < lit.len() {
                child.insert_static(&lit[lcp..], segments, idx, method, value);
            } else {
                child.insert(segments, idx + 1, method, value);
            }
        } else {
            let mut new_child = Node::new_static(lit.to_string());
            new_child.insert(segments, idx + 1, method, value);
            self.static_children.push(new_child);
        }
    }

    fn split_static_child(&mut self, pos: usize, lcp: usize) {
        let placeholder = Node::new_static(String::new());
        let mut old = std::mem::replace(&mut self.static_children[pos], placeholder);
        let head = old.prefix[..lcp].to_string();
        old.prefix = old.prefix[lcp..].to_string();
        let mut intermediate = Node::new_static(head);
        intermediate.static_children.push(old);
        self.static_children[pos] = intermediate;
    }

    #[allow(clippy::too_many_arguments)]
    fn insert_dynamic(
        &mut self,
        kind: DynKind,
        name: Arc<str>,
        regex: Option<Regex>,
        segments: &[Segment],
        idx: usize,
        method: Method,
        value: V,
    ) {
        let children = match kind {
            DynKind::Param => &mut self.param_children,
            DynKind::Regex => &mut self.regex_children,
            DynKind::Wildcard => &mut self.wildcard_children,
        };
        let existing = children.iter_mut().position(|c| {
            c.param_name.as_deref() == Some(&*name)
                && c.regex.as_ref().map(|r| r.as_str()) == regex.as_ref().map(|r| r.as_str())
        });
        if let Some(pos) = existing {
            children[pos].insert(segments, idx + 1, method, value);
        } else {
            let mut new_child = Node::new_dynamic(name, regex);
            new_child.insert(segments, idx + 1, method, value);
            children.push(new_child);
        }
    }

    /// Resolve `path` against this subtree, in strict priority order:
    /// static, regex-param, plain param, wildcard. Backtracks via recursion:
    /// a branch that matches locally but yields no endpoint deeper returns
    /// `None`, and the caller tries the next sibling/kind.
    pub(crate) fn resolve<'a>(
        &'a self,
        path: &'a str,
        params: &mut super::ParamVec,
    ) -> Option<&'a Node<V>> {
        if path.is_empty() {
            return if self.endpoints.is_empty() {
                None
            } else {
                Some(self)
            };
        }

        for child in &self.static_children {
            if let Some(rest) = path.strip_prefix(child.prefix.as_str()) {
                let saved = params.len();
                if let Some(found) = child.resolve(rest, params) {
                    return Some(found);
                }
                params.truncate(saved);
            }
        }

        if let Some((seg, rest)) = take_segment(path) {
            for child in &self.regex_children {
                let matches = child.regex.as_ref().map(|re| re.is_match(seg)).unwrap_or(false);
                if !matches {
                    continue;
                }
                let saved = params.len();
                if let Some(name) = &child.param_name {
                    params.push((name.clone(), seg.to_string()));
                }
                if let Some(found) = child.resolve(rest, params) {
                    return Some(found);
                }
                params.truncate(saved);
            }

            for child in &self.param_children {
                let saved = params.len();
                if let Some(name) = &child.param_name {
                    params.push((name.clone(), seg.to_string()));
                }
                if let Some(found) = child.resolve(rest, params) {
                    return Some(found);
                }
                params.truncate(saved);
            }
        }

        for child in &self.wildcard_children {
            let saved = params.len();
            if let Some(name) = &child.param_name {
                params.push((name.clone(), path.to_string()));
            }
            if let Some(found) = child.resolve("", params) {
                return Some(found);
            }
            params.truncate(saved);
        }

        None
    }
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    let max = a.len().min(b.len());
    let mut i = 0;
    while i < max && a.as_bytes()[i] == b.as_bytes()[i] {
        i += 1;
    }
    while i > 0 && (!a.is_char_boundary(i) || !b.is_char_boundary(i)) {
        i -= 1;
    }
    i
}

/// Split `path` at the next `/`, keeping the slash with the remainder so a
/// following static segment can still match it literally.
fn take_segment(path: &str) -> Option<(&str, &str)> {
    if path.is_empty() {
        return None;
    }
    match path.find('/') {
        Some(i) => Some((&path[..i], &path[i..])),
        None => Some((path, "")),
    }
}
