//! A true byte-level radix tree for HTTP path routing.
//!
//! Unlike a segment-per-node trie, edges carry arbitrary-length literal
//! labels and are split at the longest common prefix on insertion, so
//! `/users/admin` and `/users/{id}` share a single `"/users/"` edge rather
//! than two separate `"users"` nodes. Four ordered child collections per
//! node (static, regex-param, plain-param, wildcard) encode the priority
//! order required on lookup; [`Node::resolve`] backtracks across them when
//! a higher-priority branch matches locally but fails deeper.

mod node;

use node::Node;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RouterError;
use crate::method::Method;
use crate::pattern;

/// Matches the teacher's stack-allocated parameter vector convention: most
/// real routes capture a handful of parameters, so inline storage avoids a
/// heap allocation on the hot lookup path.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Captured `(name, value)` pairs in match order. Lookup is first-match
/// (see DESIGN.md "Params first-match vs. last-match").
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// The outcome of resolving a path, independent of request method — method
/// matching (including `STUB` delegation) is the caller's responsibility so
/// the tree stays decoupled from any particular handler representation.
pub enum Resolution<'a, V> {
    Matched {
        endpoints: &'a HashMap<Method, V>,
        params: ParamVec,
    },
    NotFound,
}

/// A radix tree mapping `(method, pattern)` pairs to values of type `V`.
/// `V` is opaque to the tree; the mux layer stores its handler/subrouter
/// representation here.
pub struct Tree<V> {
    root: Node<V>,
}

impl<V> Default for Tree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Tree<V> {
    pub fn new() -> Self {
        Tree {
            root: Node::new_root(),
        }
    }

    /// Insert `value` at `(method, pattern)`. Re-inserting the same
    /// `(method, pattern)` overwrites the prior value.
    pub fn insert(&mut self, pattern: &str, method: Method, value: V) -> Result<(), RouterError> {
        let segments = pattern::parse(pattern)?;
        self.root.insert(&segments, 0, method, value);
        Ok(())
    }

    pub fn resolve(&self, path: &str) -> Resolution<'_, V> {
        let mut params = ParamVec::new();
        match self.root.resolve(path, &mut params) {
            Some(node) => Resolution::Matched {
                endpoints: &node.endpoints,
                params,
            },
            None => Resolution::NotFound,
        }
    }
}
