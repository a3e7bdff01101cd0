//! Inline groups and subrouter mounting (spec §4.7).

use std::sync::Arc;

use crate::context::Context;
use crate::method::Method;
use crate::middleware::Middleware;

use super::{Mux, RouteEndpoint};

impl<C: Context + 'static> Mux<C> {
    /// Returns a new inline mux sharing this mux's tree. Routes registered
    /// on the returned handle land in the same tree as `self`'s; the
    /// returned handle's middleware chain is `self`'s ancestors plus a
    /// snapshot of `self`'s own current middleware, plus `middleware`
    /// (DESIGN.md Open Question 2: snapshot at registration time, not
    /// dispatch time).
    pub fn with(&self, middleware: impl IntoIterator<Item = Middleware<C>>) -> Mux<C> {
        let mut ancestors = self.ancestors.clone();
        ancestors.push(self.middleware.clone());
        Mux {
            tree: Arc::clone(&self.tree),
            middleware: middleware.into_iter().collect(),
            ancestors,
            error_handler: Arc::clone(&self.error_handler),
            context_factory: Arc::clone(&self.context_factory),
            logger: Arc::clone(&self.logger),
            inline: true,
            routes_registered: false,
            registered: Vec::new(),
            error_handler_is_default: self.error_handler_is_default,
            logger_is_default: self.logger_is_default,
            context_factory_is_default: self.context_factory_is_default,
        }
    }

    /// An inline group populated by `f`: equivalent to `self.with([])` with
    /// `f` run against the returned handle before discarding it (the routes
    /// it registered already live in `self`'s shared tree).
    pub fn group(&self, f: impl FnOnce(&mut Mux<C>)) {
        let mut child = self.with(Vec::new());
        f(&mut child);
    }

    /// Creates a fresh subrouter — its own tree — runs `f` against it to
    /// register its routes, then mounts the result under `pattern`. The
    /// fresh submux starts with every adoptable field still at its default,
    /// so [`Mux::mount`] adopts this mux's error handler, logger, and
    /// context factory for it.
    pub fn route(&mut self, pattern: &str, f: impl FnOnce(&mut Mux<C>)) -> &mut Self {
        let mut sub = Mux::with_context_factory(Arc::clone(&self.context_factory));
        f(&mut sub);
        self.mount(pattern, sub)
    }

    /// Attaches an externally constructed subrouter under `pattern`: three
    /// stub entries are inserted — `pattern` (no trailing slash), `pattern/`,
    /// and `pattern/*` — so any of the three delegates to `sub` (spec §4.7
    /// "Mount"). `sub`'s error handler, logger, and context factory are
    /// adopted from `self` only if `sub` left them at their
    /// construction-time default (`*_is_default`); a `sub` built with its
    /// own explicit `.error_handler(...)`/`.logger(...)`/factory keeps them
    /// (DESIGN.md Open Question: "adopted only if the mountee left it
    /// unset").
    pub fn mount(&mut self, pattern: &str, mut sub: Mux<C>) -> &mut Self {
        assert!(
            pattern.starts_with('/'),
            "mount pattern must start with '/': {pattern:?}"
        );
        if sub.error_handler_is_default {
            sub.error_handler = Arc::clone(&self.error_handler);
            sub.error_handler_is_default = self.error_handler_is_default;
        }
        if sub.logger_is_default {
            sub.logger = Arc::clone(&self.logger);
            sub.logger_is_default = self.logger_is_default;
        }
        if sub.context_factory_is_default {
            sub.context_factory = Arc::clone(&self.context_factory);
            sub.context_factory_is_default = self.context_factory_is_default;
        }
        let sub = Arc::new(sub);
        let trimmed = pattern.trim_end_matches('/');
        let exact = if trimmed.is_empty() {
            "/".to_string()
        } else {
            trimmed.to_string()
        };
        let with_slash = if exact == "/" {
            "/".to_string()
        } else {
            format!("{exact}/")
        };
        let wildcard = if exact == "/" {
            "/*".to_string()
        } else {
            format!("{exact}/*")
        };

        let mut tree = self
            .tree
            .write()
            .unwrap_or_else(|e| panic!("route tree lock poisoned: {e}"));
        for p in [exact.as_str(), with_slash.as_str(), wildcard.as_str()] {
            if let Err(e) = tree.insert(p, Method::Stub, RouteEndpoint::Stub(Arc::clone(&sub))) {
                panic!("{e}");
            }
        }
        drop(tree);
        self
    }
}
