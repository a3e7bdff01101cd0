//! The `Mux<C>` dispatcher (spec §3 "Mux", §4.6, §6 registration surface).
//!
//! A `Mux` owns a radix tree (shared by reference with any inline group
//! spawned from it via [`Mux::with`]/[`Mux::group`]), an ordered middleware
//! list, and the error handler / context factory / logger every request
//! dispatched through it will use. Route registration methods mutate the
//! mux in place and return `&mut Self` for chaining, mirroring the
//! reference router's builder-style API; [`Mux::with`] and [`Mux::route`]
//! instead return a fresh handle so the parent mux stays usable afterward.

mod dispatch;
mod group;
#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::context::{Context, ContextFactory, HasDefaultFactory};
use crate::error::{ErrorKind, RouterError};
use crate::logger::{default_logger, LoggerHandle};
use crate::method::Method;
use crate::middleware::{compose, Handler, Middleware, ResponseFn};
use crate::tree::Tree;

pub use dispatch::default_error_handler;

/// What a tree node's endpoint map actually stores for this crate: either a
/// fully middleware-wrapped handler, or a back-reference to a mounted
/// subrouter of the same context type (DESIGN.md Open Question 3).
pub(crate) enum RouteEndpoint<C: Context> {
    Handler(Handler<C>),
    Stub(Arc<Mux<C>>),
}

impl<C: Context> Clone for RouteEndpoint<C> {
    fn clone(&self) -> Self {
        match self {
            RouteEndpoint::Handler(h) => RouteEndpoint::Handler(Arc::clone(h)),
            RouteEndpoint::Stub(m) => RouteEndpoint::Stub(Arc::clone(m)),
        }
    }
}

type ErrorHandler<C> = Arc<dyn Fn(&mut C, RouterError) + Send + Sync>;

pub struct Mux<C: Context> {
    pub(crate) tree: Arc<RwLock<Tree<RouteEndpoint<C>>>>,
    pub(crate) middleware: Vec<Middleware<C>>,
    /// Ancestor middleware layers, outermost first, snapshotted at the
    /// moment each enclosing inline group was created (DESIGN.md Open
    /// Question 2).
    pub(crate) ancestors: Vec<Vec<Middleware<C>>>,
    pub(crate) error_handler: ErrorHandler<C>,
    pub(crate) context_factory: ContextFactory<C>,
    pub(crate) logger: LoggerHandle,
    pub(crate) inline: bool,
    pub(crate) routes_registered: bool,
    registered: Vec<(Method, String)>,
    /// Tracks whether `error_handler`/`logger`/`context_factory` are still
    /// the construction-time default, so [`Mux::mount`] can tell an unset
    /// field (adopt the parent's) from one the caller explicitly set
    /// (leave alone) — spec §4.7 "adopted only if the mountee left it
    /// unset" (DESIGN.md).
    pub(crate) error_handler_is_default: bool,
    pub(crate) logger_is_default: bool,
    pub(crate) context_factory_is_default: bool,
}

impl<C: HasDefaultFactory + 'static> Mux<C> {
    /// Construct a mux for the base context type without an explicit
    /// factory — only possible because `C: HasDefaultFactory` is sealed to
    /// [`crate::context::DefaultContext`].
    pub fn new() -> Self {
        let mut mux = Self::with_context_factory(C::default_factory());
        mux.context_factory_is_default = true;
        mux
    }
}

impl<C: HasDefaultFactory + 'static> Default for Mux<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Context + 'static> Mux<C> {
    pub fn with_context_factory(factory: ContextFactory<C>) -> Self {
        Mux {
            tree: Arc::new(RwLock::new(Tree::new())),
            middleware: Vec::new(),
            ancestors: Vec::new(),
            error_handler: Arc::new(dispatch::default_error_handler),
            context_factory: factory,
            logger: default_logger(),
            inline: false,
            routes_registered: false,
            registered: Vec::new(),
            error_handler_is_default: true,
            logger_is_default: true,
            context_factory_is_default: false,
        }
    }

    pub fn error_handler(
        &mut self,
        handler: impl Fn(&mut C, RouterError) + Send + Sync + 'static,
    ) -> &mut Self {
        self.error_handler = Arc::new(handler);
        self.error_handler_is_default = false;
        self
    }

    pub fn logger(&mut self, logger: LoggerHandle) -> &mut Self {
        self.logger = logger;
        self.logger_is_default = false;
        self
    }

    /// Append `middleware` to this mux's own layer. Forbidden once this mux
    /// has registered any route (spec §4.6 "Middleware registration").
    pub fn use_middleware(&mut self, middleware: Middleware<C>) -> &mut Self {
        assert!(
            !self.routes_registered,
            "Use() called after a route was already registered on this mux"
        );
        self.middleware.push(middleware);
        self
    }

    fn full_chain(&self) -> Vec<Middleware<C>> {
        let mut chain = Vec::with_capacity(
            self.ancestors.iter().map(Vec::len).sum::<usize>() + self.middleware.len(),
        );
        for layer in &self.ancestors {
            chain.extend(layer.iter().cloned());
        }
        chain.extend(self.middleware.iter().cloned());
        chain
    }

    fn insert_route(
        &mut self,
        pattern: &str,
        handler: impl Fn(&mut C) -> Option<ResponseFn<C>> + Send + Sync + 'static,
        methods: &[Method],
    ) -> &mut Self {
        assert!(
            pattern.starts_with('/'),
            "pattern must start with '/': {pattern:?}"
        );
        let chain = self.full_chain();
        let wrapped: Handler<C> = compose(&chain, Arc::new(handler));
        let endpoint = RouteEndpoint::Handler(wrapped);
        {
            let mut tree = self
                .tree
                .write()
                .unwrap_or_else(|e| panic!("route tree lock poisoned: {e}"));
            for &m in methods {
                if let Err(e) = tree.insert(pattern, m, endpoint.clone()) {
                    panic!("{e}");
                }
            }
        }
        self.routes_registered = true;
        for &m in methods {
            self.registered.push((m, pattern.to_string()));
        }
        self
    }

    pub fn get(
        &mut self,
        pattern: &str,
        handler: impl Fn(&mut C) -> Option<ResponseFn<C>> + Send + Sync + 'static,
    ) -> &mut Self {
        self.insert_route(pattern, handler, &[Method::Get])
    }

    pub fn post(
        &mut self,
        pattern: &str,
        handler: impl Fn(&mut C) -> Option<ResponseFn<C>> + Send + Sync + 'static,
    ) -> &mut Self {
        self.insert_route(pattern, handler, &[Method::Post])
    }

    pub fn put(
        &mut self,
        pattern: &str,
        handler: impl Fn(&mut C) -> Option<ResponseFn<C>> + Send + Sync + 'static,
    ) -> &mut Self {
        self.insert_route(pattern, handler, &[Method::Put])
    }

    pub fn delete(
        &mut self,
        pattern: &str,
        handler: impl Fn(&mut C) -> Option<ResponseFn<C>> + Send + Sync + 'static,
    ) -> &mut Self {
        self.insert_route(pattern, handler, &[Method::Delete])
    }

    pub fn patch(
        &mut self,
        pattern: &str,
        handler: impl Fn(&mut C) -> Option<ResponseFn<C>> + Send + Sync + 'static,
    ) -> &mut Self {
        self.insert_route(pattern, handler, &[Method::Patch])
    }

    pub fn head(
        &mut self,
        pattern: &str,
        handler: impl Fn(&mut C) -> Option<ResponseFn<C>> + Send + Sync + 'static,
    ) -> &mut Self {
        self.insert_route(pattern, handler, &[Method::Head])
    }

    pub fn options(
        &mut self,
        pattern: &str,
        handler: impl Fn(&mut C) -> Option<ResponseFn<C>> + Send + Sync + 'static,
    ) -> &mut Self {
        self.insert_route(pattern, handler, &[Method::Options])
    }

    /// Registers for any method (spec §6 "generic `Handle`").
    pub fn handle(
        &mut self,
        pattern: &str,
        handler: impl Fn(&mut C) -> Option<ResponseFn<C>> + Send + Sync + 'static,
    ) -> &mut Self {
        self.insert_route(pattern, handler, &[Method::All])
    }

    /// Registers for an explicit list of methods, de-duplicating and
    /// rejecting unrecognised verbs (spec §6 "`Method(pattern, handler,
    /// methods…)`").
    pub fn method(
        &mut self,
        pattern: &str,
        handler: impl Fn(&mut C) -> Option<ResponseFn<C>> + Send + Sync + 'static,
        methods: &[&str],
    ) -> &mut Self {
        let mut seen = HashSet::new();
        let mut parsed = Vec::new();
        for m in methods {
            let method: Method = m.parse().unwrap_or_else(|_| {
                panic!(
                    "{}",
                    RouterError::new(ErrorKind::InvalidMethod, format!("invalid method: {m:?}"))
                )
            });
            if seen.insert(method) {
                parsed.push(method);
            }
        }
        self.insert_route(pattern, handler, &parsed)
    }

    /// The `(method, pattern)` set registered directly on this mux (not its
    /// mounted subrouters), for introspection (spec §6 "`Routes()`").
    pub fn routes(&self) -> Vec<(Method, String)> {
        self.registered.clone()
    }
}
