//! The per-request context (spec §4.4): a polymorphic value handlers receive,
//! exposing the request, the wrapped writer, captured path parameters, and
//! the request's deadline/cancellation/value scope.
//!
//! Applications may use [`DefaultContext`] directly, or define their own type
//! implementing [`Context`] and register it with [`crate::mux::Mux`] via a
//! [`ContextFactory`]. [`HasDefaultFactory`] is sealed so only
//! [`DefaultContext`] can be constructed without an explicit factory — this
//! is what lets `Mux::<DefaultContext<T>>::new()` skip the factory argument
//! while any other context type must supply one.

use http::Extensions;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::request::Request;
use crate::tree::ParamVec;
use crate::writer::{ResponseWriter, Transport};

/// Captured path parameters. Lookup is first-match (DESIGN.md "Params
/// first-match vs. last-match").
#[derive(Default, Clone)]
pub struct Params(ParamVec);

impl Params {
    pub fn from_vec(vec: ParamVec) -> Self {
        Params(vec)
    }

    pub fn get(&self, name: &str) -> &str {
        self.0
            .iter()
            .find(|(k, _)| &**k == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (&**k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The deadline/cancellation/value triplet a request carries, delegated to
/// through the context untouched (spec §5 "Cancellation" — the core never
/// observes these itself).
pub struct Scope {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
    values: Extensions,
}

impl Default for Scope {
    fn default() -> Self {
        Scope {
            deadline: None,
            cancelled: Arc::new(AtomicBool::new(false)),
            values: Extensions::new(),
        }
    }
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// A shared handle a caller can flip to signal cancellation; `done()`
    /// observes it from the handler side.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn done(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn err(&self) -> Option<&'static str> {
        self.done().then_some("context cancelled")
    }

    pub fn value<V: Send + Sync + 'static>(&self) -> Option<&V> {
        self.values.get::<V>()
    }

    pub fn set_value<V: Send + Sync + 'static>(&mut self, value: V) {
        self.values.insert(value);
    }
}

/// The capability contract a handler sees (spec §6 "Context API").
pub trait Context: Send {
    type Transport: Transport;

    fn request(&self) -> &Request;
    fn response_writer(&mut self) -> &mut ResponseWriter<Self::Transport>;
    fn param(&self, name: &str) -> &str;
    fn scope(&self) -> &Scope;
    fn scope_mut(&mut self) -> &mut Scope;
}

/// The base context type: request + wrapped writer + params + scope, no
/// application-specific extension.
pub struct DefaultContext<T: Transport> {
    request: Request,
    writer: ResponseWriter<T>,
    params: Params,
    scope: Scope,
}

impl<T: Transport> DefaultContext<T> {
    pub fn new(writer: ResponseWriter<T>, request: Request, params: Params) -> Self {
        DefaultContext {
            request,
            writer,
            params,
            scope: Scope::new(),
        }
    }
}

impl<T: Transport> Context for DefaultContext<T> {
    type Transport = T;

    fn request(&self) -> &Request {
        &self.request
    }

    fn response_writer(&mut self) -> &mut ResponseWriter<T> {
        &mut self.writer
    }

    fn param(&self, name: &str) -> &str {
        self.params.get(name)
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }
}

/// A pluggable constructor: `(writer, request, params) -> C`, configured on
/// a `Mux<C>` via `ContextFactory(...)` (spec §6 Router options).
pub type ContextFactory<C> = Arc<
    dyn Fn(ResponseWriter<<C as Context>::Transport>, Request, Params) -> C + Send + Sync,
>;

mod sealed {
    pub trait Sealed {}
}

/// Implemented only for [`DefaultContext`]; lets `Mux::<DefaultContext<T>>::new()`
/// construct without requiring a caller-supplied factory.
pub trait HasDefaultFactory: Context + sealed::Sealed + Sized {
    fn default_factory() -> ContextFactory<Self>;
}

impl<T: Transport + 'static> sealed::Sealed for DefaultContext<T> {}

impl<T: Transport + 'static> HasDefaultFactory for DefaultContext<T> {
    fn default_factory() -> ContextFactory<Self> {
        Arc::new(|writer, request, params| DefaultContext::new(writer, request, params))
    }
}
