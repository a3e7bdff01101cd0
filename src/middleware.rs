//! Middleware composition (spec §4.5).
//!
//! ```text
//! Use(A, B, C) ; Get(P, H)
//!
//!   A ──▶ B ──▶ C ──▶ H
//!   ◀──  ◀──  ◀──  ◀──
//! ```
//!
//! Registration order is outermost-first: `Use(A, B, C)` composes to
//! `A(B(C(H)))`, so the observed call sequence around the terminal handler
//! is `A-before, B-before, C-before, H, C-after, B-after, A-after`. A
//! middleware may short-circuit by returning a response without invoking the
//! handler it wraps; inner layers then never run.
//!
//! This differs from the before/after `Middleware` trait convention the
//! reference router uses for its own request/response tap points — that
//! shape doesn't give a clean way to skip the inner handler. Wrapping
//! functions (`Fn(Handler) -> Handler`) model short-circuit directly, so the
//! mechanism is rebuilt around that instead of reused.

use std::sync::Arc;

use crate::error::RouterError;

/// A terminal or already-wrapped handler: takes the context, returns the
/// response function to run against the wrapped writer, or `None` if the
/// handler produced no response (a protocol violation routed to the error
/// handler as [`crate::error::ErrorKind::NilResponse`]).
pub type Handler<C> = Arc<dyn Fn(&mut C) -> Option<ResponseFn<C>> + Send + Sync>;

/// The response function a handler returns: writes to the context's wrapped
/// writer, optionally reporting an error.
pub type ResponseFn<C> = Box<dyn FnOnce(&mut C) -> Result<(), RouterError> + Send>;

/// `Fn(Handler<C>) -> Handler<C>`, i.e. a handler wrapper.
pub type Middleware<C> = Arc<dyn Fn(Handler<C>) -> Handler<C> + Send + Sync>;

/// Fold `middlewares` around `terminal`, outermost-first: the first element
/// of `middlewares` becomes the outermost wrapper.
pub fn compose<C>(middlewares: &[Middleware<C>], terminal: Handler<C>) -> Handler<C> {
    middlewares
        .iter()
        .rev()
        .fold(terminal, |acc, mw| mw(acc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Ctx {
        trace: Vec<&'static str>,
    }
    impl Ctx {
        fn new() -> Self {
            Ctx { trace: Vec::new() }
        }
    }

    fn tag(name: &'static str) -> Middleware<Ctx> {
        Arc::new(move |next: Handler<Ctx>| -> Handler<Ctx> {
            Arc::new(move |ctx: &mut Ctx| {
                ctx.trace.push(name);
                let result = next(ctx);
                ctx.trace.push(name);
                result
            })
        })
    }

    #[test]
    fn outermost_first_registration_nests_correctly() {
        let terminal: Handler<Ctx> = Arc::new(|ctx: &mut Ctx| {
            ctx.trace.push("H");
            None
        });
        let chain = compose(&[tag("A"), tag("B"), tag("C")], terminal);
        let mut ctx = Ctx::new();
        chain(&mut ctx);
        // A-before, B-before, C-before, H, C-after, B-after, A-after duplicated
        // because `tag` pushes once before calling next and once after.
        assert_eq!(
            ctx.trace,
            vec!["A", "B", "C", "H", "C", "B", "A"]
        );
    }

    #[test]
    fn short_circuit_skips_inner_layers_and_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_for_handler = Arc::clone(&calls);
        let terminal: Handler<Ctx> = Arc::new(move |_ctx: &mut Ctx| {
            calls_for_handler.fetch_add(1, Ordering::SeqCst);
            None
        });
        let short_circuit: Middleware<Ctx> = Arc::new(|_next: Handler<Ctx>| -> Handler<Ctx> {
            Arc::new(|_ctx: &mut Ctx| Some(Box::new(|_ctx: &mut Ctx| Ok(()))))
        });
        let inner_calls = Arc::new(AtomicUsize::new(0));
        let inner_calls_for_mw = Arc::clone(&inner_calls);
        let inner: Middleware<Ctx> = Arc::new(move |next: Handler<Ctx>| -> Handler<Ctx> {
            let inner_calls_for_mw = Arc::clone(&inner_calls_for_mw);
            Arc::new(move |ctx: &mut Ctx| {
                inner_calls_for_mw.fetch_add(1, Ordering::SeqCst);
                next(ctx)
            })
        });
        let chain = compose(&[short_circuit, inner], terminal);
        let mut ctx = Ctx::new();
        let response = chain(&mut ctx);
        assert!(response.is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(inner_calls.load(Ordering::SeqCst), 0);
    }
}
