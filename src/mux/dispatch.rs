//! The dispatch pipeline (spec §4.6) and panic recovery (spec §4.6 "Panic
//! policy", §5 "Panic recovery").
//!
//! Panic recovery rescues the context across `catch_unwind` with an
//! `Option` slot borrowed (not moved) into the guarded closure: the slot
//! itself lives in `serve`'s own stack frame, so if a panic unwinds the
//! closure's locals, the context the closure already stashed into the slot
//! survives and `serve` can inspect `response_writer().written()` on it
//! afterward to decide whether the error handler can still write a
//! response or whether the failure can only be logged (spec's "pre-commit
//! vs. post-commit" split). A panic raised before the context is
//! constructed at all (i.e. inside a user-supplied [`ContextFactory`])
//! leaves the slot empty; nothing is left to write a response to, so that
//! case is logged only — see DESIGN.md for why this crate resolves the
//! spec's "panic during context construction" note this way.

use std::any::Any;
use std::sync::Arc;

use crate::context::{Context, Params};
use crate::error::{ErrorKind, RouterError};
use crate::logger::PanicAfterCommit;
use crate::method::Method;
use crate::request::Request;
use crate::tree::Resolution;
use crate::writer::ResponseWriter;

use super::{Mux, RouteEndpoint};

/// Writes `err`'s status (default 500) and message if the response has not
/// already been committed; a no-op otherwise (spec §4.8).
pub fn default_error_handler<C: Context>(ctx: &mut C, err: RouterError) {
    let writer = ctx.response_writer();
    if writer.written() {
        return;
    }
    let status = err.status_code().unwrap_or(500);
    writer.write_status(status);
    writer.write(err.message().as_bytes());
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl<C: Context + 'static> Mux<C> {
    /// Entry point the enclosing transport calls once per accepted request
    /// (spec §6 "To the HTTP transport").
    pub fn serve(&self, transport: C::Transport, req: Request) {
        let mut writer = ResponseWriter::new(transport);
        let method_str = req.method().as_str().to_string();
        let raw_path = req.uri().path();
        let path = if raw_path.is_empty() {
            "/".to_string()
        } else {
            raw_path.to_string()
        };

        let method = match Method::try_from(req.method()) {
            Ok(m) => m,
            Err(_) => {
                self.dispatch_unrecognized_method(writer, req, &method_str, &path);
                return;
            }
        };

        let resolved = {
            let tree = self
                .tree
                .read()
                .unwrap_or_else(|e| panic!("route tree lock poisoned: {e}"));
            match tree.resolve(&path) {
                Resolution::Matched { endpoints, params } => {
                    if let Some(RouteEndpoint::Handler(h)) =
                        endpoints.get(&method).or_else(|| endpoints.get(&Method::All))
                    {
                        Some(Resolved::Handler(Arc::clone(h), params))
                    } else if let Some(RouteEndpoint::Stub(sub)) = endpoints.get(&Method::Stub) {
                        Some(Resolved::Stub(Arc::clone(sub), params))
                    } else if !endpoints.is_empty() {
                        let allowed: Vec<&'static str> = endpoints
                            .keys()
                            .filter(|m| m.is_concrete())
                            .map(|m| m.as_str())
                            .collect();
                        Some(Resolved::MethodNotAllowed(allowed))
                    } else {
                        None
                    }
                }
                Resolution::NotFound => None,
            }
        };

        match resolved {
            None => {
                if !writer.written() {
                    writer.write_status(404);
                    writer.write(b"not found");
                }
            }
            Some(Resolved::MethodNotAllowed(allowed)) => {
                if !writer.written() {
                    writer.write_header("Allow", &allowed.join(", "));
                    writer.write_status(405);
                    writer.write(b"method not allowed");
                }
            }
            Some(Resolved::Stub(sub, params)) => {
                let sub_path = match params.iter().find(|(k, _)| &**k == "*") {
                    Some((_, tail)) => format!("/{tail}"),
                    None => "/".to_string(),
                };
                let delegated = crate::request::with_path(&req, &sub_path);
                sub.serve(writer.into_inner(), delegated);
            }
            Some(Resolved::Handler(handler, params)) => {
                self.dispatch_matched(writer, req, &method_str, &path, Params::from_vec(params), handler);
            }
        }
    }

    /// An unrecognized method string (spec §4.6 step 3) still gets a
    /// best-effort context so the configured error handler — not a
    /// hardcoded plain-text body — answers with `MethodNotAllowed`. If
    /// building that context itself panics, there is nothing left to
    /// write through (the writer was moved into the factory call), so the
    /// attempt is logged only, same as any other context-construction
    /// panic (DESIGN.md Open Question 4).
    fn dispatch_unrecognized_method(
        &self,
        writer: ResponseWriter<C::Transport>,
        req: Request,
        method_str: &str,
        path: &str,
    ) {
        let mut slot: Option<C> = None;
        let factory = Arc::clone(&self.context_factory);

        let outcome = {
            let slot_ref = &mut slot;
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
                let ctx = factory(writer, req, Params::default());
                *slot_ref = Some(ctx);
            }))
        };

        match outcome {
            Ok(()) => {
                if let Some(mut ctx) = slot {
                    (self.error_handler)(&mut ctx, RouterError::method_not_allowed());
                }
            }
            Err(panic) => {
                let payload = panic_message(&*panic);
                tracing::error!(
                    method = method_str,
                    path = path,
                    panic = %payload,
                    "panicked constructing the request context for an unrecognized method; no response could be written"
                );
            }
        }
    }

    fn dispatch_matched(
        &self,
        writer: ResponseWriter<C::Transport>,
        req: Request,
        method_str: &str,
        path: &str,
        params: Params,
        handler: crate::middleware::Handler<C>,
    ) {
        let mut slot: Option<C> = None;
        let factory = Arc::clone(&self.context_factory);

        let outcome = {
            let slot_ref = &mut slot;
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
                let ctx = factory(writer, req, params);
                *slot_ref = Some(ctx);
                let ctx_ref = slot_ref.as_mut().unwrap_or_else(|| {
                    unreachable!("slot was just assigned Some above")
                });
                // `ctx_ref` only borrows from `*slot_ref`; if `handler` or the
                // returned response function panics, the context itself
                // (owned by the slot in the caller's frame, not by this
                // closure) survives the unwind.
                match handler(ctx_ref) {
                    Some(response_fn) => response_fn(ctx_ref),
                    None => Err(RouterError::new(
                        ErrorKind::NilResponse,
                        "handler returned no response",
                    )),
                }
            }))
        };

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                if let Some(mut ctx) = slot {
                    (self.error_handler)(&mut ctx, err);
                }
            }
            Err(panic) => {
                let payload = panic_message(&*panic);
                match slot {
                    Some(mut ctx) => {
                        if ctx.response_writer().written() {
                            self.logger.panic_after_commit(PanicAfterCommit {
                                method: method_str,
                                path,
                                status: ctx.response_writer().status(),
                                payload: &payload,
                            });
                        } else {
                            (self.error_handler)(&mut ctx, RouterError::panic_recovered(payload));
                        }
                    }
                    None => {
                        tracing::error!(
                            method = method_str,
                            path = path,
                            panic = %payload,
                            "panicked constructing the request context; no response could be written"
                        );
                    }
                }
            }
        }
    }
}

enum Resolved<C: Context> {
    Handler(crate::middleware::Handler<C>, crate::tree::ParamVec),
    Stub(Arc<Mux<C>>, crate::tree::ParamVec),
    MethodNotAllowed(Vec<&'static str>),
}
