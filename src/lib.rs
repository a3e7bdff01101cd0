//! # radiant-router
//!
//! A radix-tree HTTP router core: longest-common-prefix path matching with
//! static/regex-param/plain-param/wildcard priority, a generic per-request
//! context, composable middleware, panic-safe dispatch, and subrouter
//! mounting.
//!
//! ## Quick start
//!
//! ```no_run
//! use radiant_router::context::DefaultContext;
//! use radiant_router::mux::Mux;
//!
//! # struct MyTransport;
//! # impl radiant_router::writer::Transport for MyTransport {
//! #     fn write_status(&mut self, _status: u16) {}
//! #     fn write_header(&mut self, _name: &str, _value: &str) {}
//! #     fn write_body(&mut self, _bytes: &[u8]) {}
//! # }
//! let mut mux: Mux<DefaultContext<MyTransport>> = Mux::new();
//! mux.get("/pets/{id}", |ctx| {
//!     let id = ctx.param("id").to_string();
//!     Some(Box::new(move |ctx: &mut DefaultContext<MyTransport>| {
//!         ctx.response_writer().write(format!("pet {id}").as_bytes());
//!         Ok(())
//!     }))
//! });
//! ```
//!
//! ## Modules
//!
//! - [`error`] — the closed [`error::ErrorKind`] set and [`error::RouterError`]
//! - [`method`] — the routable [`method::Method`] set
//! - [`pattern`] — route pattern tokenizing
//! - [`tree`] — the radix tree
//! - [`writer`] — response commit tracking and the [`writer::Transport`] trait
//! - [`context`] — [`context::Context`], [`context::DefaultContext`], [`context::Scope`]
//! - [`middleware`] — handler wrapping and composition
//! - [`logger`] — the post-commit diagnostic sink
//! - [`request`] — the request alias and subrouter delegation helpers
//! - [`mux`] — [`mux::Mux`], the dispatcher applications construct and register routes on

pub mod context;
pub mod error;
pub mod logger;
pub mod method;
pub mod middleware;
pub mod mux;
pub mod pattern;
pub mod request;
pub mod tree;
pub mod writer;

pub use context::{Context, DefaultContext, Scope};
pub use error::{ErrorKind, RouterError};
pub use method::Method;
pub use mux::Mux;
pub use request::Request;
pub use writer::{ResponseWriter, Transport};
