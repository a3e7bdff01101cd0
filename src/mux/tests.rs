use std::sync::{Arc, Mutex};

use crate::context::{Context, DefaultContext};
use crate::middleware::ResponseFn;
use crate::request::Request;
use crate::writer::Transport;

use super::Mux;

#[derive(Default)]
struct Recorded {
    status: Option<u16>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

#[derive(Clone)]
struct RecordingTransport {
    sink: Arc<Mutex<Recorded>>,
}

impl RecordingTransport {
    fn new() -> (Self, Arc<Mutex<Recorded>>) {
        let sink = Arc::new(Mutex::new(Recorded::default()));
        (
            RecordingTransport {
                sink: Arc::clone(&sink),
            },
            sink,
        )
    }
}

impl Transport for RecordingTransport {
    fn write_status(&mut self, status: u16) {
        self.sink.lock().unwrap().status = Some(status);
    }
    fn write_header(&mut self, name: &str, value: &str) {
        self.sink
            .lock()
            .unwrap()
            .headers
            .push((name.to_string(), value.to_string()));
    }
    fn write_body(&mut self, bytes: &[u8]) {
        self.sink.lock().unwrap().body.extend_from_slice(bytes);
    }
}

fn request(method: &str, path: &str) -> Request {
    http::Request::builder()
        .method(method)
        .uri(path)
        .body(Vec::new())
        .unwrap()
}

type Ctx = DefaultContext<RecordingTransport>;

#[test]
fn static_route_beats_param_route() {
    let mut mux: Mux<Ctx> = Mux::new();
    mux.get("/users/admin", |_ctx: &mut Ctx| {
        Some(Box::new(|ctx: &mut Ctx| {
            ctx.response_writer().write(b"static");
            Ok(())
        }) as ResponseFn<Ctx>)
    });
    mux.get("/users/{id}", |ctx: &mut Ctx| {
        let id = ctx.param("id").to_string();
        Some(Box::new(move |ctx: &mut Ctx| {
            ctx.response_writer().write(id.as_bytes());
            Ok(())
        }) as ResponseFn<Ctx>)
    });

    let (transport, sink) = RecordingTransport::new();
    mux.serve(transport, request("GET", "/users/admin"));
    assert_eq!(sink.lock().unwrap().body, b"static");

    let (transport, sink) = RecordingTransport::new();
    mux.serve(transport, request("GET", "/users/7"));
    assert_eq!(sink.lock().unwrap().body, b"7");
}

#[test]
fn unmatched_path_yields_404() {
    let mux: Mux<Ctx> = Mux::new();
    let (transport, sink) = RecordingTransport::new();
    mux.serve(transport, request("GET", "/nope"));
    assert_eq!(sink.lock().unwrap().status, Some(404));
}

#[test]
fn wrong_method_yields_405_with_allow_header() {
    let mut mux: Mux<Ctx> = Mux::new();
    mux.get("/items", |_ctx: &mut Ctx| {
        Some(Box::new(|_ctx: &mut Ctx| Ok(())) as ResponseFn<Ctx>)
    });

    let (transport, sink) = RecordingTransport::new();
    mux.serve(transport, request("POST", "/items"));
    let recorded = sink.lock().unwrap();
    assert_eq!(recorded.status, Some(405));
    assert!(recorded
        .headers
        .iter()
        .any(|(k, v)| k == "Allow" && v.contains("GET")));
}

#[test]
fn middleware_short_circuit_never_reaches_handler() {
    let handler_ran = Arc::new(Mutex::new(false));
    let handler_ran_for_mw = Arc::clone(&handler_ran);

    let mut mux: Mux<Ctx> = Mux::new();
    mux.use_middleware(Arc::new(move |_next| {
        Arc::new(move |ctx: &mut Ctx| {
            ctx.response_writer().write_status(401);
            Some(Box::new(|_ctx: &mut Ctx| Ok(())) as ResponseFn<Ctx>)
        })
    }));
    mux.get("/secret", move |_ctx: &mut Ctx| {
        *handler_ran_for_mw.lock().unwrap() = true;
        Some(Box::new(|_ctx: &mut Ctx| Ok(())) as ResponseFn<Ctx>)
    });

    let (transport, sink) = RecordingTransport::new();
    mux.serve(transport, request("GET", "/secret"));
    assert!(!*handler_ran.lock().unwrap());
    assert_eq!(sink.lock().unwrap().status, Some(401));
}

#[test]
fn mount_delegates_to_subrouter_with_stripped_prefix() {
    let mut api: Mux<Ctx> = Mux::new();
    api.get("/users/{id}", |ctx: &mut Ctx| {
        let id = ctx.param("id").to_string();
        Some(Box::new(move |ctx: &mut Ctx| {
            ctx.response_writer().write(id.as_bytes());
            Ok(())
        }) as ResponseFn<Ctx>)
    });

    let mut root: Mux<Ctx> = Mux::new();
    root.mount("/api", api);

    let (transport, sink) = RecordingTransport::new();
    root.serve(transport, request("GET", "/api/users/9"));
    assert_eq!(sink.lock().unwrap().body, b"9");
}

#[test]
fn mount_exact_path_also_delegates() {
    let mut api: Mux<Ctx> = Mux::new();
    api.get("/", |_ctx: &mut Ctx| {
        Some(Box::new(|ctx: &mut Ctx| {
            ctx.response_writer().write(b"root");
            Ok(())
        }) as ResponseFn<Ctx>)
    });

    let mut root: Mux<Ctx> = Mux::new();
    root.mount("/api", api);

    let (transport, sink) = RecordingTransport::new();
    root.serve(transport, request("GET", "/api"));
    assert_eq!(sink.lock().unwrap().body, b"root");
}

#[test]
fn panic_before_commit_is_recovered_as_error_response() {
    let mut mux: Mux<Ctx> = Mux::new();
    mux.get("/boom", |_ctx: &mut Ctx| -> Option<ResponseFn<Ctx>> {
        panic!("handler exploded before writing anything");
    });

    let (transport, sink) = RecordingTransport::new();
    mux.serve(transport, request("GET", "/boom"));
    assert_eq!(sink.lock().unwrap().status, Some(500));
}

#[test]
fn panic_after_commit_is_logged_and_does_not_rewrite_status() {
    let mut mux: Mux<Ctx> = Mux::new();
    mux.get("/late-boom", |_ctx: &mut Ctx| {
        Some(Box::new(|ctx: &mut Ctx| {
            ctx.response_writer().write_status(200);
            ctx.response_writer().write(b"partial");
            panic!("exploded after commit");
        }) as ResponseFn<Ctx>)
    });

    let (transport, sink) = RecordingTransport::new();
    mux.serve(transport, request("GET", "/late-boom"));
    assert_eq!(sink.lock().unwrap().status, Some(200));
    assert_eq!(sink.lock().unwrap().body, b"partial");
}

#[test]
fn routes_reports_registered_method_and_pattern() {
    let mut mux: Mux<Ctx> = Mux::new();
    mux.get("/a", |_ctx: &mut Ctx| None);
    mux.post("/b", |_ctx: &mut Ctx| None);
    let routes = mux.routes();
    assert_eq!(routes.len(), 2);
}
