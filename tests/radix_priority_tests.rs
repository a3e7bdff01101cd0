use std::sync::{Arc, Mutex};

use radiant_router::context::{Context, DefaultContext};
use radiant_router::middleware::ResponseFn;
use radiant_router::mux::Mux;
use radiant_router::writer::Transport;

#[derive(Default)]
struct Recorded {
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
    fn write_status(&mut self, _status: u16) {}
    fn write_header(&mut self, _name: &str, _value: &str) {}
    fn write_body(&mut self, bytes: &[u8]) {
        self.sink.lock().unwrap().body.extend_from_slice(bytes);
    }
}

type Ctx = DefaultContext<RecordingTransport>;

fn request(path: &str) -> radiant_router::Request {
    http::Request::builder()
        .method("GET")
        .uri(path)
        .body(Vec::new())
        .unwrap()
}

/// `/users/admin` (static), `/users/{id:[0-9]+}` (regex), `/users/{name}`
/// (plain param), and `/users/*` (wildcard) all compete for the same request;
/// static wins, then regex, then plain param, then wildcard.
fn build_priority_mux() -> Mux<Ctx> {
    let mut mux: Mux<Ctx> = Mux::new();
    mux.get("/users/admin", |_ctx: &mut Ctx| {
        Some(Box::new(|ctx: &mut Ctx| {
            ctx.response_writer().write(b"static:admin");
            Ok(())
        }) as ResponseFn<Ctx>)
    });
    mux.get("/users/{id:[0-9]+}", |ctx: &mut Ctx| {
        let id = ctx.param("id").to_string();
        Some(Box::new(move |ctx: &mut Ctx| {
            ctx.response_writer()
                .write(format!("regex:{id}").as_bytes());
            Ok(())
        }) as ResponseFn<Ctx>)
    });
    mux.get("/users/{name}", |ctx: &mut Ctx| {
        let name = ctx.param("name").to_string();
        Some(Box::new(move |ctx: &mut Ctx| {
            ctx.response_writer()
                .write(format!("param:{name}").as_bytes());
            Ok(())
        }) as ResponseFn<Ctx>)
    });
    mux.get("/users/*", |_ctx: &mut Ctx| {
        Some(Box::new(|ctx: &mut Ctx| {
            ctx.response_writer().write(b"wildcard");
            Ok(())
        }) as ResponseFn<Ctx>)
    });
    mux
}

#[test]
fn static_segment_wins_over_every_dynamic_kind() {
    let mux = build_priority_mux();
    let (transport, sink) = RecordingTransport::new();
    mux.serve(transport, request("/users/admin"));
    assert_eq!(sink.lock().unwrap().body, b"static:admin");
}

#[test]
fn regex_param_wins_over_plain_param() {
    let mux = build_priority_mux();
    let (transport, sink) = RecordingTransport::new();
    mux.serve(transport, request("/users/42"));
    assert_eq!(sink.lock().unwrap().body, b"regex:42");
}

#[test]
fn plain_param_wins_over_wildcard() {
    let mux = build_priority_mux();
    let (transport, sink) = RecordingTransport::new();
    mux.serve(transport, request("/users/alice"));
    assert_eq!(sink.lock().unwrap().body, b"param:alice");
}

#[test]
fn multi_segment_remainder_only_matches_wildcard() {
    let mux = build_priority_mux();
    let (transport, sink) = RecordingTransport::new();
    mux.serve(transport, request("/users/a/b"));
    assert_eq!(sink.lock().unwrap().body, b"wildcard");
}
