//! Request alias and the sub-path cloning helper used by mount delegation
//! (spec §4.6 step 6 / §5 "Subrouter delegation").

/// The request type handlers see. The body is already buffered by the
/// transport before dispatch — this crate does not stream bodies.
pub type Request = http::Request<Vec<u8>>;

/// Build a shallow clone of `req` with its path replaced by `new_path`,
/// preserving method, headers, version, and body. Used when delegating to a
/// mounted subrouter after stripping the mount prefix.
pub fn with_path(req: &Request, new_path: &str) -> Request {
    let mut builder = http::Request::builder()
        .method(req.method().clone())
        .version(req.version())
        .uri(new_path);
    for (name, value) in req.headers() {
        builder = builder.header(name, value);
    }
    match builder.body(req.body().clone()) {
        Ok(cloned) => cloned,
        Err(_) => {
            // Rebuilding from an already-valid request's own parts cannot
            // fail in practice; fall back to the minimal valid request
            // rather than panic on the request path.
            http::Request::new(req.body().clone())
        }
    }
}
