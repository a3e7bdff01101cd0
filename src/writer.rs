//! Response-writer wrapping (spec §4.3): tracks whether a response has been
//! committed (status written or body bytes sent) and forwards optional
//! transport capabilities — flush, connection hijack, server push — through
//! a small capability trait so handlers doing upgrades still work without
//! the wrapper knowing about any specific transport.

use std::fmt;

/// Error returned when a handler calls an optional transport capability the
/// underlying transport does not implement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedCapability(pub &'static str);

impl fmt::Display for UnsupportedCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport does not support {}", self.0)
    }
}

impl std::error::Error for UnsupportedCapability {}

/// The minimum a transport must provide: header access, status commit, body
/// write. Optional capabilities have default "not supported" bodies so a
/// plain transport need not implement them.
pub trait Transport: Send {
    fn write_status(&mut self, status: u16);
    fn write_header(&mut self, name: &str, value: &str);
    fn write_body(&mut self, bytes: &[u8]);

    fn flush(&mut self) -> Result<(), UnsupportedCapability> {
        Err(UnsupportedCapability("flush"))
    }

    fn hijack(&mut self) -> Result<(), UnsupportedCapability> {
        Err(UnsupportedCapability("hijack"))
    }

    fn push(&mut self, _path: &str) -> Result<(), UnsupportedCapability> {
        Err(UnsupportedCapability("push"))
    }
}

/// Wraps a [`Transport`] and tracks commit state. `WriteHeader` records the
/// status on the first call only; `Write` implicitly commits with status 200
/// if nothing has been written yet. `Written()` never resets once true.
pub struct ResponseWriter<T: Transport> {
    inner: T,
    status: u16,
    written: bool,
}

impl<T: Transport> ResponseWriter<T> {
    pub fn new(inner: T) -> Self {
        ResponseWriter {
            inner,
            status: 0,
            written: false,
        }
    }

    pub fn write_header(&mut self, name: &str, value: &str) {
        self.inner.write_header(name, value);
    }

    /// Records and forwards `status` on the first call only. Matches the
    /// spec's "status commits exactly once per request" invariant.
    pub fn write_status(&mut self, status: u16) {
        if self.written {
            return;
        }
        self.status = status;
        self.written = true;
        self.inner.write_status(status);
    }

    pub fn write(&mut self, bytes: &[u8]) {
        if !self.written {
            self.write_status(200);
        }
        self.inner.write_body(bytes);
    }

    pub fn written(&self) -> bool {
        self.written
    }

    /// Unwraps the underlying transport, discarding commit tracking. Used
    /// when delegating to a mounted subrouter, which wraps the same
    /// transport in its own `ResponseWriter` rather than inheriting this
    /// one's commit state.
    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn flush(&mut self) -> Result<(), UnsupportedCapability> {
        self.inner.flush()
    }

    pub fn hijack(&mut self) -> Result<(), UnsupportedCapability> {
        self.inner.hijack()
    }

    pub fn push(&mut self, path: &str) -> Result<(), UnsupportedCapability> {
        self.inner.push(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingTransport {
        statuses: Vec<u16>,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    }

    impl Transport for RecordingTransport {
        fn write_status(&mut self, status: u16) {
            self.statuses.push(status);
        }
        fn write_header(&mut self, name: &str, value: &str) {
            self.headers.push((name.to_string(), value.to_string()));
        }
        fn write_body(&mut self, bytes: &[u8]) {
            self.body.extend_from_slice(bytes);
        }
    }

    #[test]
    fn status_commits_once() {
        let mut w = ResponseWriter::new(RecordingTransport::default());
        w.write_status(200);
        w.write_status(500);
        assert_eq!(w.status(), 200);
        assert_eq!(w.inner.statuses, vec![200]);
    }

    #[test]
    fn write_implicitly_commits_200() {
        let mut w = ResponseWriter::new(RecordingTransport::default());
        w.write(b"ok");
        assert_eq!(w.status(), 200);
        assert!(w.written());
        assert_eq!(w.inner.body, b"ok");
    }

    #[test]
    fn flush_not_supported_by_default_transport() {
        let mut w = ResponseWriter::new(RecordingTransport::default());
        assert!(w.flush().is_err());
    }
}
