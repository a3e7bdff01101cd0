//! The closed set of HTTP methods the tree understands, plus two internal tags
//! used only inside the tree: `All` (wildcard verb registration) and `Stub`
//! (a mount placeholder, never matched against an incoming request method).

use std::fmt;
use std::str::FromStr;

/// A routable HTTP method, or one of the two internal tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Connect,
    Trace,
    /// Matches any incoming method. Never itself appears as an incoming method.
    All,
    /// Placeholder endpoint installed by `Mux::mount`; carries no handler of its
    /// own and is never matched directly — the dispatcher special-cases it.
    Stub,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Connect => "CONNECT",
            Method::Trace => "TRACE",
            Method::All => "*",
            Method::Stub => "STUB",
        }
    }

    /// True for the nine real HTTP verbs; false for `All`/`Stub`.
    pub fn is_concrete(self) -> bool {
        !matches!(self, Method::All | Method::Stub)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            "CONNECT" => Ok(Method::Connect),
            "TRACE" => Ok(Method::Trace),
            _ => Err(()),
        }
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = ();

    fn try_from(m: &http::Method) -> Result<Self, Self::Error> {
        Method::from_str(m.as_str())
    }
}
