use std::fmt;

/// HTTP request methods.
///
/// Represents the HTTP method/verb of a request. Standard verbs get their
/// own variant; anything else is carried verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// CONNECT - Establish a tunnel
    CONNECT,
    /// TRACE - Loop-back test
    TRACE,
    /// Any other token, kept as received
    Other(String),
}

impl Method {
    /// Maps a request-line token onto a method.
    ///
    /// Matching is case-sensitive, as method tokens are in HTTP. Unknown
    /// tokens are never rejected here.
    ///
    /// # Example
    ///
    /// ```
    /// # use wicket::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Method::GET);
    /// assert_eq!(Method::from_token("get"), Method::Other("get".into()));
    /// ```
    pub fn from_token(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "HEAD" => Method::HEAD,
            "OPTIONS" => Method::OPTIONS,
            "PATCH" => Method::PATCH,
            "CONNECT" => Method::CONNECT,
            "TRACE" => Method::TRACE,
            other => Method::Other(other.to_string()),
        }
    }

    /// The method as it appears on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::CONNECT => "CONNECT",
            Method::TRACE => "TRACE",
            Method::Other(token) => token,
        }
    }
}

/// Read-only lookup over an ordered list of header pairs.
///
/// Names compare case-insensitively and the first matching entry wins.
#[derive(Debug, Clone, Copy)]
pub struct HeaderList<'a>(&'a [(String, String)]);

impl<'a> HeaderList<'a> {
    pub fn new(headers: &'a [(String, String)]) -> Self {
        Self(headers)
    }

    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// A parsed HTTP request head.
///
/// Built once when the header section is complete and never mutated
/// afterwards. Headers keep their arrival order, duplicates included. The
/// body is not part of the request; it streams through
/// [`RequestBody`](crate::http::body::RequestBody).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The raw request target, not decoded or normalized
    pub path: String,
    /// Protocol version string (typically "HTTP/1.1")
    pub version: String,
    /// Request headers in arrival order
    pub headers: Vec<(String, String)>,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    version: Option<String>,
    headers: Vec<(String, String)>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            version: None,
            headers: Vec::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path: self.path.ok_or("path missing")?,
            version: self.version.ok_or("version missing")?,
            headers: self.headers,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Lookup view over the request headers.
    pub fn header_list(&self) -> HeaderList<'_> {
        HeaderList::new(&self.headers)
    }

    /// Retrieves the first header value with the given name.
    ///
    /// Header names are compared case-insensitively.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.header_list().get(key)
    }

    /// The path without its query string.
    pub fn path_info(&self) -> &str {
        self.path
            .split_once('?')
            .map(|(path, _)| path)
            .unwrap_or(&self.path)
    }

    /// The query string, empty if the target has none.
    pub fn query_string(&self) -> &str {
        self.path
            .split_once('?')
            .map(|(_, query)| query)
            .unwrap_or("")
    }

    /// The declared body length.
    ///
    /// Returns `Ok(0)` when there is no Content-Length header. Every
    /// Content-Length present must be a plain decimal byte count and all of
    /// them must agree; anything else is an error.
    pub fn content_length(&self) -> Result<usize, InvalidContentLength> {
        let values: Vec<&str> = self
            .headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case("Content-Length"))
            .map(|(_, value)| value.as_str())
            .collect();

        let Some(first) = values.first() else {
            return Ok(0);
        };

        let invalid = || InvalidContentLength(values.join(", "));
        let well_formed = values
            .iter()
            .all(|v| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()));
        if !well_formed || values.iter().any(|v| v != first) {
            return Err(invalid());
        }

        first.parse().map_err(|_| invalid())
    }
}

/// Content-Length values that do not frame a body unambiguously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidContentLength(pub String);

impl fmt::Display for InvalidContentLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid Content-Length {:?}", self.0)
    }
}

impl std::error::Error for InvalidContentLength {}
