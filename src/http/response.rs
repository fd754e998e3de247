use std::fmt;

use crate::http::request::HeaderList;

/// Common HTTP status codes.
///
/// Applications may pass any status line to `start-response`; these cover the
/// ones the server itself and most handlers need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 201 Created
    Created,
    /// 204 No Content
    NoContent,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 413 Content Too Large
    PayloadTooLarge,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use wicket::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::NoContent => 204,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::PayloadTooLarge => 413,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::NoContent => "No Content",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::PayloadTooLarge => "Content Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// Renders the status the way `start-response` expects it, e.g. `404 Not Found`.
impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

/// Why a `start-response` call was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadError {
    InvalidStatus(String),
    InvalidHeader(String),
}

impl fmt::Display for HeadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadError::InvalidStatus(status) => write!(f, "invalid status line {:?}", status),
            HeadError::InvalidHeader(name) => write!(f, "invalid header {:?}", name),
        }
    }
}

impl std::error::Error for HeadError {}

/// Status and headers of a response, as supplied by the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: String,
    pub headers: Vec<(String, String)>,
}

impl ResponseHead {
    /// Validates an application-supplied head.
    ///
    /// The status must start with a three-digit code and no header may
    /// contain a line break. A `Connection` header, if given, must be
    /// `close`: the connection always closes after one response.
    pub fn new(status: impl Into<String>, headers: Vec<(String, String)>) -> Result<Self, HeadError> {
        let status = status.into();

        let code = status.get(..3).unwrap_or("");
        let rest = status.get(3..).unwrap_or("");
        let well_formed = code.len() == 3
            && code.bytes().all(|b| b.is_ascii_digit())
            && (rest.is_empty() || rest.starts_with(' '))
            && !has_line_break(&status);
        if !well_formed {
            return Err(HeadError::InvalidStatus(status));
        }

        for (key, value) in &headers {
            if key.is_empty() || key.contains(':') || has_line_break(key) || has_line_break(value) {
                return Err(HeadError::InvalidHeader(key.clone()));
            }
            if key.eq_ignore_ascii_case("Connection") && !value.trim().eq_ignore_ascii_case("close") {
                return Err(HeadError::InvalidHeader(key.clone()));
            }
        }

        Ok(Self { status, headers })
    }

    /// Appends `Connection: close` and `Server` unless already present.
    ///
    /// Caller-supplied headers keep their order and position.
    pub fn with_defaults(mut self, server_software: &str) -> Self {
        let list = HeaderList::new(&self.headers);
        let has_connection = list.contains("Connection");
        let has_server = list.contains("Server");

        if !has_connection {
            self.headers.push(("Connection".to_string(), "close".to_string()));
        }
        if !has_server {
            self.headers.push(("Server".to_string(), server_software.to_string()));
        }
        self
    }
}

fn has_line_break(s: &str) -> bool {
    s.contains(['\r', '\n'])
}
