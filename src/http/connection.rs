use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use bytes::Bytes;

use crate::http::application::{Application, ResponseHalf, ResponseState, SendBody, StartResponse};
use crate::http::body::{Delivery, RequestBody};
use crate::http::environ::{Environ, ServerInfo};
use crate::http::parser::{Element, HeaderParser, ParseError, DEFAULT_MAX_HEADER_BYTES};
use crate::http::request::{Method, Request, RequestBuilder};
use crate::http::transport::{CloseReason, Protocol, Transport};
use crate::server::ServerLoop;

/// Where the request half of a connection is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    ParsingHeader,
    ReadingBody,
}

/// Malformed input that ends a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    Parse(ParseError),
    MissingRequestLine,
    InvalidContentLength(String),
    UnsupportedTransferEncoding(String),
    BodyOverflow { expected: usize },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Parse(e) => write!(f, "{}", e),
            ProtocolError::MissingRequestLine => write!(f, "request has no request line"),
            ProtocolError::InvalidContentLength(v) => write!(f, "invalid Content-Length {:?}", v),
            ProtocolError::UnsupportedTransferEncoding(v) => {
                write!(f, "unsupported Transfer-Encoding {:?}", v)
            }
            ProtocolError::BodyOverflow { expected } => {
                write!(f, "body exceeds declared length of {} bytes", expected)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// One HTTP/1.1 request/response cycle over one transport.
///
/// The connection parses the request head, hands the request to the
/// application, frames whatever the application answers, and closes the
/// transport when the response ends. It never serves a second request.
pub struct Connection {
    app: Rc<dyn Application>,
    server: ServerInfo,
    // Diagnostics only; the loop owns us, not the other way round.
    event_loop: Weak<ServerLoop>,

    parser: HeaderParser,
    elements: Vec<Element>,
    request_state: RequestState,
    request: Option<Request>,
    body: Option<RequestBody>,

    response: Rc<RefCell<ResponseHalf>>,
    released: bool,
}

impl Connection {
    pub fn new(
        transport: Rc<dyn Transport>,
        app: Rc<dyn Application>,
        server: ServerInfo,
        event_loop: Weak<ServerLoop>,
    ) -> Self {
        let response = ResponseHalf::new(transport, server.server_software.clone());
        Self {
            app,
            server,
            event_loop,
            parser: HeaderParser::new(DEFAULT_MAX_HEADER_BYTES),
            elements: Vec::new(),
            request_state: RequestState::ParsingHeader,
            request: None,
            body: None,
            response: Rc::new(RefCell::new(response)),
            released: false,
        }
    }

    /// Caps the size of the request head.
    pub fn with_max_header_bytes(mut self, max: usize) -> Self {
        self.parser = HeaderParser::new(max);
        self
    }

    pub fn request_state(&self) -> RequestState {
        self.request_state
    }

    pub fn response_state(&self) -> ResponseState {
        self.response.borrow().state()
    }

    /// The request being served, until the connection is released.
    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn parse_header(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }

        match self.parser.feed(data) {
            Ok(elements) => self.elements.extend(elements),
            Err(e) => {
                self.protocol_error(ProtocolError::Parse(e));
                return;
            }
        }

        if !matches!(self.elements.last(), Some(Element::End(_))) {
            return;
        }

        let (request, leftover) = match self.assemble_request() {
            Ok(parts) => parts,
            Err(e) => {
                self.protocol_error(e);
                return;
            }
        };

        let expected = match body_length(&request) {
            Ok(expected) => expected,
            Err(e) => {
                self.protocol_error(e);
                return;
            }
        };

        tracing::debug!(
            method = request.method.as_str(),
            path = %request.path,
            version = %request.version,
            content_length = expected,
            "Request head complete"
        );

        let body = RequestBody::new(expected);
        let environ = Environ::build(&request, &self.server, body.clone());

        self.elements.clear();
        self.request = Some(request);
        self.body = Some(body);
        self.request_state = RequestState::ReadingBody;

        self.read_body(&leftover);
        if self.response.borrow().is_finished() {
            return;
        }

        let start_response = StartResponse::new(self.response.clone());
        let send_body = SendBody::new(self.response.clone());
        self.app.call(environ, start_response, send_body);
    }

    /// Single pass over the accumulated elements.
    fn assemble_request(&self) -> Result<(Request, Bytes), ProtocolError> {
        let mut builder = RequestBuilder::new();
        let mut leftover = Bytes::new();

        for element in &self.elements {
            match element {
                Element::Head {
                    method,
                    path,
                    version,
                } => {
                    // An empty token counts as missing.
                    if method.is_empty() || path.is_empty() || version.is_empty() {
                        return Err(ProtocolError::MissingRequestLine);
                    }
                    builder = builder
                        .method(Method::from_token(method))
                        .path(path.as_str())
                        .version(version.as_str());
                }
                Element::Header(key, value) => builder = builder.header(key.as_str(), value.as_str()),
                Element::End(rest) => leftover = rest.clone(),
            }
        }

        let request = builder.build().map_err(|_| ProtocolError::MissingRequestLine)?;
        Ok((request, leftover))
    }

    fn read_body(&mut self, data: &[u8]) {
        let Some(body) = &self.body else {
            return;
        };

        match body.deliver(data) {
            Delivery::Partial => {
                tracing::trace!(received = body.len(), expected = body.expected(), "Request body chunk");
            }
            Delivery::Complete => {
                if !data.is_empty() {
                    tracing::debug!(len = body.len(), "Request body complete");
                }
            }
            Delivery::Overflow => {
                let expected = body.expected();
                self.protocol_error(ProtocolError::BodyOverflow { expected });
            }
        }
    }

    fn protocol_error(&mut self, error: ProtocolError) {
        let active = self.event_loop.upgrade().map(|l| l.active_connections());
        tracing::error!(
            error = %error,
            state = ?self.request_state,
            active_connections = ?active,
            "Protocol error, closing connection"
        );
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(body) = &self.body {
            body.abort();
        }
        self.response.borrow_mut().abort();
    }
}

impl Protocol for Connection {
    fn data_received(&mut self, data: &[u8]) {
        if self.released || self.response.borrow().is_finished() {
            tracing::trace!(len = data.len(), "Data after close ignored");
            return;
        }

        match self.request_state {
            RequestState::ParsingHeader => self.parse_header(data),
            RequestState::ReadingBody => self.read_body(data),
        }
    }

    fn connection_lost(&mut self, reason: CloseReason) {
        if self.released {
            return;
        }
        self.released = true;

        let completed = self.response.borrow().is_complete();
        if completed {
            tracing::debug!(reason = %reason, "Connection closed");
        } else if self.request.is_some() {
            tracing::warn!(
                reason = %reason,
                response = ?self.response_state(),
                "Connection closed before the response finished"
            );
        } else {
            tracing::debug!(reason = %reason, "Connection closed before a request arrived");
        }

        self.abort();
        self.request = None;
        self.body = None;
        self.elements.clear();

        if let Some(event_loop) = self.event_loop.upgrade() {
            tracing::trace!(active_connections = event_loop.active_connections(), "Connection released");
        }
    }
}

/// Declared body length of a request.
fn body_length(request: &Request) -> Result<usize, ProtocolError> {
    if let Some(encoding) = request.header("Transfer-Encoding") {
        return Err(ProtocolError::UnsupportedTransferEncoding(encoding.to_string()));
    }

    request
        .content_length()
        .map_err(|e| ProtocolError::InvalidContentLength(e.0))
}
