//! The application contract and the response half of a connection.
//!
//! An application is invoked once per request with the environment and two
//! handles. `StartResponse` sends the status line and headers exactly once;
//! `SendBody` then streams body bytes, and an empty chunk ends the response
//! and closes the connection. Handles are cheap to clone and may be kept
//! past the call, e.g. by a task that waits for the request body.

use std::cell::RefCell;
use std::rc::Rc;

use bytes::Bytes;

use crate::http::environ::Environ;
use crate::http::response::ResponseHead;
use crate::http::transport::Transport;
use crate::http::writer::serialize_head;

/// Per-request application callback.
pub trait Application {
    fn call(&self, environ: Environ, start_response: StartResponse, send_body: SendBody);
}

impl<F> Application for F
where
    F: Fn(Environ, StartResponse, SendBody),
{
    fn call(&self, environ: Environ, start_response: StartResponse, send_body: SendBody) {
        self(environ, start_response, send_body)
    }
}

/// Where the response half of a connection is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseState {
    SendingHeader,
    SendingBody,
}

pub(crate) struct ResponseHalf {
    state: ResponseState,
    /// No further writes: the body terminator went out or the exchange was torn down.
    finished: bool,
    completed: bool,
    transport_closed: bool,
    transport: Rc<dyn Transport>,
    server_software: String,
}

impl ResponseHalf {
    pub(crate) fn new(transport: Rc<dyn Transport>, server_software: String) -> Self {
        Self {
            state: ResponseState::SendingHeader,
            finished: false,
            completed: false,
            transport_closed: false,
            transport,
            server_software,
        }
    }

    pub(crate) fn state(&self) -> ResponseState {
        self.state
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    /// True once the empty-chunk terminator has been accepted.
    pub(crate) fn is_complete(&self) -> bool {
        self.completed
    }

    /// Stops accepting application calls and closes the transport.
    pub(crate) fn abort(&mut self) {
        self.finished = true;
        self.close_transport();
    }

    fn close_transport(&mut self) {
        if !self.transport_closed {
            self.transport_closed = true;
            self.transport.close();
        }
    }

    fn start_response(&mut self, status: String, headers: Vec<(String, String)>) {
        if self.finished {
            tracing::warn!(status = %status, "start_response after the exchange ended, ignored");
            return;
        }
        if self.state != ResponseState::SendingHeader {
            tracing::error!(status = %status, "start_response called twice, ignored");
            return;
        }

        let head = match ResponseHead::new(status, headers) {
            Ok(head) => head.with_defaults(&self.server_software),
            Err(e) => {
                tracing::error!(error = %e, "start_response rejected");
                return;
            }
        };

        tracing::debug!(status = %head.status, headers = head.headers.len(), "Sending response head");
        self.transport.write(Bytes::from(serialize_head(&head)));
        self.state = ResponseState::SendingBody;
    }

    fn send_body(&mut self, data: Bytes) {
        if self.finished {
            tracing::warn!(len = data.len(), "send_body after the exchange ended, ignored");
            return;
        }
        if self.state != ResponseState::SendingBody {
            tracing::error!(len = data.len(), "send_body called before start_response, ignored");
            return;
        }

        if data.is_empty() {
            tracing::debug!("Response complete, closing");
            self.finished = true;
            self.completed = true;
            self.close_transport();
        } else {
            self.transport.write(data);
        }
    }
}

/// Handle for sending the response status and headers.
#[derive(Clone)]
pub struct StartResponse {
    half: Rc<RefCell<ResponseHalf>>,
}

impl StartResponse {
    pub(crate) fn new(half: Rc<RefCell<ResponseHalf>>) -> Self {
        Self { half }
    }

    /// Sends `HTTP/1.1 <status>` and the headers.
    ///
    /// `Connection: close` and a `Server` header are appended when missing.
    /// A second call, or a call with a malformed status or header, is logged
    /// and ignored.
    pub fn start<K, V>(&self, status: impl ToString, headers: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.half.borrow_mut().start_response(status.to_string(), headers);
    }
}

/// Handle for streaming the response body.
#[derive(Clone)]
pub struct SendBody {
    half: Rc<RefCell<ResponseHalf>>,
}

impl SendBody {
    pub(crate) fn new(half: Rc<RefCell<ResponseHalf>>) -> Self {
        Self { half }
    }

    /// Writes a body chunk; an empty chunk ends the response.
    pub fn send(&self, data: impl Into<Bytes>) {
        self.half.borrow_mut().send_body(data.into());
    }

    /// Ends the response. Same as sending an empty chunk.
    pub fn finish(&self) {
        self.send(Bytes::new());
    }
}
