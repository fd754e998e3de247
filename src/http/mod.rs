//! HTTP protocol implementation.
//!
//! This module implements the per-connection HTTP/1.1 engine. Every
//! connection serves exactly one request and is closed after the response.
//!
//! # Architecture
//!
//! - **`parser`**: Incremental tokenizer turning raw bytes into request-head elements
//! - **`request`**: HTTP request representation and header lookup
//! - **`body`**: Request body buffer shared with the application
//! - **`environ`**: The WSGI-style environment handed to applications
//! - **`application`**: The application contract and the response state machine
//! - **`response`**: Status codes and response head validation
//! - **`writer`**: Serializes response heads
//! - **`transport`**: Byte-level boundary to the socket
//! - **`connection`**: The request state machine tying it all together
//!
//! # Connection State Machines
//!
//! The request and response halves move independently and never go back:
//!
//! ```text
//!   request half                         response half
//!  ┌───────────────┐                   ┌───────────────┐
//!  │ ParsingHeader │ ← feed tokenizer  │ SendingHeader │ ← wait for start_response
//!  └──────┬────────┘                   └──────┬────────┘
//!         │ End element                       │ start_response
//!         │ (application invoked)             ▼
//!         ▼                            ┌───────────────┐
//!  ┌───────────────┐                   │  SendingBody  │ ← send_body(chunk)...
//!  │  ReadingBody  │ ← Content-Length  └──────┬────────┘
//!  └───────────────┘                          │ send_body(empty)
//!                                             ▼
//!                                       transport closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use wicket::http::application::{SendBody, StartResponse};
//! use wicket::http::environ::Environ;
//!
//! let app = Rc::new(|_env: Environ, start: StartResponse, body: SendBody| {
//!     start.start("200 OK", [("Content-Type", "text/plain")]);
//!     body.send("hi");
//!     body.finish();
//! });
//! ```

pub mod application;
pub mod body;
pub mod connection;
pub mod environ;
pub mod parser;
pub mod request;
pub mod response;
pub mod transport;
pub mod writer;
