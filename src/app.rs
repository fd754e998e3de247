//! Built-in demo application.

use crate::http::application::{Application, SendBody, StartResponse};
use crate::http::environ::Environ;
use crate::http::response::StatusCode;

/// Replies with a plain-text summary of the request.
///
/// The reply waits for the full request body, so it runs in a local task
/// and answers through the handles after `call` has returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct Echo;

impl Application for Echo {
    fn call(&self, environ: Environ, start_response: StartResponse, send_body: SendBody) {
        let Some(input) = environ.input().cloned() else {
            start_response.start(StatusCode::InternalServerError, [("Content-Length", "0")]);
            send_body.finish();
            return;
        };

        let method = environ.get_str("REQUEST_METHOD").unwrap_or_default().to_string();
        let path = environ.get_str("PATH_INFO").unwrap_or_default().to_string();

        tokio::task::spawn_local(async move {
            let Some(body) = input.read_to_end().await else {
                tracing::debug!(path = %path, "Request aborted before the body arrived");
                return;
            };

            let reply = format!("{} {} ({} body bytes)\n", method, path, body.len());
            let length = reply.len().to_string();
            start_response.start(
                StatusCode::Ok,
                [
                    ("Content-Type", "text/plain; charset=utf-8"),
                    ("Content-Length", length.as_str()),
                ],
            );
            send_body.send(reply);
            send_body.finish();
        });
    }
}
