//! The environment handed to applications.
//!
//! Modelled on the WSGI environ: CGI-style upper-case keys for request and
//! server facts, `wsgi.*` keys for contract metadata. Every key is present on
//! every request, with an empty string standing in for facts that are absent.

use std::collections::HashMap;
use std::collections::hash_map;

use crate::http::body::RequestBody;
use crate::http::request::Request;

/// Connection-level facts that go into every environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub server_name: String,
    pub server_port: u16,
    /// Used for `SERVER_SOFTWARE` and the default `Server` response header.
    pub server_software: String,
    pub remote_addr: Option<String>,
}

/// Destination for `wsgi.errors`; every write goes to the log.
#[derive(Debug, Clone, Default)]
pub struct ErrorStream;

impl ErrorStream {
    pub fn write(&self, message: &str) {
        tracing::error!(target: "wicket::app", "{}", message.trim_end());
    }
}

/// A single environment value.
#[derive(Debug, Clone)]
pub enum EnvValue {
    Str(String),
    Bool(bool),
    Version(u32, u32),
    Headers(Vec<(String, String)>),
    Input(RequestBody),
    Errors(ErrorStream),
}

impl EnvValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            EnvValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EnvValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// String-keyed request environment.
#[derive(Debug, Clone, Default)]
pub struct Environ {
    vars: HashMap<String, EnvValue>,
}

impl Environ {
    /// Builds the environment for one request.
    pub fn build(request: &Request, server: &ServerInfo, input: RequestBody) -> Self {
        let mut env = Environ::default();

        env.set_str("REQUEST_METHOD", request.method.as_str());
        env.set_str("REQUEST_URI", &request.path);
        env.set_str("PATH_INFO", request.path_info());
        env.set_str("QUERY_STRING", request.query_string());
        env.set_str("SCRIPT_NAME", "");
        env.set_str("SERVER_PROTOCOL", &request.version);
        env.set_str("SERVER_NAME", &server.server_name);
        env.set_str("SERVER_PORT", &server.server_port.to_string());
        env.set_str("SERVER_SOFTWARE", &server.server_software);
        env.set_str("REMOTE_ADDR", server.remote_addr.as_deref().unwrap_or(""));
        env.set_str("CONTENT_TYPE", request.header("Content-Type").unwrap_or(""));
        env.set_str("CONTENT_LENGTH", request.header("Content-Length").unwrap_or(""));

        for (key, value) in &request.headers {
            if key.eq_ignore_ascii_case("Content-Type") || key.eq_ignore_ascii_case("Content-Length") {
                continue;
            }
            let name = cgi_header_name(key);
            match env.vars.entry(name) {
                hash_map::Entry::Occupied(mut entry) => {
                    if let EnvValue::Str(existing) = entry.get_mut() {
                        existing.push(',');
                        existing.push_str(value);
                    }
                }
                hash_map::Entry::Vacant(entry) => {
                    entry.insert(EnvValue::Str(value.clone()));
                }
            }
        }

        env.set("RAW_HEADERS", EnvValue::Headers(request.headers.clone()));
        env.set("wsgi.version", EnvValue::Version(1, 0));
        env.set_str("wsgi.url_scheme", "http");
        env.set("wsgi.multithread", EnvValue::Bool(false));
        env.set("wsgi.multiprocess", EnvValue::Bool(false));
        env.set("wsgi.run_once", EnvValue::Bool(false));
        env.set("wsgi.input", EnvValue::Input(input));
        env.set("wsgi.errors", EnvValue::Errors(ErrorStream));

        env
    }

    pub fn get(&self, key: &str) -> Option<&EnvValue> {
        self.vars.get(key)
    }

    /// Looks up a string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(EnvValue::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: EnvValue) {
        self.vars.insert(key.into(), value);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// The request body handle.
    pub fn input(&self) -> Option<&RequestBody> {
        match self.get("wsgi.input") {
            Some(EnvValue::Input(body)) => Some(body),
            _ => None,
        }
    }

    pub fn errors(&self) -> Option<&ErrorStream> {
        match self.get("wsgi.errors") {
            Some(EnvValue::Errors(errors)) => Some(errors),
            _ => None,
        }
    }

    /// The ordered request headers as received.
    pub fn raw_headers(&self) -> &[(String, String)] {
        match self.get("RAW_HEADERS") {
            Some(EnvValue::Headers(headers)) => headers,
            _ => &[],
        }
    }

    fn set_str(&mut self, key: &str, value: &str) {
        self.set(key, EnvValue::Str(value.to_string()));
    }
}

/// `X-Forwarded-For` becomes `HTTP_X_FORWARDED_FOR`.
fn cgi_header_name(key: &str) -> String {
    let mut name = String::with_capacity(key.len() + 5);
    name.push_str("HTTP_");
    for c in key.chars() {
        name.push(if c == '-' { '_' } else { c.to_ascii_uppercase() });
    }
    name
}
