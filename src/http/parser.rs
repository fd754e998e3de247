use std::fmt;

use bytes::{Bytes, BytesMut};

/// Default ceiling for the request line plus header section.
pub const DEFAULT_MAX_HEADER_BYTES: usize = 64 * 1024;

/// A structural element of an HTTP request head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// The request line.
    Head {
        method: String,
        path: String,
        version: String,
    },
    /// One header field, name and value trimmed.
    Header(String, String),
    /// End of the header section, with whatever body bytes followed it.
    End(Bytes),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    InvalidRequestLine,
    InvalidHeader,
    InvalidEncoding,
    HeadersTooLarge,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidRequestLine => write!(f, "malformed request line"),
            ParseError::InvalidHeader => write!(f, "malformed header field"),
            ParseError::InvalidEncoding => write!(f, "request head is not valid UTF-8"),
            ParseError::HeadersTooLarge => write!(f, "request head too large"),
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    RequestLine,
    Headers,
    Done,
}

/// Incremental tokenizer for an HTTP/1.x request head.
///
/// Bytes may arrive in arbitrary chunks; incomplete lines are buffered until
/// their terminating newline shows up, so splitting a stream differently
/// never changes the elements produced. One instance serves exactly one
/// request.
#[derive(Debug)]
pub struct HeaderParser {
    buffer: BytesMut,
    stage: Stage,
    consumed: usize,
    max_header_bytes: usize,
}

impl HeaderParser {
    pub fn new(max_header_bytes: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            stage: Stage::RequestLine,
            consumed: 0,
            max_header_bytes,
        }
    }

    /// Whether the end of the header section has been seen.
    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    /// Feeds a chunk and returns the elements it completed.
    ///
    /// After an error the parser must be discarded.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Element>, ParseError> {
        let mut elements = Vec::new();

        if self.stage == Stage::Done {
            return Ok(elements);
        }

        self.buffer.extend_from_slice(chunk);

        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw = self.buffer.split_to(newline + 1);
            self.consumed += raw.len();
            if self.consumed > self.max_header_bytes {
                return Err(ParseError::HeadersTooLarge);
            }

            let line = strip_line_ending(&raw);
            let line = std::str::from_utf8(line).map_err(|_| ParseError::InvalidEncoding)?;

            match self.stage {
                Stage::RequestLine => {
                    // Tolerate stray empty lines ahead of the request line.
                    if line.is_empty() {
                        continue;
                    }
                    elements.push(parse_request_line(line)?);
                    self.stage = Stage::Headers;
                }
                Stage::Headers => {
                    if line.is_empty() {
                        let leftover = self.buffer.split().freeze();
                        elements.push(Element::End(leftover));
                        self.stage = Stage::Done;
                        return Ok(elements);
                    }
                    elements.push(parse_header(line)?);
                }
                Stage::Done => break,
            }
        }

        if self.consumed + self.buffer.len() > self.max_header_bytes {
            return Err(ParseError::HeadersTooLarge);
        }

        Ok(elements)
    }
}

impl Default for HeaderParser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HEADER_BYTES)
    }
}

fn strip_line_ending(raw: &[u8]) -> &[u8] {
    let line = &raw[..raw.len() - 1];
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn parse_request_line(line: &str) -> Result<Element, ParseError> {
    let mut parts = line.split_whitespace();

    let method = parts.next().ok_or(ParseError::InvalidRequestLine)?;
    let path = parts.next().ok_or(ParseError::InvalidRequestLine)?;
    let version = parts.next().ok_or(ParseError::InvalidRequestLine)?;

    if parts.next().is_some() || !version.starts_with("HTTP/") {
        return Err(ParseError::InvalidRequestLine);
    }

    Ok(Element::Head {
        method: method.to_string(),
        path: path.to_string(),
        version: version.to_string(),
    })
}

fn parse_header(line: &str) -> Result<Element, ParseError> {
    let (key, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;

    // No whitespace allowed around or inside the field name.
    if key.is_empty() || key.contains(char::is_whitespace) {
        return Err(ParseError::InvalidHeader);
    }

    Ok(Element::Header(key.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let mut parser = HeaderParser::default();
        let elements = parser
            .feed(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n")
            .unwrap();

        assert_eq!(
            elements,
            vec![
                Element::Head {
                    method: "GET".into(),
                    path: "/".into(),
                    version: "HTTP/1.1".into(),
                },
                Element::Header("Host".into(), "example.com".into()),
                Element::End(Bytes::new()),
            ]
        );
        assert!(parser.is_done());
    }

    #[test]
    fn partial_line_is_held_back() {
        let mut parser = HeaderParser::default();

        assert!(parser.feed(b"GET /a HT").unwrap().is_empty());
        let elements = parser.feed(b"TP/1.1\r\nHo").unwrap();
        assert_eq!(elements.len(), 1);
        assert!(!parser.is_done());
    }
}
