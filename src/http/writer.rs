use crate::http::response::ResponseHead;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Serializes a response head: status line, one line per header, blank line.
pub fn serialize_head(head: &ResponseHead) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128);

    // Status line
    buf.extend_from_slice(HTTP_VERSION.as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(head.status.as_bytes());
    buf.extend_from_slice(b"\r\n");

    // Headers
    for (k, v) in &head.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_without_headers_still_ends_with_blank_line() {
        let head = ResponseHead::new("204 No Content", Vec::new()).unwrap();
        assert_eq!(serialize_head(&head), b"HTTP/1.1 204 No Content\r\n\r\n".to_vec());
    }
}
