use wicket::http::request::{HeaderList, Method, Request, RequestBuilder};

fn request_with_headers(headers: &[(&str, &str)]) -> Request {
    Request {
        method: Method::POST,
        path: "/api".to_string(),
        version: "HTTP/1.1".to_string(),
        headers: headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

#[test]
fn test_method_from_token() {
    let methods = vec![
        ("GET", Method::GET),
        ("POST", Method::POST),
        ("PUT", Method::PUT),
        ("DELETE", Method::DELETE),
        ("HEAD", Method::HEAD),
        ("OPTIONS", Method::OPTIONS),
        ("PATCH", Method::PATCH),
        ("CONNECT", Method::CONNECT),
        ("TRACE", Method::TRACE),
    ];

    for (token, expected) in methods {
        let method = Method::from_token(token);
        assert_eq!(method, expected);
        assert_eq!(method.as_str(), token);
    }
}

#[test]
fn test_method_other_keeps_raw_token() {
    let method = Method::from_token("PROPFIND");
    assert_eq!(method, Method::Other("PROPFIND".to_string()));
    assert_eq!(method.as_str(), "PROPFIND");
}

#[test]
fn test_request_header_retrieval() {
    let req = request_with_headers(&[("Host", "example.com"), ("Content-Type", "application/json")]);

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_header_list_first_match_wins() {
    let headers = vec![
        ("X-Tag".to_string(), "first".to_string()),
        ("x-tag".to_string(), "second".to_string()),
    ];
    let list = HeaderList::new(&headers);

    assert_eq!(list.get("X-TAG"), Some("first"));
    assert!(list.contains("x-tag"));
    assert!(!list.contains("Server"));
}

#[test]
fn test_request_content_length_parsing() {
    let req = request_with_headers(&[("Content-Length", "42")]);
    assert_eq!(req.content_length(), Ok(42));
}

#[test]
fn test_request_content_length_missing() {
    let req = request_with_headers(&[]);
    assert_eq!(req.content_length(), Ok(0));
}

#[test]
fn test_request_content_length_invalid() {
    let req = request_with_headers(&[("Content-Length", "not-a-number")]);
    assert!(req.content_length().is_err());
}

#[test]
fn test_request_content_length_rejects_signs_and_blanks() {
    for value in ["+3", "-3", "", "3 4", "0x10"] {
        let req = request_with_headers(&[("Content-Length", value)]);
        assert!(req.content_length().is_err(), "accepted {:?}", value);
    }
}

#[test]
fn test_request_content_length_rejects_overflow() {
    let req = request_with_headers(&[("Content-Length", "99999999999999999999999999")]);
    assert!(req.content_length().is_err());
}

#[test]
fn test_request_content_length_conflicting_duplicates() {
    let req = request_with_headers(&[("Content-Length", "3"), ("content-length", "10")]);
    let err = req.content_length().unwrap_err();
    assert_eq!(err.0, "3, 10");
}

#[test]
fn test_request_content_length_identical_duplicates() {
    let req = request_with_headers(&[("Content-Length", "5"), ("Content-Length", "5")]);
    assert_eq!(req.content_length(), Ok(5));
}

#[test]
fn test_request_path_and_query() {
    let mut req = request_with_headers(&[]);
    req.path = "/search?q=rust&page=2".to_string();

    assert_eq!(req.path_info(), "/search");
    assert_eq!(req.query_string(), "q=rust&page=2");

    req.path = "/plain".to_string();
    assert_eq!(req.path_info(), "/plain");
    assert_eq!(req.query_string(), "");
}

#[test]
fn test_request_builder_basic() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/hello")
        .version("HTTP/1.1")
        .header("Host", "x")
        .header("Host", "y")
        .build()
        .unwrap();

    assert_eq!(req.method, Method::GET);
    assert_eq!(req.path, "/hello");
    assert_eq!(
        req.headers,
        vec![
            ("Host".to_string(), "x".to_string()),
            ("Host".to_string(), "y".to_string()),
        ]
    );
}

#[test]
fn test_request_builder_missing_method() {
    let result = RequestBuilder::new().path("/").version("HTTP/1.1").build();
    assert_eq!(result.unwrap_err(), "method missing");
}

#[test]
fn test_request_builder_missing_version() {
    let result = RequestBuilder::new().method(Method::GET).path("/").build();
    assert_eq!(result.unwrap_err(), "version missing");
}
