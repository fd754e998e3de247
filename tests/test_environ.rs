use wicket::http::body::RequestBody;
use wicket::http::environ::{EnvValue, Environ, ServerInfo};
use wicket::http::request::{Method, RequestBuilder};

fn server_info(remote_addr: Option<&str>) -> ServerInfo {
    ServerInfo {
        server_name: "example.org".to_string(),
        server_port: 8080,
        server_software: "test-server/1.0".to_string(),
        remote_addr: remote_addr.map(str::to_string),
    }
}

fn build(request_headers: &[(&str, &str)], path: &str) -> Environ {
    let mut builder = RequestBuilder::new()
        .method(Method::POST)
        .path(path)
        .version("HTTP/1.1");
    for (k, v) in request_headers {
        builder = builder.header(*k, *v);
    }
    let request = builder.build().unwrap();
    Environ::build(&request, &server_info(Some("10.0.0.1")), RequestBody::new(0))
}

#[test]
fn test_environ_request_keys() {
    let env = build(&[("Host", "example.org")], "/a/b?x=1");

    assert_eq!(env.get_str("REQUEST_METHOD"), Some("POST"));
    assert_eq!(env.get_str("REQUEST_URI"), Some("/a/b?x=1"));
    assert_eq!(env.get_str("PATH_INFO"), Some("/a/b"));
    assert_eq!(env.get_str("QUERY_STRING"), Some("x=1"));
    assert_eq!(env.get_str("SCRIPT_NAME"), Some(""));
    assert_eq!(env.get_str("SERVER_PROTOCOL"), Some("HTTP/1.1"));
    assert_eq!(env.get_str("HTTP_HOST"), Some("example.org"));
}

#[test]
fn test_environ_server_keys() {
    let env = build(&[], "/");

    assert_eq!(env.get_str("SERVER_NAME"), Some("example.org"));
    assert_eq!(env.get_str("SERVER_PORT"), Some("8080"));
    assert_eq!(env.get_str("SERVER_SOFTWARE"), Some("test-server/1.0"));
    assert_eq!(env.get_str("REMOTE_ADDR"), Some("10.0.0.1"));
}

#[test]
fn test_environ_contract_metadata_always_present() {
    let env = build(&[], "/");

    for key in [
        "CONTENT_TYPE",
        "CONTENT_LENGTH",
        "RAW_HEADERS",
        "wsgi.version",
        "wsgi.url_scheme",
        "wsgi.multithread",
        "wsgi.multiprocess",
        "wsgi.run_once",
        "wsgi.input",
        "wsgi.errors",
    ] {
        assert!(env.contains_key(key), "missing {}", key);
    }

    assert_eq!(env.get_str("CONTENT_TYPE"), Some(""));
    assert_eq!(env.get_str("CONTENT_LENGTH"), Some(""));
    assert_eq!(env.get_str("wsgi.url_scheme"), Some("http"));
    assert!(matches!(env.get("wsgi.version"), Some(EnvValue::Version(1, 0))));
    assert_eq!(env.get("wsgi.multithread").and_then(EnvValue::as_bool), Some(false));
    assert_eq!(env.get("wsgi.multiprocess").and_then(EnvValue::as_bool), Some(false));
    assert_eq!(env.get("wsgi.run_once").and_then(EnvValue::as_bool), Some(false));
    assert!(env.input().is_some());
    assert!(env.errors().is_some());
}

#[test]
fn test_environ_missing_remote_addr_is_empty() {
    let request = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .version("HTTP/1.0")
        .build()
        .unwrap();
    let env = Environ::build(&request, &server_info(None), RequestBody::new(0));

    assert_eq!(env.get_str("REMOTE_ADDR"), Some(""));
}

#[test]
fn test_environ_content_headers_are_unprefixed() {
    let env = build(&[("content-type", "application/json"), ("Content-Length", "12")], "/");

    assert_eq!(env.get_str("CONTENT_TYPE"), Some("application/json"));
    assert_eq!(env.get_str("CONTENT_LENGTH"), Some("12"));
    assert!(!env.contains_key("HTTP_CONTENT_TYPE"));
    assert!(!env.contains_key("HTTP_CONTENT_LENGTH"));
}

#[test]
fn test_environ_duplicate_headers_are_joined() {
    let env = build(&[("Accept", "text/html"), ("X-Forwarded-For", "1.1.1.1"), ("accept", "*/*")], "/");

    assert_eq!(env.get_str("HTTP_ACCEPT"), Some("text/html,*/*"));
    assert_eq!(env.get_str("HTTP_X_FORWARDED_FOR"), Some("1.1.1.1"));
}

#[test]
fn test_environ_raw_headers_keep_order() {
    let env = build(&[("B", "2"), ("A", "1"), ("B", "3")], "/");

    assert_eq!(
        env.raw_headers(),
        &[
            ("B".to_string(), "2".to_string()),
            ("A".to_string(), "1".to_string()),
            ("B".to_string(), "3".to_string()),
        ]
    );
}
