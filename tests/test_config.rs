use wicket::config::Config;

#[test]
fn test_config_listen_address_from_env() {
    // Both cases in one test, env vars are process-wide
    unsafe {
        std::env::remove_var("WICKET_CONFIG");
        std::env::remove_var("LISTEN");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.listen_addr, "127.0.0.1:8080");

    unsafe {
        std::env::set_var("LISTEN", "0.0.0.0:3000");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.listen_addr, "0.0.0.0:3000");
    unsafe {
        std::env::remove_var("LISTEN");
    }
}

#[test]
fn test_config_defaults() {
    let cfg = Config::default();
    assert_eq!(cfg.server_name, None);
    assert!(cfg.server_software.starts_with("wicket/"));
    assert_eq!(cfg.max_header_bytes, 64 * 1024);
}

#[test]
fn test_config_from_yaml() {
    let cfg = Config::from_yaml(
        "listen_addr: 0.0.0.0:5000\nserver_name: example.org\nserver_software: test/1.0\nmax_header_bytes: 8192\n",
    )
    .unwrap();

    assert_eq!(cfg.listen_addr, "0.0.0.0:5000");
    assert_eq!(cfg.server_name.as_deref(), Some("example.org"));
    assert_eq!(cfg.server_software, "test/1.0");
    assert_eq!(cfg.max_header_bytes, 8192);
}

#[test]
fn test_config_from_yaml_partial_uses_defaults() {
    let cfg = Config::from_yaml("server_software: partial/0.1\n").unwrap();

    assert_eq!(cfg.listen_addr, "127.0.0.1:8080");
    assert_eq!(cfg.server_software, "partial/0.1");
    assert_eq!(cfg.max_header_bytes, Config::default().max_header_bytes);
}

#[test]
fn test_config_from_yaml_rejects_unknown_keys() {
    assert!(Config::from_yaml("listen: 1.2.3.4:80\n").is_err());
}

#[test]
fn test_config_from_yaml_rejects_zero_header_limit() {
    assert!(Config::from_yaml("max_header_bytes: 0\n").is_err());
}

#[test]
fn test_config_from_missing_file() {
    assert!(Config::from_file("/nonexistent/wicket.yaml").is_err());
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::default();
    let cfg2 = cfg1.clone();
    assert_eq!(cfg1, cfg2);
}
