use conduit_core::{ApiConfig, ClientConfig, User};

#[test]
fn config_round_trips_and_fills_defaults() {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "conduit_config_{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let path = dir.join("config.json");

    let mut config = ClientConfig::default();
    config.api.base_url = "http://localhost:3000/api".into();
    config.session = Some(User {
        username: "alice".into(),
        email: String::new(),
        token: "jwt".into(),
        image: None,
    });
    config.save_to(&path).unwrap();
    assert_eq!(ClientConfig::load_from(&path).unwrap(), config);

    std::fs::write(&path, r#"{"feed":{"fetch_delay_ms":0}}"#).unwrap();
    let partial = ClientConfig::load_from(&path).unwrap();
    assert_eq!(partial.feed.fetch_delay_ms, 0);
    assert_eq!(partial.api, ApiConfig::default());
    assert!(partial.session.is_none());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn malformed_config_is_not_overwritten() {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "conduit_config_bad_{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");
    let broken = r#"{"session":{"username":"alice","token":"jwt""#;
    std::fs::write(&path, broken).unwrap();

    let config = ClientConfig::load_or_default(&path);
    assert_eq!(config, ClientConfig::default());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), broken);

    let missing = dir.join("fresh.json");
    assert_eq!(ClientConfig::load_or_default(&missing), ClientConfig::default());
    assert_eq!(ClientConfig::load_from(&missing).unwrap(), ClientConfig::default());

    let _ = std::fs::remove_dir_all(&dir);
}
