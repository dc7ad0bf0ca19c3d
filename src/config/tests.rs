use super::*;

#[test]
fn defaults_resolve_without_any_source() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.to_string(), "127.0.0.1:8000");
    assert_eq!(settings.server.graceful_shutdown, Duration::from_secs(30));
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert!(settings.database.url.is_none());
    assert_eq!(settings.database.max_connections.get(), 8);
    assert!(settings.cache.redis_url.is_none());
    assert_eq!(settings.cache.ttl, Duration::from_secs(3600));
    assert_eq!(settings.cache.invalidation, InvalidationMode::Pattern);
    assert!(settings.cache.response_timeout.is_none());
    assert_eq!(settings.cache.memory_capacity.get(), 10_000);
    assert_eq!(
        settings.server.cors_origins,
        vec!["http://localhost", "http://localhost:8080"]
    );
    assert_eq!(settings.auth.token_ttl, Duration::from_secs(30 * 60));
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());
    raw.cache.invalidation = Some("pattern".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        cache_invalidation: Some("exact".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.cache.invalidation, InvalidationMode::Exact);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn blank_urls_are_treated_as_absent() {
    let mut raw = RawSettings::default();
    raw.database.url = Some("   ".to_string());
    raw.cache.redis_url = Some(String::new());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.database.url.is_none());
    assert!(settings.cache.redis_url.is_none());
}

#[test]
fn zero_ttl_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.ttl_seconds = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero ttl");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.ttl_seconds",
            ..
        }
    ));
}

#[test]
fn unknown_invalidation_mode_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.invalidation = Some("prefix".to_string());

    let err = Settings::from_raw(raw).expect_err("bad mode");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.invalidation",
            ..
        }
    ));
}

#[test]
fn cache_timeouts_are_milliseconds() {
    let mut raw = RawSettings::default();
    raw.cache.response_timeout_ms = Some(250);
    raw.cache.connection_timeout_ms = Some(1500);

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(
        settings.cache.response_timeout,
        Some(Duration::from_millis(250))
    );
    assert_eq!(
        settings.cache.connection_timeout,
        Some(Duration::from_millis(1500))
    );
}

#[test]
fn zero_port_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(0);

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn auth_secret_is_redacted_in_debug_output() {
    let mut raw = RawSettings::default();
    raw.auth.jwt_secret = Some("hunter2".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    let rendered = format!("{:?}", settings.auth);
    assert!(!rendered.contains("hunter2"));
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["blogline"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "blogline",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--database-url",
        "postgres://override",
        "--cache-invalidation",
        "exact",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.database_url.as_deref(),
                Some("postgres://override")
            );
            assert_eq!(serve.overrides.cache_invalidation.as_deref(), Some("exact"));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_issue_token_arguments() {
    let args = CliArgs::parse_from([
        "blogline",
        "issue-token",
        "--user-id",
        "42",
        "--ttl-minutes",
        "5",
    ]);

    match args.command.expect("issue-token command") {
        Command::IssueToken(issue) => {
            assert_eq!(issue.user_id, 42);
            assert_eq!(issue.ttl_minutes, Some(5));
            assert!(issue.auth_jwt_secret.is_none());
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn issue_token_ttl_overrides_configured_lifetime() {
    let mut raw = RawSettings::default();
    raw.auth.token_ttl_minutes = Some(30);

    let args = IssueTokenArgs {
        user_id: 1,
        ttl_minutes: Some(5),
        auth_jwt_secret: Some("secret".to_string()),
    };
    raw.apply_issue_token_overrides(&args);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.auth.token_ttl, Duration::from_secs(300));
    assert_eq!(settings.auth.jwt_secret.as_deref(), Some("secret"));
}

#[test]
fn zero_memory_capacity_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.memory_capacity = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero capacity");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.memory_capacity",
            ..
        }
    ));
}

#[test]
fn cors_origins_override_replaces_defaults() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        server_cors_origins: vec!["https://blog.example".to_string(), " ".to_string()],
        cache_memory_capacity: Some(64),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.cors_origins, vec!["https://blog.example"]);
    assert_eq!(settings.cache.memory_capacity.get(), 64);
}

#[test]
fn invalid_cors_origin_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.cors_origins = Some(vec!["http://bad\norigin".to_string()]);

    let err = Settings::from_raw(raw).expect_err("control characters");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "server.cors_origins",
            ..
        }
    ));
}

#[test]
fn wildcard_cors_origin_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.cors_origins = Some(vec!["*".to_string()]);

    let err = Settings::from_raw(raw).expect_err("wildcard with credentials");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "server.cors_origins",
            ..
        }
    ));
}
