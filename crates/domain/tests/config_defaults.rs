use gl_domain::config::{Config, ConfigSeverity};

#[test]
fn defaults_match_documented_timings() {
    let config = Config::default();
    assert_eq!(config.run.poll_interval_ms, 800);
    assert_eq!(config.run.budget_ms, 60_000);
    assert_eq!(config.run.membership_index_ttl_secs, 60);
    assert_eq!(config.run.message_page, 20);
}

#[test]
fn empty_toml_yields_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.server.port, 3210);
    assert_eq!(config.upstream.api_key_env, "GROUNDLINE_API_KEY");
    assert!(config.mirror.root.is_none());
}

#[test]
fn partial_section_keeps_other_defaults() {
    let toml_str = r#"
[upstream]
base_url = "https://backend.internal/v1"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.upstream.base_url, "https://backend.internal/v1");
    assert_eq!(config.upstream.model, "gpt-4o");
    assert_eq!(config.run.poll_interval_ms, 800);
}

#[test]
fn mirror_root_parses() {
    let toml_str = r#"
[mirror]
root = "./data/mirror"
key_prefix = "docs"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert!(config.mirror.root.is_some());
    assert_eq!(config.mirror.key_prefix, "docs");
}

#[test]
fn zero_poll_interval_is_a_validation_error() {
    let config: Config = toml::from_str(
        r#"
[run]
poll_interval_ms = 0
"#,
    )
    .unwrap();
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|i| i.severity == ConfigSeverity::Error
            && i.message.contains("poll_interval_ms")));
}

#[test]
fn short_budget_is_a_warning_not_an_error() {
    let config: Config = toml::from_str(
        r#"
[run]
poll_interval_ms = 800
budget_ms = 100
"#,
    )
    .unwrap();
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|i| i.severity == ConfigSeverity::Warning && i.message.contains("budget_ms")));
    assert!(!issues
        .iter()
        .any(|i| i.severity == ConfigSeverity::Error && i.message.contains("budget_ms")));
}
