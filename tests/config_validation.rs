//! Config Loading & Validation Tests

use std::io::Write;

use whalesafe_gateway::config::{ConfigError, GatewayConfig};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// A partial file fills the rest from defaults.
#[test]
fn partial_file_fills_defaults() {
    let file = write_config(
        r#"
[query]
max_results = 50

[cache]
zone_ttl_secs = 45
"#,
    );
    let config = GatewayConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.query.max_results, 50);
    assert_eq!(config.cache.zone_ttl_secs, 45);
    // Untouched sections keep their defaults.
    assert_eq!(config.cache.status_ttl_secs, 0);
    assert_eq!(config.query.max_minutes_back, 720);
    assert_eq!(config.server.port, 8080);
}

/// An empty file is entirely defaults, and defaults validate.
#[test]
fn empty_file_is_all_defaults() {
    let file = write_config("");
    let config = GatewayConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.query.max_results, 200);
    assert!(config.risk.base_url.is_none());
}

/// Validation names the offending key.
#[test]
fn zero_max_results_is_rejected_with_key_name() {
    let file = write_config("[query]\nmax_results = 0\n");
    let err = GatewayConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("max_results"));
}

#[test]
fn minutes_back_ceiling_below_floor_is_rejected() {
    let file = write_config("[query]\nmax_minutes_back = 30\n");
    let err = GatewayConfig::load_from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("max_minutes_back"));
}

#[test]
fn negative_span_cap_is_rejected() {
    let file = write_config("[query]\nmax_lat_span_deg = -1.0\n");
    assert!(GatewayConfig::load_from_file(file.path()).is_err());
}

/// Risk service URL must be http(s) when present.
#[test]
fn risk_url_scheme_is_validated() {
    let file = write_config("[risk]\nbase_url = \"redis://nope\"\n");
    let err = GatewayConfig::load_from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("risk.base_url"));

    let file = write_config("[risk]\nbase_url = \"http://scorer:5000\"\n");
    let config = GatewayConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.risk.base_url.as_deref(), Some("http://scorer:5000"));
}

/// Unparseable TOML is a parse error, not a panic.
#[test]
fn malformed_toml_is_a_parse_error() {
    let file = write_config("[query\nmax_results = ");
    let err = GatewayConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_, _)));
}

/// A missing file is an IO error carrying the path.
#[test]
fn missing_file_is_an_io_error() {
    let err =
        GatewayConfig::load_from_file(std::path::Path::new("/nonexistent/gateway.toml"))
            .unwrap_err();
    assert!(matches!(err, ConfigError::Io(_, _)));
}
