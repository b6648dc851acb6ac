//! Configuration loading tests.
//!
//! Verifies secret handling across config layers.

use gangway::config::ConfigLoader;

/// The config loader strips `jwt_secret` from TOML files before applying
/// environment / CLI overrides.
#[test]
fn jwt_secret_stripped_from_config_file() {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[auth]
jwt_secret = "should_be_stripped"
token_expiry_days = 7
"#
    )
    .unwrap();

    let loader = ConfigLoader::new("CFGTEST");
    let config = loader
        .load(Some(file.path()), None, None, Some("cli_override_secret"))
        .unwrap();
    assert_eq!(
        config.auth.jwt_secret, "cli_override_secret",
        "CLI secret must override file secret"
    );
    assert_eq!(config.auth.token_expiry_days, 7);
}

/// A file secret alone is never enough to start.
#[test]
fn file_secret_alone_is_rejected() {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[auth]
jwt_secret = "file_secret_that_is_at_least_32b!"
"#
    )
    .unwrap();

    let loader = ConfigLoader::new("CFGFILEONLY");
    assert!(loader.load(Some(file.path()), None, None, None).is_err());
}

/// Malformed TOML surfaces as a configuration error.
#[test]
fn malformed_file_is_configuration_error() {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[server\nport = ").unwrap();

    let loader = ConfigLoader::new("CFGBAD");
    let err = loader
        .load(Some(file.path()), None, None, Some("secret"))
        .unwrap_err();
    assert!(err.is_configuration());
}
