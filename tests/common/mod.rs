use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use uniqa::config::ApiConfig;

/// Build an unsigned JWT whose payload is the given claims object.
///
/// The signature segment is a fixed placeholder; the client never verifies
/// signatures, it only decodes the payload.
#[allow(dead_code)]
pub fn make_jwt(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

/// An `ApiConfig` pointed at the given base URL with a short timeout.
#[allow(dead_code)]
pub fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
    }
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
