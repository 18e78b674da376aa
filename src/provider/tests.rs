use super::doppler::{DopplerConfig, parse_secrets};
use super::dotenv::DotEnvConfig;
use super::{Provider, lookup, providers};
use crate::SecretSubError;
use secretsub_core::SecretValue;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use tempfile::TempDir;
use url::Url;

fn provider(s: &str) -> Box<dyn Provider> {
    Box::<dyn Provider>::try_from(s).unwrap()
}

/// Serves a single HTTP response and returns the raw request it received.
fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).unwrap();
            request.extend_from_slice(&buf[..n]);
            if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });
    (format!("doppler://{}?scheme=http", addr), handle)
}

#[test]
fn test_create_from_plain_names() {
    assert_eq!(provider("doppler").name(), "doppler");
    assert_eq!(provider("dotenv").name(), "dotenv");
    assert_eq!(provider("env").name(), "env");
    assert_eq!(provider("env:").name(), "env");
}

#[test]
fn test_create_from_full_uris() {
    assert_eq!(provider("doppler://").name(), "doppler");
    assert_eq!(
        provider("doppler://api.doppler.com?project=web&config=prd").name(),
        "doppler"
    );
    assert_eq!(provider("dotenv:/custom/path/.env").name(), "dotenv");
    assert_eq!(provider("dotenv://.env.production").name(), "dotenv");
}

#[test]
fn test_unknown_provider() {
    match Box::<dyn Provider>::try_from("vault") {
        Err(SecretSubError::ProviderNotFound(scheme)) => assert_eq!(scheme, "vault"),
        Err(other) => panic!("Expected ProviderNotFound error, got {}", other),
        Ok(_) => panic!("Expected ProviderNotFound error"),
    }
}

#[test]
fn test_lookup_by_scheme() {
    assert_eq!(lookup("doppler").map(|reg| reg.info.name), Some("doppler"));
    assert_eq!(lookup("dotenv").map(|reg| reg.info.name), Some("dotenv"));
    assert!(lookup("vault").is_none());

    let url = Url::parse("dotenv:///srv/app/.env").unwrap();
    let built = (lookup("dotenv").unwrap().build)(&url).unwrap();
    assert_eq!(built.name(), "dotenv");
}

#[test]
fn test_providers_are_listed() {
    let names: Vec<_> = providers().into_iter().map(|info| info.name).collect();
    assert_eq!(names, ["doppler", "dotenv", "env"]);

    let doppler = providers().into_iter().find(|i| i.name == "doppler").unwrap();
    assert!(doppler.display_with_examples().contains("(e.g., doppler://"));
}

#[test]
fn test_doppler_config_defaults() {
    let url = Url::parse("doppler://").unwrap();
    let config = DopplerConfig::try_from(&url).unwrap();
    assert_eq!(config, DopplerConfig::default());
    assert_eq!(
        config.endpoint().unwrap().as_str(),
        "https://api.doppler.com/v3/configs/config/secrets/download?format=json"
    );
}

#[test]
fn test_doppler_config_from_url() {
    let url = Url::parse("doppler://localhost:8080?scheme=http&project=web&config=dev").unwrap();
    let config = DopplerConfig::try_from(&url).unwrap();
    assert_eq!(config.api_host, "localhost:8080");
    assert_eq!(config.scheme, "http");
    assert_eq!(
        config.endpoint().unwrap().as_str(),
        "http://localhost:8080/v3/configs/config/secrets/download?format=json&project=web&config=dev"
    );
}

#[test]
fn test_doppler_config_rejects_other_schemes() {
    let url = Url::parse("doppler://?scheme=ftp").unwrap();
    assert!(DopplerConfig::try_from(&url).is_err());

    let url = Url::parse("env://").unwrap();
    assert!(DopplerConfig::try_from(&url).is_err());
}

#[test]
fn test_parse_secrets_keeps_non_text_values_unsupported() {
    let secrets =
        parse_secrets(r#"{"HOST": "db.local", "PORT": 5432, "DEBUG": true, "EMPTY": null}"#)
            .unwrap();

    assert_eq!(secrets.text("HOST").unwrap(), Some("db.local"));
    assert_eq!(
        secrets.get("PORT"),
        Some(&SecretValue::Unsupported { kind: "number" })
    );
    assert_eq!(
        secrets.get("DEBUG"),
        Some(&SecretValue::Unsupported { kind: "boolean" })
    );
    assert_eq!(
        secrets.get("EMPTY"),
        Some(&SecretValue::Unsupported { kind: "null" })
    );
}

#[test]
fn test_parse_secrets_requires_an_object() {
    assert!(matches!(
        parse_secrets("[1, 2]"),
        Err(SecretSubError::Json(_))
    ));
}

#[test]
fn test_doppler_fetch() {
    let (uri, server) = serve_once("200 OK", r#"{"HOST":"db.local","PORT":"5432"}"#);

    let secrets = provider(&uri).fetch(Some("dp.st.test")).unwrap();
    assert_eq!(secrets.text("HOST").unwrap(), Some("db.local"));
    assert_eq!(secrets.text("PORT").unwrap(), Some("5432"));

    let request = server.join().unwrap();
    assert!(request.starts_with("GET /v3/configs/config/secrets/download?format=json "));
    // base64("dp.st.test:")
    assert!(
        request
            .to_ascii_lowercase()
            .contains("authorization: basic zhauc3qudgvzddo=")
    );
}

#[test]
fn test_doppler_rejected_token_is_authentication_error() {
    let (uri, server) = serve_once("401 Unauthorized", r#"{"messages":["Invalid token"]}"#);

    let result = provider(&uri).fetch(Some("dp.st.bad"));
    assert!(matches!(result, Err(SecretSubError::Authentication(_))));
    server.join().unwrap();
}

#[test]
fn test_doppler_server_error_is_network_error() {
    let (uri, server) = serve_once("500 Internal Server Error", "{}");

    let result = provider(&uri).fetch(Some("dp.st.test"));
    assert!(matches!(result, Err(SecretSubError::Network(_))));
    server.join().unwrap();
}

#[test]
fn test_doppler_requires_a_token() {
    let result = provider("doppler://").fetch(None);
    assert!(matches!(result, Err(SecretSubError::Authentication(_))));

    let result = provider("doppler://").fetch(Some(""));
    assert!(matches!(result, Err(SecretSubError::Authentication(_))));
}

#[test]
fn test_doppler_unreachable_host_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = provider(&format!("doppler://{}?scheme=http", addr)).fetch(Some("dp.st.test"));
    assert!(matches!(result, Err(SecretSubError::Network(_))));
}

#[test]
fn test_dotenv_config_paths() {
    let url = Url::parse("dotenv:///srv/app/.env").unwrap();
    assert_eq!(
        DotEnvConfig::try_from(&url).unwrap().path,
        PathBuf::from("/srv/app/.env")
    );

    let url = Url::parse("dotenv://").unwrap();
    assert_eq!(
        DotEnvConfig::try_from(&url).unwrap().path,
        PathBuf::from(".env")
    );
}

#[test]
fn test_dotenv_fetch() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(".env");
    std::fs::write(&path, "API_KEY=abc123\nDATABASE_URL=\"postgres://localhost/app\"\n").unwrap();

    let secrets = provider(&format!("dotenv:{}", path.display()))
        .fetch(None)
        .unwrap();
    assert_eq!(secrets.text("API_KEY").unwrap(), Some("abc123"));
    assert_eq!(
        secrets.text("DATABASE_URL").unwrap(),
        Some("postgres://localhost/app")
    );
}

#[test]
fn test_dotenv_missing_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing.env");

    assert!(
        provider(&format!("dotenv:{}", path.display()))
            .fetch(None)
            .is_err()
    );
}

#[test]
fn test_env_fetch() {
    // SAFETY: the variable name is unique to this test
    unsafe { std::env::set_var("SECRETSUB_TEST_ENV_FETCH", "from-env") };

    let secrets = provider("env").fetch(None).unwrap();
    assert_eq!(
        secrets.text("SECRETSUB_TEST_ENV_FETCH").unwrap(),
        Some("from-env")
    );

    unsafe { std::env::remove_var("SECRETSUB_TEST_ENV_FETCH") };
}
