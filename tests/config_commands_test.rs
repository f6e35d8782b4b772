//! Configuration loading and command handler integration tests
//!
//! Loads a YAML config from disk, builds a client through the same path the
//! binary uses, and drives the command handlers against a mock API.

mod common;

use clap::Parser;
use serial_test::serial;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use salon_client::cli::Cli;
use salon_client::commands;
use salon_client::config::{Config, StorageBackend};

use common::temp_config_file;

fn cli(config_path: &str) -> Cli {
    Cli::try_parse_from(["salon-client", "--config", config_path, "status"])
        .expect("failed to parse cli")
}

#[test]
#[serial]
fn test_load_config_file_and_validate() {
    std::env::remove_var("SALON_API_BASE_URL");
    std::env::remove_var("SALON_STORAGE_BACKEND");
    let (_dir, config_path) = temp_config_file(
        r#"
api:
  base_url: https://api.salon.example
  timeout_seconds: 15
storage:
  backend: memory
  keyring_service: salon-it
"#,
    );
    let path = config_path.to_str().unwrap();

    let config = Config::load(path, &cli(path)).unwrap();

    assert!(config.validate().is_ok());
    assert_eq!(config.api.base_url, "https://api.salon.example");
    assert_eq!(config.api.timeout_seconds, 15);
    assert_eq!(config.api.refresh_path, "/auth/refresh");
    assert_eq!(config.storage.backend, StorageBackend::Memory);
    assert_eq!(config.storage.keyring_service, "salon-it");
}

#[test]
#[serial]
fn test_invalid_config_file_fails_validation() {
    std::env::remove_var("SALON_API_BASE_URL");
    let (_dir, config_path) = temp_config_file(
        r#"
api:
  base_url: https://api.salon.example
  refresh_path: ""
"#,
    );
    let path = config_path.to_str().unwrap();

    let config = Config::load(path, &cli(path)).unwrap();
    let err = config.validate().unwrap_err();

    assert!(err.to_string().contains("refresh_path"));
}

#[tokio::test]
#[serial]
async fn test_login_then_request_through_configured_client() {
    std::env::remove_var("SALON_API_BASE_URL");
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bookings"))
        .and(header("Authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bookings"))
        .and(header("Authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "accessToken": "new" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, config_path) = temp_config_file(&format!(
        "api:\n  base_url: {}\nstorage:\n  backend: memory\n",
        server.uri()
    ));
    let path = config_path.to_str().unwrap();
    let config = Config::load(path, &cli(path)).unwrap();
    config.validate().unwrap();

    let client = commands::build_client(&config).unwrap();
    let mut out = Vec::new();
    commands::login(&client, "old".to_string(), "R".to_string(), &mut out).unwrap();
    commands::request(&client, "GET", "/bookings", None, &[], &mut out)
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.ends_with("200 OK\n[]\n"), "unexpected output: {text}");
}

#[tokio::test]
#[serial]
async fn test_request_command_reports_error_status() {
    std::env::remove_var("SALON_API_BASE_URL");
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/bookings/7"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.storage.backend = StorageBackend::Memory;

    let client = commands::build_client(&config).unwrap();
    let mut out = Vec::new();
    let result = commands::request(&client, "delete", "/bookings/7", None, &[], &mut out).await;

    assert!(result.is_err());
    assert_eq!(String::from_utf8(out).unwrap(), "404 Not Found\nnot found\n");
}
