use chrono::Utc;
use fxconv::store::HistoryStore;
use std::fs;
use std::path::Path;
use tracing::info;

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(latest: &str, historical: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/latest.json"))
            .and(query_param("app_id", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(latest))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path_regex(r"^/historical/\d{4}-\d{2}-\d{2}\.json$"))
            .and(query_param("app_id", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(historical))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub async fn create_failing_mock_server() -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&mock_server)
            .await;

        mock_server
    }
}

fn write_config(config_path: &Path, base_url: &str, data_path: &Path) {
    let config_content = format!(
        r#"
        provider:
          base_url: {}
          app_id: "test-key"
        history_days: 3
        data_path: "{}"
    "#,
        base_url,
        data_path.display()
    );
    fs::write(config_path, &config_content).expect("Failed to write config file");
}

async fn stored_conversions(data_path: &Path) -> Vec<fxconv::core::ConversionRecord> {
    let store = HistoryStore::open(&data_path.join("history.db"))
        .await
        .expect("Failed to open history store");
    let records = store.list_all().await.expect("Failed to list conversions");
    store.close().await;
    records
}

#[test_log::test(tokio::test)]
async fn test_full_convert_flow_with_mock() {
    let latest = r#"{"base": "USD", "rates": {"USD": 1.0, "EUR": 0.9, "GBP": 0.8}}"#;
    let historical = r#"{"base": "USD", "rates": {"USD": 1.0, "EUR": 0.92, "GBP": 0.79}}"#;
    let mock_server = test_utils::create_mock_server(latest, historical).await;

    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    write_config(config_file.path(), &mock_server.uri(), data_dir.path());

    let result = fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: Some(100.0),
            from: Some("eur".to_string()),
            to: Some("GBP".to_string()),
            days: None,
            show_history: true,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Convert command failed with: {:?}",
        result.err()
    );

    let records = stored_conversions(data_dir.path()).await;
    info!(?records, "Stored conversions");
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert!(record.id.unwrap() >= 1);
    assert_eq!(record.amount, 100.0);
    assert_eq!(record.from_currency, "EUR");
    assert_eq!(record.to_currency, "GBP");
    assert!((record.exchange_rate - 0.8 / 0.9).abs() < 1e-9);
    assert!((record.converted_amount - 88.89).abs() < 0.01);
    assert!(record.date <= Utc::now());

    // One latest fetch plus one request per day in the window
    let requests = mock_server.received_requests().await.unwrap();
    let latest_requests = requests
        .iter()
        .filter(|r| r.url.path() == "/latest.json")
        .count();
    let historical_requests = requests
        .iter()
        .filter(|r| r.url.path().starts_with("/historical/"))
        .count();
    assert_eq!(latest_requests, 1);
    assert_eq!(historical_requests, 3);
}

#[test_log::test(tokio::test)]
async fn test_unknown_currency_is_not_persisted() {
    let latest = r#"{"rates": {"EUR": 0.9}}"#;
    let mock_server = test_utils::create_mock_server(latest, latest).await;

    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    write_config(config_file.path(), &mock_server.uri(), data_dir.path());

    let result = fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: Some(10.0),
            from: Some("EUR".to_string()),
            to: Some("XXX".to_string()),
            days: Some(2),
            show_history: false,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Conversion errors are not fatal: {result:?}");

    assert!(stored_conversions(data_dir.path()).await.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_unreachable_api_is_not_fatal() {
    let mock_server = test_utils::create_failing_mock_server().await;

    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    write_config(config_file.path(), &mock_server.uri(), data_dir.path());

    let result = fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: Some(10.0),
            from: Some("USD".to_string()),
            to: Some("EUR".to_string()),
            days: None,
            show_history: false,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Fetch errors are not fatal: {result:?}");

    assert!(stored_conversions(data_dir.path()).await.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_history_command_lists_conversions() {
    let latest = r#"{"base": "USD", "rates": {"USD": 1.0, "EUR": 0.9, "GBP": 0.8}}"#;
    let mock_server = test_utils::create_mock_server(latest, latest).await;

    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    write_config(config_file.path(), &mock_server.uri(), data_dir.path());
    let config_path = config_file.path().to_str().unwrap();

    fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: Some(250.0),
            from: Some("GBP".to_string()),
            to: Some("EUR".to_string()),
            days: Some(0),
            show_history: false,
        },
        Some(config_path),
    )
    .await
    .expect("Convert command failed");

    let result = fxconv::run_command(fxconv::AppCommand::History, Some(config_path)).await;
    assert!(
        result.is_ok(),
        "History command failed with: {:?}",
        result.err()
    );

    // The listing is rendered from what a later run reads back from disk
    let records = stored_conversions(data_dir.path()).await;
    assert_eq!(records.len(), 1);
    let listing = fxconv::cli::history::display_as_table(&records);
    info!(%listing, "History listing");
    assert!(listing.contains("Conversion History"));
    assert!(listing.contains("GBP"));
    assert!(listing.contains("EUR"));
    assert!(listing.contains("250"));
    assert!(listing.contains(&records[0].converted_amount.to_string()));
}

#[test_log::test(tokio::test)]
async fn test_missing_config_is_an_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = dir.path().join("missing.yaml");

    let result = fxconv::run_command(
        fxconv::AppCommand::History,
        Some(missing.to_str().unwrap()),
    )
    .await;
    let err = result.expect_err("Missing config should fail");
    assert!(err.to_string().contains("Failed to read config file"));
}
