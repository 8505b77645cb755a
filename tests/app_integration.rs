use std::fs;
use tracing::info;

// Adds automatic logging to test
mod test_utils {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Serves both the language model and the market data API.
    pub async fn create_mock_server(model_reply: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama2",
                "message": {"role": "assistant", "content": model_reply},
                "done": true
            })))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub async fn mount_quote(mock_server: &MockServer, price: &str, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("function", "GLOBAL_QUOTE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Global Quote": {"01. symbol": "ANY", "05. price": price}
            })))
            .expect(expected_calls)
            .mount(mock_server)
            .await;
    }

    pub async fn mount_exchange_rate(mock_server: &MockServer, rate: &str, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("function", "CURRENCY_EXCHANGE_RATE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Realtime Currency Exchange Rate": {
                    "1. From_Currency Code": "XAU",
                    "3. To_Currency Code": "USD",
                    "5. Exchange Rate": rate
                }
            })))
            .expect(expected_calls)
            .mount(mock_server)
            .await;
    }

    pub fn write_config(dir: &tempfile::TempDir, base_url: &str) -> std::path::PathBuf {
        let config_path = dir.path().join("config.yaml");
        let config_content = format!(
            r#"
llm:
  base_url: "{base_url}"
  model: "llama2"
market_data:
  base_url: "{base_url}"
  api_key: "test-key"
pricing:
  min_call_interval_secs: 0
"#
        );
        std::fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }
}

#[test_log::test(tokio::test)]
async fn test_prices_flow_with_mock() {
    let mock_server = test_utils::create_mock_server("NONE").await;
    // Steel, Copper and Glass are quoted; Gold goes through the exchange rate.
    test_utils::mount_quote(&mock_server, "31.2500", 3).await;
    test_utils::mount_exchange_rate(&mock_server, "2650.10", 1).await;

    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(&dir, &mock_server.uri());

    let materials = ["Steel", "Gold", "Copper", "Glass", "Unobtainium"]
        .into_iter()
        .map(String::from)
        .collect();
    let result = procplan::run_command(
        procplan::AppCommand::Prices { materials },
        Some(config_path.to_str().unwrap()),
        true,
    )
    .await;

    assert!(
        result.is_ok(),
        "Prices command failed with: {:?}",
        result.err()
    );
    info!(
        requests = mock_server.received_requests().await.map_or(0, |r| r.len()),
        "Prices flow finished"
    );
}

#[test_log::test(tokio::test)]
async fn test_market_agent_prices_every_material() {
    use procplan::core::config::AppConfig;
    use procplan::core::price::{DefaultReason, PriceSource};

    let mock_server = test_utils::create_mock_server("NONE").await;
    test_utils::mount_quote(&mock_server, "31.2500", 3).await;
    test_utils::mount_exchange_rate(&mock_server, "2650.10", 1).await;

    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(&dir, &mock_server.uri());
    let config = AppConfig::load_from_path(&config_path).expect("Failed to load config");
    let agent = procplan::build_market_agent(&config);

    let materials: Vec<String> = ["Steel", "Gold", "Copper", "Glass", "Unobtainium"]
        .into_iter()
        .map(String::from)
        .collect();
    let priced = agent.resolve_all_with_progress(&materials, &|| {}).await;

    let names: Vec<&str> = priced.iter().map(|p| p.material.as_str()).collect();
    assert_eq!(names, ["Steel", "Gold", "Copper", "Glass", "Unobtainium"]);
    assert_eq!(priced[0].price, 31.25);
    assert_eq!(
        priced[0].source,
        PriceSource::Market {
            symbol: "NUE".to_string()
        }
    );
    assert_eq!(priced[1].price, 2650.10);
    assert_eq!(
        priced[1].source,
        PriceSource::Market {
            symbol: "XAUUSD".to_string()
        }
    );
    assert_eq!(priced[4].price, 100.0);
    assert_eq!(
        priced[4].source,
        PriceSource::Default {
            reason: DefaultReason::Unresolved
        }
    );

    // Cached prices are served without touching the market data mocks again
    let prices = agent.resolve_all(&materials).await;
    assert_eq!(prices.len(), 5);
    assert_eq!(prices["Copper"], 31.25);
    assert_eq!(prices["Unobtainium"], 100.0);
}

#[test_log::test(tokio::test)]
async fn test_prices_rejects_wrong_material_count() {
    let mock_server = test_utils::create_mock_server("NONE").await;
    test_utils::mount_quote(&mock_server, "31.2500", 0).await;

    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(&dir, &mock_server.uri());

    let result = procplan::run_command(
        procplan::AppCommand::Prices {
            materials: vec!["Steel".to_string(), "Gold".to_string()],
        },
        Some(config_path.to_str().unwrap()),
        false,
    )
    .await;

    let err = result.expect_err("Two materials should be rejected");
    assert!(err.to_string().contains("Exactly 5 materials"));
}

#[test_log::test(tokio::test)]
async fn test_composition_flow_with_mock() {
    let mock_server = test_utils::create_mock_server("Aluminum, 60\nGlass, 40").await;

    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(&dir, &mock_server.uri());

    for json in [true, false] {
        let result = procplan::run_command(
            procplan::AppCommand::Composition {
                item: "Window".to_string(),
            },
            Some(config_path.to_str().unwrap()),
            json,
        )
        .await;
        assert!(
            result.is_ok(),
            "Composition command failed with: {:?}",
            result.err()
        );
    }
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_fails() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let missing = dir.path().join("absent.yaml");
    assert!(!fs::exists(&missing).unwrap());

    let result = procplan::run_command(
        procplan::AppCommand::Composition {
            item: "Window".to_string(),
        },
        Some(missing.to_str().unwrap()),
        false,
    )
    .await;
    assert!(result.is_err());
}
