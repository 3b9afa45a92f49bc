use countryfx::AppCommand;
use countryfx::core::query::CountryQuery;
use countryfx::store::{CountryStore, DiskStore};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tracing::info;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COUNTRIES_PATH: &str = "/v2/all";
const RATES_PATH: &str = "/v6/latest/USD";

const COUNTRIES_JSON: &str = r#"[
    {
        "name": "Testland",
        "capital": "Test City",
        "region": "Testia",
        "population": 2000000,
        "flag": "https://flags.example/tst.svg",
        "currencies": [{"code": "TST", "name": "Test dollar", "symbol": "T$"}]
    },
    {
        "name": "Switzerland",
        "capital": "Bern",
        "region": "Europe",
        "population": 8636896,
        "flag": "https://flags.example/ch.svg",
        "currencies": [{"code": "CHF", "name": "Swiss franc", "symbol": "Fr."}]
    },
    {
        "name": "Antarctica",
        "region": "Polar",
        "population": 1000,
        "flag": "https://flags.example/aq.svg"
    }
]"#;

const RATES_JSON: &str = r#"{
    "result": "success",
    "base_code": "USD",
    "rates": {"USD": 1, "TST": 100, "CHF": 0.88, "EUR": 0.92}
}"#;

struct TestEnv {
    _dir: TempDir,
    config_path: String,
    store_path: std::path::PathBuf,
}

fn write_config(mock_server: &MockServer) -> TestEnv {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = dir.path().join("config.yaml");
    let data_path = dir.path().join("data");
    let config_content = format!(
        r#"
        sources:
          countries:
            url: "{uri}{COUNTRIES_PATH}?fields=name,capital,region,population,flag,currencies"
            timeout_secs: 5
          exchange:
            url: "{uri}{RATES_PATH}"
            timeout_secs: 5
        data_path: "{data}"
    "#,
        uri = mock_server.uri(),
        data = data_path.display()
    );
    fs::write(&config_path, config_content).expect("Failed to write config file");

    TestEnv {
        config_path: config_path.to_str().unwrap().to_string(),
        store_path: data_path.join("store"),
        _dir: dir,
    }
}

async fn mount(mock_server: &MockServer, url_path: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(response)
        .expect(times)
        .mount(mock_server)
        .await;
}

async fn run(env: &TestEnv, command: AppCommand) -> anyhow::Result<()> {
    countryfx::run_command(command, Some(&env.config_path)).await
}

fn open_store(path: &Path) -> DiskStore {
    DiskStore::open(path).expect("Failed to open store")
}

#[test_log::test(tokio::test)]
async fn test_full_refresh_flow_with_mock() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        RATES_PATH,
        ResponseTemplate::new(200).set_body_string(RATES_JSON),
        2,
    )
    .await;
    mount(
        &mock_server,
        COUNTRIES_PATH,
        ResponseTemplate::new(200).set_body_string(COUNTRIES_JSON),
        2,
    )
    .await;
    let env = write_config(&mock_server);

    let result = run(&env, AppCommand::Refresh { json: true }).await;
    assert!(result.is_ok(), "Refresh failed with: {:?}", result.err());

    {
        let store = open_store(&env.store_path);
        let status = store.status().await.unwrap();
        assert_eq!(status.total_countries, 3);
        assert!(status.last_refreshed_at.is_some());

        let testland = store.get("Testland").await.unwrap().unwrap().record;
        info!(?testland, "Stored record");
        assert_eq!(testland.currency_code.as_deref(), Some("TST"));
        assert_eq!(testland.exchange_rate, Some(100.0));
        assert!((20_000_000.0..=40_000_000.0).contains(&testland.estimated_gdp));

        let antarctica = store.get("Antarctica").await.unwrap().unwrap().record;
        assert!(antarctica.currency_code.is_none());
        assert!(antarctica.exchange_rate.is_none());
        assert_eq!(antarctica.estimated_gdp, 0.0);
        assert!(antarctica.capital.is_none());
    }

    // A second run in a new process refetches and updates in place
    let result = run(&env, AppCommand::Refresh { json: false }).await;
    assert!(result.is_ok(), "Second refresh failed with: {:?}", result.err());

    for command in [
        AppCommand::List {
            region: Some("europe".to_string()),
            currency: None,
            sort: Some("gdp_desc".to_string()),
            json: false,
        },
        AppCommand::Show {
            name: "Switzerland".to_string(),
        },
        AppCommand::Status,
        AppCommand::Summary,
    ] {
        let result = run(&env, command).await;
        assert!(result.is_ok(), "Command failed with: {:?}", result.err());
    }

    let result = run(
        &env,
        AppCommand::Delete {
            name: "Antarctica".to_string(),
        },
    )
    .await;
    assert!(result.is_ok(), "Delete failed with: {:?}", result.err());

    let store = open_store(&env.store_path);
    let remaining = store.list(&CountryQuery::default()).await.unwrap();
    let names: Vec<_> = remaining.iter().map(|r| r.record.name.as_str()).collect();
    assert_eq!(names, ["Switzerland", "Testland"]);
    let testland = store.get("Testland").await.unwrap().unwrap();
    assert!(testland.updated_at > testland.created_at);
}

#[test_log::test(tokio::test)]
async fn test_malformed_country_is_skipped() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        RATES_PATH,
        ResponseTemplate::new(200).set_body_string(
            r#"{"base_code": "USD", "rates": {"GHS": 12.1, "KES": 129.5, "XYZ": null, "ABC": "n/a"}}"#,
        ),
        1,
    )
    .await;
    let countries = r#"[
        {"name": "Ghana", "population": 31072945, "currencies": [{"code": "GHS"}]},
        {"name": "Kenya", "population": 53771300, "currencies": [{"code": "KES"}]},
        {"name": "Broken", "population": null},
        {"name": "Nullrate", "population": 100, "currencies": [{"code": "XYZ"}]}
    ]"#;
    mount(
        &mock_server,
        COUNTRIES_PATH,
        ResponseTemplate::new(200).set_body_string(countries),
        1,
    )
    .await;
    let env = write_config(&mock_server);

    let result = run(&env, AppCommand::Refresh { json: true }).await;
    assert!(result.is_ok(), "Refresh failed with: {:?}", result.err());

    let store = open_store(&env.store_path);
    assert_eq!(store.status().await.unwrap().total_countries, 3);
    assert!(store.get("Ghana").await.unwrap().is_some());
    assert!(store.get("Kenya").await.unwrap().is_some());
    assert!(store.get("Broken").await.unwrap().is_none());

    let nullrate = store.get("Nullrate").await.unwrap().unwrap().record;
    assert_eq!(nullrate.currency_code.as_deref(), Some("XYZ"));
    assert!(nullrate.exchange_rate.is_none());
    assert_eq!(nullrate.estimated_gdp, 0.0);
}

#[test_log::test(tokio::test)]
async fn test_exchange_outage_aborts_refresh() {
    let mock_server = MockServer::start().await;
    mount(&mock_server, RATES_PATH, ResponseTemplate::new(503), 1).await;
    mount(
        &mock_server,
        COUNTRIES_PATH,
        ResponseTemplate::new(200).set_body_string(COUNTRIES_JSON),
        0,
    )
    .await;
    let env = write_config(&mock_server);

    let result = run(&env, AppCommand::Refresh { json: false }).await;
    let err = result.expect_err("Refresh should fail when the exchange source is down");
    assert_eq!(
        err.to_string(),
        "External data source unavailable: could not fetch data from exchange API"
    );

    let store = open_store(&env.store_path);
    let status = store.status().await.unwrap();
    assert_eq!(status.total_countries, 0);
    assert!(status.last_refreshed_at.is_none());
}

#[test_log::test(tokio::test)]
async fn test_countries_outage_aborts_refresh() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        RATES_PATH,
        ResponseTemplate::new(200).set_body_string(RATES_JSON),
        1,
    )
    .await;
    mount(
        &mock_server,
        COUNTRIES_PATH,
        ResponseTemplate::new(200).set_body_string("not json"),
        1,
    )
    .await;
    let env = write_config(&mock_server);

    let err = run(&env, AppCommand::Refresh { json: false })
        .await
        .expect_err("Refresh should fail on a malformed countries payload");
    assert_eq!(
        err.to_string(),
        "External data source unavailable: could not fetch data from countries API"
    );
}

#[test_log::test(tokio::test)]
async fn test_invalid_sort_is_rejected() {
    let mock_server = MockServer::start().await;
    let env = write_config(&mock_server);

    let result = run(
        &env,
        AppCommand::List {
            region: None,
            currency: None,
            sort: Some("size".to_string()),
            json: true,
        },
    )
    .await;
    assert!(result.unwrap_err().to_string().starts_with("invalid sort 'size'"));
}

#[test_log::test(tokio::test)]
async fn test_show_unknown_country_fails() {
    let mock_server = MockServer::start().await;
    let env = write_config(&mock_server);

    let err = run(
        &env,
        AppCommand::Show {
            name: "Atlantis".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Country not found: Atlantis");
}
