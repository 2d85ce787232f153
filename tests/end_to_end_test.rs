use httpmock::prelude::*;
use crop_advisor::adapters::{ChatCompletionClient, IpLocator, ReverseGeocoder, WeatherClient};
use crop_advisor::core::engine::REPORT_TITLE;
use crop_advisor::domain::model::{Coordinates, SoilConditions, SuitabilityVerdict};
use crop_advisor::{
    AdvisorClient, AdvisorEngine, CropCatalog, DistrictTable, LocalStorage, LocationService,
    ReportRenderer,
};
use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;

type Engine = AdvisorEngine<AdvisorClient, LocationService, LocalStorage>;

fn data_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn build_engine(server: &MockServer, output_path: &str) -> Engine {
    let client = reqwest::Client::new();
    let catalog = CropCatalog::from_path(data_file("crop_requirements.csv")).unwrap();
    let districts = DistrictTable::from_path(data_file("district.csv")).unwrap();

    let advisor = AdvisorClient::new(ChatCompletionClient::new(
        client.clone(),
        server.url("/openai/v1/chat/completions"),
        Some("gsk_test".to_string()),
        "test-model",
    ));
    let locator = LocationService::new(
        IpLocator::new(client.clone(), server.url("/json")),
        ReverseGeocoder::new(client.clone(), server.url("/reverse"), "crop-advisor-test"),
        WeatherClient::new(client, server.url("/data/2.5/weather"), Some("owm".to_string())),
        districts,
    );

    AdvisorEngine::new(
        catalog,
        advisor,
        locator,
        LocalStorage::new(output_path.to_string()),
    )
    .with_output(output_path, "crop_suggestion.pdf")
    .with_renderer(ReportRenderer::with_timestamp(None))
}

fn mock_location_services(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"loc": "12.2958,76.6394"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/reverse");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"address": {"state_district": "Mysuru", "state": "Karnataka"}}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/data/2.5/weather");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"main": {"temp": 26.0}}));
    });
}

#[tokio::test]
async fn test_suggest_from_location_writes_report() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    mock_location_services(&server);
    let chat_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/openai/v1/chat/completions")
            .body_contains("soil type Red, moisture 40%, temperature 26°C");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "choices": [{"message": {"role": "assistant", "content": " Mulch and use drip irrigation. "}}]
            }));
    });

    let engine = build_engine(&server, &output_path);
    let resolved = engine
        .resolve_conditions(SoilConditions::new("Loamy", 25.0, 30.0), true, None)
        .await;
    assert!(resolved.from_location());
    assert_eq!(resolved.conditions, SoilConditions::new("Red", 40.0, 26.0));

    let suggestion = engine.suggest(resolved.conditions, true).await;
    chat_mock.assert();

    assert_eq!(suggestion.matches.len(), 5);
    assert_eq!(suggestion.report.title, REPORT_TITLE);
    assert_eq!(suggestion.report.advice, "Mulch and use drip irrigation.");

    let saved = engine.save_report(&suggestion.report).await.unwrap();
    assert!(saved.ends_with("crop_suggestion.pdf"));

    let pdf = std::fs::read(temp_dir.path().join("crop_suggestion.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_unknown_district_falls_back_to_manual_input() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/reverse");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"address": {"county": "Somewhere Else"}}));
    });

    let temp_dir = TempDir::new().unwrap();
    let engine = build_engine(&server, temp_dir.path().to_str().unwrap());
    let manual = SoilConditions::new("Black", 35.0, 28.0);

    let resolved = engine
        .resolve_conditions(
            manual.clone(),
            true,
            Some(Coordinates {
                latitude: 1.0,
                longitude: 2.0,
            }),
        )
        .await;

    assert!(!resolved.from_location());
    assert_eq!(resolved.conditions, manual);
}

#[tokio::test]
async fn test_advisor_failure_still_produces_report() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/openai/v1/chat/completions");
        then.status(429).body("rate limited");
    });

    let engine = build_engine(&server, &output_path);
    let check = engine
        .check("Ragi", SoilConditions::new("Red", 35.0, 25.0), true)
        .await
        .unwrap();

    assert_eq!(check.score, 100);
    assert_eq!(check.verdict, SuitabilityVerdict::Suitable);
    assert!(check.report.advice.starts_with("Error:"));

    engine.save_report(&check.report).await.unwrap();
    assert!(temp_dir.path().join("crop_suggestion.pdf").exists());
}

#[tokio::test]
async fn test_crop_info_report() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let chat_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/openai/v1/chat/completions")
            .body_contains("fertilizers are best for growing Coffee");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"choices": [{"message": {"content": "NPK 18:18:18"}}]}));
    });

    let engine = build_engine(&server, temp_dir.path().to_str().unwrap());
    let info = engine.crop_info("coffee", true).await.unwrap();

    chat_mock.assert();
    assert_eq!(info.crop.name, "Coffee");
    assert_eq!(info.report.advice, "NPK 18:18:18");
    assert!(info
        .report
        .match_data
        .as_deref()
        .unwrap()
        .contains("Preferred Soil: Laterite, Red, Loamy"));
}
