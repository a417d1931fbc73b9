//! Production clients against a local stand-in for the providers
//!
//! A small axum server plays Google Maps and OpenAI so the real request
//! building and error mapping run end to end without network access.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::Query,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};

use wanderwise::config::{LlmConfig, MapsConfig, UpstreamConfig};
use wanderwise::{CompletionApi, GoogleMapsClient, MapsApi, OpenAiClient, TravelMode, WanderError};

const MAPS_KEY: &str = "test-maps-key";
const OPENAI_KEY: &str = "sk-test";

async fn directions(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    if params.get("key").map(String::as_str) != Some(MAPS_KEY) {
        return Json(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "routes": []
        }));
    }
    // Echo the query back so the test can check what was sent.
    Json(json!({"status": "OK", "routes": [{"summary": "echo"}], "echo": params}))
}

async fn place_search(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    match params.get("query").map(String::as_str) {
        Some("travel agency in Broken Town") => {
            (StatusCode::BAD_GATEWAY, "upstream exploded").into_response()
        }
        Some(query) => Json(json!({
            "status": "OK",
            "results": [{"name": query, "place_id": "p1"}]
        }))
        .into_response(),
        None => Json(json!({"status": "INVALID_REQUEST", "results": []})).into_response(),
    }
}

async fn chat_completions(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    let expected = format!("Bearer {OPENAI_KEY}");
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str());
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}})),
        )
            .into_response();
    }

    let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
    if prompt == "empty" {
        return Json(json!({"id": "chatcmpl-2", "choices": []})).into_response();
    }

    Json(json!({
        "id": "chatcmpl-1",
        "model": body["model"],
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": format!("{}|{}|{}", body["model"].as_str().unwrap_or_default(), body["max_tokens"], prompt)
            },
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}

async fn start_provider() -> String {
    let app = Router::new()
        .route("/maps/directions/json", get(directions))
        .route("/maps/place/textsearch/json", get(place_search))
        .route("/v1/chat/completions", post(chat_completions));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn upstream() -> UpstreamConfig {
    UpstreamConfig { timeout_seconds: 5 }
}

fn maps_client(base: &str, key: Option<&str>) -> GoogleMapsClient {
    let config = MapsConfig {
        api_key: key.map(str::to_string),
        base_url: format!("{base}/maps"),
    };
    GoogleMapsClient::new(&config, &upstream()).unwrap()
}

fn llm_client(base: &str, key: &str) -> OpenAiClient {
    let config = LlmConfig {
        api_key: Some(key.to_string()),
        model: "gpt-4o-mini".to_string(),
        base_url: format!("{base}/v1"),
    };
    OpenAiClient::new(&config, &upstream()).unwrap()
}

#[tokio::test]
async fn test_directions_sends_expected_query() {
    let base = start_provider().await;
    let client = maps_client(&base, Some(MAPS_KEY));

    let value = client
        .directions("28.6,77.2", "Agra Fort, Agra", TravelMode::Transit, true)
        .await
        .unwrap();

    assert_eq!(value["status"], "OK");
    let echo = &value["echo"];
    assert_eq!(echo["origin"], "28.6,77.2");
    assert_eq!(echo["destination"], "Agra Fort, Agra");
    assert_eq!(echo["mode"], "transit");
    assert_eq!(echo["alternatives"], "true");
}

#[tokio::test]
async fn test_in_band_error_status_passes_through() {
    let base = start_provider().await;
    let client = maps_client(&base, Some("wrong-key"));

    let value = client
        .directions("Delhi", "Agra", TravelMode::Driving, true)
        .await
        .unwrap();

    assert_eq!(value["status"], "REQUEST_DENIED");
    assert_eq!(value["error_message"], "The provided API key is invalid.");
    assert_eq!(value["routes"], json!([]));
}

#[tokio::test]
async fn test_place_search_encodes_query() {
    let base = start_provider().await;
    let client = maps_client(&base, Some(MAPS_KEY));

    let value = client
        .place_search("travel agency in São Paulo & Co")
        .await
        .unwrap();

    assert_eq!(value["results"][0]["name"], "travel agency in São Paulo & Co");
}

#[tokio::test]
async fn test_non_success_status_is_upstream_error_with_payload() {
    let base = start_provider().await;
    let client = maps_client(&base, Some(MAPS_KEY));

    let err = client
        .place_search("travel agency in Broken Town")
        .await
        .unwrap_err();

    match err {
        WanderError::Upstream {
            status, payload, ..
        } => {
            assert_eq!(status, Some(502));
            assert_eq!(payload, Some(json!("upstream exploded")));
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_provider_is_upstream_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = maps_client(&base, Some(MAPS_KEY));
    let err = client.place_search("anything").await.unwrap_err();

    assert!(matches!(err, WanderError::Upstream { status: None, .. }));
    assert!(!err.to_string().contains(MAPS_KEY));
}

#[tokio::test]
async fn test_completion_round_trip() {
    let base = start_provider().await;
    let client = llm_client(&base, OPENAI_KEY);

    let response = client.complete("plan Goa", 400, "gpt-4o").await.unwrap();

    assert_eq!(response.first_text(), Some("gpt-4o|400|plan Goa"));
}

#[tokio::test]
async fn test_completion_without_choices_parses() {
    let base = start_provider().await;
    let client = llm_client(&base, OPENAI_KEY);

    let response = client.complete("empty", 400, "gpt-4o-mini").await.unwrap();

    assert_eq!(response.first_text(), None);
}

#[tokio::test]
async fn test_completion_rejected_key_is_upstream_error() {
    let base = start_provider().await;
    let client = llm_client(&base, "sk-wrong");

    let err = client.complete("plan Goa", 400, "gpt-4o-mini").await.unwrap_err();

    match err {
        WanderError::Upstream {
            status, payload, ..
        } => {
            assert_eq!(status, Some(401));
            assert_eq!(
                payload.unwrap()["error"]["message"],
                "Incorrect API key provided"
            );
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}
