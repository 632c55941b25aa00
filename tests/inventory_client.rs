use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use flightbook::errors::InventoryError;
use flightbook::services::inventory::http::HttpInventoryClient;
use flightbook::services::inventory::InventoryService;

#[derive(Default)]
struct StubState {
    seat_calls: Mutex<Vec<(String, String, u64, Option<String>)>>,
}

async fn stub_segment(Path(id): Path<String>) -> impl IntoResponse {
    match id.as_str() {
        "FL-1" => (
            StatusCode::OK,
            Json(json!({
                "id": "FL-1",
                "flightNumber": "6E-204",
                "airline": "INDIGO",
                "source": "BHUBANESWAR",
                "destination": "BENGALURU",
                "departureTime": "2031-03-01T09:00:00",
                "arrivalTime": "2031-03-01T11:30:00",
                "totalSeats": 180,
                "availableSeats": 42,
                "price": 5200.0,
            })),
        )
            .into_response(),
        "SLOW" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            StatusCode::OK.into_response()
        }
        "GARBLED" => (StatusCode::OK, "not json").into_response(),
        "BROKEN" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn record(
    state: &StubState,
    id: &str,
    action: &str,
    headers: &HeaderMap,
    body: &Value,
) -> StatusCode {
    let count = body["count"].as_u64().unwrap_or(0);
    let key = headers
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    state
        .seat_calls
        .lock()
        .unwrap()
        .push((id.to_string(), action.to_string(), count, key));

    match id {
        "FL-1" if count <= 5 => StatusCode::OK,
        "FL-1" => StatusCode::CONFLICT,
        _ => StatusCode::NOT_FOUND,
    }
}

async fn stub_reserve(
    State(state): State<Arc<StubState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    record(&state, &id, "reserve", &headers, &body).await
}

async fn stub_release(
    State(state): State<Arc<StubState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    record(&state, &id, "release", &headers, &body).await
}

async fn spawn_stub() -> (String, Arc<StubState>) {
    let state = Arc::new(StubState::default());
    let app = Router::new()
        .route("/segments/:id", get(stub_segment))
        .route("/segments/:id/reserve", post(stub_reserve))
        .route("/segments/:id/release", post(stub_release))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), state)
}

fn client(base_url: &str) -> HttpInventoryClient {
    HttpInventoryClient::new(base_url, Duration::from_millis(500)).unwrap()
}

#[tokio::test]
async fn test_get_segment_decodes_payload() {
    let (base_url, _state) = spawn_stub().await;

    let segment = client(&base_url).get_segment("FL-1").await.unwrap();

    assert_eq!(segment.id, "FL-1");
    assert_eq!(segment.source, "BHUBANESWAR");
    assert_eq!(segment.available_seats, 42);
    assert_eq!(segment.flight_number.as_deref(), Some("6E-204"));
    assert_eq!(
        segment.departure_time.format("%Y-%m-%d %H:%M").to_string(),
        "2031-03-01 09:00"
    );
}

#[tokio::test]
async fn test_get_segment_error_mapping() {
    let (base_url, _state) = spawn_stub().await;
    let client = client(&format!("{base_url}/"));

    assert_eq!(client.get_segment("NOPE").await.unwrap_err(), InventoryError::NotFound);
    assert!(matches!(
        client.get_segment("BROKEN").await.unwrap_err(),
        InventoryError::Rejected { status: 500, .. }
    ));
    assert!(matches!(
        client.get_segment("GARBLED").await.unwrap_err(),
        InventoryError::Unavailable(_)
    ));
    assert_eq!(
        client.get_segment("SLOW").await.unwrap_err(),
        InventoryError::Timeout(Duration::from_millis(500))
    );
}

#[tokio::test]
async fn test_unreachable_service_is_unavailable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}"))
        .get_segment("FL-1")
        .await
        .unwrap_err();
    assert!(matches!(err, InventoryError::Unavailable(_)));
}

#[tokio::test]
async fn test_reserve_and_release_post_seat_count() {
    let (base_url, state) = spawn_stub().await;
    let client = client(&base_url);

    client.reserve("FL-1", 3, "a1:FL-1:reserve").await.unwrap();
    client.release("FL-1", 3, "a1:FL-1:release").await.unwrap();
    assert!(matches!(
        client.reserve("FL-1", 6, "a2:FL-1:reserve").await.unwrap_err(),
        InventoryError::Rejected { status: 409, .. }
    ));
    assert_eq!(
        client.release("FL-9", 1, "a3:FL-9:release").await.unwrap_err(),
        InventoryError::NotFound
    );

    let calls = state.seat_calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[0], ("FL-1".to_string(), "reserve".to_string(), 3, None));
    assert_eq!(calls[1], ("FL-1".to_string(), "release".to_string(), 3, None));
}

#[tokio::test]
async fn test_idempotency_key_forwarded_when_enabled() {
    let (base_url, state) = spawn_stub().await;
    let client = client(&base_url).with_idempotency_keys(true);

    client.reserve("FL-1", 2, "a1:FL-1:reserve").await.unwrap();

    let calls = state.seat_calls.lock().unwrap().clone();
    assert_eq!(calls[0].3.as_deref(), Some("a1:FL-1:reserve"));
}

#[tokio::test]
async fn test_segment_id_is_a_single_path_segment() {
    let (base_url, state) = spawn_stub().await;
    let client = client(&base_url);

    assert_eq!(
        client.get_segment("NOPE/../FL-1").await.unwrap_err(),
        InventoryError::NotFound
    );
    assert_eq!(
        client.get_segment("FL-1?x=NOPE").await.unwrap_err(),
        InventoryError::NotFound
    );
    assert_eq!(client.get_segment("..").await.unwrap_err(), InventoryError::NotFound);

    assert_eq!(
        client.reserve("FL-1#frag", 1, "a1:FL-1#frag:reserve").await.unwrap_err(),
        InventoryError::NotFound
    );
    assert_eq!(
        client.release("FL-1/../FL-1", 1, "a1:x:release").await.unwrap_err(),
        InventoryError::NotFound
    );

    let calls = state.seat_calls.lock().unwrap().clone();
    let ids: Vec<_> = calls.iter().map(|c| c.0.as_str()).collect();
    assert_eq!(ids, vec!["FL-1#frag", "FL-1/../FL-1"]);
}

#[tokio::test]
async fn test_base_url_path_prefix_is_kept() {
    let state = Arc::new(StubState::default());
    let app = Router::new().nest(
        "/inventory",
        Router::new()
            .route("/segments/:id", get(stub_segment))
            .route("/segments/:id/reserve", post(stub_reserve))
            .with_state(Arc::clone(&state)),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = client(&format!("http://{addr}/inventory/"));
    assert_eq!(client.get_segment("FL-1").await.unwrap().id, "FL-1");
    client.reserve("FL-1", 1, "a1:FL-1:reserve").await.unwrap();
}

#[test]
fn test_rejects_unusable_base_url() {
    assert!(HttpInventoryClient::new("not a url", Duration::from_secs(1)).is_err());
    assert!(HttpInventoryClient::new("mailto:ops@example.com", Duration::from_secs(1)).is_err());
}
