mod common;

use medtour_server::{AppConfig, build_app};
use serde_json::Value;

use common::start_server;

#[tokio::test]
async fn service_endpoints_work() {
    let server = start_server(AppConfig::default()).await;
    let base = &server.base;
    let client = reqwest::Client::new();

    // GET /
    let resp = client.get(format!("{base}/")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["service"], "MedTour Server");
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());

    // GET /healthz
    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    // GET /readyz
    let resp = client.get(format!("{base}/readyz")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ready");

    // Unknown route
    let resp = client.get(format!("{base}/nope")).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["error"], "Route not found");

    server.stop().await;
}

#[tokio::test]
async fn request_id_is_generated_and_echoed() {
    let server = start_server(AppConfig::default()).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/healthz", server.base))
        .send()
        .await
        .unwrap();
    let generated = resp.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert_eq!(generated.len(), 36);

    let resp = client
        .get(format!("{}/healthz", server.base))
        .header("x-request-id", "abc-123")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "abc-123");

    server.stop().await;
}

#[tokio::test]
async fn kpi_on_empty_store() {
    let server = start_server(AppConfig::default()).await;
    let resp = reqwest::get(format!("{}/kpi", server.base)).await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["monthlyPatients"], 0);
    assert_eq!(body["monthlyRevenue"], 0.0);
    assert_eq!(body["topCountries"], serde_json::json!([]));
    let months = body["revenueByMonth"].as_array().unwrap();
    assert_eq!(months.len(), 12);
    assert_eq!(months[0]["month"], "Jan");
    assert_eq!(months[11]["month"], "Dec");

    server.stop().await;
}

#[tokio::test]
async fn build_app_seeds_demo_data() {
    let mut cfg = AppConfig::default();
    cfg.bootstrap.seed_demo_data = true;
    let app = build_app(&cfg).await.expect("build app");

    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    let hospitals: Vec<Value> = reqwest::get(format!("http://{addr}/hospitals"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(hospitals.len(), 4);
    assert_eq!(hospitals[0]["name"], "Apollo Hospitals");

    let users: Vec<Value> = reqwest::get(format!("http://{addr}/users"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("passwordHash").is_none()));

    let kpi: Value = reqwest::get(format!("http://{addr}/kpi"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let countries = kpi["topCountries"].as_array().unwrap();
    assert_eq!(countries.len(), 5);
    assert_eq!(countries[0]["name"], "USA");

    let _ = tx.send(());
    let _ = handle.await;
}
