mod common;

use medtour_server::AppConfig;
use reqwest::StatusCode;
use serde_json::{Value, json};

use common::start_server;

fn apollo() -> Value {
    json!({
        "name": "Apollo Hospitals",
        "location": "Chennai",
        "country": "India",
        "contact": "info@apollochennai.com",
        "specialties": ["Cardiology", "Oncology"]
    })
}

fn patient(email: &str, country: &str) -> Value {
    json!({
        "name": "John Doe",
        "email": email,
        "country": country,
        "status": "In Treatment",
        "assignedHospital": "Apollo Hospitals",
        "assignedDoctor": "Dr. Rajesh Kumar",
        "treatmentDate": "2024-08-15",
        "patientId": "MT001"
    })
}

#[tokio::test]
async fn hospital_lifecycle() {
    let server = start_server(AppConfig::default()).await;
    let base = &server.base;
    let client = reqwest::Client::new();

    // Create ignores a client-supplied id
    let mut body = apollo();
    body["_id"] = json!("client-id");
    let resp = client
        .post(format!("{base}/hospitals"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    let id = created["_id"].as_str().unwrap().to_string();
    assert_ne!(id, "client-id");
    assert_eq!(created["activePatients"], 0);

    // Duplicate name conflicts
    let resp = client
        .post(format!("{base}/hospitals"))
        .json(&apollo())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["code"], "conflict");
    assert_eq!(err["error"], "Hospital with this name already exists");

    // Read
    let resp = client
        .get(format!("{base}/hospitals/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = resp.json().await.unwrap();
    assert_eq!(fetched, created);

    // Partial update keeps untouched fields
    let resp = client
        .put(format!("{base}/hospitals/{id}"))
        .json(&json!({"location": "Greams Lane, Chennai"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["location"], "Greams Lane, Chennai");
    assert_eq!(updated["name"], "Apollo Hospitals");
    assert_eq!(updated["_id"], id.as_str());

    // Delete, then it is gone
    let resp = client
        .delete(format!("{base}/hospitals/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let msg: Value = resp.json().await.unwrap();
    assert_eq!(msg["message"], "Hospital deleted successfully");

    let resp = client
        .get(format!("{base}/hospitals/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["code"], "not_found");

    let resp = client
        .delete(format!("{base}/hospitals/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    server.stop().await;
}

#[tokio::test]
async fn invalid_bodies_are_rejected() {
    let server = start_server(AppConfig::default()).await;
    let base = &server.base;
    let client = reqwest::Client::new();

    // Malformed JSON
    let resp = client
        .post(format!("{base}/patients"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["code"], "validation");

    // Well-formed but invalid
    let mut body = patient("not-an-email", "USA");
    body["name"] = json!("J");
    let resp = client
        .post(format!("{base}/patients"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: Value = resp.json().await.unwrap();
    let message = err["error"].as_str().unwrap();
    assert!(message.contains("email"));
    assert!(message.contains("name"));

    // Unknown status value
    let mut body = patient("john.doe@example.com", "USA");
    body["status"] = json!("Teleported");
    let resp = client
        .post(format!("{base}/patients"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Nothing was stored
    let list: Vec<Value> = client
        .get(format!("{base}/patients"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(list.is_empty());

    server.stop().await;
}

#[tokio::test]
async fn list_query_filters_and_search_fans_out() {
    let server = start_server(AppConfig::default()).await;
    let base = &server.base;
    let client = reqwest::Client::new();

    for body in [patient("john.doe@example.com", "USA"), {
        let mut p = patient("ahmed.farsi@example.com", "UAE");
        p["name"] = json!("Ahmed Al-Farsi");
        p["patientId"] = json!("MT003");
        p
    }] {
        let resp = client
            .post(format!("{base}/patients"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }
    client
        .post(format!("{base}/hospitals"))
        .json(&apollo())
        .send()
        .await
        .unwrap();

    let all: Vec<Value> = client
        .get(format!("{base}/patients"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["name"], "John Doe");

    let matched: Vec<Value> = client
        .get(format!("{base}/patients?q=FARSI"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0]["country"], "UAE");

    let blank: Vec<Value> = client
        .get(format!("{base}/patients?q=%20"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(blank.is_empty());

    let results: Value = client
        .get(format!("{base}/search?q=apollo"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(results["patients"].as_array().unwrap().len(), 2);
    assert_eq!(results["hospitals"].as_array().unwrap().len(), 1);
    assert_eq!(results["doctors"].as_array().unwrap().len(), 0);
    assert_eq!(results["total"], 3);

    server.stop().await;
}

#[tokio::test]
async fn users_never_expose_passwords() {
    let server = start_server(AppConfig::default()).await;
    let base = &server.base;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/users"))
        .json(&json!({
            "name": "Asha Rao",
            "email": "asha@medtour.example",
            "role": "Super Admin",
            "password": "s3cret-pass"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: Value = resp.json().await.unwrap();
    assert_eq!(user["role"], "Super Admin");
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());
    let id = user["_id"].as_str().unwrap().to_string();

    // A patch cannot overwrite the stored hash
    let resp = client
        .put(format!("{base}/users/{id}"))
        .json(&json!({"name": "Asha R.", "passwordHash": "plain"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["name"], "Asha R.");
    assert!(updated.get("passwordHash").is_none());

    let resp = client
        .post(format!("{base}/users"))
        .json(&json!({
            "name": "Someone Else",
            "email": "asha@medtour.example",
            "password": "another-pass"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = client
        .post(format!("{base}/users"))
        .json(&json!({
            "name": "Short Pass",
            "email": "short@medtour.example",
            "password": "abc"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    server.stop().await;
}

#[tokio::test]
async fn invoices_feed_the_kpi() {
    let server = start_server(AppConfig::default()).await;
    let base = &server.base;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/invoices"))
        .json(&json!({
            "patientName": "John Doe",
            "patientId": "p-1",
            "amount": 15000,
            "status": "Paid",
            "dueDate": "2024-08-01",
            "issuedDate": "2024-07-15"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let invoice: Value = resp.json().await.unwrap();
    assert_eq!(invoice["issuedDate"], "2024-07-15");

    let resp = client
        .post(format!("{base}/invoices"))
        .json(&json!({
            "patientName": "John Doe",
            "patientId": "p-1",
            "amount": 0,
            "status": "Paid",
            "dueDate": "2024-08-01",
            "issuedDate": "2024-07-15"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Invoices are not searchable; `q` is ignored
    let list: Vec<Value> = client
        .get(format!("{base}/invoices?q=zzz"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.len(), 1);

    server.stop().await;
}

#[tokio::test]
async fn bad_query_and_path_get_json_errors() {
    let server = start_server(AppConfig::default()).await;
    let base = &server.base;
    let client = reqwest::Client::new();

    for url in [
        format!("{base}/hospitals?q=a&q=b"),
        format!("{base}/search?q=a&q=b"),
    ] {
        let resp = client.get(&url).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err: Value = resp.json().await.unwrap();
        assert_eq!(err["code"], "validation");
        assert!(err["error"].as_str().unwrap().contains("q"));
    }

    // Path segments that are not UTF-8
    let resp = client
        .get(format!("{base}/hospitals/%FF"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["code"], "validation");

    server.stop().await;
}

#[tokio::test]
async fn fractional_experience_and_offset_dates() {
    let server = start_server(AppConfig::default()).await;
    let base = &server.base;
    let client = reqwest::Client::new();

    let mut doctor = json!({
        "name": "Dr. Priya Sharma",
        "specialty": "Orthopedic Surgery",
        "hospital": "Fortis Healthcare",
        "email": "priya.sharma@fortis.com",
        "phone": "+91-98765-43211",
        "experience": 2.5,
        "rating": 4.9,
        "availableSlots": ["10:00-13:00"]
    });
    let resp = client
        .post(format!("{base}/doctors"))
        .json(&doctor)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["experience"], 2.5);

    doctor["email"] = json!("second@fortis.com");
    doctor["experience"] = json!(-1);
    let resp = client
        .post(format!("{base}/doctors"))
        .json(&doctor)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: Value = resp.json().await.unwrap();
    assert!(err["error"].as_str().unwrap().contains("experience"));

    // Late evening in New York is already the next day in UTC
    let mut body = patient("late@example.com", "USA");
    body["treatmentDate"] = json!("2026-10-31T23:30:00-05:00");
    let resp = client
        .post(format!("{base}/patients"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["treatmentDate"], "2026-11-01");

    server.stop().await;
}
