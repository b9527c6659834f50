use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use people_graph::{router, AppState, GraphStore, PersistenceManager, PersonRepository};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::RwLock;
use tower::ServiceExt;

async fn app() -> Router {
    let store = Arc::new(RwLock::new(GraphStore::new()));
    let people = PersonRepository::new(store, None).await;
    router(AppState::new(people, "http://localhost:8080"))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::HOST, "localhost:8080")
        .body(Body::empty())
        .unwrap()
}

fn send_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, "localhost:8080")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn create(app: &Router, first: &str, last: &str) -> Value {
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/people",
            json!({ "firstName": first, "lastName": last }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn test_root_lists_people() {
    let app = app().await;

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/hal+json"
    );

    let json = body_json(response).await;
    assert_eq!(
        json["_links"]["people"]["href"],
        "http://localhost:8080/people{?page,size,sort}"
    );
    assert_eq!(json["_links"]["people"]["templated"], true);
}

#[tokio::test]
async fn test_create_and_get_person() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/people",
            json!({ "firstName": "Frodo", "lastName": "Baggins" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers()[header::LOCATION],
        "http://localhost:8080/people/1"
    );
    let created = body_json(response).await;
    assert_eq!(created["firstName"], "Frodo");
    assert_eq!(created["lastName"], "Baggins");

    let response = app.oneshot(get("/people/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let person = body_json(response).await;
    assert_eq!(person["firstName"], "Frodo");
    assert_eq!(person["_links"]["self"]["href"], "http://localhost:8080/people/1");
    assert_eq!(person["_links"]["person"]["href"], "http://localhost:8080/people/1");
}

#[tokio::test]
async fn test_get_missing_person() {
    let app = app().await;

    let response = app.clone().oneshot(get("/people/42")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert!(json["error"].is_string());

    let response = app.oneshot(get("/people/frodo")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_people_paged() {
    let app = app().await;
    for (first, last) in [
        ("Frodo", "Baggins"),
        ("Sam", "Gamgee"),
        ("Merry", "Brandybuck"),
    ] {
        create(&app, first, last).await;
    }

    let response = app
        .clone()
        .oneshot(get("/people?page=0&size=2&sort=lastName,desc"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let people = json["_embedded"]["people"].as_array().unwrap();
    assert_eq!(people.len(), 2);
    assert_eq!(people[0]["lastName"], "Gamgee");
    assert_eq!(people[1]["lastName"], "Brandybuck");
    assert_eq!(json["page"]["totalElements"], 3);
    assert_eq!(json["page"]["totalPages"], 2);
    assert_eq!(json["page"]["number"], 0);
    assert_eq!(
        json["_links"]["next"]["href"],
        "http://localhost:8080/people?page=1&size=2&sort=lastName,desc"
    );
    assert!(json["_links"].get("prev").is_none());

    let response = app.oneshot(get("/people")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["page"]["size"], 20);
    assert_eq!(json["_embedded"]["people"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_list_people_rejects_bad_paging() {
    let app = app().await;

    for uri in ["/people?size=0", "/people?page=first", "/people?sort=age,asc"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_replace_and_patch_person() {
    let app = app().await;
    create(&app, "Frodo", "Baggins").await;

    let response = app
        .clone()
        .oneshot(send_json("PUT", "/people/1", json!({ "firstName": "Mr. Underhill" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["firstName"], "Mr. Underhill");
    assert_eq!(json["lastName"], Value::Null);

    let response = app
        .clone()
        .oneshot(send_json("PATCH", "/people/1", json!({ "lastName": "Baggins" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["firstName"], "Mr. Underhill");
    assert_eq!(json["lastName"], "Baggins");

    let response = app
        .clone()
        .oneshot(send_json("PATCH", "/people/1", json!({ "firstName": null })))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["firstName"], Value::Null);
    assert_eq!(json["lastName"], "Baggins");

    let response = app
        .oneshot(send_json("PUT", "/people/9", json!({ "firstName": "Nobody" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_person() {
    let app = app().await;
    create(&app, "Sam", "Gamgee").await;

    let delete = || {
        Request::builder()
            .method("DELETE")
            .uri("/people/1")
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(delete()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.clone().oneshot(get("/people/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(delete()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_find_by_last_name() {
    let app = app().await;
    create(&app, "Frodo", "Baggins").await;
    create(&app, "Sam", "Gamgee").await;
    create(&app, "Bilbo", "Baggins").await;

    let response = app
        .clone()
        .oneshot(get("/people/search/findByLastName?name=Baggins"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let people = json["_embedded"]["people"].as_array().unwrap();
    let firsts: Vec<_> = people.iter().map(|p| p["firstName"].clone()).collect();
    assert_eq!(firsts, vec![json!("Frodo"), json!("Bilbo")]);

    let response = app
        .clone()
        .oneshot(get("/people/search/findByLastName?name=Took"))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert!(json["_embedded"]["people"].as_array().unwrap().is_empty());

    let response = app
        .clone()
        .oneshot(get("/people/search/findByLastName"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(get("/people/search")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(
        json["_links"]["findByLastName"]["href"],
        "http://localhost:8080/people/search/findByLastName{?name}"
    );
}

#[tokio::test]
async fn test_malformed_bodies() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/people")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"firstName\": "))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(send_json("POST", "/people", json!({ "firstName": 7 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/people")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_status_reports_storage() {
    let temp_dir = TempDir::new().unwrap();
    let manager = Arc::new(PersistenceManager::open(temp_dir.path()).unwrap());
    let store = Arc::new(RwLock::new(GraphStore::new()));
    let people = PersonRepository::new(store, Some(manager)).await;
    let app = router(AppState::new(people, "http://localhost:8080"));

    create(&app, "Frodo", "Baggins").await;

    let response = app.oneshot(get("/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], people_graph::VERSION);
    assert_eq!(json["storage"]["nodes"], 1);
    assert_eq!(json["storage"]["persistent"], true);
}

#[tokio::test]
async fn test_list_people_page_far_past_the_end() {
    let app = app().await;
    create(&app, "Frodo", "Baggins").await;

    let response = app
        .oneshot(get(&format!("/people?page={}", usize::MAX)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["_embedded"]["people"].as_array().unwrap().is_empty());
    assert!(json["_links"].get("next").is_none());
    assert_eq!(json["page"]["totalPages"], 1);
}

#[tokio::test]
async fn test_bad_query_string_gets_json_error() {
    let app = app().await;

    for uri in [
        "/people/search/findByLastName?name=Took&name=Brandybuck",
        "/people?page=1&page=2",
    ] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

        let json = body_json(response).await;
        assert!(json["error"].is_string(), "{}", uri);
    }
}
