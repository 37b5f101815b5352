#[path = "../common/mod.rs"]
mod common;

use actix_web::{http::header, http::StatusCode, test, web, App};
use common::{
    admin_auth, basic_auth, directions_body, nearby_uri, test_config, StubAnswer, StubResolver,
    API_KEY, DRIVER_ADDRESS, ROUTE_END, ROUTE_START,
};
use ctr::{
    api,
    config::{AppConfig, NearbyFailurePolicy},
    maps::DIRECTIONS_PATH,
    models::Role,
    store::Store,
    AppState,
};
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;

async fn state_with_stub(config: &AppConfig, resolver: StubResolver) -> web::Data<AppState> {
    let state = AppState::new(config, Store::in_memory(), Arc::new(resolver));
    state.seed_admin(config).await.unwrap();
    web::Data::new(state)
}

async fn state_with_maps(config: &AppConfig) -> web::Data<AppState> {
    let state = AppState::from_config(config).unwrap();
    state.seed_admin(config).await.unwrap();
    web::Data::new(state)
}

#[actix_web::test]
async fn test_find_nearby_travel_requests() {
    let server = MockServer::start_async().await;
    let directions = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(DIRECTIONS_PATH)
                .query_param("origin", DRIVER_ADDRESS)
                .query_param("destination", ROUTE_START)
                .query_param("key", API_KEY);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(directions_body(&[&[1500], &[1200, 1800]]));
        })
        .await;

    let config = test_config(&server.base_url());
    let state = state_with_maps(&config).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    // Create passenger
    let req = test::TestRequest::post()
        .uri("/passengers")
        .insert_header(admin_auth())
        .set_json(json!({ "name": "Eder Nilson" }))
        .to_request();
    let passenger: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(passenger["name"], "Eder Nilson");
    let passenger_id = passenger["id"].as_i64().unwrap();

    // Create travel request
    let req = test::TestRequest::post()
        .uri("/travelRequest")
        .insert_header(admin_auth())
        .set_json(json!({ "passengerId": passenger_id, "origin": ROUTE_START, "destination": ROUTE_END }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = test::read_body_json(resp).await;
    assert!(created["id"].is_i64());
    assert_eq!(created["origin"], ROUTE_START);
    assert_eq!(created["destination"], ROUTE_END);
    assert_eq!(created["status"], "CREATED");
    assert!(created["creationDate"].is_string());
    assert_eq!(created["_links"]["passenger"]["title"], "Eder Nilson");
    assert_eq!(created["_links"]["passenger"]["href"], format!("/passengers/{}", passenger_id));

    // Query nearby requests from the driver's address
    let req = test::TestRequest::get()
        .uri(&nearby_uri(DRIVER_ADDRESS))
        .insert_header(admin_auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let nearby: Value = test::read_body_json(resp).await;
    assert_eq!(nearby[0]["id"], created["id"]);
    assert_eq!(nearby[0]["origin"], ROUTE_START);
    assert_eq!(nearby[0]["destination"], ROUTE_END);
    assert_eq!(nearby[0]["status"], "CREATED");
    assert_eq!(nearby[0]["travelTimeSeconds"], 1200);
    assert_eq!(nearby[0]["_links"]["passenger"]["href"], format!("/passengers/{}", passenger_id));
    assert_eq!(nearby[0]["_links"]["passenger"]["title"], "Eder Nilson");

    directions.assert_async().await;
}

#[actix_web::test]
async fn test_directions_failure_with_fail_policy_is_service_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(DIRECTIONS_PATH);
            then.status(500);
        })
        .await;

    let mut config = test_config(&server.base_url());
    config.nearby_failure_policy = NearbyFailurePolicy::Fail;
    let state = state_with_maps(&config).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let passenger = state
        .passengers
        .create(ctr::models::PassengerInput { name: "Eder Nilson".to_string() })
        .await
        .unwrap();
    state
        .travel
        .create_travel_request(ctr::models::TravelRequestInput {
            passenger_id: Some(passenger.id),
            origin: Some(ROUTE_START.to_string()),
            destination: Some(ROUTE_END.to_string()),
        })
        .await
        .unwrap();

    let req = test::TestRequest::get()
        .uri(&nearby_uri(DRIVER_ADDRESS))
        .insert_header(admin_auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "service_unavailable");
}

#[actix_web::test]
async fn test_directions_failure_with_skip_policy_returns_empty_list() {
    let config = test_config("http://unused.invalid");
    let state = state_with_stub(&config, StubResolver::new().answer(ROUTE_START, StubAnswer::Fail)).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let passenger = state
        .passengers
        .create(ctr::models::PassengerInput { name: "Eder Nilson".to_string() })
        .await
        .unwrap();
    state
        .travel
        .create_travel_request(ctr::models::TravelRequestInput {
            passenger_id: Some(passenger.id),
            origin: Some(ROUTE_START.to_string()),
            destination: Some(ROUTE_END.to_string()),
        })
        .await
        .unwrap();

    let req = test::TestRequest::get()
        .uri(&nearby_uri(DRIVER_ADDRESS))
        .insert_header(admin_auth())
        .to_request();
    let nearby: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(nearby, json!([]));
}

#[actix_web::test]
async fn test_missing_current_address_is_rejected() {
    let config = test_config("http://unused.invalid");
    let state = state_with_stub(&config, StubResolver::new()).await;
    let app = test::init_service(App::new().app_data(state).configure(api::configure)).await;

    let req = test::TestRequest::get()
        .uri("/travelRequest/nearby")
        .insert_header(admin_auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_requests_without_valid_credentials_are_unauthorized() {
    let config = test_config("http://unused.invalid");
    let state = state_with_stub(&config, StubResolver::new()).await;
    let app = test::init_service(App::new().app_data(state).configure(api::configure)).await;

    let req = test::TestRequest::get().uri("/passengers").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));

    let req = test::TestRequest::get()
        .uri("/passengers")
        .insert_header(basic_auth("admin", "wrong"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Health stays public
    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn test_only_admins_create_passengers() {
    let config = test_config("http://unused.invalid");
    let state = state_with_stub(&config, StubResolver::new()).await;
    state.auth.create_user("motorista", "secret", vec![Role::User]).await.unwrap();
    let app = test::init_service(App::new().app_data(state).configure(api::configure)).await;

    let req = test::TestRequest::post()
        .uri("/passengers")
        .insert_header(basic_auth("motorista", "secret"))
        .set_json(json!({ "name": "Eder Nilson" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Plain users can still read
    let req = test::TestRequest::get()
        .uri("/passengers")
        .insert_header(basic_auth("motorista", "secret"))
        .to_request();
    let passengers: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(passengers, json!([]));
}

#[actix_web::test]
async fn test_travel_request_errors_are_localized() {
    let config = test_config("http://unused.invalid");
    let state = state_with_stub(&config, StubResolver::new()).await;
    let app = test::init_service(App::new().app_data(state).configure(api::configure)).await;

    // Unknown passenger, English
    let req = test::TestRequest::post()
        .uri("/travelRequest")
        .insert_header(admin_auth())
        .insert_header((header::ACCEPT_LANGUAGE, "en-US,en;q=0.9"))
        .set_json(json!({ "passengerId": 77, "origin": ROUTE_START, "destination": ROUTE_END }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "Passenger 77 not found");

    // Empty origin, default locale
    let req = test::TestRequest::post()
        .uri("/travelRequest")
        .insert_header(admin_auth())
        .set_json(json!({ "passengerId": 77, "origin": "", "destination": ROUTE_END }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["message"], "O campo 'origin' não pode estar vazio");

    // Unparseable body
    let req = test::TestRequest::post()
        .uri("/travelRequest")
        .insert_header(admin_auth())
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_driver_lifecycle() {
    let mut config = test_config("http://unused.invalid");
    config.drivers_page_size = 2;
    let state = state_with_stub(&config, StubResolver::new()).await;
    let app = test::init_service(App::new().app_data(state).configure(api::configure)).await;

    let mut ids = Vec::new();
    for name in ["Francisco Alves", "Raimundo Nonato", "Antonio Carlos"] {
        let req = test::TestRequest::post()
            .uri("/drivers")
            .insert_header(admin_auth())
            .set_json(json!({ "name": name, "birthDate": "1985-07-21" }))
            .to_request();
        let driver: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(driver["birthDate"], "1985-07-21");
        ids.push(driver["id"].as_i64().unwrap());
    }

    let req = test::TestRequest::get().uri("/drivers?page=0").insert_header(admin_auth()).to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["drivers"].as_array().unwrap().len(), 2);
    assert_eq!(page["_links"]["lastPage"]["href"], "/drivers?page=1");

    let req = test::TestRequest::patch()
        .uri(&format!("/drivers/{}", ids[0]))
        .insert_header(admin_auth())
        .set_json(json!({ "name": "Francisco A. Lima" }))
        .to_request();
    let patched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(patched["name"], "Francisco A. Lima");
    assert_eq!(patched["birthDate"], "1985-07-21");

    let req = test::TestRequest::put()
        .uri(&format!("/drivers/{}", ids[1]))
        .insert_header(admin_auth())
        .set_json(json!({ "name": "Raimundo Nonato", "birthDate": "1979-01-02" }))
        .to_request();
    let replaced: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(replaced["birthDate"], "1979-01-02");

    let req = test::TestRequest::delete()
        .uri(&format!("/drivers/{}", ids[2]))
        .insert_header(admin_auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/drivers/{}", ids[2]))
        .insert_header(admin_auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_passenger_with_travel_requests_cannot_be_deleted() {
    let config = test_config("http://unused.invalid");
    let state = state_with_stub(&config, StubResolver::new()).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let req = test::TestRequest::post()
        .uri("/passengers")
        .insert_header(admin_auth())
        .set_json(json!({ "name": "Eder Nilson" }))
        .to_request();
    let passenger: Value = test::call_and_read_body_json(&app, req).await;
    let passenger_id = passenger["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/travelRequest")
        .insert_header(admin_auth())
        .set_json(json!({ "passengerId": passenger_id, "origin": ROUTE_START, "destination": ROUTE_END }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::delete()
        .uri(&format!("/passengers/{}", passenger_id))
        .insert_header(admin_auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::patch()
        .uri(&format!("/passengers/{}", passenger_id))
        .insert_header(admin_auth())
        .set_json(json!({}))
        .to_request();
    let unchanged: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(unchanged["name"], "Eder Nilson");
}

async fn preflight_status(origins: &[&str], origin: &str) -> StatusCode {
    let mut config = test_config("http://unused.invalid");
    config.cors_allowed_origins = origins.iter().map(|o| o.to_string()).collect();
    let state = state_with_stub(&config, StubResolver::new()).await;
    let app = test::init_service(
        App::new()
            .app_data(state)
            .wrap(api::cors(&config))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/health")
        .insert_header((header::ORIGIN, origin))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "GET"))
        .to_request();
    test::call_service(&app, req).await.status()
}

#[actix_web::test]
async fn test_wildcard_origin_allows_any_origin_wherever_listed() {
    assert_eq!(preflight_status(&["*", "http://a.test"], "http://other.test").await, StatusCode::OK);
    assert_eq!(preflight_status(&["http://a.test", "*"], "http://other.test").await, StatusCode::OK);
}

#[actix_web::test]
async fn test_listed_origins_restrict_preflight() {
    let origins = ["http://a.test", "http://b.test"];
    assert_eq!(preflight_status(&origins, "http://b.test").await, StatusCode::OK);
    assert_eq!(preflight_status(&origins, "http://other.test").await, StatusCode::BAD_REQUEST);
}
