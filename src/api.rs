//! API endpoints for the CTR service.
//! Provides HTTP endpoints for drivers, passengers and travel requests.
//! All endpoints use JSON for request/response bodies and, except for the
//! health check, require HTTP basic authentication.

use actix_cors::Cors;
use actix_web::{
    delete, dev::Payload, error, get, patch, post, put, web, FromRequest, HttpRequest, HttpResponse,
    Responder,
};
use base64::Engine as _;
use futures::future::LocalBoxFuture;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::error::{CtrError, FieldError, LocalizedError};
use crate::locale::Locale;
use crate::models::{
    DriverInput, DriversPage, HealthStatus, Link, Links, NearbyTravelRequest, Passenger,
    PassengerInput, PatchDriver, PatchPassenger, Role, TravelRequest, TravelRequestInput,
    TravelRequestOutput,
};
use crate::service::AuthenticatedUser;
use crate::state::AppState;

/// Registers every endpoint together with the extractor error handlers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, req| {
        malformed_input("body", &err, req)
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, req| {
        malformed_input("query", &err, req)
    }))
    .app_data(web::PathConfig::default().error_handler(|err, req| {
        malformed_input("id", &err, req)
    }))
    .service(health)
    .service(make_travel_request)
    .service(list_nearby_requests)
    .service(list_drivers)
    .service(find_driver)
    .service(create_driver)
    .service(full_update_driver)
    .service(incremental_update_driver)
    .service(delete_driver)
    .service(list_passengers)
    .service(find_passenger)
    .service(create_passenger)
    .service(full_update_passenger)
    .service(incremental_update_passenger)
    .service(delete_passenger);
}

/// CORS policy: configured origins, `*` anywhere in the list meaning any origin.
pub fn cors(config: &AppConfig) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH"])
        .allow_any_header()
        .max_age(3600);
    if config.cors_allowed_origins.iter().any(|origin| origin == "*") {
        return cors.allow_any_origin();
    }
    config
        .cors_allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

fn malformed_input(field: &str, err: &dyn std::fmt::Display, req: &HttpRequest) -> error::Error {
    CtrError::Validation(FieldError::malformed(field, err.to_string()))
        .localized(Locale::of(req))
        .into()
}

impl FromRequest for AuthenticatedUser {
    type Error = LocalizedError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let locale = Locale::of(req);
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let credentials = basic_credentials(req);

        Box::pin(async move {
            let state = state.ok_or_else(|| {
                CtrError::Internal("application state not registered".to_string()).localized(locale)
            })?;
            let (username, password) =
                credentials.ok_or_else(|| CtrError::Unauthorized.localized(locale))?;
            state
                .auth
                .authenticate(&username, &password)
                .await
                .map_err(|e| e.localized(locale))
        })
    }
}

/// Username and password of a `Basic` authorization header.
fn basic_credentials(req: &HttpRequest) -> Option<(String, String)> {
    let value = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let encoded = value.strip_prefix("Basic ")?.trim();
    let decoded = base64::engine::general_purpose::STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

fn passenger_link(passenger_id: i64, passenger: Option<&Passenger>) -> Link {
    Link {
        href: format!("/passengers/{}", passenger_id),
        title: passenger.map(|p| p.name.clone()),
    }
}

fn travel_request_output(request: &TravelRequest, passenger: Option<&Passenger>) -> TravelRequestOutput {
    let mut output = TravelRequestOutput::from(request);
    output
        .links
        .insert("passenger".to_string(), passenger_link(request.passenger_id, passenger));
    output
}

async fn nearby_outputs(
    state: &AppState,
    nearby: Vec<NearbyTravelRequest>,
) -> Result<Vec<TravelRequestOutput>, CtrError> {
    let mut outputs = Vec::with_capacity(nearby.len());
    for entry in nearby {
        let passenger = state.travel.passenger_of(&entry.request).await?;
        let mut output = travel_request_output(&entry.request, passenger.as_ref());
        output.travel_time_seconds = entry.travel_time.seconds();
        outputs.push(output);
    }
    Ok(outputs)
}

/// Health check endpoint. Does not require authentication.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

/// Creates a travel request.
///
/// Body: `{"passengerId": 1, "origin": "...", "destination": "..."}`
///
/// # Returns
/// - 200 OK with the created request and a link to its passenger
/// - 400 Bad Request if a field is missing or empty
/// - 404 Not Found if the passenger does not exist
#[post("/travelRequest")]
pub async fn make_travel_request(
    _user: AuthenticatedUser,
    locale: Locale,
    body: web::Json<TravelRequestInput>,
    state: web::Data<AppState>,
) -> impl Responder {
    match state.travel.create_travel_request(body.into_inner()).await {
        Ok((request, passenger)) => {
            HttpResponse::Ok().json(travel_request_output(&request, Some(&passenger)))
        }
        Err(e) => e.response_for(locale),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyQuery {
    pub current_address: Option<String>,
}

/// Lists travel requests near the driver's current address.
///
/// # Returns
/// - 200 OK with the matching requests and their travel time in seconds
/// - 400 Bad Request if `currentAddress` is missing or empty
/// - 503 Service Unavailable if the directions service fails and the
///   failure policy is `fail`
#[get("/travelRequest/nearby")]
pub async fn list_nearby_requests(
    _user: AuthenticatedUser,
    locale: Locale,
    query: web::Query<NearbyQuery>,
    state: web::Data<AppState>,
) -> impl Responder {
    let current_address = query.into_inner().current_address.unwrap_or_default();
    let result = match state.travel.list_nearby(&current_address).await {
        Ok(nearby) => nearby_outputs(&state, nearby).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(outputs) => HttpResponse::Ok().json(outputs),
        Err(e) => e.response_for(locale),
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

/// Lists one page of drivers with a link to the last page.
#[get("/drivers")]
pub async fn list_drivers(
    _user: AuthenticatedUser,
    locale: Locale,
    query: web::Query<PageQuery>,
    state: web::Data<AppState>,
) -> impl Responder {
    match state.drivers.list(query.page.unwrap_or(0)).await {
        Ok(page) => {
            let last_page = page.total_pages.max(1) - 1;
            let mut links = Links::new();
            links.insert(
                "lastPage".to_string(),
                Link { href: format!("/drivers?page={}", last_page), title: None },
            );
            HttpResponse::Ok().json(DriversPage { drivers: page.items, links })
        }
        Err(e) => e.response_for(locale),
    }
}

#[get("/drivers/{id}")]
pub async fn find_driver(
    _user: AuthenticatedUser,
    locale: Locale,
    id: web::Path<i64>,
    state: web::Data<AppState>,
) -> impl Responder {
    match state.drivers.find(id.into_inner()).await {
        Ok(driver) => HttpResponse::Ok().json(driver),
        Err(e) => e.response_for(locale),
    }
}

#[post("/drivers")]
pub async fn create_driver(
    _user: AuthenticatedUser,
    locale: Locale,
    body: web::Json<DriverInput>,
    state: web::Data<AppState>,
) -> impl Responder {
    match state.drivers.create(body.into_inner()).await {
        Ok(driver) => HttpResponse::Ok().json(driver),
        Err(e) => e.response_for(locale),
    }
}

/// Replaces every field of a driver.
#[put("/drivers/{id}")]
pub async fn full_update_driver(
    _user: AuthenticatedUser,
    locale: Locale,
    id: web::Path<i64>,
    body: web::Json<DriverInput>,
    state: web::Data<AppState>,
) -> impl Responder {
    match state.drivers.replace(id.into_inner(), body.into_inner()).await {
        Ok(driver) => HttpResponse::Ok().json(driver),
        Err(e) => e.response_for(locale),
    }
}

/// Updates only the fields present in the body.
#[patch("/drivers/{id}")]
pub async fn incremental_update_driver(
    _user: AuthenticatedUser,
    locale: Locale,
    id: web::Path<i64>,
    body: web::Json<PatchDriver>,
    state: web::Data<AppState>,
) -> impl Responder {
    match state.drivers.patch(id.into_inner(), body.into_inner()).await {
        Ok(driver) => HttpResponse::Ok().json(driver),
        Err(e) => e.response_for(locale),
    }
}

#[delete("/drivers/{id}")]
pub async fn delete_driver(
    _user: AuthenticatedUser,
    locale: Locale,
    id: web::Path<i64>,
    state: web::Data<AppState>,
) -> impl Responder {
    match state.drivers.delete(id.into_inner()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.response_for(locale),
    }
}

#[get("/passengers")]
pub async fn list_passengers(
    _user: AuthenticatedUser,
    locale: Locale,
    state: web::Data<AppState>,
) -> impl Responder {
    match state.passengers.list().await {
        Ok(passengers) => HttpResponse::Ok().json(passengers),
        Err(e) => e.response_for(locale),
    }
}

#[get("/passengers/{id}")]
pub async fn find_passenger(
    _user: AuthenticatedUser,
    locale: Locale,
    id: web::Path<i64>,
    state: web::Data<AppState>,
) -> impl Responder {
    match state.passengers.find(id.into_inner()).await {
        Ok(passenger) => HttpResponse::Ok().json(passenger),
        Err(e) => e.response_for(locale),
    }
}

/// Creates a passenger. Restricted to administrators.
///
/// # Returns
/// - 200 OK with the created passenger
/// - 400 Bad Request if the name is empty
/// - 403 Forbidden if the caller is not an administrator
#[post("/passengers")]
pub async fn create_passenger(
    user: AuthenticatedUser,
    locale: Locale,
    body: web::Json<PassengerInput>,
    state: web::Data<AppState>,
) -> impl Responder {
    if let Err(e) = user.require_role(Role::Admin) {
        return e.response_for(locale);
    }
    match state.passengers.create(body.into_inner()).await {
        Ok(passenger) => HttpResponse::Ok().json(passenger),
        Err(e) => e.response_for(locale),
    }
}

#[put("/passengers/{id}")]
pub async fn full_update_passenger(
    _user: AuthenticatedUser,
    locale: Locale,
    id: web::Path<i64>,
    body: web::Json<PassengerInput>,
    state: web::Data<AppState>,
) -> impl Responder {
    match state.passengers.replace(id.into_inner(), body.into_inner()).await {
        Ok(passenger) => HttpResponse::Ok().json(passenger),
        Err(e) => e.response_for(locale),
    }
}

#[patch("/passengers/{id}")]
pub async fn incremental_update_passenger(
    _user: AuthenticatedUser,
    locale: Locale,
    id: web::Path<i64>,
    body: web::Json<PatchPassenger>,
    state: web::Data<AppState>,
) -> impl Responder {
    match state.passengers.patch(id.into_inner(), body.into_inner()).await {
        Ok(passenger) => HttpResponse::Ok().json(passenger),
        Err(e) => e.response_for(locale),
    }
}

/// Deletes a passenger.
///
/// # Returns
/// - 204 No Content when removed
/// - 404 Not Found if the passenger does not exist
/// - 409 Conflict if travel requests still refer to it
#[delete("/passengers/{id}")]
pub async fn delete_passenger(
    _user: AuthenticatedUser,
    locale: Locale,
    id: web::Path<i64>,
    state: web::Data<AppState>,
) -> impl Responder {
    match state.passengers.delete(id.into_inner()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.response_for(locale),
    }
}
