//! Data models for the CTR service.
//! Defines the stored records, the request bodies accepted by the API and
//! the projections returned to clients.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::{Date, OffsetDateTime};

use crate::maps::TravelTime;

/// A driver registered on the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: i64,
    /// Full name, 5 to 255 characters
    pub name: String,
    pub birth_date: Date,
}

/// Body of driver creation and full update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverInput {
    pub name: String,
    pub birth_date: Date,
}

/// Body of a partial driver update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchDriver {
    pub name: Option<String>,
    pub birth_date: Option<Date>,
}

/// A passenger registered on the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passenger {
    pub id: i64,
    pub name: String,
}

/// Body of passenger creation and full update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassengerInput {
    pub name: String,
}

/// Body of a partial passenger update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchPassenger {
    pub name: Option<String>,
}

/// Lifecycle status of a travel request. Every request starts as `Created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TravelRequestStatus {
    Created,
    Accepted,
    Refused,
}

/// A passenger's request for a trip from `origin` to `destination`.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelRequest {
    pub id: i64,
    /// Passenger who asked for the trip; the request does not own it
    pub passenger_id: i64,
    pub origin: String,
    pub destination: String,
    pub status: TravelRequestStatus,
    /// Server clock at creation time
    pub creation_date: OffsetDateTime,
}

/// Body of `POST /travelRequest`. Fields are optional so that missing values
/// surface as validation errors instead of body parse failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelRequestInput {
    pub passenger_id: Option<i64>,
    pub origin: Option<String>,
    pub destination: Option<String>,
}

/// A stored travel request together with its travel time from the
/// address the nearby query was made for.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyTravelRequest {
    pub request: TravelRequest,
    pub travel_time: TravelTime,
}

/// Hypermedia link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Links keyed by relation name, serialized as `_links`.
pub type Links = BTreeMap<String, Link>;

/// Projection of a travel request returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelRequestOutput {
    pub id: i64,
    pub origin: String,
    pub destination: String,
    pub status: TravelRequestStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub creation_date: OffsetDateTime,
    /// Travel time in seconds from the queried address; absent when unreachable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_time_seconds: Option<u64>,
    #[serde(rename = "_links", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: Links,
}

impl From<&TravelRequest> for TravelRequestOutput {
    fn from(request: &TravelRequest) -> Self {
        Self {
            id: request.id,
            origin: request.origin.clone(),
            destination: request.destination.clone(),
            status: request.status,
            creation_date: request.creation_date,
            travel_time_seconds: None,
            links: Links::new(),
        }
    }
}

/// One page of drivers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriversPage {
    pub drivers: Vec<Driver>,
    #[serde(rename = "_links")]
    pub links: Links,
}

/// Slice of a stored collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Role granted to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

/// An account allowed to call the API.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    pub id: i64,
    pub username: String,
    /// bcrypt hash
    pub password_hash: String,
    pub enabled: bool,
    pub roles: Vec<Role>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
