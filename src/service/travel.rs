use futures::StreamExt;
use std::sync::Arc;
use time::OffsetDateTime;

use super::required_text;
use crate::config::{AppConfig, NearbyFailurePolicy};
use crate::error::{CtrError, FieldError, Resource};
use crate::maps::{DistanceResolver, TravelTime};
use crate::models::{
    NearbyTravelRequest, Passenger, TravelRequest, TravelRequestInput, TravelRequestStatus,
};
use crate::store::Store;

/// How a nearby query evaluates and shapes its results.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyOptions {
    /// Lookups in flight at once; 1 resolves the requests one after the other
    pub max_concurrent_lookups: usize,
    pub failure_policy: NearbyFailurePolicy,
    /// Requests with a longer (or unknown) travel time are left out
    pub max_travel_seconds: Option<u64>,
    /// Stable sort by travel time instead of storage order
    pub sort_by_travel_time: bool,
}

impl Default for NearbyOptions {
    fn default() -> Self {
        Self {
            max_concurrent_lookups: 1,
            failure_policy: NearbyFailurePolicy::Skip,
            max_travel_seconds: None,
            sort_by_travel_time: false,
        }
    }
}

impl From<&AppConfig> for NearbyOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_concurrent_lookups: config.max_concurrent_lookups.max(1),
            failure_policy: config.nearby_failure_policy,
            max_travel_seconds: config.max_travel_seconds,
            sort_by_travel_time: config.sort_nearby_by_travel_time,
        }
    }
}

/// Service handling travel request creation and nearby matching.
#[derive(Clone)]
pub struct TravelService {
    store: Store,
    resolver: Arc<dyn DistanceResolver>,
    options: NearbyOptions,
}

impl TravelService {
    pub fn new(store: Store, resolver: Arc<dyn DistanceResolver>, options: NearbyOptions) -> Self {
        Self { store, resolver, options }
    }

    pub fn options(&self) -> &NearbyOptions {
        &self.options
    }

    /// Creates a travel request for an existing passenger.
    ///
    /// Input fields are validated first, then the passenger is looked up.
    /// Nothing is stored when either check fails.
    ///
    /// # Returns
    /// - Ok((request, passenger)) with status CREATED and a server timestamp
    /// - Err(CtrError::Validation) for a missing passenger id or empty address
    /// - Err(CtrError::NotFound) if the passenger does not exist
    pub async fn create_travel_request(
        &self,
        input: TravelRequestInput,
    ) -> Result<(TravelRequest, Passenger), CtrError> {
        let passenger_id = input.passenger_id.ok_or_else(|| FieldError::missing("passengerId"))?;
        let origin = required_text("origin", input.origin)?;
        let destination = required_text("destination", input.destination)?;

        let _refs = self.store.passenger_refs.lock().await;
        let passenger = self
            .store
            .passengers
            .find_by_id(passenger_id)
            .await?
            .ok_or_else(|| CtrError::not_found(Resource::Passenger, passenger_id))?;

        let request = self
            .store
            .travel_requests
            .create(TravelRequest {
                id: 0,
                passenger_id,
                origin,
                destination,
                status: TravelRequestStatus::Created,
                creation_date: OffsetDateTime::now_utc(),
            })
            .await?;

        log::info!(
            "Created travel request {} for passenger {} from '{}' to '{}'",
            request.id, passenger.id, request.origin, request.destination
        );
        Ok((request, passenger))
    }

    /// Evaluates every stored travel request against `current_address`.
    ///
    /// The travel time is always resolved from `current_address` to the
    /// request's origin. Results keep storage order unless sorting is enabled;
    /// the failure policy decides what happens to requests whose lookup fails.
    pub async fn list_nearby(&self, current_address: &str) -> Result<Vec<NearbyTravelRequest>, CtrError> {
        if current_address.trim().is_empty() {
            return Err(FieldError::empty("currentAddress").into());
        }

        let requests = self.store.travel_requests.find_all().await?;
        let total = requests.len();
        let resolver = &self.resolver;

        let lookups = futures::stream::iter(requests)
            .map(|request| async move {
                let result = resolver.resolve_travel_time(current_address, &request.origin).await;
                (request, result)
            })
            .buffered(self.options.max_concurrent_lookups.max(1));
        let mut lookups = std::pin::pin!(lookups);

        let mut nearby = Vec::with_capacity(total);
        while let Some((request, result)) = lookups.next().await {
            let travel_time = match result {
                Ok(travel_time) => travel_time,
                Err(e) => match self.options.failure_policy {
                    NearbyFailurePolicy::Skip => {
                        log::warn!("Skipping travel request {}: {}", request.id, e);
                        continue;
                    }
                    NearbyFailurePolicy::Unreachable => {
                        log::warn!("Treating travel request {} as unreachable: {}", request.id, e);
                        TravelTime::Unreachable
                    }
                    NearbyFailurePolicy::Fail => {
                        log::warn!("Nearby query aborted at travel request {}: {}", request.id, e);
                        return Err(e.into());
                    }
                },
            };

            if let Some(max) = self.options.max_travel_seconds {
                if !travel_time.seconds().is_some_and(|secs| secs <= max) {
                    continue;
                }
            }
            nearby.push(NearbyTravelRequest { request, travel_time });
        }

        if self.options.sort_by_travel_time {
            nearby.sort_by_key(|n| n.travel_time.as_secs());
        }

        log::info!(
            "Nearby query for '{}' returned {} of {} travel requests",
            current_address,
            nearby.len(),
            total
        );
        Ok(nearby)
    }

    /// Passenger a request belongs to, if it still exists.
    pub async fn passenger_of(&self, request: &TravelRequest) -> Result<Option<Passenger>, CtrError> {
        self.store.passengers.find_by_id(request.passenger_id).await
    }
}
