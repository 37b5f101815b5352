use std::sync::Arc;
use std::time::Instant;

use crate::config::AppConfig;
use crate::error::CtrError;
use crate::maps::{DistanceResolver, GoogleMapsClient};
use crate::service::{AuthService, DriverService, NearbyOptions, PassengerService, TravelService};
use crate::store::Store;

/// Services shared by every worker, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub travel: Arc<TravelService>,
    pub drivers: Arc<DriverService>,
    pub passengers: Arc<PassengerService>,
    pub auth: Arc<AuthService>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: &AppConfig, store: Store, resolver: Arc<dyn DistanceResolver>) -> Self {
        Self {
            travel: Arc::new(TravelService::new(
                store.clone(),
                resolver,
                NearbyOptions::from(config),
            )),
            drivers: Arc::new(DriverService::new(store.drivers.clone(), config.drivers_page_size)),
            passengers: Arc::new(PassengerService::new(
                store.passengers.clone(),
                store.travel_requests.clone(),
                store.passenger_refs.clone(),
            )),
            auth: Arc::new(AuthService::new(store.users.clone(), config.bcrypt_cost)),
            started_at: Instant::now(),
        }
    }

    /// In-memory store with the Google Directions client.
    pub fn from_config(config: &AppConfig) -> Result<Self, CtrError> {
        let resolver = GoogleMapsClient::from_config(config)?;
        Ok(Self::new(config, Store::in_memory(), Arc::new(resolver)))
    }

    /// Creates the configured admin account if it is missing.
    pub async fn seed_admin(&self, config: &AppConfig) -> Result<(), CtrError> {
        self.auth
            .ensure_admin(&config.admin_username, &config.admin_password)
            .await
            .map(|_| ())
    }
}
