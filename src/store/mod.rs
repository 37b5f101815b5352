// Persistence for drivers, passengers, travel requests and user accounts
mod types;
mod memory;

pub use types::*;
pub use memory::MemoryRepository;

use std::sync::Arc;

use crate::models::{Driver, Passenger, TravelRequest, UserAccount};

/// Repositories for every stored entity, shared by the services.
#[derive(Clone)]
pub struct Store {
    pub drivers: Arc<dyn Repository<Driver>>,
    pub passengers: Arc<dyn Repository<Passenger>>,
    pub travel_requests: Arc<dyn Repository<TravelRequest>>,
    pub users: Arc<dyn Repository<UserAccount>>,
    /// Held by workflows that check a passenger's travel requests and then
    /// write, so creating a request and deleting its passenger never interleave
    pub passenger_refs: Arc<tokio::sync::Mutex<()>>,
}

impl Store {
    /// Store keeping every record in process memory.
    pub fn in_memory() -> Self {
        Self {
            drivers: Arc::new(MemoryRepository::<Driver>::new()),
            passengers: Arc::new(MemoryRepository::<Passenger>::new()),
            travel_requests: Arc::new(MemoryRepository::<TravelRequest>::new()),
            users: Arc::new(MemoryRepository::<UserAccount>::new()),
            passenger_refs: Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}
