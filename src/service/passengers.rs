use std::sync::Arc;

use super::required_text;
use crate::error::{CtrError, Resource};
use crate::models::{Passenger, PassengerInput, PatchPassenger, TravelRequest};
use crate::store::Repository;

/// CRUD over passengers.
#[derive(Clone)]
pub struct PassengerService {
    passengers: Arc<dyn Repository<Passenger>>,
    travel_requests: Arc<dyn Repository<TravelRequest>>,
    refs: Arc<tokio::sync::Mutex<()>>,
}

impl PassengerService {
    pub fn new(
        passengers: Arc<dyn Repository<Passenger>>,
        travel_requests: Arc<dyn Repository<TravelRequest>>,
        refs: Arc<tokio::sync::Mutex<()>>,
    ) -> Self {
        Self { passengers, travel_requests, refs }
    }

    pub async fn list(&self) -> Result<Vec<Passenger>, CtrError> {
        self.passengers.find_all().await
    }

    pub async fn find(&self, id: i64) -> Result<Passenger, CtrError> {
        self.passengers
            .find_by_id(id)
            .await?
            .ok_or_else(|| CtrError::not_found(Resource::Passenger, id))
    }

    pub async fn create(&self, input: PassengerInput) -> Result<Passenger, CtrError> {
        let name = required_text("name", Some(input.name))?;
        let passenger = self.passengers.create(Passenger { id: 0, name }).await?;
        log::info!("Created passenger {}", passenger.id);
        Ok(passenger)
    }

    pub async fn replace(&self, id: i64, input: PassengerInput) -> Result<Passenger, CtrError> {
        let name = required_text("name", Some(input.name))?;
        let found = self.find(id).await?;
        self.passengers.update(Passenger { name, ..found }).await
    }

    pub async fn patch(&self, id: i64, patch: PatchPassenger) -> Result<Passenger, CtrError> {
        let name = match patch.name {
            Some(name) => Some(required_text("name", Some(name))?),
            None => None,
        };
        let found = self.find(id).await?;
        self.passengers
            .update(Passenger { name: name.unwrap_or(found.name), id: found.id })
            .await
    }

    /// Deletes a passenger that no travel request refers to.
    pub async fn delete(&self, id: i64) -> Result<(), CtrError> {
        let _refs = self.refs.lock().await;
        self.find(id).await?;
        let referenced = self
            .travel_requests
            .find_all()
            .await?
            .iter()
            .any(|r| r.passenger_id == id);
        if referenced {
            return Err(CtrError::Conflict(format!("passenger {} has travel requests", id)));
        }
        self.passengers.delete(id).await?;
        log::info!("Deleted passenger {}", id);
        Ok(())
    }
}
