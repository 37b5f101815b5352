use std::sync::Arc;

use crate::error::{CtrError, FieldError, Resource};
use crate::models::{Driver, DriverInput, Page, PatchDriver};
use crate::store::Repository;

const NAME_MIN_CHARS: usize = 5;
const NAME_MAX_CHARS: usize = 255;

/// CRUD over drivers.
#[derive(Clone)]
pub struct DriverService {
    drivers: Arc<dyn Repository<Driver>>,
    page_size: usize,
}

impl DriverService {
    pub fn new(drivers: Arc<dyn Repository<Driver>>, page_size: usize) -> Self {
        Self { drivers, page_size: page_size.max(1) }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub async fn list(&self, page: usize) -> Result<Page<Driver>, CtrError> {
        self.drivers.find_page(page, self.page_size).await
    }

    pub async fn find(&self, id: i64) -> Result<Driver, CtrError> {
        self.drivers
            .find_by_id(id)
            .await?
            .ok_or_else(|| CtrError::not_found(Resource::Driver, id))
    }

    pub async fn create(&self, input: DriverInput) -> Result<Driver, CtrError> {
        validate_name(&input.name)?;
        let driver = self
            .drivers
            .create(Driver { id: 0, name: input.name, birth_date: input.birth_date })
            .await?;
        log::info!("Created driver {}", driver.id);
        Ok(driver)
    }

    /// Replaces every field of an existing driver.
    pub async fn replace(&self, id: i64, input: DriverInput) -> Result<Driver, CtrError> {
        validate_name(&input.name)?;
        let found = self.find(id).await?;
        self.drivers
            .update(Driver { name: input.name, birth_date: input.birth_date, ..found })
            .await
    }

    /// Applies the provided fields and keeps the stored value of the others.
    pub async fn patch(&self, id: i64, patch: PatchDriver) -> Result<Driver, CtrError> {
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        let found = self.find(id).await?;
        let merged = Driver {
            name: patch.name.unwrap_or(found.name),
            birth_date: patch.birth_date.unwrap_or(found.birth_date),
            id: found.id,
        };
        self.drivers.update(merged).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), CtrError> {
        self.drivers.delete(id).await?;
        log::info!("Deleted driver {}", id);
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), FieldError> {
    let chars = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&chars) {
        return Err(FieldError::length("name", NAME_MIN_CHARS, NAME_MAX_CHARS));
    }
    Ok(())
}
