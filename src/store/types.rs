use crate::error::{CtrError, Resource};
use crate::models::{Driver, Page, Passenger, TravelRequest, UserAccount};

/// A record with a store-assigned identifier.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Resource reported in not-found errors
    const RESOURCE: Resource;

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
}

impl Entity for Driver {
    const RESOURCE: Resource = Resource::Driver;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl Entity for Passenger {
    const RESOURCE: Resource = Resource::Passenger;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl Entity for TravelRequest {
    const RESOURCE: Resource = Resource::TravelRequest;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl Entity for UserAccount {
    const RESOURCE: Resource = Resource::User;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

/// Trait defining the persistence operations for one entity type.
/// This abstraction allows for different store implementations (memory, SQL, etc.)
/// while keeping the workflows unchanged.
///
/// Every operation is atomic per record. Iteration order is creation order.
#[async_trait::async_trait]
pub trait Repository<T: Entity>: Send + Sync + 'static {
    /// All records in creation order
    async fn find_all(&self) -> Result<Vec<T>, CtrError>;

    /// Page `page` (zero based) of `size` records
    async fn find_page(&self, page: usize, size: usize) -> Result<Page<T>, CtrError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<T>, CtrError>;

    /// First record, in creation order, accepted by `matches`
    async fn find_first(
        &self,
        matches: &(dyn for<'a> Fn(&'a T) -> bool + Send + Sync),
    ) -> Result<Option<T>, CtrError>;

    /// Stores a new record under a freshly assigned id, ignoring the id it carries
    async fn create(&self, entity: T) -> Result<T, CtrError>;

    /// Replaces an existing record. Fails with NotFound if the id is unknown.
    async fn update(&self, entity: T) -> Result<T, CtrError>;

    /// Removes a record. Fails with NotFound if the id is unknown.
    async fn delete(&self, id: i64) -> Result<(), CtrError>;
}
