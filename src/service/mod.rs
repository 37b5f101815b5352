// Workflows behind the HTTP endpoints
mod travel;
mod drivers;
mod passengers;
mod auth;

pub use travel::{NearbyOptions, TravelService};
pub use drivers::DriverService;
pub use passengers::PassengerService;
pub use auth::{AuthService, AuthenticatedUser};

use crate::error::FieldError;

/// Returns the value of a required text field, rejecting absent and blank values.
/// The value itself is kept as sent.
pub(crate) fn required_text(field: &str, value: Option<String>) -> Result<String, FieldError> {
    match value {
        None => Err(FieldError::missing(field)),
        Some(v) if v.trim().is_empty() => Err(FieldError::empty(field)),
        Some(v) => Ok(v),
    }
}
