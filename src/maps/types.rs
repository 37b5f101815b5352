use thiserror::Error;

use crate::error::CtrError;

/// Shortest travel time between two addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TravelTime {
    /// Duration of the fastest leg, in seconds
    Seconds(u64),
    /// The service answered but returned no leg durations
    Unreachable,
}

impl TravelTime {
    /// Sentinel used where a plain number is required: `Unreachable` is
    /// the largest representable duration.
    pub const UNREACHABLE_SECS: u64 = u64::MAX;

    pub fn as_secs(&self) -> u64 {
        match self {
            TravelTime::Seconds(secs) => *secs,
            TravelTime::Unreachable => Self::UNREACHABLE_SECS,
        }
    }

    pub fn seconds(&self) -> Option<u64> {
        match self {
            TravelTime::Seconds(secs) => Some(*secs),
            TravelTime::Unreachable => None,
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, TravelTime::Seconds(_))
    }
}

/// Errors raised while querying the directions service.
#[derive(Error, Debug)]
pub enum DistanceError {
    #[error("address must not be empty")]
    EmptyAddress,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("directions service answered with HTTP {0}")]
    Status(u16),

    #[error("directions service rejected the query with status {status}: {message}")]
    Api { status: String, message: String },

    #[error("malformed directions payload: {0}")]
    Payload(String),
}

impl From<DistanceError> for CtrError {
    fn from(err: DistanceError) -> Self {
        CtrError::ExternalService(err.to_string())
    }
}

/// Resolves the travel time between two addresses.
///
/// Addresses are passed through verbatim. Implementations issue a single
/// lookup per call; an answer without routes is `TravelTime::Unreachable`,
/// while any transport or payload failure is an error.
#[async_trait::async_trait]
pub trait DistanceResolver: Send + Sync + 'static {
    async fn resolve_travel_time(&self, from: &str, to: &str) -> Result<TravelTime, DistanceError>;
}
