//! CTR (car travel route) backend.
//!
//! Manages drivers, passengers and travel requests, and finds travel
//! requests near a driver by asking a directions service for the travel
//! time between the driver's address and each request's origin.

pub mod api;      // HTTP endpoint handlers
pub mod config;   // Configuration management
pub mod error;    // Error types and handling
pub mod locale;   // Message localization
pub mod maps;     // Directions service client
pub mod models;   // Data structures and types
pub mod service;  // Core business logic
pub mod state;    // Shared application state
pub mod store;    // Persistence

pub use config::AppConfig;
pub use error::CtrError;
pub use state::AppState;
