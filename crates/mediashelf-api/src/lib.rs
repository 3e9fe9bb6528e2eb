//! Mediashelf API Library
//!
//! HTTP handlers, error mapping and application setup over
//! [`mediashelf_services::MediaRegistryService`].

mod api_doc;
mod handlers;
mod telemetry;

pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
