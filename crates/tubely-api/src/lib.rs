//! Tubely API Library
//!
//! HTTP surface for video ingestion: JWT-authenticated upload, read endpoints
//! that mint signed URLs on demand, and the asset route for the local backend.

mod api_doc;
pub mod constants;
mod handlers;
pub mod services;
pub mod setup;
pub mod telemetry;
mod utils;

pub mod auth;
pub mod error;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use services::ingest::{UploadError, UploadStage, VideoIngestService};
