//! Record store for video metadata.
//!
//! The upload pipeline depends only on [`VideoRepository`]; [`PgVideoRepository`]
//! is the Postgres implementation used by the server.

pub mod db;
pub mod error;

pub use db::{connect, PgVideoRepository, VideoRepository, MIGRATOR};
pub use error::{RecordError, RecordResult};
