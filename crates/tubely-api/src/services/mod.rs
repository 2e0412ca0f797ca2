pub mod ingest;
pub mod signing;
