//! Ingestion command handlers.

mod ingest_donation;

pub use ingest_donation::{IngestDonationCommand, IngestDonationHandler, IngestDonationResult};
