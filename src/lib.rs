//! jokecrawl - joke post and comment aggregator.
//!
//! Fetches joke listings and their comments from a fixed set of upstream
//! sites, normalizes them into posts and comments, deduplicates by content
//! hash in SQLite and forwards new records to an ingestion API.

pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod pipeline;
pub mod repository;
pub mod schema;
pub mod scrapers;

pub use error::{ErrorKind, ScrapeError};
