//! Outbound calls to the campus backend services.
//!
//! Every service speaks the same REST dialect: `GET <base>/` lists records,
//! `GET <base>/<id>/creator_id/` lists one creator's records, and mutations
//! succeed when the service answers with the expected status code.

pub mod client;
pub mod error;
pub mod services;

pub use client::HttpClient;
pub use error::FetchError;
pub use services::{HttpUpstream, RegisterOutcome, ServiceUrls, Upstream};
