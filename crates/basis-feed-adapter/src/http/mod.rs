/*
[INPUT]:  HTTP client configuration and backend base URL
[OUTPUT]: Typed basis snapshots from the REST endpoint
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod basis;
pub mod client;
pub mod error;

pub use error::{FeedError, Result};

pub use client::{BasisClient, ClientConfig};
