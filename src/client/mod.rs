//! HTTP access to the admin API
//!
//! [`ResourceClient`] issues exactly one request per call and normalizes
//! every failure into an [`ApiError`](crate::error::ApiError).

mod multipart;
mod resource_client;

pub use resource_client::ResourceClient;
