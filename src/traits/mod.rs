//! Seams between the SDK layers
//!
//! [`Resource`] describes how a record type is addressed and cached,
//! [`Validate`] gates write payloads before they reach the network, and the
//! auth traits connect the resource client to the session store without
//! either owning the other.

mod auth;
mod resource;

pub use auth::{AuthApi, AuthFailureListener};
pub use resource::{Resource, Validate};
