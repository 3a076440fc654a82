//! Authentication seams

use crate::error::{ApiError, Result};
use crate::types::{Credentials, LoginResponse, MessageResponse};
use async_trait::async_trait;

/// Remote authentication operations used by the session store.
///
/// Implemented by [`ResourceClient`](crate::client::ResourceClient); tests
/// substitute scripted fakes.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Probe whether the current cookie session is accepted.
    ///
    /// Returns the identity when the server reports one.
    async fn probe(&self) -> Result<Option<String>>;

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse>;

    async fn logout(&self) -> Result<()>;

    async fn register(&self, credentials: &Credentials) -> Result<MessageResponse>;
}

/// Receives authorization failures observed on resource calls
pub trait AuthFailureListener: Send + Sync {
    fn on_unauthorized(&self, error: &ApiError);
}
