//! The store's only route to the remote API.
//!
//! [`CityTransport`] is the seam the store is written against; the
//! production implementation is [`HttpTransport`], tests substitute their own.

pub mod error;
pub mod http;

use std::sync::Arc;

use async_trait::async_trait;

use crate::city::{City, CityDraft, RecordId};

pub use error::TransportError;
pub use http::{HttpTransport, TimeoutConfig};

/// One request/response exchange per call; no retries.
#[async_trait]
pub trait CityTransport: Send + Sync {
    /// `GET /cities`
    async fn fetch_all(&self) -> Result<Vec<City>, TransportError>;

    /// `GET /cities/{id}`
    async fn fetch_one(&self, id: RecordId) -> Result<City, TransportError>;

    /// `POST /cities`; the returned city carries the server-assigned id.
    async fn create(&self, draft: &CityDraft) -> Result<City, TransportError>;

    /// `DELETE /cities/{id}`; the response body is ignored.
    async fn delete(&self, id: RecordId) -> Result<(), TransportError>;
}

#[async_trait]
impl<T: CityTransport + ?Sized> CityTransport for Arc<T> {
    async fn fetch_all(&self) -> Result<Vec<City>, TransportError> {
        (**self).fetch_all().await
    }

    async fn fetch_one(&self, id: RecordId) -> Result<City, TransportError> {
        (**self).fetch_one(id).await
    }

    async fn create(&self, draft: &CityDraft) -> Result<City, TransportError> {
        (**self).create(draft).await
    }

    async fn delete(&self, id: RecordId) -> Result<(), TransportError> {
        (**self).delete(id).await
    }
}
