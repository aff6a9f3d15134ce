//! REST collaborator client.
//!
//! The server is the source of truth for availability and the final
//! arbiter of conflicts; this client only fetches the snapshot and fires
//! the terminal create calls, surfacing server rejections verbatim.

use url::Url;

use crate::error::SubmissionError;
use crate::models::{
    BookingRequest, Confirmation, CreatedResponse, ErrorBody, QuoteRequest, SlotListResponse,
    TimeSlot,
};

/// The create operations the submission path depends on. `ApiClient` is
/// the production implementation; tests substitute an in-memory gateway.
pub trait BookingGateway {
    async fn create_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<Confirmation, SubmissionError>;

    async fn request_quote(
        &self,
        request: &QuoteRequest,
    ) -> Result<Confirmation, SubmissionError>;
}

pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
        }
    }

    /// Fetch the availability snapshot for one service.
    pub async fn fetch_slots(&self, service_id: &str) -> anyhow::Result<Vec<TimeSlot>> {
        let url = self.base.join("/api/timeslots")?;

        let resp = self
            .http
            .get(url)
            .query(&[("serviceId", service_id)])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            tracing::error!("slot listing failed: {} - {}", status, text);
            anyhow::bail!("slot listing failed: {}", status);
        }

        let listing: SlotListResponse = resp.json().await?;
        if listing.count != listing.data.len() {
            tracing::warn!(
                "slot listing count mismatch: count={}, data={}",
                listing.count,
                listing.data.len()
            );
        }

        tracing::info!("fetched {} slots for service {}", listing.data.len(), service_id);
        Ok(listing.data)
    }

    /// Shared POST + failure mapping for the two create endpoints.
    async fn post_create<T: serde::Serialize>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Confirmation, SubmissionError> {
        let url = self
            .base
            .join(path)
            .map_err(|e| SubmissionError::new(e.to_string()))?;

        let resp = self
            .http
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| SubmissionError::new(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            // Prefer the server's message field; fall back to the status line.
            let message = match resp.json::<ErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => format!("request rejected: {status}"),
            };
            tracing::warn!("{} rejected: {} - {}", path, status, message);
            return Err(SubmissionError::new(message));
        }

        let created: CreatedResponse = resp
            .json()
            .await
            .map_err(|e| SubmissionError::new(e.to_string()))?;
        Ok(created.data)
    }
}

impl BookingGateway for ApiClient {
    async fn create_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<Confirmation, SubmissionError> {
        let confirmation = self.post_create("/api/bookings", request).await?;
        tracing::info!("booking created: {}", confirmation.id);
        Ok(confirmation)
    }

    async fn request_quote(
        &self,
        request: &QuoteRequest,
    ) -> Result<Confirmation, SubmissionError> {
        let confirmation = self.post_create("/api/quotes", request).await?;
        tracing::info!("quote request created: {}", confirmation.id);
        Ok(confirmation)
    }
}
