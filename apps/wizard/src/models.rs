use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Service catalog ──

/// Closed set of marketplace service categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceKind {
    Catering,
    EventCenter,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Catering => "CATERING",
            ServiceKind::EventCenter => "EVENTCENTER",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CATERING" => Ok(ServiceKind::Catering),
            "EVENTCENTER" => Ok(ServiceKind::EventCenter),
            other => Err(format!("unknown service type: {other}")),
        }
    }
}

/// The service the wizard session is booking. Fetched by the listing
/// screens and handed to this core; `price` and `discount` are minor
/// currency units.
#[derive(Debug, Clone)]
pub struct ServiceOffering {
    pub id: String,
    pub kind: ServiceKind,
    pub price: i64,
    pub discount: i64,
}

// ── Availability snapshot ──

/// One bookable time window as the collaborator reports it.
///
/// Immutable from this core's perspective: a non-null `booking_id` means
/// the slot is already consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: String,
    pub service_id: String,
    pub service_type: ServiceKind,
    pub booking_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_available: bool,
}

impl TimeSlot {
    /// A slot can enter a selection only while it is marked available and
    /// not attached to an existing booking.
    pub fn is_selectable(&self) -> bool {
        self.is_available && self.booking_id.is_none()
    }

    /// Calendar date of the slot (start instant truncated to date).
    pub fn date(&self) -> NaiveDate {
        self.start_time.date_naive()
    }
}

/// Envelope of `GET /api/timeslots`.
#[derive(Debug, Deserialize)]
pub struct SlotListResponse {
    pub count: usize,
    pub data: Vec<TimeSlot>,
}

// ── Outbound payloads ──

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal: String,
}

impl BillingAddress {
    /// Names of the fields still blank, in display order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.street.trim().is_empty() {
            missing.push("billingAddress.street");
        }
        if self.city.trim().is_empty() {
            missing.push("billingAddress.city");
        }
        if self.state.trim().is_empty() {
            missing.push("billingAddress.state");
        }
        if self.country.trim().is_empty() {
            missing.push("billingAddress.country");
        }
        if self.postal.trim().is_empty() {
            missing.push("billingAddress.postal");
        }
        missing
    }
}

/// Direct-booking payload (`POST /api/bookings`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub customer_id: String,
    pub timeslot_id: Vec<String>,
    pub service_type: ServiceKind,
    pub total_before_discount: i64,
    pub discount: i64,
    pub total_after_discount: i64,
    pub booking_dates: Vec<NaiveDate>,
    pub is_terms_accepted: bool,
    pub is_cancellation_policy_accepted: bool,
    pub is_liability_waiver_signed: bool,
    pub source: String,
    pub service_notes: String,
    pub customer_notes: String,
    pub service_id: String,
    pub event_name: String,
    pub event_theme: String,
    pub event_type: String,
    pub description: String,
    pub no_of_guest: u32,
    pub special_requirements: Vec<String>,
}

/// Quote-request payload (`POST /api/quotes`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub customer_id: String,
    pub service_id: String,
    pub service_type: ServiceKind,
    pub timeslot_id: Vec<String>,
    pub budget: String,
    pub billing_address: BillingAddress,
    pub is_terms_accepted: bool,
    pub is_cancellation_policy_accepted: bool,
    pub is_liability_waiver_signed: bool,
    pub source: String,
}

/// The terminal payload, built only on final confirmation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReservationRequest {
    Booking(BookingRequest),
    Quote(QuoteRequest),
}

impl ReservationRequest {
    pub fn timeslot_ids(&self) -> &[String] {
        match self {
            ReservationRequest::Booking(req) => &req.timeslot_id,
            ReservationRequest::Quote(req) => &req.timeslot_id,
        }
    }
}

// ── Inbound results ──

/// Identity of the record the collaborator created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Confirmation {
    pub id: String,
}

/// Envelope of a successful create response.
#[derive(Debug, Deserialize)]
pub struct CreatedResponse {
    pub data: Confirmation,
}

/// Error body the collaborator returns on rejection; `message` is rendered
/// to the user unmodified.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

// ── Tests ──
