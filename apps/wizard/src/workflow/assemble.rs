//! Terminal payload assembly and submission.
//!
//! `assemble` is a pure mapping from a review-ready wizard; it does not
//! re-validate step gates (the wizard owns validation) and only refuses
//! when no customer identity is present. `submit` fires exactly one
//! gateway call per confirm action and maps the outcome onto the wizard's
//! terminal steps.

use std::collections::BTreeSet;

use crate::api::BookingGateway;
use crate::error::WorkflowError;
use crate::identity::IdentityProvider;
use crate::models::{
    BookingRequest, Confirmation, QuoteRequest, ReservationRequest, ServiceOffering,
};
use crate::workflow::wizard::{FlowKind, Wizard};

/// Channel tag stamped on every outbound request.
const REQUEST_SOURCE: &str = "webapp";

/// Build the outbound payload from wizard state.
pub fn assemble(
    wizard: &Wizard,
    offering: &ServiceOffering,
    identity: &dyn IdentityProvider,
) -> Result<ReservationRequest, WorkflowError> {
    let identity = identity.current().ok_or(WorkflowError::MissingIdentity)?;

    let slots = wizard.selection().selected_slots();
    let timeslot_id = wizard.selection().selected_ids();
    let booking_dates: BTreeSet<_> = slots.iter().map(|s| s.date()).collect();
    let fields = wizard.fields();

    let request = match wizard.flow() {
        FlowKind::Booking => {
            let total_before_discount = offering.price * slots.len() as i64;
            let total_after_discount = total_before_discount - offering.discount;
            ReservationRequest::Booking(BookingRequest {
                customer_id: identity.customer_id,
                timeslot_id,
                service_type: offering.kind,
                total_before_discount,
                discount: offering.discount,
                total_after_discount,
                booking_dates: booking_dates.into_iter().collect(),
                is_terms_accepted: fields.terms_accepted,
                is_cancellation_policy_accepted: fields.cancellation_policy_accepted,
                is_liability_waiver_signed: fields.liability_waiver_signed,
                source: REQUEST_SOURCE.into(),
                service_notes: fields.service_notes.clone(),
                customer_notes: fields.customer_notes.clone(),
                service_id: offering.id.clone(),
                event_name: fields.event_name.clone(),
                event_theme: fields.event_theme.clone(),
                event_type: fields.event_type.clone(),
                description: fields.description.clone(),
                no_of_guest: fields.guest_count,
                special_requirements: fields.special_requirements.clone(),
            })
        }
        FlowKind::Quote => ReservationRequest::Quote(QuoteRequest {
            customer_id: identity.customer_id,
            service_id: offering.id.clone(),
            service_type: offering.kind,
            timeslot_id,
            budget: fields.budget.clone(),
            billing_address: fields.billing_address.clone(),
            is_terms_accepted: fields.terms_accepted,
            is_cancellation_policy_accepted: fields.cancellation_policy_accepted,
            is_liability_waiver_signed: fields.liability_waiver_signed,
            source: REQUEST_SOURCE.into(),
        }),
    };

    Ok(request)
}

/// Assemble and submit the reservation, moving the wizard to `Submitted`
/// or `Failed`. An absent identity blocks before any network call; a
/// collaborator rejection carries the server's message verbatim.
pub async fn submit<G: BookingGateway>(
    wizard: &mut Wizard,
    offering: &ServiceOffering,
    identity: &dyn IdentityProvider,
    gateway: &G,
) -> Result<Confirmation, WorkflowError> {
    if !wizard.can_submit() {
        return Err(WorkflowError::ValidationGate {
            missing: vec!["reviewConfirmation".into()],
        });
    }

    let request = assemble(wizard, offering, identity)?;
    tracing::info!(
        "submitting {} with {} slot(s)",
        match request {
            ReservationRequest::Booking(_) => "booking",
            ReservationRequest::Quote(_) => "quote request",
        },
        request.timeslot_ids().len()
    );

    let result = match &request {
        ReservationRequest::Booking(req) => gateway.create_booking(req).await,
        ReservationRequest::Quote(req) => gateway.request_quote(req).await,
    };

    match result {
        Ok(confirmation) => {
            tracing::info!("reservation confirmed: {}", confirmation.id);
            wizard.mark_submitted();
            Ok(confirmation)
        }
        Err(err) => {
            wizard.mark_failed(err.message.clone());
            Err(WorkflowError::Submission(err))
        }
    }
}

// ── Tests ──
