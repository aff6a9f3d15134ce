use chrono::NaiveDate;

use crate::error::WorkflowError;
use crate::models::BillingAddress;
use crate::workflow::availability::AvailabilityIndex;
use crate::workflow::selection::{SelectionMode, SelectionState, Toggle};

/// Which reservation flow the wizard is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    /// Binding booking: one slot, no billing step.
    Booking,
    /// Non-binding quote: multiple slots, budget and billing details.
    Quote,
}

/// Step tags of the wizard. Forward order is fixed per flow; the booking
/// flow skips `BillingEntry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    DateSelection,
    TimeSelection,
    DetailEntry,
    BillingEntry,
    Review,
    Submitted,
    Failed,
}

/// Free-form fields accumulated across steps. Backward navigation never
/// clears these; only `Wizard::cancel` does.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardFields {
    pub guest_count: u32,
    pub event_name: String,
    pub event_theme: String,
    pub event_type: String,
    pub description: String,
    pub special_requirements: Vec<String>,
    pub service_notes: String,
    pub customer_notes: String,
    pub budget: String,
    pub billing_address: BillingAddress,
    pub terms_accepted: bool,
    pub cancellation_policy_accepted: bool,
    pub liability_waiver_signed: bool,
}

impl WizardFields {
    fn acceptance_missing(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if !self.terms_accepted {
            missing.push("isTermsAccepted".to_string());
        }
        if !self.cancellation_policy_accepted {
            missing.push("isCancellationPolicyAccepted".to_string());
        }
        if !self.liability_waiver_signed {
            missing.push("isLiabilityWaiverSigned".to_string());
        }
        missing
    }
}

/// The ordered, gated multi-step reservation process.
///
/// The step tag is the sum type; the selection and field context carry
/// everything entered so far. Forward transitions run a pure gate over
/// that context and refuse to advance (without mutating anything) when it
/// fails; backward transitions always succeed and keep the context.
#[derive(Debug, Clone)]
pub struct Wizard {
    flow: FlowKind,
    step: Step,
    selection: SelectionState,
    fields: WizardFields,
    /// Message from the last failed submission, shown in `Failed`.
    failure: Option<String>,
}

impl Wizard {
    pub fn new(flow: FlowKind) -> Self {
        let mode = match flow {
            FlowKind::Booking => SelectionMode::Single,
            FlowKind::Quote => SelectionMode::Multi,
        };
        Self {
            flow,
            step: Step::DateSelection,
            selection: SelectionState::new(mode),
            fields: WizardFields::default(),
            failure: None,
        }
    }

    pub fn flow(&self) -> FlowKind {
        self.flow
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn fields(&self) -> &WizardFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut WizardFields {
        &mut self.fields
    }

    pub fn failure_message(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Submission is allowed only from the review step.
    pub fn can_submit(&self) -> bool {
        self.step == Step::Review
    }

    // ── Selection passthrough ──

    pub fn choose_date(
        &mut self,
        date: NaiveDate,
        index: &AvailabilityIndex,
    ) -> Result<(), WorkflowError> {
        self.selection.choose_date(date, index)
    }

    pub fn toggle_slot(
        &mut self,
        slot_id: &str,
        index: &AvailabilityIndex,
    ) -> Result<Toggle, WorkflowError> {
        self.selection.toggle(slot_id, index)
    }

    // ── Transitions ──

    /// Required fields still missing before the current step may advance.
    /// Empty means the step's continue control can be enabled.
    pub fn missing_for_current_step(&self) -> Vec<String> {
        match self.step {
            Step::DateSelection => {
                if self.selection.selected_date().is_none() {
                    vec!["selectedDate".to_string()]
                } else {
                    Vec::new()
                }
            }
            Step::TimeSelection => {
                if self.selection.is_empty() {
                    vec!["timeslotId".to_string()]
                } else {
                    Vec::new()
                }
            }
            Step::DetailEntry => match self.flow {
                FlowKind::Quote => {
                    if self.fields.budget.trim().is_empty() {
                        vec!["budget".to_string()]
                    } else {
                        Vec::new()
                    }
                }
                FlowKind::Booking => {
                    let mut missing = Vec::new();
                    if self.fields.guest_count == 0 {
                        missing.push("noOfGuest".to_string());
                    }
                    missing.extend(self.fields.acceptance_missing());
                    missing
                }
            },
            Step::BillingEntry => {
                let mut missing: Vec<String> = self
                    .fields
                    .billing_address
                    .missing_fields()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                missing.extend(self.fields.acceptance_missing());
                missing
            }
            Step::Review | Step::Submitted | Step::Failed => Vec::new(),
        }
    }

    /// Advance one step. A failing gate returns the missing fields and
    /// leaves the wizard untouched. Advancing from `Review` onward is a
    /// no-op: the terminal transition belongs to the submission path.
    pub fn advance(&mut self) -> Result<Step, WorkflowError> {
        let missing = self.missing_for_current_step();
        if !missing.is_empty() {
            return Err(WorkflowError::ValidationGate { missing });
        }

        let next = match (self.flow, self.step) {
            (_, Step::DateSelection) => Step::TimeSelection,
            (_, Step::TimeSelection) => Step::DetailEntry,
            (FlowKind::Quote, Step::DetailEntry) => Step::BillingEntry,
            (FlowKind::Booking, Step::DetailEntry) => Step::Review,
            (_, Step::BillingEntry) => Step::Review,
            (_, current) => current,
        };

        if next != self.step {
            tracing::debug!("wizard advance: {:?} -> {:?}", self.step, next);
        }
        self.step = next;
        Ok(self.step)
    }

    /// Step backward. Always permitted; entered values are kept so moving
    /// back and forward again loses nothing. From `Failed` this returns to
    /// `Review` (same as `retry`).
    pub fn back(&mut self) -> Step {
        let prev = match (self.flow, self.step) {
            (_, Step::TimeSelection) => Step::DateSelection,
            (_, Step::DetailEntry) => Step::TimeSelection,
            (_, Step::BillingEntry) => Step::DetailEntry,
            (FlowKind::Quote, Step::Review) => Step::BillingEntry,
            (FlowKind::Booking, Step::Review) => Step::DetailEntry,
            (_, Step::Failed) => Step::Review,
            (_, current) => current,
        };
        self.step = prev;
        self.step
    }

    /// Return from `Failed` to `Review` for another submission attempt.
    pub fn retry(&mut self) -> Step {
        if self.step == Step::Failed {
            self.step = Step::Review;
            self.failure = None;
        }
        self.step
    }

    /// Abandon the wizard: back to the initial step with all accumulated
    /// state cleared.
    pub fn cancel(&mut self) {
        self.step = Step::DateSelection;
        self.selection.reset();
        self.fields = WizardFields::default();
        self.failure = None;
    }

    // ── Terminal transitions (driven by the submission path) ──

    pub(crate) fn mark_submitted(&mut self) {
        if self.step == Step::Review {
            self.step = Step::Submitted;
            self.failure = None;
        }
    }

    pub(crate) fn mark_failed(&mut self, message: String) {
        if self.step == Step::Review {
            tracing::warn!("submission failed: {message}");
            self.step = Step::Failed;
            self.failure = Some(message);
        }
    }

    /// Plain-text summary for the review step.
    pub fn review_summary(&self) -> String {
        let mut lines = Vec::new();
        if let Some(date) = self.selection.selected_date() {
            lines.push(format!("Date: {date}"));
        }
        for slot in self.selection.selected_slots() {
            lines.push(format!(
                "Slot: {} - {}",
                slot.start_time.format("%H:%M"),
                slot.end_time.format("%H:%M")
            ));
        }
        match self.flow {
            FlowKind::Booking => {
                lines.push(format!("Guests: {}", self.fields.guest_count));
                if !self.fields.event_name.is_empty() {
                    lines.push(format!("Event: {}", self.fields.event_name));
                }
            }
            FlowKind::Quote => {
                lines.push(format!("Budget: {}", self.fields.budget));
                lines.push(format!(
                    "Billing: {}, {}",
                    self.fields.billing_address.street, self.fields.billing_address.city
                ));
            }
        }
        lines.join("\n")
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ServiceKind, TimeSlot};
    use chrono::{TimeZone, Utc};

    fn make_slot(id: &str, start_hour: u32, end_hour: u32) -> TimeSlot {
        TimeSlot {
            id: id.to_string(),
            service_id: "svc-9".into(),
            service_type: ServiceKind::EventCenter,
            booking_id: None,
            start_time: Utc.with_ymd_and_hms(2024, 6, 1, start_hour, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 6, 1, end_hour, 0, 0).unwrap(),
            is_available: true,
        }
    }

    fn index() -> AvailabilityIndex {
        AvailabilityIndex::build(&[make_slot("s1", 9, 10), make_slot("s2", 11, 12)])
    }

    fn june1() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn accept_all(fields: &mut WizardFields) {
        fields.terms_accepted = true;
        fields.cancellation_policy_accepted = true;
        fields.liability_waiver_signed = true;
    }

    fn fill_billing(fields: &mut WizardFields) {
        fields.billing_address = BillingAddress {
            street: "12 Harbor Way".into(),
            city: "Lagos".into(),
            state: "LA".into(),
            country: "NG".into(),
            postal: "100001".into(),
        };
    }

    /// Drive a quote wizard all the way to Review.
    fn quote_at_review(index: &AvailabilityIndex) -> Wizard {
        let mut wizard = Wizard::new(FlowKind::Quote);
        wizard.choose_date(june1(), index).unwrap();
        wizard.advance().unwrap();
        wizard.toggle_slot("s1", index).unwrap();
        wizard.advance().unwrap();
        wizard.fields_mut().budget = "250000".into();
        wizard.advance().unwrap();
        fill_billing(wizard.fields_mut());
        accept_all(wizard.fields_mut());
        wizard.advance().unwrap();
        wizard
    }

    #[test]
    fn test_quote_happy_path_reaches_review() {
        let index = index();
        let wizard = quote_at_review(&index);
        assert_eq!(wizard.step(), Step::Review);
        assert!(wizard.can_submit());
    }

    #[test]
    fn test_date_gate_blocks_without_selection() {
        let mut wizard = Wizard::new(FlowKind::Quote);
        let err = wizard.advance().unwrap_err();
        assert_eq!(
            err,
            WorkflowError::ValidationGate {
                missing: vec!["selectedDate".into()]
            }
        );
        assert_eq!(wizard.step(), Step::DateSelection);
    }

    #[test]
    fn test_time_gate_blocks_empty_selection() {
        let index = index();
        let mut wizard = Wizard::new(FlowKind::Quote);
        wizard.choose_date(june1(), &index).unwrap();
        wizard.advance().unwrap();

        let err = wizard.advance().unwrap_err();
        assert_eq!(
            err,
            WorkflowError::ValidationGate {
                missing: vec!["timeslotId".into()]
            }
        );
        assert_eq!(wizard.step(), Step::TimeSelection);
    }

    #[test]
    fn test_detail_gate_requires_budget_for_quotes() {
        let index = index();
        let mut wizard = Wizard::new(FlowKind::Quote);
        wizard.choose_date(june1(), &index).unwrap();
        wizard.advance().unwrap();
        wizard.toggle_slot("s1", &index).unwrap();
        wizard.advance().unwrap();

        wizard.fields_mut().budget = "   ".into();
        let err = wizard.advance().unwrap_err();
        assert_eq!(
            err,
            WorkflowError::ValidationGate {
                missing: vec!["budget".into()]
            }
        );

        wizard.fields_mut().budget = "250000".into();
        assert_eq!(wizard.advance().unwrap(), Step::BillingEntry);
    }

    #[test]
    fn test_billing_gate_lists_missing_fields_and_flags() {
        let index = index();
        let mut wizard = Wizard::new(FlowKind::Quote);
        wizard.choose_date(june1(), &index).unwrap();
        wizard.advance().unwrap();
        wizard.toggle_slot("s1", &index).unwrap();
        wizard.advance().unwrap();
        wizard.fields_mut().budget = "250000".into();
        wizard.advance().unwrap();

        let err = wizard.advance().unwrap_err();
        let WorkflowError::ValidationGate { missing } = err else {
            panic!("expected validation gate");
        };
        assert!(missing.contains(&"billingAddress.street".to_string()));
        assert!(missing.contains(&"isTermsAccepted".to_string()));
        assert_eq!(wizard.step(), Step::BillingEntry);

        fill_billing(wizard.fields_mut());
        accept_all(wizard.fields_mut());
        assert_eq!(wizard.advance().unwrap(), Step::Review);
    }

    #[test]
    fn test_booking_flow_skips_billing() {
        let index = index();
        let mut wizard = Wizard::new(FlowKind::Booking);
        wizard.choose_date(june1(), &index).unwrap();
        wizard.advance().unwrap();
        wizard.toggle_slot("s1", &index).unwrap();
        wizard.advance().unwrap();
        assert_eq!(wizard.step(), Step::DetailEntry);

        wizard.fields_mut().guest_count = 40;
        let err = wizard.advance().unwrap_err();
        let WorkflowError::ValidationGate { missing } = err else {
            panic!("expected validation gate");
        };
        assert!(missing.contains(&"isTermsAccepted".to_string()));

        accept_all(wizard.fields_mut());
        assert_eq!(wizard.advance().unwrap(), Step::Review);
    }

    #[test]
    fn test_back_and_forward_preserves_entered_values() {
        let index = index();
        let mut wizard = quote_at_review(&index);

        wizard.back(); // BillingEntry
        wizard.back(); // DetailEntry
        wizard.back(); // TimeSelection
        wizard.back(); // DateSelection
        assert_eq!(wizard.step(), Step::DateSelection);

        assert_eq!(wizard.fields().budget, "250000");
        assert_eq!(wizard.fields().billing_address.city, "Lagos");
        assert!(wizard.fields().terms_accepted);
        assert_eq!(wizard.selection().len(), 1);

        // Forward again without re-entering anything.
        wizard.advance().unwrap();
        wizard.advance().unwrap();
        wizard.advance().unwrap();
        wizard.advance().unwrap();
        assert_eq!(wizard.step(), Step::Review);
    }

    #[test]
    fn test_back_at_initial_step_stays_put() {
        let mut wizard = Wizard::new(FlowKind::Quote);
        assert_eq!(wizard.back(), Step::DateSelection);
    }

    #[test]
    fn test_cancel_resets_everything() {
        let index = index();
        let mut wizard = quote_at_review(&index);
        wizard.cancel();

        assert_eq!(wizard.step(), Step::DateSelection);
        assert!(wizard.selection().is_empty());
        assert!(wizard.selection().selected_date().is_none());
        assert_eq!(wizard.fields(), &WizardFields::default());
    }

    #[test]
    fn test_failed_submission_and_retry() {
        let index = index();
        let mut wizard = quote_at_review(&index);

        wizard.mark_failed("Slot no longer available".into());
        assert_eq!(wizard.step(), Step::Failed);
        assert_eq!(wizard.failure_message(), Some("Slot no longer available"));

        assert_eq!(wizard.retry(), Step::Review);
        assert!(wizard.failure_message().is_none());
        assert!(wizard.can_submit());
    }

    #[test]
    fn test_advance_past_review_is_a_no_op() {
        let index = index();
        let mut wizard = quote_at_review(&index);
        assert_eq!(wizard.advance().unwrap(), Step::Review);
    }

    #[test]
    fn test_mark_terminal_ignored_outside_review() {
        let mut wizard = Wizard::new(FlowKind::Quote);
        wizard.mark_submitted();
        assert_eq!(wizard.step(), Step::DateSelection);
        wizard.mark_failed("nope".into());
        assert_eq!(wizard.step(), Step::DateSelection);
        assert!(wizard.failure_message().is_none());
    }

    #[test]
    fn test_review_summary_lists_the_pick() {
        let index = index();
        let wizard = quote_at_review(&index);
        let summary = wizard.review_summary();
        assert!(summary.contains("2024-06-01"));
        assert!(summary.contains("09:00 - 10:00"));
        assert!(summary.contains("250000"));
    }
}
