use chrono::NaiveDate;

use crate::error::WorkflowError;
use crate::models::TimeSlot;
use crate::workflow::availability::AvailabilityIndex;

/// How many slots one selection may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Direct booking: exactly one slot; picking another replaces it.
    Single,
    /// Quote request: any number of slots, duplicate time ranges rejected.
    Multi,
}

/// What a toggle did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    Replaced,
}

/// The in-progress user selection for one wizard session.
///
/// Invariant: every selected slot belongs to the chosen date's entry in
/// the availability index it was toggled against, and no two selected
/// slots share an identical start/end pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    mode: SelectionMode,
    selected_date: Option<NaiveDate>,
    selected: Vec<TimeSlot>,
}

impl SelectionState {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            selected_date: None,
            selected: Vec::new(),
        }
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    pub fn selected_slots(&self) -> &[TimeSlot] {
        &self.selected
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.selected.iter().map(|s| s.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Choose a calendar date. A date absent from the index is rejected
    /// without touching the current state; actually changing the date
    /// drops slot picks that no longer belong to the visible day.
    pub fn choose_date(
        &mut self,
        date: NaiveDate,
        index: &AvailabilityIndex,
    ) -> Result<(), WorkflowError> {
        if !index.is_available(date) {
            return Err(WorkflowError::UnavailableDate { date });
        }
        if self.selected_date != Some(date) {
            self.clear_slots();
        }
        self.selected_date = Some(date);
        Ok(())
    }

    /// Toggle a slot in or out of the selection.
    ///
    /// Removing an already-selected slot is always permitted. Adding
    /// checks the slot's start/end pair against every selected slot and
    /// rejects exact duplicates in multi mode; single mode replaces the
    /// current pick instead.
    pub fn toggle(
        &mut self,
        slot_id: &str,
        index: &AvailabilityIndex,
    ) -> Result<Toggle, WorkflowError> {
        if let Some(pos) = self.selected.iter().position(|s| s.id == slot_id) {
            self.selected.remove(pos);
            return Ok(Toggle::Removed);
        }

        let date = self
            .selected_date
            .ok_or_else(|| WorkflowError::ValidationGate {
                missing: vec!["selectedDate".into()],
            })?;
        let slot = index
            .slot(date, slot_id)
            .ok_or_else(|| WorkflowError::UnknownSlot {
                id: slot_id.to_string(),
            })?;

        match self.mode {
            SelectionMode::Single => {
                let had_pick = !self.selected.is_empty();
                self.selected.clear();
                self.selected.push(slot.clone());
                Ok(if had_pick { Toggle::Replaced } else { Toggle::Added })
            }
            SelectionMode::Multi => {
                if self
                    .selected
                    .iter()
                    .any(|s| s.start_time == slot.start_time && s.end_time == slot.end_time)
                {
                    return Err(WorkflowError::SelectionConflict {
                        start: slot.start_time,
                        end: slot.end_time,
                    });
                }
                self.selected.push(slot.clone());
                Ok(Toggle::Added)
            }
        }
    }

    /// Drop all slot picks, keeping the chosen date.
    pub fn clear_slots(&mut self) {
        self.selected.clear();
    }

    /// Back to a blank selection (wizard cancel).
    pub fn reset(&mut self) {
        self.selected_date = None;
        self.selected.clear();
    }
}

// ── Display windows ──

/// A displayable time window backed by one selectable slot.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindow {
    pub slot_id: String,
    pub label: String,
    pub start: chrono::DateTime<chrono::Utc>,
    pub end: chrono::DateTime<chrono::Utc>,
    pub selected: bool,
}

/// Ordered display windows for a day. A date with no selectable slots
/// yields an empty list, which the caller renders as an explicit empty
/// state rather than an error.
pub fn time_windows_for(
    date: NaiveDate,
    index: &AvailabilityIndex,
    selection: &SelectionState,
) -> Vec<TimeWindow> {
    index
        .slots_on(date)
        .iter()
        .map(|slot| TimeWindow {
            slot_id: slot.id.clone(),
            label: format!(
                "{} - {}",
                slot.start_time.format("%H:%M"),
                slot.end_time.format("%H:%M")
            ),
            start: slot.start_time,
            end: slot.end_time,
            selected: selection.selected.iter().any(|s| s.id == slot.id),
        })
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceKind;
    use chrono::{TimeZone, Utc};

    fn make_slot(id: &str, day: u32, start_hour: u32, end_hour: u32) -> TimeSlot {
        TimeSlot {
            id: id.to_string(),
            service_id: "svc-9".into(),
            service_type: ServiceKind::Catering,
            booking_id: None,
            start_time: Utc.with_ymd_and_hms(2024, 6, day, start_hour, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 6, day, end_hour, 0, 0).unwrap(),
            is_available: true,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    /// Index over day 1: X 09-10, Y 09-10 (distinct slot, same range), Z 11-12.
    fn index_with_duplicate_range() -> AvailabilityIndex {
        AvailabilityIndex::build(&[
            make_slot("x", 1, 9, 10),
            make_slot("y", 1, 9, 10),
            make_slot("z", 1, 11, 12),
        ])
    }

    #[test]
    fn test_unavailable_date_click_is_rejected() {
        // Scenario: 2024-06-02 is absent from the index.
        let index = AvailabilityIndex::build(&[make_slot("s1", 1, 9, 10)]);
        let mut selection = SelectionState::new(SelectionMode::Single);

        let err = selection.choose_date(date(2), &index).unwrap_err();
        assert_eq!(err, WorkflowError::UnavailableDate { date: date(2) });
        assert!(selection.selected_date().is_none());
    }

    #[test]
    fn test_choose_available_date() {
        let index = AvailabilityIndex::build(&[make_slot("s1", 1, 9, 10)]);
        let mut selection = SelectionState::new(SelectionMode::Single);

        selection.choose_date(date(1), &index).unwrap();
        assert_eq!(selection.selected_date(), Some(date(1)));
    }

    #[test]
    fn test_changing_date_clears_slot_picks() {
        let index = AvailabilityIndex::build(&[
            make_slot("s1", 1, 9, 10),
            make_slot("s2", 3, 9, 10),
        ]);
        let mut selection = SelectionState::new(SelectionMode::Multi);

        selection.choose_date(date(1), &index).unwrap();
        selection.toggle("s1", &index).unwrap();
        assert_eq!(selection.len(), 1);

        selection.choose_date(date(3), &index).unwrap();
        assert!(selection.is_empty());

        // Re-choosing the same date keeps picks.
        selection.toggle("s2", &index).unwrap();
        selection.choose_date(date(3), &index).unwrap();
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_quote_mode_rejects_duplicate_time_range() {
        // Scenario: X then Y (same 09:00-10:00 range) conflicts; Z grows
        // the selection to two.
        let index = index_with_duplicate_range();
        let mut selection = SelectionState::new(SelectionMode::Multi);
        selection.choose_date(date(1), &index).unwrap();

        assert_eq!(selection.toggle("x", &index).unwrap(), Toggle::Added);
        let err = selection.toggle("y", &index).unwrap_err();
        assert!(matches!(err, WorkflowError::SelectionConflict { .. }));
        assert_eq!(selection.len(), 1);

        assert_eq!(selection.toggle("z", &index).unwrap(), Toggle::Added);
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_single_mode_replaces_even_on_identical_range() {
        let index = index_with_duplicate_range();
        let mut selection = SelectionState::new(SelectionMode::Single);
        selection.choose_date(date(1), &index).unwrap();

        selection.toggle("x", &index).unwrap();
        assert_eq!(selection.toggle("y", &index).unwrap(), Toggle::Replaced);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.selected_slots()[0].id, "y");
    }

    #[test]
    fn test_single_mode_replaces_different_range() {
        let index = index_with_duplicate_range();
        let mut selection = SelectionState::new(SelectionMode::Single);
        selection.choose_date(date(1), &index).unwrap();

        selection.toggle("x", &index).unwrap();
        selection.toggle("z", &index).unwrap();
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.selected_slots()[0].id, "z");
    }

    #[test]
    fn test_removal_is_always_permitted() {
        let index = index_with_duplicate_range();
        let mut selection = SelectionState::new(SelectionMode::Multi);
        selection.choose_date(date(1), &index).unwrap();

        selection.toggle("x", &index).unwrap();
        selection.toggle("z", &index).unwrap();
        assert_eq!(selection.toggle("x", &index).unwrap(), Toggle::Removed);
        assert_eq!(selection.selected_ids(), vec!["z".to_string()]);
    }

    #[test]
    fn test_toggle_without_date_is_gated() {
        let index = index_with_duplicate_range();
        let mut selection = SelectionState::new(SelectionMode::Multi);

        let err = selection.toggle("x", &index).unwrap_err();
        assert!(matches!(err, WorkflowError::ValidationGate { .. }));
    }

    #[test]
    fn test_unknown_slot_is_rejected() {
        let index = index_with_duplicate_range();
        let mut selection = SelectionState::new(SelectionMode::Multi);
        selection.choose_date(date(1), &index).unwrap();

        let err = selection.toggle("ghost", &index).unwrap_err();
        assert_eq!(err, WorkflowError::UnknownSlot { id: "ghost".into() });
        assert!(selection.is_empty());
    }

    #[test]
    fn test_windows_are_ordered_and_flag_selection() {
        let index = index_with_duplicate_range();
        let mut selection = SelectionState::new(SelectionMode::Multi);
        selection.choose_date(date(1), &index).unwrap();
        selection.toggle("z", &index).unwrap();

        let windows = time_windows_for(date(1), &index, &selection);
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].label, "09:00 - 10:00");
        assert_eq!(windows[2].label, "11:00 - 12:00");
        assert_eq!(windows[0].start, Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap());
        assert_eq!(windows[0].end, Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap());
        assert!(!windows[0].selected);
        assert!(windows[2].selected);
    }

    #[test]
    fn test_windows_for_empty_day_is_empty_state() {
        let index = index_with_duplicate_range();
        let selection = SelectionState::new(SelectionMode::Multi);
        assert!(time_windows_for(date(9), &index, &selection).is_empty());
    }
}
