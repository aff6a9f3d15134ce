use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::models::TimeSlot;

/// Derived, read-only view over one availability snapshot.
///
/// Only selectable slots appear, grouped by calendar date with each day
/// ordered by start instant. A date is present iff its list is non-empty.
/// The index is rebuilt from a fresh snapshot after any mutating side
/// effect; it is never patched in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailabilityIndex {
    slots_by_date: BTreeMap<NaiveDate, Vec<TimeSlot>>,
}

impl AvailabilityIndex {
    /// Build the index from a raw slot snapshot. Pure and idempotent; an
    /// empty snapshot yields an empty index, which is a valid state.
    pub fn build(slots: &[TimeSlot]) -> Self {
        let mut slots_by_date: BTreeMap<NaiveDate, Vec<TimeSlot>> = BTreeMap::new();
        for slot in slots.iter().filter(|s| s.is_selectable()) {
            slots_by_date
                .entry(slot.date())
                .or_default()
                .push(slot.clone());
        }
        for day in slots_by_date.values_mut() {
            day.sort_by_key(|s| s.start_time);
        }
        Self { slots_by_date }
    }

    /// Membership test for a calendar day.
    pub fn is_available(&self, date: NaiveDate) -> bool {
        self.slots_by_date.contains_key(&date)
    }

    /// The day's selectable slots, ordered by start instant.
    pub fn slots_on(&self, date: NaiveDate) -> &[TimeSlot] {
        self.slots_by_date
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Look up one slot by id within a day.
    pub fn slot(&self, date: NaiveDate, slot_id: &str) -> Option<&TimeSlot> {
        self.slots_on(date).iter().find(|s| s.id == slot_id)
    }

    /// Bookable dates, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.slots_by_date.keys().copied()
    }

    /// Number of bookable dates.
    pub fn len(&self) -> usize {
        self.slots_by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots_by_date.is_empty()
    }
}

// ── Tests ──
