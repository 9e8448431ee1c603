use crate::data::{ClassGroup, Hours, Period, TeacherId};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Free half-days per teacher.
///
/// Teachers are kept in identity order so that candidate enumeration, and
/// therefore tie-breaking in the engine, is stable across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailabilityIndex {
    free: BTreeMap<TeacherId, BTreeSet<(NaiveDate, Period)>>,
}

impl AvailabilityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a teacher even when no half-day is marked, so the sheet is not lost.
    pub fn add_teacher(&mut self, teacher: &str) {
        self.free.entry(teacher.to_string()).or_default();
    }

    pub fn mark_free(&mut self, teacher: &str, date: NaiveDate, period: Period) {
        self.free
            .entry(teacher.to_string())
            .or_default()
            .insert((date, period));
    }

    pub fn is_free(&self, teacher: &str, date: NaiveDate, period: Period) -> bool {
        self.free
            .get(teacher)
            .is_some_and(|slots| slots.contains(&(date, period)))
    }

    /// Consumes a half-day; returns whether it was free.
    pub fn consume(&mut self, teacher: &str, date: NaiveDate, period: Period) -> bool {
        self.free
            .get_mut(teacher)
            .is_some_and(|slots| slots.remove(&(date, period)))
    }

    pub fn teachers(&self) -> impl Iterator<Item = &str> {
        self.free.keys().map(String::as_str)
    }

    pub fn free_count(&self, teacher: &str) -> usize {
        self.free.get(teacher).map_or(0, BTreeSet::len)
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }
}

/// Remaining hours per teacher and class group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuotaLedger {
    remaining: HashMap<TeacherId, HashMap<ClassGroup, Hours>>,
}

impl QuotaLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_teacher(&mut self, teacher: &str) {
        self.remaining.entry(teacher.to_string()).or_default();
    }

    /// Last write wins when the same (teacher, class) pair is set twice.
    pub fn set(&mut self, teacher: &str, class_group: ClassGroup, hours: Hours) {
        self.remaining
            .entry(teacher.to_string())
            .or_default()
            .insert(class_group, hours);
    }

    pub fn remaining(&self, teacher: &str, class_group: ClassGroup) -> Option<Hours> {
        self.remaining
            .get(teacher)
            .and_then(|classes| classes.get(&class_group))
            .copied()
    }

    /// Takes `hours` from the entry if at least that much is left.
    /// Returns the new remaining value, or `None` when the debit is refused.
    pub fn debit(&mut self, teacher: &str, class_group: ClassGroup, hours: Hours) -> Option<Hours> {
        let entry = self
            .remaining
            .get_mut(teacher)
            .and_then(|classes| classes.get_mut(&class_group))?;
        if *entry < hours {
            return None;
        }
        *entry -= hours;
        Some(*entry)
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }
}
