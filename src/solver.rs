use crate::data::{Assignment, BLOCK_HOURS, ClassGroup, CourseSlot, Hours, SchedulingOutput};
use crate::ledger::{AvailabilityIndex, QuotaLedger};
use itertools::Itertools;
use log::{debug, info, trace};
use std::time::Instant;

/// Greedy single-pass assignment of teachers to course slots.
///
/// Slots are taken in the given order. For each one, the eligible teacher with the
/// fewest remaining hours for the slot's class wins; ties go to the teacher whose
/// identity sorts first. The winner loses one block of hours for that class and the
/// half-day is removed from their availability, whatever class it was taken for.
/// Choices are never revisited.
pub fn assign(
    slots: &[CourseSlot],
    availability: &mut AvailabilityIndex,
    quotas: &mut QuotaLedger,
) -> SchedulingOutput {
    let start_time = Instant::now();
    let mut output = SchedulingOutput {
        total_slots: slots.len(),
        ..Default::default()
    };

    for slot in slots {
        let Some((teacher, _)) = pick_candidate(slot, availability, quotas) else {
            output.unassigned.push(slot.clone());
            continue;
        };

        // the candidate filter guarantees both succeed
        let debited = quotas.debit(&teacher, slot.class_group, BLOCK_HOURS);
        let consumed = availability.consume(&teacher, slot.date, slot.period);
        debug_assert!(debited.is_some() && consumed, "{} taken twice by {}", slot, teacher);
        trace!("{} -> {}", slot, teacher);

        output
            .assignments
            .entry(teacher.clone())
            .or_default()
            .push(Assignment {
                teacher,
                slot: slot.clone(),
            });
        output.filled_slots += 1;
    }

    info!(
        "Assigned {} of {} slots ({} unfilled) across {} teachers in {:.2?}",
        output.filled_slots,
        output.total_slots,
        output.unassigned.len(),
        output.assignments.len(),
        start_time.elapsed()
    );
    let per_class = output
        .iter_assignments()
        .map(|a| a.slot.class_group)
        .counts();
    for class_group in ClassGroup::ALL {
        if let Some(count) = per_class.get(&class_group) {
            debug!("{}: {} slots filled", class_group, count);
        }
    }

    output
}

/// Enumerates teachers in identity order and keeps the first one with the
/// smallest remaining hours.
fn pick_candidate(
    slot: &CourseSlot,
    availability: &AvailabilityIndex,
    quotas: &QuotaLedger,
) -> Option<(String, Hours)> {
    availability
        .teachers()
        .filter(|teacher| availability.is_free(teacher, slot.date, slot.period))
        .filter_map(|teacher| {
            quotas
                .remaining(teacher, slot.class_group)
                .filter(|hours| *hours >= BLOCK_HOURS)
                .map(|hours| (teacher, hours))
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(teacher, hours)| (teacher.to_string(), hours))
}
