use crate::config::LayoutConfig;
use crate::data::SchedulingOutput;
use crate::grid::Grid;
use crate::scanner::{load_availability, load_course_slots, load_quotas};
use crate::solver;

/// Loads the three inputs and runs the assignment engine over them.
///
/// Quotas and availability are built fresh here and owned by this call, so a
/// plan never sees state left over from a previous one.
pub fn plan<H: Grid, A: Grid, C: Grid>(
    hours: &[H],
    availability: &[A],
    courses: &[C],
    layout: &LayoutConfig,
) -> SchedulingOutput {
    let mut quotas = load_quotas(hours, &layout.hours);
    let mut free = load_availability(availability, &layout.availability, &layout.marker);
    let slots = load_course_slots(courses, &layout.courses, &layout.marker);

    solver::assign(&slots, &mut free, &mut quotas)
}
