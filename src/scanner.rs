use crate::config::{AvailabilityLayout, CourseLayout, HoursLayout};
use crate::data::{ClassGroup, CourseSlot, Period, SlotLocation};
use crate::dates::{calendar_date, extract_day, parse_month_header};
use crate::grid::Grid;
use crate::ledger::{AvailabilityIndex, QuotaLedger};
use chrono::{Datelike, NaiveDate};
use log::{debug, info, trace};

/// Extracts every marked course cell, in sheet then row then column order.
pub fn load_course_slots<G: Grid>(
    sheets: &[G],
    layout: &CourseLayout,
    marker: &str,
) -> Vec<CourseSlot> {
    let mut slots = Vec::new();

    for sheet in sheets {
        let Some((month, year)) = sheet_month(sheet, layout) else {
            debug!("Skipping sheet '{}': no month header", sheet.name());
            continue;
        };

        for row in layout.week_bands.iter().flat_map(|band| band.morning_rows()) {
            if layout.separator_rows.contains(&row) {
                continue;
            }
            let Some(date) = row_date(sheet, row, layout.day_column, month, year) else {
                trace!("Skipping row {} of '{}': no valid day", row, sheet.name());
                continue;
            };

            for &(class_group, column) in &layout.class_columns {
                for (period, slot_row) in [(Period::Morning, row), (Period::Afternoon, row + 1)] {
                    if sheet.is_marked(slot_row, column, marker) {
                        slots.push(CourseSlot {
                            date,
                            period,
                            class_group,
                            location: SlotLocation {
                                sheet: sheet.name().to_string(),
                                row: slot_row,
                                column,
                            },
                        });
                    }
                }
            }
        }
    }

    info!("Loaded {} course slots from {} sheets", slots.len(), sheets.len());
    slots
}

fn sheet_month<G: Grid>(sheet: &G, layout: &CourseLayout) -> Option<(u32, i32)> {
    let (row, col) = layout.header_cell;
    parse_month_header(&sheet.text(row, col)?)
}

fn row_date<G: Grid>(
    sheet: &G,
    row: u32,
    day_column: u32,
    month: u32,
    year: i32,
) -> Option<NaiveDate> {
    let day = extract_day(&sheet.text(row, day_column)?)?;
    calendar_date(year, month, day)
}

/// Builds the free half-day index; one sheet per teacher, named after them.
pub fn load_availability<G: Grid>(
    sheets: &[G],
    layout: &AvailabilityLayout,
    marker: &str,
) -> AvailabilityIndex {
    let mut index = AvailabilityIndex::new();

    for sheet in sheets {
        let teacher = sheet.name();
        index.add_teacher(teacher);

        let pair_columns = (layout.first_pair_column..sheet.max_column()).step_by(2);
        for morning_col in pair_columns {
            let Some(header) = sheet
                .cell(layout.header_row, morning_col)
                .and_then(|value| value.as_date())
            else {
                continue;
            };
            let afternoon_col = morning_col + 1;

            for row in layout.first_data_row..=sheet.max_row() {
                let Some(date) = availability_date(sheet, row, layout.day_column, header) else {
                    continue;
                };
                if sheet.is_marked(row, morning_col, marker) {
                    index.mark_free(teacher, date, Period::Morning);
                }
                if sheet.is_marked(row, afternoon_col, marker) {
                    index.mark_free(teacher, date, Period::Afternoon);
                }
            }
        }
        debug!("Teacher '{}' has {} free half-days", teacher, index.free_count(teacher));
    }

    info!("Loaded availability for {} teachers", index.len());
    index
}

/// The day cell must hold a plain integer.
fn availability_date<G: Grid>(
    sheet: &G,
    row: u32,
    day_column: u32,
    header: NaiveDate,
) -> Option<NaiveDate> {
    let day: u32 = sheet.text(row, day_column)?.trim().parse().ok()?;
    calendar_date(header.year(), header.month(), day)
}

/// Reads the remaining-hours table; one sheet per teacher.
/// Rows whose label is not a known class group or whose hours are not numeric are ignored.
pub fn load_quotas<G: Grid>(sheets: &[G], layout: &HoursLayout) -> QuotaLedger {
    let mut quotas = QuotaLedger::new();

    for sheet in sheets {
        let teacher = sheet.name();
        quotas.add_teacher(teacher);

        for row in layout.first_data_row..=sheet.max_row() {
            let Some(label) = sheet.text(row, layout.label_column) else {
                continue;
            };
            let Some(hours) = sheet
                .cell(row, layout.hours_column)
                .and_then(|value| value.as_number())
            else {
                continue;
            };
            match label.parse::<ClassGroup>() {
                Ok(class_group) => quotas.set(teacher, class_group, hours),
                Err(e) => trace!("Ignoring row {} of '{}': {}", row, teacher, e),
            }
        }
    }

    info!("Loaded hour quotas for {} teachers", quotas.len());
    quotas
}
