use crate::data::SchedulingOutput;
use crate::dates::from_excel_serial;
use crate::error::{PlanningError, Result};
use crate::grid::{CellValue, Grid};
use log::{debug, info};
use std::io::Cursor;
use std::path::Path;
use umya_spreadsheet::{Cell, Spreadsheet, Worksheet, reader, writer};

pub fn open(path: &Path) -> Result<Spreadsheet> {
    debug!("Reading workbook {}", path.display());
    Ok(reader::xlsx::read(path)?)
}

pub fn from_bytes(bytes: &[u8]) -> Result<Spreadsheet> {
    Ok(reader::xlsx::read_reader(Cursor::new(bytes), true)?)
}

pub fn sheets(book: &Spreadsheet) -> &[Worksheet] {
    book.get_sheet_collection()
}

impl Grid for Worksheet {
    fn name(&self) -> &str {
        self.get_name()
    }

    fn cell(&self, row: u32, col: u32) -> Option<CellValue> {
        self.get_cell((col, row)).and_then(cell_value)
    }

    fn max_row(&self) -> u32 {
        self.get_highest_row()
    }

    fn max_column(&self) -> u32 {
        self.get_highest_column()
    }
}

fn cell_value(cell: &Cell) -> Option<CellValue> {
    match cell.get_data_type() {
        "n" => {
            let number = cell.get_value_number()?;
            if has_date_format(cell) {
                from_excel_serial(number).map(CellValue::Date)
            } else {
                Some(CellValue::Number(number))
            }
        }
        "b" => Some(CellValue::Bool(cell.get_value().eq_ignore_ascii_case("true"))),
        _ => {
            let text = cell.get_value().to_string();
            (!text.is_empty()).then_some(CellValue::Text(text))
        }
    }
}

fn has_date_format(cell: &Cell) -> bool {
    cell.get_style()
        .get_number_format()
        .is_some_and(|format| is_date_format_code(format.get_format_code()))
}

/// Date codes use day/year tokens, or month tokens with no hour or second beside them.
/// Quoted text, backslash escapes and bracketed sections are not tokens; an elapsed-time
/// bracket such as `[h]` marks a duration, not a date.
fn is_date_format_code(code: &str) -> bool {
    let mut bare = String::with_capacity(code.len());
    let mut bracket = String::new();
    let mut in_quotes = false;
    let mut in_brackets = false;
    let mut chars = code.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            _ if in_quotes => {}
            '\\' => {
                chars.next();
            }
            '[' => {
                in_brackets = true;
                bracket.clear();
            }
            ']' => {
                in_brackets = false;
                if is_elapsed_time(&bracket) {
                    return false;
                }
            }
            _ if in_brackets => bracket.push(c.to_ascii_lowercase()),
            _ => bare.push(c.to_ascii_lowercase()),
        }
    }
    if bare.is_empty() || bare == "general" {
        return false;
    }
    bare.contains('d')
        || bare.contains('y')
        || (bare.contains('m') && !bare.contains('h') && !bare.contains('s'))
}

fn is_elapsed_time(bracket: &str) -> bool {
    let mut units = bracket.chars();
    let Some(first) = units.next() else {
        return false;
    };
    matches!(first, 'h' | 'm' | 's') && units.all(|c| c == first)
}

/// Writes each assigned teacher into the slot's cell; every other cell is left as is.
pub fn write_assignments(book: &mut Spreadsheet, output: &SchedulingOutput) -> Result<()> {
    for assignment in output.iter_assignments() {
        let location = &assignment.slot.location;
        let sheet = book
            .get_sheet_by_name_mut(&location.sheet)
            .ok_or_else(|| PlanningError::MissingSheet(location.sheet.clone()))?;
        sheet
            .get_cell_mut((location.column, location.row))
            .set_value_string(assignment.teacher.clone());
    }
    info!("Wrote {} assignments into the course workbook", output.filled_slots);
    Ok(())
}

pub fn save(book: &Spreadsheet, path: &Path) -> Result<()> {
    writer::xlsx::write(book, path)?;
    info!("Saved result workbook to {}", path.display());
    Ok(())
}

pub fn to_bytes(book: &Spreadsheet) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    writer::xlsx::write_writer(book, &mut buffer)?;
    Ok(buffer.into_inner())
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::config::LayoutConfig;
    use crate::data::{ClassGroup, Period};
    use crate::scanner::{load_availability, load_course_slots, load_quotas};
    use chrono::NaiveDate;

    #[test]
    fn date_format_codes_are_recognized() {
        assert!(is_date_format_code("yyyy-mm-dd"));
        assert!(is_date_format_code("mmm-yy"));
        assert!(is_date_format_code("[$-40C]mmmm\\ yyyy;@"));
        assert!(!is_date_format_code("General"));
        assert!(!is_date_format_code("0.00"));
        assert!(!is_date_format_code("h:mm:ss"));
        assert!(!is_date_format_code("\"day\" 0"));
        assert!(!is_date_format_code("[h]:mm"));
        assert!(!is_date_format_code("[mm]:ss"));
        assert!(!is_date_format_code("0\\d"));
        assert!(is_date_format_code("[Red]dd/mm/yyyy"));
    }

    #[test]
    fn worksheets_scan_after_a_byte_round_trip() {
        let layout = LayoutConfig::default();
        let courses = from_bytes(&to_bytes(&course_book()).unwrap()).unwrap();
        let availability = from_bytes(&to_bytes(&availability_book()).unwrap()).unwrap();
        let hours = from_bytes(&to_bytes(&hours_book()).unwrap()).unwrap();

        let slots = load_course_slots(sheets(&courses), &layout.courses, &layout.marker);
        assert_eq!(slots.len(), 3);

        let index = load_availability(sheets(&availability), &layout.availability, &layout.marker);
        let monday = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        assert!(index.is_free("Dupont", monday, Period::Morning));
        assert!(!index.is_free("Dupont", monday, Period::Afternoon));
        assert!(index.is_free("Martin", monday, Period::Afternoon));

        let quotas = load_quotas(sheets(&hours), &layout.hours);
        assert_eq!(quotas.remaining("Martin", ClassGroup::BacPro23), Some(12.0));
    }

    #[test]
    fn missing_sheet_is_reported() {
        let mut book = course_book();
        let mut output = SchedulingOutput::default();
        let mut slots = load_course_slots(
            sheets(&book),
            &LayoutConfig::default().courses,
            "X",
        );
        let mut slot = slots.remove(0);
        slot.location.sheet = "Octobre".to_string();
        output.assignments.insert(
            "Dupont".to_string(),
            vec![crate::data::Assignment {
                teacher: "Dupont".to_string(),
                slot,
            }],
        );

        let err = write_assignments(&mut book, &output).unwrap_err();
        assert!(matches!(err, PlanningError::MissingSheet(name) if name == "Octobre"));
    }
}
