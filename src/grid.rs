use chrono::NaiveDate;

/// Typed content of a single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
}

impl CellValue {
    /// Display text of the value, the form marker and day matching work on.
    pub fn text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            CellValue::Number(n) => n.to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d 00:00:00").to_string(),
            CellValue::Bool(true) => "True".to_string(),
            CellValue::Bool(false) => "False".to_string(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

/// A named sheet addressed by 1-based (row, column).
pub trait Grid {
    fn name(&self) -> &str;
    fn cell(&self, row: u32, col: u32) -> Option<CellValue>;
    fn max_row(&self) -> u32;
    fn max_column(&self) -> u32;

    fn text(&self, row: u32, col: u32) -> Option<String> {
        self.cell(row, col).map(|value| value.text())
    }

    /// True when the trimmed cell text equals `marker`, ignoring case.
    fn is_marked(&self, row: u32, col: u32, marker: &str) -> bool {
        self.text(row, col)
            .is_some_and(|text| text.trim().to_uppercase() == marker.to_uppercase())
    }
}
