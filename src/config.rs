use crate::data::ClassGroup;
use crate::error::Result;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

/// A run of morning rows inside the course grid, `start..end` stepping by 2.
/// The afternoon row of each pair is the row immediately below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WeekBand {
    pub start: u32,
    pub end: u32,
}

impl WeekBand {
    pub fn morning_rows(&self) -> impl Iterator<Item = u32> {
        (self.start..self.end).step_by(2)
    }
}

/// Structure of the monthly course grid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CourseLayout {
    /// (row, column) of the free-text month/year header.
    pub header_cell: (u32, u32),
    pub day_column: u32,
    pub week_bands: Vec<WeekBand>,
    pub separator_rows: Vec<u32>,
    pub class_columns: Vec<(ClassGroup, u32)>,
}

impl Default for CourseLayout {
    fn default() -> Self {
        Self {
            header_cell: (1, 2),
            day_column: 2,
            week_bands: vec![
                WeekBand { start: 6, end: 16 },
                WeekBand { start: 17, end: 27 },
                WeekBand { start: 28, end: 38 },
                WeekBand { start: 39, end: 49 },
            ],
            separator_rows: vec![16, 27, 38],
            class_columns: vec![
                (ClassGroup::BacPro22, 4),
                (ClassGroup::BacPro23, 6),
                (ClassGroup::BacPro24, 8),
                (ClassGroup::BacPro25, 10),
                (ClassGroup::Cora, 12),
                (ClassGroup::Ec2, 14),
            ],
        }
    }
}

/// Structure of a teacher's availability sheet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AvailabilityLayout {
    pub header_row: u32,
    pub first_pair_column: u32,
    pub first_data_row: u32,
    pub day_column: u32,
}

impl Default for AvailabilityLayout {
    fn default() -> Self {
        Self {
            header_row: 5,
            first_pair_column: 1,
            first_data_row: 7,
            day_column: 2,
        }
    }
}

/// Structure of a teacher's hours sheet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HoursLayout {
    pub first_data_row: u32,
    pub label_column: u32,
    pub hours_column: u32,
}

impl Default for HoursLayout {
    fn default() -> Self {
        Self {
            first_data_row: 4,
            label_column: 1,
            hours_column: 2,
        }
    }
}

/// Fixed offsets of the three input workbooks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub marker: String,
    pub courses: CourseLayout,
    pub availability: AvailabilityLayout,
    pub hours: HoursLayout,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            marker: "X".to_string(),
            courses: CourseLayout::default(),
            availability: AvailabilityLayout::default(),
            hours: HoursLayout::default(),
        }
    }
}

impl LayoutConfig {
    /// Loads overrides from a JSON file; missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub max_upload_bytes: usize,
    pub layout: LayoutConfig,
}
