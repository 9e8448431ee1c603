use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// Type aliases for clarity
pub type TeacherId = String;
pub type Hours = f64;

/// Every course slot is one fixed teaching block of this many hours.
pub const BLOCK_HOURS: Hours = 4.0;

/// Half-day period, the unit of availability and scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Period {
    #[serde(rename = "AM")]
    Morning,
    #[serde(rename = "PM")]
    Afternoon,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Morning => write!(f, "AM"),
            Period::Afternoon => write!(f, "PM"),
        }
    }
}

/// The fixed set of class groups a course slot and an hours quota are scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum ClassGroup {
    #[serde(rename = "BAC PRO 22")]
    BacPro22,
    #[serde(rename = "BAC PRO 23")]
    BacPro23,
    #[serde(rename = "BAC PRO 24")]
    BacPro24,
    #[serde(rename = "BAC PRO 25")]
    BacPro25,
    #[serde(rename = "CORA 1 et 2")]
    Cora,
    #[serde(rename = "EC 2")]
    Ec2,
}

impl ClassGroup {
    pub const ALL: [ClassGroup; 6] = [
        ClassGroup::BacPro22,
        ClassGroup::BacPro23,
        ClassGroup::BacPro24,
        ClassGroup::BacPro25,
        ClassGroup::Cora,
        ClassGroup::Ec2,
    ];

    /// The label used in the hours workbook.
    pub fn label(&self) -> &'static str {
        match self {
            ClassGroup::BacPro22 => "BAC PRO 22",
            ClassGroup::BacPro23 => "BAC PRO 23",
            ClassGroup::BacPro24 => "BAC PRO 24",
            ClassGroup::BacPro25 => "BAC PRO 25",
            ClassGroup::Cora => "CORA 1 et 2",
            ClassGroup::Ec2 => "EC 2",
        }
    }
}

impl fmt::Display for ClassGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ClassGroup {
    type Err = String;

    /// Labels must match exactly, as they are written in the hours workbook.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClassGroup::ALL
            .into_iter()
            .find(|group| group.label() == s)
            .ok_or_else(|| format!("unknown class group: {s}"))
    }
}

/// Where a slot lives in the course workbook; only used to write the result back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotLocation {
    pub sheet: String,
    pub row: u32,
    pub column: u32,
}

/// One assignable teaching block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSlot {
    pub date: NaiveDate,
    pub period: Period,
    pub class_group: ClassGroup,
    pub location: SlotLocation,
}

impl fmt::Display for CourseSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({}!R{}C{})",
            self.date.format("%d/%m/%Y"),
            self.period,
            self.class_group,
            self.location.sheet,
            self.location.row,
            self.location.column
        )
    }
}

/// A teacher bound to a course slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub teacher: TeacherId,
    pub slot: CourseSlot,
}

/// The final output of the assignment engine.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingOutput {
    /// Per teacher, in the order slots were processed.
    pub assignments: BTreeMap<TeacherId, Vec<Assignment>>,
    pub unassigned: Vec<CourseSlot>,
    pub total_slots: usize,
    pub filled_slots: usize,
}

impl SchedulingOutput {
    pub fn iter_assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.values().flatten()
    }
}
