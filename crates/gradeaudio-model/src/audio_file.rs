use crate::grade::{Category, Grade};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a recording belongs to a regular unit or an end-of-block project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Unit,
    Project,
}

impl UnitKind {
    pub fn key(self) -> &'static str {
        match self {
            UnitKind::Unit => "UNIT",
            UnitKind::Project => "PROJECT",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::Unit => f.write_str("Unit"),
            UnitKind::Project => f.write_str("Project"),
        }
    }
}

/// A unit reference parsed from a file name ("Unit 3", "Project 2").
///
/// Units and projects are numbered independently, so both fields are
/// needed to identify a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    pub kind: UnitKind,
    pub number: u32,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.number)
    }
}

/// One downloaded recording in a library, located by grade, category and unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFile {
    /// `GRADE_1_TEXTBOOK_UNIT_3`, `GRADE_1_TEXTBOOK_PROJECT_1`
    pub id: String,
    pub grade: Grade,
    pub category: Category,
    pub unit_kind: UnitKind,
    pub unit_number: u32,
    pub unit_name: String,
    pub file_name: String,
    pub file_path: String,
}

impl AudioFile {
    pub fn new(
        grade: Grade,
        category: Category,
        unit: Unit,
        file_name: &str,
        file_path: &str,
    ) -> Self {
        Self {
            id: format!(
                "{}_{}_{}_{}",
                grade.key(),
                category.key(),
                unit.kind.key(),
                unit.number
            ),
            grade,
            category,
            unit_kind: unit.kind,
            unit_number: unit.number,
            unit_name: unit.to_string(),
            file_name: file_name.to_string(),
            file_path: file_path.to_string(),
        }
    }

    pub fn unit(&self) -> Unit {
        Unit {
            kind: self.unit_kind,
            number: self.unit_number,
        }
    }

    /// "一年级 - 课本 - Unit 1"
    pub fn full_display_name(&self) -> String {
        format!(
            "{} - {} - {}",
            self.grade.display_name(),
            self.category.token(),
            self.unit_name
        )
    }
}
