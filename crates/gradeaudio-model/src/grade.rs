use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Token between the grade numeral and the volume marker ("一年级").
pub const GRADE_TOKEN: &str = "年级";

/// First-term ("upper volume") marker that follows every grade name.
pub const VOLUME_TOKEN: &str = "上册";

/// A primary-school grade. Only the first-term volume is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "GRADE_1")]
    One,
    #[serde(rename = "GRADE_2")]
    Two,
    #[serde(rename = "GRADE_3")]
    Three,
    #[serde(rename = "GRADE_4")]
    Four,
    #[serde(rename = "GRADE_5")]
    Five,
    #[serde(rename = "GRADE_6")]
    Six,
}

impl Grade {
    pub const ALL: [Grade; 6] = [
        Grade::One,
        Grade::Two,
        Grade::Three,
        Grade::Four,
        Grade::Five,
        Grade::Six,
    ];

    /// Chinese numeral used on the source site.
    pub fn numeral(self) -> &'static str {
        match self {
            Grade::One => "一",
            Grade::Two => "二",
            Grade::Three => "三",
            Grade::Four => "四",
            Grade::Five => "五",
            Grade::Six => "六",
        }
    }

    pub fn from_numeral(numeral: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.numeral() == numeral)
    }

    /// Grade from its school year, 1 through 6.
    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.get(usize::from(number).checked_sub(1)?).copied()
    }

    /// Human display name, e.g. "一年级".
    pub fn display_name(self) -> String {
        format!("{}{GRADE_TOKEN}", self.numeral())
    }

    /// Folder prefix shared by both categories, e.g. "一年级上册".
    pub fn folder_prefix(self) -> String {
        format!("{}{GRADE_TOKEN}{VOLUME_TOKEN}", self.numeral())
    }

    /// Stable identifier used in catalog ids ("GRADE_1").
    pub fn key(self) -> String {
        format!("GRADE_{}", self as u8 + 1)
    }
}

/// What a grade section contains: the textbook recordings or the word list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Textbook,
    Vocabulary,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Textbook, Category::Vocabulary];

    /// Token used both on the source site and as the folder suffix.
    pub fn token(self) -> &'static str {
        match self {
            Category::Textbook => "课本",
            Category::Vocabulary => "单词",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.token() == token)
    }

    pub fn key(self) -> &'static str {
        match self {
            Category::Textbook => "TEXTBOOK",
            Category::Vocabulary => "VOCABULARY",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum LabelError {
    #[error("label '{0}' does not start with a known grade")]
    UnknownGrade(String),

    #[error("label '{0}' is missing the first-term volume marker")]
    MissingVolume(String),

    #[error("label '{0}' does not end with a known category")]
    UnknownCategory(String),
}

/// Canonical grade/category label such as `一年级上册课本`.
///
/// Serves as the dedup key while locating sections and as the folder name
/// for that section's downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GradeLabel {
    pub grade: Grade,
    pub category: Category,
}

impl GradeLabel {
    pub fn new(grade: Grade, category: Category) -> Self {
        Self { grade, category }
    }

    pub fn folder_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GradeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.grade.folder_prefix(), self.category.token())
    }
}

impl FromStr for GradeLabel {
    type Err = LabelError;

    /// Parses a label, ignoring any whitespace inside it ("一年级上册 课本").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();

        let grade = Grade::ALL
            .into_iter()
            .find(|g| compact.starts_with(&g.display_name()))
            .ok_or_else(|| LabelError::UnknownGrade(s.to_string()))?;

        let rest = &compact[grade.display_name().len()..];
        let rest = rest
            .strip_prefix(VOLUME_TOKEN)
            .ok_or_else(|| LabelError::MissingVolume(s.to_string()))?;

        let category =
            Category::from_token(rest).ok_or_else(|| LabelError::UnknownCategory(s.to_string()))?;

        Ok(Self { grade, category })
    }
}
