use anyhow::Result;
use gradeaudio_model::{AudioFile, Category, Grade, GradeLabel, Unit, UnitKind};
use regex::Regex;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("library root {path} is not a readable directory: {source}")]
    UnreadableRoot {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Downloaded recordings of a library, ordered by grade, category and unit.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    files: Vec<AudioFile>,
}

/// Narrows a catalog listing. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogQuery {
    pub grade: Option<Grade>,
    pub category: Option<Category>,
    pub unit: Option<Unit>,
}

impl CatalogQuery {
    fn matches(&self, file: &AudioFile) -> bool {
        self.grade.map_or(true, |g| g == file.grade)
            && self.category.map_or(true, |c| c == file.category)
            && self.unit.map_or(true, |u| u == file.unit())
    }
}

impl Catalog {
    /// Scan every `<root>/<label>/*.mp3`.
    ///
    /// Subfolders whose name is not a grade label are skipped, as are files
    /// whose name carries no unit ("Unit 3", "project2").
    pub fn scan(root: &Path) -> Result<Self, CatalogError> {
        let entries = fs::read_dir(root).map_err(|source| CatalogError::UnreadableRoot {
            path: root.display().to_string(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries.filter_map(|e| e.ok()) {
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            let folder = entry.file_name().to_string_lossy().into_owned();
            match folder.parse::<GradeLabel>() {
                Ok(label) => scan_label_folder(&dir, label, &mut files),
                Err(e) => tracing::debug!(folder = %folder, error = %e, "Not a grade folder"),
            }
        }

        files.sort_by(|a, b| {
            (a.grade, a.category, a.unit_number, a.unit_kind, &a.file_name)
                .cmp(&(b.grade, b.category, b.unit_number, b.unit_kind, &b.file_name))
        });

        Ok(Self { files })
    }

    pub fn files(&self) -> &[AudioFile] {
        &self.files
    }

    /// Grades with at least one recording.
    pub fn grades(&self) -> Vec<Grade> {
        let mut grades: Vec<Grade> = self.files.iter().map(|f| f.grade).collect();
        grades.dedup();
        grades
    }

    /// Categories with at least one recording for `grade`.
    pub fn categories(&self, grade: Grade) -> Vec<Category> {
        let mut categories: Vec<Category> = self
            .files
            .iter()
            .filter(|f| f.grade == grade)
            .map(|f| f.category)
            .collect();
        categories.dedup();
        categories
    }

    pub fn units(&self, grade: Grade, category: Category) -> Vec<&AudioFile> {
        self.files
            .iter()
            .filter(|f| f.grade == grade && f.category == category)
            .collect()
    }

    pub fn find(&self, grade: Grade, category: Category, unit: Unit) -> Option<&AudioFile> {
        self.files
            .iter()
            .find(|f| f.grade == grade && f.category == category && f.unit() == unit)
    }

    /// Recordings matching `query`, in catalog order.
    pub fn select(&self, query: &CatalogQuery) -> Vec<&AudioFile> {
        match (query.grade, query.category, query.unit) {
            (Some(grade), Some(category), Some(unit)) => {
                self.find(grade, category, unit).into_iter().collect()
            }
            (Some(grade), Some(category), None) => self.units(grade, category),
            _ => self.files.iter().filter(|f| query.matches(f)).collect(),
        }
    }
}

fn scan_label_folder(dir: &Path, label: GradeLabel, files: &mut Vec<AudioFile>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "Cannot read grade folder");
            return;
        }
    };

    let mut found = 0;
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() || !is_mp3(&path) {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        match parse_unit(&file_name) {
            Some(unit) => {
                files.push(AudioFile::new(
                    label.grade,
                    label.category,
                    unit,
                    &file_name,
                    &path.display().to_string(),
                ));
                found += 1;
            }
            None => tracing::debug!(file = %file_name, "No unit in file name, skipping"),
        }
    }
    tracing::debug!(label = %label, files = found, "Scanned grade folder");
}

/// Scan the library at `root`, log the recordings matching `query`, and
/// optionally write them as JSON.
pub fn catalog(
    root: &Path,
    query: &CatalogQuery,
    output: Option<&Path>,
) -> Result<Vec<AudioFile>> {
    let catalog = Catalog::scan(root)?;
    tracing::info!(
        grades = catalog.grades().len(),
        files = catalog.files().len(),
        "Catalogued library"
    );

    if let (Some(grade), None) = (query.grade, query.category) {
        let categories: Vec<&str> = catalog
            .categories(grade)
            .into_iter()
            .map(|c| c.token())
            .collect();
        tracing::info!(
            grade = %grade.display_name(),
            categories = ?categories,
            "Available categories"
        );
    }

    let selected: Vec<AudioFile> = catalog.select(query).into_iter().cloned().collect();
    for file in &selected {
        tracing::info!(id = %file.id, path = %file.file_path, "{}", file.full_display_name());
    }

    if let Some(output) = output {
        let json = serde_json::to_string_pretty(&selected)?;
        fs::write(output, &json)?;
        tracing::info!(path = %output.display(), entries = selected.len(), "Wrote catalog JSON");
    }

    Ok(selected)
}

/// Find a unit reference ("unit 1", "Unit10", "Project 2") in a file name.
pub fn parse_unit(file_name: &str) -> Option<Unit> {
    let re = Regex::new(r"(?i)(unit|project)\s*(\d+)").expect("valid pattern");
    let caps = re.captures(file_name)?;
    let kind = if caps[1].eq_ignore_ascii_case("project") {
        UnitKind::Project
    } else {
        UnitKind::Unit
    };
    let number = caps[2].parse().ok()?;
    Some(Unit { kind, number })
}

fn is_mp3(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("mp3"))
        .unwrap_or(false)
}
