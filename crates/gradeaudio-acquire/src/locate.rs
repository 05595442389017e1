use gradeaudio_model::{Category, Grade, GradeLabel, GRADE_TOKEN, VOLUME_TOKEN};
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use std::collections::HashSet;

/// Down-arrow marker the source site puts in every grade section heading.
pub const SECTION_MARKER: &str = "↓↓";

/// Elements that may carry a section heading on the main article.
const HEADING_TAGS: [&str; 3] = ["p", "div", "h3"];

/// One grade/category section of the main article.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeSection {
    pub label: GradeLabel,
    /// Outer HTML of the table listing the section's secondary pages.
    pub table_html: String,
}

/// Strategy for finding grade sections on the main article page.
///
/// Kept behind a trait because the matching is tied to one page layout;
/// a layout change means a new locator, not a new pipeline.
pub trait SectionLocator: Send + Sync {
    /// Return unique sections in document order of their first heading.
    fn locate(&self, html: &str) -> Vec<GradeSection>;
}

/// Finds marker headings naming a grade and category, then takes the first
/// table after each heading.
#[derive(Debug, Clone)]
pub struct GradeHeadingLocator {
    marker: String,
    pattern: Regex,
}

impl GradeHeadingLocator {
    pub fn new() -> Self {
        Self::with_marker(SECTION_MARKER)
    }

    pub fn with_marker(marker: &str) -> Self {
        let grades = Grade::ALL.map(|g| g.numeral()).join("|");
        let categories = Category::ALL.map(|c| c.token()).join("|");
        let pattern = Regex::new(&format!(
            r"({grades}){GRADE_TOKEN}{VOLUME_TOKEN}\s*({categories})"
        ))
        .expect("valid grade heading pattern");

        Self {
            marker: marker.to_string(),
            pattern,
        }
    }

    /// Match heading text against the grade grammar.
    ///
    /// The canonical label is the matched text with whitespace removed,
    /// which is exactly the `GradeLabel` display form.
    pub fn match_label(&self, text: &str) -> Option<GradeLabel> {
        let caps = self.pattern.captures(text.trim())?;
        let grade = Grade::from_numeral(caps.get(1)?.as_str())?;
        let category = Category::from_token(caps.get(2)?.as_str())?;
        Some(GradeLabel::new(grade, category))
    }
}

impl Default for GradeHeadingLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionLocator for GradeHeadingLocator {
    fn locate(&self, html: &str) -> Vec<GradeSection> {
        let document = Html::parse_document(html);
        let elements = document_order(&document.tree);

        let mut seen = HashSet::new();
        let mut sections = Vec::new();

        for (position, element) in elements.iter().enumerate() {
            if !HEADING_TAGS.contains(&element.value().name()) {
                continue;
            }

            let text: String = element.text().collect();
            if !text.contains(&self.marker) {
                continue;
            }

            let Some(label) = self.match_label(&text) else {
                tracing::debug!(text = %text.trim(), "Marker heading without a grade label");
                continue;
            };

            // Marked seen before the table lookup: a repeat heading never
            // gets a second chance at a different table.
            if !seen.insert(label) {
                tracing::debug!(label = %label, "Skipping repeated grade heading");
                continue;
            }

            let table = elements[position + 1..]
                .iter()
                .find(|e| e.value().name() == "table");

            match table {
                Some(table) => {
                    tracing::debug!(label = %label, "Matched grade section");
                    sections.push(GradeSection {
                        label,
                        table_html: table.html(),
                    });
                }
                None => tracing::warn!(label = %label, "No table follows grade heading"),
            }
        }

        sections
    }
}

/// Every element of the tree in document order (pre-order), so that "the
/// next table" also finds tables nested inside the heading element.
fn document_order(tree: &ego_tree::Tree<Node>) -> Vec<ElementRef<'_>> {
    tree.root().descendants().filter_map(ElementRef::wrap).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(links: &[&str]) -> String {
        let rows: String = links
            .iter()
            .map(|href| format!(r#"<tr><td><a href="{href}">link</a></td></tr>"#))
            .collect();
        format!("<table>{rows}</table>")
    }

    #[test]
    fn test_match_label() {
        let locator = GradeHeadingLocator::new();
        assert_eq!(
            locator.match_label("↓↓ 二年级上册 单词 ↓↓"),
            Some(GradeLabel::new(Grade::Two, Category::Vocabulary))
        );
        assert_eq!(
            locator.match_label("点击下方 六年级上册课本↓↓"),
            Some(GradeLabel::new(Grade::Six, Category::Textbook))
        );
        assert_eq!(locator.match_label("一年级下册课本↓↓"), None);
        assert_eq!(locator.match_label("↓↓ 往期推荐"), None);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let html = format!(
            "<html><body>\
             <p>一年级上册课本↓↓</p>{}\
             <p>一年级上册  课本 ↓↓</p>{}\
             </body></html>",
            table(&["http://first"]),
            table(&["http://second"]),
        );

        let sections = GradeHeadingLocator::new().locate(&html);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].label.to_string(), "一年级上册课本");
        assert!(sections[0].table_html.contains("http://first"));
        assert!(!sections[0].table_html.contains("http://second"));
    }

    #[test]
    fn test_sections_in_document_order() {
        let html = format!(
            "<html><body>\
             <h3>三年级上册单词 ↓↓</h3>{}\
             <p>往期推荐 ↓↓</p>\
             <p>一年级上册课本 ↓↓</p>{}\
             </body></html>",
            table(&["http://words"]),
            table(&["http://book"]),
        );

        let sections = GradeHeadingLocator::new().locate(&html);
        let labels: Vec<String> = sections.iter().map(|s| s.label.to_string()).collect();

        assert_eq!(labels, vec!["三年级上册单词", "一年级上册课本"]);
        assert!(sections[1].table_html.contains("http://book"));
    }

    #[test]
    fn test_heading_without_marker_ignored() {
        let html = format!(
            "<html><body><p>一年级上册课本</p>{}</body></html>",
            table(&["http://a"])
        );
        assert!(GradeHeadingLocator::new().locate(&html).is_empty());
    }

    #[test]
    fn test_heading_without_following_table_dropped() {
        let html = format!(
            "<html><body>{}<p>四年级上册课本↓↓</p></body></html>",
            table(&["http://before"])
        );
        assert!(GradeHeadingLocator::new().locate(&html).is_empty());
    }

    #[test]
    fn test_wrapper_div_finds_nested_table() {
        // The outer div's text contains every heading, so it matches first
        // and its next table is the first one nested inside it.
        let html = format!(
            "<html><body><div>\
             <p>五年级上册课本↓↓</p>{}\
             <p>五年级上册单词↓↓</p>{}\
             </div></body></html>",
            table(&["http://book"]),
            table(&["http://words"]),
        );

        let sections = GradeHeadingLocator::new().locate(&html);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].label.to_string(), "五年级上册课本");
        assert!(sections[0].table_html.contains("http://book"));
        assert_eq!(sections[1].label.to_string(), "五年级上册单词");
        assert!(sections[1].table_html.contains("http://words"));
    }

    #[test]
    fn test_custom_marker() {
        let html = format!(
            "<html><body><p>二年级上册课本 >></p>{}</body></html>",
            table(&["http://a"])
        );
        assert!(GradeHeadingLocator::new().locate(&html).is_empty());
        assert_eq!(GradeHeadingLocator::with_marker(">>").locate(&html).len(), 1);
    }
}
