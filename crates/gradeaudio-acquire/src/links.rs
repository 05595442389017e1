use scraper::{Html, Selector};

/// Collect absolute link targets from a grade section's table.
///
/// Only hrefs starting with `http` survive; relative paths, `javascript:`,
/// `mailto:` and in-page anchors are dropped. Order follows the markup.
pub fn collect_links(table_html: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(table_html);
    let anchor_sel = Selector::parse("a[href]").expect("valid selector");

    fragment
        .select(&anchor_sel)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.starts_with("http"))
        .map(str::to_string)
        .collect()
}
