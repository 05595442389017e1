use regex::Regex;
use scraper::{Html, Selector};

/// Title used when a secondary page has no heading at all.
pub const UNTITLED: &str = "未命名音频";

/// What a secondary article page yields for the downloader.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioPage {
    /// Filesystem-safe title.
    pub title: String,
    /// Embedded voice id, if the page carries one.
    pub file_id: Option<String>,
}

impl AudioPage {
    pub fn file_name(&self) -> String {
        format!("{}.mp3", self.title)
    }
}

pub fn parse_article(html: &str) -> AudioPage {
    AudioPage {
        title: sanitize_title(&extract_title(html)),
        file_id: find_voice_file_id(html),
    }
}

/// First `h1.rich_media_title`, else the first `h1`, else [`UNTITLED`].
pub fn extract_title(html: &str) -> String {
    let document = Html::parse_document(html);
    let rich_sel = Selector::parse("h1.rich_media_title").expect("valid selector");
    let h1_sel = Selector::parse("h1").expect("valid selector");

    document
        .select(&rich_sel)
        .next()
        .or_else(|| document.select(&h1_sel).next())
        .map(|h1| h1.text().collect::<String>().trim().to_string())
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Replace characters that are unsafe in file names (`\ / * ? : " < > |`) with `_`.
pub fn sanitize_title(title: &str) -> String {
    let re = Regex::new(r#"[\\/*?:"<>|]"#).expect("valid pattern");
    re.replace_all(title, "_").into_owned()
}

/// First `voice_encode_fileid="..."` value in the raw page text.
pub fn find_voice_file_id(html: &str) -> Option<String> {
    let re = Regex::new(r#"voice_encode_fileid="(.*?)""#).expect("valid pattern");
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Download URL for an embedded voice id.
pub fn audio_url(audio_host: &str, file_id: &str) -> String {
    format!(
        "{}/voice/getvoice?mediaid={file_id}",
        audio_host.trim_end_matches('/')
    )
}
