use gradeaudio_acquire::config::REFERER;
use gradeaudio_acquire::{crawl, CrawlConfig, CrawlError, GradeHeadingLocator, LinkOutcome};
use std::path::Path;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HTML: &str = "text/html; charset=utf-8";

fn config(server: &MockServer, root: &Path) -> CrawlConfig {
    CrawlConfig {
        main_url: format!("{}/main", server.uri()),
        root_dir: root.to_path_buf(),
        audio_host: server.uri(),
        ..CrawlConfig::default()
    }
}

fn main_page(server: &MockServer, sections: &[(&str, &[&str])]) -> String {
    let mut body = String::from("<html><body><h1>小学英语音频合集</h1>");
    for (heading, pages) in sections {
        body.push_str(&format!("<p>{heading}</p><table>"));
        for page in *pages {
            body.push_str(&format!(
                r#"<tr><td><a href="{}/s/{page}">{page}</a></td></tr>"#,
                server.uri()
            ));
        }
        body.push_str("</table>");
    }
    body.push_str("</body></html>");
    body
}

fn article(title: &str, file_id: Option<&str>) -> String {
    let voice = file_id
        .map(|id| format!(r#"<mpvoice voice_encode_fileid="{id}" name="{title}"></mpvoice>"#))
        .unwrap_or_default();
    format!(
        r#"<html><body><h1 class="rich_media_title">{title}</h1><div id="js_content">{voice}</div></body></html>"#
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, HTML))
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_audio(server: &MockServer, media_id: &str, bytes: Vec<u8>, times: u64) {
    Mock::given(method("GET"))
        .and(path("/voice/getvoice"))
        .and(query_param("mediaid", media_id))
        .respond_with(ResponseTemplate::new(200).set_body_raw(bytes, "audio/mpeg"))
        .expect(times)
        .mount(server)
        .await;
}

fn subdirs(root: &Path) -> usize {
    std::fs::read_dir(root)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .count()
}

#[tokio::test]
async fn test_downloads_into_grade_folders() {
    let server = MockServer::start().await;
    let root = tempfile::tempdir().unwrap();

    let main = main_page(
        &server,
        &[
            ("一年级上册课本 ↓↓", &["u1", "u2"][..]),
            ("一年级上册 单词↓↓", &["w1"][..]),
        ],
    );
    Mock::given(method("GET"))
        .and(path("/main"))
        .and(header("referer", REFERER))
        .respond_with(ResponseTemplate::new(200).set_body_raw(main, HTML))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/s/u1", article("Unit 1 Hello!", Some("id-u1")), 1).await;
    mount_page(&server, "/s/u2", article("Unit 2: Colours", Some("id-u2")), 1).await;
    mount_page(&server, "/s/w1", article("Unit 1 单词", Some("id-w1")), 1).await;
    mount_audio(&server, "id-u1", vec![1u8; 3000], 1).await;
    mount_audio(&server, "id-u2", vec![2u8; 10], 1).await;
    mount_audio(&server, "id-w1", vec![3u8; 1024], 1).await;

    let summary = crawl(&config(&server, root.path()), &GradeHeadingLocator::new())
        .await
        .unwrap();

    assert_eq!(summary.grades.len(), 2);
    assert_eq!(summary.downloaded(), 3);
    assert_eq!(summary.failed(), 0);

    let book = root.path().join("一年级上册课本");
    assert_eq!(std::fs::read(book.join("Unit 1 Hello!.mp3")).unwrap(), vec![1u8; 3000]);
    assert_eq!(std::fs::read(book.join("Unit 2_ Colours.mp3")).unwrap().len(), 10);
    let words = root.path().join("一年级上册单词");
    assert_eq!(std::fs::read(words.join("Unit 1 单词.mp3")).unwrap().len(), 1024);
}

#[tokio::test]
async fn test_second_run_skips_existing_files() {
    let server = MockServer::start().await;
    let root = tempfile::tempdir().unwrap();

    let main = main_page(&server, &[("二年级上册课本↓↓", &["u1"][..])]);
    mount_page(&server, "/main", main, 2).await;
    mount_page(&server, "/s/u1", article("Unit 1", Some("id-u1")), 2).await;
    // Only the first run may hit the audio endpoint.
    mount_audio(&server, "id-u1", b"ID3 first run".to_vec(), 1).await;

    let config = config(&server, root.path());
    let locator = GradeHeadingLocator::new();

    let first = crawl(&config, &locator).await.unwrap();
    assert_eq!(first.downloaded(), 1);

    let second = crawl(&config, &locator).await.unwrap();
    assert_eq!(second.downloaded(), 0);
    assert_eq!(second.already_present(), 1);

    let file = root.path().join("二年级上册课本").join("Unit 1.mp3");
    assert_eq!(std::fs::read(file).unwrap(), b"ID3 first run");
}

#[tokio::test]
async fn test_preexisting_file_is_never_requested() {
    let server = MockServer::start().await;
    let root = tempfile::tempdir().unwrap();

    let dir = root.path().join("三年级上册单词");
    std::fs::create_dir_all(&dir).unwrap();
    // Existence alone counts, even for an empty (possibly partial) file.
    std::fs::write(dir.join("Unit 4.mp3"), b"").unwrap();

    let main = main_page(&server, &[("三年级上册单词↓↓", &["w4"][..])]);
    mount_page(&server, "/main", main, 1).await;
    mount_page(&server, "/s/w4", article("Unit 4", Some("id-w4")), 1).await;
    mount_audio(&server, "id-w4", b"never".to_vec(), 0).await;

    let summary = crawl(&config(&server, root.path()), &GradeHeadingLocator::new())
        .await
        .unwrap();

    assert_eq!(summary.already_present(), 1);
    assert_eq!(std::fs::read(dir.join("Unit 4.mp3")).unwrap(), b"");
}

#[tokio::test]
async fn test_page_without_audio_writes_nothing_and_continues() {
    let server = MockServer::start().await;
    let root = tempfile::tempdir().unwrap();

    let main = main_page(&server, &[("四年级上册课本↓↓", &["quiet", "loud"][..])]);
    mount_page(&server, "/main", main, 1).await;
    mount_page(&server, "/s/quiet", article("Unit 1", None), 1).await;
    mount_page(&server, "/s/loud", article("Unit 2", Some("id-2")), 1).await;
    mount_audio(&server, "id-2", b"mp3".to_vec(), 1).await;

    let summary = crawl(&config(&server, root.path()), &GradeHeadingLocator::new())
        .await
        .unwrap();

    let outcomes: Vec<&LinkOutcome> = summary.grades[0].links.iter().map(|l| &l.outcome).collect();
    assert_eq!(outcomes[0], &LinkOutcome::NoAudio { title: "Unit 1".into() });
    assert!(matches!(outcomes[1], LinkOutcome::Downloaded { bytes: 3, .. }));

    let dir = root.path().join("四年级上册课本");
    assert!(!dir.join("Unit 1.mp3").exists());
    assert!(dir.join("Unit 2.mp3").exists());
}

#[tokio::test]
async fn test_no_sections_creates_no_grade_folders() {
    let server = MockServer::start().await;
    let root = tempfile::tempdir().unwrap();

    let main = "<html><body><p>一年级上册课本</p><table><tr><td>\
                <a href=\"http://example.com/s/1\">1</a></td></tr></table></body></html>";
    mount_page(&server, "/main", main.to_string(), 1).await;

    let summary = crawl(&config(&server, root.path()), &GradeHeadingLocator::new())
        .await
        .unwrap();

    assert!(summary.grades.is_empty());
    assert!(summary.finished_at.is_some());
    assert_eq!(subdirs(root.path()), 0);
}

#[tokio::test]
async fn test_main_page_failure_aborts_run() {
    let server = MockServer::start().await;
    let root = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/main"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let result = crawl(&config(&server, root.path()), &GradeHeadingLocator::new()).await;

    assert!(matches!(result, Err(CrawlError::MainPage(_))));
    assert_eq!(subdirs(root.path()), 0);
}

#[tokio::test]
async fn test_failed_secondary_page_skips_only_that_link() {
    let server = MockServer::start().await;
    let root = tempfile::tempdir().unwrap();

    let main = main_page(&server, &[("五年级上册课本↓↓", &["gone", "ok"][..])]);
    mount_page(&server, "/main", main, 1).await;
    Mock::given(method("GET"))
        .and(path("/s/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/s/ok", article("Unit 2", Some("id-ok")), 1).await;
    mount_audio(&server, "id-ok", b"ok".to_vec(), 1).await;

    let summary = crawl(&config(&server, root.path()), &GradeHeadingLocator::new())
        .await
        .unwrap();

    let links = &summary.grades[0].links;
    match &links[0].outcome {
        LinkOutcome::PageFailed { reason } => assert!(reason.contains("404")),
        other => panic!("expected PageFailed, got {other:?}"),
    }
    assert!(matches!(links[1].outcome, LinkOutcome::Downloaded { .. }));
    assert_eq!(summary.failed(), 1);
}

#[tokio::test]
async fn test_rejected_download_leaves_no_file() {
    let server = MockServer::start().await;
    let root = tempfile::tempdir().unwrap();

    let main = main_page(&server, &[("六年级上册单词↓↓", &["w1"][..])]);
    mount_page(&server, "/main", main, 1).await;
    mount_page(&server, "/s/w1", article("Unit 1", Some("id-w1")), 1).await;
    Mock::given(method("GET"))
        .and(path("/voice/getvoice"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let summary = crawl(&config(&server, root.path()), &GradeHeadingLocator::new())
        .await
        .unwrap();

    match &summary.grades[0].links[0].outcome {
        LinkOutcome::DownloadFailed { reason, .. } => assert!(reason.chars().count() <= 50),
        other => panic!("expected DownloadFailed, got {other:?}"),
    }
    assert!(!root.path().join("六年级上册单词").join("Unit 1.mp3").exists());
}

#[tokio::test]
async fn test_grade_without_links_is_skipped() {
    let server = MockServer::start().await;
    let root = tempfile::tempdir().unwrap();

    let main = format!(
        "<html><body>\
         <p>一年级上册课本↓↓</p><table><tr><td><a href=\"/relative\">x</a></td></tr></table>\
         <p>二年级上册课本↓↓</p><table><tr><td><a href=\"{}/s/u1\">u1</a></td></tr></table>\
         </body></html>",
        server.uri()
    );
    mount_page(&server, "/main", main, 1).await;
    mount_page(&server, "/s/u1", article("Unit 1", Some("id-u1")), 1).await;
    mount_audio(&server, "id-u1", b"a".to_vec(), 1).await;

    let summary = crawl(&config(&server, root.path()), &GradeHeadingLocator::new())
        .await
        .unwrap();

    assert_eq!(summary.grades.len(), 2);
    assert_eq!(summary.grades[0].skipped.as_deref(), Some("no links"));
    assert_eq!(summary.grades[1].links.len(), 1);
    assert_eq!(summary.downloaded(), 1);
}

#[tokio::test]
async fn test_cookie_sent_when_configured() {
    let server = MockServer::start().await;
    let root = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/main"))
        .and(header("cookie", "wxuin=42"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", HTML))
        .expect(1)
        .mount(&server)
        .await;

    let config = CrawlConfig {
        cookie: "wxuin=42".into(),
        ..config(&server, root.path())
    };
    let summary = crawl(&config, &GradeHeadingLocator::new()).await.unwrap();
    assert!(summary.grades.is_empty());
}
