// Shared fixtures: a fake chapter site served by wiremock.
#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tcb_fetch::SiteConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LISTING_PATH: &str = "/mangas/5/one-piece";

pub fn site_config(server: &MockServer) -> SiteConfig {
    site_config_with(server, "timeout_secs = 5")
}

/// `extra` is appended to the top-level keys, e.g. `index_ttl_secs = 1`.
pub fn site_config_with(server: &MockServer, extra: &str) -> SiteConfig {
    SiteConfig::from_toml(&format!(
        r#"
name = "mock"
base_url = "{}"
listing_path = "{}"
{}

[index]
this = "div.overflow-hidden > div > div > div.col-span-2 > a"
link = {{ type = "Attr", name = "href" }}

[chapter]
pages = {{ type = "Attr", selector = "picture > img", name = "src" }}
"#,
        server.uri(),
        LISTING_PATH,
        extra
    ))
    .unwrap()
}

pub fn chapter_path(chapter: u32) -> String {
    format!("/chapters/one-piece-chapter-{}", chapter)
}

pub fn image_path(chapter: u32, page: usize) -> String {
    format!("/images/{}/{}.png", chapter, page)
}

pub fn listing_html(chapters: &[u32]) -> String {
    let anchors: String = chapters
        .iter()
        .map(|&c| {
            format!(
                r#"<div class="col-span-2"><a href="{}">One Piece Chapter {}</a></div>"#,
                chapter_path(c),
                c
            )
        })
        .collect();
    format!(
        r#"<html><body><div class="overflow-hidden"><div><div>{}</div></div></div></body></html>"#,
        anchors
    )
}

pub fn chapter_html(srcs: &[String]) -> String {
    let pictures: String = srcs
        .iter()
        .map(|src| format!(r#"<picture><img src="{}"></picture>"#, src))
        .collect();
    format!(r#"<html><body><div class="pages">{}</div></body></html>"#, pictures)
}

/// A PNG whose width identifies it once packed into a PDF.
pub fn png(width: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, 16, Rgb([240, 240, 240]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub async fn mount_listing(server: &MockServer, chapters: &[u32]) {
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(chapters)))
        .mount(server)
        .await;
}

pub async fn mount_listing_expecting(server: &MockServer, chapters: &[u32], hits: u64) {
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(chapters)))
        .expect(hits)
        .mount(server)
        .await;
}

/// Mounts a chapter page whose images have the given `(width, delay_ms)`.
/// With `hits` set, every one of those URLs must be requested exactly that
/// many times.
pub async fn mount_chapter(
    server: &MockServer,
    chapter: u32,
    pages: &[(u32, u64)],
    hits: Option<u64>,
) {
    let srcs: Vec<String> = (0..pages.len())
        .map(|page| format!("{}{}", server.uri(), image_path(chapter, page)))
        .collect();

    let page = Mock::given(method("GET"))
        .and(path(chapter_path(chapter)))
        .respond_with(ResponseTemplate::new(200).set_body_string(chapter_html(&srcs)));
    expecting(page, hits).mount(server).await;

    for (page, &(width, delay_ms)) in pages.iter().enumerate() {
        let image = Mock::given(method("GET"))
            .and(path(image_path(chapter, page)))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(png(width))
                    .set_delay(Duration::from_millis(delay_ms)),
            );
        expecting(image, hits).mount(server).await;
    }
}

fn expecting(mock: Mock, hits: Option<u64>) -> Mock {
    match hits {
        Some(hits) => mock.expect(hits),
        None => mock,
    }
}

pub async fn requests_to(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == request_path)
        .count()
}

/// Width of the image on each page, in page order.
pub fn pdf_page_widths(pdf: &Path) -> Vec<i64> {
    let doc = lopdf::Document::load(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let page = doc.get_dictionary(page_id).unwrap();
            let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
            let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
            let image_id = xobjects.get(b"Im0").unwrap().as_reference().unwrap();
            let image = doc.get_object(image_id).unwrap().as_stream().unwrap();
            image.dict.get(b"Width").unwrap().as_i64().unwrap()
        })
        .collect()
}
