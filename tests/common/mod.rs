#![allow(dead_code)]

use std::path::Path;

use ptt_scraper::config::{BoardConfig, FetchConfig, PolitenessConfig, StorageConfig};
use ptt_scraper::Config;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const BOARD: &str = "stock";

/// Config pointing at the mock origin, no politeness delays.
pub fn test_config(uri: &str, data_dir: &Path) -> Config {
    Config {
        board: BoardConfig {
            name: BOARD.to_string(),
            base_url: uri.to_string(),
        },
        fetch: FetchConfig {
            timeout_secs: 5,
            ..FetchConfig::default()
        },
        politeness: PolitenessConfig::none(),
        storage: StorageConfig {
            data_dir: Some(data_dir.to_path_buf()),
        },
        ..Config::default()
    }
}

pub fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body>{body}</body></html>"),
        "text/html; charset=utf-8",
    )
}

/// Board index whose previous-page button points at `index{prev}.html`.
pub fn index_page(prev: u32) -> String {
    format!(
        r#"<div class="btn-group btn-group-paging">
        <a class="btn wide" href="/bbs/{BOARD}/index1.html">最舊</a>
        <a class="btn wide" href="/bbs/{BOARD}/index{prev}.html">&lsaquo; 上頁</a>
        <a class="btn wide disabled">下頁 &rsaquo;</a>
        <a class="btn wide" href="/bbs/{BOARD}/index.html">最新</a>
        </div>"#
    )
}

pub fn post_href(id: &str) -> String {
    format!("/bbs/{BOARD}/M.{id}.A.html")
}

/// Listing page with one entry per `(post id, popularity token)`.
pub fn listing_page(entries: &[(&str, &str)]) -> String {
    let mut out = String::from(r#"<div class="r-list-container">"#);
    for (id, nrec) in entries {
        out.push_str(&format!(
            r#"<div class="r-ent">
            <div class="nrec"><span class="hl">{nrec}</span></div>
            <div class="title"><a href="{href}">[閒聊] post {id}</a></div>
            <div class="meta"><div class="author">user{id}</div><div class="date"> 1/05</div></div>
            </div>"#,
            href = post_href(id),
        ));
    }
    out.push_str("</div>");
    out
}

pub fn post_page(id: &str) -> String {
    format!(
        "<div id=\"main-content\"><div class=\"article-metaline\">作者 user{id}</div>\
         作者: user{id} (暱稱) 看板: Stock\n標題: [閒聊] post {id}\n時間: Fri Jan  5 09:00:00 2024\n\n\
         body of {id}\nsee <a href=\"https://ref.example/{id}\">https://ref.example/{id}</a>\n\
         <span class=\"f2\">※ 發信站: 批踢踢實業坊(ptt.cc)</span></div>"
    )
}

pub async fn mount_get(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

/// A post route that must be requested exactly `times` times.
pub async fn mount_post(server: &MockServer, id: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(post_href(id)))
        .respond_with(html(&post_page(id)))
        .expect(times)
        .mount(server)
        .await;
}
