mod common;

use common::html;
use ptt_scraper::config::FetchConfig;
use ptt_scraper::fetch::Fetcher;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config() -> FetchConfig {
    FetchConfig {
        timeout_secs: 5,
        ..FetchConfig::default()
    }
}

#[tokio::test]
async fn test_sends_user_agent_and_extra_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bbs/Gossiping/index.html"))
        .and(header("user-agent", "Mozilla/5.0"))
        .and(header("cookie", "over18=1"))
        .respond_with(html("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let mut cfg = config();
    cfg.headers.insert("Cookie".into(), "over18=1".into());
    let fetcher = Fetcher::new(&cfg).unwrap();

    let body = fetcher
        .fetch(&format!("{}/bbs/Gossiping/index.html", server.uri()))
        .await
        .expect("body");
    assert!(body.contains("ok"));
}

#[tokio::test]
async fn test_per_request_headers_override_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("cookie", "over18=0"))
        .respond_with(html("override"))
        .expect(1)
        .mount(&server)
        .await;

    let mut cfg = config();
    cfg.headers.insert("Cookie".into(), "over18=1".into());
    let fetcher = Fetcher::new(&cfg).unwrap();

    let mut overrides = HeaderMap::new();
    overrides.insert(COOKIE, HeaderValue::from_static("over18=0"));
    let body = fetcher.fetch_with(&format!("{}/page", server.uri()), &overrides).await;
    assert!(body.unwrap().contains("override"));
}

#[tokio::test]
async fn test_non_success_status_is_absent() {
    let server = MockServer::start().await;
    for (route, status) in [("/gone", 404), ("/busy", 503), ("/moved", 304)] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string("<div id=\"main-content\">x</div>"))
            .mount(&server)
            .await;
    }

    let fetcher = Fetcher::new(&config()).unwrap();
    for route in ["/gone", "/busy", "/moved"] {
        assert!(fetcher.fetch(&format!("{}{}", server.uri(), route)).await.is_none(), "{route}");
    }
}

#[tokio::test]
async fn test_body_decoded_with_configured_encoding() {
    let server = MockServer::start().await;
    let (bytes, _, _) = encoding_rs::BIG5.encode("看板 Stock 標題");
    Mock::given(method("GET"))
        .and(path("/big5"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(bytes.into_owned(), "text/html"))
        .mount(&server)
        .await;

    let cfg = FetchConfig {
        encoding: "big5".into(),
        ..config()
    };
    let fetcher = Fetcher::new(&cfg).unwrap();
    let body = fetcher.fetch(&format!("{}/big5", server.uri())).await.unwrap();
    assert_eq!(body, "看板 Stock 標題");
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("late").set_delay(std::time::Duration::from_secs(3)))
        .mount(&server)
        .await;

    let cfg = FetchConfig {
        timeout_secs: 1,
        ..config()
    };
    let fetcher = Fetcher::new(&cfg).unwrap();
    assert!(fetcher.fetch(&format!("{}/slow", server.uri())).await.is_none());
}
