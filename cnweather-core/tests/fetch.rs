use std::time::Duration;

use cnweather_core::{ConfigBundle, ConfigTable, CrawlError, HttpFetcher, PageSource};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

fn bundle() -> ConfigBundle {
    ConfigBundle {
        browser_headers: ConfigTable::new(
            "BrowserHeader",
            [("User-Agent", "Mozilla/5.0 (X11; Linux x86_64)"), ("Referer", "http://www.weather.com.cn/")],
        ),
        ..Default::default()
    }
}

#[tokio::test]
async fn sends_browser_headers_and_decodes_utf8() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sk_2d/101020100.html"))
        .and(header("Referer", "http://www.weather.com.cn/"))
        .and(header("User-Agent", "Mozilla/5.0 (X11; Linux x86_64)"))
        .respond_with(
            ResponseTemplate::new(200)
                // Declared charset is wrong on purpose; the body is UTF-8.
                .insert_header("Content-Type", "text/html; charset=iso-8859-1")
                .set_body_bytes("var dataSK = {\"cityname\":\"上海\"}".as_bytes()),
        )
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&bundle()).unwrap();
    let body = fetcher
        .fetch(&format!("{}/sk_2d/101020100.html", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "var dataSK = {\"cityname\":\"上海\"}");
}

#[tokio::test]
async fn error_status_is_network_class() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&bundle()).unwrap();
    let err = fetcher.fetch(&mock_server.uri()).await.unwrap_err();

    assert!(err.is_network());
    assert!(matches!(err, CrawlError::HttpStatus { status: 503, ref body, .. } if body == "busy"));
}

#[tokio::test]
async fn non_utf8_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xff, 0xfe, 0xfd]))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&bundle()).unwrap();
    let err = fetcher.fetch(&mock_server.uri()).await.unwrap_err();

    assert!(matches!(err, CrawlError::Decode { .. }));
}

#[tokio::test]
async fn slow_response_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::with_timeout(&bundle(), Duration::from_millis(50)).unwrap();
    let err = fetcher.fetch(&mock_server.uri()).await.unwrap_err();

    assert!(err.is_network());
    assert!(matches!(err, CrawlError::Network { ref source, .. } if source.is_timeout()));
}
