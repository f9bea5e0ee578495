//! Page fetcher against a local server

use sheetwatch_clients::HttpFetcher;
use sheetwatch_core::{FetchError, Fetcher};
use std::net::SocketAddr;
use std::time::Duration;
use warp::http::{StatusCode, Uri};
use warp::Filter;

fn spawn_site() -> SocketAddr {
    let page = warp::path("page")
        .and(warp::header::<String>("user-agent"))
        .map(|ua: String| format!("ua={ua}"));
    let moved = warp::path("old").map(|| warp::redirect::temporary(Uri::from_static("/page")));
    let broken = warp::path("boom")
        .map(|| warp::reply::with_status("no", StatusCode::INTERNAL_SERVER_ERROR));
    let slow = warp::path("slow").and_then(|| async {
        tokio::time::sleep(Duration::from_secs(2)).await;
        Ok::<_, warp::Rejection>("late")
    });

    let (addr, server) = warp::serve(page.or(moved).or(broken).or(slow))
        .bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

#[tokio::test]
async fn sends_user_agent_and_returns_body() {
    let addr = spawn_site();
    let fetcher = HttpFetcher::new("sheetwatch-test/1.0", Duration::from_secs(5)).unwrap();

    let body = fetcher.fetch(&format!("http://{addr}/page")).await.unwrap();
    assert_eq!(body, "ua=sheetwatch-test/1.0");
}

#[tokio::test]
async fn follows_redirects() {
    let addr = spawn_site();
    let fetcher = HttpFetcher::new("Mozilla/5.0", Duration::from_secs(5)).unwrap();

    let body = fetcher.fetch(&format!("http://{addr}/old")).await.unwrap();
    assert_eq!(body, "ua=Mozilla/5.0");
}

#[tokio::test]
async fn error_status_is_a_fetch_failure() {
    let addr = spawn_site();
    let fetcher = HttpFetcher::new("Mozilla/5.0", Duration::from_secs(5)).unwrap();

    let err = fetcher.fetch(&format!("http://{addr}/boom")).await.unwrap_err();
    assert_eq!(err, FetchError::Status(500));
    let err = fetcher.fetch(&format!("http://{addr}/missing")).await.unwrap_err();
    assert_eq!(err, FetchError::Status(404));
}

#[tokio::test]
async fn slow_page_times_out() {
    let addr = spawn_site();
    let fetcher = HttpFetcher::new("Mozilla/5.0", Duration::from_millis(200)).unwrap();

    let err = fetcher.fetch(&format!("http://{addr}/slow")).await.unwrap_err();
    assert_eq!(err, FetchError::Timeout);
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    let fetcher = HttpFetcher::new("Mozilla/5.0", Duration::from_secs(2)).unwrap();

    let err = fetcher.fetch("http://127.0.0.1:9/").await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)), "{err:?}");
}

#[test]
fn invalid_user_agent_is_rejected() {
    assert!(HttpFetcher::new("bad\nagent", Duration::from_secs(1)).is_err());
}
