//! Mock WebDriver hub and health service shared by the integration tests

#![allow(dead_code)]

use std::time::Duration;

use serde_json::json;
use service_probes::config::{BrowserProbeConfig, HealthProbeConfig, Strictness};
use service_probes::webdriver::ELEMENT_KEY;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SESSION_ID: &str = "3f1c2a";
pub const ELEMENT_ID: &str = "el-h1";
pub const HUB_PREFIX: &str = "/wd/hub";

pub fn hub_path(suffix: &str) -> String {
    format!("{}/{}", HUB_PREFIX, suffix)
}

pub fn session_path(suffix: &str) -> String {
    hub_path(&format!("session/{}/{}", SESSION_ID, suffix))
}

/// Browser config pointed at a mock hub, with short waits
pub fn browser_config(server: &MockServer, strictness: Strictness) -> BrowserProbeConfig {
    BrowserProbeConfig {
        selenium_url: format!("{}{}", server.uri(), HUB_PREFIX),
        wait_timeout: Duration::from_millis(400),
        poll_interval: Duration::from_millis(50),
        strictness,
        ..Default::default()
    }
}

pub fn health_config(server: &MockServer, strictness: Strictness) -> HealthProbeConfig {
    HealthProbeConfig {
        base_url: server.uri(),
        strictness,
        ..Default::default()
    }
}

pub async fn mount_session_created(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(hub_path("session")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": {
                "sessionId": SESSION_ID,
                "capabilities": { "browserName": "chrome" }
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// Session deletion, expected exactly `times` times
pub async fn mount_session_delete(server: &MockServer, times: u64) {
    Mock::given(method("DELETE"))
        .and(path(hub_path(&format!("session/{}", SESSION_ID))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .expect(times)
        .mount(server)
        .await;
}

pub async fn mount_navigate(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(session_path("url")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .mount(server)
        .await;
}

pub async fn mount_title(server: &MockServer, title: &str) {
    Mock::given(method("GET"))
        .and(path(session_path("title")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": title })))
        .mount(server)
        .await;
}

pub async fn mount_element_found(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(session_path("element")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "value": { ELEMENT_KEY: ELEMENT_ID } })),
        )
        .mount(server)
        .await;
}

pub fn no_such_element() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "value": {
            "error": "no such element",
            "message": "Unable to locate element: h1",
            "stacktrace": ""
        }
    }))
}

pub async fn mount_element_text(server: &MockServer, text: &str) {
    Mock::given(method("GET"))
        .and(path(session_path(&format!("element/{}/text", ELEMENT_ID))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": text })))
        .mount(server)
        .await;
}

/// A hub serving a page with the given title and heading, deleted once
pub async fn mount_page(server: &MockServer, title: &str, heading: &str) {
    mount_session_created(server).await;
    mount_navigate(server).await;
    mount_title(server, title).await;
    mount_element_found(server).await;
    mount_element_text(server, heading).await;
    mount_session_delete(server, 1).await;
}

pub async fn mount_health(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Base URL nothing listens on
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
