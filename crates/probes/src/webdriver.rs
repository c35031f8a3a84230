//! Minimal W3C WebDriver client
//!
//! Speaks the HTTP/JSON wire protocol of a remote WebDriver endpoint
//! (Selenium Grid, chromedriver, geckodriver). Only the commands the browser
//! probe issues are covered: session creation, navigation, title, element
//! lookup, element text and session deletion.

use std::time::Duration;

use reqwest::{Method, Url};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::CapabilityStyle;
use crate::error::{ProbeError, ProbeResult};

/// Key under which W3C endpoints return element references
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Key used by endpoints still speaking the JSON Wire protocol
const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// Selenium's client-side default for a single remote command
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// Element location strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    TagName(String),
    Css(String),
}

impl Locator {
    fn using(&self) -> &'static str {
        match self {
            Locator::TagName(_) => "tag name",
            Locator::Css(_) => "css selector",
        }
    }

    fn value(&self) -> &str {
        match self {
            Locator::TagName(v) | Locator::Css(v) => v,
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.using(), self.value())
    }
}

/// Capabilities requested when creating a session
#[derive(Debug, Clone)]
pub struct Capabilities {
    browser_name: String,
    args: Vec<String>,
    style: CapabilityStyle,
}

impl Capabilities {
    /// Chrome with the given command-line arguments
    pub fn chrome(args: Vec<String>, style: CapabilityStyle) -> Self {
        Self {
            browser_name: "chrome".to_string(),
            args,
            style,
        }
    }

    /// Body of the `POST /session` request
    pub fn to_request_body(&self) -> Value {
        let browser = json!({
            "browserName": self.browser_name,
            "goog:chromeOptions": { "args": self.args },
        });

        match self.style {
            CapabilityStyle::OptionsOnly => json!({
                "capabilities": { "alwaysMatch": browser },
            }),
            CapabilityStyle::Legacy => json!({
                "capabilities": { "alwaysMatch": browser.clone() },
                "desiredCapabilities": {
                    "browserName": self.browser_name,
                    "platform": "ANY",
                    "goog:chromeOptions": { "args": self.args },
                },
            }),
        }
    }
}

/// Reference to an element inside a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    id: String,
}

impl Element {
    pub fn id(&self) -> &str {
        &self.id
    }

    fn from_value(value: &Value) -> ProbeResult<Self> {
        value
            .get(ELEMENT_KEY)
            .or_else(|| value.get(LEGACY_ELEMENT_KEY))
            .and_then(Value::as_str)
            .map(|id| Element { id: id.to_string() })
            .ok_or_else(|| ProbeError::WebDriver {
                error: "invalid response".to_string(),
                message: format!("no element reference in {}", value),
            })
    }
}

/// HTTP client bound to one remote WebDriver endpoint
#[derive(Debug, Clone)]
pub struct WebDriverClient {
    http: reqwest::Client,
    endpoint: String,
}

impl WebDriverClient {
    /// Create a client for the given endpoint, e.g. `http://localhost:4444/wd/hub`
    pub fn new(endpoint: &str) -> ProbeResult<Self> {
        Self::with_timeout(endpoint, DEFAULT_COMMAND_TIMEOUT)
    }

    /// Create a client with a custom per-command timeout
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> ProbeResult<Self> {
        let url = Url::parse(endpoint).map_err(|e| {
            ProbeError::InvalidConfig(format!("WebDriver endpoint {}: {}", endpoint, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProbeError::InvalidConfig(format!(
                "WebDriver endpoint {} must be http(s)",
                endpoint
            )));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Create a new browser session
    ///
    /// The returned [`Session`] deletes itself on [`Session::quit`], or in the
    /// background when dropped without it.
    pub async fn new_session(&self, capabilities: &Capabilities) -> ProbeResult<Session> {
        info!("Creating WebDriver session at {}", self.endpoint);

        let response = self
            .send(Method::POST, "session", Some(capabilities.to_request_body()))
            .await?;

        // W3C puts the id under `value`, JSON Wire at the top level.
        let id = response
            .get("value")
            .and_then(|v| v.get("sessionId"))
            .or_else(|| response.get("sessionId"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ProbeError::SessionNotCreated(format!("no session id in response: {}", response))
            })?;

        info!("WebDriver session {} created", id);

        Ok(Session {
            client: self.clone(),
            id: id.to_string(),
            released: false,
        })
    }

    async fn delete_session(&self, id: &str) -> ProbeResult<()> {
        self.send(Method::DELETE, &format!("session/{}", id), None)
            .await
            .map(|_| ())
    }

    /// Issue a command and return the `value` member of the response
    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> ProbeResult<Value> {
        let mut response = self.send(method, path, body).await?;
        Ok(response
            .get_mut("value")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    /// Issue a command and return the whole response document
    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> ProbeResult<Value> {
        let url = format!("{}/{}", self.endpoint, path);
        debug!("WebDriver {} {}", method, url);

        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let document: Value = match serde_json::from_str(&text) {
            Ok(doc) => doc,
            Err(_) if status.is_success() && text.trim().is_empty() => Value::Null,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => {
                return Err(ProbeError::WebDriver {
                    error: format!("http {}", status.as_u16()),
                    message: text,
                })
            }
        };

        if let Some(error) = document
            .get("value")
            .and_then(|v| v.get("error"))
            .and_then(Value::as_str)
        {
            let message = document["value"]
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Err(ProbeError::WebDriver {
                error: error.to_string(),
                message,
            });
        }

        if !status.is_success() {
            return Err(ProbeError::WebDriver {
                error: format!("http {}", status.as_u16()),
                message: text,
            });
        }

        Ok(document)
    }
}

/// An exclusively owned remote browser session
pub struct Session {
    client: WebDriverClient,
    id: String,
    released: bool,
}

impl Session {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Load a URL in the current top-level browsing context
    pub async fn navigate(&self, url: &str) -> ProbeResult<()> {
        self.client
            .command(Method::POST, &self.path("url"), Some(json!({ "url": url })))
            .await
            .map(|_| ())
    }

    /// Current document title
    pub async fn title(&self) -> ProbeResult<String> {
        let value = self.client.command(Method::GET, &self.path("title"), None).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Find the first element matching `locator`
    pub async fn find_element(&self, locator: &Locator) -> ProbeResult<Element> {
        let body = json!({ "using": locator.using(), "value": locator.value() });
        let value = self
            .client
            .command(Method::POST, &self.path("element"), Some(body))
            .await?;
        Element::from_value(&value)
    }

    /// Rendered text of an element
    pub async fn element_text(&self, element: &Element) -> ProbeResult<String> {
        let path = self.path(&format!("element/{}/text", element.id));
        let value = self.client.command(Method::GET, &path, None).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Delete the session on the remote end
    pub async fn quit(mut self) -> ProbeResult<()> {
        self.released = true;
        info!("Deleting WebDriver session {}", self.id);
        self.client.delete_session(&self.id).await
    }

    fn path(&self, command: &str) -> String {
        format!("session/{}/{}", self.id, command)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("WebDriver session {} dropped outside a runtime, not deleted", self.id);
            return;
        };

        warn!("WebDriver session {} dropped without quit, deleting in background", self.id);
        let client = self.client.clone();
        let id = std::mem::take(&mut self.id);
        handle.spawn(async move {
            if let Err(e) = client.delete_session(&id).await {
                warn!("Failed to delete WebDriver session {}: {}", id, e);
            }
        });
    }
}
